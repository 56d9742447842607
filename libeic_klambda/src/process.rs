use std::path::PathBuf;
use std::sync::mpsc::Sender;

use super::classify::{classify_lambda, find_lambdas, DecayRecord};
use super::constants::{KINEMATICS_METHODS, PDG_LAMBDA, PDG_NEUTRON, PDG_PHOTON, RECO_FF_LAMBDAS};
use super::detectors::{detect_particle, DetectorConfig, HitRecord};
use super::error::{ConverterError, EventFileError};
use super::event::{Event, McParticle};
use super::event_file::EventFile;
use super::flatten::{mc_headers, mc_row, reco_headers, reco_row};
use super::kinematics::{
    crossed_hadron_beam, dis_truth, find_beams, find_scattered_electron, momentum_transfer,
    nominal_hadron_beam, FourMomentum,
};
use super::status::ConverterStatus;
use super::table::{side_table_path, CsvTable};

/// Role prefixes of the MC-truth lambda tables, in column order
pub const MC_ROLE_PREFIXES: [&str; 7] = ["lam", "prot", "pimin", "neut", "pizero", "gam1", "gam2"];

/// Decay-product roles checked against the detectors by the acceptance
/// converter, in column order
pub const ACCEPTANCE_ROLES: [&str; 5] = ["prot", "pimin", "neut", "gam1", "gam2"];

/// Columns of the per-role hit side tables
const HIT_FIELDS: [&str; 9] = [
    "evt",
    "detector",
    "hit",
    "x",
    "y",
    "z",
    "energy",
    "time",
    "path_length",
];

// Status heartbeat cadence, in events
const STATUS_INTERVAL: u64 = 100;

/// Converter invocation parameters shared by every program
#[derive(Debug, Clone)]
pub struct ConverterArgs {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub max_events: Option<u64>,
}

/// File/event loop bookkeeping
#[derive(Debug, Clone, Default)]
struct LoopStats {
    files_processed: usize,
    files_skipped: usize,
    events_processed: u64,
}

/// End-of-run statistics printed to stdout by the binaries
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub events_processed: u64,
    pub rows_written: u64,
    /// Indexed by `DecayChannel::code()`; all zero for the DIS converters
    pub channel_counts: [u64; 5],
}

impl Summary {
    fn from_stats(stats: &LoopStats, rows_written: u64, channel_counts: [u64; 5]) -> Self {
        Self {
            files_processed: stats.files_processed,
            files_skipped: stats.files_skipped,
            events_processed: stats.events_processed,
            rows_written,
            channel_counts,
        }
    }

    pub fn print(&self) {
        println!(
            "Files processed: {} (skipped: {})",
            self.files_processed, self.files_skipped
        );
        println!("Events processed: {}", self.events_processed);
        println!("Rows written: {}", self.rows_written);
        if self.channel_counts.iter().any(|count| *count > 0) {
            println!(
                "Lambda channels -- not decayed: {}, charged: {}, neutral: {}, shower: {}, other: {}",
                self.channel_counts[0],
                self.channel_counts[1],
                self.channel_counts[2],
                self.channel_counts[3],
                self.channel_counts[4],
            );
        }
    }
}

/// Acceptance statistics layered on top of the base run summary
#[derive(Debug, Clone, Default)]
pub struct AcceptanceSummary {
    pub summary: Summary,
    /// Events in which the role was seen by at least one subsystem,
    /// indexed like `ACCEPTANCE_ROLES`
    pub detected_per_role: [u64; 5],
    /// Events with both charged-channel products detected
    pub charged_detected: u64,
    /// Events with the neutron and both photons detected
    pub neutral_detected: u64,
}

impl AcceptanceSummary {
    pub fn print(&self) {
        self.summary.print();
        for (role, count) in ACCEPTANCE_ROLES.iter().zip(self.detected_per_role) {
            println!("Events with {role} detected: {count}");
        }
        println!(
            "Joint detection -- charged (p and pi-): {}, neutral (n and both photons): {}",
            self.charged_detected, self.neutral_detected
        );
    }
}

/// Sum of the event counts of all openable inputs, capped by the limit.
/// Used only to scale progress reporting; unreadable files count zero here
/// and are diagnosed when the main loop reaches them.
fn planned_events(args: &ConverterArgs) -> u64 {
    let mut available: u64 = 0;
    for path in &args.inputs {
        if let Ok(file) = EventFile::new(path) {
            available += file.event_count() as u64;
        }
    }
    match args.max_events {
        Some(limit) => available.min(limit),
        None => available,
    }
}

/// The shared file/event loop.
///
/// Iterates the input files in order, reading events until each is
/// exhausted or the global event cap is reached; once the cap is hit no
/// further file is opened. A file that fails to open or goes bad mid-read
/// is logged and skipped; the run continues. The `evt` value passed to the
/// action is the file-local event index.
fn for_each_event<F>(
    args: &ConverterArgs,
    tx: &Sender<ConverterStatus>,
    mut action: F,
) -> Result<LoopStats, ConverterError>
where
    F: FnMut(u64, &Event) -> Result<(), ConverterError>,
{
    let planned = planned_events(args);
    let mut stats = LoopStats::default();
    let mut total: u64 = 0;
    let mut limit_reached = false;
    tx.send(ConverterStatus::new(0.0, 0))?;

    for path in &args.inputs {
        if limit_reached {
            break;
        }
        let mut file = match EventFile::new(path) {
            Ok(file) => file,
            Err(e) => {
                log::error!("Skipping input {}: {e}", path.to_string_lossy());
                stats.files_skipped += 1;
                continue;
            }
        };
        let size = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        log::info!(
            "Processing {} -- {} events, {}",
            path.to_string_lossy(),
            file.event_count(),
            human_bytes::human_bytes(size as f64)
        );

        let mut local_evt: u64 = 0;
        loop {
            if let Some(limit) = args.max_events {
                if total >= limit {
                    limit_reached = true;
                    break;
                }
            }
            let event = match file.next_event() {
                Ok(event) => event,
                Err(EventFileError::EndOfFile) => break,
                Err(e) => {
                    log::error!(
                        "Error reading {}: {e}; moving to the next file",
                        path.to_string_lossy()
                    );
                    break;
                }
            };
            action(local_evt, &event)?;
            local_evt += 1;
            total += 1;
            if total % STATUS_INTERVAL == 0 {
                let progress = if planned > 0 {
                    total as f32 / planned as f32
                } else {
                    0.0
                };
                tx.send(ConverterStatus::new(progress, total))?;
            }
        }
        stats.files_processed += 1;
    }

    stats.events_processed = total;
    tx.send(ConverterStatus::new(1.0, total))?;
    Ok(stats)
}

fn empty_fields(count: usize) -> Vec<String> {
    vec![String::new(); count]
}

fn bool_field(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

// ---------------------------------------------------------------------------
// mcpart_lambda / mcpart_lambda_all
// ---------------------------------------------------------------------------

fn lambda_truth_headers() -> Vec<String> {
    let mut headers = vec![String::from("evt"), String::from("channel")];
    for prefix in MC_ROLE_PREFIXES {
        headers.extend(mc_headers(prefix));
    }
    headers
}

fn lambda_truth_row(evt: u64, particles: &[McParticle], record: &DecayRecord) -> Vec<String> {
    let mut row = vec![evt.to_string(), record.channel.code().to_string()];
    row.extend(mc_row(particles, Some(record.lam)));
    row.extend(mc_row(particles, record.prot));
    row.extend(mc_row(particles, record.pimin));
    row.extend(mc_row(particles, record.neut));
    row.extend(mc_row(particles, record.pizero));
    row.extend(mc_row(particles, record.gam1));
    row.extend(mc_row(particles, record.gam2));
    row
}

/// Flatten matched Λ decays from MC truth to the `mcpart_lambda` table.
///
/// With `all_lambdas` false only the first Λ per event is emitted; the
/// no-break variant emits every matched Λ.
pub fn run_mcpart_lambda(
    args: &ConverterArgs,
    all_lambdas: bool,
    tx: &Sender<ConverterStatus>,
) -> Result<Summary, ConverterError> {
    let mut table = CsvTable::create(&args.output, &lambda_truth_headers())?;
    let mut channel_counts = [0u64; 5];

    let stats = for_each_event(args, tx, |evt, event| {
        let particles = event.mc_particles();
        for lam in find_lambdas(particles) {
            let record = classify_lambda(particles, lam);
            channel_counts[record.channel.code() as usize] += 1;
            table.write_row(&lambda_truth_row(evt, particles, &record))?;
            if !all_lambdas {
                break;
            }
        }
        Ok(())
    })?;

    let rows_written = table.rows_written();
    table.finish()?;
    Ok(Summary::from_stats(&stats, rows_written, channel_counts))
}

// ---------------------------------------------------------------------------
// lambda_acceptance
// ---------------------------------------------------------------------------

fn acceptance_headers(config: &DetectorConfig) -> Vec<String> {
    let mut headers = vec![String::from("evt"), String::from("channel")];
    headers.extend(mc_headers("lam"));
    for role in ACCEPTANCE_ROLES {
        for label in config.labels() {
            headers.push(format!("{role}_{label}"));
        }
        headers.push(format!("{role}_any"));
    }
    headers.push(String::from("charged_detected"));
    headers.push(String::from("neutral_detected"));
    headers
}

fn hit_row(evt: u64, hit: &HitRecord) -> Vec<String> {
    vec![
        evt.to_string(),
        hit.detector.clone(),
        hit.hit.to_string(),
        hit.position[0].to_string(),
        hit.position[1].to_string(),
        hit.position[2].to_string(),
        hit.energy.to_string(),
        hit.time.to_string(),
        hit.path_length.map(|p| p.to_string()).unwrap_or_default(),
    ]
}

/// MC-truth Λ decays with per-subsystem detection flags and per-role hit
/// side tables. One row per first matched Λ per event.
pub fn run_lambda_acceptance(
    args: &ConverterArgs,
    config: &DetectorConfig,
    tx: &Sender<ConverterStatus>,
) -> Result<AcceptanceSummary, ConverterError> {
    let mut table = CsvTable::create(&args.output, &acceptance_headers(config))?;
    let hit_headers: Vec<String> = HIT_FIELDS.iter().map(|f| f.to_string()).collect();
    let mut side_tables = Vec::with_capacity(ACCEPTANCE_ROLES.len());
    for role in ACCEPTANCE_ROLES {
        let path = side_table_path(&args.output, &format!("{role}_hits"));
        side_tables.push(CsvTable::create(&path, &hit_headers)?);
    }

    let n_detectors = config.detectors.len();
    let mut channel_counts = [0u64; 5];
    let mut detected_per_role = [0u64; 5];
    let mut charged_detected: u64 = 0;
    let mut neutral_detected: u64 = 0;

    let stats = for_each_event(args, tx, |evt, event| {
        let particles = event.mc_particles();
        let lam = match find_lambdas(particles).first() {
            Some(lam) => *lam,
            None => return Ok(()),
        };
        let record = classify_lambda(particles, lam);
        channel_counts[record.channel.code() as usize] += 1;

        let mut row = vec![evt.to_string(), record.channel.code().to_string()];
        row.extend(mc_row(particles, Some(record.lam)));

        let roles = [
            record.prot,
            record.pimin,
            record.neut,
            record.gam1,
            record.gam2,
        ];
        let mut role_detected = [false; 5];
        for (slot, role) in roles.iter().enumerate() {
            match role {
                Some(particle) => {
                    let mut hits = Vec::new();
                    let flags = detect_particle(event, config, *particle, &mut hits);
                    for flag in &flags.flags {
                        row.push(bool_field(*flag));
                    }
                    row.push(bool_field(flags.any()));
                    role_detected[slot] = flags.any();
                    if flags.any() {
                        detected_per_role[slot] += 1;
                    }
                    for hit in &hits {
                        side_tables[slot].write_row(&hit_row(evt, hit))?;
                    }
                }
                // Unbound roles stay null, distinct from "present but unseen"
                None => row.extend(empty_fields(n_detectors + 1)),
            }
        }

        let charged = record.prot.is_some()
            && record.pimin.is_some()
            && role_detected[0]
            && role_detected[1];
        let neutral = record.neut.is_some()
            && record.gam1.is_some()
            && record.gam2.is_some()
            && role_detected[2]
            && role_detected[3]
            && role_detected[4];
        if charged {
            charged_detected += 1;
        }
        if neutral {
            neutral_detected += 1;
        }
        row.push(bool_field(charged));
        row.push(bool_field(neutral));
        table.write_row(&row)?;
        Ok(())
    })?;

    let rows_written = table.rows_written();
    table.finish()?;
    for side_table in side_tables {
        side_table.finish()?;
    }
    Ok(AcceptanceSummary {
        summary: Summary::from_stats(&stats, rows_written, channel_counts),
        detected_per_role,
        charged_detected,
        neutral_detected,
    })
}

// ---------------------------------------------------------------------------
// mc_dis
// ---------------------------------------------------------------------------

fn mc_dis_headers() -> Vec<String> {
    let mut headers = vec![String::from("evt")];
    for prefix in ["ebeam", "pbeam", "escat"] {
        for field in ["px", "py", "pz", "e"] {
            headers.push(format!("{prefix}_{field}"));
        }
    }
    for field in ["x", "q2", "y", "nu", "w", "s"] {
        headers.push(String::from(field));
    }
    headers
}

fn momentum_energy_fields(particle: &McParticle) -> Vec<String> {
    let [px, py, pz] = particle.momentum;
    vec![
        px.to_string(),
        py.to_string(),
        pz.to_string(),
        particle.energy().to_string(),
    ]
}

/// Truth-level DIS kinematics, one row per event. Events without resolvable
/// beams or scattered electron keep their row with empty kinematic fields.
pub fn run_mc_dis(
    args: &ConverterArgs,
    tx: &Sender<ConverterStatus>,
) -> Result<Summary, ConverterError> {
    let headers = mc_dis_headers();
    let n_kinematic_fields = headers.len() - 1;
    let mut table = CsvTable::create(&args.output, &headers)?;

    let stats = for_each_event(args, tx, |evt, event| {
        let particles = event.mc_particles();
        let mut row = vec![evt.to_string()];
        match dis_truth(particles) {
            Some(dis) => {
                row.extend(momentum_energy_fields(&particles[dis.beam_electron as usize]));
                row.extend(momentum_energy_fields(&particles[dis.beam_hadron as usize]));
                row.extend(momentum_energy_fields(&particles[dis.scat_electron as usize]));
                row.push(dis.x.to_string());
                row.push(dis.q2.to_string());
                row.push(dis.y.to_string());
                row.push(dis.nu.to_string());
                row.push(dis.w.to_string());
                row.push(dis.s.to_string());
            }
            None => row.extend(empty_fields(n_kinematic_fields)),
        }
        table.write_row(&row)?;
        Ok(())
    })?;

    let rows_written = table.rows_written();
    table.finish()?;
    Ok(Summary::from_stats(&stats, rows_written, [0; 5]))
}

// ---------------------------------------------------------------------------
// reco_dis
// ---------------------------------------------------------------------------

fn reco_dis_headers() -> Vec<String> {
    let mut headers = vec![String::from("evt")];
    for (prefix, _) in KINEMATICS_METHODS {
        for field in ["x", "q2", "y", "nu", "w"] {
            headers.push(format!("{prefix}_{field}"));
        }
    }
    for field in ["t_truth", "t_nominal", "t_xangle"] {
        headers.push(String::from(field));
    }
    for prefix in ["ebeam", "pbeam", "escat"] {
        for field in ["px", "py", "pz"] {
            headers.push(format!("{prefix}_{field}"));
        }
    }
    headers
}

fn momentum_fields(particle: Option<&McParticle>) -> Vec<String> {
    match particle {
        Some(p) => {
            let [px, py, pz] = p.momentum;
            vec![px.to_string(), py.to_string(), pz.to_string()]
        }
        None => empty_fields(3),
    }
}

/// Per-algorithm reconstructed DIS kinematics plus momentum-transfer values
/// under the beam-knowledge assumptions, one row per event.
pub fn run_reco_dis(
    args: &ConverterArgs,
    tx: &Sender<ConverterStatus>,
) -> Result<Summary, ConverterError> {
    let mut table = CsvTable::create(&args.output, &reco_dis_headers())?;

    let stats = for_each_event(args, tx, |evt, event| {
        let mut row = vec![evt.to_string()];
        for (_, collection) in KINEMATICS_METHODS {
            match event
                .kinematics_collection(collection)
                .and_then(|records| records.first())
            {
                Some(kin) => {
                    row.push(kin.x.to_string());
                    row.push(kin.q2.to_string());
                    row.push(kin.y.to_string());
                    row.push(kin.nu.to_string());
                    row.push(kin.w.to_string());
                }
                None => row.extend(empty_fields(5)),
            }
        }

        let particles = event.mc_particles();
        let beams = find_beams(particles);
        let beam_electron = beams.map(|(e, _)| &particles[e as usize]);
        let beam_hadron = beams.map(|(_, h)| &particles[h as usize]);
        let mc_lambda = find_lambdas(particles)
            .first()
            .map(|lam| &particles[*lam as usize]);
        let reco_lambda = event
            .reco_collection(RECO_FF_LAMBDAS)
            .and_then(|records| records.iter().find(|p| p.pdg == PDG_LAMBDA));

        match (beam_hadron, mc_lambda) {
            (Some(beam), Some(lambda)) => row.push(
                momentum_transfer(&FourMomentum::from_mc(beam), &FourMomentum::from_mc(lambda))
                    .to_string(),
            ),
            _ => row.push(String::new()),
        }
        match (beam_hadron, reco_lambda) {
            (Some(beam), Some(lambda)) => {
                let truth_momentum = FourMomentum::from_mc(beam).p.norm();
                let reco = FourMomentum::from_reco(lambda);
                row.push(
                    momentum_transfer(&nominal_hadron_beam(truth_momentum), &reco).to_string(),
                );
                row.push(
                    momentum_transfer(&crossed_hadron_beam(truth_momentum), &reco).to_string(),
                );
            }
            _ => row.extend(empty_fields(2)),
        }

        row.extend(momentum_fields(beam_electron));
        row.extend(momentum_fields(beam_hadron));
        let scattered = find_scattered_electron(particles).map(|i| &particles[i as usize]);
        row.extend(momentum_fields(scattered));

        table.write_row(&row)?;
        Ok(())
    })?;

    let rows_written = table.rows_written();
    table.finish()?;
    Ok(Summary::from_stats(&stats, rows_written, [0; 5]))
}

// ---------------------------------------------------------------------------
// reco_ff_lambda
// ---------------------------------------------------------------------------

fn reco_ff_lambda_headers() -> Vec<String> {
    let mut headers = vec![String::from("evt")];
    headers.extend(reco_headers("lam", true));
    headers.extend(reco_headers("neut", false));
    headers.extend(reco_headers("gam1", false));
    headers.extend(reco_headers("gam2", false));
    headers
}

/// Flatten the first reconstructed far-forward Λ per event, with its
/// neutron and photon sub-particles bound by species code.
pub fn run_reco_ff_lambda(
    args: &ConverterArgs,
    tx: &Sender<ConverterStatus>,
) -> Result<Summary, ConverterError> {
    let mut table = CsvTable::create(&args.output, &reco_ff_lambda_headers())?;

    let stats = for_each_event(args, tx, |evt, event| {
        let collection = match event.reco_collection(RECO_FF_LAMBDAS) {
            Some(collection) => collection,
            None => return Ok(()),
        };
        let lam = match collection.iter().position(|p| p.pdg == PDG_LAMBDA) {
            Some(index) => index as u32,
            None => return Ok(()),
        };

        let sub_particles: Vec<u32> = collection[lam as usize]
            .particles
            .iter()
            .copied()
            .filter(|i| (*i as usize) < collection.len())
            .collect();
        let neut = sub_particles
            .iter()
            .copied()
            .find(|i| collection[*i as usize].pdg == PDG_NEUTRON);
        let photons: Vec<u32> = sub_particles
            .iter()
            .copied()
            .filter(|i| collection[*i as usize].pdg == PDG_PHOTON)
            .collect();

        let mut row = vec![evt.to_string()];
        row.extend(reco_row(collection, Some(lam), true));
        row.extend(reco_row(collection, neut, false));
        row.extend(reco_row(collection, photons.first().copied(), false));
        row.extend(reco_row(collection, photons.get(1).copied(), false));
        table.write_row(&row)?;
        Ok(())
    })?;

    let rows_written = table.rows_written();
    table.finish()?;
    Ok(Summary::from_stats(&stats, rows_written, [0; 5]))
}
