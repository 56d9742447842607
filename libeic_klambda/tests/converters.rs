//! End-to-end tests of the converter drivers: container files are written
//! to a temporary directory, a converter is run over them, and the CSV
//! output is checked field by field.

use std::path::Path;
use std::sync::mpsc::channel;

use libeic_klambda::constants::{
    MC_PARTICLES, PDG_ELECTRON, PDG_LAMBDA, PDG_NEUTRON, PDG_PHOTON, PDG_PI_MINUS, PDG_PI_ZERO,
    PDG_PROTON, RECO_FF_LAMBDAS, STATUS_BEAM, STATUS_DECAYED, STATUS_STABLE,
};
use libeic_klambda::detectors::DetectorConfig;
use libeic_klambda::event::{
    CaloContribution, CaloHit, Event, InclusiveKinematics, McParticle, RecoParticle,
};
use libeic_klambda::event_file::EventWriter;
use libeic_klambda::process::{
    run_lambda_acceptance, run_mc_dis, run_mcpart_lambda, run_reco_dis, run_reco_ff_lambda,
    ConverterArgs,
};

fn mc(pdg: i32, status: i32, daughters: Vec<u32>) -> McParticle {
    McParticle {
        pdg,
        generator_status: status,
        daughters,
        ..Default::default()
    }
}

fn mc_event(particles: Vec<McParticle>) -> Event {
    let mut event = Event::default();
    event.mc_collections.insert(MC_PARTICLES.to_string(), particles);
    event
}

fn charged_decay_event() -> Event {
    let mut lam = mc(PDG_LAMBDA, STATUS_DECAYED, vec![1, 2]);
    lam.momentum = [0.8, 0.0, 6.0];
    let mut prot = mc(PDG_PROTON, STATUS_STABLE, vec![]);
    prot.momentum = [1.0, 0.0, 5.0];
    let mut pimin = mc(PDG_PI_MINUS, STATUS_STABLE, vec![]);
    pimin.momentum = [-0.2, 0.0, 1.0];
    mc_event(vec![lam, prot, pimin])
}

fn neutral_decay_event(pizero_decayed: bool) -> Event {
    let pizero_daughters = if pizero_decayed { vec![3, 4] } else { vec![] };
    let mut particles = vec![
        mc(PDG_LAMBDA, STATUS_DECAYED, vec![1, 2]),
        mc(PDG_NEUTRON, STATUS_STABLE, vec![]),
        mc(PDG_PI_ZERO, STATUS_DECAYED, pizero_daughters),
    ];
    if pizero_decayed {
        particles.push(mc(PDG_PHOTON, STATUS_STABLE, vec![]));
        particles.push(mc(PDG_PHOTON, STATUS_STABLE, vec![]));
    }
    mc_event(particles)
}

fn write_events(path: &Path, events: &[Event]) {
    let mut writer = EventWriter::new(path).expect("could not create event writer");
    for event in events {
        writer.write_event(event).expect("could not write event");
    }
    writer.close().expect("could not close event writer");
}

fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let contents = std::fs::read_to_string(path).expect("could not read output table");
    let mut lines = contents.lines();
    let headers: Vec<String> = lines
        .next()
        .expect("table has no header")
        .split(',')
        .map(str::to_string)
        .collect();
    let rows: Vec<Vec<String>> = lines
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect();
    (headers, rows)
}

fn field<'a>(headers: &[String], row: &'a [String], name: &str) -> &'a str {
    let index = headers
        .iter()
        .position(|header| header == name)
        .unwrap_or_else(|| panic!("no column named {name}"));
    &row[index]
}

#[test]
fn test_charged_channel_row() {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("mcpart_lambda.csv");
    write_events(&input, &[charged_decay_event()]);

    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_mcpart_lambda(&args, false, &tx).expect("conversion failed");
    assert_eq!(summary.events_processed, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.channel_counts[1], 1);

    let (headers, rows) = read_table(&output);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(headers.len(), row.len());
    assert_eq!(field(&headers, row, "evt"), "0");
    assert_eq!(field(&headers, row, "channel"), "1");
    assert_eq!(field(&headers, row, "lam_pdg"), "3122");
    assert_eq!(field(&headers, row, "prot_pdg"), "2212");
    assert_eq!(field(&headers, row, "prot_px"), "1");
    assert_eq!(field(&headers, row, "prot_pz"), "5");
    assert_eq!(field(&headers, row, "pimin_pdg"), "-211");
    assert_eq!(field(&headers, row, "pimin_px"), "-0.2");
    // The neutral-side roles stay entirely empty
    for prefix in ["neut", "pizero", "gam1", "gam2"] {
        assert_eq!(field(&headers, row, &format!("{prefix}_pdg")), "");
        assert_eq!(field(&headers, row, &format!("{prefix}_ndau")), "");
    }
}

#[test]
fn test_neutral_channel_rows() {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("mcpart_lambda.csv");
    write_events(
        &input,
        &[neutral_decay_event(true), neutral_decay_event(false)],
    );

    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_mcpart_lambda(&args, false, &tx).expect("conversion failed");
    assert_eq!(summary.channel_counts[2], 2);

    let (headers, rows) = read_table(&output);
    assert_eq!(rows.len(), 2);

    // Fully decayed chain populates all seven roles
    let full = &rows[0];
    assert_eq!(field(&headers, full, "channel"), "2");
    assert_eq!(field(&headers, full, "neut_pdg"), "2112");
    assert_eq!(field(&headers, full, "pizero_pdg"), "111");
    assert_eq!(field(&headers, full, "gam1_pdg"), "22");
    assert_eq!(field(&headers, full, "gam2_pdg"), "22");

    // Undecayed pi0 keeps the channel but leaves the photons empty
    let bare = &rows[1];
    assert_eq!(field(&headers, bare, "channel"), "2");
    assert_eq!(field(&headers, bare, "neut_pdg"), "2112");
    assert_eq!(field(&headers, bare, "pizero_pdg"), "111");
    assert_eq!(field(&headers, bare, "gam1_pdg"), "");
    assert_eq!(field(&headers, bare, "gam2_pdg"), "");
}

#[test]
fn test_event_limit_stops_before_third_file() {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let output = dir.path().join("mcpart_lambda.csv");
    let mut inputs = Vec::new();
    for index in 0..3 {
        let path = dir.path().join(format!("events_{index}.ekev"));
        write_events(
            &path,
            &[
                charged_decay_event(),
                charged_decay_event(),
                charged_decay_event(),
            ],
        );
        inputs.push(path);
    }

    let args = ConverterArgs {
        inputs,
        output: output.clone(),
        max_events: Some(4),
    };
    let (tx, _rx) = channel();
    let summary = run_mcpart_lambda(&args, false, &tx).expect("conversion failed");
    assert_eq!(summary.events_processed, 4);
    assert_eq!(summary.rows_written, 4);
    // The cap was hit inside the second file, so the third is never opened
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_skipped, 0);

    // evt is file-local: three rows from the first file, one from the second
    let (headers, rows) = read_table(&output);
    let evts: Vec<&str> = rows
        .iter()
        .map(|row| field(&headers, row, "evt"))
        .collect();
    assert_eq!(evts, vec!["0", "1", "2", "0"]);
}

#[test]
fn test_unreadable_input_is_skipped() {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let bad = dir.path().join("bad.ekev");
    std::fs::write(&bad, b"not a container").expect("could not write bad file");
    let good = dir.path().join("good.ekev");
    write_events(&good, &[charged_decay_event()]);
    let output = dir.path().join("mcpart_lambda.csv");

    let args = ConverterArgs {
        inputs: vec![bad, good],
        output,
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_mcpart_lambda(&args, false, &tx).expect("conversion failed");
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.rows_written, 1);
}

#[test]
fn test_all_lambdas_variant_emits_every_match() {
    let mut event = charged_decay_event();
    // A second, undecayed Lambda in the same event
    event
        .mc_collections
        .get_mut(MC_PARTICLES)
        .expect("mc collection missing")
        .push(mc(PDG_LAMBDA, STATUS_STABLE, vec![]));

    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    write_events(&input, &[event]);

    for (all_lambdas, expected_rows) in [(false, 1u64), (true, 2u64)] {
        let output = dir.path().join(format!("out_{all_lambdas}.csv"));
        let args = ConverterArgs {
            inputs: vec![input.clone()],
            output: output.clone(),
            max_events: None,
        };
        let (tx, _rx) = channel();
        let summary = run_mcpart_lambda(&args, all_lambdas, &tx).expect("conversion failed");
        assert_eq!(summary.rows_written, expected_rows);
    }
}

#[test]
fn test_acceptance_flags_and_side_tables() {
    let mut event = neutral_decay_event(true);
    // Neutron showers in both far-forward HCals; the photons convert in the
    // ZDC ECal. Multi-detector flags are independent, not exclusive.
    for collection in ["HcalFarForwardZDCHits", "HcalEndcapPInsertHits"] {
        event.calo_hits.insert(
            collection.to_string(),
            vec![CaloHit {
                energy: 0.9,
                time: 30.0,
                contributions: vec![CaloContribution {
                    particle: 1,
                    energy: 0.9,
                    time: 30.0,
                }],
                ..Default::default()
            }],
        );
    }
    event.calo_hits.insert(
        "EcalFarForwardZDCHits".to_string(),
        vec![
            CaloHit {
                energy: 0.4,
                contributions: vec![CaloContribution {
                    particle: 3,
                    energy: 0.4,
                    time: 29.0,
                }],
                ..Default::default()
            },
            CaloHit {
                energy: 0.3,
                contributions: vec![CaloContribution {
                    particle: 4,
                    energy: 0.3,
                    time: 29.5,
                }],
                ..Default::default()
            },
        ],
    );

    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("lambda_acceptance.csv");
    write_events(&input, &[event]);

    let config = DetectorConfig::new(None).expect("default config must load");
    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_lambda_acceptance(&args, &config, &tx).expect("conversion failed");
    assert_eq!(summary.summary.rows_written, 1);
    assert_eq!(summary.neutral_detected, 1);
    assert_eq!(summary.charged_detected, 0);

    let (headers, rows) = read_table(&output);
    let row = &rows[0];
    assert_eq!(headers.len(), row.len());
    assert_eq!(field(&headers, row, "neut_zdc_hcal"), "1");
    assert_eq!(field(&headers, row, "neut_insert_hcal"), "1");
    assert_eq!(field(&headers, row, "neut_zdc_ecal"), "0");
    assert_eq!(field(&headers, row, "neut_any"), "1");
    assert_eq!(field(&headers, row, "gam1_zdc_ecal"), "1");
    assert_eq!(field(&headers, row, "gam2_zdc_ecal"), "1");
    assert_eq!(field(&headers, row, "neutral_detected"), "1");
    assert_eq!(field(&headers, row, "charged_detected"), "0");
    // Roles unbound in this channel stay null rather than reading as "0"
    assert_eq!(field(&headers, row, "prot_any"), "");
    assert_eq!(field(&headers, row, "pimin_any"), "");

    let (neut_headers, neut_rows) = read_table(&dir.path().join("lambda_acceptance_neut_hits.csv"));
    assert_eq!(neut_rows.len(), 2);
    assert_eq!(field(&neut_headers, &neut_rows[0], "evt"), "0");
    let detectors: Vec<&str> = neut_rows
        .iter()
        .map(|row| field(&neut_headers, row, "detector"))
        .collect();
    assert!(detectors.contains(&"zdc_hcal"));
    assert!(detectors.contains(&"insert_hcal"));

    // Side tables exist for every role, even when empty
    let (_, prot_rows) = read_table(&dir.path().join("lambda_acceptance_prot_hits.csv"));
    assert!(prot_rows.is_empty());
}

fn dis_event() -> Event {
    let mut ebeam = mc(PDG_ELECTRON, STATUS_BEAM, vec![]);
    ebeam.momentum = [0.0, 0.0, -18.0];
    ebeam.mass = 0.000511;
    let mut pbeam = mc(PDG_PROTON, STATUS_BEAM, vec![]);
    pbeam.momentum = [0.0, 0.0, 275.0];
    pbeam.mass = 0.938272;
    let mut escat = mc(PDG_ELECTRON, STATUS_STABLE, vec![]);
    escat.momentum = [1.2, 0.4, -14.0];
    escat.mass = 0.000511;
    let mut lam = mc(PDG_LAMBDA, STATUS_DECAYED, vec![]);
    lam.momentum = [0.6, -0.1, 260.0];
    lam.mass = 1.115683;
    mc_event(vec![ebeam, pbeam, escat, lam])
}

#[test]
fn test_mc_dis_rows() {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("mc_dis.csv");
    // One event with full truth, one with no beam records at all
    write_events(&input, &[dis_event(), mc_event(vec![])]);

    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_mc_dis(&args, &tx).expect("conversion failed");
    assert_eq!(summary.rows_written, 2);

    let (headers, rows) = read_table(&output);
    let good = &rows[0];
    assert_eq!(headers.len(), good.len());
    assert_eq!(field(&headers, good, "ebeam_pz"), "-18");
    assert_eq!(field(&headers, good, "pbeam_pz"), "275");
    let q2: f64 = field(&headers, good, "q2").parse().expect("q2 not numeric");
    assert!(q2 > 0.0);
    let y: f64 = field(&headers, good, "y").parse().expect("y not numeric");
    assert!(y > 0.0 && y < 1.0);

    let empty = &rows[1];
    assert_eq!(field(&headers, empty, "evt"), "1");
    assert_eq!(field(&headers, empty, "q2"), "");
    assert_eq!(field(&headers, empty, "ebeam_px"), "");
}

#[test]
fn test_reco_dis_rows() {
    let mut event = dis_event();
    event.kinematics.insert(
        "InclusiveKinematicsElectron".to_string(),
        vec![InclusiveKinematics {
            x: 0.01,
            q2: 4.2,
            y: 0.6,
            nu: 1200.0,
            w: 60.0,
            scat_index: 0,
        }],
    );
    event.reco_particles.insert(
        RECO_FF_LAMBDAS.to_string(),
        vec![RecoParticle {
            pdg: PDG_LAMBDA,
            energy: 255.0,
            mass: 1.116,
            momentum: [0.55, -0.1, 254.0],
            ..Default::default()
        }],
    );

    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("reco_dis.csv");
    write_events(&input, &[event]);

    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_reco_dis(&args, &tx).expect("conversion failed");
    assert_eq!(summary.rows_written, 1);

    let (headers, rows) = read_table(&output);
    let row = &rows[0];
    assert_eq!(headers.len(), row.len());
    assert_eq!(field(&headers, row, "el_q2"), "4.2");
    // Methods without a collection in the event stay empty
    assert_eq!(field(&headers, row, "jb_x"), "");
    assert_eq!(field(&headers, row, "truth_w"), "");
    let t_truth: f64 = field(&headers, row, "t_truth")
        .parse()
        .expect("t_truth not numeric");
    assert!(t_truth < 0.0);
    let t_nominal: f64 = field(&headers, row, "t_nominal")
        .parse()
        .expect("t_nominal not numeric");
    assert!(t_nominal < 0.0);
    assert!(!field(&headers, row, "t_xangle").is_empty());
    assert_eq!(field(&headers, row, "escat_px"), "1.2");
}

#[test]
fn test_reco_ff_lambda_rows() {
    let mut event = Event::default();
    event.reco_particles.insert(
        RECO_FF_LAMBDAS.to_string(),
        vec![
            RecoParticle {
                pdg: PDG_LAMBDA,
                energy: 255.0,
                mass: 1.116,
                momentum: [0.55, -0.1, 254.0],
                covariance: [0.1, 0.0, 0.0, 0.1, 0.0, 0.1, 0.0, 0.0, 0.0, 0.2],
                particles: vec![1, 2, 3],
                ..Default::default()
            },
            RecoParticle {
                pdg: PDG_NEUTRON,
                energy: 230.0,
                ..Default::default()
            },
            RecoParticle {
                pdg: PDG_PHOTON,
                energy: 12.0,
                ..Default::default()
            },
            RecoParticle {
                pdg: PDG_PHOTON,
                energy: 13.0,
                ..Default::default()
            },
        ],
    );

    let dir = tempfile::tempdir().expect("could not create temp dir");
    let input = dir.path().join("events.ekev");
    let output = dir.path().join("reco_ff_lambda.csv");
    write_events(&input, &[event, Event::default()]);

    let args = ConverterArgs {
        inputs: vec![input],
        output: output.clone(),
        max_events: None,
    };
    let (tx, _rx) = channel();
    let summary = run_reco_ff_lambda(&args, &tx).expect("conversion failed");
    // The second event has no candidate collection and produces no row
    assert_eq!(summary.events_processed, 2);
    assert_eq!(summary.rows_written, 1);

    let (headers, rows) = read_table(&output);
    let row = &rows[0];
    assert_eq!(headers.len(), row.len());
    assert_eq!(field(&headers, row, "lam_pdg"), "3122");
    assert_eq!(field(&headers, row, "lam_cov_xx"), "0.1");
    assert_eq!(field(&headers, row, "lam_nparticles"), "3");
    assert_eq!(field(&headers, row, "neut_pdg"), "2112");
    assert_eq!(field(&headers, row, "gam1_energy"), "12");
    assert_eq!(field(&headers, row, "gam2_energy"), "13");
}
