use super::event::{McParticle, RecoParticle};

/// MC-truth field names, in row order. `mc_headers` and `mc_row` both
/// derive their field count from this list, which keeps the present and
/// absent branches in lock-step: a mismatch would silently misalign every
/// downstream column.
pub const MC_FIELDS: [&str; 15] = [
    "id", "pdg", "gen_status", "sim_status", "px", "py", "pz", "vx", "vy", "vz", "ex", "ey", "ez",
    "time", "ndau",
];

/// Reconstructed-particle field names, in row order
pub const RECO_FIELDS: [&str; 17] = [
    "id",
    "pdg",
    "charge",
    "energy",
    "mass",
    "px",
    "py",
    "pz",
    "rx",
    "ry",
    "rz",
    "pid_goodness",
    "type",
    "nclusters",
    "ntracks",
    "nparticles",
    "npids",
];

/// Covariance-matrix field names appended by the covariance variant
pub const RECO_COV_FIELDS: [&str; 10] = [
    "cov_xx", "cov_xy", "cov_xz", "cov_yy", "cov_yz", "cov_zz", "cov_xt", "cov_yt", "cov_zt",
    "cov_tt",
];

/// Header names for one MC-particle role, e.g. `lam_id, lam_pdg, ...`
pub fn mc_headers(prefix: &str) -> Vec<String> {
    MC_FIELDS
        .iter()
        .map(|field| format!("{prefix}_{field}"))
        .collect()
}

/// Flatten the MC particle at `index` into its fixed row fields.
///
/// An absent role (or an index outside the arena) produces exactly
/// `MC_FIELDS.len()` empty fields.
pub fn mc_row(particles: &[McParticle], index: Option<u32>) -> Vec<String> {
    let absent = vec![String::new(); MC_FIELDS.len()];
    let index = match index {
        Some(i) => i,
        None => return absent,
    };
    let p = match particles.get(index as usize) {
        Some(p) => p,
        None => return absent,
    };
    vec![
        index.to_string(),
        p.pdg.to_string(),
        p.generator_status.to_string(),
        p.simulator_status.to_string(),
        p.momentum[0].to_string(),
        p.momentum[1].to_string(),
        p.momentum[2].to_string(),
        p.vertex[0].to_string(),
        p.vertex[1].to_string(),
        p.vertex[2].to_string(),
        p.endpoint[0].to_string(),
        p.endpoint[1].to_string(),
        p.endpoint[2].to_string(),
        p.time.to_string(),
        p.daughters.len().to_string(),
    ]
}

/// Header names for one reconstructed-particle role.
///
/// The covariance variant is a distinct schema used only where the full
/// error matrix is written; it is never mixed with the MC-truth layout.
pub fn reco_headers(prefix: &str, with_covariance: bool) -> Vec<String> {
    let mut headers: Vec<String> = RECO_FIELDS
        .iter()
        .map(|field| format!("{prefix}_{field}"))
        .collect();
    if with_covariance {
        headers.extend(RECO_COV_FIELDS.iter().map(|field| format!("{prefix}_{field}")));
    }
    headers
}

/// Flatten the reconstructed particle at `index` into its fixed row fields
pub fn reco_row(particles: &[RecoParticle], index: Option<u32>, with_covariance: bool) -> Vec<String> {
    let n_fields = RECO_FIELDS.len()
        + if with_covariance {
            RECO_COV_FIELDS.len()
        } else {
            0
        };
    let absent = vec![String::new(); n_fields];
    let index = match index {
        Some(i) => i,
        None => return absent,
    };
    let p = match particles.get(index as usize) {
        Some(p) => p,
        None => return absent,
    };
    let mut row = vec![
        index.to_string(),
        p.pdg.to_string(),
        p.charge.to_string(),
        p.energy.to_string(),
        p.mass.to_string(),
        p.momentum[0].to_string(),
        p.momentum[1].to_string(),
        p.momentum[2].to_string(),
        p.reference_point[0].to_string(),
        p.reference_point[1].to_string(),
        p.reference_point[2].to_string(),
        p.goodness_of_pid.to_string(),
        p.particle_type.to_string(),
        p.n_clusters.to_string(),
        p.n_tracks.to_string(),
        p.particles.len().to_string(),
        p.n_pids.to_string(),
    ];
    if with_covariance {
        row.extend(p.covariance.iter().map(|value| value.to_string()));
    }
    row
}
