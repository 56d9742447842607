use fxhash::FxHashMap;

use super::constants::MC_PARTICLES;

/// One simulated (Monte Carlo truth) particle.
///
/// Daughter and parent links are plain indices into the owning event's
/// particle collection; the collection is the arena and no record owns
/// another. Indices are validated at the point of use, never on read.
#[derive(Debug, Clone, Default)]
pub struct McParticle {
    pub pdg: i32,
    pub generator_status: i32,
    pub simulator_status: i32,
    pub charge: f32,
    pub mass: f64,
    pub momentum: [f64; 3],
    pub vertex: [f64; 3],
    pub endpoint: [f64; 3],
    pub time: f64,
    pub daughters: Vec<u32>,
    pub parents: Vec<u32>,
}

impl McParticle {
    /// Total energy from the on-shell relation
    pub fn energy(&self) -> f64 {
        let [px, py, pz] = self.momentum;
        (self.mass * self.mass + px * px + py * py + pz * pz).sqrt()
    }
}

/// A single tracker hit with a direct link to the MC particle that caused it
#[derive(Debug, Clone, Default)]
pub struct TrackerHit {
    pub cell_id: u64,
    pub position: [f64; 3],
    pub edep: f32,
    pub time: f64,
    pub path_length: f32,
    pub particle: u32,
}

/// One particle's contribution to a calorimeter hit
#[derive(Debug, Clone, Default)]
pub struct CaloContribution {
    pub particle: u32,
    pub energy: f32,
    pub time: f64,
}

/// A calorimeter hit; several particles may contribute to the same cell
#[derive(Debug, Clone, Default)]
pub struct CaloHit {
    pub cell_id: u64,
    pub position: [f64; 3],
    pub energy: f32,
    pub time: f64,
    pub contributions: Vec<CaloContribution>,
}

/// A reconstructed composite particle. Sub-particle links are indices into
/// the same reconstructed collection.
#[derive(Debug, Clone)]
pub struct RecoParticle {
    pub pdg: i32,
    pub charge: f32,
    pub energy: f32,
    pub mass: f32,
    pub momentum: [f32; 3],
    pub reference_point: [f32; 3],
    pub goodness_of_pid: f32,
    pub particle_type: i32,
    pub covariance: [f32; 10],
    pub n_clusters: u16,
    pub n_tracks: u16,
    pub n_pids: u16,
    pub particles: Vec<u32>,
}

impl Default for RecoParticle {
    fn default() -> Self {
        Self {
            pdg: 0,
            charge: 0.0,
            energy: 0.0,
            mass: 0.0,
            momentum: [0.0; 3],
            reference_point: [0.0; 3],
            goodness_of_pid: 0.0,
            particle_type: 0,
            covariance: [0.0; 10],
            n_clusters: 0,
            n_tracks: 0,
            n_pids: 0,
            particles: Vec::new(),
        }
    }
}

/// Per-algorithm inclusive DIS kinematics produced by the reconstruction
#[derive(Debug, Clone, Default)]
pub struct InclusiveKinematics {
    pub x: f32,
    pub q2: f32,
    pub y: f32,
    pub nu: f32,
    pub w: f32,
    pub scat_index: u32,
}

/// One bunch-crossing record: name-keyed collections of typed records.
///
/// Events are produced by the [`EventFile`](crate::event_file::EventFile)
/// reader, consumed once by a converter, and dropped before the next read.
/// A collection that is absent from the file simply reads as missing here;
/// callers treat that as "not present", never as an error.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub mc_collections: FxHashMap<String, Vec<McParticle>>,
    pub tracker_hits: FxHashMap<String, Vec<TrackerHit>>,
    pub calo_hits: FxHashMap<String, Vec<CaloHit>>,
    pub reco_particles: FxHashMap<String, Vec<RecoParticle>>,
    pub kinematics: FxHashMap<String, Vec<InclusiveKinematics>>,
}

impl Event {
    /// The event's primary MC-truth arena. A missing collection reads as empty.
    pub fn mc_particles(&self) -> &[McParticle] {
        self.mc_collections
            .get(MC_PARTICLES)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tracker_collection(&self, name: &str) -> Option<&[TrackerHit]> {
        self.tracker_hits.get(name).map(Vec::as_slice)
    }

    pub fn calo_collection(&self, name: &str) -> Option<&[CaloHit]> {
        self.calo_hits.get(name).map(Vec::as_slice)
    }

    pub fn reco_collection(&self, name: &str) -> Option<&[RecoParticle]> {
        self.reco_particles.get(name).map(Vec::as_slice)
    }

    pub fn kinematics_collection(&self, name: &str) -> Option<&[InclusiveKinematics]> {
        self.kinematics.get(name).map(Vec::as_slice)
    }
}
