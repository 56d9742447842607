//! Physics and format constants shared across the converters.

/// PDG species codes used by the decay taxonomy
pub const PDG_LAMBDA: i32 = 3122;
pub const PDG_PROTON: i32 = 2212;
pub const PDG_NEUTRON: i32 = 2112;
pub const PDG_PI_MINUS: i32 = -211;
pub const PDG_PI_ZERO: i32 = 111;
pub const PDG_PHOTON: i32 = 22;
pub const PDG_ELECTRON: i32 = 11;

/// HepMC-style generator status codes
pub const STATUS_STABLE: i32 = 1;
pub const STATUS_DECAYED: i32 = 2;
pub const STATUS_BEAM: i32 = 4;

/// Event container magic bytes
pub const CONTAINER_MAGIC: [u8; 4] = *b"EKEV";
/// Event container format version understood by this build
pub const CONTAINER_VERSION: u16 = 1;
/// Sentinel for "no referenced particle" in on-disk records
pub const NO_PARTICLE: u32 = u32::MAX;

/// Name of the MC-truth particle arena in every event
pub const MC_PARTICLES: &str = "MCParticles";
/// Name of the reconstructed far-forward lambda collection
pub const RECO_FF_LAMBDAS: &str = "ReconstructedFarForwardZDCLambdas";

/// Reconstruction methods of the inclusive-kinematics tables, as
/// (column prefix, collection name) pairs in output order
pub const KINEMATICS_METHODS: [(&str, &str); 7] = [
    ("el", "InclusiveKinematicsElectron"),
    ("jb", "InclusiveKinematicsJB"),
    ("da", "InclusiveKinematicsDA"),
    ("sigma", "InclusiveKinematicsSigma"),
    ("esigma", "InclusiveKinematicsESigma"),
    ("ml", "InclusiveKinematicsML"),
    ("truth", "InclusiveKinematicsTruth"),
];

/// Standard EIC hadron-ring momentum settings (GeV)
pub const HADRON_BEAM_SETTINGS_GEV: [f64; 4] = [41.0, 100.0, 130.0, 275.0];
/// Beam crossing angle in the x-z plane (radians)
pub const CROSSING_ANGLE_RAD: f64 = -0.025;
/// Proton mass (GeV)
pub const PROTON_MASS_GEV: f64 = 0.938272088;
