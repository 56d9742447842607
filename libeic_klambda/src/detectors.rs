use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::DetectorConfigError;
use super::event::Event;

/// Which attribution rule a subsystem's hit collection uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Tracker,
    Calorimeter,
}

/// One far-forward subsystem checked by the acceptance converters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSpec {
    pub label: String,
    pub collection: String,
    pub kind: DetectorKind,
}

/// Load the default subsystem list bundled with the converters
fn load_default_config() -> String {
    String::from(include_str!("data/default_detectors.yaml"))
}

/// The ordered list of far-forward subsystems checked for hits.
///
/// The list changes between campaigns, so it is read from a YAML file where
/// each entry names the output column label, the hit collection to search,
/// and the attribution rule to apply. The order of entries fixes the order
/// of the flag columns in the acceptance tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub detectors: Vec<DetectorSpec>,
}

impl DetectorConfig {
    /// Create a new DetectorConfig
    /// If the path is None, we load the default that is bundled with the converters
    pub fn new(path: Option<&Path>) -> Result<Self, DetectorConfigError> {
        let mut contents = String::new();
        if let Some(p) = path {
            if !p.exists() {
                return Err(DetectorConfigError::BadFilePath(p.to_path_buf()));
            }
            let mut file = File::open(p)?;
            file.read_to_string(&mut contents)?;
        } else {
            contents = load_default_config();
        }
        let config = serde_yaml::from_str::<Self>(&contents)?;
        if config.detectors.is_empty() {
            return Err(DetectorConfigError::Empty);
        }
        Ok(config)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.detectors.iter().map(|spec| spec.label.as_str())
    }
}

/// One attributed hit, recorded to a role's side table
#[derive(Debug, Clone)]
pub struct HitRecord {
    pub detector: String,
    pub hit: usize,
    pub position: [f64; 3],
    pub energy: f32,
    pub time: f64,
    pub path_length: Option<f32>,
}

/// Per-detector hit flags for one particle role, parallel to the config's
/// subsystem order. Flags are independent: a particle may be seen by any
/// number of subsystems at once.
#[derive(Debug, Clone, Default)]
pub struct DetectionFlags {
    pub flags: Vec<bool>,
}

impl DetectionFlags {
    pub fn any(&self) -> bool {
        self.flags.iter().any(|flag| *flag)
    }
}

/// Collect the hits one subsystem attributes to the MC particle at `particle`.
///
/// Tracker hits match on their direct contributing-particle link.
/// Calorimeter hits match when any contribution references the particle;
/// the recorded time is the first matching contribution's, and the recorded
/// energy is the hit total. A collection missing from the event yields no
/// hits rather than an error.
pub fn hits_for_particle(event: &Event, spec: &DetectorSpec, particle: u32) -> Vec<HitRecord> {
    match spec.kind {
        DetectorKind::Tracker => {
            let hits = match event.tracker_collection(&spec.collection) {
                Some(hits) => hits,
                None => return Vec::new(),
            };
            hits.iter()
                .enumerate()
                .filter(|(_, hit)| hit.particle == particle)
                .map(|(index, hit)| HitRecord {
                    detector: spec.label.clone(),
                    hit: index,
                    position: hit.position,
                    energy: hit.edep,
                    time: hit.time,
                    path_length: Some(hit.path_length),
                })
                .collect()
        }
        DetectorKind::Calorimeter => {
            let hits = match event.calo_collection(&spec.collection) {
                Some(hits) => hits,
                None => return Vec::new(),
            };
            hits.iter()
                .enumerate()
                .filter_map(|(index, hit)| {
                    hit.contributions
                        .iter()
                        .find(|contribution| contribution.particle == particle)
                        .map(|contribution| HitRecord {
                            detector: spec.label.clone(),
                            hit: index,
                            position: hit.position,
                            energy: hit.energy,
                            time: contribution.time,
                            path_length: None,
                        })
                })
                .collect()
        }
    }
}

/// Check every configured subsystem for the particle, pushing attributed
/// hits into `hits_out` and returning the per-detector flags
pub fn detect_particle(
    event: &Event,
    config: &DetectorConfig,
    particle: u32,
    hits_out: &mut Vec<HitRecord>,
) -> DetectionFlags {
    let mut flags = DetectionFlags::default();
    for spec in &config.detectors {
        let hits = hits_for_particle(event, spec, particle);
        flags.flags.push(!hits.is_empty());
        hits_out.extend(hits);
    }
    flags
}
