//! DIS kinematics from Monte Carlo truth and momentum-transfer values
//! under the campaign's beam-knowledge assumptions.

use nalgebra::Vector3;
use std::ops::{Add, Sub};

use super::constants::{
    CROSSING_ANGLE_RAD, HADRON_BEAM_SETTINGS_GEV, PDG_ELECTRON, PDG_PROTON, PROTON_MASS_GEV,
    STATUS_BEAM, STATUS_STABLE,
};
use super::event::{McParticle, RecoParticle};

/// Relativistic four-momentum with explicit energy component
#[derive(Debug, Clone, Copy)]
pub struct FourMomentum {
    pub p: Vector3<f64>,
    pub e: f64,
}

impl FourMomentum {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            p: Vector3::new(px, py, pz),
            e,
        }
    }

    pub fn from_mc(particle: &McParticle) -> Self {
        let [px, py, pz] = particle.momentum;
        Self::new(px, py, pz, particle.energy())
    }

    pub fn from_reco(particle: &RecoParticle) -> Self {
        let [px, py, pz] = particle.momentum;
        Self::new(px as f64, py as f64, pz as f64, particle.energy as f64)
    }

    /// Minkowski inner product, metric (+,−,−,−)
    pub fn dot(&self, other: &FourMomentum) -> f64 {
        self.e * other.e - self.p.dot(&other.p)
    }

    /// Invariant mass squared
    pub fn m2(&self) -> f64 {
        self.dot(self)
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;
    fn add(self, other: FourMomentum) -> FourMomentum {
        FourMomentum {
            p: self.p + other.p,
            e: self.e + other.e,
        }
    }
}

impl Sub for FourMomentum {
    type Output = FourMomentum;
    fn sub(self, other: FourMomentum) -> FourMomentum {
        FourMomentum {
            p: self.p - other.p,
            e: self.e - other.e,
        }
    }
}

/// Indices of the beam electron and beam hadron, in that order
pub fn find_beams(particles: &[McParticle]) -> Option<(u32, u32)> {
    let electron = particles
        .iter()
        .position(|p| p.pdg == PDG_ELECTRON && p.generator_status == STATUS_BEAM)?;
    let hadron = particles
        .iter()
        .position(|p| p.pdg == PDG_PROTON && p.generator_status == STATUS_BEAM)?;
    Some((electron as u32, hadron as u32))
}

/// Index of the scattered electron: the highest-energy final-state electron.
/// Deterministic under reordering of the particle collection, unlike a
/// take-the-first rule.
pub fn find_scattered_electron(particles: &[McParticle]) -> Option<u32> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.pdg == PDG_ELECTRON && p.generator_status == STATUS_STABLE)
        .max_by(|(_, a), (_, b)| a.energy().total_cmp(&b.energy()))
        .map(|(index, _)| index as u32)
}

/// Truth-level DIS kinematics for one event
#[derive(Debug, Clone)]
pub struct DisTruth {
    pub beam_electron: u32,
    pub beam_hadron: u32,
    pub scat_electron: u32,
    pub x: f64,
    pub q2: f64,
    pub y: f64,
    pub nu: f64,
    pub w: f64,
    pub s: f64,
}

/// Compute truth DIS kinematics. With k, P, k' the beam-electron,
/// beam-hadron, and scattered-electron four-momenta and q = k − k':
/// Q² = −q·q, ν = P·q / M, x = Q² / 2P·q, y = P·q / P·k,
/// W = √max(0, (P+q)²), s = (P+k)².
///
/// Returns None when the beams or the scattered electron are missing, or
/// the event is degenerate (P·q or P·k vanishing).
pub fn dis_truth(particles: &[McParticle]) -> Option<DisTruth> {
    let (beam_electron, beam_hadron) = find_beams(particles)?;
    let scat_electron = find_scattered_electron(particles)?;

    let k = FourMomentum::from_mc(&particles[beam_electron as usize]);
    let p = FourMomentum::from_mc(&particles[beam_hadron as usize]);
    let kp = FourMomentum::from_mc(&particles[scat_electron as usize]);

    let q = k - kp;
    let p_dot_q = p.dot(&q);
    let p_dot_k = p.dot(&k);
    if p_dot_q == 0.0 || p_dot_k == 0.0 {
        return None;
    }

    let mass = particles[beam_hadron as usize].mass;
    Some(DisTruth {
        beam_electron,
        beam_hadron,
        scat_electron,
        x: -q.m2() / (2.0 * p_dot_q),
        q2: -q.m2(),
        y: p_dot_q / p_dot_k,
        nu: p_dot_q / mass,
        w: (p + q).m2().max(0.0).sqrt(),
        s: (p + k).m2(),
    })
}

/// Squared momentum transfer to the Λ: t = (P_beam − P_Λ)²
pub fn momentum_transfer(beam: &FourMomentum, lambda: &FourMomentum) -> f64 {
    (*beam - *lambda).m2()
}

/// Nominal hadron beam: the truth magnitude rounded to the nearest standard
/// ring setting, taken head-on along +z
pub fn nominal_hadron_beam(truth_momentum_gev: f64) -> FourMomentum {
    let mut pz = HADRON_BEAM_SETTINGS_GEV[0];
    for setting in HADRON_BEAM_SETTINGS_GEV {
        if (setting - truth_momentum_gev).abs() < (pz - truth_momentum_gev).abs() {
            pz = setting;
        }
    }
    let e = (pz * pz + PROTON_MASS_GEV * PROTON_MASS_GEV).sqrt();
    FourMomentum::new(0.0, 0.0, pz, e)
}

/// Nominal hadron beam rotated by the crossing angle in the x-z plane
pub fn crossed_hadron_beam(truth_momentum_gev: f64) -> FourMomentum {
    let head_on = nominal_hadron_beam(truth_momentum_gev);
    let pz = head_on.p.z;
    FourMomentum::new(
        pz * CROSSING_ANGLE_RAD.sin(),
        0.0,
        pz * CROSSING_ANGLE_RAD.cos(),
        head_on.e,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PDG_LAMBDA, STATUS_DECAYED};

    const ELECTRON_MASS_GEV: f64 = 0.000511;

    fn beam_event() -> Vec<McParticle> {
        vec![
            McParticle {
                pdg: PDG_ELECTRON,
                generator_status: STATUS_BEAM,
                mass: ELECTRON_MASS_GEV,
                momentum: [0.0, 0.0, -18.0],
                ..Default::default()
            },
            McParticle {
                pdg: PDG_PROTON,
                generator_status: STATUS_BEAM,
                mass: PROTON_MASS_GEV,
                momentum: [0.0, 0.0, 275.0],
                ..Default::default()
            },
            McParticle {
                pdg: PDG_ELECTRON,
                generator_status: STATUS_STABLE,
                mass: ELECTRON_MASS_GEV,
                momentum: [1.2, 0.4, -14.0],
                ..Default::default()
            },
            McParticle {
                pdg: PDG_LAMBDA,
                generator_status: STATUS_DECAYED,
                mass: 1.115683,
                momentum: [0.6, -0.1, 260.0],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_dis_truth_physical_ranges() {
        let particles = beam_event();
        let dis = dis_truth(&particles).expect("truth kinematics should exist");
        assert_eq!(dis.beam_electron, 0);
        assert_eq!(dis.beam_hadron, 1);
        assert_eq!(dis.scat_electron, 2);
        assert!(dis.q2 > 0.0);
        assert!(dis.x > 0.0 && dis.x < 1.0);
        assert!(dis.y > 0.0 && dis.y < 1.0);
        assert!(dis.nu > 0.0);
        assert!(dis.w > 0.0);
        // s ≈ 4 E_e E_p for anti-parallel beams
        assert!((dis.s - 4.0 * 18.0 * 275.0).abs() / dis.s < 0.01);
    }

    #[test]
    fn test_dis_truth_requires_beams() {
        let mut particles = beam_event();
        particles.remove(1);
        assert!(dis_truth(&particles).is_none());
    }

    #[test]
    fn test_scattered_electron_is_highest_energy() {
        let mut particles = beam_event();
        particles.push(McParticle {
            pdg: PDG_ELECTRON,
            generator_status: STATUS_STABLE,
            mass: ELECTRON_MASS_GEV,
            momentum: [0.0, 0.0, -0.5],
            ..Default::default()
        });
        assert_eq!(find_scattered_electron(&particles), Some(2));
    }

    #[test]
    fn test_momentum_transfer_is_negative() {
        let particles = beam_event();
        let beam = FourMomentum::from_mc(&particles[1]);
        let lambda = FourMomentum::from_mc(&particles[3]);
        assert!(momentum_transfer(&beam, &lambda) < 0.0);
    }

    #[test]
    fn test_nominal_beam_rounds_to_ring_setting() {
        assert_eq!(nominal_hadron_beam(273.4).p.z, 275.0);
        assert_eq!(nominal_hadron_beam(99.0).p.z, 100.0);
        assert_eq!(nominal_hadron_beam(60.0).p.z, 41.0);
    }

    #[test]
    fn test_crossed_beam_keeps_magnitude() {
        let crossed = crossed_hadron_beam(275.0);
        assert!(crossed.p.x < 0.0);
        assert!((crossed.p.norm() - 275.0).abs() < 1e-9);
        assert_eq!(crossed.e, nominal_hadron_beam(275.0).e);
    }
}
