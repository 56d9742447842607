use super::constants::{PDG_LAMBDA, PDG_NEUTRON, PDG_PI_MINUS, PDG_PI_ZERO, PDG_PROTON};
use super::event::McParticle;

/// Decay-channel taxonomy for a matched Λ⁰.
///
/// Exactly one variant is assigned per Λ. The role bindings of a
/// [`DecayRecord`] are only ever populated for `Charged` and `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayChannel {
    /// No daughters; the Λ left the instrumented volume before decaying
    NotDecayed,
    /// Λ → p π⁻
    Charged,
    /// Λ → n π⁰
    Neutral,
    /// A daughter is itself a Λ; re-interaction artifact of the simulation
    Shower,
    /// Any other daughter combination
    Other,
}

impl DecayChannel {
    /// Integer code written to the `channel` CSV column
    pub fn code(&self) -> i32 {
        match self {
            DecayChannel::NotDecayed => 0,
            DecayChannel::Charged => 1,
            DecayChannel::Neutral => 2,
            DecayChannel::Shower => 3,
            DecayChannel::Other => 4,
        }
    }
}

/// A matched Λ and its bound decay roles.
///
/// Role fields are indices into the same MC-particle arena the Λ came from.
/// For the charged channel only `prot`/`pimin` are bound; for the neutral
/// channel `neut`/`pizero` are bound and `gam1`/`gam2` follow from the π⁰'s
/// own daughter list when present.
#[derive(Debug, Clone)]
pub struct DecayRecord {
    pub channel: DecayChannel,
    pub lam: u32,
    pub prot: Option<u32>,
    pub pimin: Option<u32>,
    pub neut: Option<u32>,
    pub pizero: Option<u32>,
    pub gam1: Option<u32>,
    pub gam2: Option<u32>,
}

impl DecayRecord {
    fn unbound(lam: u32, channel: DecayChannel) -> Self {
        Self {
            channel,
            lam,
            prot: None,
            pimin: None,
            neut: None,
            pizero: None,
            gam1: None,
            gam2: None,
        }
    }
}

/// Indices of all Λ⁰ in the collection, in storage order
pub fn find_lambdas(particles: &[McParticle]) -> Vec<u32> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.pdg == PDG_LAMBDA)
        .map(|(index, _)| index as u32)
        .collect()
}

/// Classify the decay of the Λ at index `lam`.
///
/// Daughter indices that fall outside the arena are ignored. Two daughters
/// matching neither expected pair classify as `Other`; a Λ daughter at any
/// multiplicity classifies as `Shower`. This never fails: unmatched roles
/// are simply left unbound.
pub fn classify_lambda(particles: &[McParticle], lam: u32) -> DecayRecord {
    let lambda = match particles.get(lam as usize) {
        Some(p) => p,
        None => return DecayRecord::unbound(lam, DecayChannel::Other),
    };

    let daughters: Vec<u32> = lambda
        .daughters
        .iter()
        .copied()
        .filter(|d| (*d as usize) < particles.len())
        .collect();

    if daughters.is_empty() {
        return DecayRecord::unbound(lam, DecayChannel::NotDecayed);
    }

    if daughters.len() == 2 {
        let (first, second) = (daughters[0], daughters[1]);
        let pdgs = (
            particles[first as usize].pdg,
            particles[second as usize].pdg,
        );
        // Bind roles by species code, not by daughter slot
        let charged = match pdgs {
            (PDG_PROTON, PDG_PI_MINUS) => Some((first, second)),
            (PDG_PI_MINUS, PDG_PROTON) => Some((second, first)),
            _ => None,
        };
        if let Some((prot, pimin)) = charged {
            let mut record = DecayRecord::unbound(lam, DecayChannel::Charged);
            record.prot = Some(prot);
            record.pimin = Some(pimin);
            return record;
        }
        let neutral = match pdgs {
            (PDG_NEUTRON, PDG_PI_ZERO) => Some((first, second)),
            (PDG_PI_ZERO, PDG_NEUTRON) => Some((second, first)),
            _ => None,
        };
        if let Some((neut, pizero)) = neutral {
            let mut record = DecayRecord::unbound(lam, DecayChannel::Neutral);
            record.neut = Some(neut);
            record.pizero = Some(pizero);
            // π⁰ → γγ is assumed; photons beyond the first two are dropped
            let photons: Vec<u32> = particles[pizero as usize]
                .daughters
                .iter()
                .copied()
                .filter(|d| (*d as usize) < particles.len())
                .collect();
            record.gam1 = photons.first().copied();
            record.gam2 = photons.get(1).copied();
            return record;
        }
    }

    // Everything else is unclassified; a Λ daughter marks a shower artifact
    if daughters
        .iter()
        .any(|d| particles[*d as usize].pdg == PDG_LAMBDA)
    {
        DecayRecord::unbound(lam, DecayChannel::Shower)
    } else {
        DecayRecord::unbound(lam, DecayChannel::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PDG_PHOTON;

    fn particle(pdg: i32, daughters: Vec<u32>) -> McParticle {
        McParticle {
            pdg,
            daughters,
            ..Default::default()
        }
    }

    fn assert_no_roles(record: &DecayRecord) {
        assert!(record.prot.is_none());
        assert!(record.pimin.is_none());
        assert!(record.neut.is_none());
        assert!(record.pizero.is_none());
        assert!(record.gam1.is_none());
        assert!(record.gam2.is_none());
    }

    #[test]
    fn test_not_decayed() {
        let particles = vec![particle(PDG_LAMBDA, vec![])];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::NotDecayed);
        assert_no_roles(&record);
    }

    #[test]
    fn test_charged_channel_slot_order_independent() {
        for swapped in [false, true] {
            let daughters = if swapped { vec![2, 1] } else { vec![1, 2] };
            let particles = vec![
                particle(PDG_LAMBDA, daughters),
                particle(PDG_PROTON, vec![]),
                particle(PDG_PI_MINUS, vec![]),
            ];
            let record = classify_lambda(&particles, 0);
            assert_eq!(record.channel, DecayChannel::Charged);
            assert_eq!(record.prot, Some(1));
            assert_eq!(record.pimin, Some(2));
            assert!(record.neut.is_none());
            assert!(record.pizero.is_none());
        }
    }

    #[test]
    fn test_neutral_channel_with_photons() {
        for swapped in [false, true] {
            let daughters = if swapped { vec![2, 1] } else { vec![1, 2] };
            let particles = vec![
                particle(PDG_LAMBDA, daughters),
                particle(PDG_NEUTRON, vec![]),
                particle(PDG_PI_ZERO, vec![3, 4]),
                particle(PDG_PHOTON, vec![]),
                particle(PDG_PHOTON, vec![]),
            ];
            let record = classify_lambda(&particles, 0);
            assert_eq!(record.channel, DecayChannel::Neutral);
            assert_eq!(record.neut, Some(1));
            assert_eq!(record.pizero, Some(2));
            assert_eq!(record.gam1, Some(3));
            assert_eq!(record.gam2, Some(4));
            assert!(record.prot.is_none());
            assert!(record.pimin.is_none());
        }
    }

    #[test]
    fn test_neutral_channel_undecayed_pizero() {
        let particles = vec![
            particle(PDG_LAMBDA, vec![1, 2]),
            particle(PDG_NEUTRON, vec![]),
            particle(PDG_PI_ZERO, vec![]),
        ];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::Neutral);
        assert_eq!(record.neut, Some(1));
        assert_eq!(record.pizero, Some(2));
        assert!(record.gam1.is_none());
        assert!(record.gam2.is_none());
    }

    #[test]
    fn test_extra_photons_dropped() {
        let particles = vec![
            particle(PDG_LAMBDA, vec![1, 2]),
            particle(PDG_NEUTRON, vec![]),
            particle(PDG_PI_ZERO, vec![3, 4, 5]),
            particle(PDG_PHOTON, vec![]),
            particle(PDG_PHOTON, vec![]),
            particle(PDG_PHOTON, vec![]),
        ];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::Neutral);
        assert_eq!(record.gam1, Some(3));
        assert_eq!(record.gam2, Some(4));
    }

    #[test]
    fn test_unmatched_pair_is_other() {
        let particles = vec![
            particle(PDG_LAMBDA, vec![1, 2]),
            particle(PDG_PROTON, vec![]),
            particle(PDG_PROTON, vec![]),
        ];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::Other);
        assert_no_roles(&record);
    }

    #[test]
    fn test_lambda_daughter_is_shower() {
        let particles = vec![
            particle(PDG_LAMBDA, vec![1, 2]),
            particle(PDG_LAMBDA, vec![]),
            particle(PDG_PI_ZERO, vec![]),
        ];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::Shower);
        assert_no_roles(&record);
    }

    #[test]
    fn test_three_daughters_is_other() {
        let particles = vec![
            particle(PDG_LAMBDA, vec![1, 2, 3]),
            particle(PDG_PROTON, vec![]),
            particle(PDG_PI_MINUS, vec![]),
            particle(PDG_PHOTON, vec![]),
        ];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::Other);
        assert_no_roles(&record);
    }

    #[test]
    fn test_out_of_range_daughters_ignored() {
        let particles = vec![particle(PDG_LAMBDA, vec![7, 9])];
        let record = classify_lambda(&particles, 0);
        assert_eq!(record.channel, DecayChannel::NotDecayed);
        assert_no_roles(&record);
    }

    #[test]
    fn test_find_lambdas() {
        let particles = vec![
            particle(PDG_PROTON, vec![]),
            particle(PDG_LAMBDA, vec![]),
            particle(PDG_PHOTON, vec![]),
            particle(PDG_LAMBDA, vec![]),
        ];
        assert_eq!(find_lambdas(&particles), vec![1, 3]);
    }
}
