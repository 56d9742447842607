//! # eic_klambda
//!
//! eic_klambda is the analysis-converter library for the EIC kaon-lambda
//! production campaign. It reads detector-simulation event records from the
//! campaign's event container files, pattern-matches the Λ⁰ decay trees
//! (Λ → p π⁻ and Λ → n π⁰ with π⁰ → γ γ), and writes flat CSV tables for
//! downstream statistical analysis.
//!
//! ## Programs
//!
//! The `eic_klambda_cli` crate ships one small binary per table:
//!
//! - `mcpart_lambda` -- first matched Λ decay per event from MC truth
//! - `mcpart_lambda_all` -- every matched Λ (no first-lambda break)
//! - `lambda_acceptance` -- MC-truth decays with per-subsystem detection
//!   flags and per-role hit side tables
//! - `mc_dis` -- truth-level DIS kinematics (x, Q², y, ν, W, s)
//! - `reco_dis` -- per-algorithm reconstructed DIS kinematics plus
//!   momentum-transfer values under several beam-knowledge assumptions
//! - `reco_ff_lambda` -- reconstructed far-forward Λ candidates with their
//!   neutron and photon sub-particles
//!
//! All binaries share the same surface:
//!
//! ```text
//! <prog> [-n N] [-o OUTFILE] INPUT...
//! ```
//!
//! `-n N` caps the total number of events processed across all inputs
//! combined; `-o` overrides the per-program default output path. An input
//! file that cannot be opened is reported and skipped; a primary output
//! that cannot be created is fatal. `lambda_acceptance` additionally takes
//! `-d/--detectors` pointing at a YAML subsystem list; without it the
//! bundled default list is used.
//!
//! ## Event container format
//!
//! Input files are little-endian binary containers with a fixed header
//! (magic `EKEV`, format version, event count) followed by one record per
//! event. Each event is a set of name-keyed collections of typed records:
//! MC particles, tracker hits, calorimeter hits (with per-particle
//! contributions), reconstructed particles, and per-algorithm inclusive
//! kinematics. Parent/daughter and sub-particle references are plain
//! indices into the owning collection.
//!
//! Both a reader ([`event_file::EventFile`]) and a writer
//! ([`event_file::EventWriter`]) are provided; the writer is what the
//! campaign's upstream translation step and this crate's tests use to
//! produce container files.
//!
//! ## Output
//!
//! Every table is a plain CSV file whose first line is the header. An
//! absent particle role occupies exactly as many empty fields as a present
//! one, so column alignment is independent of the decay channel. The `evt`
//! column is the file-local event index and restarts at zero for every
//! input file; downstream consumers joining across files must re-offset it
//! themselves.
pub mod classify;
pub mod constants;
pub mod detectors;
pub mod error;
pub mod event;
pub mod event_file;
pub mod flatten;
pub mod kinematics;
pub mod process;
pub mod status;
pub mod table;
