use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::constants::{CONTAINER_MAGIC, CONTAINER_VERSION};
use super::error::{EventFileError, EventWriterError};
use super::event::{
    CaloContribution, CaloHit, Event, InclusiveKinematics, McParticle, RecoParticle, TrackerHit,
};

// Collection kind tags in the container format
const KIND_MC_PARTICLE: u8 = 0;
const KIND_TRACKER_HIT: u8 = 1;
const KIND_CALO_HIT: u8 = 2;
const KIND_RECO_PARTICLE: u8 = 3;
const KIND_KINEMATICS: u8 = 4;

// Byte offset of the event-count header field, patched by the writer on close
const EVENT_COUNT_OFFSET: u64 = 6;

/// Sequential reader for the event container format.
///
/// The header carries the total number of events in the file; `next_event`
/// returns `EventFileError::EndOfFile` once they have all been consumed,
/// which the converter drivers use as their loop sentinel.
#[derive(Debug)]
pub struct EventFile {
    handle: BufReader<File>,
    path: PathBuf,
    event_count: u32,
    events_read: u32,
}

impl EventFile {
    /// Open a container file and validate its header
    pub fn new(path: &Path) -> Result<Self, EventFileError> {
        if !path.exists() {
            return Err(EventFileError::BadFilePath(path.to_path_buf()));
        }
        let mut handle = BufReader::new(File::open(path)?);
        let mut magic = [0u8; 4];
        handle.read_exact(&mut magic)?;
        if magic != CONTAINER_MAGIC {
            return Err(EventFileError::BadMagic(path.to_path_buf()));
        }
        let version = handle.read_u16::<LittleEndian>()?;
        if version != CONTAINER_VERSION {
            return Err(EventFileError::UnsupportedVersion(version));
        }
        let event_count = handle.read_u32::<LittleEndian>()?;
        Ok(Self {
            handle,
            path: path.to_path_buf(),
            event_count,
            events_read: 0,
        })
    }

    /// Total number of events stored in this file
    pub fn event_count(&self) -> u32 {
        self.event_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next event record
    pub fn next_event(&mut self) -> Result<Event, EventFileError> {
        if self.events_read == self.event_count {
            return Err(EventFileError::EndOfFile);
        }
        let mut event = Event::default();
        let n_collections = self.handle.read_u16::<LittleEndian>()?;
        for _ in 0..n_collections {
            let kind = self.handle.read_u8()?;
            let name = self.read_name()?;
            let n_records = self.handle.read_u32::<LittleEndian>()? as usize;
            match kind {
                KIND_MC_PARTICLE => {
                    let mut records = Vec::with_capacity(n_records);
                    for _ in 0..n_records {
                        records.push(self.read_mc_particle()?);
                    }
                    event.mc_collections.insert(name, records);
                }
                KIND_TRACKER_HIT => {
                    let mut records = Vec::with_capacity(n_records);
                    for _ in 0..n_records {
                        records.push(self.read_tracker_hit()?);
                    }
                    event.tracker_hits.insert(name, records);
                }
                KIND_CALO_HIT => {
                    let mut records = Vec::with_capacity(n_records);
                    for _ in 0..n_records {
                        records.push(self.read_calo_hit()?);
                    }
                    event.calo_hits.insert(name, records);
                }
                KIND_RECO_PARTICLE => {
                    let mut records = Vec::with_capacity(n_records);
                    for _ in 0..n_records {
                        records.push(self.read_reco_particle()?);
                    }
                    event.reco_particles.insert(name, records);
                }
                KIND_KINEMATICS => {
                    let mut records = Vec::with_capacity(n_records);
                    for _ in 0..n_records {
                        records.push(self.read_kinematics()?);
                    }
                    event.kinematics.insert(name, records);
                }
                _ => return Err(EventFileError::UnknownCollectionKind(kind)),
            }
        }
        self.events_read += 1;
        Ok(event)
    }

    fn read_name(&mut self) -> Result<String, EventFileError> {
        let len = self.handle.read_u16::<LittleEndian>()? as usize;
        let mut bytes = vec![0u8; len];
        self.handle.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }

    fn read_vec3_f64(&mut self) -> Result<[f64; 3], EventFileError> {
        Ok([
            self.handle.read_f64::<LittleEndian>()?,
            self.handle.read_f64::<LittleEndian>()?,
            self.handle.read_f64::<LittleEndian>()?,
        ])
    }

    fn read_vec3_f32(&mut self) -> Result<[f32; 3], EventFileError> {
        Ok([
            self.handle.read_f32::<LittleEndian>()?,
            self.handle.read_f32::<LittleEndian>()?,
            self.handle.read_f32::<LittleEndian>()?,
        ])
    }

    fn read_index_list(&mut self) -> Result<Vec<u32>, EventFileError> {
        let len = self.handle.read_u16::<LittleEndian>()? as usize;
        let mut indices = Vec::with_capacity(len);
        for _ in 0..len {
            indices.push(self.handle.read_u32::<LittleEndian>()?);
        }
        Ok(indices)
    }

    fn read_mc_particle(&mut self) -> Result<McParticle, EventFileError> {
        Ok(McParticle {
            pdg: self.handle.read_i32::<LittleEndian>()?,
            generator_status: self.handle.read_i32::<LittleEndian>()?,
            simulator_status: self.handle.read_i32::<LittleEndian>()?,
            charge: self.handle.read_f32::<LittleEndian>()?,
            mass: self.handle.read_f64::<LittleEndian>()?,
            momentum: self.read_vec3_f64()?,
            vertex: self.read_vec3_f64()?,
            endpoint: self.read_vec3_f64()?,
            time: self.handle.read_f64::<LittleEndian>()?,
            daughters: self.read_index_list()?,
            parents: self.read_index_list()?,
        })
    }

    fn read_tracker_hit(&mut self) -> Result<TrackerHit, EventFileError> {
        Ok(TrackerHit {
            cell_id: self.handle.read_u64::<LittleEndian>()?,
            position: self.read_vec3_f64()?,
            edep: self.handle.read_f32::<LittleEndian>()?,
            time: self.handle.read_f64::<LittleEndian>()?,
            path_length: self.handle.read_f32::<LittleEndian>()?,
            particle: self.handle.read_u32::<LittleEndian>()?,
        })
    }

    fn read_calo_hit(&mut self) -> Result<CaloHit, EventFileError> {
        let cell_id = self.handle.read_u64::<LittleEndian>()?;
        let position = self.read_vec3_f64()?;
        let energy = self.handle.read_f32::<LittleEndian>()?;
        let time = self.handle.read_f64::<LittleEndian>()?;
        let n_contributions = self.handle.read_u16::<LittleEndian>()? as usize;
        let mut contributions = Vec::with_capacity(n_contributions);
        for _ in 0..n_contributions {
            contributions.push(CaloContribution {
                particle: self.handle.read_u32::<LittleEndian>()?,
                energy: self.handle.read_f32::<LittleEndian>()?,
                time: self.handle.read_f64::<LittleEndian>()?,
            });
        }
        Ok(CaloHit {
            cell_id,
            position,
            energy,
            time,
            contributions,
        })
    }

    fn read_reco_particle(&mut self) -> Result<RecoParticle, EventFileError> {
        let pdg = self.handle.read_i32::<LittleEndian>()?;
        let charge = self.handle.read_f32::<LittleEndian>()?;
        let energy = self.handle.read_f32::<LittleEndian>()?;
        let mass = self.handle.read_f32::<LittleEndian>()?;
        let momentum = self.read_vec3_f32()?;
        let reference_point = self.read_vec3_f32()?;
        let goodness_of_pid = self.handle.read_f32::<LittleEndian>()?;
        let particle_type = self.handle.read_i32::<LittleEndian>()?;
        let mut covariance = [0.0f32; 10];
        for value in covariance.iter_mut() {
            *value = self.handle.read_f32::<LittleEndian>()?;
        }
        let n_clusters = self.handle.read_u16::<LittleEndian>()?;
        let n_tracks = self.handle.read_u16::<LittleEndian>()?;
        let n_pids = self.handle.read_u16::<LittleEndian>()?;
        let particles = self.read_index_list()?;
        Ok(RecoParticle {
            pdg,
            charge,
            energy,
            mass,
            momentum,
            reference_point,
            goodness_of_pid,
            particle_type,
            covariance,
            n_clusters,
            n_tracks,
            n_pids,
            particles,
        })
    }

    fn read_kinematics(&mut self) -> Result<InclusiveKinematics, EventFileError> {
        Ok(InclusiveKinematics {
            x: self.handle.read_f32::<LittleEndian>()?,
            q2: self.handle.read_f32::<LittleEndian>()?,
            y: self.handle.read_f32::<LittleEndian>()?,
            nu: self.handle.read_f32::<LittleEndian>()?,
            w: self.handle.read_f32::<LittleEndian>()?,
            scat_index: self.handle.read_u32::<LittleEndian>()?,
        })
    }
}

/// Writer for the event container format.
///
/// The event count in the header is written as a placeholder and patched
/// when the writer is consumed by `close`; a writer that is dropped without
/// closing leaves a file that reads as empty.
#[derive(Debug)]
pub struct EventWriter {
    handle: BufWriter<File>,
    events_written: u32,
}

impl EventWriter {
    pub fn new(path: &Path) -> Result<Self, EventWriterError> {
        let mut handle = BufWriter::new(File::create(path)?);
        handle.write_all(&CONTAINER_MAGIC)?;
        handle.write_u16::<LittleEndian>(CONTAINER_VERSION)?;
        handle.write_u32::<LittleEndian>(0)?;
        Ok(Self {
            handle,
            events_written: 0,
        })
    }

    pub fn write_event(&mut self, event: &Event) -> Result<(), EventWriterError> {
        let n_collections = event.mc_collections.len()
            + event.tracker_hits.len()
            + event.calo_hits.len()
            + event.reco_particles.len()
            + event.kinematics.len();
        self.handle.write_u16::<LittleEndian>(n_collections as u16)?;

        for (name, records) in &event.mc_collections {
            self.write_collection_header(KIND_MC_PARTICLE, name, records.len())?;
            for particle in records {
                self.write_mc_particle(particle)?;
            }
        }
        for (name, records) in &event.tracker_hits {
            self.write_collection_header(KIND_TRACKER_HIT, name, records.len())?;
            for hit in records {
                self.write_tracker_hit(hit)?;
            }
        }
        for (name, records) in &event.calo_hits {
            self.write_collection_header(KIND_CALO_HIT, name, records.len())?;
            for hit in records {
                self.write_calo_hit(hit)?;
            }
        }
        for (name, records) in &event.reco_particles {
            self.write_collection_header(KIND_RECO_PARTICLE, name, records.len())?;
            for particle in records {
                self.write_reco_particle(particle)?;
            }
        }
        for (name, records) in &event.kinematics {
            self.write_collection_header(KIND_KINEMATICS, name, records.len())?;
            for kin in records {
                self.write_kinematics(kin)?;
            }
        }

        self.events_written += 1;
        Ok(())
    }

    /// Patch the header event count, flush, and consume the writer
    pub fn close(self) -> Result<(), EventWriterError> {
        let Self {
            handle,
            events_written,
        } = self;
        let mut file = handle.into_inner().map_err(|e| e.into_error())?;
        file.seek(SeekFrom::Start(EVENT_COUNT_OFFSET))?;
        file.write_u32::<LittleEndian>(events_written)?;
        file.flush()?;
        Ok(())
    }

    fn write_collection_header(
        &mut self,
        kind: u8,
        name: &str,
        n_records: usize,
    ) -> Result<(), EventWriterError> {
        if name.len() > u16::MAX as usize {
            return Err(EventWriterError::NameTooLong(name.to_string()));
        }
        if n_records > u32::MAX as usize {
            return Err(EventWriterError::CollectionTooLarge(name.to_string()));
        }
        self.handle.write_u8(kind)?;
        self.handle.write_u16::<LittleEndian>(name.len() as u16)?;
        self.handle.write_all(name.as_bytes())?;
        self.handle.write_u32::<LittleEndian>(n_records as u32)?;
        Ok(())
    }

    fn write_vec3_f64(&mut self, values: &[f64; 3]) -> Result<(), EventWriterError> {
        for value in values {
            self.handle.write_f64::<LittleEndian>(*value)?;
        }
        Ok(())
    }

    fn write_vec3_f32(&mut self, values: &[f32; 3]) -> Result<(), EventWriterError> {
        for value in values {
            self.handle.write_f32::<LittleEndian>(*value)?;
        }
        Ok(())
    }

    fn write_index_list(&mut self, indices: &[u32]) -> Result<(), EventWriterError> {
        self.handle.write_u16::<LittleEndian>(indices.len() as u16)?;
        for index in indices {
            self.handle.write_u32::<LittleEndian>(*index)?;
        }
        Ok(())
    }

    fn write_mc_particle(&mut self, particle: &McParticle) -> Result<(), EventWriterError> {
        self.handle.write_i32::<LittleEndian>(particle.pdg)?;
        self.handle
            .write_i32::<LittleEndian>(particle.generator_status)?;
        self.handle
            .write_i32::<LittleEndian>(particle.simulator_status)?;
        self.handle.write_f32::<LittleEndian>(particle.charge)?;
        self.handle.write_f64::<LittleEndian>(particle.mass)?;
        self.write_vec3_f64(&particle.momentum)?;
        self.write_vec3_f64(&particle.vertex)?;
        self.write_vec3_f64(&particle.endpoint)?;
        self.handle.write_f64::<LittleEndian>(particle.time)?;
        self.write_index_list(&particle.daughters)?;
        self.write_index_list(&particle.parents)?;
        Ok(())
    }

    fn write_tracker_hit(&mut self, hit: &TrackerHit) -> Result<(), EventWriterError> {
        self.handle.write_u64::<LittleEndian>(hit.cell_id)?;
        self.write_vec3_f64(&hit.position)?;
        self.handle.write_f32::<LittleEndian>(hit.edep)?;
        self.handle.write_f64::<LittleEndian>(hit.time)?;
        self.handle.write_f32::<LittleEndian>(hit.path_length)?;
        self.handle.write_u32::<LittleEndian>(hit.particle)?;
        Ok(())
    }

    fn write_calo_hit(&mut self, hit: &CaloHit) -> Result<(), EventWriterError> {
        self.handle.write_u64::<LittleEndian>(hit.cell_id)?;
        self.write_vec3_f64(&hit.position)?;
        self.handle.write_f32::<LittleEndian>(hit.energy)?;
        self.handle.write_f64::<LittleEndian>(hit.time)?;
        self.handle
            .write_u16::<LittleEndian>(hit.contributions.len() as u16)?;
        for contribution in &hit.contributions {
            self.handle.write_u32::<LittleEndian>(contribution.particle)?;
            self.handle.write_f32::<LittleEndian>(contribution.energy)?;
            self.handle.write_f64::<LittleEndian>(contribution.time)?;
        }
        Ok(())
    }

    fn write_reco_particle(&mut self, particle: &RecoParticle) -> Result<(), EventWriterError> {
        self.handle.write_i32::<LittleEndian>(particle.pdg)?;
        self.handle.write_f32::<LittleEndian>(particle.charge)?;
        self.handle.write_f32::<LittleEndian>(particle.energy)?;
        self.handle.write_f32::<LittleEndian>(particle.mass)?;
        self.write_vec3_f32(&particle.momentum)?;
        self.write_vec3_f32(&particle.reference_point)?;
        self.handle
            .write_f32::<LittleEndian>(particle.goodness_of_pid)?;
        self.handle
            .write_i32::<LittleEndian>(particle.particle_type)?;
        for value in &particle.covariance {
            self.handle.write_f32::<LittleEndian>(*value)?;
        }
        self.handle.write_u16::<LittleEndian>(particle.n_clusters)?;
        self.handle.write_u16::<LittleEndian>(particle.n_tracks)?;
        self.handle.write_u16::<LittleEndian>(particle.n_pids)?;
        self.write_index_list(&particle.particles)?;
        Ok(())
    }

    fn write_kinematics(&mut self, kin: &InclusiveKinematics) -> Result<(), EventWriterError> {
        self.handle.write_f32::<LittleEndian>(kin.x)?;
        self.handle.write_f32::<LittleEndian>(kin.q2)?;
        self.handle.write_f32::<LittleEndian>(kin.y)?;
        self.handle.write_f32::<LittleEndian>(kin.nu)?;
        self.handle.write_f32::<LittleEndian>(kin.w)?;
        self.handle.write_u32::<LittleEndian>(kin.scat_index)?;
        Ok(())
    }
}
