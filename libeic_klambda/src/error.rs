use std::path::PathBuf;
use thiserror::Error;

use super::constants::CONTAINER_VERSION;
use super::status::ConverterStatus;

#[derive(Debug, Error)]
pub enum EventFileError {
    #[error("Could not open event file because {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("File {0:?} does not start with the event container magic")]
    BadMagic(PathBuf),
    #[error("Unsupported event container version {0}; expected {exp}", exp = CONTAINER_VERSION)]
    UnsupportedVersion(u16),
    #[error("Unknown collection kind {0} found in event container")]
    UnknownCollectionKind(u8),
    #[error("Collection name in event container was not valid UTF-8: {0}")]
    BadCollectionName(#[from] std::string::FromUtf8Error),
    #[error("Reached end of event file")]
    EndOfFile,
    #[error("Event file failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EventWriterError {
    #[error("Collection name {0} is too long to encode")]
    NameTooLong(String),
    #[error("Collection {0} has too many records to encode")]
    CollectionTooLarge(String),
    #[error("Event writer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DetectorConfigError {
    #[error("Failed to load detector configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Detector configuration failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Detector configuration failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Detector configuration does not list any subsystems")]
    Empty,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Row with {found} fields given to table {table} with {expected} columns")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },
    #[error("Table failed due to CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Table failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("Converter failed due to table error: {0}")]
    TableError(#[from] TableError),
    #[error("Converter failed due to detector configuration error: {0}")]
    DetectorError(#[from] DetectorConfigError),
    #[error("Converter failed due to send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<ConverterStatus>),
    #[error("Converter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}
