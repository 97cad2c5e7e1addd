use crate::decoder::error::DecodeError;
use crate::snapshot::error::LoadError;
use crate::stations::error::NoStationFoundError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetarWeatherError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    NoStationFound(#[from] NoStationFoundError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Data folder '{0}' does not exist or is not a directory")]
    DataFolderMissing(PathBuf),

    #[error("Failed to read data folder '{0}'")]
    DataFolderRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine data directory")]
    DataDirResolution,

    #[error("No city with id {0}")]
    UnknownCity(usize),
}
