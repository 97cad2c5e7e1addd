use crate::error::MetarWeatherError;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data folder.
pub const DATA_DIR_ENV: &str = "METAR_WEATHER_DATA";
const DATA_DIR_NAME: &str = "metar_weather";

/// The data folder: `$METAR_WEATHER_DATA` if set, else `metar_weather` in the
/// platform data directory.
pub fn get_data_dir() -> Result<PathBuf, MetarWeatherError> {
    data_dir_from(std::env::var_os(DATA_DIR_ENV))
}

fn data_dir_from(env_value: Option<OsString>) -> Result<PathBuf, MetarWeatherError> {
    match env_value.filter(|value| !value.is_empty()) {
        Some(value) => Ok(PathBuf::from(value)),
        None => dirs::data_dir()
            .map(|p| p.join(DATA_DIR_NAME))
            .ok_or(MetarWeatherError::DataDirResolution),
    }
}

/// Unlike a cache folder, the data folder is never created: it must be provisioned
/// with the reference tables beforehand.
pub async fn ensure_data_dir_exists(path: &Path) -> Result<(), MetarWeatherError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(MetarWeatherError::DataFolderMissing(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(MetarWeatherError::DataFolderMissing(path.to_path_buf()))
        }
        Err(e) => Err(MetarWeatherError::DataFolderRead(path.to_path_buf(), e)),
    }
}
