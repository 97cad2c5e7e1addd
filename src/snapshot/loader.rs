use crate::snapshot::error::LoadError;
use crate::snapshot::weather_snapshot::WeatherSnapshot;
use crate::types::airport::Airport;
use crate::types::city::City;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::{fs, task};

pub const AIRPORTS_FILE_NAME: &str = "airports.txt";
pub const CITIES_FILE_NAME: &str = "cities.txt";
pub const OBSERVATIONS_DIR_NAME: &str = "observations";

/// Observation lines are keyed by this many leading characters: the ICAO code.
const STATION_CODE_LEN: usize = 4;

/// Reads the flat-file data folder into a [`WeatherSnapshot`].
///
/// Layout of the data folder:
///
/// - `airports.txt`: tab-separated `id, ICAO code, name, latitude, longitude`.
/// - `cities.txt`: tab-separated `id, country code, country (en), country (ru),
///   name (en), name (ru), latitude, longitude`. Ids must equal the row index.
/// - `observations/`: one file per fetch. Only the file with the greatest name is
///   read. Each line is a raw METAR report starting with the station code.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    data_folder: PathBuf,
}

impl SnapshotLoader {
    pub fn new(data_folder: &Path) -> SnapshotLoader {
        SnapshotLoader {
            data_folder: data_folder.to_path_buf(),
        }
    }

    pub fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    /// Loads airports, cities and the latest observations.
    pub async fn load(&self) -> Result<WeatherSnapshot, LoadError> {
        let airports = self.load_airports().await?;
        let cities = self.load_cities().await?;
        let observations = self.load_observations().await?;
        Ok(WeatherSnapshot::new(airports, cities, observations))
    }

    pub async fn load_airports(&self) -> Result<Vec<Airport>, LoadError> {
        let path = self.data_folder.join(AIRPORTS_FILE_NAME);
        let text = read_text(&path).await?;
        let airports = task::spawn_blocking(move || parse_airports(&path, &text)).await??;
        info!("Loaded {} airports", airports.len());
        Ok(airports)
    }

    pub async fn load_cities(&self) -> Result<Vec<City>, LoadError> {
        let path = self.data_folder.join(CITIES_FILE_NAME);
        let text = read_text(&path).await?;
        let cities = task::spawn_blocking(move || parse_cities(&path, &text)).await??;
        info!("Loaded {} cities", cities.len());
        Ok(cities)
    }

    /// Reads the latest observation file into a map from ICAO code to raw report.
    pub async fn load_observations(&self) -> Result<HashMap<String, String>, LoadError> {
        let path = self.latest_observation_file().await?;
        let text = read_text(&path).await?;
        let observations = task::spawn_blocking(move || parse_observations(&text)).await?;
        info!(
            "Loaded observations for {} stations from {:?}",
            observations.len(),
            path
        );
        Ok(observations)
    }

    /// The file in `observations/` whose name sorts last.
    pub async fn latest_observation_file(&self) -> Result<PathBuf, LoadError> {
        let dir = self.data_folder.join(OBSERVATIONS_DIR_NAME);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| LoadError::FileRead(dir.clone(), e))?;

        let mut latest: Option<PathBuf> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LoadError::FileRead(dir.clone(), e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| LoadError::FileRead(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let path = entry.path();
            if latest.as_ref().is_none_or(|l| path.file_name() > l.file_name()) {
                latest = Some(path);
            }
        }

        latest.ok_or(LoadError::NoObservationFiles(dir))
    }
}

async fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::FileRead(path.to_path_buf(), e))
}

/// Position of a record, for error reporting.
struct Record<'a> {
    path: &'a Path,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    fn new(path: &'a Path, line: usize, text: &'a str) -> Self {
        Record {
            path,
            line,
            fields: text.split('\t').collect(),
        }
    }

    fn malformed(&self, reason: String) -> LoadError {
        LoadError::MalformedRecord {
            path: self.path.to_path_buf(),
            line: self.line,
            reason,
        }
    }

    fn expect_fields(&self, count: usize) -> Result<(), LoadError> {
        if self.fields.len() < count {
            return Err(self.malformed(format!(
                "expected {} tab-separated fields, found {}",
                count,
                self.fields.len()
            )));
        }
        Ok(())
    }

    fn text(&self, index: usize) -> &'a str {
        self.fields[index].trim()
    }

    fn coordinate(&self, index: usize, name: &str, bound: f64) -> Result<f64, LoadError> {
        let raw = self.text(index);
        let value = raw
            .parse::<f64>()
            .map_err(|e| self.malformed(format!("invalid {} '{}': {}", name, raw, e)))?;
        if !value.is_finite() || value.abs() > bound {
            return Err(self.malformed(format!("{} {} is out of range", name, value)));
        }
        Ok(value)
    }
}

/// Non-blank lines with their 1-based line numbers.
fn records<'a>(path: &'a Path, text: &'a str) -> impl Iterator<Item = Record<'a>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(index, line)| Record::new(path, index + 1, line))
}

pub(crate) fn parse_airports(path: &Path, text: &str) -> Result<Vec<Airport>, LoadError> {
    records(path, text)
        .map(|record| {
            record.expect_fields(5)?;
            let code = record.text(1);
            if code.is_empty() {
                return Err(record.malformed("empty ICAO code".to_string()));
            }
            Ok(Airport::new(
                code,
                record.text(2),
                record.coordinate(3, "latitude", 90.0)?,
                record.coordinate(4, "longitude", 180.0)?,
            ))
        })
        .collect()
}

pub(crate) fn parse_cities(path: &Path, text: &str) -> Result<Vec<City>, LoadError> {
    records(path, text)
        .enumerate()
        .map(|(expected, record)| {
            record.expect_fields(8)?;
            let raw_id = record.text(0);
            let id = raw_id
                .parse::<usize>()
                .map_err(|e| record.malformed(format!("invalid id '{}': {}", raw_id, e)))?;
            if id != expected {
                return Err(LoadError::CityIdMismatch {
                    path: path.to_path_buf(),
                    line: record.line,
                    expected,
                    found: id,
                });
            }
            Ok(City {
                id,
                country_code: record.text(1).to_string(),
                country_en: record.text(2).to_string(),
                country_ru: record.text(3).to_string(),
                name_en: record.text(4).to_string(),
                name_ru: record.text(5).to_string(),
                latitude: record.coordinate(6, "latitude", 90.0)?,
                longitude: record.coordinate(7, "longitude", 180.0)?,
            })
        })
        .collect()
}

/// Later lines for the same station replace earlier ones.
pub(crate) fn parse_observations(text: &str) -> HashMap<String, String> {
    let mut observations = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.get(..STATION_CODE_LEN) {
            Some(code) => {
                observations.insert(code.to_string(), line.to_string());
            }
            None => warn!("Skipping observation line without a station code: {:?}", line),
        }
    }
    observations
}
