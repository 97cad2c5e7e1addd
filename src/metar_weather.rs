//! The main entry point: a client over a data folder of airports, cities and METAR
//! observation files that answers "what is the weather here" queries.

use crate::decoder::metar_decoder::MetarDecoder;
use crate::error::MetarWeatherError;
use crate::snapshot::loader::SnapshotLoader;
use crate::snapshot::store::SnapshotStore;
use crate::snapshot::weather_snapshot::WeatherSnapshot;
use crate::stations::resolve::{ResolvedWeather, DEFAULT_STATION_LIMIT};
use crate::types::airport::Airport;
use crate::types::city::City;
use crate::types::location::LatLon;
use crate::types::observation::Observation;
use crate::utils::{ensure_data_dir_exists, get_data_dir};
use bon::bon;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How many cities the city queries return unless told otherwise.
pub const DEFAULT_CITY_LIMIT: usize = 3;

/// A city together with the weather resolved at its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    pub city: City,
    pub weather: ResolvedWeather,
}

/// The client for METAR-based weather lookups.
///
/// On construction it loads the data folder into an in-memory snapshot. Every query
/// runs against the snapshot current at the time of the call, and
/// [`refresh_observations`](Self::refresh_observations) swaps in newer observations
/// without disturbing queries already in progress.
///
/// # Examples
///
/// ```rust,no_run
/// # use metar_weather::{LatLon, MetarWeather, MetarWeatherError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MetarWeatherError> {
/// let client = MetarWeather::with_data_folder("/var/lib/metar".into()).await?;
/// let weather = client
///     .weather_at()
///     .location(LatLon(55.7558, 37.6173))
///     .call()?;
/// println!(
///     "{} ({:.1} km): {:?} C",
///     weather.airport.name, weather.distance_km, weather.observation.temperature
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MetarWeather {
    loader: SnapshotLoader,
    store: SnapshotStore,
    decoder: Option<MetarDecoder>,
    station_limit: usize,
}

#[bon]
impl MetarWeather {
    /// Opens a client over the given data folder.
    ///
    /// # Errors
    ///
    /// Returns [`MetarWeatherError::DataFolderMissing`] if the folder does not exist, and
    /// [`MetarWeatherError::Load`] if any of the data files cannot be read or parsed.
    pub async fn with_data_folder(data_folder: PathBuf) -> Result<Self, MetarWeatherError> {
        Self::open().data_folder(data_folder).call().await
    }

    /// Opens a client over the default data folder (see [`get_data_dir`]).
    pub async fn new() -> Result<Self, MetarWeatherError> {
        Self::open().call().await
    }

    /// Opens a client with explicit settings.
    ///
    /// * `.data_folder(PathBuf)`: Optional. Defaults to [`get_data_dir`].
    /// * `.station_limit(usize)`: Optional. How many of the nearest airports a weather
    ///   query tries. Defaults to `10`.
    /// * `.decoder(MetarDecoder)`: Optional. Without it, each query decodes with a
    ///   [`MetarDecoder::default`] built at query time, so report days are resolved
    ///   against the current date.
    #[builder]
    pub async fn open(
        data_folder: Option<PathBuf>,
        #[builder(default = DEFAULT_STATION_LIMIT)] station_limit: usize,
        decoder: Option<MetarDecoder>,
    ) -> Result<Self, MetarWeatherError> {
        let data_folder = match data_folder {
            Some(folder) => folder,
            None => get_data_dir()?,
        };
        ensure_data_dir_exists(&data_folder).await?;

        let loader = SnapshotLoader::new(&data_folder);
        let snapshot = loader.load().await?;
        info!(
            "Opened weather data from {:?}: {} airports, {} cities, {} observations",
            data_folder,
            snapshot.airports().len(),
            snapshot.cities().len(),
            snapshot.observations().len()
        );

        Ok(Self {
            loader,
            store: SnapshotStore::new(snapshot),
            decoder,
            station_limit,
        })
    }

    pub fn data_folder(&self) -> &Path {
        self.loader.data_folder()
    }

    /// The snapshot queries currently run against.
    pub fn snapshot(&self) -> Arc<WeatherSnapshot> {
        self.store.current()
    }

    fn decoder(&self) -> MetarDecoder {
        self.decoder.clone().unwrap_or_default()
    }

    /// Decodes a raw report with this client's decoder settings.
    pub fn decode(&self, raw: &str) -> Result<Observation, MetarWeatherError> {
        Ok(self.decoder().decode(raw)?)
    }

    /// Current weather at a location, from the nearest airport with a decodable report.
    ///
    /// * `.location(LatLon)`: **Required.**
    /// * `.station_limit(usize)`: Optional. Overrides the client's station limit.
    ///
    /// # Errors
    ///
    /// Returns [`MetarWeatherError::NoStationFound`] if none of the candidate airports
    /// has a decodable observation.
    #[builder]
    pub fn weather_at(
        &self,
        location: LatLon,
        station_limit: Option<usize>,
    ) -> Result<ResolvedWeather, MetarWeatherError> {
        let limit = station_limit.unwrap_or(self.station_limit);
        let snapshot = self.store.current();
        Ok(snapshot.resolve(&self.decoder(), location, limit)?)
    }

    /// Airports closest to a location, closest first. `.limit` defaults to `10`.
    #[builder]
    pub fn find_airports(
        &self,
        location: LatLon,
        #[builder(default = DEFAULT_STATION_LIMIT)] limit: usize,
    ) -> Vec<Airport> {
        self.store
            .current()
            .nearest_airports(location, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Cities closest to a location, closest first. `.limit` defaults to `3`.
    #[builder]
    pub fn find_cities(
        &self,
        location: LatLon,
        #[builder(default = DEFAULT_CITY_LIMIT)] limit: usize,
    ) -> Vec<City> {
        self.store
            .current()
            .nearest_cities(location, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Cities whose English or Russian name starts with `.text`, ignoring case, ordered
    /// by Russian name. `.limit` defaults to `3`.
    #[builder]
    pub fn search_cities(
        &self,
        text: &str,
        #[builder(default = DEFAULT_CITY_LIMIT)] limit: usize,
    ) -> Vec<City> {
        self.store
            .current()
            .search_cities(text, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// A city by id and the weather at its coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`MetarWeatherError::UnknownCity`] for an id outside the cities table and
    /// [`MetarWeatherError::NoStationFound`] when no nearby airport has usable data.
    pub fn city_weather(&self, city_id: usize) -> Result<CityWeather, MetarWeatherError> {
        let snapshot = self.store.current();
        let city = snapshot
            .city(city_id)
            .ok_or(MetarWeatherError::UnknownCity(city_id))?;
        let weather = snapshot.resolve(
            &self.decoder(),
            LatLon(city.latitude, city.longitude),
            self.station_limit,
        )?;
        Ok(CityWeather {
            city: city.clone(),
            weather,
        })
    }

    /// Reloads the latest observation file and makes it current.
    ///
    /// Airports and cities are kept from the current snapshot. On error the current
    /// snapshot stays in place.
    pub async fn refresh_observations(&self) -> Result<(), MetarWeatherError> {
        let observations = self.loader.load_observations().await?;
        let next = self.store.current().with_observations(observations);
        self.store.replace(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::error::LoadError;
    use crate::snapshot::loader::tests::data_folder;
    use crate::snapshot::loader::OBSERVATIONS_DIR_NAME;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    const SHEREMETYEVO: &str = "UUEE 151030Z 27005MPS 9999 -SHRA BKN020CB 12/08 Q1013 NOSIG";
    const DOMODEDOVO: &str = "UUDD 151030Z 18004MPS 9999 SCT030 10/05 Q1015";

    fn decoder() -> MetarDecoder {
        MetarDecoder::builder()
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
            .build()
    }

    async fn client(dir: &TempDir) -> Result<MetarWeather, MetarWeatherError> {
        MetarWeather::open()
            .data_folder(dir.path().to_path_buf())
            .decoder(decoder())
            .call()
            .await
    }

    #[tokio::test]
    async fn test_weather_at() -> Result<(), MetarWeatherError> {
        let observations = format!("{}\n{}\n", SHEREMETYEVO, DOMODEDOVO);
        let dir = data_folder(&[("2024031510.txt", observations.as_str())]).await;
        let client = client(&dir).await?;

        let weather = client
            .weather_at()
            .location(LatLon(55.7558, 37.6173))
            .call()?;

        assert_eq!(weather.airport.code, "UUEE");
        assert!((weather.distance_km - 27.2235).abs() < 1e-3);
        assert_eq!(weather.observation.temperature, Some(12.0));
        assert_eq!(
            weather.observation.time,
            NaiveDateTime::parse_from_str("2024-03-15 14:30", "%Y-%m-%d %H:%M").unwrap()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_weather_at_skips_station_without_data() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", DOMODEDOVO)]).await;
        let client = client(&dir).await?;

        let weather = client
            .weather_at()
            .location(LatLon(55.7558, 37.6173))
            .call()?;
        assert_eq!(weather.airport.code, "UUDD");

        let result = client
            .weather_at()
            .location(LatLon(55.7558, 37.6173))
            .station_limit(1)
            .call();
        match result {
            Err(MetarWeatherError::NoStationFound(e)) => {
                assert_eq!((e.tried, e.missing, e.undecodable), (1, 1, 0));
            }
            other => panic!("Expected NoStationFound, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_city_queries() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", SHEREMETYEVO)]).await;
        let client = client(&dir).await?;

        let nearest = client
            .find_cities()
            .location(LatLon(55.95, 37.52))
            .call();
        assert_eq!(
            nearest.iter().map(|c| c.id).collect::<Vec<_>>(),
            [1, 0]
        );

        let found = client.search_cities().text("мос").call();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name_en, "Moscow");

        let city_weather = client.city_weather(1)?;
        assert_eq!(city_weather.city.name_en, "Dolgoprudny");
        assert_eq!(city_weather.weather.airport.code, "UUEE");

        assert!(matches!(
            client.city_weather(7),
            Err(MetarWeatherError::UnknownCity(7))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_city_weather_serializes() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", SHEREMETYEVO)]).await;
        let client = client(&dir).await?;

        let json = serde_json::to_value(client.city_weather(0)?).unwrap();
        assert_eq!(json["city"]["name_ru"], "Москва");
        assert_eq!(json["weather"]["airport"]["code"], "UUEE");
        assert_eq!(json["weather"]["observation"]["time"], "2024-03-15T14:30:00");
        assert_eq!(json["weather"]["observation"]["wind_gust"], serde_json::Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_airports() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", SHEREMETYEVO)]).await;
        let client = client(&dir).await?;

        let airports = client
            .find_airports()
            .location(LatLon(55.4, 37.9))
            .limit(1)
            .call();
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].code, "UUDD");
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_observations() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", DOMODEDOVO)]).await;
        let client = client(&dir).await?;
        let before = client.snapshot();

        tokio::fs::write(
            dir.path()
                .join(OBSERVATIONS_DIR_NAME)
                .join("2024031511.txt"),
            SHEREMETYEVO,
        )
        .await
        .unwrap();
        client.refresh_observations().await?;

        let weather = client
            .weather_at()
            .location(LatLon(55.7558, 37.6173))
            .call()?;
        assert_eq!(weather.airport.code, "UUEE");
        // The earlier snapshot is untouched.
        assert!(before.observations().contains_key("UUDD"));
        assert!(!before.observations().contains_key("UUEE"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_data_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = MetarWeather::with_data_folder(dir.path().join("nope")).await;
        assert!(matches!(
            result,
            Err(MetarWeatherError::DataFolderMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_incomplete_data_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = MetarWeather::with_data_folder(dir.path().to_path_buf()).await;
        assert!(matches!(
            result,
            Err(MetarWeatherError::Load(LoadError::FileRead(_, _)))
        ));
    }

    #[tokio::test]
    async fn test_decode_with_client_settings() -> Result<(), MetarWeatherError> {
        let dir = data_folder(&[("2024031510.txt", DOMODEDOVO)]).await;
        let client = client(&dir).await?;
        let observation = client.decode(SHEREMETYEVO)?;
        assert_eq!(observation.station_id, "UUEE");
        assert!(matches!(
            client.decode("   "),
            Err(MetarWeatherError::Decode(_))
        ));
        Ok(())
    }
}
