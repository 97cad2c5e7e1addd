mod decoder;
mod error;
mod metar_weather;
mod snapshot;
mod stations;
mod types;
mod utils;

pub use error::MetarWeatherError;
pub use metar_weather::*;
pub use utils::{get_data_dir, DATA_DIR_ENV};

pub use types::airport::Airport;
pub use types::city::City;
pub use types::compass::CompassPoint;
pub use types::location::{great_circle_distance_km, planar_distance_2, LatLon, Located};
pub use types::observation::*;

pub use decoder::error::DecodeError;
pub use decoder::metar_decoder::{decode, MetarDecoder, DEFAULT_TIME_OFFSET_HOURS};
pub use decoder::units::relative_humidity;

pub use stations::error::NoStationFoundError;
pub use stations::nearest::nearest_n;
pub use stations::resolve::{
    resolve_nearest, resolve_nearest_with, ObservationSource, ResolvedWeather,
    DEFAULT_STATION_LIMIT,
};
pub use stations::spatial_index::SpatialIndex;

pub use snapshot::error::LoadError;
pub use snapshot::loader::SnapshotLoader;
pub use snapshot::store::SnapshotStore;
pub use snapshot::weather_snapshot::WeatherSnapshot;
