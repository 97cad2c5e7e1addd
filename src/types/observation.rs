//! The decoded form of a single METAR report.

use crate::types::compass::CompassPoint;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A decoded METAR observation.
///
/// Every field that the raw report did not contain is `None`. Nothing is defaulted:
/// a missing temperature group is `None`, never `0.0`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// ICAO code of the reporting station.
    pub station_id: String,
    /// Observation time with the decoder's fixed offset already applied.
    pub time: NaiveDateTime,
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Dew point in °C.
    pub dew_point: Option<f64>,
    /// Relative humidity as a fraction in `[0, 1]`. Present iff both temperature and
    /// dew point are present.
    pub humidity: Option<f64>,
    /// Wind direction in degrees (0-360). `None` for variable (`VRB`) or missing wind.
    pub wind_direction: Option<u16>,
    /// Mean wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Gust speed in m/s.
    pub wind_gust: Option<f64>,
    /// Pressure in millimeters of mercury.
    pub pressure: Option<f64>,
    pub visibility: Option<Visibility>,
    /// Cloud layers in report order. `None` when the report has no sky group at all,
    /// which is different from an explicit clear-sky layer such as `SKC`.
    pub clouds: Option<Vec<CloudLayer>>,
    /// Present-weather groups verbatim (e.g. `-SHRA`, `BR`).
    pub weather: Option<Vec<String>>,
    /// Human readable trend (e.g. "temporarily from 12:30 3000 SHRA").
    pub trend: Option<String>,
}

impl Observation {
    /// Nearest compass point for the wind direction, if the direction is known.
    pub fn wind_compass(&self) -> Option<CompassPoint> {
        self.wind_direction
            .map(|degrees| CompassPoint::from_degrees(f64::from(degrees)))
    }
}

/// Whether the reported visibility is a bound rather than an exact value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum VisibilityQualifier {
    GreaterThan,
    LessThan,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Visibility {
    pub qualifier: Option<VisibilityQualifier>,
    /// Visibility in meters.
    pub meters: f64,
}

/// A single sky condition group.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CloudLayer {
    pub cover: CloudCover,
    /// Layer base (or vertical visibility) in meters. `None` for clear-sky markers and
    /// for unreported heights.
    pub height: Option<f64>,
    pub cloud_type: Option<CloudType>,
}

/// Sky cover codes as they appear in METAR sky groups.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CloudCover {
    /// `SKC`: sky clear.
    SkyClear,
    /// `CLR`: no clouds below 12,000 ft (automated stations).
    Clear,
    /// `NSC`: no significant cloud.
    NoSignificantCloud,
    /// `NCD`: no cloud detected.
    NoCloudDetected,
    /// `FEW`: 1-2 oktas.
    Few,
    /// `SCT`: 3-4 oktas.
    Scattered,
    /// `BKN`: 5-7 oktas.
    Broken,
    /// `OVC`: 8 oktas.
    Overcast,
    /// `VV`: sky obscured, height is the vertical visibility.
    VerticalVisibility,
    /// `///`: cover not observable.
    NotReported,
}

impl CloudCover {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SKC" => Some(CloudCover::SkyClear),
            "CLR" => Some(CloudCover::Clear),
            "NSC" => Some(CloudCover::NoSignificantCloud),
            "NCD" => Some(CloudCover::NoCloudDetected),
            "FEW" => Some(CloudCover::Few),
            "SCT" => Some(CloudCover::Scattered),
            "BKN" => Some(CloudCover::Broken),
            "OVC" => Some(CloudCover::Overcast),
            "VV" => Some(CloudCover::VerticalVisibility),
            "///" => Some(CloudCover::NotReported),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CloudCover::SkyClear => "SKC",
            CloudCover::Clear => "CLR",
            CloudCover::NoSignificantCloud => "NSC",
            CloudCover::NoCloudDetected => "NCD",
            CloudCover::Few => "FEW",
            CloudCover::Scattered => "SCT",
            CloudCover::Broken => "BKN",
            CloudCover::Overcast => "OVC",
            CloudCover::VerticalVisibility => "VV",
            CloudCover::NotReported => "///",
        }
    }

    /// True for the explicit "no cloud" markers.
    pub fn is_clear(&self) -> bool {
        matches!(
            self,
            CloudCover::SkyClear
                | CloudCover::Clear
                | CloudCover::NoSignificantCloud
                | CloudCover::NoCloudDetected
        )
    }
}

/// Convective cloud type suffixes of a sky group.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CloudType {
    /// `CB`
    Cumulonimbus,
    /// `TCU`
    ToweringCumulus,
    /// `///`: type not observable.
    NotReported,
}

impl CloudType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CB" => Some(CloudType::Cumulonimbus),
            "TCU" => Some(CloudType::ToweringCumulus),
            "///" => Some(CloudType::NotReported),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CloudType::Cumulonimbus => "CB",
            CloudType::ToweringCumulus => "TCU",
            CloudType::NotReported => "///",
        }
    }
}
