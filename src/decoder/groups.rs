//! Patterns and value extraction for the individual METAR groups.
//!
//! Each `parse_*` function receives a group that already matched its pattern and
//! either returns the normalized value or a reason why the value is out of range. The
//! caller decides how that reason is reported.

use crate::decoder::units::{
    SpeedUnit, FEET_TO_METERS, HPA_TO_MMHG, INHG_TO_MMHG, STATUTE_MILES_TO_METERS,
};
use crate::types::observation::{CloudCover, CloudLayer, CloudType, Visibility, VisibilityQualifier};
use regex::{Captures, Regex};
use std::sync::LazyLock;

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("METAR group patterns are valid regular expressions")
}

pub(crate) static STATION: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z][A-Z0-9]{3}$"));

pub(crate) static TIME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<day>\d{2})(?P<hour>\d{2})(?P<minute>\d{2})Z$"));

pub(crate) static WIND: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"^(?P<dir>\d{3}|VRB|///)(?P<speed>P?\d{2,3}|//)(?:G(?P<gust>P?\d{2,3}))?(?P<units>KTS?|MPS|KMH|MPH)$",
    )
});

pub(crate) static VARIABLE_WIND: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<from>\d{3})V(?P<to>\d{3})$"));

pub(crate) static VISIBILITY_METERS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<meters>\d{4}|////)(?:NDV)?$"));

pub(crate) static VISIBILITY_MILES: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?P<bound>[PM])?(?:(?P<num>\d{1,2})/(?P<den>\d{1,2})|(?P<whole>\d{1,3}))SM$")
});

// Whole part of a split statute-mile group such as "1 1/2SM".
pub(crate) static VISIBILITY_WHOLE_MILES: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\d{1,2}$"));

pub(crate) static VISIBILITY_FRACTION_MILES: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^\d/\d{1,2}SM$"));

pub(crate) static DIRECTIONAL_VISIBILITY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^\d{4}(?:N|NE|E|SE|S|SW|W|NW)$"));

pub(crate) static RUNWAY_VISUAL_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^R\d{2}[LRC]?/[PM]?\d{4}(?:V[PM]?\d{4})?(?:FT)?/?[UDN]?$")
});

pub(crate) static WEATHER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(concat!(
        r"^(?:[-+]|VC)?",
        r"(?P<descriptor>MI|PR|BC|DR|BL|SH|TS|FZ)?",
        r"(?P<precipitation>(?:DZ|RA|SN|SG|IC|PL|GR|GS|UP)+)?",
        r"(?P<obscuration>BR|FG|FU|VA|DU|SA|HZ|PY)?",
        r"(?P<other>PO|SQ|FC|SS|DS|NSW)?$",
    ))
});

pub(crate) static SKY: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?P<cover>VV|CLR|SKC|NSC|NCD|FEW|SCT|BKN|OVC|///)(?P<height>\d{3}|///)?(?P<type>CB|TCU|///)?$")
});

pub(crate) static TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<temp>M?\d{2}|//|XX)/(?P<dewpt>M?\d{2}|//|XX)?$"));

pub(crate) static PRESSURE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<unit>[AQ])(?P<value>\d{4}|////)$"));

pub(crate) static RECENT_WEATHER: LazyLock<Regex> = LazyLock::new(|| pattern(r"^RE[A-Z]{2,8}$"));

pub(crate) static WIND_SHEAR_RUNWAY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?:R|RWY)\d{2}[LRC]?$"));

pub(crate) static RUNWAY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:R\d{2}[LRC]?/(?:[0-9/]{6}|CLRD[0-9/]{2})|\d{8}|R/SNOCLO|SNOCLO)$")
});

pub(crate) static SEA_STATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^WM?\d{2}/[SH]\d{1,3}$"));

static TREND_TIME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?P<kind>FM|TL|AT)(?P<hour>\d{2})(?P<minute>\d{2})$"));

/// Tokens that open the trend section of a report.
pub(crate) const TREND_MARKERS: [&str; 3] = ["NOSIG", "BECMG", "TEMPO"];

pub(crate) const REMARKS_MARKER: &str = "RMK";

/// Automatic stations send this in place of present weather they cannot observe.
pub(crate) const WEATHER_NOT_OBSERVED: &str = "//";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindGroup {
    pub direction: Option<u16>,
    pub speed: Option<f64>,
    pub gust: Option<f64>,
}

fn parse_speed(value: &str, unit: SpeedUnit) -> Result<f64, String> {
    // "P" marks "greater than" (e.g. P99KT); the bound itself is the best estimate.
    let digits = value.trim_start_matches('P');
    digits
        .parse::<u32>()
        .map(|v| unit.to_mps(f64::from(v)))
        .map_err(|e| format!("invalid speed '{value}': {e}"))
}

pub(crate) fn parse_wind(caps: &Captures<'_>) -> Result<WindGroup, String> {
    let unit = SpeedUnit::from_suffix(&caps["units"])
        .ok_or_else(|| format!("unknown speed unit '{}'", &caps["units"]))?;

    let direction = match &caps["dir"] {
        "VRB" | "///" => None,
        digits => {
            let degrees = digits
                .parse::<u16>()
                .map_err(|e| format!("invalid direction '{digits}': {e}"))?;
            if degrees > 360 {
                return Err(format!("direction {degrees} is outside 0-360"));
            }
            Some(degrees)
        }
    };

    let speed = match &caps["speed"] {
        "//" => None,
        value => Some(parse_speed(value, unit)?),
    };

    let gust = caps
        .name("gust")
        .map(|m| parse_speed(m.as_str(), unit))
        .transpose()?;

    Ok(WindGroup {
        direction,
        speed,
        gust,
    })
}

pub(crate) fn check_variable_wind(caps: &Captures<'_>) -> Result<(), String> {
    for name in ["from", "to"] {
        let degrees: u16 = caps[name]
            .parse()
            .map_err(|e| format!("invalid direction '{}': {e}", &caps[name]))?;
        if degrees > 360 {
            return Err(format!("direction {degrees} is outside 0-360"));
        }
    }
    Ok(())
}

/// Visibility for `CAVOK`, which guarantees 10 km or more.
pub(crate) fn cavok_visibility() -> Visibility {
    Visibility {
        qualifier: Some(VisibilityQualifier::GreaterThan),
        meters: 10_000.0,
    }
}

pub(crate) fn parse_visibility_meters(caps: &Captures<'_>) -> Option<Visibility> {
    match &caps["meters"] {
        "////" => None,
        // 9999 is the reporting ceiling, 0000 the floor.
        "9999" => Some(cavok_visibility()),
        "0000" => Some(Visibility {
            qualifier: Some(VisibilityQualifier::LessThan),
            meters: 50.0,
        }),
        digits => digits.parse::<u32>().ok().map(|meters| Visibility {
            qualifier: None,
            meters: f64::from(meters),
        }),
    }
}

/// Statute-mile visibility. `whole_miles` carries the separate leading group of a
/// split value such as `1 1/2SM`.
pub(crate) fn parse_visibility_miles(
    caps: &Captures<'_>,
    whole_miles: Option<u32>,
) -> Result<Visibility, String> {
    let qualifier = caps.name("bound").map(|bound| match bound.as_str() {
        "P" => VisibilityQualifier::GreaterThan,
        _ => VisibilityQualifier::LessThan,
    });

    let mut miles = f64::from(whole_miles.unwrap_or(0));
    if let Some(whole) = caps.name("whole") {
        miles += whole
            .as_str()
            .parse::<f64>()
            .map_err(|e| format!("invalid miles '{}': {e}", whole.as_str()))?;
    }
    if let (Some(num), Some(den)) = (caps.name("num"), caps.name("den")) {
        let num: f64 = num.as_str().parse().map_err(|e| format!("invalid numerator: {e}"))?;
        let den: f64 = den.as_str().parse().map_err(|e| format!("invalid denominator: {e}"))?;
        if den == 0.0 {
            return Err("zero denominator".to_string());
        }
        miles += num / den;
    }

    Ok(Visibility {
        qualifier,
        meters: miles * STATUTE_MILES_TO_METERS,
    })
}

pub(crate) fn parse_sky(caps: &Captures<'_>) -> Result<CloudLayer, String> {
    let cover = CloudCover::from_code(&caps["cover"])
        .ok_or_else(|| format!("unknown cover '{}'", &caps["cover"]))?;

    // Heights are in hundreds of feet.
    let height = match caps.name("height").map(|m| m.as_str()) {
        None | Some("///") => None,
        Some(digits) => {
            let hundreds: u32 = digits
                .parse()
                .map_err(|e| format!("invalid height '{digits}': {e}"))?;
            Some(f64::from(hundreds) * 100.0 * FEET_TO_METERS)
        }
    };

    let cloud_type = caps
        .name("type")
        .and_then(|m| CloudType::from_code(m.as_str()));

    Ok(CloudLayer {
        cover,
        height,
        cloud_type,
    })
}

/// `M05` is -5 °C; `//` and `XX` mean not measured.
pub(crate) fn parse_temperature(value: Option<&str>) -> Option<f64> {
    let value = value?;
    let (sign, digits) = match value.strip_prefix('M') {
        Some(rest) => (-1.0, rest),
        None => (1.0, value),
    };
    digits.parse::<u32>().ok().map(|v| sign * f64::from(v))
}

pub(crate) fn parse_pressure(caps: &Captures<'_>) -> Option<f64> {
    let value: u32 = caps["value"].parse().ok()?;
    match &caps["unit"] {
        // hectopascals
        "Q" => Some(f64::from(value) * HPA_TO_MMHG),
        // hundredths of inches of mercury
        _ => Some(f64::from(value) / 100.0 * INHG_TO_MMHG),
    }
}

pub(crate) fn is_weather(group: &str) -> bool {
    WEATHER.captures(group).is_some_and(|caps| {
        ["descriptor", "precipitation", "obscuration", "other"]
            .iter()
            .any(|name| caps.name(name).is_some())
    })
}

/// Renders the trend section, e.g. `TEMPO FM1230 3000 SHRA` becomes
/// "temporarily from 12:30 3000 SHRA".
pub(crate) fn describe_trend(groups: &[&str]) -> String {
    groups
        .iter()
        .map(|group| match *group {
            "NOSIG" => "no significant change".to_string(),
            "BECMG" => "becoming".to_string(),
            "TEMPO" => "temporarily".to_string(),
            other => match TREND_TIME.captures(other) {
                Some(caps) => {
                    let word = match &caps["kind"] {
                        "FM" => "from",
                        "TL" => "until",
                        _ => "at",
                    };
                    format!("{} {}:{}", word, &caps["hour"], &caps["minute"])
                }
                None => other.to_string(),
            },
        })
        .collect::<Vec<_>>()
        .join(" ")
}
