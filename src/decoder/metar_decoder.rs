//! Turns a raw METAR line into an [`Observation`].
//!
//! The body of a report is walked group by group in the order the format prescribes
//! (type, station, time, modifiers, wind, visibility, runway visual range, present
//! weather, sky, temperature, pressure, supplementary groups). The trend section and
//! the remarks are split off first. Anything left in the body that no stage accepted
//! makes the whole report invalid.

use crate::decoder::error::DecodeError;
use crate::decoder::groups::{self, REMARKS_MARKER, TREND_MARKERS};
use crate::decoder::units::relative_humidity;
use crate::types::observation::{CloudLayer, Observation, Visibility};
use bon::Builder;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Hours added to the reported (UTC) time. Fixed, no daylight saving.
pub const DEFAULT_TIME_OFFSET_HOURS: i64 = 4;

/// Decoder for METAR reports.
///
/// Reports only carry day-of-month and time, so the decoder needs a reference date to
/// resolve the year and month: the reference month is used unless the reported day
/// lies after the reference day, in which case the report is from the previous month.
///
/// # Examples
///
/// ```rust
/// use metar_weather::MetarDecoder;
/// use chrono::NaiveDate;
///
/// let decoder = MetarDecoder::builder()
///     .reference_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
///     .build();
///
/// let observation = decoder
///     .decode("UUEE 151030Z 27005MPS 9999 SCT020 12/08 Q1013 NOSIG")
///     .unwrap();
/// assert_eq!(observation.station_id, "UUEE");
/// assert_eq!(observation.temperature, Some(12.0));
/// assert_eq!(observation.trend.as_deref(), Some("no significant change"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct MetarDecoder {
    /// Date used to resolve year and month of the report. Defaults to today (UTC).
    #[builder(default = Utc::now().date_naive())]
    reference_date: NaiveDate,
    #[builder(default = DEFAULT_TIME_OFFSET_HOURS)]
    time_offset_hours: i64,
}

impl Default for MetarDecoder {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Decodes `raw` with a decoder referenced to today's date.
///
/// See [`MetarDecoder::decode`].
pub fn decode(raw: &str) -> Result<Observation, DecodeError> {
    MetarDecoder::default().decode(raw)
}

// Cursor over the whitespace separated groups of the report body.
struct Groups<'a> {
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Groups<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a str> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.tokens.len());
    }

    fn remaining(&self) -> &'a [&'a str] {
        &self.tokens[self.pos..]
    }
}

impl MetarDecoder {
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn time_offset_hours(&self) -> i64 {
        self.time_offset_hours
    }

    /// Decodes a single raw report.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the report is empty, lacks a valid station
    /// identifier or time group, contains a group with an impossible value, contains
    /// groups that are not part of the grammar, or is a `NIL` report.
    pub fn decode(&self, raw: &str) -> Result<Observation, DecodeError> {
        let mut tokens: Vec<&str> = raw.split_whitespace().collect();
        if let Some(last) = tokens.pop() {
            let last = last.trim_end_matches('=');
            if !last.is_empty() {
                tokens.push(last);
            }
        }
        if tokens.is_empty() {
            return Err(DecodeError::Empty);
        }

        let body_end = tokens
            .iter()
            .position(|t| *t == REMARKS_MARKER)
            .unwrap_or(tokens.len());
        let body = &tokens[..body_end];
        let trend_start = body
            .iter()
            .position(|t| TREND_MARKERS.contains(t))
            .unwrap_or(body.len());
        let (body, trend) = body.split_at(trend_start);

        let mut cursor = Groups {
            tokens: body,
            pos: 0,
        };

        if matches!(cursor.peek(), Some("METAR" | "SPECI")) {
            cursor.advance(1);
        }

        let station_id = match cursor.peek() {
            Some(station) if groups::STATION.is_match(station) => station.to_string(),
            other => return Err(DecodeError::MissingStation(other.unwrap_or_default().to_string())),
        };
        cursor.advance(1);

        let time = self.decode_time(&station_id, cursor.peek())?;
        cursor.advance(1);

        while let Some(modifier) = cursor.peek() {
            match modifier {
                "AUTO" | "COR" | "RTD" => cursor.advance(1),
                "NIL" => return Err(DecodeError::NilReport { station: station_id }),
                _ => break,
            }
        }

        let invalid = |kind: &'static str, group: &str, reason: String| DecodeError::InvalidGroup {
            station: station_id.clone(),
            kind,
            group: group.to_string(),
            reason,
        };

        let mut observation = Observation {
            station_id: station_id.clone(),
            time,
            temperature: None,
            dew_point: None,
            humidity: None,
            wind_direction: None,
            wind_speed: None,
            wind_gust: None,
            pressure: None,
            visibility: None,
            clouds: None,
            weather: None,
            trend: None,
        };

        // Wind
        if let Some(group) = cursor.peek() {
            if let Some(caps) = groups::WIND.captures(group) {
                let wind = groups::parse_wind(&caps).map_err(|r| invalid("wind", group, r))?;
                observation.wind_direction = wind.direction;
                observation.wind_speed = wind.speed;
                observation.wind_gust = wind.gust;
                cursor.advance(1);
            }
        }
        if let Some(group) = cursor.peek() {
            if let Some(caps) = groups::VARIABLE_WIND.captures(group) {
                groups::check_variable_wind(&caps).map_err(|r| invalid("variable wind", group, r))?;
                cursor.advance(1);
            }
        }

        observation.visibility = Self::decode_visibility(&mut cursor)
            .map_err(|(group, reason)| invalid("visibility", group, reason))?;
        while cursor
            .peek()
            .is_some_and(|g| groups::DIRECTIONAL_VISIBILITY.is_match(g))
        {
            cursor.advance(1);
        }

        while cursor
            .peek()
            .is_some_and(|g| groups::RUNWAY_VISUAL_RANGE.is_match(g))
        {
            cursor.advance(1);
        }

        let mut weather = Vec::new();
        while let Some(group) = cursor
            .peek()
            .filter(|g| *g == groups::WEATHER_NOT_OBSERVED || groups::is_weather(g))
        {
            if group != groups::WEATHER_NOT_OBSERVED {
                weather.push(group.to_string());
            }
            cursor.advance(1);
        }
        observation.weather = (!weather.is_empty()).then_some(weather);

        let mut clouds: Vec<CloudLayer> = Vec::new();
        while let Some(group) = cursor.peek() {
            let Some(caps) = groups::SKY.captures(group) else {
                break;
            };
            clouds.push(groups::parse_sky(&caps).map_err(|r| invalid("sky", group, r))?);
            cursor.advance(1);
        }
        observation.clouds = (!clouds.is_empty()).then_some(clouds);

        if let Some(caps) = cursor.peek().and_then(|g| groups::TEMPERATURE.captures(g)) {
            observation.temperature =
                groups::parse_temperature(caps.name("temp").map(|m| m.as_str()));
            observation.dew_point =
                groups::parse_temperature(caps.name("dewpt").map(|m| m.as_str()));
            cursor.advance(1);
        }

        // Some stations report both QNH and altimeter; the first one wins.
        while let Some(caps) = cursor.peek().and_then(|g| groups::PRESSURE.captures(g)) {
            if observation.pressure.is_none() {
                observation.pressure = groups::parse_pressure(&caps);
            }
            cursor.advance(1);
        }

        Self::skip_supplementary(&mut cursor);

        let unparsed = cursor.remaining();
        if !unparsed.is_empty() {
            return Err(DecodeError::UnparsedGroups {
                station: station_id,
                groups: unparsed.iter().map(|g| g.to_string()).collect(),
            });
        }

        if let (Some(t), Some(td)) = (observation.temperature, observation.dew_point) {
            observation.humidity = Some(relative_humidity(t, td));
        }
        observation.trend = (!trend.is_empty()).then(|| groups::describe_trend(trend));

        Ok(observation)
    }

    fn decode_time(&self, station: &str, group: Option<&str>) -> Result<NaiveDateTime, DecodeError> {
        let group = group.ok_or_else(|| DecodeError::MissingTime {
            station: station.to_string(),
        })?;
        let caps = groups::TIME
            .captures(group)
            .ok_or_else(|| DecodeError::MissingTime {
                station: station.to_string(),
            })?;
        let invalid_time = || DecodeError::InvalidTime {
            station: station.to_string(),
            group: group.to_string(),
        };

        let field = |name: &str| caps[name].parse::<u32>().map_err(|_| invalid_time());
        let (day, hour, minute) = (field("day")?, field("hour")?, field("minute")?);

        let (mut year, mut month) = (self.reference_date.year(), self.reference_date.month());
        if day > self.reference_date.day() {
            if month == 1 {
                year -= 1;
                month = 12;
            } else {
                month -= 1;
            }
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .and_then(|time| {
                TimeDelta::try_hours(self.time_offset_hours)
                    .and_then(|offset| time.checked_add_signed(offset))
            })
            .ok_or_else(invalid_time)
    }

    fn decode_visibility<'a>(
        cursor: &mut Groups<'a>,
    ) -> Result<Option<Visibility>, (&'a str, String)> {
        let Some(group) = cursor.peek() else {
            return Ok(None);
        };

        if group == "CAVOK" {
            cursor.advance(1);
            return Ok(Some(groups::cavok_visibility()));
        }

        if let Some(caps) = groups::VISIBILITY_METERS.captures(group) {
            cursor.advance(1);
            return Ok(groups::parse_visibility_meters(&caps));
        }

        // Split statute miles: "1 1/2SM".
        if groups::VISIBILITY_WHOLE_MILES.is_match(group) {
            if let Some(fraction) = cursor
                .peek_at(1)
                .filter(|g| groups::VISIBILITY_FRACTION_MILES.is_match(g))
            {
                let whole: u32 = group.parse().map_err(|_| (group, "invalid miles".to_string()))?;
                let caps = groups::VISIBILITY_MILES
                    .captures(fraction)
                    .ok_or_else(|| (fraction, "invalid fraction".to_string()))?;
                let visibility =
                    groups::parse_visibility_miles(&caps, Some(whole)).map_err(|r| (fraction, r))?;
                cursor.advance(2);
                return Ok(Some(visibility));
            }
        }

        if let Some(caps) = groups::VISIBILITY_MILES.captures(group) {
            let visibility = groups::parse_visibility_miles(&caps, None).map_err(|r| (group, r))?;
            cursor.advance(1);
            return Ok(Some(visibility));
        }

        Ok(None)
    }

    // Recent weather, wind shear, runway state and sea state carry nothing the
    // observation keeps, but they are valid groups.
    fn skip_supplementary(cursor: &mut Groups<'_>) {
        while let Some(group) = cursor.peek() {
            if groups::RECENT_WEATHER.is_match(group)
                || groups::RUNWAY_STATE.is_match(group)
                || groups::SEA_STATE.is_match(group)
            {
                cursor.advance(1);
            } else if group == "WS" {
                match (cursor.peek_at(1), cursor.peek_at(2)) {
                    (Some("ALL"), Some("RWY")) => cursor.advance(3),
                    (Some(runway), _) if groups::WIND_SHEAR_RUNWAY.is_match(runway) => {
                        cursor.advance(2)
                    }
                    _ => break,
                }
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::{CloudCover, CloudType, VisibilityQualifier};

    fn decoder() -> MetarDecoder {
        MetarDecoder::builder()
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 20).expect("valid date"))
            .build()
    }

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid datetime")
    }

    #[test]
    fn test_decode_full_report() -> Result<(), DecodeError> {
        let obs = decoder().decode(
            "METAR UUEE 151030Z 27005MPS 240V300 9999 -SHRA BKN020CB OVC050 12/08 Q1013 R24L/290050 NOSIG RMK QFE745",
        )?;

        assert_eq!(obs.station_id, "UUEE");
        assert_eq!(obs.time, at(3, 15, 14, 30));
        assert_eq!(obs.wind_direction, Some(270));
        assert_eq!(obs.wind_speed, Some(5.0));
        assert_eq!(obs.wind_gust, None);
        assert_eq!(obs.temperature, Some(12.0));
        assert_eq!(obs.dew_point, Some(8.0));
        assert!((obs.pressure.unwrap_or_default() - 1013.0 * 0.750062).abs() < 1e-9);
        assert_eq!(obs.weather, Some(vec!["-SHRA".to_string()]));
        assert_eq!(obs.trend.as_deref(), Some("no significant change"));

        let visibility = obs.visibility.expect("visibility present");
        assert_eq!(visibility.qualifier, Some(VisibilityQualifier::GreaterThan));
        assert_eq!(visibility.meters, 10_000.0);

        let clouds = obs.clouds.expect("clouds present");
        assert_eq!(clouds.len(), 2);
        assert_eq!(clouds[0].cover, CloudCover::Broken);
        assert_eq!(clouds[0].cloud_type, Some(CloudType::Cumulonimbus));
        assert_eq!(clouds[1].cover, CloudCover::Overcast);
        assert!((clouds[1].height.unwrap_or_default() - 1524.0).abs() < 1e-9);
        assert_eq!(clouds[1].cloud_type, None);

        let humidity = obs.humidity.expect("humidity present");
        assert!((humidity - relative_humidity(12.0, 8.0)).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_decode_minimal_report_leaves_everything_absent() -> Result<(), DecodeError> {
        let obs = decoder().decode("UUDD 151000Z")?;
        assert_eq!(obs.station_id, "UUDD");
        assert_eq!(obs.time, at(3, 15, 14, 0));
        assert_eq!(obs.temperature, None);
        assert_eq!(obs.dew_point, None);
        assert_eq!(obs.humidity, None);
        assert_eq!(obs.wind_direction, None);
        assert_eq!(obs.wind_speed, None);
        assert_eq!(obs.pressure, None);
        assert_eq!(obs.visibility, None);
        assert_eq!(obs.clouds, None);
        assert_eq!(obs.weather, None);
        assert_eq!(obs.trend, None);
        Ok(())
    }

    #[test]
    fn test_humidity_needs_both_temperature_and_dew_point() -> Result<(), DecodeError> {
        let only_temp = decoder().decode("UUDD 151000Z 00000KT 9999 NSC 20/// Q1015")?;
        assert_eq!(only_temp.temperature, Some(20.0));
        assert_eq!(only_temp.dew_point, None);
        assert_eq!(only_temp.humidity, None);

        let both = decoder().decode("UUDD 151000Z 00000KT 9999 NSC 20/15 Q1015")?;
        let humidity = both.humidity.expect("humidity present");
        assert!((humidity - 0.729_177_6).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_negative_temperatures() -> Result<(), DecodeError> {
        let obs = decoder().decode("ULLI 151000Z 18004MPS 5000 -SN OVC008 M05/M07 Q0998")?;
        assert_eq!(obs.temperature, Some(-5.0));
        assert_eq!(obs.dew_point, Some(-7.0));
        assert!((obs.humidity.unwrap_or_default() - 0.858_505_8).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_missing_sky_differs_from_clear_sky() -> Result<(), DecodeError> {
        let without_sky = decoder().decode("KJFK 151051Z 31008KT 10SM 18/06 A3012")?;
        let clear_sky = decoder().decode("KJFK 151051Z 31008KT 10SM SKC 18/06 A3012")?;

        assert_eq!(without_sky.clouds, None);
        let layers = clear_sky.clouds.clone().expect("clear sky layer");
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].cover, CloudCover::SkyClear);
        assert_eq!(layers[0].height, None);
        assert_ne!(without_sky, clear_sky);
        Ok(())
    }

    #[test]
    fn test_us_report_units() -> Result<(), DecodeError> {
        let obs = decoder().decode("KJFK 151051Z 31008G18KT 1 1/2SM BR FEW250 18/06 A3012 RMK AO2 SLP199")?;
        assert!((obs.wind_speed.unwrap_or_default() - 8.0 * 0.514444).abs() < 1e-9);
        assert!((obs.wind_gust.unwrap_or_default() - 18.0 * 0.514444).abs() < 1e-9);
        let visibility = obs.visibility.expect("visibility present");
        assert_eq!(visibility.qualifier, None);
        assert!((visibility.meters - 1.5 * 1609.344).abs() < 1e-9);
        assert!((obs.pressure.unwrap_or_default() - 30.12 * 25.4).abs() < 1e-9);
        assert_eq!(obs.weather, Some(vec!["BR".to_string()]));
        Ok(())
    }

    #[test]
    fn test_cavok_and_variable_wind() -> Result<(), DecodeError> {
        let obs = decoder().decode("LFPG 151030Z AUTO VRB03KT CAVOK 15/09 Q1022=")?;
        assert_eq!(obs.wind_direction, None);
        assert!((obs.wind_speed.unwrap_or_default() - 3.0 * 0.514444).abs() < 1e-9);
        assert_eq!(obs.visibility.map(|v| v.meters), Some(10_000.0));
        assert_eq!(obs.clouds, None);
        assert!((obs.pressure.unwrap_or_default() - 1022.0 * 0.750062).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_automatic_station_unobserved_weather() -> Result<(), DecodeError> {
        let obs = decoder()
            .decode("EDDF 151020Z AUTO 24008KT 9999 -RA // BKN030 ///TCU 12/08 Q1012")?;
        assert_eq!(obs.weather, Some(vec!["-RA".to_string()]));
        let clouds = obs.clouds.expect("clouds present");
        assert_eq!(clouds.len(), 2);
        assert_eq!(clouds[0].cover, CloudCover::Broken);
        assert_eq!(clouds[1].cover, CloudCover::NotReported);
        assert_eq!(clouds[1].height, None);
        assert_eq!(clouds[1].cloud_type, Some(CloudType::ToweringCumulus));
        assert_eq!(obs.temperature, Some(12.0));
        assert!((obs.pressure.unwrap_or_default() - 1012.0 * 0.750062).abs() < 1e-9);

        let only_unobserved = decoder().decode("LFPG 151030Z AUTO 27005KT 9999 // NCD 15/09 Q1022")?;
        assert_eq!(only_unobserved.weather, None);
        let clouds = only_unobserved.clouds.expect("clouds present");
        assert_eq!(clouds[0].cover, CloudCover::NoCloudDetected);
        assert_eq!(only_unobserved.dew_point, Some(9.0));
        Ok(())
    }

    #[test]
    fn test_trend_with_time_groups() -> Result<(), DecodeError> {
        let obs = decoder().decode("EGLL 151020Z 24012KT 9999 SCT030 14/07 Q1009 TEMPO FM1100 4000 SHRA")?;
        assert_eq!(obs.trend.as_deref(), Some("temporarily from 11:00 4000 SHRA"));
        Ok(())
    }

    #[test]
    fn test_day_after_reference_belongs_to_previous_month() -> Result<(), DecodeError> {
        let obs = decoder().decode("UUEE 282330Z 27005MPS 9999 SCT020 12/08 Q1013")?;
        // Feb 28 23:30 + 4h
        assert_eq!(obs.time, at(2, 29, 3, 30));

        let january = MetarDecoder::builder()
            .reference_date(NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"))
            .time_offset_hours(0)
            .build();
        let obs = january.decode("UUEE 311200Z 27005MPS 9999 SCT020 12/08 Q1013")?;
        assert_eq!(
            obs.time,
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .expect("valid datetime")
        );
        Ok(())
    }

    #[test]
    fn test_empty_report_fails() {
        assert_eq!(decoder().decode(""), Err(DecodeError::Empty));
        assert_eq!(decoder().decode("   "), Err(DecodeError::Empty));
        assert_eq!(decoder().decode("="), Err(DecodeError::Empty));
    }

    #[test]
    fn test_missing_station_fails() {
        assert!(matches!(
            decoder().decode("151030Z 27005MPS 9999"),
            Err(DecodeError::MissingStation(_))
        ));
        assert!(matches!(decoder().decode("METAR"), Err(DecodeError::MissingStation(_))));
        assert!(matches!(decoder().decode("uuee 151030Z"), Err(DecodeError::MissingStation(_))));
    }

    #[test]
    fn test_malformed_time_fails() {
        assert!(matches!(
            decoder().decode("UUEE 27005MPS 9999"),
            Err(DecodeError::MissingTime { .. })
        ));
        assert!(matches!(
            decoder().decode("UUEE 152530Z 27005MPS 9999"),
            Err(DecodeError::InvalidTime { .. })
        ));
        assert!(matches!(
            decoder().decode("UUEE 001030Z 27005MPS 9999"),
            Err(DecodeError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_malformed_groups_fail() {
        assert!(matches!(
            decoder().decode("UUEE 151030Z 45005MPS 9999"),
            Err(DecodeError::InvalidGroup { kind: "wind", .. })
        ));
        let err = decoder()
            .decode("UUEE 151030Z 27005MPS 9999 GARBAGE 12/08 Q1013")
            .expect_err("unparsed group");
        assert_eq!(
            err,
            DecodeError::UnparsedGroups {
                station: "UUEE".to_string(),
                groups: vec!["GARBAGE".to_string(), "12/08".to_string(), "Q1013".to_string()],
            }
        );
    }

    #[test]
    fn test_nil_report_fails() {
        assert_eq!(
            decoder().decode("UUEE 151030Z NIL="),
            Err(DecodeError::NilReport {
                station: "UUEE".to_string()
            })
        );
    }

    #[test]
    fn test_decode_is_deterministic() -> Result<(), DecodeError> {
        let raw = "UUWW 151030Z 33004MPS 300V360 6000 BR FEW005 OVC012 03/02 Q1008 WS R06 NOSIG";
        assert_eq!(decoder().decode(raw)?, decoder().decode(raw)?);
        Ok(())
    }
}
