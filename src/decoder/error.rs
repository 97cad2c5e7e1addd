use thiserror::Error;

/// Raised when a raw report does not follow the METAR grammar. Decoding is
/// all-or-nothing: any of these discards the whole report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("METAR report is empty")]
    Empty,

    #[error("Missing or invalid station identifier '{0}'")]
    MissingStation(String),

    #[error("Missing observation time group for station {station}")]
    MissingTime { station: String },

    #[error("Invalid observation time '{group}' for station {station}")]
    InvalidTime { station: String, group: String },

    #[error("Invalid {kind} group '{group}' for station {station}: {reason}")]
    InvalidGroup {
        station: String,
        kind: &'static str,
        group: String,
        reason: String,
    },

    #[error("Unparsed groups for station {station}: {}", .groups.join(" "))]
    UnparsedGroups { station: String, groups: Vec<String> },

    // NIL means the station sent a placeholder instead of an observation.
    #[error("Station {station} reported NIL")]
    NilReport { station: String },
}
