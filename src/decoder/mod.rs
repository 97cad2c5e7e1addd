pub mod error;
pub(crate) mod groups;
pub mod metar_decoder;
pub mod units;
