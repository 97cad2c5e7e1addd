pub mod error;
pub mod nearest;
pub mod resolve;
pub mod spatial_index;
