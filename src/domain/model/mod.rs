pub mod church;
pub mod coord;
pub mod error;
pub mod geocode;
pub mod query;
pub mod region;
