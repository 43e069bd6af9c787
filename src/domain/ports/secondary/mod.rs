pub mod geocoder;
pub mod records;
