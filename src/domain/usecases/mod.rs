pub mod find_nearest;
pub mod geocode_address;
pub mod load_churches;
pub mod rank_churches;
pub mod resolve_location;
