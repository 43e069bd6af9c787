pub mod config;
pub mod deserialize;
pub mod endpoint;
pub mod logger;
