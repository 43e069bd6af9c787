pub mod api;
pub mod handlers;
pub mod routes;
pub mod settings;
