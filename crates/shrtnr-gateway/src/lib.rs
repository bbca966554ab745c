//! HTTP front end and process wiring for the shrtnr URL shortener.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;
pub mod verify;

pub use app::App;
pub use state::AppState;
