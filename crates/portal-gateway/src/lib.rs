//! HTTP boundary of the shortener.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use error::{AppError, Result};
pub use state::AppState;
