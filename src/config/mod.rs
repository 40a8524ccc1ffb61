//! Application configuration: environment-backed settings and constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
