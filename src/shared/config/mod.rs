pub mod global;
pub mod model;

pub use global::settings;
pub use model::{DecoderConfig, LoggingConfig, Settings, load_settings};

#[cfg(test)]
mod global_test;
