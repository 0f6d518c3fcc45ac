//! Configuration errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read machine file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse machine file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid LED color order: {0}")]
    InvalidColorOrder(String),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),
}
