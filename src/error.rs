//! Error types for store mutations and configuration loading

/// Failure of a store mutation. The store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    BinNotFound(String),
    DriverNotFound(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::BinNotFound(id) => write!(f, "Bin not found: {}", id),
            StoreError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// An environment variable was set but could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
