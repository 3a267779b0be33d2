//! Crate-level error type.
//!
//! Every fallible entry point in the crate reports through [`Error`], so
//! callers can use `?` across config loading, catalog parsing and the
//! simulation run.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::klaviyo::KlaviyoError;
use crate::simulator::SimulationError;

/// Errors that stop a seeding run.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Product feed could not be read or parsed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Klaviyo client could not be constructed.
    #[error("Klaviyo error: {0}")]
    Klaviyo(#[from] KlaviyoError),

    /// Simulation refused to start.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_error_messages_carry_source() {
        let err = Error::from(ConfigError::MissingEnvVar("KLAVIYO_API_KEY".to_string()));
        assert!(err.to_string().contains("KLAVIYO_API_KEY"));

        let err = Error::from(CatalogError::NotFound(PathBuf::from("feed.xml")));
        assert!(err.to_string().starts_with("Catalog error"));
        assert!(err.to_string().contains("feed.xml"));

        let err = Error::from(SimulationError::EmptyCatalog(5));
        assert!(err.to_string().contains("empty"));
    }
}
