//! Seeder configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (unless running with `--dry-run`)
//! - `KLAVIYO_API_KEY` - Klaviyo private API key
//!
//! ## Optional
//! - `KLAVIYO_BASE_URL` - API base URL (default: `https://a.klaviyo.com/api`)
//! - `KLAVIYO_API_REVISION` - `revision` header (default: 2025-01-15)
//! - `SEEDER_NUM_USERS` - Users to simulate (default: 10)
//! - `SEEDER_PRODUCT_FEED` - Product feed path (default: `data/product_feed.xml`)
//! - `SEEDER_LOOKBACK_DAYS` - Timestamp window in days (default: 270)
//! - `SEEDER_SHIPPING_COUNTRIES` - Comma-separated shipping countries
//!   (default: United Kingdom, Ireland, Isle of Man, Jersey, Guernsey)
//! - `SEEDER_RNG_SEED` - Fixed seed for reproducible runs

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::clock::DEFAULT_LOOKBACK_DAYS;

/// Klaviyo API base URL.
pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/api";

/// Klaviyo API version sent in the `revision` header.
pub const DEFAULT_API_REVISION: &str = "2025-01-15";

const DEFAULT_NUM_USERS: u32 = 10;
const DEFAULT_PRODUCT_FEED: &str = "data/product_feed.xml";
const DEFAULT_SHIPPING_COUNTRIES: &[&str] = &[
    "United Kingdom",
    "Ireland",
    "Isle of Man",
    "Jersey",
    "Guernsey",
];
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your_",
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Complete seeder configuration.
#[derive(Debug, Clone)]
pub struct SeederConfig {
    /// Klaviyo API configuration (absent when no API key is set)
    pub klaviyo: Option<KlaviyoConfig>,
    /// Simulation parameters
    pub simulation: SimulationConfig,
}

/// Klaviyo API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct KlaviyoConfig {
    /// Klaviyo private API key
    pub api_key: SecretString,
    /// API base URL, without the trailing `/events`
    pub base_url: Url,
    /// `revision` header value
    pub revision: String,
}

impl std::fmt::Debug for KlaviyoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("revision", &self.revision)
            .finish()
    }
}

impl KlaviyoConfig {
    /// Configuration for the given key and base URL at the default revision.
    #[must_use]
    pub fn new(api_key: SecretString, base_url: Url) -> Self {
        Self {
            api_key,
            base_url,
            revision: DEFAULT_API_REVISION.to_string(),
        }
    }

    fn from_lookup<F>(env: &F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(key) = env("KLAVIYO_API_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&key, "KLAVIYO_API_KEY")?;

        let raw_url = env_or_default(env, "KLAVIYO_BASE_URL", DEFAULT_BASE_URL);
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("KLAVIYO_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            api_key: SecretString::from(key),
            base_url,
            revision: env_or_default(env, "KLAVIYO_API_REVISION", DEFAULT_API_REVISION),
        }))
    }
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of synthetic users
    pub num_users: u32,
    /// Path to the XML product feed
    pub feed_path: PathBuf,
    /// Size of the timestamp window, in days back from now
    pub lookback_days: u32,
    /// Countries a checkout or order may ship to
    pub shipping_countries: Vec<String>,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_users: DEFAULT_NUM_USERS,
            feed_path: PathBuf::from(DEFAULT_PRODUCT_FEED),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            shipping_countries: DEFAULT_SHIPPING_COUNTRIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load only the simulation parameters, ignoring Klaviyo settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a `SEEDER_*` variable is
    /// present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    fn from_lookup<F>(env: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let shipping_countries = match env("SEEDER_SHIPPING_COUNTRIES") {
            Some(raw) => parse_country_list(&raw)?,
            None => defaults.shipping_countries,
        };

        Ok(Self {
            num_users: parse_or(env, "SEEDER_NUM_USERS", defaults.num_users)?,
            feed_path: env("SEEDER_PRODUCT_FEED").map_or(defaults.feed_path, PathBuf::from),
            lookback_days: parse_or(env, "SEEDER_LOOKBACK_DAYS", defaults.lookback_days)?,
            shipping_countries,
            seed: env("SEEDER_RNG_SEED")
                .map(|raw| parse_value::<u64>("SEEDER_RNG_SEED", &raw))
                .transpose()?,
        })
    }
}

impl SeederConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SeederConfig::from_env`].
    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            klaviyo: KlaviyoConfig::from_lookup(&env)?,
            simulation: SimulationConfig::from_lookup(&env)?,
        })
    }

    /// Load configuration from a fixed set of variables.
    ///
    /// # Errors
    ///
    /// Same as [`SeederConfig::from_env`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Returns the Klaviyo configuration or the error for its missing key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `KLAVIYO_API_KEY` was not set.
    pub fn require_klaviyo(&self) -> Result<&KlaviyoConfig, ConfigError> {
        self.klaviyo
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("KLAVIYO_API_KEY".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn env_or_default<F>(env: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable if present, otherwise use `default`.
fn parse_or<F, T>(env: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated country list, dropping blanks.
fn parse_country_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let countries: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect();

    if countries.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "SEEDER_SHIPPING_COUNTRIES".to_string(),
            "must list at least one country".to_string(),
        ));
    }
    Ok(countries)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const GOOD_KEY: &str = "pk_9f3Ac71bE20d4F8a6c5B1e7D3f9a0C2b";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("YOUR_PRIVATE_API_KEY", "KLAVIYO_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "KLAVIYO_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(GOOD_KEY, "KLAVIYO_API_KEY").is_ok());
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = SeederConfig::from_map(&HashMap::new()).unwrap();
        assert!(config.klaviyo.is_none());
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.simulation.num_users, 10);
        assert_eq!(config.simulation.lookback_days, 270);
        assert_eq!(config.simulation.shipping_countries.len(), 5);
        assert!(matches!(
            config.require_klaviyo(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_klaviyo_config_from_variables() {
        let config = SeederConfig::from_map(&vars(&[
            ("KLAVIYO_API_KEY", GOOD_KEY),
            ("KLAVIYO_BASE_URL", "http://127.0.0.1:9000/api"),
        ]))
        .unwrap();
        let klaviyo = config.require_klaviyo().unwrap();
        assert_eq!(klaviyo.api_key.expose_secret(), GOOD_KEY);
        assert_eq!(klaviyo.base_url.as_str(), "http://127.0.0.1:9000/api");
        assert_eq!(klaviyo.revision, DEFAULT_API_REVISION);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = KlaviyoConfig::new(
            SecretString::from(GOOD_KEY),
            Url::parse(DEFAULT_BASE_URL).unwrap(),
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(GOOD_KEY));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = SeederConfig::from_map(&vars(&[
            ("KLAVIYO_API_KEY", GOOD_KEY),
            ("KLAVIYO_BASE_URL", "not a url"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "KLAVIYO_BASE_URL"));
    }

    #[test]
    fn test_simulation_overrides() {
        let config = SeederConfig::from_map(&vars(&[
            ("SEEDER_NUM_USERS", "0"),
            ("SEEDER_PRODUCT_FEED", "/tmp/feed.xml"),
            ("SEEDER_LOOKBACK_DAYS", "30"),
            ("SEEDER_SHIPPING_COUNTRIES", " France , ,Spain"),
            ("SEEDER_RNG_SEED", "42"),
        ]))
        .unwrap();
        let sim = config.simulation;
        assert_eq!(sim.num_users, 0);
        assert_eq!(sim.feed_path, PathBuf::from("/tmp/feed.xml"));
        assert_eq!(sim.lookback_days, 30);
        assert_eq!(sim.shipping_countries, vec!["France", "Spain"]);
        assert_eq!(sim.seed, Some(42));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = SeederConfig::from_map(&vars(&[("SEEDER_NUM_USERS", "ten")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "SEEDER_NUM_USERS"));
    }

    #[test]
    fn test_empty_country_list_is_rejected() {
        let result = SeederConfig::from_map(&vars(&[("SEEDER_SHIPPING_COUNTRIES", " , ")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
