/// Server configuration from environment variables
///
/// Controls the bind address, data directory, fault injection and CORS.
/// A `.env` file is honored when present.
use std::env;
use std::path::PathBuf;

pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Random fault injection settings for the request gate
#[derive(Clone, Debug, PartialEq)]
pub struct FaultConfig {
    /// When false the gate passes every request through
    pub enabled: bool,
    /// Probability in [0, 1] that a request is rejected
    pub failure_rate: f64,
}

impl FaultConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            failure_rate: 0.0,
        }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_rate: DEFAULT_FAILURE_RATE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory holding `wallets.json` and `transactions.json`
    pub data_dir: PathBuf,
    pub fault: FaultConfig,
    /// Allowed CORS origins; `None` allows any origin
    pub allowed_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `BIND_ADDRESS`: listen address (default `0.0.0.0:3000`)
    /// - `PORT`: port used with `0.0.0.0` when `BIND_ADDRESS` is unset
    /// - `DATA_DIR`: data directory (default `./data`)
    /// - `ENABLE_ERROR_SIMULATION`: "false"/"0" turns fault injection off
    /// - `ERROR_FAILURE_RATE`: rejection probability (default 0.1)
    /// - `ALLOWED_ORIGINS`: comma separated CORS origins
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Reliable server on port 4000 with data in /tmp/tracker
    /// PORT=4000 DATA_DIR=/tmp/tracker ENABLE_ERROR_SIMULATION=false cargo run
    /// ```
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| {
            let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let enabled = env::var("ENABLE_ERROR_SIMULATION")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let failure_rate = match env::var("ERROR_FAILURE_RATE") {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() => rate.clamp(0.0, 1.0),
                _ => {
                    log::warn!(
                        "⚠️  Invalid ERROR_FAILURE_RATE '{}', defaulting to {}",
                        raw,
                        DEFAULT_FAILURE_RATE
                    );
                    DEFAULT_FAILURE_RATE
                }
            },
            Err(_) => DEFAULT_FAILURE_RATE,
        };

        if enabled {
            log::info!("🚨 Error simulation enabled ({}% failure rate)", failure_rate * 100.0);
        } else {
            log::info!("Error simulation disabled");
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|origins| parse_origins(&origins))
            .filter(|origins| !origins.is_empty());

        Self {
            bind_address,
            data_dir,
            fault: FaultConfig {
                enabled,
                failure_rate,
            },
            allowed_origins,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            data_dir: PathBuf::from("./data"),
            fault: FaultConfig::default(),
            allowed_origins: None,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fault_config() {
        let config = ServerConfig::default();
        assert!(config.fault.enabled);
        assert_eq!(config.fault.failure_rate, 0.1);
        assert!(config.allowed_origins.is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://tracker.example.com,,"),
            vec!["http://localhost:5173", "https://tracker.example.com"]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
