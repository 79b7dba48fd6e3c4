use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

/// Configuration for the Askboard server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Minutes between two recomputations of the question ranks
    pub rank_refresh_interval_minutes: u64,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub rank_refresh_interval_minutes: Option<u64>,
}

/// Command line arguments for the application
#[derive(Parser, Debug)]
#[clap(name = "askboard", about = "Question endpoints of a Q&A forum")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PORT")]
    pub port: Option<u16>,

    /// Rank refresh interval in minutes
    #[clap(long, env = "RANK_REFRESH_INTERVAL_MINUTES")]
    pub rank_refresh_interval_minutes: Option<u64>,

    /// Debug mode
    #[clap(long, env = "ASKBOARD_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[clap(long, env = "ASKBOARD_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            port: update.port.unwrap_or(self.port),
            rank_refresh_interval_minutes: update
                .rank_refresh_interval_minutes
                .unwrap_or(self.rank_refresh_interval_minutes),
        }
    }

    /// Returns the rank refresh interval as a Duration, never shorter than a
    /// minute
    pub fn rank_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.rank_refresh_interval_minutes.max(1).saturating_mul(60))
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("askboard.db".to_string(), |path| {
        path.join("askboard.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        port: 3000,
        rank_refresh_interval_minutes: 15,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        port: args.port,
        rank_refresh_interval_minutes: args.rank_refresh_interval_minutes,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &CliArgs) -> Config {
    let config_dir = match ProjectDirs::from("com", "askboard", "askboard") {
        Some(proj_dirs) => Some(PathBuf::from(proj_dirs.config_dir())),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    let config_dir = config_dir.filter(|path| {
        let exists = path.exists();
        if !exists {
            info!("Config path not found at {:?}, using defaults", path);
        }
        exists
    });

    let base = base_config(config_dir.clone());
    let config_file = config_dir.map(|dir| dir.join("config.toml"));

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_file).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, port={}, rank_refresh_interval={}min",
        config.database_url, config.port, config.rank_refresh_interval_minutes
    );

    config
}
