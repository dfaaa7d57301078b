use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub geocoder: GeocoderConfig,
    pub map: MapConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,                     // Where /api/history lives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>, // No timeout when unset
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String, // Nominatim rejects anonymous clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub default_lat: f64,
    pub default_lon: f64,
    pub default_name: String,
    pub default_zoom: u8,   // 0 shows the whole world, 8 is the closest
    pub auto_locate: bool,  // Start from IP geolocation instead of the default
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("fairweather-tui/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: 28.6329,
            default_lon: -106.0691,
            default_name: "Chihuahua".to_string(),
            default_zoom: 4,
            auto_locate: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 150 }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, writes the defaults there for the user to edit.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            return match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Config::default()
                }
            };
        }

        let default_config = Config::default();
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "http://weather.internal:8080"

            [map]
            auto_locate = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://weather.internal:8080");
        assert_eq!(config.server.request_timeout_seconds, None);
        assert!(config.map.auto_locate);
        assert_eq!(config.map.default_lat, 28.6329);
        assert_eq!(config.map.default_name, "Chihuahua");
        assert_eq!(config.ui.tick_rate_ms, 150);
    }

    #[test]
    fn missing_file_writes_defaults() {
        let path = std::env::temp_dir().join(format!(
            "fairweather-config-{}.toml",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let config = Config::load_from(&path);
        assert_eq!(config.geocoder.base_url, "https://nominatim.openstreetmap.org");

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[server]"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "fairweather-broken-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[server\nbase_url = ").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        let _ = fs::remove_file(&path);
    }
}
