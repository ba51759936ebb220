use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calc::derivative::DEFAULT_STEP;
use crate::plot::types::{DEFAULT_Y_MAX, DEFAULT_Y_MIN};

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Height in terminal rows for the plot image.
    pub plot_height: u16,
    /// Vertical display range of the plot surface.
    pub y_min: f64,
    pub y_max: f64,
    /// Step for the central-difference slope estimate.
    pub derivative_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plot_height: 24,
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            derivative_step: DEFAULT_STEP,
        }
    }
}

/// Get or create the slopescope config directory (~/.config/slopescope/).
pub fn config_dir() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("slopescope");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Path to the config file.
pub fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

/// Load config from disk, returning defaults if file doesn't exist or is invalid.
pub fn load_config() -> Config {
    let path = match config_path() {
        Some(p) => p,
        None => return Config::default(),
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content).unwrap_or_default(),
        Err(_) => {
            // Create default config file on first run
            let config = Config::default();
            let _ = write_default_config(&path, &config);
            config
        }
    }
}

/// Write a default config file with comments.
fn write_default_config(path: &PathBuf, config: &Config) -> Result<(), String> {
    let content = format!(
        "# slopescope configuration\n\
         \n\
         # Height in terminal rows for the plot image\n\
         plot_height = {}\n\
         \n\
         # Vertical display range of the plot surface\n\
         y_min = {:.1}\n\
         y_max = {:.1}\n\
         \n\
         # Step for the central-difference slope estimate\n\
         derivative_step = {:e}\n",
        config.plot_height, config.y_min, config.y_max, config.derivative_step,
    );
    std::fs::write(path, content.as_bytes()).map_err(|e| format!("write error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.y_min, -10.0);
        assert_eq!(config.y_max, 10.0);
        assert_eq!(config.derivative_step, 1e-8);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("plot_height = 30\n").unwrap();
        assert_eq!(config.plot_height, 30);
        assert_eq!(config.y_max, 10.0);
    }
}
