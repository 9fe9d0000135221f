use std::path::Path;

use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub proxy: ProxyConfig,
    pub fetch: FetchConfig,
    pub compression: CompressionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub proxy_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub batch_size: usize,
    pub timeout_ms: u64,
    pub min_bytes: u64,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompressionConfig {
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
    pub use_worker: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub output_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            proxy: ProxyConfig {
                proxy_url: "https://api.allorigins.win".to_string(),
            },
            fetch: FetchConfig {
                batch_size: 5,
                timeout_ms: 10_000,
                min_bytes: 100,
                max_bytes: 15 * 1024 * 1024,
            },
            compression: CompressionConfig {
                max_size_mb: 1.0,
                max_width_or_height: 1920,
                use_worker: true,
            },
            output: OutputConfig {
                output_dir: ".".to_string(),
            },
        }
    }
}

/// Loads settings from an optional TOML file, then `APP_` environment variables.
///
/// Nested keys use a double underscore: `APP_FETCH__TIMEOUT_MS=5000`.
pub fn load_config(file_path: &Path) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();

    let settings = Config::builder()
        .set_default("proxy.proxy_url", defaults.proxy.proxy_url)?
        .set_default("fetch.batch_size", defaults.fetch.batch_size as u64)?
        .set_default("fetch.timeout_ms", defaults.fetch.timeout_ms)?
        .set_default("fetch.min_bytes", defaults.fetch.min_bytes)?
        .set_default("fetch.max_bytes", defaults.fetch.max_bytes)?
        .set_default("compression.max_size_mb", defaults.compression.max_size_mb)?
        .set_default(
            "compression.max_width_or_height",
            defaults.compression.max_width_or_height as u64,
        )?
        .set_default("compression.use_worker", defaults.compression.use_worker)?
        .set_default("output.output_dir", defaults.output.output_dir)?
        .add_source(File::from(file_path).format(FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    settings.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("does-not-exist.toml")).unwrap();

        assert_eq!(config.proxy.proxy_url, "https://api.allorigins.win");
        assert_eq!(config.fetch.batch_size, 5);
        assert_eq!(config.fetch.timeout_ms, 10_000);
        assert_eq!(config.fetch.min_bytes, 100);
        assert_eq!(config.fetch.max_bytes, 15 * 1024 * 1024);
        assert_eq!(config.compression.max_width_or_height, 1920);
        assert!(config.compression.use_worker);
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[output]\noutput_dir = \"from-file\"\n").unwrap();

        // No other test reads output_dir, so the variable cannot leak into them
        std::env::set_var("APP_OUTPUT__OUTPUT_DIR", "from-env");
        let config = load_config(file.path());
        std::env::remove_var("APP_OUTPUT__OUTPUT_DIR");

        assert_eq!(config.unwrap().output.output_dir, "from-env");
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[proxy]\nproxy_url = \"http://localhost:9000\"\n\n[fetch]\nbatch_size = 3\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.proxy.proxy_url, "http://localhost:9000");
        assert_eq!(config.fetch.batch_size, 3);
        assert_eq!(config.fetch.timeout_ms, 10_000);
    }
}
