use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gist_core::DEFAULT_PER_PAGE;
use gist_engine::{ApiSettings, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use gist_logging::{gist_info, LogDestination};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "./gist.ron";
pub const TOKEN_ENV: &str = "GIST_TOKEN";
pub const BASE_URL_ENV: &str = "GIST_BASE_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Contents of the RON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub api_version: Option<String>,
    pub per_page: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub log_destination: Option<LogDestination>,
    pub log_level: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub verbose: u8,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub per_page: u32,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

/// Reads `explicit`, or the default file when it exists. A missing default file is not an error.
pub fn load_file(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(FileConfig::default());
            }
            default
        }
    };
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    gist_info!("loaded config from {:?}", path);
    Ok(config)
}

/// Applies precedence: command line, then environment, then file, then defaults.
pub fn resolve(
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
    cli: &CliOverrides,
) -> Settings {
    let pick = |cli: &Option<String>, var: &str, file: Option<String>| {
        cli.clone()
            .or_else(|| env(var).filter(|value| !value.is_empty()))
            .or(file)
    };
    let token = pick(&cli.token, TOKEN_ENV, file.token);
    let base_url = pick(&cli.base_url, BASE_URL_ENV, file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = Duration::from_secs(file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let api = ApiSettings {
        base_url,
        token,
        api_version: file
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        request_timeout: timeout,
        ..ApiSettings::default()
    };

    let file_level = file
        .log_level
        .as_deref()
        .map_or(LevelFilter::Info, gist_logging::parse_level);
    let log_level = match cli.verbose {
        0 => file_level,
        1 => file_level.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    };

    Settings {
        api,
        per_page: file.per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE),
        log_destination: file.log_destination.unwrap_or_default(),
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let settings = resolve(FileConfig::default(), env_of(&[]), &CliOverrides::default());
        assert_eq!(settings.api.base_url, "https://api.github.com");
        assert_eq!(settings.api.token, None);
        assert_eq!(settings.api.api_version, "2022-11-28");
        assert_eq!(settings.api.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.per_page, 10);
        assert_eq!(settings.log_destination, LogDestination::File);
        assert_eq!(settings.log_level, LevelFilter::Info);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig {
            token: Some("from-file".to_string()),
            base_url: Some("http://file.example".to_string()),
            ..FileConfig::default()
        };
        let env = env_of(&[("GIST_TOKEN", "from-env"), ("GIST_BASE_URL", "http://env.example")]);
        let cli = CliOverrides {
            token: Some("from-cli".to_string()),
            ..CliOverrides::default()
        };

        let settings = resolve(file, env, &cli);
        assert_eq!(settings.api.token.as_deref(), Some("from-cli"));
        assert_eq!(settings.api.base_url, "http://env.example");
    }

    #[test]
    fn empty_env_value_falls_through_to_file() {
        let file = FileConfig {
            token: Some("from-file".to_string()),
            ..FileConfig::default()
        };
        let settings = resolve(file, env_of(&[("GIST_TOKEN", "")]), &CliOverrides::default());
        assert_eq!(settings.api.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn verbosity_raises_the_file_level() {
        let file = FileConfig {
            log_level: Some("warn".to_string()),
            ..FileConfig::default()
        };
        let quiet = resolve(file.clone(), env_of(&[]), &CliOverrides::default());
        assert_eq!(quiet.log_level, LevelFilter::Warn);

        let cli = CliOverrides {
            verbose: 1,
            ..CliOverrides::default()
        };
        assert_eq!(resolve(file, env_of(&[]), &cli).log_level, LevelFilter::Debug);
    }

    #[test]
    fn ron_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                token: Some("abc"),
                per_page: Some(25),
                request_timeout_secs: Some(5),
                log_destination: Some(Both),
                log_level: Some("debug"),
            )"#
        )
        .unwrap();

        let config = load_file(Some(file.path())).unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.log_destination, Some(LogDestination::Both));

        let settings = resolve(config, env_of(&[]), &CliOverrides::default());
        assert_eq!(settings.per_page, 25);
        assert_eq!(settings.api.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(per_page: \"ten\")").unwrap();
        assert!(matches!(
            load_file(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ron");
        assert!(matches!(
            load_file(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
