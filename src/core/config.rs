//! Configuration constants and settings

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

// Concurrency Configuration
pub const DEFAULT_CONCURRENCY: usize = 4;
// Capacity of the shared job queue; 1 is the closest tokio gets to a rendezvous channel
pub const JOB_QUEUE_CAPACITY: usize = 1;
// How long a cancelled pool may take to wind down in-flight clones
pub const CANCEL_GRACE_PERIOD_SECS: u64 = 10;

// GitHub
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SSH_HOST: &str = "github.com";
pub const API_PAGE_SIZE: usize = 100;
pub const USER_AGENT: &str = "gh-recurse";

// SSH credentials
pub const SSH_USERNAME: &str = "git";
pub const DEFAULT_PUBLIC_KEY: &str = ".ssh/id_rsa.pub";
pub const DEFAULT_PRIVATE_KEY: &str = ".ssh/id_rsa";

// libgit2 reports a populated destination with this phrase
pub const EXISTS_ERROR_MARKER: &str = "exists and is not an empty directory";

// Configuration sources
pub const CONFIG_FILE_NAME: &str = ".gh-recurse.toml";
pub const TOKEN_ENV: &str = "GITHUB_OAUTH_TOKEN";
pub const CONCURRENCY_ENV: &str = "GH_RECURSE_CONCURRENCY";
pub const API_URL_ENV: &str = "GH_RECURSE_API_URL";
pub const SSH_HOST_ENV: &str = "GH_RECURSE_SSH_HOST";
pub const INSECURE_ENV: &str = "GH_RECURSE_INSECURE";

/// Values accepted in the TOML settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub ssh_host: Option<String>,
    pub concurrency: Option<usize>,
    pub insecure: Option<bool>,
    pub public_key: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
    pub dest: Option<PathBuf>,
}

/// Values given on the command line; these win over every other source
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub concurrency: Option<usize>,
    pub insecure: bool,
    pub dest: Option<PathBuf>,
}

/// Where the settings file comes from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Passed with `--config`; must exist
    Explicit(PathBuf),
    /// `$HOME/.gh-recurse.toml`; silently ignored when absent
    Default(PathBuf),
    /// No file at all
    None,
}

/// Fully resolved settings for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Option<String>,
    pub api_url: String,
    pub ssh_host: String,
    pub concurrency: usize,
    pub insecure: bool,
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub dest: PathBuf,
    /// The settings file that was actually read, if any
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from the process environment and the user's home directory
    ///
    /// Precedence, lowest to highest: built-in defaults, settings file,
    /// environment variables, command line flags.
    pub fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let home = dirs::home_dir();
        let source = match (config_path, home.as_ref()) {
            (Some(path), _) => ConfigSource::Explicit(path.to_path_buf()),
            (None, Some(home)) => ConfigSource::Default(home.join(CONFIG_FILE_NAME)),
            (None, None) => ConfigSource::None,
        };
        let cwd = std::env::current_dir().context("Failed to read current directory")?;

        Self::resolve(&source, home.as_deref(), &cwd, overrides, |key| {
            std::env::var(key).ok()
        })
    }

    /// Merges every source into a `Settings` value
    ///
    /// `env` looks up an environment variable by name, which keeps this
    /// function independent of the real process environment.
    pub fn resolve<F>(
        source: &ConfigSource,
        home: Option<&Path>,
        cwd: &Path,
        overrides: &CliOverrides,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (file, config_file) = read_settings_file(source)?;
        if let Some(path) = &config_file {
            info!("Using config file: {}", path.display());
        }

        let token = env(TOKEN_ENV)
            .filter(|token| !token.is_empty())
            .or(file.token);

        let api_url = env(API_URL_ENV)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let ssh_host = env(SSH_HOST_ENV)
            .or(file.ssh_host)
            .unwrap_or_else(|| DEFAULT_SSH_HOST.to_string());

        let env_concurrency = match env(CONCURRENCY_ENV) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .with_context(|| format!("{CONCURRENCY_ENV} must be a positive integer, got {raw:?}"))?,
            ),
            None => None,
        };
        let concurrency = overrides
            .concurrency
            .or(env_concurrency)
            .or(file.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            anyhow::bail!("Concurrency must be at least 1");
        }

        let env_insecure = match env(INSECURE_ENV) {
            Some(raw) => Some(parse_bool(&raw).with_context(|| {
                format!("{INSECURE_ENV} must be a boolean, got {raw:?}")
            })?),
            None => None,
        };
        let insecure =
            overrides.insecure || env_insecure.or(file.insecure).unwrap_or(false);

        let (public_key, private_key) = match (file.public_key, file.private_key) {
            (Some(public_key), Some(private_key)) => (public_key, private_key),
            (public_key, private_key) => {
                let home = home.context(
                    "Could not determine home directory; set public_key and private_key in the config file",
                )?;
                (
                    public_key.unwrap_or_else(|| home.join(DEFAULT_PUBLIC_KEY)),
                    private_key.unwrap_or_else(|| home.join(DEFAULT_PRIVATE_KEY)),
                )
            }
        };

        let dest = overrides
            .dest
            .clone()
            .or(file.dest)
            .unwrap_or_else(|| cwd.to_path_buf());

        Ok(Self {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            ssh_host,
            concurrency,
            insecure,
            public_key,
            private_key,
            dest,
            config_file,
        })
    }
}

/// Reads and parses the settings file named by `source`
fn read_settings_file(source: &ConfigSource) -> Result<(FileSettings, Option<PathBuf>)> {
    let (path, required) = match source {
        ConfigSource::Explicit(path) => (path, true),
        ConfigSource::Default(path) => (path, false),
        ConfigSource::None => return Ok((FileSettings::default(), None)),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((FileSettings::default(), None));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
        }
    };

    let settings: FileSettings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok((settings, Some(path.clone())))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised boolean {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn resolve(source: &ConfigSource, overrides: &CliOverrides, env: &[(&str, &str)]) -> Result<Settings> {
        Settings::resolve(
            source,
            Some(Path::new("/home/tester")),
            Path::new("/work"),
            overrides,
            env_from(env),
        )
    }

    #[test]
    fn test_defaults_without_any_source() {
        let settings = resolve(&ConfigSource::None, &CliOverrides::default(), &[]).unwrap();
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.ssh_host, DEFAULT_SSH_HOST);
        assert!(!settings.insecure);
        assert!(settings.token.is_none());
        assert_eq!(settings.private_key, PathBuf::from("/home/tester/.ssh/id_rsa"));
        assert_eq!(settings.public_key, PathBuf::from("/home/tester/.ssh/id_rsa.pub"));
        assert_eq!(settings.dest, PathBuf::from("/work"));
        assert!(settings.config_file.is_none());
    }

    #[test]
    fn test_missing_default_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let source = ConfigSource::Default(temp_dir.path().join(CONFIG_FILE_NAME));
        let settings = resolve(&source, &CliOverrides::default(), &[]).unwrap();
        assert!(settings.config_file.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = ConfigSource::Explicit(temp_dir.path().join("nope.toml"));
        let err = resolve(&source, &CliOverrides::default(), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_file_values_are_used() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
token = "from-file"
concurrency = 8
insecure = true
ssh_host = "git.example.com"
private_key = "/keys/deploy"
public_key = "/keys/deploy.pub"
"#,
        )
        .unwrap();

        let settings =
            resolve(&ConfigSource::Explicit(path.clone()), &CliOverrides::default(), &[]).unwrap();
        assert_eq!(settings.token.as_deref(), Some("from-file"));
        assert_eq!(settings.concurrency, 8);
        assert!(settings.insecure);
        assert_eq!(settings.ssh_host, "git.example.com");
        assert_eq!(settings.private_key, PathBuf::from("/keys/deploy"));
        assert_eq!(settings.config_file, Some(path));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "concurency = 3\n").unwrap();

        let err = resolve(&ConfigSource::Explicit(path), &CliOverrides::default(), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides_file_and_cli_overrides_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "concurrency = 8\ntoken = \"from-file\"\n").unwrap();
        let source = ConfigSource::Explicit(path);
        let env = [(CONCURRENCY_ENV, "6"), (TOKEN_ENV, "from-env")];

        let settings = resolve(&source, &CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.concurrency, 6);
        assert_eq!(settings.token.as_deref(), Some("from-env"));

        let overrides = CliOverrides {
            concurrency: Some(2),
            ..CliOverrides::default()
        };
        let settings = resolve(&source, &overrides, &env).unwrap();
        assert_eq!(settings.concurrency, 2);
    }

    #[test]
    fn test_empty_token_env_falls_back_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "token = \"from-file\"\n").unwrap();

        let settings = resolve(
            &ConfigSource::Explicit(path),
            &CliOverrides::default(),
            &[(TOKEN_ENV, "")],
        )
        .unwrap();
        assert_eq!(settings.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let overrides = CliOverrides {
            concurrency: Some(0),
            ..CliOverrides::default()
        };
        assert!(resolve(&ConfigSource::None, &overrides, &[]).is_err());
    }

    #[test]
    fn test_invalid_env_values_are_rejected() {
        assert!(resolve(&ConfigSource::None, &CliOverrides::default(), &[(CONCURRENCY_ENV, "many")]).is_err());
        assert!(resolve(&ConfigSource::None, &CliOverrides::default(), &[(INSECURE_ENV, "maybe")]).is_err());
    }

    #[test]
    fn test_insecure_from_env() {
        let settings =
            resolve(&ConfigSource::None, &CliOverrides::default(), &[(INSECURE_ENV, "true")]).unwrap();
        assert!(settings.insecure);
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let settings = resolve(
            &ConfigSource::None,
            &CliOverrides::default(),
            &[(API_URL_ENV, "http://localhost:8080/")],
        )
        .unwrap();
        assert_eq!(settings.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_key_paths_require_home_unless_configured() {
        let err = Settings::resolve(
            &ConfigSource::None,
            None,
            Path::new("/work"),
            &CliOverrides::default(),
            env_from(&[]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }
}
