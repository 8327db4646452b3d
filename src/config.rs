use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

const CONFIG_DIR: &str = ".deploy";
const CONFIG_FILE: &str = "config.toml";
const HOME_DIR: &str = ".hbase-reader-deploy";

/// Optional defaults loaded from `.deploy/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    pub cf_binary: Option<String>,
    pub target: Option<TargetConfig>,
}

/// Connection defaults. There is no password field; it only comes from
/// `--password` or `CF_PASSWORD`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub api_url: Option<String>,
    pub user: Option<String>,
    pub org: Option<String>,
    pub space: Option<String>,
    pub skip_ssl_validation: Option<bool>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
}

impl ConfigPathSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedConfigPath {
    pub path: Utf8PathBuf,
    pub source: ConfigPathSource,
}

/// Pick the config file: `--file`, then the nearest `.deploy/config.toml`
/// above `start`, then the per-user default.
pub fn resolve_path(explicit: Option<&Utf8Path>, start: &Utf8Path) -> Result<ResolvedConfigPath> {
    if let Some(path) = explicit {
        return Ok(ResolvedConfigPath {
            path: path.to_owned(),
            source: ConfigPathSource::Explicit,
        });
    }

    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.exists() {
            return Ok(ResolvedConfigPath {
                path: candidate,
                source: ConfigPathSource::Discovered,
            });
        }
        current = dir.parent();
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("unable to determine home directory"))?;
    let home = Utf8PathBuf::from_path_buf(home)
        .map_err(|_| anyhow!("home directory is not valid UTF-8"))?;
    Ok(ResolvedConfigPath {
        path: home.join(HOME_DIR).join(CONFIG_FILE),
        source: ConfigPathSource::HomeDefault,
    })
}

/// Load the resolved config. Only an explicit path is required to exist.
pub fn load(resolved: &ResolvedConfigPath) -> Result<DeployConfig> {
    if !resolved.path.exists() {
        if resolved.source == ConfigPathSource::Explicit {
            anyhow::bail!("config file {} does not exist", resolved.path);
        }
        tracing::debug!(path = %resolved.path, "no config file; using defaults");
        return Ok(DeployConfig::default());
    }
    load_from_path(&resolved.path)
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<DeployConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(label: &str) -> Utf8PathBuf {
        let mut dir = std::env::temp_dir();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("hbase-deploy-config-{label}-{ts}"));
        Utf8PathBuf::from_path_buf(dir).unwrap()
    }

    #[test]
    fn resolve_prefers_explicit_file() {
        let root = unique_temp_dir("explicit");
        let explicit = root.join("custom.toml");
        let resolved = resolve_path(Some(explicit.as_path()), &root).unwrap();
        assert_eq!(resolved.source, ConfigPathSource::Explicit);
        assert_eq!(resolved.path, explicit);
    }

    #[test]
    fn resolve_finds_nearest_config_above_start() {
        let root = unique_temp_dir("discover");
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(root.join(CONFIG_DIR)).unwrap();
        fs::write(root.join(CONFIG_DIR).join(CONFIG_FILE), "cf_binary = 'cf8'\n").unwrap();

        let resolved = resolve_path(None, &nested).unwrap();
        assert_eq!(resolved.source, ConfigPathSource::Discovered);
        assert!(resolved.path.ends_with(".deploy/config.toml"));

        let config = load(&resolved).unwrap();
        assert_eq!(config.cf_binary.as_deref(), Some("cf8"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let root = unique_temp_dir("missing");
        let resolved = ResolvedConfigPath {
            path: root.join("nope.toml"),
            source: ConfigPathSource::Explicit,
        };
        let err = load(&resolved).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn missing_default_file_yields_empty_config() {
        let root = unique_temp_dir("default");
        let resolved = ResolvedConfigPath {
            path: root.join(HOME_DIR).join(CONFIG_FILE),
            source: ConfigPathSource::HomeDefault,
        };
        let config = load(&resolved).unwrap();
        assert!(config.cf_binary.is_none());
        assert!(config.target.is_none());
    }

    #[test]
    fn parses_target_section() {
        let root = unique_temp_dir("target");
        fs::create_dir_all(&root).unwrap();
        let path = root.join("config.toml");
        fs::write(
            &path,
            r#"[target]
api_url = "https://api.example.com"
user = "admin"
org = "demo"
space = "dev"
skip_ssl_validation = true
"#,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        let target = config.target.unwrap();
        assert_eq!(target.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(target.user.as_deref(), Some("admin"));
        assert_eq!(target.org.as_deref(), Some("demo"));
        assert_eq!(target.space.as_deref(), Some("dev"));
        assert_eq!(target.skip_ssl_validation, Some(true));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rejects_password_in_config() {
        let root = unique_temp_dir("password");
        fs::create_dir_all(&root).unwrap();
        let path = root.join("config.toml");
        fs::write(&path, "[target]\npassword = \"hunter2\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));

        let _ = fs::remove_dir_all(&root);
    }
}
