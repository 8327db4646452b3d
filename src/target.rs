use std::fmt;

use anyhow::{Result, bail};

use crate::cli::Cli;
use crate::config::DeployConfig;

/// Everything needed to log in and target an org/space.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub api_url: String,
    pub user: String,
    pub password: String,
    pub org: String,
    pub space: String,
    pub skip_ssl_validation: bool,
}

impl fmt::Debug for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetInfo")
            .field("api_url", &self.api_url)
            .field("user", &self.user)
            .field("password", &"*****")
            .field("org", &self.org)
            .field("space", &self.space)
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .finish()
    }
}

/// Derive connection info from parsed arguments, falling back to the config
/// file for everything except the password.
pub fn get_info(cli: &Cli, config: &DeployConfig) -> Result<TargetInfo> {
    let defaults = config.target.as_ref();
    let api_url = pick(&cli.api_url, defaults.and_then(|t| t.api_url.as_ref()));
    let user = pick(&cli.user, defaults.and_then(|t| t.user.as_ref()));
    let password = pick(&cli.password, None);
    let org = pick(&cli.org, defaults.and_then(|t| t.org.as_ref()));
    let space = pick(&cli.space, defaults.and_then(|t| t.space.as_ref()));

    let mut missing = Vec::new();
    if api_url.is_none() {
        missing.push("api url (--api-url or CF_API_URL)");
    }
    if user.is_none() {
        missing.push("user (--user or CF_USER)");
    }
    if password.is_none() {
        missing.push("password (--password or CF_PASSWORD)");
    }
    if org.is_none() {
        missing.push("org (--org or CF_ORG)");
    }
    if space.is_none() {
        missing.push("space (--space or CF_SPACE)");
    }

    let (Some(api_url), Some(user), Some(password), Some(org), Some(space)) =
        (api_url, user, password, org, space)
    else {
        bail!("missing platform connection info: {}", missing.join(", "));
    };

    let skip_ssl_validation = cli.skip_ssl_validation
        || defaults
            .and_then(|target| target.skip_ssl_validation)
            .unwrap_or(false);

    Ok(TargetInfo {
        api_url,
        user,
        password,
        org,
        space,
        skip_ssl_validation,
    })
}

fn pick(flag: &Option<String>, fallback: Option<&String>) -> Option<String> {
    flag.as_ref()
        .or(fallback)
        .filter(|value| !value.is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["hbase-reader-deploy"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn full_flags() -> Vec<&'static str> {
        vec![
            "-a",
            "https://api.example.com",
            "-u",
            "admin",
            "-p",
            "secret",
            "-o",
            "demo",
            "-s",
            "dev",
        ]
    }

    #[test]
    fn builds_from_flags() {
        let info = get_info(&cli(&full_flags()), &DeployConfig::default()).unwrap();
        assert_eq!(info.api_url, "https://api.example.com");
        assert_eq!(info.user, "admin");
        assert_eq!(info.password, "secret");
        assert_eq!(info.org, "demo");
        assert_eq!(info.space, "dev");
        assert!(!info.skip_ssl_validation);
    }

    #[test]
    fn falls_back_to_config_target() {
        let config = DeployConfig {
            cf_binary: None,
            target: Some(TargetConfig {
                api_url: Some("https://api.config".to_owned()),
                user: Some("config-user".to_owned()),
                org: Some("config-org".to_owned()),
                space: Some("config-space".to_owned()),
                skip_ssl_validation: Some(true),
            }),
        };
        let info = get_info(&cli(&["-p", "secret", "-s", "flag-space"]), &config).unwrap();
        assert_eq!(info.api_url, "https://api.config");
        assert_eq!(info.user, "config-user");
        assert_eq!(info.org, "config-org");
        assert_eq!(info.space, "flag-space");
        assert!(info.skip_ssl_validation);
    }

    #[test]
    fn reports_every_missing_field() {
        let err = get_info(&cli(&["-a", "https://api.example.com"]), &DeployConfig::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("user"));
        assert!(err.contains("password"));
        assert!(err.contains("org"));
        assert!(err.contains("space"));
        assert!(!err.contains("api url"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut flags = full_flags();
        flags[5] = "";
        let err = get_info(&cli(&flags), &DeployConfig::default()).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn debug_output_hides_password() {
        let info = get_info(&cli(&full_flags()), &DeployConfig::default()).unwrap();
        let rendered = format!("{info:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("*****"));
    }
}
