use std::path::PathBuf;

use clap::Parser;

/// Name of the application this tool deploys.
pub const APP_NAME: &str = "hbase-reader";

/// Command-line surface for deploying `hbase-reader`.
#[derive(Parser, Debug)]
#[command(
    name = "hbase-reader-deploy",
    version,
    about = "Provision backing services, build and push hbase-reader"
)]
pub struct Cli {
    /// Push under this name instead of the one in the app manifest.
    #[arg(long = "app-name")]
    pub app_name: Option<String>,
    /// Project directory; discovered from the current directory when omitted.
    #[arg(short = 'd', long = "project-dir")]
    pub project_dir: Option<PathBuf>,
    #[arg(short = 'a', long = "api-url", env = "CF_API_URL")]
    pub api_url: Option<String>,
    #[arg(short = 'u', long = "user", env = "CF_USER")]
    pub user: Option<String>,
    #[arg(short = 'p', long = "password", env = "CF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(short = 'o', long = "org", env = "CF_ORG")]
    pub org: Option<String>,
    #[arg(short = 's', long = "space", env = "CF_SPACE")]
    pub space: Option<String>,
    #[arg(long = "skip-ssl-validation")]
    pub skip_ssl_validation: bool,
    /// Push whatever is already built instead of running the build first.
    #[arg(long = "skip-build")]
    pub skip_build: bool,
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse() -> Cli {
    Cli::parse()
}
