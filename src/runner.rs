use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;

use crate::cli::{APP_NAME, Cli};
use crate::config;
use crate::platform::{CfCli, DEFAULT_CF_BINARY, Platform};
use crate::project;
use crate::target::{self, TargetInfo};

/// A backing service instance the application binds to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServiceSpec {
    pub offering: &'static str,
    pub plan: &'static str,
    pub instance: &'static str,
}

/// Provisioned in this order on every run, regardless of arguments.
pub const SERVICES: [ServiceSpec; 2] = [
    ServiceSpec {
        offering: "hbase",
        plan: "bare",
        instance: "hbase1",
    },
    ServiceSpec {
        offering: "kerberos",
        plan: "shared",
        instance: "kerberos-instance",
    },
];

/// Produces the deployable jar.
pub const BUILD_COMMAND: [&str; 4] = ["./gradlew", "clean", "check", "assemble"];

#[derive(Clone, Debug)]
pub struct DeployRequest {
    pub target: TargetInfo,
    pub app_name: Option<String>,
    pub project_dir: Option<Utf8PathBuf>,
    pub skip_build: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    let cwd = current_working_dir()?;
    let explicit = cli.file.as_deref().map(utf8_path).transpose()?;
    let resolved = config::resolve_path(explicit.as_deref(), &cwd)?;
    tracing::debug!(path = %resolved.path, source = resolved.source.as_str(), "config");
    let config = config::load(&resolved)?;

    let target = target::get_info(&cli, &config)?;
    let request = DeployRequest {
        target,
        app_name: cli.app_name.clone(),
        project_dir: cli.project_dir.as_deref().map(utf8_path).transpose()?,
        skip_build: cli.skip_build,
    };

    let binary = config.cf_binary.as_deref().unwrap_or(DEFAULT_CF_BINARY);
    let mut platform = CfCli::new(binary, cwd, cli.dry_run);
    deploy(&mut platform, &request)?;

    if cli.dry_run {
        println!("Deployment of `{}` simulated (dry-run).", display_name(&request));
    } else {
        println!("Deployment of `{}` completed successfully.", display_name(&request));
    }
    Ok(())
}

/// Log in, provision services, build and push. Stops at the first failure.
pub fn deploy<P: Platform>(platform: &mut P, request: &DeployRequest) -> Result<()> {
    let target = &request.target;
    tracing::info!(
        app = display_name(request),
        api = %target.api_url,
        org = %target.org,
        space = %target.space,
        "deploying"
    );

    platform
        .login(target)
        .with_context(|| format!("logging in to {}", target.api_url))?;

    for service in SERVICES {
        tracing::info!(
            offering = service.offering,
            plan = service.plan,
            instance = service.instance,
            "creating service"
        );
        platform
            .create_service(service.offering, service.plan, service.instance)
            .with_context(|| format!("creating service {}", service.instance))?;
    }

    let work_dir = project::resolve_work_dir(request.project_dir.as_deref(), || {
        platform.project_dir()
    })
    .context("resolving project directory")?;
    tracing::info!(dir = %work_dir, "project directory");

    if request.skip_build {
        tracing::info!("skipping build");
    } else {
        let argv: Vec<String> = BUILD_COMMAND.iter().map(|arg| arg.to_string()).collect();
        platform
            .run_command(&argv, &work_dir)
            .with_context(|| format!("building in {}", work_dir))?;
    }

    platform
        .push(&work_dir, request.app_name.as_deref())
        .with_context(|| format!("pushing from {}", work_dir))?;
    Ok(())
}

fn display_name(request: &DeployRequest) -> &str {
    request.app_name.as_deref().unwrap_or(APP_NAME)
}

fn utf8_path(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|path| anyhow!("path {} is not valid UTF-8", path.display()))
}

fn current_working_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|_| anyhow!("current directory is not valid UTF-8"))
}
