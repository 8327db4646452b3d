use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use crate::process::{self, Invocation};
use crate::project;
use crate::target::TargetInfo;

pub const DEFAULT_CF_BINARY: &str = "cf";

/// Operations the deployment needs from the target platform.
pub trait Platform {
    fn login(&mut self, target: &TargetInfo) -> Result<()>;
    fn create_service(&mut self, offering: &str, plan: &str, instance: &str) -> Result<()>;
    /// Locate the project root when none was given on the command line.
    fn project_dir(&mut self) -> Result<Utf8PathBuf>;
    /// Run `argv` in `work_dir`; non-zero exit is an error.
    fn run_command(&mut self, argv: &[String], work_dir: &Utf8Path) -> Result<()>;
    fn push(&mut self, work_dir: &Utf8Path, app_name: Option<&str>) -> Result<()>;
}

/// `Platform` backed by the Cloud Foundry `cf` CLI.
#[derive(Debug)]
pub struct CfCli {
    binary: String,
    start_dir: Utf8PathBuf,
    dry_run: bool,
}

impl CfCli {
    pub fn new(binary: impl Into<String>, start_dir: Utf8PathBuf, dry_run: bool) -> Self {
        Self {
            binary: binary.into(),
            start_dir,
            dry_run,
        }
    }

    fn cf(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec![self.binary.clone()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        argv
    }

    /// `cf api`, `cf auth`, `cf target`. Credentials travel in the `cf auth`
    /// environment so they never show up in the process table.
    pub fn login_invocations(&self, target: &TargetInfo) -> Vec<Invocation> {
        let mut api = self.cf(&["api", target.api_url.as_str()]);
        if target.skip_ssl_validation {
            api.push("--skip-ssl-validation".to_owned());
        }
        let auth = Invocation::new(self.cf(&["auth"]))
            .env("CF_USERNAME", &target.user)
            .env("CF_PASSWORD", &target.password);
        let select = self.cf(&["target", "-o", target.org.as_str(), "-s", target.space.as_str()]);

        vec![Invocation::new(api), auth, Invocation::new(select)]
    }

    pub fn create_service_argv(&self, offering: &str, plan: &str, instance: &str) -> Vec<String> {
        self.cf(&["create-service", offering, plan, instance])
    }

    pub fn push_argv(&self, app_name: Option<&str>) -> Vec<String> {
        let mut argv = self.cf(&["push"]);
        if let Some(name) = app_name {
            argv.push(name.to_owned());
        }
        argv
    }

    /// Returns `None` in dry-run mode, otherwise the finished child.
    fn exec(&self, invocation: &Invocation) -> Result<Option<process::Outcome>> {
        let shown = invocation.shown();
        println!("  -> {}", shown);
        if self.dry_run {
            println!("     (dry-run) skipped");
            return Ok(None);
        }
        let outcome = process::run_streaming(invocation)?;
        process::ensure_success(&outcome, &shown)?;
        Ok(Some(outcome))
    }
}

impl Platform for CfCli {
    fn login(&mut self, target: &TargetInfo) -> Result<()> {
        for invocation in self.login_invocations(target) {
            self.exec(&invocation)?;
        }
        Ok(())
    }

    fn create_service(&mut self, offering: &str, plan: &str, instance: &str) -> Result<()> {
        let invocation =
            Invocation::new(self.create_service_argv(offering, plan, instance)).capture_stdout();
        if let Some(outcome) = self.exec(&invocation)? {
            if outcome.stdout_contains("already exists") {
                tracing::info!(instance, "service instance already exists; leaving it as is");
            }
        }
        Ok(())
    }

    fn project_dir(&mut self) -> Result<Utf8PathBuf> {
        project::discover(&self.start_dir)
    }

    fn run_command(&mut self, argv: &[String], work_dir: &Utf8Path) -> Result<()> {
        self.exec(&Invocation::new(argv.to_vec()).in_dir(work_dir))?;
        Ok(())
    }

    fn push(&mut self, work_dir: &Utf8Path, app_name: Option<&str>) -> Result<()> {
        self.exec(&Invocation::new(self.push_argv(app_name)).in_dir(work_dir))?;
        Ok(())
    }
}
