use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

/// One child process to run. Environment values are never logged.
pub struct Invocation {
    pub argv: Vec<String>,
    pub work_dir: Option<Utf8PathBuf>,
    pub env: BTreeMap<String, String>,
    pub capture_stdout: bool,
}

impl Invocation {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            work_dir: None,
            env: BTreeMap::new(),
            capture_stdout: false,
        }
    }

    pub fn in_dir(mut self, dir: &Utf8Path) -> Self {
        self.work_dir = Some(dir.to_owned());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Keep stdout lines in the `Outcome` as well as echoing them.
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn shown(&self) -> String {
        format_command(&self.argv)
    }
}

/// Exit status plus the stdout lines a child printed, if captured.
#[derive(Debug)]
pub struct Outcome {
    pub status: ExitStatus,
    pub stdout: Vec<String>,
}

impl Outcome {
    pub fn stdout_contains(&self, needle: &str) -> bool {
        self.stdout.iter().any(|line| line.contains(needle))
    }
}

pub fn format_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.is_empty() {
                "\"\"".to_owned()
            } else if arg.chars().any(|c| c.is_whitespace()) {
                let escaped = arg.replace('"', "\\\"");
                format!("\"{}\"", escaped)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the invocation, echoing its output line by line while it runs.
pub fn run_streaming(invocation: &Invocation) -> Result<Outcome> {
    let Some((program, args)) = invocation.argv.split_first() else {
        bail!("invalid command: empty argv");
    };
    let shown = invocation.shown();

    let mut command = ProcessCommand::new(program);
    command.args(args);
    if let Some(dir) = &invocation.work_dir {
        command.current_dir(dir);
    }
    command.envs(&invocation.env);
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let env_keys: Vec<&str> = invocation.env.keys().map(String::as_str).collect();
    tracing::debug!(
        command = %shown,
        work_dir = ?invocation.work_dir,
        env = ?env_keys,
        "spawning"
    );
    let start = Instant::now();
    let mut child = command
        .spawn()
        .with_context(|| format!("executing `{}`", shown))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let capture = invocation.capture_stdout;

    let stdout_handle = stdout.map(|pipe| {
        thread::spawn(move || {
            let mut captured = Vec::new();
            for line in BufReader::new(pipe).lines().map_while(|line| line.ok()) {
                println!("     stdout | {}", line);
                if capture {
                    captured.push(line);
                }
            }
            captured
        })
    });

    let stderr_handle = stderr.map(|pipe| {
        thread::spawn(move || {
            for line in BufReader::new(pipe).lines().map_while(|line| line.ok()) {
                eprintln!("     stderr | {}", line);
            }
        })
    });

    let stdout = stdout_handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    if let Some(handle) = stderr_handle {
        let _ = handle.join();
    }

    let status = child
        .wait()
        .with_context(|| format!("waiting on `{}`", shown))?;
    tracing::debug!(
        command = %shown,
        elapsed = ?start.elapsed(),
        code = ?status.code(),
        "finished"
    );

    Ok(Outcome { status, stdout })
}

/// Turn a non-zero exit into an error.
pub fn ensure_success(outcome: &Outcome, shown: &str) -> Result<()> {
    if outcome.status.success() {
        Ok(())
    } else {
        bail!(
            "command `{}` failed with exit code {:?}",
            shown,
            outcome.status.code()
        )
    }
}
