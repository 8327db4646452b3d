use anyhow::{Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

/// Files that mark the root of a deployable project.
pub const PROJECT_MARKERS: &[&str] = &["gradlew", "build.gradle", "settings.gradle", "manifest.yml"];

/// Walk up from `start` to the nearest directory holding a project marker.
pub fn discover(start: &Utf8Path) -> Result<Utf8PathBuf> {
    let mut current: Option<&Utf8Path> = Some(start);
    while let Some(dir) = current {
        if PROJECT_MARKERS
            .iter()
            .any(|marker| dir.join(marker).is_file())
        {
            return Ok(dir.to_owned());
        }
        current = dir.parent();
    }

    bail!(
        "no project directory found from {} (looked for {}); pass --project-dir",
        start,
        PROJECT_MARKERS.join(", ")
    )
}

/// Use `explicit` verbatim when given; only otherwise call `discover`.
pub fn resolve_work_dir<F>(explicit: Option<&Utf8Path>, discover: F) -> Result<Utf8PathBuf>
where
    F: FnOnce() -> Result<Utf8PathBuf>,
{
    match explicit {
        Some(dir) => Ok(dir.to_owned()),
        None => discover(),
    }
}
