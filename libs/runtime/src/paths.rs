//! Home directory resolution for server state (database files, logs).

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the directory the server keeps its state in.
///
/// - `None` ⇒ `<user home>/<default_subdir>`
/// - `~` or `~/...` ⇒ expanded against the user home
/// - relative paths ⇒ joined onto the current working directory
///
/// With `create` set the directory is created if missing.
pub fn resolve_home_dir(
    requested: Option<&str>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let user_home = || dirs::home_dir().ok_or_else(|| anyhow!("cannot determine user home directory"));

    let path = match requested.map(str::trim) {
        None | Some("") => user_home()?.join(default_subdir),
        Some("~") => user_home()?,
        Some(p) => match p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
            Some(rest) => user_home()?.join(rest),
            None => absolutize(Path::new(p))?,
        },
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn absolutize(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(p))
}
