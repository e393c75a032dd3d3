//! Turning an action string into concrete invocations.

use std::fmt;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// One process to start for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Executable file, run directly
    Program(PathBuf),
    /// Command line, run through `sh -c`
    Shell(String),
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Program(path) => write!(f, "{}", path.display()),
            Invocation::Shell(line) => write!(f, "sh -c '{}'", line),
        }
    }
}

/// Resolve an action string.
///
/// - A directory yields every executable file in it, sorted by file name.
///   Other entries are skipped.
/// - An executable file yields itself.
/// - Anything else is taken as a shell command line.
pub fn resolve(action: &str) -> io::Result<Vec<Invocation>> {
    let path = Path::new(action);
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => resolve_dir(path),
        Ok(meta) if meta.is_file() && is_executable(&meta) => {
            Ok(vec![Invocation::Program(path.to_path_buf())])
        }
        _ => Ok(vec![Invocation::Shell(action.to_string())]),
    }
}

fn resolve_dir(dir: &Path) -> io::Result<Vec<Invocation>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut invocations = Vec::new();
    for entry in entries {
        let path = entry.path();
        // Follows symlinks; dangling links are skipped like any other non-executable.
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && is_executable(&meta) => {
                invocations.push(Invocation::Program(path));
            }
            _ => tracing::trace!(path = %path.display(), "skipping non-executable entry"),
        }
    }
    Ok(invocations)
}

#[cfg(unix)]
fn is_executable(meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &Metadata) -> bool {
    true
}
