//! Process environment: `.env` files, logging and the output directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Overrides the output directory when `--out` is not given.
pub(crate) const OUTPUT_DIR_VAR: &str = "DELFT_OUTPUT_DIR";

const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Load `.env` from the working directory, then `<config dir>/delft/.env`.
///
/// Variables already set are never overwritten, so the process environment
/// wins over the local file and the local file over the config directory.
/// Returns the files that were read.
pub(crate) fn load_env() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    if let Some(path) = config_env_file()
        && path.is_file()
    {
        match dotenvy::from_path(&path) {
            Ok(()) => loaded.push(path),
            Err(e) => eprintln!("Warning: Failed to read {}: {}", path.display(), e),
        }
    }

    loaded
}

/// `<config dir>/delft/.env`, if the platform has a config directory.
pub(crate) fn config_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("delft").join(".env"))
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise warnings only, or debug output with
/// `--verbose`. Logs go to stderr so they do not mix with printed tables.
pub(crate) fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: Logging was already initialised");
    }
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Resolve and create the directory command outputs are written to.
pub(crate) fn output_dir(explicit: Option<PathBuf>) -> std::io::Result<PathBuf> {
    let dir = resolve_output_dir(explicit, std::env::var_os(OUTPUT_DIR_VAR));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn resolve_output_dir(explicit: Option<PathBuf>, from_env: Option<OsString>) -> PathBuf {
    explicit
        .or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// `dir/<stem>.<extension>`.
pub(crate) fn output_file(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{stem}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_output_dir_wins() {
        let dir = resolve_output_dir(
            Some(PathBuf::from("/tmp/runs")),
            Some(OsString::from("/srv/delft")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/runs"));
    }

    #[test]
    fn test_output_dir_from_environment() {
        let dir = resolve_output_dir(None, Some(OsString::from("/srv/delft")));
        assert_eq!(dir, PathBuf::from("/srv/delft"));
    }

    #[test]
    fn test_output_dir_default() {
        assert_eq!(resolve_output_dir(None, None), PathBuf::from("outputs"));
        assert_eq!(
            resolve_output_dir(None, Some(OsString::new())),
            PathBuf::from("outputs")
        );
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "debug");
    }

    #[test]
    fn test_config_env_file_name() {
        if let Some(path) = config_env_file() {
            assert!(path.ends_with("delft/.env"));
        }
    }

    #[test]
    fn test_output_file() {
        let path = output_file(Path::new("outputs"), "asml_income", "csv");
        assert_eq!(path, PathBuf::from("outputs/asml_income.csv"));
    }
}
