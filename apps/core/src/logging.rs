use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Level;

use crate::config::Config;

const LOG_FILE_NAME: &str = "tabspot.log";
const ARCHIVE_PREFIX: &str = "tabspot-";
const ARCHIVE_SUFFIX: &str = ".log";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Routes `tracing` events to `<log_dir>/tabspot.log`, rotating it first when
/// it has grown past the size cap.
pub fn init(cfg: &Config) -> Result<(), std::io::Error> {
    let log_dir = &cfg.log_dir;
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_max_level(max_level(cfg))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(std::io::Error::other)?;

    install_panic_hook();
    Ok(())
}

/// Default sink when no log file was requested.
pub fn init_stderr(cfg: &Config) -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_max_level(max_level(cfg))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(std::io::Error::other)?;

    install_panic_hook();
    Ok(())
}

fn max_level(cfg: &Config) -> Level {
    Level::from_str(&cfg.log_level).unwrap_or(Level::INFO)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if size < MAX_LOG_BYTES {
        return Ok(());
    }

    fs::rename(log_path, next_archive_path(log_dir))?;
    prune_old_archives(log_dir)
}

/// Archive names carry a fixed-width nanosecond stamp, so name order is
/// rotation order. A taken stamp is bumped until a free name is found.
fn next_archive_path(log_dir: &Path) -> PathBuf {
    let mut stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0);
    loop {
        let candidate = log_dir.join(format!("{ARCHIVE_PREFIX}{stamp:020}{ARCHIVE_SUFFIX}"));
        if !candidate.exists() {
            return candidate;
        }
        stamp += 1;
    }
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(ARCHIVE_SUFFIX))
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_archive(path))
        .collect();
    if archives.len() <= MAX_ARCHIVES {
        return Ok(());
    }

    archives.sort();
    let stale = archives.len() - MAX_ARCHIVES;
    for path in &archives[..stale] {
        if let Err(error) = fs::remove_file(path) {
            tracing::debug!(path = %path.display(), "could not prune log archive: {error}");
        }
    }
    Ok(())
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
            let message = match info.payload().downcast_ref::<&str>() {
                Some(text) => (*text).to_string(),
                None => info
                    .payload()
                    .downcast_ref::<String>()
                    .cloned()
                    .unwrap_or_else(|| "non-string panic payload".to_string()),
            };
            tracing::error!("panic at {location}: {message}");
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::{
        init_stderr, max_level, prune_old_archives, rotate_if_needed, MAX_ARCHIVES, MAX_LOG_BYTES,
    };
    use crate::config::Config;
    use tracing::Level;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join("tabspot-logging-tests")
            .join(format!("{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn file_names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn small_log_is_not_rotated() {
        let dir = scratch_dir("small");
        let log = dir.join("tabspot.log");
        std::fs::write(&log, b"short").unwrap();
        rotate_if_needed(&log, &dir).unwrap();
        assert!(log.exists());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn oversized_log_is_archived() {
        let dir = scratch_dir("oversized");
        let log = dir.join("tabspot.log");
        std::fs::write(&log, vec![b'x'; MAX_LOG_BYTES as usize]).unwrap();
        rotate_if_needed(&log, &dir).unwrap();
        assert!(!log.exists());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn back_to_back_rotations_keep_every_archive() {
        let dir = scratch_dir("back-to-back");
        let log = dir.join("tabspot.log");
        for fill in [b'a', b'b', b'c'] {
            std::fs::write(&log, vec![fill; MAX_LOG_BYTES as usize]).unwrap();
            rotate_if_needed(&log, &dir).unwrap();
        }

        let names = file_names(&dir);
        assert_eq!(names.len(), 3);
        let first = std::fs::read(dir.join(&names[0])).unwrap();
        let last = std::fs::read(dir.join(&names[2])).unwrap();
        assert_eq!(first[0], b'a');
        assert_eq!(last[0], b'c');
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn prune_keeps_newest_archives() {
        let dir = scratch_dir("prune");
        for stamp in 0..(MAX_ARCHIVES + 3) {
            std::fs::write(dir.join(format!("tabspot-{stamp:04}.log")), b"old").unwrap();
        }
        std::fs::write(dir.join("notes.txt"), b"keep").unwrap();
        prune_old_archives(&dir).unwrap();

        let remaining = file_names(&dir);
        assert_eq!(remaining.len(), MAX_ARCHIVES + 1);
        assert_eq!(remaining[0], "notes.txt");
        assert_eq!(remaining[1], "tabspot-0003.log");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let mut cfg = Config::default();
        cfg.log_level = "debug".into();
        assert_eq!(max_level(&cfg), Level::DEBUG);
        cfg.log_level = "chatty".into();
        assert_eq!(max_level(&cfg), Level::INFO);
    }

    #[test]
    fn stderr_subscriber_installs_once() {
        let cfg = Config::default();
        assert!(init_stderr(&cfg).is_ok());
        assert!(init_stderr(&cfg).is_err());
    }
}
