//! # Workbook Files
//!
//! Saving and loading `.est` workbooks:
//! - **Atomic saves**: write to `.est.tmp`, fsync, then rename over the target
//! - **File locking**: a `.est.lock` sidecar plus an OS lock guards against
//!   two people editing the same workbook on a shared drive
//! - **Version validation**: files from a newer schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use costing_core::file_io::{save_workbook, FileLock};
//! use costing_core::project::Workbook;
//! use std::path::Path;
//!
//! let workbook = Workbook::new("Priya", "Acme Gears");
//! let path = Path::new("quotes.est");
//!
//! let lock = FileLock::acquire(path, "priya")?;
//! save_workbook(&workbook, path)?;
//! drop(lock);
//! # Ok::<(), costing_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::project::{Workbook, SCHEMA_VERSION};

/// Workbook file extension
pub const WORKBOOK_EXTENSION: &str = "est";

/// Locks older than this are taken over regardless of their owner
const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.est.lock` sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// "user (machine)" for messages
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }

    /// A lock is stale once it is a day old, or when it was taken on this
    /// machine by a process that has since exited.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        match hostname() {
            Some(machine) if machine == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists() || !Path::new("/proc/self").exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive edit lock on a workbook, released on drop.
///
/// Holds an OS-level lock (via fs2) on the sidecar file and writes a
/// [`LockInfo`] into it so other users can see who has the workbook open.
pub struct FileLock {
    workbook_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for the workbook at `path`.
    ///
    /// # Returns
    ///
    /// * `Err(CalcError::FileLocked)` - someone else holds a live lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            log::warn!(
                "Taking over stale lock on {} held by {}",
                path.display(),
                existing.holder()
            );
        }

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_error("create lock", &lock_path, e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| io_error("write lock", &lock_path, e))?;

        log::info!("Locked {} for {}", path.display(), info.user_id);
        Ok(FileLock {
            workbook_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock on `path`, if any, without taking it.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    pub fn workbook_path(&self) -> &Path {
        &self.workbook_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn io_error(operation: &str, path: &Path, e: std::io::Error) -> CalcError {
    CalcError::file_error(operation, path.display().to_string(), e.to_string())
}

/// `quotes.est` -> `quotes.est.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "lock")
}

/// `quotes.est` -> `quotes.est.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => format!("{}.{}", ext.to_string_lossy(), suffix),
        None => suffix.to_string(),
    };
    path.with_extension(extension)
}

/// Unreadable or malformed sidecars count as no lock.
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a workbook atomically.
///
/// The JSON is written to a `.tmp` sibling and synced before being renamed
/// over `path`, so an interrupted save never leaves a truncated workbook.
pub fn save_workbook(workbook: &Workbook, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(workbook).map_err(CalcError::serialization)?;
    let tmp_path = temp_path_for(path);

    let mut tmp_file =
        File::create(&tmp_path).map_err(|e| io_error("create temp file", &tmp_path, e))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| io_error("write temp file", &tmp_path, e))?;
    drop(tmp_file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error("rename to final", path, e));
    }

    log::info!("Saved workbook {} ({} records)", path.display(), workbook.record_count());
    Ok(())
}

/// Load a workbook, rejecting incompatible schema versions.
///
/// # Returns
///
/// * `Err(CalcError::VersionMismatch)` - written by an incompatible version
/// * `Err(CalcError::SerializationError)` - not a workbook
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_workbook(path: &Path) -> CalcResult<Workbook> {
    let contents = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    let workbook: Workbook = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;
    validate_version(&workbook.meta.version)?;
    log::debug!("Loaded workbook {} ({} records)", path.display(), workbook.record_count());
    Ok(workbook)
}

/// Load or start a workbook at `path`.
pub fn load_or_create_workbook(path: &Path, owner: &str) -> CalcResult<Workbook> {
    if path.exists() {
        load_workbook(path)
    } else {
        log::info!("Starting new workbook at {}", path.display());
        Ok(Workbook::new(owner, ""))
    }
}

/// Load a workbook along with any live lock another user holds on it.
///
/// A `Some` lock means the caller should treat the workbook as read-only.
pub fn load_workbook_with_lock_check(path: &Path) -> CalcResult<(Workbook, Option<LockInfo>)> {
    let workbook = load_workbook(path)?;
    let lock = FileLock::check(path);
    if let Some(info) = &lock {
        log::warn!("{} is locked by {}", path.display(), info.holder());
    }
    Ok((workbook, lock))
}

/// Major versions must match; within 0.x a newer minor is refused.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file = parse(file_version);
    let current = parse(SCHEMA_VERSION);
    if file.is_empty() || current.is_empty() || file[0] != current[0] {
        return Err(mismatch());
    }
    if current[0] == 0 && file.len() > 1 && current.len() > 1 && file[1] > current[1] {
        return Err(mismatch());
    }
    Ok(())
}
