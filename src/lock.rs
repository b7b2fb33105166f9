//! Advisory locking and atomic replacement for store files.
//!
//! Two planviz processes may write the same project document (an import
//! racing a seed, say). Writers serialize on a sibling `.lock` file and
//! publish content with a staged-then-rename replacement, so readers never
//! lock: they see either the old document or the new one, never a torn
//! write.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// How long writers wait on a contended store lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const RETRY_SLEEP: Duration = Duration::from_millis(50);

/// Exclusive advisory lock guarding writes to one store file.
///
/// The lock lives in a sibling `<target>.lock` file so the target itself can
/// be renamed over while the lock is held. Released on drop.
pub struct StoreLock {
    handle: File,
    path: PathBuf,
}

impl StoreLock {
    /// Take the lock guarding `target`, waiting up to `timeout_ms` for a
    /// competing holder to release it.
    pub fn acquire(target: &Path, timeout_ms: u64) -> Result<Self> {
        let path = lock_file_for(target);
        let handle = open_lock_file(&path)?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            match handle.try_lock_exclusive() {
                Ok(()) => return Ok(Self { handle, path }),
                Err(err) if contended(&err) => {
                    if Instant::now() >= deadline {
                        return Err(Error::LockFailed(path));
                    }
                    std::thread::sleep(RETRY_SLEEP);
                }
                Err(err) => return Err(Error::Io(err)),
            }
        }
    }

    /// Take the lock guarding `target` only if it is free right now.
    pub fn try_acquire(target: &Path) -> Result<Option<Self>> {
        let path = lock_file_for(target);
        let handle = open_lock_file(&path)?;

        match handle.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { handle, path })),
            Err(err) if contended(&err) => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    /// Path of the lock file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.handle.unlock();
    }
}

/// Replace the content of `path` with `data`.
///
/// Writes a staged file in the target directory (renames never cross a
/// filesystem boundary that way), syncs it, then renames it over the target.
/// Does not lock; use [`locked_replace`] when other processes may write the
/// same file.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let staged = staging_path(path);
    {
        let mut out = File::create(&staged)?;
        out.write_all(data)?;
        out.sync_all()?;
    }
    fs::rename(&staged, path)?;
    Ok(())
}

/// Serialize on the sibling lock, then replace the file.
pub fn locked_replace(path: &Path, data: &[u8], timeout_ms: u64) -> Result<()> {
    let _guard = StoreLock::acquire(path, timeout_ms)?;
    replace_file(path, data)
}

/// Sibling lock file guarding writes to `target`.
fn lock_file_for(target: &Path) -> PathBuf {
    let mut name = match target.file_name() {
        Some(name) => name.to_os_string(),
        None => return target.join(".lock"),
    };
    name.push(".lock");
    target.with_file_name(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let handle = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(handle)
}

fn contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    // Windows reports lock and sharing violations (32, 33) instead of
    // WouldBlock.
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// Hidden staged name beside the target; the pid keeps unlocked writers from
/// clobbering each other's staging files.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document");
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn acquire_creates_sibling_lock_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.json");

        let guard = StoreLock::acquire(&target, 1000).unwrap();
        assert_eq!(guard.path(), dir.path().join("doc.json.lock"));
        assert!(guard.path().exists());
        assert!(StoreLock::try_acquire(&target).unwrap().is_none());

        drop(guard);
        assert!(StoreLock::try_acquire(&target).unwrap().is_some());
    }

    #[test]
    fn contended_acquire_times_out_as_lock_failed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.json");

        let _guard = StoreLock::acquire(&target, 1000).unwrap();
        assert!(matches!(
            StoreLock::acquire(&target, 60),
            Err(Error::LockFailed(_))
        ));
    }

    #[test]
    fn replace_file_swaps_content_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        replace_file(&path, b"{\"rev\":1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"rev\":1}");

        replace_file(&path, b"{\"rev\":2}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"rev\":2}");

        let stray: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p != &path)
            .collect();
        assert!(stray.is_empty(), "staging files left behind: {stray:?}");
    }

    #[test]
    fn replace_file_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        replace_file(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn lock_admits_one_holder_at_a_time() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.json");

        let workers = 10;
        let gate = Arc::new(Barrier::new(workers));
        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let entries = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let busy = Arc::clone(&busy);
                let overlaps = Arc::clone(&overlaps);
                let entries = Arc::clone(&entries);
                let target = target.clone();
                thread::spawn(move || {
                    gate.wait();
                    let _guard = StoreLock::acquire(&target, 2000).unwrap();
                    if busy.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_millis(5));
                    busy.store(false, Ordering::SeqCst);
                    entries.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(entries.load(Ordering::SeqCst), workers);
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_replaces_leave_one_complete_document() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.json");

        let writers = 6;
        let gate = Arc::new(Barrier::new(writers));
        let handles: Vec<_> = (0..writers)
            .map(|idx| {
                let gate = Arc::clone(&gate);
                let target = target.clone();
                thread::spawn(move || {
                    let body = format!("{{\"writer\":{idx},\"payload\":\"{}\"}}", "y".repeat(48));
                    gate.wait();
                    locked_replace(&target, body.as_bytes(), 2000).unwrap();
                    body
                })
            })
            .collect();

        let bodies: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        let on_disk = fs::read_to_string(&target).unwrap();
        assert!(bodies.contains(&on_disk));
    }
}
