use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock held while a process rewrites a timeline file. The lock
/// lives next to the file as `<file>.lock`, so the TUI and concurrent CLI
/// invocations serialize their saves.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not lock {path}: another process is writing this timeline")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

pub fn lock_path(timeline_path: &Path) -> PathBuf {
    let mut name = timeline_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "timeline".into());
    name.push(".lock");
    timeline_path.with_file_name(name)
}

impl FileLock {
    /// Lock `timeline_path`, retrying for up to `timeout`
    pub fn acquire(timeline_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = lock_path(timeline_path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateError {
                path: path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => return Ok(FileLock { _file: file, path }),
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    tracing::warn!(path = %path.display(), "timed out waiting for lock");
                    return Err(LockError::Timeout { path });
                }
            }
        }
    }

    pub fn acquire_default(timeline_path: &Path) -> Result<Self, LockError> {
        Self::acquire(timeline_path, Duration::from_secs(5))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock is released with the descriptor
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
