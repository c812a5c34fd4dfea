use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file inside `sheet/`
pub const LOCK_FILE: &str = ".lock";

const WAIT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(10);

/// Advisory lock on a sheet directory, held by mutating commands from load
/// through save. The holder's pid is written into the lock file so a waiting
/// command can say who it is waiting on.
///
/// The lock file is never unlinked, since a waiter may already have it open.
/// Release only clears the pid.
pub struct SheetLock {
    file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("sheet is busy after waiting {waited:?}{}", holder_suffix(.holder))]
    Busy {
        waited: Duration,
        holder: Option<u32>,
    },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

fn holder_suffix(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!(" (held by pid {})", pid),
        None => String::new(),
    }
}

impl SheetLock {
    /// Lock `sheet_dir`, waiting up to five seconds for another command.
    pub fn acquire(sheet_dir: &Path) -> Result<Self, LockError> {
        Self::acquire_within(sheet_dir, WAIT)
    }

    pub fn acquire_within(sheet_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = sheet_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let start = Instant::now();
        while let Err(e) = try_flock(&file) {
            if start.elapsed() >= wait {
                let holder = read_holder(&path);
                tracing::warn!(path = %path.display(), error = %e, ?holder, "sheet lock busy");
                return Err(LockError::Busy {
                    waited: wait,
                    holder,
                });
            }
            std::thread::sleep(POLL);
        }

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        tracing::trace!(path = %path.display(), "sheet locked");
        Ok(SheetLock { file, path })
    }
}

impl Drop for SheetLock {
    fn drop(&mut self) {
        // Clear the pid while still locked; the flock goes with the handle
        if let Err(e) = self.file.set_len(0) {
            tracing::debug!(path = %self.path.display(), error = %e, "could not clear lock holder");
        }
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn try_flock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
