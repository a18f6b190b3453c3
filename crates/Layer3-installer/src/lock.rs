//! Operation lock - one mutating operation at a time
//!
//! A `.lock` file in the config dir, created with create-new semantics and
//! holding the owner's pid. Released on drop. A lock left behind by a process
//! that no longer exists, or one that names no owner, is taken over.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use webui_foundation::{Error, Result};

pub const LOCK_FILE_NAME: &str = ".lock";

#[derive(Debug)]
pub struct OperationLock {
    path: PathBuf,
}

impl OperationLock {
    /// Take the lock in `dir`, creating the dir if needed
    pub fn acquire(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE_NAME);

        match Self::create(&path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = read_owner(&path);
                match owner {
                    Some(pid) if process_alive(pid) => Err(busy(&path, owner, e)),
                    _ => {
                        match owner {
                            Some(pid) => warn!("Removing stale lock {} (pid {})", path.display(), pid),
                            None => warn!("Removing stale lock {} (no owner)", path.display()),
                        }
                        if let Err(e) = std::fs::remove_file(&path) {
                            if e.kind() != ErrorKind::NotFound {
                                return Err(e.into());
                            }
                        }
                        Self::create(&path).map_err(|e| busy(&path, owner, e))
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The pid is written to a staging file first and hard-linked into
    /// place, so a visible lock file always names its owner.
    fn create(path: &Path) -> std::io::Result<Self> {
        let pid = std::process::id();
        let staging = path.with_file_name(format!("{}.{}", LOCK_FILE_NAME, pid));
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&staging)?;
            write!(file, "{}", pid)?;
        }
        let linked = std::fs::hard_link(&staging, path);
        let _ = std::fs::remove_file(&staging);
        linked?;
        debug!("Acquired lock {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Released lock {}", self.path.display()),
            // uninstall removes the whole config dir
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release lock {}: {}", self.path.display(), e),
        }
    }
}

fn busy(path: &Path, owner: Option<u32>, cause: std::io::Error) -> Error {
    let owner = owner
        .map(|pid| format!(", held by pid {}", pid))
        .unwrap_or_default();
    debug!("Lock busy: {}", cause);
    Error::installer(format!(
        "Another installer operation is in progress (lock file {}{})",
        path.display(),
        owner
    ))
}

fn read_owner(path: &Path) -> Option<u32> {
    let mut content = String::new();
    std::fs::File::open(path)
        .ok()?
        .read_to_string(&mut content)
        .ok()?;
    content.trim().parse().ok()
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
