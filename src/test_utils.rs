use std::sync::{LazyLock, Mutex};

use anyhow::Result;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Runs the closure with the process working directory set to `dir`. The
/// working directory is process-wide and tests run multithreaded, so entry
/// is serialized through a lock.
pub fn set_dir<F>(dir: &std::path::Path, run: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let _guard = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::set_current_dir(dir)?;
    run()
}
