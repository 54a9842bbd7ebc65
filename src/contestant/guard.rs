// Ctrl+C cleanup for contestant processes.
// Contestants run in their own session, so a terminal interrupt does not reach
// them; the handler kills every registered process group before exiting.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

static LIVE_GROUPS: Lazy<Mutex<HashSet<u32>>> = Lazy::new(|| Mutex::new(HashSet::new()));
static CTRL_C_INSTALLED: AtomicBool = AtomicBool::new(false);

pub(super) fn register(pid: u32) {
    if let Ok(mut live) = LIVE_GROUPS.lock() {
        live.insert(pid);
    }
}

pub(super) fn unregister(pid: u32) {
    if let Ok(mut live) = LIVE_GROUPS.lock() {
        live.remove(&pid);
    }
}

/// Installs (once) a Ctrl+C handler that kills all live contestants and
/// exits with status 130.
pub fn install_ctrlc_handler() {
    if CTRL_C_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let installed = ctrlc::set_handler(|| {
        eprintln!("[judge] Ctrl+C detected, killing contestant processes.");
        kill_all();
        std::process::exit(130);
    });
    if let Err(e) = installed {
        eprintln!("[judge] failed to install Ctrl+C handler: {}", e);
    }
}

fn kill_all() {
    let Ok(live) = LIVE_GROUPS.lock() else {
        return;
    };
    for &pid in live.iter() {
        super::process::kill_group(pid);
    }
}
