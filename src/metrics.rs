//! Process-wide counters for command dispatch and delayed actions.
//!
//! Counters are plain atomics so the game loop never blocks on them; the per-command
//! usage table sits behind a mutex because it is keyed by name.
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static DISPATCH_OK: AtomicU64 = AtomicU64::new(0);
static DISPATCH_NOT_FOUND: AtomicU64 = AtomicU64::new(0);
static DISPATCH_NOT_UNIQUE: AtomicU64 = AtomicU64::new(0);
static DISPATCH_NOT_AUTH: AtomicU64 = AtomicU64::new(0);
static DISPATCH_GATED: AtomicU64 = AtomicU64::new(0);
static ACTIONS_SCHEDULED: AtomicU64 = AtomicU64::new(0);
static ACTIONS_FIRED: AtomicU64 = AtomicU64::new(0);
static ACTIONS_CANCELLED: AtomicU64 = AtomicU64::new(0);
static ORPHANS_PURGED: AtomicU64 = AtomicU64::new(0);
static REGISTRY_RELOADS: AtomicU64 = AtomicU64::new(0);

static COMMAND_USES: OnceLock<Mutex<HashMap<String, u64>>> = OnceLock::new();

pub fn inc_dispatch_ok() {
    DISPATCH_OK.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_not_found() {
    DISPATCH_NOT_FOUND.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_not_unique() {
    DISPATCH_NOT_UNIQUE.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_not_auth() {
    DISPATCH_NOT_AUTH.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_gated() {
    DISPATCH_GATED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_actions_scheduled() {
    ACTIONS_SCHEDULED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_actions_fired() {
    ACTIONS_FIRED.fetch_add(1, Ordering::Relaxed);
}
pub fn add_actions_cancelled(n: usize) {
    ACTIONS_CANCELLED.fetch_add(n as u64, Ordering::Relaxed);
}
pub fn inc_orphans_purged() {
    ORPHANS_PURGED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_registry_reloads() {
    REGISTRY_RELOADS.fetch_add(1, Ordering::Relaxed);
}

fn command_uses_lock() -> &'static Mutex<HashMap<String, u64>> {
    COMMAND_USES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count one successful execution of a resolved command.
pub fn record_command_use(name: &str) -> u64 {
    let mut guard = match command_uses_lock().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let uses = guard.entry(name.to_string()).or_default();
    *uses = uses.saturating_add(1);
    *uses
}

/// The `limit` most used commands, busiest first, ties broken by name.
pub fn top_commands(limit: usize) -> Vec<(String, u64)> {
    let guard = match command_uses_lock().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut rows: Vec<(String, u64)> = guard.iter().map(|(k, v)| (k.clone(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Snapshot {
    pub dispatch_ok: u64,
    pub not_found: u64,
    pub not_unique: u64,
    pub not_auth: u64,
    pub gated: u64,
    pub actions_scheduled: u64,
    pub actions_fired: u64,
    pub actions_cancelled: u64,
    pub orphans_purged: u64,
    pub registry_reloads: u64,
}

impl Snapshot {
    pub fn dispatched(&self) -> u64 {
        self.dispatch_ok + self.not_found + self.not_unique + self.not_auth + self.gated
    }
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        dispatch_ok: DISPATCH_OK.load(Ordering::Relaxed),
        not_found: DISPATCH_NOT_FOUND.load(Ordering::Relaxed),
        not_unique: DISPATCH_NOT_UNIQUE.load(Ordering::Relaxed),
        not_auth: DISPATCH_NOT_AUTH.load(Ordering::Relaxed),
        gated: DISPATCH_GATED.load(Ordering::Relaxed),
        actions_scheduled: ACTIONS_SCHEDULED.load(Ordering::Relaxed),
        actions_fired: ACTIONS_FIRED.load(Ordering::Relaxed),
        actions_cancelled: ACTIONS_CANCELLED.load(Ordering::Relaxed),
        orphans_purged: ORPHANS_PURGED.load(Ordering::Relaxed),
        registry_reloads: REGISTRY_RELOADS.load(Ordering::Relaxed),
    }
}
