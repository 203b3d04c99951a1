//! Staff ranks and authorization predicates.
//!
//! Actors carry a numeric rank. Ordinary players and monsters sit at
//! [LEVEL_PLAYER]; staff ranks start at [LEVEL_BUILDER] and higher values imply a
//! superset of lower capabilities, except where a predicate asks for an exact rank.
//! Use [role_name] for display.
use super::actor::{Actor, ActorKind};

/// Rank / privilege level constants
pub const LEVEL_PLAYER: u8 = 1;
pub const LEVEL_BUILDER: u8 = 17;
pub const LEVEL_WATCHER: u8 = 18;
pub const LEVEL_CARETAKER: u8 = 19;
pub const LEVEL_DUNGEONMASTER: u8 = 20;

/// Opaque capability check consulted by the dispatcher after a unique match.
pub type AuthPredicate = fn(&dyn Actor) -> bool;

/// Return the human‑readable role name for a numeric rank.
pub fn role_name(level: u8) -> &'static str {
    match level {
        LEVEL_DUNGEONMASTER => "Dungeonmaster",
        LEVEL_CARETAKER => "Caretaker",
        LEVEL_WATCHER => "Watcher",
        LEVEL_BUILDER => "Builder",
        _ => "Player",
    }
}

/// Parse a role name (case-insensitive) back into its rank.
pub fn level_for_name(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "player" => Some(LEVEL_PLAYER),
        "builder" => Some(LEVEL_BUILDER),
        "watcher" => Some(LEVEL_WATCHER),
        "caretaker" | "ct" => Some(LEVEL_CARETAKER),
        "dungeonmaster" | "dm" => Some(LEVEL_DUNGEONMASTER),
        _ => None,
    }
}

fn staff_level(actor: &dyn Actor) -> Option<u8> {
    // monsters never hold staff rights, whatever rank they were spawned with
    match actor.kind() {
        ActorKind::Monster => None,
        ActorKind::Player => Some(actor.rank()),
    }
}

pub fn is_staff(actor: &dyn Actor) -> bool {
    staff_level(actor).is_some_and(|l| l >= LEVEL_BUILDER)
}

pub fn is_watcher(actor: &dyn Actor) -> bool {
    staff_level(actor).is_some_and(|l| l >= LEVEL_WATCHER)
}

pub fn is_ct(actor: &dyn Actor) -> bool {
    staff_level(actor).is_some_and(|l| l >= LEVEL_CARETAKER)
}

pub fn is_dm(actor: &dyn Actor) -> bool {
    staff_level(actor) == Some(LEVEL_DUNGEONMASTER)
}
