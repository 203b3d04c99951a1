//! The actor abstraction the engine dispatches for.
//!
//! Players, monsters and staff all appear to the engine as `dyn Actor`. The engine
//! only needs an identity, a kind, a staff rank, a petrification query and a way
//! to print; everything else about the world stays behind the trait.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an actor, used as the scheduler's per-target key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Monster,
}

/// Pools a skill command can charge against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Gold,
    Mana,
    HitPoints,
    Focus,
    Energy,
}

impl ResourceType {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Gold => "gold",
            ResourceType::Mana => "mana",
            ResourceType::HitPoints => "hit points",
            ResourceType::Focus => "focus",
            ResourceType::Energy => "energy",
        }
    }
}

pub trait Actor {
    fn id(&self) -> ActorId;

    fn name(&self) -> &str;

    fn kind(&self) -> ActorKind;

    /// Staff rank, see [`crate::engine::roles`].
    fn rank(&self) -> u8;

    fn is_petrified(&self) -> bool;

    /// Clear the away/idle marker; called before every dispatch.
    fn clear_idle(&mut self) {}

    fn mark_idle(&mut self) {}

    /// Queue text for the actor's connection (or drop it for monsters).
    fn print(&mut self, text: &str);

    fn check_resource(&self, _resource: ResourceType, _amount: i32) -> bool {
        true
    }

    fn sub_resource(&mut self, _resource: ResourceType, _amount: i32) {}

    /// Milliseconds before `skill` may be used again.
    fn cooldown_remaining(&self, _skill: &str) -> u64 {
        0
    }

    fn start_cooldown(&mut self, _skill: &str, _millis: u64) {}

    fn is_player(&self) -> bool {
        self.kind() == ActorKind::Player
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Minimal in-memory actor for unit tests.
    #[derive(Debug, Clone)]
    pub struct StubActor {
        pub id: ActorId,
        pub kind: ActorKind,
        pub rank: u8,
        pub petrified: bool,
        pub idle: bool,
        pub output: Vec<String>,
    }

    impl StubActor {
        pub fn player(id: u64, rank: u8) -> Self {
            Self {
                id: ActorId(id),
                kind: ActorKind::Player,
                rank,
                petrified: false,
                idle: false,
                output: Vec::new(),
            }
        }

        pub fn monster(id: u64, rank: u8) -> Self {
            Self {
                kind: ActorKind::Monster,
                ..Self::player(id, rank)
            }
        }
    }

    impl Actor for StubActor {
        fn id(&self) -> ActorId {
            self.id
        }
        fn name(&self) -> &str {
            "stub"
        }
        fn kind(&self) -> ActorKind {
            self.kind
        }
        fn rank(&self) -> u8 {
            self.rank
        }
        fn is_petrified(&self) -> bool {
            self.petrified
        }
        fn clear_idle(&mut self) {
            self.idle = false;
        }
        fn mark_idle(&mut self) {
            self.idle = true;
        }
        fn print(&mut self, text: &str) {
            self.output.push(text.to_string());
        }
    }
}
