use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::engine::actor::{Actor, ActorId, ActorKind, ResourceType};
use crate::engine::roles::LEVEL_PLAYER;

/// A player or monster living in the [`super::World`].
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub rank: u8,
    pub petrified: bool,
    pub afk: bool,
    /// Last non-repeat line typed, replayed by `!`.
    pub last_command: Option<String>,
    resources: HashMap<ResourceType, i32>,
    cooldowns: HashMap<String, Instant>,
    output: Vec<String>,
}

impl Creature {
    pub fn new(id: ActorId, name: impl Into<String>, kind: ActorKind) -> Self {
        let resources = [
            (ResourceType::Gold, 0),
            (ResourceType::Mana, 50),
            (ResourceType::HitPoints, 30),
            (ResourceType::Focus, 100),
            (ResourceType::Energy, 100),
        ]
        .into_iter()
        .collect();
        Self {
            id,
            name: name.into(),
            kind,
            rank: LEVEL_PLAYER,
            petrified: false,
            afk: false,
            last_command: None,
            resources,
            cooldowns: HashMap::new(),
            output: Vec::new(),
        }
    }

    pub fn resource(&self, resource: ResourceType) -> i32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    pub fn set_resource(&mut self, resource: ResourceType, amount: i32) {
        self.resources.insert(resource, amount);
    }

    /// Take everything printed since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl Actor for Creature {
    fn id(&self) -> ActorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
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
        self.afk = false;
    }

    fn mark_idle(&mut self) {
        self.afk = true;
    }

    fn print(&mut self, text: &str) {
        // monsters have no connection to read it
        if self.kind == ActorKind::Player {
            self.output.push(text.to_string());
        }
    }

    fn check_resource(&self, resource: ResourceType, amount: i32) -> bool {
        self.resource(resource) >= amount
    }

    fn sub_resource(&mut self, resource: ResourceType, amount: i32) {
        let left = (self.resource(resource) - amount).max(0);
        self.resources.insert(resource, left);
    }

    fn cooldown_remaining(&self, skill: &str) -> u64 {
        self.cooldowns
            .get(skill)
            .map(|ready| ready.saturating_duration_since(Instant::now()).as_millis() as u64)
            .unwrap_or(0)
    }

    fn start_cooldown(&mut self, skill: &str, millis: u64) {
        self.cooldowns
            .insert(skill.to_string(), Instant::now() + Duration::from_millis(millis));
    }
}
