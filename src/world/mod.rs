//! # World
//!
//! The concrete context command bodies run against. A [`World`] owns the
//! creatures, the delayed action queue, the script host and a shared handle to
//! the command registry.
//!
//! While a creature's command runs it is taken out of the creature map and handed
//! to the dispatcher as `&mut dyn Actor`; the body gets the rest of the world as
//! its context. The registry and dispatcher are reference counted so a body may
//! swap in a freshly loaded registry (`*reload`) while the old one is still being
//! used to run it.
//!
//! Dispatch failures are worded for the player here, not in the engine.
pub mod commands;
pub mod creature;
pub mod scripts;

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::Config;
use crate::engine::actor::{Actor, ActorId, ActorKind};
use crate::engine::delayed::{
    ActionCallback, ActionKey, ActionKind, ActionPayload, ActionRequest, ActionTargets, DelayedAction,
    DelayedActionQueue,
};
use crate::engine::dispatch::{CommandStatus, DispatchOutcome, Dispatcher};
use crate::engine::errors::EngineError;
use crate::engine::method::{codes, CommandCode, ScriptHost};
use crate::engine::namespace::DuplicatePolicy;
use crate::engine::parser::{parse, ParsedCommand};
use crate::engine::registry::{CatalogEntry, CommandTable, Registry, RegistryStats};
use crate::logutil::escape_log;
use crate::metrics;

pub use commands::BuiltinCommands;
pub use creature::Creature;
pub use scripts::LoggingScriptHost;

pub const START_ROOM: &str = "square";

/// Seconds between sweeps for queued actions whose target has left.
pub const ORPHAN_SWEEP_SECS: i64 = 60;

/// A location creatures can stand in.
#[derive(Debug, Clone)]
pub struct Room {
    pub title: String,
    pub description: String,
    pub exits: BTreeMap<String, String>,
    pub fishing: bool,
}

fn default_rooms() -> HashMap<String, Room> {
    let mut rooms = HashMap::new();
    rooms.insert(
        START_ROOM.to_string(),
        Room {
            title: "Town Square".to_string(),
            description: "Cobbles worn smooth by generations of boots. A road runs east to the harbour."
                .to_string(),
            exits: BTreeMap::from([("east".to_string(), "pier".to_string())]),
            fishing: false,
        },
    );
    rooms.insert(
        "pier".to_string(),
        Room {
            title: "Old Pier".to_string(),
            description: "Salt-grey planks over dark water. Gulls argue on the pilings.".to_string(),
            exits: BTreeMap::from([("west".to_string(), START_ROOM.to_string())]),
            fishing: true,
        },
    );
    rooms
}

pub struct World {
    registry: Arc<Registry<World>>,
    dispatcher: Arc<Dispatcher>,
    table: Arc<dyn CommandTable<World> + Send + Sync>,
    policy: DuplicatePolicy,
    creatures: HashMap<ActorId, Creature>,
    rooms: HashMap<String, Room>,
    locations: HashMap<ActorId, String>,
    scheduler: DelayedActionQueue<World>,
    scripts: Box<dyn ScriptHost>,
    next_id: u64,
    now: i64,
    last_update: Option<i64>,
    last_sweep: Option<i64>,
    name: String,
    motd: String,
    shutdown_requested: bool,
}

impl World {
    /// Build a world with the built-in command table.
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        Self::with_table(config, Arc::new(BuiltinCommands))
    }

    pub fn with_table(
        config: &Config,
        table: Arc<dyn CommandTable<World> + Send + Sync>,
    ) -> Result<Self, EngineError> {
        let mut world = World {
            registry: Arc::new(Registry::new(config.commands.duplicate_policy)),
            dispatcher: Arc::new(Dispatcher::with_petrified_allow(&config.commands.petrified_allow)),
            table,
            policy: config.commands.duplicate_policy,
            creatures: HashMap::new(),
            rooms: default_rooms(),
            locations: HashMap::new(),
            scheduler: DelayedActionQueue::new(),
            scripts: Box::new(LoggingScriptHost::default()),
            next_id: 1,
            now: 0,
            last_update: None,
            last_sweep: None,
            name: config.server.name.clone(),
            motd: config.server.motd.clone(),
            shutdown_requested: false,
        };
        world.reload()?;
        Ok(world)
    }

    pub fn set_script_host(&mut self, host: Box<dyn ScriptHost>) {
        self.scripts = host;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn motd(&self) -> &str {
        &self.motd
    }

    pub fn registry(&self) -> &Registry<World> {
        &self.registry
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.registry.catalog()
    }

    pub fn scheduler(&self) -> &DelayedActionQueue<World> {
        &self.scheduler
    }

    /// Repopulate the registry from the command table. On failure the world is
    /// left with an empty registry and the error is returned.
    pub fn reload(&mut self) -> Result<RegistryStats, EngineError> {
        let mut fresh = Registry::new(self.policy);
        let result = fresh.reload(self.table.as_ref());
        self.registry = Arc::new(fresh);
        metrics::inc_registry_reloads();
        result
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    /// Set the wall-clock second used for new schedules without firing anything.
    pub fn set_now(&mut self, now: i64) {
        self.now = now;
    }

    /// Advance to `now` and fire due delayed actions. Repeated calls within the
    /// same second do nothing. Returns how many actions fired.
    ///
    /// Every [`ORPHAN_SWEEP_SECS`] the queue is also swept for actions, due or
    /// not, whose target is no longer in the world.
    pub fn update(&mut self, now: i64) -> usize {
        if self.last_update == Some(now) {
            return 0;
        }
        self.last_update = Some(now);
        self.now = now;

        if self.last_sweep.map_or(true, |at| now - at >= ORPHAN_SWEEP_SECS) {
            self.last_sweep = Some(now);
            let creatures = &self.creatures;
            let purged = self.scheduler.purge_orphans(|id| creatures.contains_key(&id));
            if purged > 0 {
                warn!("orphan sweep removed {} delayed action(s)", purged);
            }
        }

        let creatures = &self.creatures;
        let ready = self.scheduler.drain_due(now, |id| creatures.contains_key(&id));
        let mut fired = 0;
        for action in &ready {
            // an earlier callback may have removed this target
            if action.fire_if_live(self) {
                fired += 1;
            }
        }
        fired
    }

    fn spawn(&mut self, name: &str, kind: ActorKind, rank: u8) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        let mut creature = Creature::new(id, name, kind);
        creature.rank = rank;
        debug!("spawned {:?} {} as {}", kind, name, id);
        self.creatures.insert(id, creature);
        self.locations.insert(id, START_ROOM.to_string());
        id
    }

    pub fn spawn_player(&mut self, name: &str, rank: u8) -> ActorId {
        let id = self.spawn(name, ActorKind::Player, rank);
        info!("{} entered the world as {}", name, id);
        id
    }

    pub fn spawn_monster(&mut self, name: &str) -> ActorId {
        self.spawn(name, ActorKind::Monster, crate::engine::roles::LEVEL_PLAYER)
    }

    /// Take a creature out of the world, dropping its pending actions.
    pub fn remove_creature(&mut self, id: ActorId) -> Option<Creature> {
        self.scheduler.cancel_all(id);
        self.locations.remove(&id);
        let creature = self.creatures.remove(&id);
        if let Some(c) = &creature {
            info!("{} ({}) left the world", c.name, id);
        }
        creature
    }

    pub fn creature(&self, id: ActorId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn creature_mut(&mut self, id: ActorId) -> Option<&mut Creature> {
        self.creatures.get_mut(&id)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    pub fn take_output(&mut self, id: ActorId) -> Vec<String> {
        self.creatures
            .get_mut(&id)
            .map(Creature::take_output)
            .unwrap_or_default()
    }

    pub fn room(&self, key: &str) -> Option<&Room> {
        self.rooms.get(key)
    }

    /// Key of the room a creature stands in.
    pub fn location(&self, id: ActorId) -> Option<&str> {
        self.locations.get(&id).map(String::as_str)
    }

    pub fn move_to(&mut self, id: ActorId, room: &str) {
        self.locations.insert(id, room.to_string());
    }

    fn in_room(&self, id: ActorId, room: &str) -> bool {
        self.location(id) == Some(room)
    }

    /// Creatures standing in `room`, excluding `except`.
    pub fn occupants(&self, room: &str, except: ActorId) -> Vec<&Creature> {
        let mut found: Vec<&Creature> = self
            .creatures
            .values()
            .filter(|c| c.id != except && self.in_room(c.id, room))
            .collect();
        found.sort_by_key(|c| c.id);
        found
    }

    /// First creature in `room` whose name starts with `name` (case-insensitive).
    pub fn find_in_room(&self, room: &str, name: &str, except: ActorId) -> Option<ActorId> {
        let wanted = name.to_lowercase();
        self.occupants(room, except)
            .into_iter()
            .find(|c| c.name.to_lowercase().starts_with(&wanted))
            .map(|c| c.id)
    }

    /// Print to everyone in `room` other than `except`.
    pub fn broadcast_room(&mut self, room: &str, except: ActorId, text: &str) {
        let locations = &self.locations;
        for creature in self.creatures.values_mut() {
            if creature.id != except && locations.get(&creature.id).is_some_and(|r| r == room) {
                creature.print(text);
            }
        }
    }

    /// Print to every player whose rank satisfies `check`.
    pub fn broadcast_where(&mut self, check: fn(&dyn Actor) -> bool, text: &str) {
        for creature in self.creatures.values_mut() {
            if check(&*creature) {
                creature.print(text);
            }
        }
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Handle one line of player input. `!` repeats the creature's previous line.
    pub fn handle_line(&mut self, id: ActorId, line: &str) -> CommandCode {
        let line = line.trim();
        let text = if line == "!" {
            match self.creatures.get(&id).and_then(|c| c.last_command.clone()) {
                Some(previous) => previous,
                None => return codes::PROMPT,
            }
        } else {
            line.to_string()
        };
        if text.is_empty() {
            return codes::PROMPT;
        }
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.last_command = Some(text.clone());
        }
        debug!("{} typed '{}'", id, escape_log(&text));
        self.dispatch(id, parse(&text)).code
    }

    /// Run an already parsed command for a creature in the world.
    pub fn dispatch(&mut self, id: ActorId, mut cmd: ParsedCommand) -> DispatchOutcome {
        let Some(mut actor) = self.creatures.remove(&id) else {
            warn!("command for {} ignored, no such creature", id);
            return DispatchOutcome {
                status: CommandStatus::NotFound,
                code: codes::SILENT,
            };
        };

        let registry = Arc::clone(&self.registry);
        let dispatcher = Arc::clone(&self.dispatcher);
        let outcome = dispatcher.process(&*registry, self, &mut actor, &mut cmd);
        report_failure(&mut actor, &cmd, outcome.status);

        self.creatures.insert(id, actor);
        outcome
    }

    /// Schedule an action against `actor`, finishing `request.delay_secs` from now.
    pub fn schedule(
        &mut self,
        actor: &dyn Actor,
        request: ActionRequest,
        callback: ActionCallback<World>,
    ) -> Option<ActionKey> {
        let now = self.now;
        self.scheduler.schedule(actor, request, callback, now)
    }

    /// Parse `text` now and run it as `actor`'s command after `delay_secs`.
    /// A `target` has its name appended to the command line.
    pub fn delayed_command(
        &mut self,
        actor: &dyn Actor,
        text: &str,
        target: Option<&dyn Actor>,
        delay_secs: i64,
    ) -> Option<ActionKey> {
        let request = ActionRequest::new(ActionKind::Command, delay_secs)
            .with_payload(ActionPayload::Command(command_line(text, target)));
        self.schedule(actor, request, run_delayed_command)
    }

    /// Run `script` for `actor` after `delay_secs`.
    pub fn delayed_script(&mut self, actor: &dyn Actor, script: &str, delay_secs: i64) -> Option<ActionKey> {
        let request = ActionRequest::new(ActionKind::Script, delay_secs)
            .with_payload(ActionPayload::Script(script.to_string()));
        self.schedule(actor, request, run_delayed_script)
    }

    /// Same as [`World::delayed_command`] for a creature currently in the world.
    pub fn delayed_command_for(
        &mut self,
        id: ActorId,
        text: &str,
        target: Option<&dyn Actor>,
        delay_secs: i64,
    ) -> Option<ActionKey> {
        let actor = self.creatures.get(&id)?;
        let request = ActionRequest::new(ActionKind::Command, delay_secs)
            .with_payload(ActionPayload::Command(command_line(text, target)));
        self.scheduler.schedule(actor, request, run_delayed_command, self.now)
    }

    /// Stop whatever interruptible action `actor` has pending, telling them so.
    pub fn interrupt(&mut self, actor: &mut dyn Actor) -> bool {
        let stopped = self.scheduler.cancel_interruptible(actor.id());
        if stopped {
            actor.print("You stop what you are doing.\n");
        }
        stopped
    }

    /// Interrupt a creature that is not the one currently acting.
    pub fn interrupt_creature(&mut self, id: ActorId) -> bool {
        let stopped = self.scheduler.cancel_interruptible(id);
        if stopped {
            if let Some(creature) = self.creatures.get_mut(&id) {
                creature.print("You stop what you are doing.\n");
            }
        }
        stopped
    }

    pub fn run_script(&mut self, script: &str, args: &str, actor: &mut dyn Actor) -> bool {
        self.scripts.run(script, args, actor)
    }
}

impl ActionTargets for World {
    fn is_live(&self, id: ActorId) -> bool {
        self.creatures.contains_key(&id)
    }
}

fn report_failure(actor: &mut Creature, cmd: &ParsedCommand, status: CommandStatus) {
    let word = cmd.command_word().unwrap_or_default();
    match status {
        CommandStatus::Ok => {}
        // monsters get nothing back, there is no one to read it
        _ if !actor.is_player() => {}
        CommandStatus::NotFound => actor.print(&format!("The command \"{}\" does not exist.\n", word)),
        CommandStatus::NotUnique => actor.print("Command is not unique.\n"),
        CommandStatus::NotAuth => {
            actor.print("You do not have the proper authorization to use that command.\n")
        }
        CommandStatus::Gated => actor.print("You can't do that. You're petrified!\n"),
    }
}

/// Build a delayed command line: the target's name is appended, then dots and
/// slashes are stripped.
fn command_line(text: &str, target: Option<&dyn Actor>) -> ParsedCommand {
    let mut line = text.to_string();
    if let Some(target) = target {
        line.push(' ');
        line.push_str(target.name());
    }
    line.retain(|c| c != '.' && c != '/');
    parse(&line)
}

fn run_delayed_command(action: &DelayedAction<World>, world: &mut World) {
    if let ActionPayload::Command(cmd) = &action.payload {
        world.dispatch(action.target, cmd.clone());
    }
}

fn run_delayed_script(action: &DelayedAction<World>, world: &mut World) {
    let ActionPayload::Script(script) = &action.payload else {
        return;
    };
    let World { creatures, scripts, .. } = world;
    if let Some(creature) = creatures.get_mut(&action.target) {
        scripts.run(script, "", creature);
    }
}
