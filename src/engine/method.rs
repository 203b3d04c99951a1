//! Registry entries: named, prioritised methods and their executable bodies.
//!
//! Every command namespace stores [`CommandEntry`] values. The extra data some
//! namespaces carry (skill costs and cooldowns, social message templates) lives in
//! the body types [`SkillCommand`] and [`SocialCommand`], which wrap the plain
//! function the entry finally calls. Songs and spells are [`MysticMethod`]s: they
//! are looked up with the same matcher but are run through a [`ScriptHost`] rather
//! than dispatched.
use serde::{Deserialize, Serialize};
use std::fmt;

use super::actor::{Actor, ResourceType};
use super::parser::ParsedCommand;
use super::roles::{self, AuthPredicate};

/// Integer result of running a command body.
pub type CommandCode = i32;

/// Return codes a body may hand back to the caller layer.
pub mod codes {
    use super::CommandCode;

    pub const SILENT: CommandCode = 0;
    pub const DISCONNECT: CommandCode = 1;
    pub const PROMPT: CommandCode = 2;
    pub const DOPROMPT: CommandCode = 3;
}

/// Default priority for entries registered without one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Anything the matcher can rank: commands, songs and spells.
pub trait MethodEntry {
    fn name(&self) -> &str;

    /// Smaller values are preferred.
    fn priority(&self) -> i32;

    fn description(&self) -> &str {
        ""
    }

    /// True when only keys starting with the token can match, which lets a
    /// namespace narrow its scan to the token's first character.
    const PREFIX_ONLY: bool = true;

    /// Whether `token` partially matches the folded `key`.
    fn partial_match(&self, key: &str, token: &str) -> bool {
        key.starts_with(token)
    }
}

/// A command body. `C` is the mutable world context the embedding application
/// passes through the dispatcher.
pub trait Executable<C>: Send + Sync {
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode;
}

impl<C, F> Executable<C> for F
where
    F: Fn(&mut C, &mut dyn Actor, &ParsedCommand) -> CommandCode + Send + Sync,
{
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        self(ctx, actor, cmd)
    }
}

/// Plain body signature shared by the built-in wrappers.
pub type BodyFn<C> = fn(&mut C, &mut dyn Actor, &ParsedCommand) -> CommandCode;

/// Body usable by any creature, player or monster.
pub struct CrtCommand<C> {
    body: BodyFn<C>,
}

impl<C> CrtCommand<C> {
    pub fn new(body: BodyFn<C>) -> Self {
        Self { body }
    }
}

impl<C> Executable<C> for CrtCommand<C> {
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        (self.body)(ctx, actor, cmd)
    }
}

/// Body that only makes sense for players; monsters get a silent no-op.
pub struct PlyCommand<C> {
    body: BodyFn<C>,
}

impl<C> PlyCommand<C> {
    pub fn new(body: BodyFn<C>) -> Self {
        Self { body }
    }
}

impl<C> Executable<C> for PlyCommand<C> {
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        if !actor.is_player() {
            return codes::SILENT;
        }
        (self.body)(ctx, actor, cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    None,
    Creature,
    Monster,
    Player,
    Object,
    ObjectCreature,
    Exit,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCost {
    pub resource: ResourceType,
    pub cost: i32,
}

/// A skill command: resource costs and a cooldown in front of a body.
///
/// A skill still cooling down is refused before anything else. Resources are
/// checked before the body runs and charged only once it has returned, which is
/// also when the cooldown starts. Staff bypass both checks.
pub struct SkillCommand<C> {
    pub target: TargetType,
    pub offensive: bool,
    /// Cooldown applied after each use, in milliseconds.
    pub cooldown_ms: u64,
    pub costs: Vec<SkillCost>,
    pub script: Option<String>,
    body: BodyFn<C>,
}

impl<C> SkillCommand<C> {
    pub fn new(body: BodyFn<C>) -> Self {
        Self {
            target: TargetType::None,
            offensive: false,
            cooldown_ms: 0,
            costs: Vec::new(),
            script: None,
            body,
        }
    }

    pub fn target(mut self, target: TargetType) -> Self {
        self.target = target;
        self
    }

    pub fn offensive(mut self) -> Self {
        self.offensive = true;
        self
    }

    pub fn cooldown(mut self, millis: u64) -> Self {
        self.cooldown_ms = millis;
        self
    }

    pub fn cost(mut self, resource: ResourceType, cost: i32) -> Self {
        self.costs.push(SkillCost { resource, cost });
        self
    }

    pub fn has_cooldown(&self) -> bool {
        self.cooldown_ms > 0
    }

    /// True unless the skill is still cooling down for the actor. Prints the wait.
    pub fn check_cooldown(&self, actor: &mut dyn Actor, skill: &str) -> bool {
        if !self.has_cooldown() || roles::is_staff(actor) {
            return true;
        }
        let left = actor.cooldown_remaining(skill);
        if left == 0 {
            return true;
        }
        actor.print(&format!(
            "Please wait {} more second(s).\n",
            left.div_ceil(1000)
        ));
        false
    }

    /// True when the actor can pay every cost. Prints the first shortfall.
    pub fn check_resources(&self, actor: &mut dyn Actor) -> bool {
        for res in &self.costs {
            if !actor.check_resource(res.resource, res.cost) {
                if roles::is_staff(actor) {
                    return true;
                }
                actor.print(&format!(
                    "You need to have at least {} {}.\n",
                    res.cost,
                    res.resource.label()
                ));
                return false;
            }
        }
        true
    }

    pub fn sub_resources(&self, actor: &mut dyn Actor) {
        for res in &self.costs {
            actor.sub_resource(res.resource, res.cost);
        }
    }
}

impl<C> Executable<C> for SkillCommand<C> {
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        let skill = cmd
            .resolved
            .as_ref()
            .map(|r| r.name.as_str())
            .or_else(|| cmd.command_word())
            .unwrap_or_default()
            .to_string();
        if !self.check_cooldown(actor, &skill) || !self.check_resources(actor) {
            return codes::SILENT;
        }
        let code = (self.body)(ctx, actor, cmd);
        self.sub_resources(actor);
        if self.has_cooldown() {
            actor.start_cooldown(&skill, self.cooldown_ms);
        }
        code
    }
}

/// Message templates for a social. `*ACTOR*` and `*TARGET*` are substituted by the
/// body that renders them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMessages {
    pub self_no_target: String,
    pub room_no_target: String,
    pub self_on_target: String,
    pub room_on_target: String,
    pub victim_on_target: String,
    pub self_on_self: String,
    pub room_on_self: String,
    #[serde(default)]
    pub wake_target: bool,
}

pub type SocialFn<C> = fn(&mut C, &mut dyn Actor, &ParsedCommand, &SocialMessages) -> CommandCode;

pub struct SocialCommand<C> {
    pub messages: SocialMessages,
    body: SocialFn<C>,
}

impl<C> SocialCommand<C> {
    pub fn new(messages: SocialMessages, body: SocialFn<C>) -> Self {
        Self { messages, body }
    }
}

impl<C> Executable<C> for SocialCommand<C> {
    fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        (self.body)(ctx, actor, cmd, &self.messages)
    }
}

/// A registered command in one of the dispatch namespaces.
pub struct CommandEntry<C> {
    name: String,
    priority: i32,
    auth: Option<AuthPredicate>,
    description: String,
    body: Box<dyn Executable<C>>,
}

impl<C> CommandEntry<C> {
    pub fn new(name: impl Into<String>, priority: i32, body: impl Executable<C> + 'static) -> Self {
        Self {
            name: name.into(),
            priority,
            auth: None,
            description: String::new(),
            body: Box::new(body),
        }
    }

    pub fn with_auth(mut self, auth: AuthPredicate) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Entries without a predicate are open to everyone.
    pub fn authorized(&self, actor: &dyn Actor) -> bool {
        self.auth.map_or(true, |check| check(actor))
    }

    pub fn execute(&self, ctx: &mut C, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
        self.body.execute(ctx, actor, cmd)
    }
}

impl<C: 'static> CommandEntry<C> {
    pub fn creature(name: impl Into<String>, priority: i32, body: BodyFn<C>) -> Self {
        Self::new(name, priority, CrtCommand::new(body))
    }

    pub fn player(name: impl Into<String>, priority: i32, body: BodyFn<C>) -> Self {
        Self::new(name, priority, PlyCommand::new(body))
    }
}

impl<C> MethodEntry for CommandEntry<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<C> fmt::Debug for CommandEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("restricted", &self.auth.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MysticKind {
    Song,
    Spell,
}

/// A song or spell: a named script reference with its timing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysticMethod {
    pub kind: MysticKind,
    pub name: String,
    pub priority: i32,
    pub script: String,
    #[serde(default)]
    pub description: String,
    /// Seconds between pulses for songs, cast time for spells.
    #[serde(default)]
    pub delay: u32,
    #[serde(default)]
    pub duration: u32,
}

impl MysticMethod {
    pub fn song(name: impl Into<String>, priority: i32, script: impl Into<String>) -> Self {
        Self {
            kind: MysticKind::Song,
            name: name.into(),
            priority,
            script: script.into(),
            description: String::new(),
            delay: 0,
            duration: 0,
        }
    }

    pub fn spell(name: impl Into<String>, priority: i32, script: impl Into<String>) -> Self {
        Self {
            kind: MysticKind::Spell,
            ..Self::song(name, priority, script)
        }
    }

    pub fn timing(mut self, delay: u32, duration: u32) -> Self {
        self.delay = delay;
        self.duration = duration;
        self
    }
}

impl MethodEntry for MysticMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        &self.description
    }

    // "mis" finds "magic missile": any word of the name may carry the prefix.
    const PREFIX_ONLY: bool = false;

    fn partial_match(&self, key: &str, token: &str) -> bool {
        key.split_whitespace().any(|part| part.starts_with(token))
    }
}

/// Opaque scripting collaborator used by spells, songs and scripted delayed
/// actions. Returns whether the script ran successfully.
pub trait ScriptHost: Send {
    fn run(&mut self, script: &str, args: &str, actor: &mut dyn Actor) -> bool;
}
