//! Resolve an input line to a single command and run it.
//!
//! Namespaces are searched in a fixed order: general, skill, player (players
//! only), staff (staff only), social. The search stops at the first exact match.
//! A unique match is then authorized and, for petrified players, checked against
//! the allow-list before its body runs. Failures come back as [`CommandStatus`]
//! values; wording them for the player is left to the caller.
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;

use super::actor::Actor;
use super::matcher::{examine, Lookup, MatchState};
use super::method::{CommandCode, CommandEntry, MethodEntry};
use super::namespace::NamespaceKind;
use super::parser::{ParsedCommand, ResolvedCommand};
use super::registry::Registry;
use super::roles;
use crate::logutil::escape_log;
use crate::metrics;

pub const CMD_NOT_FOUND: CommandCode = -1;
pub const CMD_NOT_UNIQUE: CommandCode = -2;
pub const CMD_NOT_AUTH: CommandCode = -3;
pub const CMD_GATED: CommandCode = -4;

/// Commands a petrified player may still use.
pub const DEFAULT_PETRIFIED_ALLOW: &[&str] = &[
    "clear", "finger", "health", "help", "info", "pass", "passwd", "password", "prefs", "quit",
    "sc", "score", "set", "time", "toggle", "who", "whois",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    NotFound,
    NotUnique,
    NotAuth,
    Gated,
}

impl CommandStatus {
    /// Integer form stored in [`ParsedCommand::ret`] for failed lookups.
    pub fn code(&self) -> CommandCode {
        match self {
            CommandStatus::Ok => 0,
            CommandStatus::NotFound => CMD_NOT_FOUND,
            CommandStatus::NotUnique => CMD_NOT_UNIQUE,
            CommandStatus::NotAuth => CMD_NOT_AUTH,
            CommandStatus::Gated => CMD_GATED,
        }
    }

    fn record(&self) {
        match self {
            CommandStatus::Ok => metrics::inc_dispatch_ok(),
            CommandStatus::NotFound => metrics::inc_not_found(),
            CommandStatus::NotUnique => metrics::inc_not_unique(),
            CommandStatus::NotAuth => metrics::inc_not_auth(),
            CommandStatus::Gated => metrics::inc_gated(),
        }
    }
}

/// Outcome of [`Dispatcher::resolve`]. `entry` is set only for `Ok`.
pub struct Resolution<'r, C> {
    pub status: CommandStatus,
    pub namespace: Option<NamespaceKind>,
    pub entry: Option<&'r CommandEntry<C>>,
}

impl<'r, C> Resolution<'r, C> {
    fn failed(status: CommandStatus) -> Self {
        Self {
            status,
            namespace: None,
            entry: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: CommandStatus,
    /// Body return code for `Ok`, otherwise the status code.
    pub code: CommandCode,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    petrified_allow: HashSet<String>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_petrified_allow(DEFAULT_PETRIFIED_ALLOW.iter().copied())
    }

    pub fn with_petrified_allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            petrified_allow: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn allowed_while_petrified(&self, name: &str) -> bool {
        self.petrified_allow.contains(&name.to_lowercase())
    }

    fn search_order(actor: &dyn Actor) -> impl Iterator<Item = NamespaceKind> {
        let player = actor.is_player();
        let staff = roles::is_staff(actor);
        NamespaceKind::ALL.into_iter().filter(move |kind| match kind {
            NamespaceKind::Player => player,
            NamespaceKind::Staff => staff,
            _ => true,
        })
    }

    /// Find the unique command `cmd` names for `actor` and authorize it.
    /// Records the status code and, on success, the bound entry on `cmd`.
    pub fn resolve<'r, C>(
        &self,
        registry: &'r Registry<C>,
        actor: &dyn Actor,
        cmd: &mut ParsedCommand,
    ) -> Resolution<'r, C> {
        cmd.resolved = None;
        let token = match cmd.command_word() {
            Some(word) => word.to_string(),
            None => {
                cmd.ret = CMD_NOT_FOUND;
                return Resolution::failed(CommandStatus::NotFound);
            }
        };

        let mut state: MatchState<'r, CommandEntry<C>, NamespaceKind> = MatchState::new();
        for kind in Self::search_order(actor) {
            if state.found {
                break;
            }
            examine(registry.namespace(kind), kind, &token, &mut state);
        }

        let entry = match state.classify() {
            Lookup::Found(entry) => entry,
            Lookup::NotFound => {
                cmd.ret = CMD_NOT_FOUND;
                return Resolution::failed(CommandStatus::NotFound);
            }
            Lookup::NotUnique => {
                cmd.ret = CMD_NOT_UNIQUE;
                return Resolution::failed(CommandStatus::NotUnique);
            }
        };
        let namespace = state.best_tag();

        if !entry.authorized(actor) {
            warn!(
                target: "security",
                "{} ({}) denied {} command '{}'",
                actor.name(),
                actor.id(),
                namespace.map(|n| n.label()).unwrap_or("?"),
                entry.name()
            );
            cmd.ret = CMD_NOT_AUTH;
            return Resolution::failed(CommandStatus::NotAuth);
        }

        cmd.ret = 0;
        cmd.resolved = namespace.map(|ns| ResolvedCommand {
            namespace: ns,
            name: entry.name().to_string(),
        });
        Resolution {
            status: CommandStatus::Ok,
            namespace,
            entry: Some(entry),
        }
    }

    /// Resolve, gate and execute one parsed line.
    pub fn process<C>(
        &self,
        registry: &Registry<C>,
        ctx: &mut C,
        actor: &mut dyn Actor,
        cmd: &mut ParsedCommand,
    ) -> DispatchOutcome {
        actor.clear_idle();

        let resolution = self.resolve(registry, &*actor, cmd);
        let (namespace, entry) = match (resolution.status, resolution.namespace, resolution.entry) {
            (CommandStatus::Ok, Some(ns), Some(entry)) => (ns, entry),
            (status, _, _) => {
                debug!(
                    "{} input '{}' -> {:?}",
                    actor.id(),
                    escape_log(&cmd.full),
                    status
                );
                status.record();
                return DispatchOutcome {
                    status,
                    code: status.code(),
                };
            }
        };

        if actor.is_player()
            && actor.is_petrified()
            && !roles::is_staff(&*actor)
            && !self.allowed_while_petrified(entry.name())
        {
            debug!("{} is petrified, '{}' refused", actor.id(), entry.name());
            cmd.ret = CMD_GATED;
            CommandStatus::Gated.record();
            return DispatchOutcome {
                status: CommandStatus::Gated,
                code: CMD_GATED,
            };
        }

        if namespace == NamespaceKind::Staff {
            info!(
                target: "security",
                "{} ({}) used '{}'",
                actor.name(),
                actor.id(),
                escape_log(&cmd.full)
            );
        }

        let code = entry.execute(ctx, actor, cmd);
        cmd.ret = code;
        CommandStatus::Ok.record();
        metrics::record_command_use(entry.name());
        debug!(
            "{} ran {} command '{}' -> {}",
            actor.id(),
            namespace,
            entry.name(),
            code
        );
        DispatchOutcome {
            status: CommandStatus::Ok,
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actor::tests_support::StubActor;
    use crate::engine::method::codes;
    use crate::engine::parser::parse;
    use crate::engine::roles::{is_ct, LEVEL_BUILDER, LEVEL_CARETAKER, LEVEL_PLAYER};

    #[derive(Default)]
    struct Ctx {
        ran: Vec<&'static str>,
    }

    fn look(ctx: &mut Ctx, _: &mut dyn Actor, _: &ParsedCommand) -> CommandCode {
        ctx.ran.push("look");
        codes::PROMPT
    }

    fn score(ctx: &mut Ctx, _: &mut dyn Actor, _: &ParsedCommand) -> CommandCode {
        ctx.ran.push("score");
        codes::DOPROMPT
    }

    fn goto(ctx: &mut Ctx, _: &mut dyn Actor, _: &ParsedCommand) -> CommandCode {
        ctx.ran.push("goto");
        codes::PROMPT
    }

    fn smile(ctx: &mut Ctx, _: &mut dyn Actor, _: &ParsedCommand) -> CommandCode {
        ctx.ran.push("smile");
        codes::SILENT
    }

    fn registry() -> Registry<Ctx> {
        let mut reg = Registry::default();
        reg.register(NamespaceKind::General, CommandEntry::creature("look", 100, look))
            .unwrap();
        reg.register(NamespaceKind::Player, CommandEntry::player("score", 100, score))
            .unwrap();
        reg.register(
            NamespaceKind::Staff,
            CommandEntry::creature("*goto", 100, goto).with_auth(roles::is_staff),
        )
        .unwrap();
        reg.register(
            NamespaceKind::Staff,
            CommandEntry::creature("*shutdown", 100, goto).with_auth(is_ct),
        )
        .unwrap();
        reg.register(NamespaceKind::Social, CommandEntry::creature("smile", 100, smile))
            .unwrap();
        reg.register(NamespaceKind::Social, CommandEntry::creature("look", 100, smile))
            .unwrap();
        reg
    }

    #[test]
    fn runs_unique_match_and_records_it() {
        let reg = registry();
        let mut ctx = Ctx::default();
        let mut ply = StubActor::player(1, LEVEL_PLAYER);
        ply.idle = true;
        let mut cmd = parse("sm");
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut ply, &mut cmd);
        assert_eq!(out.status, CommandStatus::Ok);
        assert_eq!(out.code, codes::SILENT);
        assert_eq!(ctx.ran, vec!["smile"]);
        assert!(!ply.idle);
        assert_eq!(
            cmd.resolved,
            Some(ResolvedCommand {
                namespace: NamespaceKind::Social,
                name: "smile".into()
            })
        );
    }

    #[test]
    fn exact_match_stops_before_social() {
        let reg = registry();
        let mut ctx = Ctx::default();
        let mut ply = StubActor::player(1, LEVEL_PLAYER);
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut ply, &mut parse("look"));
        assert_eq!(out.code, codes::PROMPT);
        assert_eq!(ctx.ran, vec!["look"]);
    }

    #[test]
    fn player_namespace_hidden_from_monsters() {
        let reg = registry();
        let mut ctx = Ctx::default();
        let mut mob = StubActor::monster(2, LEVEL_PLAYER);
        let mut cmd = parse("score");
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut mob, &mut cmd);
        assert_eq!(out.status, CommandStatus::NotFound);
        assert_eq!(cmd.ret, CMD_NOT_FOUND);
        assert!(ctx.ran.is_empty());
    }

    #[test]
    fn staff_namespace_hidden_from_players() {
        let reg = registry();
        let mut ply = StubActor::player(1, LEVEL_PLAYER);
        let res = Dispatcher::new().resolve(&reg, &ply, &mut parse("*goto"));
        assert_eq!(res.status, CommandStatus::NotFound);

        ply.rank = LEVEL_BUILDER;
        let res = Dispatcher::new().resolve(&reg, &ply, &mut parse("*go"));
        assert_eq!(res.status, CommandStatus::Ok);
        assert_eq!(res.namespace, Some(NamespaceKind::Staff));
    }

    #[test]
    fn auth_failure_runs_nothing() {
        let reg = registry();
        let mut ctx = Ctx::default();
        let mut builder = StubActor::player(3, LEVEL_BUILDER);
        let mut cmd = parse("*shutdown");
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut builder, &mut cmd);
        assert_eq!(out.status, CommandStatus::NotAuth);
        assert_eq!(out.code, CMD_NOT_AUTH);
        assert!(ctx.ran.is_empty());

        let mut ct = StubActor::player(4, LEVEL_CARETAKER);
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut ct, &mut parse("*shutdown"));
        assert_eq!(out.status, CommandStatus::Ok);
    }

    #[test]
    fn ambiguous_prefix_across_namespaces() {
        let mut reg = registry();
        reg.register(NamespaceKind::General, CommandEntry::creature("smirk", 100, smile))
            .unwrap();
        reg.register(NamespaceKind::General, CommandEntry::creature("smell", 100, smile))
            .unwrap();
        let mut ply = StubActor::player(1, LEVEL_PLAYER);
        let mut cmd = parse("sm");
        let out = Dispatcher::new().process(&reg, &mut Ctx::default(), &mut ply, &mut cmd);
        assert_eq!(out.status, CommandStatus::NotUnique);
        assert_eq!(cmd.ret, CMD_NOT_UNIQUE);
    }

    #[test]
    fn petrified_players_limited_to_allow_list() {
        let reg = registry();
        let mut ctx = Ctx::default();
        let mut ply = StubActor::player(1, LEVEL_PLAYER);
        ply.petrified = true;

        let out = Dispatcher::new().process(&reg, &mut ctx, &mut ply, &mut parse("look"));
        assert_eq!(out.status, CommandStatus::Gated);
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut ply, &mut parse("score"));
        assert_eq!(out.status, CommandStatus::Ok);
        assert_eq!(ctx.ran, vec!["score"]);

        let mut staff = StubActor::player(2, LEVEL_BUILDER);
        staff.petrified = true;
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut staff, &mut parse("look"));
        assert_eq!(out.status, CommandStatus::Ok);

        let mut mob = StubActor::monster(3, LEVEL_PLAYER);
        mob.petrified = true;
        let out = Dispatcher::new().process(&reg, &mut ctx, &mut mob, &mut parse("look"));
        assert_eq!(out.status, CommandStatus::Ok);
    }

    #[test]
    fn custom_allow_list() {
        let d = Dispatcher::with_petrified_allow(["LOOK"]);
        assert!(d.allowed_while_petrified("look"));
        assert!(!d.allowed_while_petrified("score"));
    }

    #[test]
    fn empty_input_not_found() {
        let reg = registry();
        let ply = StubActor::player(1, LEVEL_PLAYER);
        let mut cmd = parse("   ");
        let res = Dispatcher::new().resolve(&reg, &ply, &mut cmd);
        assert_eq!(res.status, CommandStatus::NotFound);
        assert_eq!(cmd.ret, CMD_NOT_FOUND);
    }
}
