//! Built-in command table.
//!
//! Bodies here are deliberately thin: enough world behaviour to exercise every
//! namespace, the delayed action kinds and the staff tooling. Priorities follow
//! the usual convention: movement at 10 so single letters resolve to a
//! direction, ordinary commands at 100, rarely typed ones higher.
use chrono::{TimeZone, Utc};
use log::{info, warn};

use super::World;
use crate::engine::actor::{Actor, ActorId, ResourceType};
use crate::engine::delayed::{ActionKind, ActionRequest, DelayedAction};
use crate::engine::errors::EngineError;
use crate::engine::matcher::Lookup;
use crate::engine::method::{
    codes, CommandCode, CommandEntry, MysticMethod, SkillCommand, SocialCommand, SocialMessages,
    TargetType,
};
use crate::engine::namespace::NamespaceKind;
use crate::engine::parser::ParsedCommand;
use crate::engine::registry::{CommandTable, Registry};
use crate::engine::roles::{self, is_ct, is_dm, is_staff};
use crate::metrics;

pub const DIRECTIONS: [&str; 6] = ["north", "south", "east", "west", "up", "down"];

/// Seconds each timed activity takes.
pub const FISH_SECS: i64 = 8;
pub const SEARCH_SECS: i64 = 3;
pub const TRACK_SECS: i64 = 5;
pub const STUDY_SECS: i64 = 4;
/// How long a bashed monster takes to bash back.
pub const RETALIATE_SECS: i64 = 2;

/// The static command table the server loads at start and on `*reload`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCommands;

impl CommandTable<World> for BuiltinCommands {
    fn populate(&self, registry: &mut Registry<World>) -> Result<(), EngineError> {
        use NamespaceKind::*;

        for dir in DIRECTIONS {
            registry.register(
                General,
                CommandEntry::creature(dir, 10, cmd_move).with_description(format!("Walk {}.", dir)),
            )?;
        }
        registry.register(General, CommandEntry::creature("go", 20, cmd_move).with_description("Walk through an exit."))?;
        registry.register(General, CommandEntry::creature("look", 50, cmd_look).with_description("Look around."))?;
        registry.register(General, CommandEntry::creature("say", 50, cmd_say).with_description("Speak to the room."))?;
        registry.register(General, CommandEntry::creature("who", 100, cmd_who).with_description("List who is playing."))?;
        registry.register(General, CommandEntry::creature("time", 100, cmd_time).with_description("Show the server time."))?;
        registry.register(General, CommandEntry::creature("help", 100, cmd_help).with_description("List commands."))?;
        registry.register(General, CommandEntry::creature("stop", 100, cmd_stop).with_description("Stop what you are doing."))?;
        registry.register(General, CommandEntry::creature("effects", 100, cmd_effects).with_description("Show what is affecting you."))?;
        registry.register(General, CommandEntry::creature("eff", 110, cmd_effects))?;

        registry.register(Player, CommandEntry::player("score", 100, cmd_score).with_description("Show your status."))?;
        registry.register(Player, CommandEntry::player("sc", 110, cmd_score))?;
        registry.register(Player, CommandEntry::player("quit", 100, cmd_quit).with_description("Leave the game."))?;
        registry.register(Player, CommandEntry::player("afk", 100, cmd_afk).with_description("Mark yourself as away."))?;
        registry.register(Player, CommandEntry::player("fish", 100, cmd_fish).with_description("Cast a line."))?;
        registry.register(Player, CommandEntry::player("search", 100, cmd_search).with_description("Search the area."))?;
        registry.register(Player, CommandEntry::player("track", 100, cmd_track).with_description("Look for tracks."))?;
        registry.register(Player, CommandEntry::player("study", 100, cmd_study).with_description("Study your surroundings."))?;
        registry.register(Player, CommandEntry::player("sing", 100, cmd_sing).with_description("Sing a song."))?;

        registry.register(
            Skill,
            CommandEntry::new(
                "bash",
                100,
                SkillCommand::new(cmd_bash)
                    .target(TargetType::Creature)
                    .offensive()
                    .cooldown(6000)
                    .cost(ResourceType::Focus, 10),
            )
            .with_description("Shoulder-charge someone."),
        )?;
        registry.register(
            Skill,
            CommandEntry::new(
                "meditate",
                100,
                SkillCommand::new(cmd_meditate).cost(ResourceType::Energy, 5),
            )
            .with_description("Clear your mind."),
        )?;

        registry.register(Staff, CommandEntry::creature("*reload", 100, cmd_reload).with_auth(is_ct))?;
        registry.register(Staff, CommandEntry::creature("*info", 100, cmd_info).with_auth(is_staff))?;
        registry.register(Staff, CommandEntry::creature("*petrify", 100, cmd_petrify).with_auth(is_ct))?;
        registry.register(Staff, CommandEntry::creature("*force", 100, cmd_force).with_auth(is_dm))?;
        registry.register(Staff, CommandEntry::creature("*delay", 100, cmd_delay).with_auth(is_staff))?;
        registry.register(Staff, CommandEntry::creature("*script", 100, cmd_script).with_auth(is_staff))?;
        registry.register(Staff, CommandEntry::creature("*cast", 100, cmd_pcast).with_auth(is_staff))?;
        registry.register(Staff, CommandEntry::creature("*shutdown", 100, cmd_shutdown).with_auth(is_dm))?;

        for (name, messages) in socials() {
            registry.register(
                Social,
                CommandEntry::new(name, 100, SocialCommand::new(messages, cmd_social)),
            )?;
        }

        registry.register_mystic(MysticMethod::song("healing", 100, "songs.healing").timing(10, 60))?;
        registry.register_mystic(MysticMethod::song("courage", 100, "songs.courage").timing(10, 60))?;
        registry.register_mystic(MysticMethod::spell("light", 100, "spells.light").timing(2, 300))?;
        registry.register_mystic(MysticMethod::spell("lightning", 100, "spells.lightning").timing(3, 0))?;
        registry.register_mystic(MysticMethod::spell("bless", 100, "spells.bless").timing(2, 120))?;
        registry.register_mystic(
            MysticMethod::spell("magic missile", 100, "spells.magic_missile").timing(1, 0),
        )?;
        Ok(())
    }
}

fn social(
    self_no_target: &str,
    room_no_target: &str,
    self_on_target: &str,
    room_on_target: &str,
    victim_on_target: &str,
) -> SocialMessages {
    SocialMessages {
        self_no_target: self_no_target.to_string(),
        room_no_target: room_no_target.to_string(),
        self_on_target: self_on_target.to_string(),
        room_on_target: room_on_target.to_string(),
        victim_on_target: victim_on_target.to_string(),
        self_on_self: String::new(),
        room_on_self: String::new(),
        wake_target: false,
    }
}

fn socials() -> Vec<(&'static str, SocialMessages)> {
    vec![
        (
            "smile",
            social(
                "You smile.",
                "*ACTOR* smiles.",
                "You smile at *TARGET*.",
                "*ACTOR* smiles at *TARGET*.",
                "*ACTOR* smiles at you.",
            ),
        ),
        (
            "wave",
            social(
                "You wave.",
                "*ACTOR* waves.",
                "You wave to *TARGET*.",
                "*ACTOR* waves to *TARGET*.",
                "*ACTOR* waves to you.",
            ),
        ),
        (
            "nod",
            social(
                "You nod.",
                "*ACTOR* nods.",
                "You nod at *TARGET*.",
                "*ACTOR* nods at *TARGET*.",
                "*ACTOR* nods at you.",
            ),
        ),
        (
            "bow",
            social(
                "You bow deeply.",
                "*ACTOR* bows deeply.",
                "You bow before *TARGET*.",
                "*ACTOR* bows before *TARGET*.",
                "*ACTOR* bows before you.",
            ),
        ),
    ]
}

fn render(template: &str, actor: &str, target: &str) -> String {
    format!("{}\n", template.replace("*ACTOR*", actor).replace("*TARGET*", target))
}

fn here(world: &World, actor: &dyn Actor) -> String {
    world
        .location(actor.id())
        .map(str::to_string)
        .unwrap_or_else(|| super::START_ROOM.to_string())
}

fn cmd_look(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let room_key = here(world, actor);
    let Some(room) = world.room(&room_key) else {
        actor.print("You are nowhere in particular.\n");
        return codes::PROMPT;
    };
    let mut text = format!("{}\n{}\n", room.title, room.description);
    let exits: Vec<&str> = room.exits.keys().map(String::as_str).collect();
    if exits.is_empty() {
        text.push_str("There are no obvious exits.\n");
    } else {
        text.push_str(&format!("Obvious exits: {}.\n", exits.join(", ")));
    }
    let others: Vec<&str> = world
        .occupants(&room_key, actor.id())
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();
    if !others.is_empty() {
        text.push_str(&format!("You see {}.\n", others.join(", ")));
    }
    actor.print(&text);
    codes::PROMPT
}

fn cmd_move(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let direction = match cmd.resolved.as_ref().map(|r| r.name.as_str()) {
        Some("go") | None => match cmd.word(1) {
            Some(word) => DIRECTIONS
                .iter()
                .find(|d| d.starts_with(word))
                .map(|d| d.to_string())
                .unwrap_or_else(|| word.to_string()),
            None => {
                actor.print("Go where?\n");
                return codes::PROMPT;
            }
        },
        Some(dir) => dir.to_string(),
    };

    let from = here(world, actor);
    let Some(to) = world.room(&from).and_then(|r| r.exits.get(&direction)).cloned() else {
        actor.print("You can't go that way.\n");
        return codes::PROMPT;
    };

    world.interrupt(actor);
    let name = actor.name().to_string();
    world.broadcast_room(&from, actor.id(), &format!("{} leaves {}.\n", name, direction));
    world.move_to(actor.id(), &to);
    world.broadcast_room(&to, actor.id(), &format!("{} arrives.\n", name));
    cmd_look(world, actor, cmd)
}

fn cmd_say(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let text = cmd.rest_after(1);
    if text.is_empty() {
        actor.print("Say what?\n");
        return codes::PROMPT;
    }
    actor.print(&format!("You say, \"{}\"\n", text));
    let room = here(world, actor);
    world.broadcast_room(&room, actor.id(), &format!("{} says, \"{}\"\n", actor.name(), text));
    codes::PROMPT
}

fn cmd_who(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let mut players: Vec<(String, u8)> = world
        .creatures()
        .filter(|c| c.is_player())
        .map(|c| (c.name.clone(), c.rank))
        .collect();
    // the caller is out of the creature map while this runs
    players.push((actor.name().to_string(), actor.rank()));
    players.sort();

    let mut text = format!("Players online ({}):\n", players.len());
    for (name, rank) in players {
        if rank >= roles::LEVEL_BUILDER {
            text.push_str(&format!("  {} [{}]\n", name, roles::role_name(rank)));
        } else {
            text.push_str(&format!("  {}\n", name));
        }
    }
    actor.print(&text);
    codes::PROMPT
}

fn cmd_time(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    match Utc.timestamp_opt(world.now(), 0).single() {
        Some(t) => actor.print(&format!("It is {} UTC.\n", t.format("%Y-%m-%d %H:%M:%S"))),
        None => actor.print("Time has lost its meaning.\n"),
    }
    codes::PROMPT
}

fn cmd_help(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let mut text = String::from("Commands:\n");
    for entry in world.catalog() {
        let visible = match entry.namespace.as_str() {
            "staff" => is_staff(actor),
            "player" => actor.is_player(),
            _ => true,
        };
        if visible && !entry.description.is_empty() {
            text.push_str(&format!("  {:<10} {}\n", entry.name, entry.description));
        }
    }
    actor.print(&text);
    codes::PROMPT
}

fn cmd_stop(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    if !world.interrupt(actor) {
        actor.print("You aren't doing anything.\n");
    }
    codes::PROMPT
}

fn cmd_effects(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let mut lines: Vec<String> = Vec::new();
    if actor.is_petrified() {
        lines.push("Petrified".to_string());
    }
    lines.extend(
        world
            .scheduler()
            .describe_pending(actor.id())
            .into_iter()
            .map(str::to_string),
    );
    if lines.is_empty() {
        actor.print("Nothing is affecting you.\n");
    } else {
        actor.print(&format!("{}\n", lines.join("\n")));
    }
    codes::PROMPT
}

fn cmd_score(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let mut text = format!("{} the {}\n", actor.name(), roles::role_name(actor.rank()));
    for line in world.scheduler().describe_pending(actor.id()) {
        text.push_str(line);
        text.push('\n');
    }
    actor.print(&text);
    codes::DOPROMPT
}

fn cmd_quit(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    actor.print("Goodbye!\n");
    let room = here(world, actor);
    world.broadcast_room(&room, actor.id(), &format!("{} fades away.\n", actor.name()));
    codes::DISCONNECT
}

fn cmd_afk(_world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    actor.mark_idle();
    actor.print("You are now marked as away.\n");
    codes::SILENT
}

fn start_activity(
    world: &mut World,
    actor: &mut dyn Actor,
    kind: ActionKind,
    secs: i64,
    busy: &str,
    begin: &str,
    callback: fn(&DelayedAction<World>, &mut World),
) -> CommandCode {
    if world.scheduler().has_action(actor.id(), kind) {
        actor.print(busy);
        return codes::PROMPT;
    }
    world.interrupt(actor);
    world.schedule(&*actor, ActionRequest::new(kind, secs), callback);
    actor.print(begin);
    codes::PROMPT
}

fn cmd_fish(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let room = here(world, actor);
    if !world.room(&room).is_some_and(|r| r.fishing) {
        actor.print("There is no water to fish in here.\n");
        return codes::PROMPT;
    }
    start_activity(
        world,
        actor,
        ActionKind::Fish,
        FISH_SECS,
        "You are already fishing!\n",
        "You begin fishing.\n",
        finish_fishing,
    )
}

fn cmd_search(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    start_activity(
        world,
        actor,
        ActionKind::Search,
        SEARCH_SECS,
        "You are already searching!\n",
        "You begin searching.\n",
        finish_searching,
    )
}

fn cmd_track(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    start_activity(
        world,
        actor,
        ActionKind::Track,
        TRACK_SECS,
        "You are already looking for tracks!\n",
        "You search the ground for tracks.\n",
        finish_tracking,
    )
}

fn cmd_study(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    start_activity(
        world,
        actor,
        ActionKind::Study,
        STUDY_SECS,
        "You are already studying!\n",
        "You begin studying.\n",
        finish_studying,
    )
}

fn notify(world: &mut World, target: ActorId, text: &str) {
    if let Some(creature) = world.creature_mut(target) {
        creature.print(text);
    }
}

fn finish_fishing(action: &DelayedAction<World>, world: &mut World) {
    notify(world, action.target, "You feel a tug on the line and land a fish.\n");
}

fn finish_searching(action: &DelayedAction<World>, world: &mut World) {
    notify(world, action.target, "You didn't find anything.\n");
}

fn finish_tracking(action: &DelayedAction<World>, world: &mut World) {
    notify(world, action.target, "You don't see any tracks.\n");
}

fn finish_studying(action: &DelayedAction<World>, world: &mut World) {
    notify(world, action.target, "You finish studying.\n");
}

fn cmd_sing(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let Some(word) = cmd.word(1) else {
        actor.print("Sing what?\n");
        return codes::PROMPT;
    };
    let script = match world.registry().find_song(word) {
        Lookup::Found(song) => song.script.clone(),
        Lookup::NotFound => {
            actor.print("That song does not exist.\n");
            return codes::PROMPT;
        }
        Lookup::NotUnique => {
            actor.print("Song name is not unique.\n");
            return codes::PROMPT;
        }
    };
    let args = cmd.rest_after(2).to_string();
    world.run_script(&script, &args, actor);
    codes::PROMPT
}

fn cmd_pcast(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let Some(word) = cmd.word(1) else {
        actor.print("Cast what?\n");
        return codes::PROMPT;
    };
    let script = match world.registry().find_spell(word) {
        Lookup::Found(spell) => spell.script.clone(),
        Lookup::NotFound => {
            actor.print(&format!("The spell \"{}\" does not exist.\n", word));
            return codes::PROMPT;
        }
        Lookup::NotUnique => {
            actor.print("Spell name is not unique.\n");
            return codes::PROMPT;
        }
    };
    let args = cmd.rest_after(2).to_string();
    world.run_script(&script, &args, actor);
    codes::PROMPT
}

fn cmd_bash(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let room = here(world, actor);
    let Some(name) = cmd.word(1) else {
        actor.print("Bash whom?\n");
        return codes::PROMPT;
    };
    let Some(target) = world.find_in_room(&room, name, actor.id()) else {
        actor.print(&format!("You can't find '{}'.\n", name));
        return codes::PROMPT;
    };
    world.interrupt(actor);
    let victim = world
        .creature(target)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    actor.print(&format!("You bash {}!\n", victim));
    notify(world, target, &format!("{} bashes you!\n", actor.name()));
    world.interrupt_creature(target);

    let monster = world.creature(target).is_some_and(|c| !c.is_player());
    if monster && actor.is_player() {
        world.delayed_command_for(target, "bash", Some(&*actor), RETALIATE_SECS);
    }
    codes::PROMPT
}

fn cmd_meditate(_world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    actor.print("You close your eyes and clear your mind.\n");
    codes::PROMPT
}

fn cmd_social(
    world: &mut World,
    actor: &mut dyn Actor,
    cmd: &ParsedCommand,
    messages: &SocialMessages,
) -> CommandCode {
    let room = here(world, actor);
    let name = actor.name().to_string();

    let Some(word) = cmd.word(1) else {
        actor.print(&render(&messages.self_no_target, &name, ""));
        world.broadcast_room(&room, actor.id(), &render(&messages.room_no_target, &name, ""));
        return codes::PROMPT;
    };
    let Some(target) = world.find_in_room(&room, word, actor.id()) else {
        actor.print(&format!("You don't see '{}' here.\n", word));
        return codes::PROMPT;
    };
    let victim = world
        .creature(target)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    actor.print(&render(&messages.self_on_target, &name, &victim));
    notify(world, target, &render(&messages.victim_on_target, &name, &victim));
    let text = render(&messages.room_on_target, &name, &victim);
    let bystanders: Vec<ActorId> = world
        .occupants(&room, actor.id())
        .into_iter()
        .map(|c| c.id)
        .filter(|id| *id != target)
        .collect();
    for id in bystanders {
        notify(world, id, &text);
    }
    codes::PROMPT
}

fn cmd_reload(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    match world.reload() {
        Ok(stats) => actor.print(&format!("Command table reloaded: {} entries.\n", stats.total())),
        Err(e) => {
            warn!("reload requested by {} failed: {}", actor.name(), e);
            actor.print(&format!("Reload failed: {}\n", e));
        }
    }
    codes::PROMPT
}

fn cmd_info(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    let m = metrics::snapshot();
    let stats = world.registry().stats();
    let mut text = format!("{} status\n", world.name());
    text.push_str(&format!(
        "Commands: {} loaded ({} songs, {} spells)\n",
        stats.total(),
        stats.songs,
        stats.spells
    ));
    text.push_str(&format!(
        "Dispatch: {} ok, {} not found, {} not unique, {} denied, {} petrified\n",
        m.dispatch_ok, m.not_found, m.not_unique, m.not_auth, m.gated
    ));
    text.push_str(&format!(
        "Delayed: {} queued, {} scheduled, {} fired, {} cancelled, {} orphaned\n",
        world.scheduler().len(),
        m.actions_scheduled,
        m.actions_fired,
        m.actions_cancelled,
        m.orphans_purged
    ));
    let top = metrics::top_commands(5);
    if !top.is_empty() {
        let rows: Vec<String> = top.iter().map(|(n, c)| format!("{} ({})", n, c)).collect();
        text.push_str(&format!("Most used: {}\n", rows.join(", ")));
    }
    actor.print(&text);
    codes::PROMPT
}

fn find_player(world: &World, name: &str) -> Option<ActorId> {
    let wanted = name.to_lowercase();
    world
        .creatures()
        .find(|c| c.name.to_lowercase() == wanted)
        .map(|c| c.id)
}

fn cmd_petrify(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let Some(name) = cmd.word(1) else {
        actor.print("Petrify whom?\n");
        return codes::PROMPT;
    };
    let Some(target) = find_player(world, name).and_then(|id| world.creature_mut(id)) else {
        actor.print(&format!("{} is not on.\n", name));
        return codes::PROMPT;
    };
    target.petrified = !target.petrified;
    let state = if target.petrified { "petrified" } else { "released" };
    let victim = target.name.clone();
    if target.petrified {
        target.print("Your body turns to stone!\n");
    } else {
        target.print("You can move again.\n");
    }
    info!(target: "security", "{} {} {}", actor.name(), state, victim);
    actor.print(&format!("{} {}.\n", victim, state));
    codes::PROMPT
}

fn cmd_force(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let (Some(name), line) = (cmd.word(1), cmd.rest_after(2)) else {
        actor.print("Force whom?\n");
        return codes::PROMPT;
    };
    if line.is_empty() {
        actor.print("Force them to do what?\n");
        return codes::PROMPT;
    }
    let Some(target) = find_player(world, name) else {
        actor.print(&format!("{} is not on.\n", name));
        return codes::PROMPT;
    };
    let line = line.to_string();
    world.handle_line(target, &line);
    actor.print("Ok.\n");
    codes::PROMPT
}

fn parse_delay(actor: &mut dyn Actor, cmd: &ParsedCommand, usage: &str) -> Option<(i64, String)> {
    let secs = cmd
        .full
        .split_whitespace()
        .nth(1)
        .and_then(|w| w.parse::<i64>().ok());
    let rest = cmd.rest_after(2);
    match secs {
        Some(secs) if secs >= 0 && !rest.is_empty() => Some((secs, rest.to_string())),
        _ => {
            actor.print(usage);
            None
        }
    }
}

fn cmd_delay(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let Some((secs, line)) = parse_delay(actor, cmd, "Syntax: *delay <seconds> <command>\n") else {
        return codes::PROMPT;
    };
    world.delayed_command(&*actor, &line, None, secs);
    actor.print(&format!("In {} second(s): {}\n", secs, line));
    codes::PROMPT
}

fn cmd_script(world: &mut World, actor: &mut dyn Actor, cmd: &ParsedCommand) -> CommandCode {
    let Some((secs, script)) = parse_delay(actor, cmd, "Syntax: *script <seconds> <script>\n") else {
        return codes::PROMPT;
    };
    world.delayed_script(&*actor, &script, secs);
    actor.print(&format!("Script {} queued for {} second(s).\n", script, secs));
    codes::PROMPT
}

fn cmd_shutdown(world: &mut World, actor: &mut dyn Actor, _cmd: &ParsedCommand) -> CommandCode {
    warn!(target: "security", "shutdown requested by {}", actor.name());
    world.broadcast_where(|_| true, "The world is shutting down.\n");
    actor.print("Shutting down.\n");
    world.request_shutdown();
    codes::PROMPT
}
