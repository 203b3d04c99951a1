use mudcore::config::Config;
use mudcore::engine::actor::{ActorId, ResourceType};
use mudcore::engine::delayed::ActionKind;
use mudcore::engine::method::codes;
use mudcore::engine::roles::{LEVEL_CARETAKER, LEVEL_DUNGEONMASTER, LEVEL_PLAYER};
use mudcore::world::commands::{FISH_SECS, RETALIATE_SECS};
use mudcore::world::{LoggingScriptHost, World};

fn world() -> World {
    World::new(&Config::default()).expect("builtin table loads")
}

fn said(world: &mut World, id: ActorId) -> String {
    world.take_output(id).concat()
}

#[test]
fn fishing_completes_on_the_pier() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    w.set_now(100);

    w.handle_line(ann, "fish");
    assert!(said(&mut w, ann).contains("There is no water to fish in here."));

    w.handle_line(ann, "e");
    assert_eq!(w.location(ann), Some("pier"));
    w.handle_line(ann, "fish");
    assert!(said(&mut w, ann).contains("You begin fishing."));

    w.handle_line(ann, "fish");
    assert!(said(&mut w, ann).contains("You are already fishing!"));

    w.handle_line(ann, "eff");
    assert!(said(&mut w, ann).contains("*Fishing*"));

    assert_eq!(w.update(100 + FISH_SECS - 1), 0);
    assert_eq!(w.update(100 + FISH_SECS), 1);
    assert!(said(&mut w, ann).contains("land a fish"));
    assert!(!w.scheduler().has_action(ann, ActionKind::Fish));
}

#[test]
fn stop_and_movement_interrupt_activities() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);

    w.handle_line(ann, "search");
    w.handle_line(ann, "stop");
    let out = said(&mut w, ann);
    assert!(out.contains("You begin searching."));
    assert!(out.contains("You stop what you are doing."));
    assert!(w.scheduler().is_empty());

    w.handle_line(ann, "stop");
    assert!(said(&mut w, ann).contains("You aren't doing anything."));

    w.handle_line(ann, "track");
    w.handle_line(ann, "east");
    assert!(said(&mut w, ann).contains("You stop what you are doing."));
    assert!(!w.scheduler().has_action(ann, ActionKind::Track));
}

#[test]
fn delayed_command_is_dispatched_later() {
    let mut w = world();
    let ada = w.spawn_player("Ada", LEVEL_DUNGEONMASTER);
    w.set_now(50);

    w.handle_line(ada, "*delay 3 say Hello there");
    assert!(said(&mut w, ada).contains("In 3 second(s): say Hello there"));
    assert_eq!(w.scheduler().pending_count(ada), 1);

    w.update(52);
    assert!(said(&mut w, ada).is_empty());
    w.update(53);
    assert!(said(&mut w, ada).contains("You say, \"Hello there\""));

    w.handle_line(ada, "*delay soon look");
    assert!(said(&mut w, ada).contains("Syntax: *delay"));
}

#[test]
fn delayed_script_goes_to_the_script_host() {
    let mut w = world();
    let host = LoggingScriptHost::default();
    w.set_script_host(Box::new(host.clone()));
    let ada = w.spawn_player("Ada", LEVEL_DUNGEONMASTER);
    w.set_now(0);

    w.handle_line(ada, "*script 2 quest.start");
    w.update(1);
    assert!(host.runs().is_empty());
    w.update(2);
    let runs = host.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].script, "quest.start");
    assert_eq!(runs[0].actor, ada);
}

#[test]
fn staff_commands_are_hidden_and_guarded() {
    let mut w = world();
    let bob = w.spawn_player("Bob", LEVEL_PLAYER);
    let cara = w.spawn_player("Cara", LEVEL_CARETAKER);

    w.handle_line(bob, "*reload");
    assert!(said(&mut w, bob).contains("The command \"*reload\" does not exist."));

    w.handle_line(cara, "*reload");
    assert!(said(&mut w, cara).contains("Command table reloaded"));

    w.handle_line(cara, "*shutdown");
    assert!(said(&mut w, cara).contains("You do not have the proper authorization"));
    assert!(!w.shutdown_requested());
}

#[test]
fn petrified_players_can_only_use_safe_commands() {
    let mut w = world();
    let ada = w.spawn_player("Ada", LEVEL_DUNGEONMASTER);
    let bob = w.spawn_player("Bob", LEVEL_PLAYER);

    w.handle_line(ada, "*petrify bob");
    assert!(said(&mut w, ada).contains("Bob petrified."));
    assert!(said(&mut w, bob).contains("Your body turns to stone!"));

    w.handle_line(bob, "look");
    assert!(said(&mut w, bob).contains("You're petrified!"));
    w.handle_line(bob, "who");
    assert!(said(&mut w, bob).contains("Players online (2)"));

    w.handle_line(ada, "*petrify bob");
    w.handle_line(bob, "look");
    assert!(said(&mut w, bob).contains("Town Square"));
}

#[test]
fn songs_and_spells_resolve_by_prefix() {
    let mut w = world();
    let host = LoggingScriptHost::default();
    w.set_script_host(Box::new(host.clone()));
    let ada = w.spawn_player("Ada", LEVEL_DUNGEONMASTER);

    w.handle_line(ada, "sing heal");
    w.handle_line(ada, "*cast l");
    // any word of a spell's name can be abbreviated
    w.handle_line(ada, "*cast mis rat");
    let runs = host.runs();
    let scripts: Vec<&str> = runs.iter().map(|r| r.script.as_str()).collect();
    assert_eq!(scripts, vec!["songs.healing", "spells.light", "spells.magic_missile"]);
    assert_eq!(runs[2].args, "rat");

    w.handle_line(ada, "sing dirge");
    assert!(said(&mut w, ada).contains("That song does not exist."));
    w.handle_line(ada, "*cast zzz");
    assert!(said(&mut w, ada).contains("The spell \"zzz\" does not exist."));
}

#[test]
fn socials_reach_target_and_bystanders() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    let bob = w.spawn_player("Bob", LEVEL_PLAYER);
    let cy = w.spawn_player("Cy", LEVEL_PLAYER);

    w.handle_line(ann, "smile bob");
    assert!(said(&mut w, ann).contains("You smile at Bob."));
    assert!(said(&mut w, bob).contains("Ann smiles at you."));
    assert!(said(&mut w, cy).contains("Ann smiles at Bob."));

    w.handle_line(ann, "wave");
    assert!(said(&mut w, bob).contains("Ann waves."));
}

#[test]
fn bash_costs_focus_and_breaks_concentration() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    let bob = w.spawn_player("Bob", LEVEL_PLAYER);

    w.handle_line(bob, "study");
    w.handle_line(ann, "bash bob");
    assert!(said(&mut w, ann).contains("You bash Bob!"));
    let bob_out = said(&mut w, bob);
    assert!(bob_out.contains("Ann bashes you!"));
    assert!(bob_out.contains("You stop what you are doing."));
    assert!(!w.scheduler().has_action(bob, ActionKind::Study));

    let focus = w.creature(ann).map(|c| c.resource(ResourceType::Focus));
    assert_eq!(focus, Some(90));

    // still cooling down: refused before any cost is charged
    w.handle_line(ann, "bash bob");
    assert!(said(&mut w, ann).contains("Please wait 6 more second(s)."));
    assert!(said(&mut w, bob).is_empty());
    let focus = w.creature(ann).map(|c| c.resource(ResourceType::Focus));
    assert_eq!(focus, Some(90));
}

#[test]
fn bashed_monsters_bash_back() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    w.spawn_monster("rat");
    w.set_now(10);

    w.handle_line(ann, "bash rat");
    assert!(said(&mut w, ann).contains("You bash rat!"));
    assert_eq!(w.scheduler().len(), 1);

    w.update(10 + RETALIATE_SECS);
    assert!(said(&mut w, ann).contains("rat bashes you!"));
    assert!(w.scheduler().is_empty());
}

#[test]
fn skills_refuse_when_resources_run_out() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    if let Some(c) = w.creature_mut(ann) {
        c.set_resource(ResourceType::Energy, 2);
    }
    w.handle_line(ann, "meditate");
    assert!(said(&mut w, ann).contains("You need to have at least 5"));
    assert_eq!(w.creature(ann).map(|c| c.resource(ResourceType::Energy)), Some(2));
}

#[test]
fn quit_asks_for_disconnect() {
    let mut w = world();
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);
    assert_eq!(w.handle_line(ann, "quit"), codes::DISCONNECT);
    assert!(said(&mut w, ann).contains("Goodbye!"));
}

#[test]
fn monsters_can_act_without_player_commands() {
    let mut w = world();
    let rat = w.spawn_monster("rat");
    let ann = w.spawn_player("Ann", LEVEL_PLAYER);

    w.handle_line(rat, "nod");
    assert!(said(&mut w, ann).contains("rat nods."));
    // fish lives in the player namespace
    w.handle_line(rat, "fish");
    assert!(w.scheduler().is_empty());
}
