use mudcore::config::Config;
use mudcore::engine::namespace::DuplicatePolicy;
use mudcore::engine::roles::{LEVEL_CARETAKER, LEVEL_PLAYER};
use mudcore::world::World;

#[tokio::test]
async fn create_default_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path = path.to_str().unwrap();

    Config::create_default(path).await.unwrap();
    let config = Config::load(path).await.unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:4000");
    assert_eq!(config.commands.duplicate_policy, DuplicatePolicy::Reject);
    assert_eq!(config.scheduler.tick_ms, 1000);
    assert_eq!(config.logging.security_file.as_deref(), Some("mudcore-security.log"));
}

#[tokio::test]
async fn custom_file_drives_the_world() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mud.toml");
    std::fs::write(
        &path,
        r#"
[server]
name = "Harbour"
motd = "Mind the gulls."

[server.staff]
cara = "caretaker"

[commands]
duplicate_policy = "warn"
petrified_allow = ["quit", "look"]
"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.server.max_connections, 64);
    assert_eq!(config.rank_for("Cara"), LEVEL_CARETAKER);
    assert_eq!(config.rank_for("Bob"), LEVEL_PLAYER);

    let mut world = World::new(&config).unwrap();
    assert_eq!(world.name(), "Harbour");
    assert_eq!(world.motd(), "Mind the gulls.");

    let bob = world.spawn_player("Bob", LEVEL_PLAYER);
    if let Some(c) = world.creature_mut(bob) {
        c.petrified = true;
    }
    world.handle_line(bob, "look");
    let out = world.take_output(bob).concat();
    assert!(out.contains("Town Square"));
    world.handle_line(bob, "who");
    assert!(world.take_output(bob).concat().contains("You're petrified!"));
}

#[tokio::test]
async fn missing_or_broken_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(Config::load(missing.to_str().unwrap()).await.is_err());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[scheduler]\ntick_ms = \"fast\"\n").unwrap();
    let err = Config::load(broken.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
