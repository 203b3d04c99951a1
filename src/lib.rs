//! # Mudcore - command dispatch for a text-based multiplayer world
//!
//! Mudcore turns typed lines into command invocations and runs timed actions
//! (fishing, searching, queued commands) when they come due.
//!
//! ## Features
//!
//! - **Prefix matching**: commands resolve from any unambiguous prefix, with a
//!   per-command priority breaking ties (`n` is north, not `nod`).
//! - **Namespaces**: general, skill, player, staff and social tables searched in
//!   a fixed order, with staff commands hidden from ordinary players.
//! - **Authorization**: per-command role predicates and a petrified allow-list.
//! - **Delayed actions**: a per-actor queue that fires on the wall-clock second
//!   and drops actions whose owner has gone.
//! - **Telnet-style server**: a Tokio line server with one game loop task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mudcore::config::Config;
//! use mudcore::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     GameServer::new(config)?.run().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - parser, namespaces, matcher, dispatcher and delayed action queue
//! - [`world`] - creatures, rooms and the built-in command table
//! - [`server`] - TCP sessions and the game loop
//! - [`config`] - configuration loading and validation
//! - [`logutil`] - input cleaning and log-safe previews
//! - [`metrics`] - dispatch and scheduler counters

pub mod config;
pub mod engine;
pub mod logutil;
pub mod metrics;
pub mod server;
pub mod world;
