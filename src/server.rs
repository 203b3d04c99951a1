//! # TCP front end
//!
//! One task per connection reads lines and forwards them as [`ClientEvent`]s to
//! the single game loop, which owns the [`World`]. The loop also wakes on a
//! fixed interval to fire delayed actions with the current wall-clock second.
//! Output travels back through a per-connection channel; dropping that channel's
//! sender closes the connection.
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::engine::actor::ActorId;
use crate::engine::method::codes;
use crate::logutil::{clean_input, escape_log};
use crate::metrics;
use crate::world::World;

pub type ConnId = u64;

pub const NAME_PROMPT: &str = "By what name are you known? ";
pub const PROMPT: &str = "> ";

#[derive(Debug)]
pub enum ClientEvent {
    Connected {
        conn: ConnId,
        peer: SocketAddr,
        out: mpsc::UnboundedSender<String>,
    },
    Line {
        conn: ConnId,
        text: String,
    },
    Disconnected {
        conn: ConnId,
    },
}

struct Session {
    out: mpsc::UnboundedSender<String>,
    /// `None` until the connection has picked a name.
    actor: Option<ActorId>,
}

impl Session {
    fn send(&self, text: &str) {
        // the connection task may already be gone; its Disconnected event cleans up
        let _ = self.out.send(text.replace('\n', "\r\n"));
    }
}

pub struct GameServer {
    config: Config,
    world: World,
    sessions: HashMap<ConnId, Session>,
    last_stats: Instant,
}

impl GameServer {
    pub fn new(config: Config) -> Result<Self> {
        let world = World::new(&config).map_err(|e| anyhow!("Failed to load command table: {}", e))?;
        Ok(Self {
            config,
            world,
            sessions: HashMap::new(),
            last_stats: Instant::now(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.server.bind)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.server.bind))?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until a `*shutdown`.
    pub async fn serve(mut self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("{} listening on {}", self.world.name(), addr);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let accept = tokio::spawn(accept_loop(listener, tx, self.config.server.max_connections));

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.scheduler.tick_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let fired = self.world.update(Utc::now().timestamp());
                    if fired > 0 {
                        debug!("{} delayed action(s) fired", fired);
                        self.flush_all();
                    }
                    self.log_stats_if_due();
                }
                event = rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        warn!("accept loop ended, stopping game loop");
                        break;
                    }
                },
            }
            if self.world.shutdown_requested() {
                info!("shutdown requested, closing {} session(s)", self.sessions.len());
                self.flush_all();
                break;
            }
        }

        accept.abort();
        self.sessions.clear();
        Ok(())
    }

    fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Connected { conn, peer, out } => {
                info!("connection {} from {}", conn, peer);
                let session = Session { out, actor: None };
                let motd = self.world.motd();
                if !motd.is_empty() {
                    session.send(&format!("{}\n", motd));
                }
                session.send(NAME_PROMPT);
                self.sessions.insert(conn, session);
            }
            ClientEvent::Line { conn, text } => {
                let text = clean_input(&text);
                self.handle_line(conn, &text);
            }
            ClientEvent::Disconnected { conn } => {
                if let Some(session) = self.sessions.remove(&conn) {
                    if let Some(id) = session.actor {
                        self.world.remove_creature(id);
                    }
                    info!("connection {} closed", conn);
                }
            }
        }
    }

    fn handle_line(&mut self, conn: ConnId, text: &str) {
        let Some(actor) = self.sessions.get(&conn).map(|s| s.actor) else {
            return;
        };
        self.world.set_now(Utc::now().timestamp());

        let Some(id) = actor else {
            self.login(conn, text);
            return;
        };

        debug!("conn {} -> '{}'", conn, escape_log(text));
        let code = self.world.handle_line(id, text);
        self.flush_all();

        if code == codes::DISCONNECT {
            self.world.remove_creature(id);
            // dropping the sender lets the connection task flush and close
            self.sessions.remove(&conn);
            return;
        }
        if let Some(session) = self.sessions.get(&conn) {
            session.send(PROMPT);
        }
    }

    fn login(&mut self, conn: ConnId, name: &str) {
        let Some(session) = self.sessions.get(&conn) else {
            return;
        };
        let name = name.trim();
        if !valid_name(name) {
            session.send("Names are 2 to 16 letters.\n");
            session.send(NAME_PROMPT);
            return;
        }
        if self
            .world
            .creatures()
            .any(|c| c.name.eq_ignore_ascii_case(name))
        {
            session.send("That name is already in use.\n");
            session.send(NAME_PROMPT);
            return;
        }

        let mut display = name.to_ascii_lowercase();
        if let Some(first) = display.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        let rank = self.config.rank_for(&display);
        let id = self.world.spawn_player(&display, rank);
        if let Some(session) = self.sessions.get_mut(&conn) {
            session.actor = Some(id);
        }
        info!("connection {} logged in as {} ({})", conn, display, id);

        self.world.handle_line(id, "look");
        self.flush_all();
        if let Some(session) = self.sessions.get(&conn) {
            session.send(PROMPT);
        }
    }

    /// Push every player's pending output to its connection.
    fn flush_all(&mut self) {
        for session in self.sessions.values() {
            let Some(id) = session.actor else {
                continue;
            };
            let lines = self.world.take_output(id);
            if !lines.is_empty() {
                session.send(&lines.concat());
            }
        }
    }

    fn log_stats_if_due(&mut self) {
        let every = self.config.scheduler.stats_interval_secs;
        if every == 0 || self.last_stats.elapsed() < Duration::from_secs(every) {
            return;
        }
        self.last_stats = Instant::now();
        let m = metrics::snapshot();
        info!(
            "stats: sessions={} queued={} dispatched={} ok={} fired={} orphans={}",
            self.sessions.len(),
            self.world.scheduler().len(),
            m.dispatched(),
            m.dispatch_ok,
            m.actions_fired,
            m.orphans_purged
        );
    }
}

fn valid_name(name: &str) -> bool {
    (2..=16).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphabetic())
}

async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<ClientEvent>, max_connections: usize) {
    let active = Arc::new(AtomicUsize::new(0));
    let mut next_conn: ConnId = 1;
    loop {
        let (mut stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                error!("accept failed: {}", e);
                continue;
            }
        };
        if active.load(Ordering::SeqCst) >= max_connections {
            warn!("refusing {}: {} connections already open", peer, max_connections);
            let _ = stream.write_all(b"Too many players, try again later.\r\n").await;
            continue;
        }
        if events.is_closed() {
            break;
        }

        let conn = next_conn;
        next_conn += 1;
        active.fetch_add(1, Ordering::SeqCst);
        let events = events.clone();
        let active = Arc::clone(&active);
        tokio::spawn(async move {
            connection(conn, stream, peer, events).await;
            active.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

async fn connection(conn: ConnId, stream: TcpStream, peer: SocketAddr, events: mpsc::UnboundedSender<ClientEvent>) {
    let (reader, mut writer) = stream.into_split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    if events
        .send(ClientEvent::Connected {
            conn,
            peer,
            out: out_tx,
        })
        .is_err()
    {
        return;
    }

    let mut lines = BufReader::new(reader).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) => {
                    if events.send(ClientEvent::Line { conn, text }).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("read error on connection {}: {}", conn, e);
                    break;
                }
            },
            out = out_rx.recv() => match out {
                Some(text) => {
                    if writer.write_all(text.as_bytes()).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    let _ = writer.shutdown().await;
    let _ = events.send(ClientEvent::Disconnected { conn });
}
