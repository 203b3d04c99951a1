use std::time::Duration;

use mudcore::config::Config;
use mudcore::server::GameServer;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

type Lines = tokio::io::Lines<BufReader<OwnedReadHalf>>;

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.motd = "Test harbour".to_string();
    config.server.staff.insert("ada".to_string(), "dm".to_string());
    config.scheduler.tick_ms = 50;
    config.scheduler.stats_interval_secs = 0;
    config
}

/// Read lines until one contains `needle`. Prompts carry no newline, so they
/// show up glued to the front of the following line.
async fn expect(lines: &mut Lines, needle: &str) -> String {
    let wait = async {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.contains(needle) => return line,
                Ok(Some(_)) => continue,
                other => panic!("connection ended waiting for {:?}: {:?}", needle, other),
            }
        }
    };
    timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {:?}", needle))
}

async fn connect(addr: std::net::SocketAddr) -> (Lines, tokio::net::tcp::OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, write) = stream.into_split();
    (BufReader::new(read).lines(), write)
}

#[tokio::test]
async fn session_login_commands_and_delayed_actions() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GameServer::new(test_config()).unwrap();
    let handle = tokio::spawn(server.serve(listener));

    let (mut lines, mut out) = connect(addr).await;
    expect(&mut lines, "Test harbour").await;
    out.write_all(b"ada\r\n").await.unwrap();
    expect(&mut lines, "Town Square").await;

    out.write_all(b"say hi all\n").await.unwrap();
    expect(&mut lines, "You say, \"hi all\"").await;

    out.write_all(b"xyzzy\n").await.unwrap();
    expect(&mut lines, "The command \"xyzzy\" does not exist.").await;

    // fires from the game loop's own clock
    out.write_all(b"*delay 1 say later\n").await.unwrap();
    expect(&mut lines, "In 1 second(s)").await;
    expect(&mut lines, "You say, \"later\"").await;

    out.write_all(b"*shutdown\n").await.unwrap();
    expect(&mut lines, "Shutting down.").await;

    let result = timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn players_see_each_other_and_quit_closes_the_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GameServer::new(test_config()).unwrap();
    let handle = tokio::spawn(server.serve(listener));

    let (mut ann_in, mut ann_out) = connect(addr).await;
    expect(&mut ann_in, "Test harbour").await;
    ann_out.write_all(b"ann\n").await.unwrap();
    expect(&mut ann_in, "Town Square").await;

    let (mut bob_in, mut bob_out) = connect(addr).await;
    expect(&mut bob_in, "Test harbour").await;
    bob_out.write_all(b"ANN\n").await.unwrap();
    expect(&mut bob_in, "already in use").await;
    bob_out.write_all(b"bob\n").await.unwrap();
    expect(&mut bob_in, "You see Ann").await;

    bob_out.write_all(b"wave ann\n").await.unwrap();
    expect(&mut ann_in, "Bob waves to you.").await;

    ann_out.write_all(b"quit\n").await.unwrap();
    expect(&mut ann_in, "Goodbye!").await;
    let closed = timeout(Duration::from_secs(5), ann_in.next_line()).await.unwrap();
    assert!(matches!(closed, Ok(None)));
    expect(&mut bob_in, "Ann fades away.").await;

    handle.abort();
}
