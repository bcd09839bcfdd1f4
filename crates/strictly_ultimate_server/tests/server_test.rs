//! End-to-end tests over real TCP sockets.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strictly_ultimate::{Mark, SeatCount};
use strictly_ultimate_server::{
    GameServer, MAX_LINE_BYTES, ServerConfig, ServerMessage, SessionPhase,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.send_bytes(line.as_bytes()).await;
    }

    async fn send_bytes(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn send(&mut self, value: serde_json::Value) {
        self.send_raw(&value.to_string()).await;
    }

    async fn recv(&mut self) -> ServerMessage {
        let line = timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn expect_eof(&mut self) {
        let line = timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for close")
            .unwrap();
        assert_eq!(line, None);
    }

    /// Introduces and returns the assigned mark, consuming the follow-up state.
    async fn introduce(&mut self, name: &str) -> Option<Mark> {
        self.send(json!({"type": "introduce", "name": name})).await;
        let ServerMessage::Assign { you_are, .. } = self.recv().await else {
            panic!("expected assign");
        };
        assert!(matches!(self.recv().await, ServerMessage::State(_)));
        you_are
    }
}

async fn start(config: ServerConfig) -> (std::net::SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(GameServer::new(config));
    let handle = tokio::spawn(async move {
        server.run_with_listener(listener).await.unwrap();
    });
    (addr, handle)
}

#[tokio::test]
async fn test_join_move_and_reject_over_tcp() {
    let (addr, _server) = start(ServerConfig::default()).await;

    let mut alice = TestClient::connect(addr).await;
    assert_eq!(alice.introduce("alice").await, Some(Mark::X));

    let mut bob = TestClient::connect(addr).await;
    assert_eq!(bob.introduce("bob").await, Some(Mark::O));

    let ServerMessage::State(view) = alice.recv().await else {
        panic!("expected state after bob joined");
    };
    assert_eq!(view.phase, SessionPhase::InPlay);
    assert_eq!(view.connected_players, 2);

    // Garbage and out-of-domain indices are ignored without a reply.
    alice.send_raw("this is not json").await;
    alice.send_raw(r#"{"type":"move","big":-1,"small":0}"#).await;
    alice.send_raw("").await;

    bob.send(json!({"type": "move", "big": 4, "small": 4})).await;
    assert_eq!(
        bob.recv().await,
        ServerMessage::error("Not your turn (waiting for X)")
    );

    alice.send(json!({"type": "move", "big": 4, "small": 4})).await;
    for client in [&mut alice, &mut bob] {
        let ServerMessage::State(view) = client.recv().await else {
            panic!("expected state after move");
        };
        assert_eq!(view.turn, Mark::O);
        assert_eq!(view.board.grids[4][4], Some(Mark::X));
        assert_eq!(view.board.next_forced, Some(4));
    }

    bob.send(json!({"type": "move", "big": 0, "small": 0})).await;
    assert_eq!(
        bob.recv().await,
        ServerMessage::error("Illegal move: You must play in board 4, not board 0")
    );
}

#[tokio::test]
async fn test_undecodable_bytes_keep_the_seat() {
    let (addr, _server) = start(ServerConfig::default()).await;

    let mut alice = TestClient::connect(addr).await;
    alice.introduce("alice").await;
    let mut bob = TestClient::connect(addr).await;
    bob.introduce("bob").await;
    alice.recv().await;

    alice.send_bytes(b"\xff\xfe garbage").await;
    alice.send_bytes(&vec![b'{'; MAX_LINE_BYTES * 2]).await;
    alice.send(json!({"type": "move", "big": 4, "small": 4})).await;

    for client in [&mut alice, &mut bob] {
        let ServerMessage::State(view) = client.recv().await else {
            panic!("expected state after move");
        };
        assert_eq!(view.connected_players, 2);
        assert_eq!(view.seats[0].name.as_deref(), Some("alice"));
        assert_eq!(view.board.grids[4][4], Some(Mark::X));
    }
}

#[tokio::test]
async fn test_observer_sees_play_and_departures() {
    let (addr, _server) = start(ServerConfig::default()).await;

    let mut alice = TestClient::connect(addr).await;
    alice.introduce("alice").await;
    let mut bob = TestClient::connect(addr).await;
    bob.introduce("bob").await;
    alice.recv().await;

    let mut carol = TestClient::connect(addr).await;
    assert_eq!(carol.introduce("carol").await, None);
    alice.recv().await;
    bob.recv().await;

    carol.send(json!({"type": "move", "big": 0, "small": 0})).await;
    assert_eq!(carol.recv().await, ServerMessage::error("You are an observer"));

    drop(bob);
    let ServerMessage::State(view) = carol.recv().await else {
        panic!("expected state after departure");
    };
    assert_eq!(view.connected_players, 1);
    assert_eq!(view.seats[1].mark, Mark::O);
    assert_eq!(view.seats[1].name, None);
    assert_eq!(view.observers, vec!["carol".to_string()]);

    alice.recv().await;
    alice.send(json!({"type": "move", "big": 4, "small": 4})).await;
    assert_eq!(
        alice.recv().await,
        ServerMessage::error("Waiting for more players (1/2)")
    );
}

#[tokio::test]
async fn test_first_seat_shuts_down_everyone() {
    let config = ServerConfig::default().with_seats(SeatCount::Three);
    let (addr, server) = start(config).await;

    let mut x = TestClient::connect(addr).await;
    x.introduce("x").await;
    let mut o = TestClient::connect(addr).await;
    o.introduce("o").await;
    x.recv().await;

    o.send(json!({"type": "shutdown"})).await;
    assert_eq!(
        o.recv().await,
        ServerMessage::error("Only the first seat can shut down the session")
    );

    x.send(json!({"type": "shutdown"})).await;
    for client in [&mut x, &mut o] {
        assert_eq!(client.recv().await, ServerMessage::Shutdown);
        client.expect_eof().await;
    }

    timeout(WAIT, server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}
