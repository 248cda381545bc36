use std::time::Duration;

use axum::extract::ws::Message;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;

use firepulse_api::{party::run_session, AppState};

mod common;
use common::{app_state, movie_night};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

struct TestClient {
    input: UnboundedSender<Message>,
    output: UnboundedReceiver<Message>,
    session: JoinHandle<()>,
}

impl TestClient {
    fn connect(state: &AppState, party_id: &str, member_id: &str) -> Self {
        let (input, inbound) = mpsc::unbounded::<Message>();
        let (outbound, output) = mpsc::unbounded::<Message>();

        let registry = state.registry.clone();
        let suggester = state.suggester.clone();
        let party_id = party_id.to_string();
        let member_id = member_id.to_string();

        let session = tokio::spawn(async move {
            run_session(
                &registry,
                &suggester,
                &party_id,
                &member_id,
                outbound,
                inbound.map(Ok::<Message, axum::Error>),
            )
            .await;
        });

        Self {
            input,
            output,
            session,
        }
    }

    async fn send(&mut self, text: &str) {
        self.input
            .send(Message::Text(text.to_string()))
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> String {
        let frame = tokio::time::timeout(RECV_TIMEOUT, self.output.next())
            .await
            .expect("timed out waiting for a message")
            .expect("connection closed");

        match frame {
            Message::Text(text) => text,
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    async fn close(mut self) -> UnboundedReceiver<Message> {
        self.input.send(Message::Close(None)).await.unwrap();
        tokio::time::timeout(RECV_TIMEOUT, self.session)
            .await
            .expect("session did not end")
            .unwrap();
        self.output
    }
}

fn test_state() -> AppState {
    let (history, lookup) = movie_night();
    app_state(history, lookup)
}

#[tokio::test]
async fn test_watch_party_flow() {
    let state = test_state();

    let mut alice = TestClient::connect(&state, "movie-night", "alice@x.com");
    assert_eq!(alice.recv().await, "User 'alice@x.com' has joined the party.");

    let mut bob = TestClient::connect(&state, "movie-night", "bob@x.com");
    assert_eq!(alice.recv().await, "User 'bob@x.com' has joined the party.");
    assert_eq!(bob.recv().await, "User 'bob@x.com' has joined the party.");

    assert_eq!(
        state.registry.members("movie-night").await,
        vec!["alice@x.com", "bob@x.com"]
    );

    alice.send("hello").await;
    assert_eq!(alice.recv().await, "alice@x.com: hello");
    assert_eq!(bob.recv().await, "alice@x.com: hello");

    bob.send("suggest_movie").await;
    for client in [&mut alice, &mut bob] {
        assert_eq!(client.recv().await, "Finding a movie for the group...");
        assert_eq!(client.recv().await, "Suggestion for the group: Z");
    }

    let mut alice_output = alice.close().await;
    assert_eq!(bob.recv().await, "User 'alice@x.com' has left the party.");
    assert!(alice_output.next().await.is_none());
    assert_eq!(state.registry.members("movie-night").await, vec!["bob@x.com"]);

    bob.close().await;
    assert!(state.registry.members("movie-night").await.is_empty());
    assert_eq!(state.registry.party_count().await, 0);
}

#[tokio::test]
async fn test_parties_are_isolated() {
    let state = test_state();

    let mut alice = TestClient::connect(&state, "party-a", "alice@x.com");
    assert_eq!(alice.recv().await, "User 'alice@x.com' has joined the party.");

    let mut bob = TestClient::connect(&state, "party-b", "bob@x.com");
    assert_eq!(bob.recv().await, "User 'bob@x.com' has joined the party.");

    alice.send("anyone there?").await;
    assert_eq!(alice.recv().await, "alice@x.com: anyone there?");

    bob.send("just me").await;
    assert_eq!(bob.recv().await, "bob@x.com: just me");

    let mut alice_output = alice.close().await;
    assert!(alice_output.next().await.is_none());

    let mut bob_output = bob.close().await;
    assert!(bob_output.next().await.is_none());
}

#[tokio::test]
async fn test_same_member_can_join_twice() {
    let state = test_state();

    let mut first = TestClient::connect(&state, "movie-night", "alice@x.com");
    assert_eq!(first.recv().await, "User 'alice@x.com' has joined the party.");

    let mut second = TestClient::connect(&state, "movie-night", "alice@x.com");
    assert_eq!(first.recv().await, "User 'alice@x.com' has joined the party.");
    assert_eq!(second.recv().await, "User 'alice@x.com' has joined the party.");

    assert_eq!(
        state.registry.members("movie-night").await,
        vec!["alice@x.com", "alice@x.com"]
    );

    first.close().await;
    assert_eq!(second.recv().await, "User 'alice@x.com' has left the party.");
    assert_eq!(state.registry.members("movie-night").await, vec!["alice@x.com"]);
}

#[tokio::test]
async fn test_transport_error_leaves_party() {
    let state = test_state();

    let mut bob = TestClient::connect(&state, "movie-night", "bob@x.com");
    assert_eq!(bob.recv().await, "User 'bob@x.com' has joined the party.");

    let (outbound, mut output) = mpsc::unbounded::<Message>();
    let inbound = futures::stream::iter(vec![
        Ok(Message::Text("hi".to_string())),
        Err(axum::Error::new("connection reset")),
        Ok(Message::Text("never delivered".to_string())),
    ]);

    run_session(
        &state.registry,
        &state.suggester,
        "movie-night",
        "carol@x.com",
        outbound,
        inbound,
    )
    .await;

    assert_eq!(bob.recv().await, "User 'carol@x.com' has joined the party.");
    assert_eq!(bob.recv().await, "carol@x.com: hi");
    assert_eq!(bob.recv().await, "User 'carol@x.com' has left the party.");

    assert_eq!(
        output.next().await,
        Some(Message::Text("User 'carol@x.com' has joined the party.".to_string()))
    );
    assert_eq!(output.next().await, Some(Message::Text("carol@x.com: hi".to_string())));
    assert!(output.next().await.is_none());

    assert_eq!(state.registry.members("movie-night").await, vec!["bob@x.com"]);
}

#[tokio::test]
async fn test_stream_end_leaves_party() {
    let state = test_state();

    let client = TestClient::connect(&state, "movie-night", "alice@x.com");
    let TestClient {
        input,
        mut output,
        session,
    } = client;

    assert_eq!(
        tokio::time::timeout(RECV_TIMEOUT, output.next()).await.unwrap(),
        Some(Message::Text("User 'alice@x.com' has joined the party.".to_string()))
    );

    drop(input);
    tokio::time::timeout(RECV_TIMEOUT, session)
        .await
        .expect("session did not end")
        .unwrap();

    assert_eq!(state.registry.party_count().await, 0);
}
