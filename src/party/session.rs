use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, Stream, StreamExt};

use crate::party::connection::{ChannelConnection, PartyConnection};
use crate::party::registry::PartyRegistry;
use crate::services::group_suggest::GroupSuggester;

/// Inbound text that asks for a group suggestion
pub const SUGGEST_COMMAND: &str = "suggest_movie";

pub fn joined_message(member_id: &str) -> String {
    format!("User '{}' has joined the party.", member_id)
}

pub fn left_message(member_id: &str) -> String {
    format!("User '{}' has left the party.", member_id)
}

pub fn chat_message(member_id: &str, text: &str) -> String {
    format!("{}: {}", member_id, text)
}

pub const SEARCHING_MESSAGE: &str = "Finding a movie for the group...";

pub fn suggestion_message(suggestion: impl Display) -> String {
    format!("Suggestion for the group: {}", suggestion)
}

/// Drives one member's watch-party session until the client goes away.
///
/// `sink` and `stream` are the two halves of the member's socket. The member
/// joins `party_id` on entry and always leaves on exit, whether the client
/// closed cleanly, the stream ended, or the transport errored.
pub async fn run_session<S, R, E>(
    registry: &PartyRegistry,
    suggester: &GroupSuggester,
    party_id: &str,
    member_id: &str,
    sink: S,
    mut stream: R,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
    R: Stream<Item = Result<Message, E>> + Unpin + Send,
    E: Display + Send,
{
    let (connection, writer) = ChannelConnection::spawn(sink);
    let connection: Arc<dyn PartyConnection> = connection;

    if let Err(e) = registry
        .join(Arc::clone(&connection), party_id, member_id)
        .await
    {
        tracing::warn!(party = %party_id, member = %member_id, error = %e, "Join rejected");
        return;
    }

    registry
        .broadcast(&joined_message(member_id), party_id)
        .await;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::info!(party = %party_id, member = %member_id, error = %e, "Socket error, disconnecting");
                break;
            }
        };

        if text == SUGGEST_COMMAND {
            registry.broadcast(SEARCHING_MESSAGE, party_id).await;
            let members = registry.members(party_id).await;
            let suggestion = suggester.suggest(&members).await;
            tracing::info!(party = %party_id, members = members.len(), suggestion = %suggestion, "Group suggestion ready");
            registry
                .broadcast(&suggestion_message(&suggestion), party_id)
                .await;
        } else {
            registry
                .broadcast(&chat_message(member_id, &text), party_id)
                .await;
        }
    }

    registry.leave(&*connection, party_id).await;
    registry.broadcast(&left_message(member_id), party_id).await;

    drop(connection);
    if let Err(e) = writer.await {
        tracing::error!(error = %e, "Socket writer task failed");
    }
}
