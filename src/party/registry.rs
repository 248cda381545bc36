use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::HandshakeError;
use crate::party::connection::{ConnectionId, PartyConnection};

struct Member {
    member_id: String,
    connection: Arc<dyn PartyConnection>,
}

#[derive(Default)]
struct Parties {
    /// Party key -> members in join order
    by_party: HashMap<String, Vec<Member>>,
    /// Connection -> the one party it is in
    membership: HashMap<ConnectionId, String>,
}

/// Live watch-party connections, grouped by party
///
/// Created once at startup and shared through the application state. Nothing
/// here is persisted; parties exist only while they have members.
#[derive(Default)]
pub struct PartyRegistry {
    inner: RwLock<Parties>,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `connection` and appends it to `party_key` under `member_id`.
    ///
    /// The same member may join a party any number of times, each with its own
    /// connection. A connection already in a party is rejected.
    pub async fn join(
        &self,
        connection: Arc<dyn PartyConnection>,
        party_key: &str,
        member_id: &str,
    ) -> Result<(), HandshakeError> {
        connection.accept().await?;

        let mut inner = self.inner.write().await;
        if let Some(party) = inner.membership.get(&connection.id()) {
            return Err(HandshakeError::AlreadyJoined {
                party: party.clone(),
            });
        }

        inner
            .membership
            .insert(connection.id(), party_key.to_string());
        let members = inner.by_party.entry(party_key.to_string()).or_default();
        members.push(Member {
            member_id: member_id.to_string(),
            connection,
        });

        tracing::info!(
            party = %party_key,
            member = %member_id,
            party_size = members.len(),
            "Member joined party"
        );

        Ok(())
    }

    /// Removes `connection` from `party_key`. Unknown parties or connections
    /// are ignored. Returns whether anything was removed.
    pub async fn leave(&self, connection: &dyn PartyConnection, party_key: &str) -> bool {
        let id = connection.id();
        let mut inner = self.inner.write().await;

        let Some(members) = inner.by_party.get_mut(party_key) else {
            return false;
        };
        let Some(index) = members.iter().position(|m| m.connection.id() == id) else {
            return false;
        };

        let member = members.remove(index);
        let now_empty = members.is_empty();
        if now_empty {
            inner.by_party.remove(party_key);
        }
        inner.membership.remove(&id);

        tracing::info!(
            party = %party_key,
            member = %member.member_id,
            party_closed = now_empty,
            "Member left party"
        );

        true
    }

    /// Sends `message` to every connection in `party_key`, in join order.
    ///
    /// A failed send is logged and skipped. Returns how many sends succeeded.
    pub async fn broadcast(&self, message: &str, party_key: &str) -> usize {
        let recipients: Vec<Arc<dyn PartyConnection>> = {
            let inner = self.inner.read().await;
            match inner.by_party.get(party_key) {
                Some(members) => members.iter().map(|m| Arc::clone(&m.connection)).collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for connection in &recipients {
            match connection.send_text(message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        party = %party_key,
                        connection = %connection.id(),
                        error = %e,
                        "Broadcast send failed"
                    );
                }
            }
        }

        tracing::debug!(party = %party_key, recipients = recipients.len(), delivered, "Broadcast sent");
        delivered
    }

    /// Member ids in `party_key`, in join order, duplicates included
    pub async fn members(&self, party_key: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .by_party
            .get(party_key)
            .map(|members| members.iter().map(|m| m.member_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of parties with at least one member
    pub async fn party_count(&self) -> usize {
        self.inner.read().await.by_party.len()
    }
}
