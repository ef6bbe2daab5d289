//! Realtime push channel.
//!
//! The [`ConnectionManager`] fans events out to every admitted WebSocket
//! through a `tokio::sync::broadcast` channel. Delivery is fire-and-forget:
//! nothing is acknowledged, retried, or replayed.

pub mod socket;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::models::Phase;

/// Outbound event, serialized as `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum RealtimeEvent {
    PhaseUpdated(Phase),
}

/// Admitted client, tracked for the lifetime of its connection.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub user_id: Uuid,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// Registry of connected clients plus the broadcast sender.
#[derive(Clone)]
pub struct ConnectionManager {
    sender: broadcast::Sender<RealtimeEvent>,
    clients: Arc<RwLock<HashMap<Uuid, ClientInfo>>>,
}

/// A registered client's receiving end.
pub struct Subscription {
    pub id: Uuid,
    receiver: broadcast::Receiver<RealtimeEvent>,
}

impl Subscription {
    /// Next event, skipping past anything lost to lag. `None` once the channel closes.
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Realtime client {} lagged, skipped {} events", self.id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl ConnectionManager {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, user_id: Uuid) -> Subscription {
        let id = Uuid::new_v4();
        let receiver = self.sender.subscribe();

        self.clients.write().await.insert(
            id,
            ClientInfo {
                user_id,
                connected_at: chrono::Utc::now(),
            },
        );
        debug!("Realtime client {} registered for user {}", id, user_id);

        Subscription { id, receiver }
    }

    pub async fn unregister(&self, id: Uuid) {
        if self.clients.write().await.remove(&id).is_some() {
            debug!("Realtime client {} unregistered", id);
        }
    }

    /// Sends to every live subscription and returns how many received it.
    pub fn broadcast(&self, event: RealtimeEvent) -> usize {
        // send only fails when no receiver exists
        self.sender.send(event).unwrap_or(0)
    }

    pub async fn connected(&self) -> usize {
        self.clients.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(name: &str) -> Phase {
        Phase {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            start_date: None,
            end_date: None,
            order_num: 1,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let manager = ConnectionManager::new(8);
        let mut a = manager.register(Uuid::new_v4()).await;
        let mut b = manager.register(Uuid::new_v4()).await;
        assert_eq!(manager.connected().await, 2);

        let event = RealtimeEvent::PhaseUpdated(phase("Kickoff"));
        assert_eq!(manager.broadcast(event.clone()), 2);

        assert_eq!(a.recv().await, Some(event.clone()));
        assert_eq!(b.recv().await, Some(event));
    }

    #[tokio::test]
    async fn broadcast_without_clients_is_a_no_op() {
        let manager = ConnectionManager::new(8);
        assert_eq!(manager.broadcast(RealtimeEvent::PhaseUpdated(phase("x"))), 0);
    }

    #[tokio::test]
    async fn unregister_drops_the_client() {
        let manager = ConnectionManager::new(8);
        let sub = manager.register(Uuid::new_v4()).await;
        manager.unregister(sub.id).await;
        assert_eq!(manager.connected().await, 0);
    }

    #[tokio::test]
    async fn lagging_receiver_keeps_going() {
        let manager = ConnectionManager::new(2);
        let mut sub = manager.register(Uuid::new_v4()).await;

        for i in 0..5 {
            manager.broadcast(RealtimeEvent::PhaseUpdated(phase(&format!("p{}", i))));
        }

        let RealtimeEvent::PhaseUpdated(latest) = sub.recv().await.unwrap();
        assert_eq!(latest.name, "p3");
    }

    #[test]
    fn wire_format() {
        let p = phase("Kickoff");
        let json = serde_json::to_value(RealtimeEvent::PhaseUpdated(p.clone())).unwrap();
        assert_eq!(json["event"], "phaseUpdated");
        assert_eq!(json["data"]["name"], "Kickoff");
        assert_eq!(json["data"]["isActive"], true);
    }
}
