use serde::{Deserialize, Serialize};

use super::auth::ModuleId;
use super::id::{NodeId, Token};
use super::node::NodeKind;

/// Change notifications, emitted exactly once per node per
///  successful mutation and never when a mutation fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    Created {
        id: NodeId,
        token: Token,
        parent: NodeId,
        kind: NodeKind,
    },
    Moved {
        id: NodeId,
        from: NodeId,
        to: NodeId,
    },
    AccessAuthUpdate {
        id: NodeId,
        module: Option<ModuleId>,
    },
    ReferenceAuthUpdate {
        id: NodeId,
        module: Option<ModuleId>,
    },
    UriUpdate {
        id: NodeId,
        uri: String,
    },
    ReferencedAssetsUpdate {
        id: NodeId,
        assets: Vec<NodeId>,
    },
}

impl RegistryEvent {
    /// The node this event is about
    pub fn id(&self) -> &NodeId {
        match self {
            RegistryEvent::Created { id, .. }
            | RegistryEvent::Moved { id, .. }
            | RegistryEvent::AccessAuthUpdate { id, .. }
            | RegistryEvent::ReferenceAuthUpdate { id, .. }
            | RegistryEvent::UriUpdate { id, .. }
            | RegistryEvent::ReferencedAssetsUpdate { id, .. } => id,
        }
    }
}

/// Fan-out of registry events to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<flume::Sender<RegistryEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> flume::Receiver<RegistryEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `events` in order; subscribers that hung up are dropped
    pub fn publish(&mut self, events: Vec<RegistryEvent>) {
        for event in events {
            tracing::debug!("registry event: {:?}", event);
            self.subscribers
                .retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_publish_fans_out_and_prunes() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        drop(b);

        let id = NodeId::from_content(b"x");
        bus.publish(vec![RegistryEvent::UriUpdate {
            id,
            uri: "ipfs://x".to_string(),
        }]);

        assert_eq!(bus.subscriber_count(), 1);
        let event = a.try_recv().unwrap();
        assert_eq!(event.id(), &id);
        assert!(a.try_recv().is_err());
    }
}
