//! Message-bus notification port.
//!
//! Repositories hand the finished model to the publisher after a successful
//! commit; serialization transport, delivery and retry belong to the bus
//! implementation, not to this layer.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::common::entities::app_errors::DaoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOp {
    Created,
    Edited,
    Deleted,
}

impl EventOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOp::Created => "created",
            EventOp::Edited => "edited",
            EventOp::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceEvent {
    pub resource: &'static str,
    pub op: EventOp,
    pub payload: Value,
}

impl ResourceEvent {
    pub fn new(
        op: EventOp,
        resource: &'static str,
        model: &impl Serialize,
    ) -> Result<Self, DaoError> {
        let payload = serde_json::to_value(model)
            .map_err(|e| DaoError::invalid_input("payload", e.to_string()))?;
        Ok(Self {
            resource,
            op,
            payload,
        })
    }
}

/// Enqueue-style publisher: implementations hand the event to a bus and
/// return immediately, so the trait stays object safe.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &ResourceEvent);
}

/// Publish after a successful commit. A payload that cannot be serialized is
/// logged and dropped; a committed mutation is never failed retroactively.
pub fn notify(
    publisher: &dyn EventPublisher,
    op: EventOp,
    resource: &'static str,
    model: &impl Serialize,
) {
    match ResourceEvent::new(op, resource, model) {
        Ok(event) => publisher.publish(&event),
        Err(e) => warn!("dropping {} {} event: {}", resource, op.as_str(), e),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Sample {
        id: i32,
        name: String,
    }

    #[test]
    fn test_event_payload() {
        let model = Sample {
            id: 7,
            name: "Ashton".to_string(),
        };
        let event = ResourceEvent::new(EventOp::Created, "context", &model).unwrap();
        assert_eq!(event.resource, "context");
        assert_eq!(event.op, EventOp::Created);
        assert_eq!(event.payload, json!({"id": 7, "name": "Ashton"}));
    }

    #[test]
    fn test_notify_reaches_publisher() {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|event| event.resource == "context" && event.op == EventOp::Deleted)
            .times(1)
            .return_const(());

        let model = Sample {
            id: 7,
            name: "Ashton".to_string(),
        };
        notify(&publisher, EventOp::Deleted, "context", &model);
    }
}
