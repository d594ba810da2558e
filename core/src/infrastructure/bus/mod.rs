use tracing::info;

use crate::domain::event::{EventPublisher, ResourceEvent};

/// Default in-process publisher: records the event in the log stream.
/// Deployments wire a real bus implementation through
/// `with_notifier` on the repositories.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &ResourceEvent) {
        info!(
            resource = event.resource,
            op = event.op.as_str(),
            "configuration event"
        );
    }
}
