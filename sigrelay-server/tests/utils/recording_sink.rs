use sigrelay_server::{EventSink, RelayEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// EventSink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<RelayEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RelayEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn contains(&self, predicate: impl Fn(&RelayEvent) -> bool) -> bool {
        self.events().iter().any(predicate)
    }

    /// Polls until an event matching `predicate` shows up or `timeout_ms` passes.
    pub async fn wait_for(&self, predicate: impl Fn(&RelayEvent) -> bool, timeout_ms: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        while tokio::time::Instant::now() < deadline {
            if self.contains(&predicate) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.contains(&predicate)
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: RelayEvent) {
        tracing::debug!("[RecordingSink] {:?}", event);
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigrelay_core::PeerId;

    #[tokio::test]
    async fn test_recording_sink_captures_events() {
        let sink = RecordingEventSink::new();
        let peer = PeerId::new();

        sink.emit(RelayEvent::Connected { peer });

        assert!(sink.wait_for(|e| matches!(e, RelayEvent::Connected { .. }), 100).await);
        assert_eq!(sink.events(), vec![RelayEvent::Connected { peer }]);
    }
}
