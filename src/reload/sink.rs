//! Notification seam between tasks and the live reload channel.

#[cfg(test)]
use parking_lot::Mutex;

use super::message::HotReloadMessage;

/// Receives live reload notifications emitted by tasks.
///
/// Tasks run on blocking threads, so implementations must not require an
/// async context.
pub trait ReloadSink: Send + Sync {
    fn notify(&self, message: HotReloadMessage);
}

/// Collects notifications in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<HotReloadMessage>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<HotReloadMessage> {
        std::mem::take(&mut *self.messages.lock())
    }
}

#[cfg(test)]
impl ReloadSink for RecordingSink {
    fn notify(&self, message: HotReloadMessage) {
        self.messages.lock().push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.notify(HotReloadMessage::Assets);
        sink.notify(HotReloadMessage::css("assets/css/a.min.css"));

        assert_eq!(sink.take().len(), 2);
        assert!(sink.take().is_empty());
    }
}
