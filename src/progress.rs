//! Progress and status reporting for long-running pipeline stages.
//!
//! Stages report through the `ProgressSink` trait instead of threading
//! callbacks through every call. Computation stays headless: tests observe
//! with `CollectingProgress`, UIs subscribe through `ChannelProgress`, and
//! `NullProgress` discards everything.

use std::sync::Mutex;

/// Observer for stage progress and status updates.
///
/// Implementations must tolerate being called from whichever thread runs
/// the stage. Percent values are 0.0..=100.0 and monotone per stage.
pub trait ProgressSink: Send + Sync {
    /// Report fractional completion of the current stage.
    fn percent(&self, value: f32);

    /// Report a human-readable status line for the current stage.
    fn status(&self, message: &str);
}

/// Sink that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn percent(&self, _value: f32) {}
    fn status(&self, _message: &str) {}
}

/// Sink that records all updates, for tests and batch reports.
#[derive(Debug, Default)]
pub struct CollectingProgress {
    percents: Mutex<Vec<f32>>,
    statuses: Mutex<Vec<String>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// All percent values reported so far, in order.
    pub fn percents(&self) -> Vec<f32> {
        self.percents.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// All status messages reported so far, in order.
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// The last percent value reported, if any.
    pub fn last_percent(&self) -> Option<f32> {
        self.percents.lock().ok().and_then(|v| v.last().copied())
    }
}

impl ProgressSink for CollectingProgress {
    fn percent(&self, value: f32) {
        if let Ok(mut percents) = self.percents.lock() {
            percents.push(value);
        }
    }

    fn status(&self, message: &str) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(message.to_string());
        }
    }
}

/// Progress event delivered over a channel to a decoupled consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Percent(f32),
    Status(String),
}

/// Sink that forwards updates over a crossbeam channel.
///
/// Sends are non-blocking; updates are dropped if the receiver lags or has
/// disconnected, so a slow UI can never stall a pipeline stage.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: crossbeam_channel::Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiver it feeds.
    pub fn new(capacity: usize) -> (Self, crossbeam_channel::Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    pub fn from_sender(tx: crossbeam_channel::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn percent(&self, value: f32) {
        let _ = self.tx.try_send(ProgressEvent::Percent(value));
    }

    fn status(&self, message: &str) {
        let _ = self.tx.try_send(ProgressEvent::Status(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_progress_accepts_updates() {
        let sink = NullProgress;
        sink.percent(50.0);
        sink.status("working");
    }

    #[test]
    fn test_collecting_progress_records_in_order() {
        let sink = CollectingProgress::new();
        sink.percent(10.0);
        sink.percent(60.0);
        sink.percent(100.0);
        sink.status("done");

        assert_eq!(sink.percents(), vec![10.0, 60.0, 100.0]);
        assert_eq!(sink.statuses(), vec!["done".to_string()]);
        assert_eq!(sink.last_percent(), Some(100.0));
    }

    #[test]
    fn test_collecting_progress_empty() {
        let sink = CollectingProgress::new();
        assert!(sink.percents().is_empty());
        assert_eq!(sink.last_percent(), None);
    }

    #[test]
    fn test_channel_progress_delivers_events() {
        let (sink, rx) = ChannelProgress::new(8);
        sink.status("Extracting audio...");
        sink.percent(42.0);

        assert_eq!(
            rx.recv().unwrap(),
            ProgressEvent::Status("Extracting audio...".to_string())
        );
        assert_eq!(rx.recv().unwrap(), ProgressEvent::Percent(42.0));
    }

    #[test]
    fn test_channel_progress_drops_when_full() {
        let (sink, rx) = ChannelProgress::new(1);
        sink.percent(1.0);
        sink.percent(2.0); // dropped, channel full

        assert_eq!(rx.recv().unwrap(), ProgressEvent::Percent(1.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_progress_survives_dropped_receiver() {
        let (sink, rx) = ChannelProgress::new(4);
        drop(rx);
        sink.percent(99.0);
        sink.status("still fine");
    }

    #[test]
    fn test_sink_is_object_safe() {
        let sink: Box<dyn ProgressSink> = Box::new(NullProgress);
        sink.percent(0.0);
    }
}
