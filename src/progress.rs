use std::sync::mpsc;

/// Receives human-readable status messages, possibly from several scan
/// workers at once.
pub trait ProgressSink: Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Sends each message over a channel, e.g. to a UI thread draining it.
/// A dropped receiver silently discards further messages.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, message: &str) {
        let _ = self.tx.send(message.to_string());
    }
}
