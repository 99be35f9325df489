use tokio::sync::broadcast;

/// Capacity of the session event channel.
/// Events are tiny and listeners drain promptly; 16 leaves room for bursts of failing calls.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Signals emitted by the request client for listeners outside the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A call was rejected as unauthorized; the session is no longer valid.
    Invalidated { url: String },
}

pub fn channel() -> (broadcast::Sender<SessionEvent>, broadcast::Receiver<SessionEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
