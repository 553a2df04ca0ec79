// ── Connectivity observation ──
//
// Process-wide view of whether the network is reachable. The current value
// lives in a `watch` channel: reads are non-blocking, and subscribers get
// the current value replayed followed by every change.

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ProbeConfig;

/// Connection classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionType {
    Wifi,
    Mobile,
    /// Connected over an unspecified transport.
    #[default]
    Online,
    NoInternet,
}

impl ConnectionType {
    pub fn is_connected(self) -> bool {
        !matches!(self, Self::NoInternet)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Mobile => "mobile",
            Self::Online => "online",
            Self::NoInternet => "offline",
        }
    }
}

/// Source of connectivity state.
///
/// The repository only ever calls [`connection_type`](Self::connection_type);
/// front-ends subscribe through [`observe`](Self::observe).
pub trait ConnectivityObserver: Send + Sync {
    /// Last known value. Never blocks.
    fn connection_type(&self) -> ConnectionType;

    /// Record a new value and notify subscribers if it changed.
    fn set_connection_type(&self, connection_type: ConnectionType);

    /// Subscribe to changes. The current value is replayed first.
    fn observe(&self) -> ConnectivityStream;
}

// ── Stream handle ───────────────────────────────────────────────────

/// A subscription to connectivity changes.
pub struct ConnectivityStream {
    current: ConnectionType,
    receiver: watch::Receiver<ConnectionType>,
}

impl ConnectivityStream {
    pub(crate) fn new(mut receiver: watch::Receiver<ConnectionType>) -> Self {
        let current = *receiver.borrow_and_update();
        Self { current, receiver }
    }

    /// Value captured at subscription time (or at the last `changed()`).
    pub fn current(&self) -> ConnectionType {
        self.current
    }

    /// Latest value, which may be newer than `current()`.
    pub fn latest(&self) -> ConnectionType {
        *self.receiver.borrow()
    }

    /// Wait for the next change. Returns `None` once the observer is gone.
    pub async fn changed(&mut self) -> Option<ConnectionType> {
        self.receiver.changed().await.ok()?;
        let value = *self.receiver.borrow_and_update();
        self.current = value;
        Some(value)
    }

    /// Convert into a `Stream` that yields the current value first.
    pub fn into_stream(self) -> ConnectivityWatchStream {
        ConnectivityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ConnectivityWatchStream {
    inner: WatchStream<ConnectionType>,
}

impl Stream for ConnectivityWatchStream {
    type Item = ConnectionType;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Network monitor ─────────────────────────────────────────────────

struct ProbeTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// The app-wide connectivity service.
///
/// Starts as `Online`. [`start`](Self::start) spawns a reachability probe
/// that flips the value between `Online` and `NoInternet`; without it the
/// monitor is a plain settable observer (handy in tests).
pub struct NetworkConnectivityMonitor {
    state: watch::Sender<ConnectionType>,
    probe: Mutex<Option<ProbeTask>>,
}

impl NetworkConnectivityMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionType::default());
        Self {
            state,
            probe: Mutex::new(None),
        }
    }

    /// Spawn the background probe. Replaces a probe that is already running.
    /// The task only holds a weak reference, so dropping the last `Arc`
    /// stops it. Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>, config: ProbeConfig) {
        self.stop();

        info!(host = %config.host, port = config.port, "starting connectivity probe");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(probe_task(Arc::downgrade(self), config, cancel.clone()));

        *self.probe.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(ProbeTask { cancel, handle });
    }

    /// Cancel the background probe, if any. The last value is kept.
    pub fn stop(&self) {
        let task = self
            .probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel.cancel();
            task.handle.abort();
            debug!("connectivity probe stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Fold one probe outcome into the current value. A successful probe
    /// keeps a more specific transport (`Wifi`, `Mobile`) as-is.
    pub(crate) fn apply_probe(&self, reachable: bool) {
        self.state.send_if_modified(|current| {
            let next = match (*current, reachable) {
                (ConnectionType::NoInternet, true) => ConnectionType::Online,
                (_, false) => ConnectionType::NoInternet,
                (other, true) => other,
            };
            if next == *current {
                false
            } else {
                info!(from = current.label(), to = next.label(), "connectivity changed");
                *current = next;
                true
            }
        });
    }
}

impl Default for NetworkConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityObserver for NetworkConnectivityMonitor {
    fn connection_type(&self) -> ConnectionType {
        *self.state.borrow()
    }

    fn set_connection_type(&self, connection_type: ConnectionType) {
        self.state.send_if_modified(|current| {
            if *current == connection_type {
                false
            } else {
                *current = connection_type;
                true
            }
        });
    }

    fn observe(&self) -> ConnectivityStream {
        ConnectivityStream::new(self.state.subscribe())
    }
}

impl Drop for NetworkConnectivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Attempt a TCP connection to the probe target.
async fn probe_once(config: &ProbeConfig) -> bool {
    let connect = TcpStream::connect((config.host.as_str(), config.port));
    matches!(tokio::time::timeout(config.timeout, connect).await, Ok(Ok(_)))
}

/// Periodically probe reachability until cancelled or the monitor is gone.
async fn probe_task(
    monitor: Weak<NetworkConnectivityMonitor>,
    config: ProbeConfig,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let reachable = probe_once(&config).await;
                debug!(reachable, "connectivity probe");
                let Some(monitor) = monitor.upgrade() else { break };
                monitor.apply_probe(reachable);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn starts_online() {
        let monitor = NetworkConnectivityMonitor::new();
        assert_eq!(monitor.connection_type(), ConnectionType::Online);
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn observe_replays_current_value() {
        let monitor = NetworkConnectivityMonitor::new();
        monitor.set_connection_type(ConnectionType::Wifi);

        let stream = monitor.observe();
        assert_eq!(stream.current(), ConnectionType::Wifi);

        let mut stream = stream.into_stream();
        assert_eq!(stream.next().await, Some(ConnectionType::Wifi));
    }

    #[tokio::test]
    async fn changed_yields_new_values() {
        let monitor = NetworkConnectivityMonitor::new();
        let mut stream = monitor.observe();

        monitor.set_connection_type(ConnectionType::NoInternet);
        assert_eq!(stream.changed().await, Some(ConnectionType::NoInternet));
        assert_eq!(stream.current(), ConnectionType::NoInternet);
    }

    #[tokio::test]
    async fn setting_same_value_does_not_notify() {
        let monitor = NetworkConnectivityMonitor::new();
        let mut stream = monitor.observe();

        monitor.set_connection_type(ConnectionType::Online);
        let waited = tokio::time::timeout(Duration::from_millis(50), stream.changed()).await;
        assert!(waited.is_err(), "no change should have been published");
    }

    #[test]
    fn probe_success_keeps_specific_transport() {
        let monitor = NetworkConnectivityMonitor::new();
        monitor.set_connection_type(ConnectionType::Mobile);
        monitor.apply_probe(true);
        assert_eq!(monitor.connection_type(), ConnectionType::Mobile);

        monitor.apply_probe(false);
        assert_eq!(monitor.connection_type(), ConnectionType::NoInternet);

        monitor.apply_probe(true);
        assert_eq!(monitor.connection_type(), ConnectionType::Online);
    }

    #[tokio::test]
    async fn probe_marks_reachable_host_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let monitor = Arc::new(NetworkConnectivityMonitor::new());
        monitor.set_connection_type(ConnectionType::NoInternet);
        let mut stream = monitor.observe();

        monitor.start(ProbeConfig {
            host: "127.0.0.1".into(),
            port,
            interval: Duration::from_millis(20),
            timeout: Duration::from_millis(500),
        });
        assert!(monitor.is_running());

        let next = tokio::time::timeout(Duration::from_secs(2), stream.changed())
            .await
            .unwrap();
        assert_eq!(next, Some(ConnectionType::Online));

        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn dropping_monitor_stops_running_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let monitor = Arc::new(NetworkConnectivityMonitor::new());
        let mut stream = monitor.observe();
        monitor.start(ProbeConfig {
            host: "127.0.0.1".into(),
            port,
            interval: Duration::from_millis(20),
            timeout: Duration::from_millis(500),
        });
        tokio::time::sleep(Duration::from_millis(60)).await;

        let weak = Arc::downgrade(&monitor);
        drop(monitor);
        assert!(weak.upgrade().is_none());

        // The sender went away with the monitor.
        let end = tokio::time::timeout(Duration::from_secs(2), stream.changed())
            .await
            .unwrap();
        assert_eq!(end, None);
    }
}
