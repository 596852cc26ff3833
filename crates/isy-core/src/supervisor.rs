// ── Connection Supervisor ──
//
// Owns the event-stream socket. One task runs a single `select!` loop over
// cancellation, the liveness check, the keep-alive ping, and inbound
// frames, so the socket handle is never torn down while a frame is being
// read. Parsed event records are forwarded in arrival order to whoever
// applies them to the Registry.
//
// Reconnects are unconditional: no backoff, no attempt limit. Pings and
// teardown are time-bounded so a stuck send can never starve the check.

use std::future::Future;
use std::time::Duration;

use isy_api::{EventRecord, EventSocket, Frame, TransportConfig, parse_event};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::LivenessConfig;

/// Upper bound on closing a socket before it is simply dropped.
const TERMINATE_TIMEOUT: Duration = Duration::from_secs(5);

// ── ConnectionState ──────────────────────────────────────────────────

/// Event-stream state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    /// Socket open, nothing received yet.
    AwaitingActivity,
    /// At least one frame or pong since connecting.
    Healthy,
}

// ── Liveness ─────────────────────────────────────────────────────────

/// Last-activity bookkeeping for one connection.
#[derive(Debug, Clone)]
pub struct Liveness {
    last_activity: Instant,
    threshold: Duration,
}

impl Liveness {
    pub fn new(threshold: Duration, now: Instant) -> Self {
        Self {
            last_activity: now,
            threshold,
        }
    }

    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// `true` when the silence exceeds the threshold. A breach resets the
    /// clock, so one breach yields exactly one `true`.
    pub fn check(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_activity) > self.threshold {
            self.last_activity = now;
            true
        } else {
            false
        }
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }
}

// ── Socket seams ─────────────────────────────────────────────────────

/// An open event stream.
pub trait FrameSource: Send + Sized {
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<Frame, isy_api::Error>>> + Send;

    fn ping(&mut self) -> impl Future<Output = Result<(), isy_api::Error>> + Send;

    fn terminate(self) -> impl Future<Output = ()> + Send;
}

/// Opens event streams on demand.
pub trait Connector: Send + Sync {
    type Stream: FrameSource;

    fn connect(&self) -> impl Future<Output = Result<Self::Stream, isy_api::Error>> + Send;
}

impl FrameSource for EventSocket {
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<Frame, isy_api::Error>>> + Send {
        EventSocket::next_frame(self)
    }

    fn ping(&mut self) -> impl Future<Output = Result<(), isy_api::Error>> + Send {
        EventSocket::ping(self)
    }

    fn terminate(self) -> impl Future<Output = ()> + Send {
        EventSocket::terminate(self)
    }
}

/// Production connector: `/rest/subscribe` with Basic credentials.
pub struct SocketConnector {
    pub url: Url,
    pub authorization: String,
    pub transport: TransportConfig,
}

impl Connector for SocketConnector {
    type Stream = EventSocket;

    fn connect(&self) -> impl Future<Output = Result<EventSocket, isy_api::Error>> + Send {
        EventSocket::connect(&self.url, &self.authorization, &self.transport)
    }
}

// ── Supervisor ───────────────────────────────────────────────────────

pub struct Supervisor<C> {
    connector: C,
    liveness: LivenessConfig,
    state: watch::Sender<ConnectionState>,
    events: mpsc::Sender<EventRecord>,
    cancel: CancellationToken,
}

impl<C: Connector> Supervisor<C> {
    pub fn new(
        connector: C,
        liveness: LivenessConfig,
        state: watch::Sender<ConnectionState>,
        events: mpsc::Sender<EventRecord>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            connector,
            liveness,
            state,
            events,
            cancel,
        }
    }

    /// Run until cancelled.
    pub async fn run(self) {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                result = self.connector.connect() => result,
            };

            let stream = match connected {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(attempt, error = %e, "event stream connect failed");
                    self.set_state(ConnectionState::Disconnected);
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(self.liveness.check_interval) => continue,
                    }
                }
            };

            info!(attempt, "event stream connected");
            self.set_state(ConnectionState::AwaitingActivity);

            let stop = self.supervise(stream).await;
            self.set_state(ConnectionState::Disconnected);
            if stop {
                break;
            }
            info!("reconnecting event stream");
        }
        self.set_state(ConnectionState::Disconnected);
        debug!("supervisor stopped");
    }

    /// Drive one connection. Returns `true` when cancelled, `false` when a
    /// liveness breach calls for a reconnect.
    async fn supervise(&self, mut stream: C::Stream) -> bool {
        let start = Instant::now();
        let mut liveness = Liveness::new(self.liveness.stall_threshold, start);

        let mut check = interval_at(
            start + self.liveness.check_interval,
            self.liveness.check_interval,
        );
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ping = interval_at(
            start + self.liveness.ping_interval,
            self.liveness.ping_interval,
        );
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // After a close the socket is left alone; the next breach replaces it.
        let mut open = true;

        let cancelled = loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break true,
                _ = check.tick() => {
                    if liveness.check(Instant::now()) {
                        warn!(
                            threshold_secs = self.liveness.stall_threshold.as_secs(),
                            "event stream stalled"
                        );
                        break false;
                    }
                }
                _ = ping.tick(), if open => {
                    match timeout(self.liveness.ping_interval, stream.ping()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => debug!(error = %e, "keep-alive ping failed"),
                        Err(_) => debug!("keep-alive ping timed out"),
                    }
                }
                frame = stream.next_frame(), if open => match frame {
                    Some(Ok(Frame::Text(text))) => {
                        self.record(&mut liveness);
                        if !self.forward(&text).await {
                            break true;
                        }
                    }
                    Some(Ok(Frame::Ping | Frame::Pong)) => self.record(&mut liveness),
                    Some(Ok(Frame::Closed { code, reason })) => {
                        info!(code, reason = %reason, "event stream closed by controller");
                        open = false;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "event stream read failed");
                        open = false;
                    }
                    None => {
                        info!("event stream ended");
                        open = false;
                    }
                },
            }
        };

        if timeout(TERMINATE_TIMEOUT, stream.terminate()).await.is_err() {
            debug!("event stream close timed out, dropping socket");
        }
        cancelled
    }

    fn record(&self, liveness: &mut Liveness) {
        liveness.record_activity(Instant::now());
        self.set_state(ConnectionState::Healthy);
    }

    /// Parse and hand off a text frame. Returns `false` once the consumer
    /// is gone.
    async fn forward(&self, text: &str) -> bool {
        trace!(frame = text, "event frame");
        match parse_event(text) {
            Ok(Some(record)) => self.events.send(record).await.is_ok(),
            Ok(None) => true,
            Err(e) => {
                debug!(error = %e, "dropping unparseable event frame");
                true
            }
        }
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

// ── Tests ────────────────────────────────────────────────────────────
