//! FIX session state machine
//!
//! Lifecycle: `Disconnected → Connecting → LoggedOn → Disconnected`,
//! driven by [`FixSession::start`] and [`FixSession::stop`]. There is no
//! auto-reconnect: a failed transport leaves the session `Disconnected`
//! and further `send_order` calls fail fast.

use crate::channel::{ExecReportCallback, ExecReportChannel};
use crate::codec;
use crate::error::{SessionError, SessionResult};
use crate::messages::{ExecReport, ExecType, FixOrder, OrdStatus};
use crate::transport::FixTransport;
use engine_common::{FixConfig, Qty, Ts};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Upper bound on how long the session loop holds the transport lock per
/// inbound poll. `send_order` and `stop` contend for the same lock, so
/// this also bounds the latency they can see.
const RECV_SLICE: Duration = Duration::from_millis(1);

/// Off-lock pause between empty polls; together with [`RECV_SLICE`] this
/// bounds shutdown latency.
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Session connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected; initial and terminal state
    Disconnected,
    /// Transport connect in progress
    Connecting,
    /// Logon sent, session active
    LoggedOn,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::LoggedOn => write!(f, "LoggedOn"),
        }
    }
}

/// A FIX session bound to one transport and one configuration.
///
/// Outbound sequence numbers are scoped to the session instance and start
/// at 1; two sessions in the same process never share a counter.
pub struct FixSession {
    config: FixConfig,
    state: Arc<RwLock<SessionState>>,
    running: Arc<AtomicBool>,
    /// Outbound MsgSeqNum (tag 34), assigned exactly once per message
    seq: Arc<AtomicU64>,
    /// Generator for simulated order/execution ids
    exec_seq: AtomicU64,
    transport: Arc<Mutex<Box<dyn FixTransport>>>,
    channel: Arc<ExecReportChannel>,
    session_thread: Option<JoinHandle<()>>,
}

impl FixSession {
    /// Create a session over the given transport. No I/O happens until
    /// `start` is called.
    #[must_use]
    pub fn new(config: FixConfig, transport: Box<dyn FixTransport>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(SessionState::Disconnected)),
            running: Arc::new(AtomicBool::new(false)),
            seq: Arc::new(AtomicU64::new(1)),
            exec_seq: AtomicU64::new(1),
            transport: Arc::new(Mutex::new(transport)),
            channel: Arc::new(ExecReportChannel::new()),
            session_thread: None,
        }
    }

    /// Connect, send Logon and launch the background session loop.
    ///
    /// Idempotent: returns `Ok(true)` without side effects when already
    /// running.
    pub fn start(&mut self) -> SessionResult<bool> {
        if self.running.load(Ordering::Acquire) {
            debug!("start() on a running session is a no-op");
            return Ok(true);
        }

        *self.state.write() = SessionState::Connecting;
        let connect_result = {
            let mut transport = self.transport.lock();
            transport.connect(&self.config).and_then(|()| {
                let seq = self.next_seq();
                transport.send(&codec::encode_logon(&self.config, seq))
            })
        };
        if let Err(e) = connect_result {
            *self.state.write() = SessionState::Disconnected;
            error!(error = %e, "session start failed");
            return Err(e);
        }

        *self.state.write() = SessionState::LoggedOn;
        self.running.store(true, Ordering::Release);
        if let Err(e) = self.spawn_session_loop() {
            self.running.store(false, Ordering::Release);
            *self.state.write() = SessionState::Disconnected;
            error!(error = %e, "failed to spawn session thread");
            return Err(e);
        }

        info!(
            sender = %self.config.sender_comp_id,
            target = %self.config.target_comp_id,
            host = %self.config.host,
            port = self.config.port,
            "FIX session logged on"
        );
        Ok(true)
    }

    /// Send Logout, transition to `Disconnected` and join the background
    /// thread. Idempotent when not running; never leaves a detached
    /// thread behind.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            debug!("stop() on a stopped session is a no-op");
            return;
        }

        let logged_on = *self.state.read() == SessionState::LoggedOn;
        {
            let mut transport = self.transport.lock();
            if logged_on {
                let seq = self.next_seq();
                if let Err(e) = transport.send(&codec::encode_logout(&self.config, seq)) {
                    warn!(error = %e, "logout send failed during stop");
                }
            }
        }
        *self.state.write() = SessionState::Disconnected;

        if let Some(handle) = self.session_thread.take() {
            if handle.join().is_err() {
                error!("session thread panicked");
            }
        }
        self.transport.lock().close();
        info!("FIX session stopped");
    }

    /// Whether the session is logged on. O(1), callable from any thread.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.state.read() == SessionState::LoggedOn
    }

    /// Validate and transmit a NewOrderSingle, returning the client order
    /// id that was used.
    ///
    /// Fails with [`SessionError::NotConnected`] when the session is not
    /// logged on; no state changes in that case. With a simulating
    /// transport an immediate full-fill execution report is synthesized
    /// so the downstream pipeline is exercised deterministically.
    pub fn send_order(&self, order: &FixOrder) -> SessionResult<String> {
        if !self.is_connected() {
            warn!(cl_ord_id = %order.cl_ord_id, "send_order while disconnected");
            return Err(SessionError::NotConnected);
        }
        order.validate()?;

        let seq = self.next_seq();
        let message = codec::encode_new_order_single(&self.config, seq, order);

        let simulate = {
            let mut transport = self.transport.lock();
            match transport.send(&message) {
                Ok(()) => transport.simulates_fills(),
                Err(e) => {
                    *self.state.write() = SessionState::Disconnected;
                    error!(error = %e, "transport failed while sending order");
                    return Err(e);
                }
            }
        };

        debug!(cl_ord_id = %order.cl_ord_id, seq, "NewOrderSingle sent");

        if simulate {
            let report = self.simulated_fill(order);
            info!(
                order_id = %report.order_id,
                exec_id = %report.exec_id,
                "simulated fill"
            );
            self.channel.push(report);
        }

        Ok(order.cl_ord_id.clone())
    }

    /// Register the execution-report callback. Single-slot by design:
    /// a new registration discards the previous one. The callback runs
    /// on the enqueueing thread and must not block or re-enter the
    /// session.
    pub fn on_exec_report(&self, callback: ExecReportCallback) {
        self.channel.set_callback(callback);
    }

    /// Drain all pending execution reports, oldest first. Never blocks;
    /// empty when nothing is pending.
    #[must_use]
    pub fn poll_exec_reports(&self) -> Vec<ExecReport> {
        self.channel.drain()
    }

    /// Human-readable session summary for diagnostics. Side-effect free.
    #[must_use]
    pub fn get_status(&self) -> String {
        let state = *self.state.read();
        format!(
            "FixSession sender={} target={} state={} connected={} running={}",
            self.config.sender_comp_id,
            self.config.target_comp_id,
            state,
            if state == SessionState::LoggedOn { "yes" } else { "no" },
            if self.running.load(Ordering::Acquire) { "yes" } else { "no" },
        )
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn simulated_fill(&self, order: &FixOrder) -> ExecReport {
        let n = self.exec_seq.fetch_add(1, Ordering::SeqCst);
        ExecReport {
            order_id: format!("ORD-{n}"),
            exec_id: format!("EXE-{n}"),
            exec_type: ExecType::Fill,
            ord_status: OrdStatus::Filled,
            symbol: order.symbol.clone(),
            side: order.side,
            leaves_qty: Qty::ZERO,
            cum_qty: order.quantity,
            avg_px: order.price,
            last_px: order.price,
            last_qty: order.quantity,
            text: "Simulated fill".to_string(),
            transact_time: Ts::now(),
        }
    }

    /// Background loop: heartbeats on the configured interval, inbound
    /// message dispatch, and containment of transport failures.
    fn spawn_session_loop(&mut self) -> SessionResult<()> {
        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let seq = Arc::clone(&self.seq);
        let transport = Arc::clone(&self.transport);
        let channel = Arc::clone(&self.channel);

        let handle = std::thread::Builder::new()
            .name("fix-session".to_string())
            .spawn(move || {
                debug!("session loop started");
                let mut last_heartbeat = Instant::now();

                while running.load(Ordering::Acquire) {
                    let inbound = transport.lock().recv_timeout(RECV_SLICE);
                    let idle = match inbound {
                        Ok(Some(raw)) => {
                            dispatch_inbound(&raw, &channel);
                            false
                        }
                        Ok(None) => true,
                        Err(e) => {
                            error!(error = %e, "transport failure in session loop");
                            *state.write() = SessionState::Disconnected;
                            break;
                        }
                    };

                    if *state.read() == SessionState::LoggedOn
                        && last_heartbeat.elapsed() >= config.heartbeat_interval
                    {
                        let mut guard = transport.lock();
                        // stop() flips `running` before its Logout; the
                        // re-check under the lock keeps any heartbeat
                        // from following the Logout onto the wire
                        if running.load(Ordering::Acquire) {
                            let n = seq.fetch_add(1, Ordering::SeqCst);
                            if let Err(e) = guard.send(&codec::encode_heartbeat(&config, n)) {
                                error!(error = %e, "heartbeat send failed");
                                *state.write() = SessionState::Disconnected;
                                break;
                            }
                            last_heartbeat = Instant::now();
                        }
                    }

                    if idle {
                        // Backoff happens off the lock so outbound
                        // traffic never waits on it
                        std::thread::sleep(IDLE_WAIT);
                    }
                }
                debug!("session loop ended");
            })?;

        self.session_thread = Some(handle);
        Ok(())
    }
}

/// Route one inbound message. Execution reports are enqueued; anything
/// else is logged and ignored (tolerant reader — a malformed message
/// never terminates the session).
fn dispatch_inbound(raw: &[u8], channel: &ExecReportChannel) {
    if !codec::verify_checksum(raw) {
        warn!(len = raw.len(), "dropping message with bad checksum");
        return;
    }
    match codec::decode_exec_report(raw) {
        Some(report) => {
            info!(
                order_id = %report.order_id,
                status = %report.ord_status,
                "execution report received"
            );
            channel.push(report);
        }
        None => {
            let fields = codec::parse_fields(raw);
            debug!(
                msg_type = codec::field(&fields, 35).unwrap_or("?"),
                "ignoring non-exec-report message"
            );
        }
    }
}

impl Drop for FixSession {
    fn drop(&mut self) {
        if self.running.load(Ordering::Acquire) {
            self.stop();
        }
    }
}

impl fmt::Debug for FixSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixSession")
            .field("sender", &self.config.sender_comp_id)
            .field("target", &self.config.target_comp_id)
            .field("state", &*self.state.read())
            .field("running", &self.running.load(Ordering::Acquire))
            .finish()
    }
}
