//! The UDP listener itself

use crate::error::FeedError;
use crate::handler::TickHandler;
use crate::tick::MarketTick;
use engine_common::FeedConfig;
use engine_common::constants::net::FEED_RECV_BUF;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Feed counters, monotonic over the feed's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    /// Datagrams that parsed into a tick and reached the handler
    pub received: u64,
    /// Datagrams dropped as empty or malformed
    pub dropped: u64,
}

/// UDP market-data listener.
///
/// `start` binds the socket and spawns the receive task; `stop` signals
/// it and waits for it to finish. The receive loop is re-armed after
/// every datagram and after every receive error; only the shutdown
/// signal ends it.
pub struct MarketDataFeed {
    config: FeedConfig,
    handler: Arc<dyn TickHandler>,
    received: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl MarketDataFeed {
    /// Create a feed that delivers ticks to `handler`
    #[must_use]
    pub fn new(config: FeedConfig, handler: Arc<dyn TickHandler>) -> Self {
        Self {
            config,
            handler,
            received: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
            shutdown: Mutex::new(None),
            task: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Bind the socket and start receiving.
    ///
    /// Bind failures surface here, not inside the task. Fails with
    /// [`FeedError::AlreadyRunning`] when called twice without a stop.
    pub async fn start(&self) -> Result<(), FeedError> {
        let mut shutdown_slot = self.shutdown.lock().await;
        if shutdown_slot.is_some() {
            return Err(FeedError::AlreadyRunning);
        }

        let bind = format!("{}:{}", self.config.bind_addr, self.config.port);
        let socket = UdpSocket::bind(&bind).await?;
        let local = socket.local_addr()?;
        info!(addr = %local, "market-data feed listening");
        *self.local_addr.lock().await = Some(local);

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(recv_loop(
            socket,
            Arc::clone(&self.handler),
            Arc::clone(&self.received),
            Arc::clone(&self.dropped),
            rx,
        ));

        *shutdown_slot = Some(tx);
        *self.task.lock().await = Some(task);
        Ok(())
    }

    /// Bind and block on the receive loop until [`MarketDataFeed::stop`]
    /// is called from another task.
    ///
    /// Equivalent to [`MarketDataFeed::start`] followed by waiting for
    /// the receive task to finish; bind failures surface before blocking.
    pub async fn run(&self) -> Result<(), FeedError> {
        self.start().await?;
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if task.await.is_err() {
                error!("feed task panicked");
            }
        }
        Ok(())
    }

    /// Signal shutdown and wait for the receive task to finish.
    ///
    /// Idempotent; returns immediately when the feed is not running.
    pub async fn stop(&self) {
        let Some(tx) = self.shutdown.lock().await.take() else {
            return;
        };
        // Receiver dropped means the task already exited; nothing to signal.
        let _ = tx.send(true);

        if let Some(task) = self.task.lock().await.take() {
            if task.await.is_err() {
                error!("feed task panicked");
            }
        }
        *self.local_addr.lock().await = None;
        info!("market-data feed stopped");
    }

    /// Address the socket is bound to, while running. With port 0 in the
    /// config this reports the kernel-assigned port.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> FeedStats {
        FeedStats {
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

async fn recv_loop(
    socket: UdpSocket,
    handler: Arc<dyn TickHandler>,
    received: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = [0u8; FEED_RECV_BUF];
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("feed shutdown signal received");
                break;
            }
            result = socket.recv_from(&mut buf) => match result {
                Ok((0, peer)) => {
                    debug!(%peer, "dropping empty datagram");
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
                Ok((len, peer)) => match MarketTick::parse(&buf[..len]) {
                    Some(tick) => {
                        received.fetch_add(1, Ordering::Relaxed);
                        handler.on_tick(&tick);
                    }
                    None => {
                        debug!(%peer, len, "dropping malformed datagram");
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                },
                // Transient receive errors never stop the feed
                Err(e) => warn!(error = %e, "recv_from failed"),
            }
        }
    }
}
