//! # Depict Worker
//!
//! Runs a [`depict::Graph`] on its own thread. The host keeps a [`Depict`]
//! handle: it moves surfaces to the worker once, then forwards pointer,
//! resize and custom messages over a channel. The worker owns the graph and
//! drives its frame loop; application code runs there through [`WorkerApp`].

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use depict::{CanvasEvent, InitPayload, Message, PointerEvent, Size, SurfaceBox};
use serde_json::Value;
use tracing::{info, trace, warn};

mod config;
mod worker;

pub use config::WorkerConfig;
pub use worker::WorkerApp;

/// Host-side handle on a worker-resident graph.
pub struct Depict {
    tx: Sender<Message>,
    worker: Option<JoinHandle<Result<()>>>,
    move_throttle: Duration,
    last_move: Option<Instant>,
    /// Latest move dropped by the throttle, not yet sent.
    pending_move: Option<(f32, f32)>,
}

impl Depict {
    /// Starts the worker thread. `app` is called on the worker to build the
    /// application state living next to the graph.
    pub fn spawn<A, F>(config: WorkerConfig, app: F) -> Result<Self>
    where
        A: WorkerApp + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        let (tx, rx) = async_channel::bounded(config.channel_capacity.max(1));
        let frame_interval = Duration::from_millis(config.frame_interval_ms.max(1));
        let graph_config = config.graph.clone();

        let worker = thread::Builder::new()
            .name("depict-worker".to_string())
            .spawn(move || -> Result<()> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .context("failed to build the worker runtime")?;
                runtime.block_on(worker::run(rx, graph_config, frame_interval, app()));
                Ok(())
            })
            .context("failed to spawn the worker thread")?;

        info!(
            frame_ms = config.frame_interval_ms,
            throttle_ms = config.move_throttle_ms,
            "depict worker spawned"
        );
        Ok(Self {
            tx,
            worker: Some(worker),
            move_throttle: Duration::from_millis(config.move_throttle_ms),
            last_move: None,
            pending_move: None,
        })
    }

    fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send_blocking(message)
            .map_err(|_| anyhow!("depict worker has stopped"))
    }

    /// Moves the surfaces to the worker, which builds one layer per surface
    /// and starts the loop.
    pub fn init(&self, layers: Vec<SurfaceBox>, size: Size, background: Option<SurfaceBox>) -> Result<()> {
        self.send(Message::Init(InitPayload {
            layers,
            size,
            background,
        }))
    }

    /// Forwards a pointer event. Moves closer together than the throttle
    /// interval are held back; returns whether the event was sent now.
    ///
    /// Only the latest held move is kept. It goes out before the next event
    /// that is sent, or on [`Depict::flush`], so the worker always ends up
    /// with the pointer's last position.
    pub fn pointer(&mut self, typ: CanvasEvent, x: f32, y: f32) -> Result<bool> {
        if typ == CanvasEvent::MouseMove {
            let now = Instant::now();
            let throttled = self
                .last_move
                .is_some_and(|last| now.duration_since(last) < self.move_throttle);
            if throttled {
                trace!(x, y, "pointer move throttled");
                self.pending_move = Some((x, y));
                return Ok(false);
            }
            self.pending_move = None;
            self.last_move = Some(now);
        } else {
            self.flush()?;
        }
        self.send(Message::Event(PointerEvent { typ, x, y }))?;
        Ok(true)
    }

    /// Sends the move held back by the throttle, if any. Hosts call this when
    /// the pointer goes idle. Returns whether a move was sent.
    pub fn flush(&mut self) -> Result<bool> {
        let Some((x, y)) = self.pending_move.take() else {
            return Ok(false);
        };
        self.last_move = Some(Instant::now());
        self.send(Message::Event(PointerEvent {
            typ: CanvasEvent::MouseMove,
            x,
            y,
        }))?;
        Ok(true)
    }

    pub fn resize(&self, size: Size) -> Result<()> {
        self.send(Message::Resize(size))
    }

    /// Sends an application message, delivered to [`WorkerApp::on_message`].
    pub fn post(&self, message: Value) -> Result<()> {
        self.send(Message::Custom(message))
    }

    /// Tears the graph down and waits for the worker to exit.
    pub fn destroy(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        // Fails only if the worker already exited.
        let _ = self.tx.send_blocking(Message::Destroy);
        self.tx.close();
        match worker.join() {
            Ok(result) => result,
            Err(_) => Err(anyhow!("depict worker panicked")),
        }
    }
}

impl Drop for Depict {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "depict worker did not shut down cleanly");
        }
    }
}
