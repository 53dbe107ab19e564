use std::time::Duration;

use async_channel::Receiver;
use depict::{Dispatch, Graph, GraphConfig, Lifecycle, Message};
use serde_json::Value;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Application code living next to the graph on the worker thread.
pub trait WorkerApp {
    /// Runs on every INIT, once the layers exist and before the first frame.
    fn setup(&mut self, _graph: &mut Graph) {}

    /// Receives the custom messages the graph does not handle.
    fn on_message(&mut self, _graph: &mut Graph, message: Value) {
        debug!(%message, "custom message ignored");
    }
}

/// Worker main loop. Returns after DESTROY or once every sender is gone.
pub(crate) async fn run<A: WorkerApp>(
    rx: Receiver<Message>,
    config: GraphConfig,
    frame_interval: Duration,
    mut app: A,
) {
    let mut graph = Graph::new(config);
    let started = Instant::now();
    let mut frames = time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(frame_ms = frame_interval.as_millis() as u64, "depict worker running");

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Ok(message) = received else {
                    debug!("channel closed");
                    break;
                };
                if !apply(&mut graph, &mut app, message) {
                    break;
                }
            }
            _ = frames.tick() => {
                let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                if graph.tick(elapsed) {
                    trace!(elapsed, "frame");
                }
            }
        }
    }

    if graph.lifecycle() != Lifecycle::Destroyed {
        graph.destroy();
    }
    info!("depict worker stopped");
}

/// Applies one message. Returns false when the worker should stop.
fn apply<A: WorkerApp>(graph: &mut Graph, app: &mut A, message: Message) -> bool {
    trace!(?message, "message");
    let is_destroy = matches!(message, Message::Destroy);

    // The app fills the layers before the first frame.
    if let Message::Init(init) = message {
        let size = init.size;
        graph.initialize(init.layers, size.w, size.h, size.scale, init.background);
        app.setup(graph);
        graph.start();
        return true;
    }

    match graph.handle_message(message) {
        Dispatch::Handled => {}
        Dispatch::Unhandled(Message::Custom(value)) => app.on_message(graph, value),
        Dispatch::Unhandled(other) => debug!(?other, "message dropped"),
    }
    !is_destroy
}
