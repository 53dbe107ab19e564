//! # Graph
//!
//! The [`Graph`] coordinates N layers that share one offset. It runs the
//! frame loop, routes pointer events from the top layer down, and implements
//! the message protocol.
//!
//! ```
//! use depict::{Graph, GraphConfig, Mesh, RecordingSurface, ShadowElement, SurfaceBox};
//!
//! let mut graph = Graph::new(GraphConfig::default());
//! let surface = RecordingSurface::new(0, 0);
//! let log = surface.log();
//! graph.initialize(vec![Box::new(surface) as SurfaceBox], 200.0, 100.0, 1.0, None);
//!
//! let node = ShadowElement::new(10.0, 10.0)
//!     .with_shape(Mesh::new("M 0 0 h 20"))
//!     .into_ref();
//! graph.update_queue(0, vec![node]);
//! graph.start();
//! assert_eq!(log.count(|c| matches!(c, depict::DrawCommand::StrokePath(_))), 1);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::config::GraphConfig;
use crate::context::{Surface, SurfaceBox};
use crate::drawable::{Text, TextRect};
use crate::element::ElementRef;
use crate::error::Result;
use crate::events::{CanvasEvent, RenderRequests};
use crate::layer::{Layer, LayerOptions, LiftTable};
use crate::protocol::{Envelope, Message};
use crate::renderer::{MinimalistOptions, MinimalistRenderer, RendererRef};
use crate::scheduler::{FrameHandle, FrameScheduler, FrameTicker, ManualScheduler};

/// Called once when the graph starts.
pub type ReadyHook = Box<dyn FnMut()>;

/// Runs before dispatch; returning true swallows the event.
pub type EventPreHandler = Box<dyn FnMut(CanvasEvent, f32, f32) -> bool>;

/// Runs after dispatch with whether any layer handled the event.
pub type EventPostHandler = Box<dyn FnMut(bool, CanvasEvent, f32, f32)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Running,
    Destroyed,
}

/// Offset shared by every layer of a graph.
///
/// Clones share the same value, so handlers can pan the graph. Frames read it
/// once and draw every layer with that snapshot.
#[derive(Clone, Debug, Default)]
pub struct GraphOffset(Rc<Cell<Vec2>>);

impl GraphOffset {
    pub fn get(&self) -> Vec2 {
        self.0.get()
    }

    pub fn set(&self, offset: Vec2) {
        self.0.set(offset);
    }

    pub fn pan(&self, delta: Vec2) {
        self.0.set(self.0.get() + delta);
    }
}

/// Where to measure a text.
#[derive(Clone, Default)]
pub struct BoundingBoxProps {
    pub layer: usize,
    /// Needed only when the text is not drawn with the layer's default renderer.
    pub renderer: Option<RendererRef>,
}

/// Outcome of [`Graph::handle_message`].
#[derive(Debug)]
pub enum Dispatch {
    Handled,
    /// The message is not part of the protocol; it is handed back.
    Unhandled(Message),
}

pub struct Graph {
    config: GraphConfig,
    layers: Vec<Layer>,
    background: Option<SurfaceBox>,
    offset: GraphOffset,
    lifts: LiftTable,

    scheduler: Box<dyn FrameScheduler>,
    ticker: Option<FrameTicker>,
    looping: Option<FrameHandle>,
    lifecycle: Lifecycle,

    ready: Option<ReadyHook>,
    pre_handle: Option<EventPreHandler>,
    post_handle: Option<EventPostHandler>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Graph {
    /// Creates a graph whose frames are driven through [`Graph::tick`].
    pub fn new(config: GraphConfig) -> Self {
        let (scheduler, ticker) = ManualScheduler::new();
        let mut graph = Self::with_scheduler(config, Box::new(scheduler));
        graph.ticker = Some(ticker);
        graph
    }

    /// Creates a graph driven by a custom scheduler.
    pub fn with_scheduler(config: GraphConfig, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            config,
            layers: Vec::new(),
            background: None,
            offset: GraphOffset::default(),
            lifts: LiftTable::default(),
            scheduler,
            ticker: None,
            looping: None,
            lifecycle: Lifecycle::Uninitialized,
            ready: None,
            pre_handle: None,
            post_handle: None,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, layer: usize) -> Option<&Layer> {
        self.layers.get(layer)
    }

    pub fn layer_mut(&mut self, layer: usize) -> Option<&mut Layer> {
        self.layers.get_mut(layer)
    }

    /// Handle on the shared offset.
    pub fn offset(&self) -> GraphOffset {
        self.offset.clone()
    }

    /// The optional offscreen surface shared by the application.
    pub fn background(&mut self) -> Option<&mut dyn Surface> {
        match self.background.as_mut() {
            Some(surface) => Some(&mut **surface),
            None => None,
        }
    }

    pub fn on_ready(&mut self, hook: impl FnMut() + 'static) {
        self.ready = Some(Box::new(hook));
    }

    pub fn set_pre_handle(&mut self, handler: impl FnMut(CanvasEvent, f32, f32) -> bool + 'static) {
        self.pre_handle = Some(Box::new(handler));
    }

    pub fn set_post_handle(&mut self, handler: impl FnMut(bool, CanvasEvent, f32, f32) + 'static) {
        self.post_handle = Some(Box::new(handler));
    }

    /// Builds one layer per surface, all drawn by a shared minimalist renderer.
    ///
    /// Initializing again replaces the previous layers.
    pub fn initialize(
        &mut self,
        surfaces: Vec<SurfaceBox>,
        width: f32,
        height: f32,
        scale: f32,
        background: Option<SurfaceBox>,
    ) {
        let renderer: RendererRef = Rc::new(MinimalistRenderer::new(MinimalistOptions {
            line_height: self.config.line_height,
            ..Default::default()
        }));

        self.lifts.clear();
        self.layers = surfaces
            .into_iter()
            .enumerate()
            .map(|(index, surface)| {
                Layer::new(index, surface, renderer.clone(), &self.config, width, height, scale)
            })
            .collect();
        self.background = background;
        if self.lifecycle != Lifecycle::Running {
            self.lifecycle = Lifecycle::Initialized;
        }
        info!(
            layers = self.layers.len(),
            width,
            height,
            scale,
            background = self.background.is_some(),
            "graph initialized"
        );
    }

    /// Fires the ready hook and enters the frame loop.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Initialized {
            debug!(lifecycle = ?self.lifecycle, "start ignored");
            return;
        }
        self.lifecycle = Lifecycle::Running;
        if let Some(ready) = self.ready.as_mut() {
            ready();
        }
        info!(layers = self.layers.len(), "graph started");
        self.loop_frame(0.0);
    }

    /// One frame: renders every layer that asks for it, then schedules the
    /// next frame. Does nothing unless the graph is running.
    pub fn loop_frame(&mut self, timestamp: f64) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.render_layers(timestamp);
        self.looping = Some(self.scheduler.request_frame());
    }

    /// Runs the pending frame of the built-in scheduler, if any.
    pub fn tick(&mut self, timestamp: f64) -> bool {
        let Some(ticker) = self.ticker.as_ref() else {
            return false;
        };
        if ticker.take().is_none() {
            return false;
        }
        self.loop_frame(timestamp);
        true
    }

    /// Whether the built-in scheduler has a frame waiting.
    pub fn frame_pending(&self) -> bool {
        self.ticker.as_ref().is_some_and(FrameTicker::is_pending)
    }

    fn render_layers(&mut self, timestamp: f64) {
        let offset = self.offset.get();
        for i in 0..self.layers.len() {
            let layer = &mut self.layers[i];
            if layer.should_render() {
                layer.update_elements(timestamp);
                layer.render_queue(offset, &mut self.lifts);
            }
            if self.lifts.take_changed() {
                trace!(layer = i, "lift anchors moved, rendering upper layers");
                for upper in &mut self.layers[i + 1..] {
                    upper.render();
                }
            }
        }
    }

    /// Drops all layers and cancels the loop.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.looping.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.layers.clear();
        self.background = None;
        self.lifts.clear();
        self.lifecycle = Lifecycle::Destroyed;
        info!("graph destroyed");
    }

    /// Resizes every layer and renders them all on the next frame.
    pub fn resize(&mut self, width: f32, height: f32, scale: f32) {
        for layer in &mut self.layers {
            layer.resize(width, height, scale);
        }
        debug!(width, height, scale, "graph resized");
        self.render_all();
    }

    /// Dispatches a pointer event from the top layer down, stopping at the
    /// first layer that handles it. Returns whether one did.
    pub fn trigger_event(&mut self, kind: CanvasEvent, x: f32, y: f32) -> bool {
        let swallowed = self.pre_handle.as_mut().is_some_and(|pre| pre(kind, x, y));
        if swallowed {
            trace!(?kind, x, y, "event swallowed by pre handler");
            return false;
        }

        let point = Vec2::new(x, y) - self.offset.get();
        let mut triggered = false;
        for i in (0..self.layers.len()).rev() {
            let mut requests = RenderRequests::default();
            triggered = self.layers[i].trigger_event(kind, &mut requests, point);
            self.apply_requests(i, requests);
            if triggered {
                trace!(?kind, layer = i, "event handled");
                break;
            }
        }

        if let Some(post) = self.post_handle.as_mut() {
            post(triggered, kind, x, y);
        }
        triggered
    }

    fn apply_requests(&mut self, source: usize, requests: RenderRequests) {
        if requests.current {
            self.render(source);
        }
        for layer in requests.layers {
            self.render(layer);
        }
    }

    fn checked(&self, layer: usize) -> bool {
        let ok = layer < self.layers.len();
        if !ok {
            debug!(layer, layers = self.layers.len(), "layer index out of range, ignored");
        }
        ok
    }

    pub fn update_queue(&mut self, layer: usize, elements: Vec<ElementRef>) {
        if self.checked(layer) {
            self.layers[layer].update_queue(elements);
        }
    }

    pub fn reset_queue(&mut self, layer: usize, elements: Vec<ElementRef>) {
        if self.checked(layer) {
            self.layers[layer].reset_queue(elements);
            self.lifts.forget_layer(layer);
        }
    }

    /// Resets every layer; layers without an entry become empty. Ignored when
    /// more entries than layers are given.
    pub fn reset_graph(&mut self, elements: Vec<Vec<ElementRef>>) {
        if elements.len() > self.layers.len() {
            debug!(given = elements.len(), layers = self.layers.len(), "reset_graph ignored");
            return;
        }
        let mut elements = elements.into_iter();
        for i in 0..self.layers.len() {
            self.layers[i].reset_queue(elements.next().unwrap_or_default());
        }
        self.lifts.clear();
    }

    pub fn update_layer_options(&mut self, layer: usize, options: LayerOptions) {
        if self.checked(layer) {
            self.layers[layer].update_options(options);
        }
    }

    /// Applies options per layer, in order. Ignored when more entries than
    /// layers are given.
    pub fn update_graph_options(&mut self, options: Vec<LayerOptions>) {
        if options.len() > self.layers.len() {
            debug!(given = options.len(), layers = self.layers.len(), "update_graph_options ignored");
            return;
        }
        for (layer, opts) in self.layers.iter_mut().zip(options) {
            layer.update_options(opts);
        }
    }

    /// Asks for one layer to render on the next frame.
    pub fn render(&mut self, layer: usize) {
        if self.checked(layer) {
            self.layers[layer].render();
        }
    }

    pub fn render_all(&mut self) {
        for layer in &mut self.layers {
            layer.render();
        }
    }

    pub fn get_renderer(&self, layer: usize) -> Option<RendererRef> {
        self.layers.get(layer).map(Layer::default_renderer)
    }

    pub fn set_layer_renderer(&mut self, layer: usize, renderer: RendererRef) {
        if self.checked(layer) {
            self.layers[layer].set_default_renderer(renderer);
        }
    }

    pub fn set_graph_renderer(&mut self, renderer: RendererRef) {
        for layer in &mut self.layers {
            layer.set_default_renderer(renderer.clone());
        }
    }

    /// Measures a text. An unknown layer measures as zero.
    pub fn bounding_box(&mut self, text: &Text, props: BoundingBoxProps) -> TextRect {
        match self.layers.get_mut(props.layer) {
            Some(layer) => layer.bounding_box(text, props.renderer.as_ref()),
            None => TextRect::default(),
        }
    }

    /// Applies a protocol message. Messages the graph does not know are
    /// handed back.
    pub fn handle_message(&mut self, message: Message) -> Dispatch {
        match message {
            Message::Init(init) => {
                self.initialize(
                    init.layers,
                    init.size.w,
                    init.size.h,
                    init.size.scale,
                    init.background,
                );
                self.start();
            }
            Message::Destroy => self.destroy(),
            Message::Event(ev) => {
                self.trigger_event(ev.typ, ev.x, ev.y);
            }
            Message::Resize(size) => self.resize(size.w, size.h, size.scale),
            custom @ Message::Custom(_) => return Dispatch::Unhandled(custom),
        }
        Dispatch::Handled
    }

    /// Decodes and applies a wire message.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Result<Dispatch> {
        let message = envelope.into_message()?;
        Ok(self.handle_message(message))
    }
}
