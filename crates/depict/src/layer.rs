//! # Layers
//!
//! A [`Layer`] owns one surface and everything needed to redraw it: the
//! queue of top-level elements, the run-time registry, the membership double
//! buffer, five event indexes and the hover set.
//!
//! Render passes are incremental with respect to events: an element that was
//! already part of the previous pass keeps its index entries, only newcomers
//! get registered. Elements missing from a pass are flagged destroyed and
//! drop out of the indexes lazily.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::config::{GraphConfig, LayerStyle};
use crate::context::{Context2d, SurfaceBox, initialize_context};
use crate::drawable::{DrawableOptions, MeshSpecificOptions, Text, TextRect, TextSpecificOptions};
use crate::element::{Capabilities, ElementId, ElementRef, MouseEventHandler, ShadowElement};
use crate::events::{CanvasEvent, EventContext, EventIndex, RenderRequests};
use crate::registry::{Membership, Registry, RuntimeKey, RuntimeState};
use crate::renderer::RendererRef;

/// Options that can be changed on a live layer. `None` leaves a field as is.
#[derive(Clone, Default)]
pub struct LayerOptions {
    pub renderer: Option<RendererRef>,
    pub mesh_options: Option<MeshSpecificOptions>,
    pub text_options: Option<TextSpecificOptions>,
    pub drawable_options: Option<DrawableOptions>,
    pub update: Option<bool>,
    pub dynamic: Option<bool>,
}

/// Counters exposed for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStats {
    /// Completed render passes.
    pub renders: u64,
    /// Elements whose event registrations were built.
    pub events_built: u64,
}

/// Where layer-up elements are anchored, shared by all layers of a graph.
#[derive(Debug, Default)]
pub struct LiftTable {
    anchors: HashMap<ElementId, Anchor>,
    changed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    layer: usize,
    origin: Vec2,
}

impl LiftTable {
    /// Layer `layer` met a layer-up element whose origin there is `origin`.
    ///
    /// Returns the anchor to draw at when a lower layer already owns the
    /// element. Otherwise `layer` becomes (or stays) its home and the element
    /// is not drawn here.
    pub fn resolve(&mut self, id: ElementId, layer: usize, origin: Vec2) -> Option<Vec2> {
        match self.anchors.get(&id) {
            Some(a) if a.layer < layer => Some(a.origin),
            Some(a) if a.layer == layer && a.origin == origin => None,
            _ => {
                self.anchors.insert(id, Anchor { layer, origin });
                self.changed = true;
                None
            }
        }
    }

    /// Home layer and origin of a lifted element.
    pub fn anchor(&self, id: ElementId) -> Option<(usize, Vec2)> {
        self.anchors.get(&id).map(|a| (a.layer, a.origin))
    }

    /// Drops the anchors `layer` owns for elements it no longer renders.
    pub fn forget(&mut self, layer: usize, gone: &HashSet<ElementId>) {
        let before = self.anchors.len();
        self.anchors
            .retain(|id, a| a.layer != layer || !gone.contains(id));
        self.changed |= self.anchors.len() != before;
    }

    /// Drops every anchor owned by `layer`.
    pub fn forget_layer(&mut self, layer: usize) {
        let before = self.anchors.len();
        self.anchors.retain(|_, a| a.layer != layer);
        self.changed |= self.anchors.len() != before;
    }

    /// Returns whether any anchor moved since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
        self.changed = false;
    }
}

#[derive(Debug, Default)]
struct Indexes {
    click: EventIndex,
    mouse_up: EventIndex,
    mouse_down: EventIndex,
    hover: EventIndex,
    moves: EventIndex,
}

impl Indexes {
    fn clear(&mut self) {
        self.click.clear();
        self.mouse_up.clear();
        self.mouse_down.clear();
        self.hover.clear();
        self.moves.clear();
    }

    fn resync(&mut self, registry: &Registry) {
        self.click.resync(registry);
        self.mouse_up.resync(registry);
        self.mouse_down.resync(registry);
        self.hover.resync(registry);
        self.moves.resync(registry);
    }

    fn build(&mut self, key: RuntimeKey, order: u32, caps: Capabilities) {
        if !caps.contains(Capabilities::CONTAIN) {
            return;
        }
        if caps.contains(Capabilities::CLICK) {
            self.click.add(order, key);
        }
        if caps.contains(Capabilities::MOUSE_UP) {
            self.mouse_up.add(order, key);
        }
        if caps.contains(Capabilities::MOUSE_DOWN) {
            self.mouse_down.add(order, key);
        }
        if caps.intersects(Capabilities::HOVER) {
            self.hover.add(order, key);
        }
        if caps.contains(Capabilities::MOUSE_MOVE) {
            self.moves.add(order, key);
        }
    }
}

pub struct Layer {
    index: usize,
    surface: SurfaceBox,
    width: f32,
    height: f32,
    scale: f32,

    queue: Vec<ElementRef>,
    registry: Registry,
    membership: Membership,

    update: bool,
    dirty: bool,
    dynamic: bool,

    renderer: RendererRef,
    style: LayerStyle,

    indexes: Indexes,
    active: Vec<ElementId>,
    stats: LayerStats,
}

impl Layer {
    pub fn new(
        index: usize,
        mut surface: SurfaceBox,
        renderer: RendererRef,
        config: &GraphConfig,
        width: f32,
        height: f32,
        scale: f32,
    ) -> Self {
        surface.set_size(device_px(width, scale), device_px(height, scale));
        let ctx = surface.context();
        ctx.scale(scale, scale);
        let style = config.layer_defaults.clone();
        initialize_context(ctx, &style.mesh, &style.text, &style.drawable);

        Self {
            index,
            surface,
            width,
            height,
            scale,
            queue: Vec::new(),
            registry: Registry::default(),
            membership: Membership::default(),
            update: config.update,
            dirty: true,
            dynamic: config.dynamic,
            renderer,
            style,
            indexes: Indexes::default(),
            active: Vec::new(),
            stats: LayerStats::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stats(&self) -> LayerStats {
        self.stats
    }

    /// CSS size and device pixel ratio.
    pub fn size(&self) -> (f32, f32, f32) {
        (self.width, self.height, self.scale)
    }

    /// Pixel size of the surface.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    pub fn queue(&self) -> &[ElementRef] {
        &self.queue
    }

    /// Run-time state recorded for `id` by the last render pass.
    pub fn runtime_state(&self, id: ElementId) -> Option<RuntimeState> {
        self.registry.state_of(id)
    }

    pub fn default_renderer(&self) -> RendererRef {
        self.renderer.clone()
    }

    pub fn set_default_renderer(&mut self, renderer: RendererRef) {
        self.renderer = renderer;
    }

    pub fn should_render(&self) -> bool {
        self.dynamic || self.dirty
    }

    /// Makes sure the layer renders on the next frame.
    pub fn render(&mut self) {
        if self.should_render() {
            return;
        }
        self.dirty = true;
    }

    /// Replaces the queue. Elements kept from the old queue keep their event
    /// registrations.
    pub fn update_queue(&mut self, elements: Vec<ElementRef>) {
        self.queue = elements;
        self.dirty = true;
    }

    /// Replaces the queue and forgets everything known about the old one.
    pub fn reset_queue(&mut self, elements: Vec<ElementRef>) {
        self.indexes.clear();
        self.active.clear();
        self.membership.clear();
        self.registry.clear();
        self.queue = elements;
        self.dirty = true;
        debug!(layer = self.index, elements = self.queue.len(), "reset layer queue");
    }

    pub fn update_options(&mut self, options: LayerOptions) {
        if let Some(renderer) = options.renderer {
            self.renderer = renderer;
        }
        let restyle = options.mesh_options.is_some()
            || options.text_options.is_some()
            || options.drawable_options.is_some();
        if let Some(mesh) = options.mesh_options {
            self.style.mesh = mesh;
        }
        if let Some(text) = options.text_options {
            self.style.text = text;
        }
        if let Some(drawable) = options.drawable_options {
            self.style.drawable = drawable;
        }
        if let Some(update) = options.update {
            self.update = update;
        }
        if let Some(dynamic) = options.dynamic {
            self.dynamic = dynamic;
        }
        if restyle {
            self.prime_context();
        }
    }

    fn prime_context(&mut self) {
        let style = &self.style;
        initialize_context(self.surface.context(), &style.mesh, &style.text, &style.drawable);
    }

    pub fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.width = width;
        self.height = height;
        self.scale = scale;
        self.surface.context().set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.surface
            .set_size(device_px(width, scale), device_px(height, scale));
        self.surface.context().scale(scale, scale);
        // Resizing a surface resets its context state.
        self.prime_context();
    }

    pub fn bounding_box(&mut self, text: &Text, renderer: Option<&RendererRef>) -> TextRect {
        let renderer = renderer.unwrap_or(&self.renderer);
        renderer.bounding_box(self.surface.context(), text)
    }

    /// Runs update hooks over the whole tree, if updates are enabled.
    pub fn update_elements(&self, timestamp: f64) {
        if self.update {
            update_tree(&self.queue, timestamp);
        }
    }

    /// Clears the surface and draws the queue at `offset`.
    pub fn render_queue(&mut self, offset: Vec2, lifts: &mut LiftTable) {
        let ctx = self.surface.context();
        ctx.clear_rect(0.0, 0.0, self.width, self.height);

        let mut pass = RenderPass {
            layer: self.index,
            ctx,
            renderer: &self.renderer,
            registry: &mut self.registry,
            membership: &mut self.membership,
            indexes: &mut self.indexes,
            stats: &mut self.stats,
            lifts: &mut *lifts,
            offset,
            counter: 0,
        };
        pass.walk(Vec2::ZERO, &self.queue);
        let drawn = pass.counter;

        let gone = self.membership.swap();
        lifts.forget(self.index, &gone);
        self.registry.retire(gone.iter().copied());
        self.indexes.resync(&self.registry);

        self.dirty = false;
        self.stats.renders += 1;
        trace!(layer = self.index, elements = drawn, destroyed = gone.len(), "rendered layer");
    }

    /// Dispatches one gesture. Returns whether an element handled it; moves
    /// never count as handled.
    pub fn trigger_event(&mut self, kind: CanvasEvent, requests: &mut RenderRequests, point: Vec2) -> bool {
        match kind {
            CanvasEvent::Click => {
                let hit = self.indexes.click.trigger(&self.registry, point);
                self.fire(hit, |el| el.on_click.clone(), requests, point)
            }
            CanvasEvent::MouseUp => {
                let hit = self.indexes.mouse_up.trigger(&self.registry, point);
                self.fire(hit, |el| el.on_mouseup.clone(), requests, point)
            }
            CanvasEvent::MouseDown => {
                let hit = self.indexes.mouse_down.trigger(&self.registry, point);
                self.fire(hit, |el| el.on_mousedown.clone(), requests, point)
            }
            CanvasEvent::MouseMove => {
                self.pointer_moved(requests, point);
                false
            }
        }
    }

    fn pointer_moved(&mut self, requests: &mut RenderRequests, point: Vec2) {
        for key in self.indexes.moves.live_keys(&self.registry) {
            self.fire(Some(key), |el| el.on_mousemove.clone(), requests, point);
        }

        let hits: Vec<(ElementId, RuntimeKey)> = self
            .indexes
            .hover
            .trigger_all(&self.registry, point)
            .into_iter()
            .filter_map(|key| self.registry.get(key).map(|r| (r.id, key)))
            .collect();
        let previous = std::mem::take(&mut self.active);

        for id in &previous {
            if hits.iter().any(|(hit, _)| hit == id) {
                continue;
            }
            let key = self
                .registry
                .key_of(*id)
                .filter(|&k| self.registry.live(k).is_some());
            if key.is_some() {
                self.fire(key, |el| el.on_mouseleave.clone(), requests, point);
            }
        }
        for &(id, key) in &hits {
            if !previous.contains(&id) {
                self.fire(Some(key), |el| el.on_mouseenter.clone(), requests, point);
            }
        }

        self.active = hits.into_iter().map(|(id, _)| id).collect();
    }

    fn fire(
        &self,
        key: Option<RuntimeKey>,
        handler_of: fn(&ShadowElement) -> Option<MouseEventHandler>,
        requests: &mut RenderRequests,
        point: Vec2,
    ) -> bool {
        let Some(record) = key.and_then(|k| self.registry.get(k)) else {
            return false;
        };
        let Some(handler) = record.element.try_borrow().ok().and_then(|el| handler_of(&el)) else {
            return false;
        };
        let mut cx = EventContext::new(record.state.offset, point, requests);
        handler(&mut cx);
        true
    }
}

fn device_px(css: f32, scale: f32) -> u32 {
    (css * scale).round().max(0.0) as u32
}

fn update_tree(elements: &[ElementRef], timestamp: f64) {
    for el in elements {
        let Ok(borrowed) = el.try_borrow() else {
            continue;
        };
        let hook = borrowed.update.clone();
        let children = borrowed.children.clone();
        drop(borrowed);

        if let Some(hook) = hook {
            hook(timestamp);
        }
        update_tree(&children, timestamp);
    }
}

struct RenderPass<'a> {
    layer: usize,
    ctx: &'a mut dyn Context2d,
    renderer: &'a RendererRef,
    registry: &'a mut Registry,
    membership: &'a mut Membership,
    indexes: &'a mut Indexes,
    stats: &'a mut LayerStats,
    lifts: &'a mut LiftTable,
    offset: Vec2,
    counter: u32,
}

impl RenderPass<'_> {
    fn walk(&mut self, origin: Vec2, elements: &[ElementRef]) {
        for el_ref in elements {
            self.counter += 1;
            let order = self.counter;

            let Ok(el) = el_ref.try_borrow() else {
                warn!(layer = self.layer, "element is mutably borrowed during render, skipped");
                continue;
            };
            if el.hidden {
                continue;
            }
            let id = el.id();
            let base = if el.absolute { Vec2::ZERO } else { origin };

            let mut anchor = base;
            let mut lifted = false;
            if el.layer_up {
                match self.lifts.resolve(id, self.layer, base) {
                    Some(at) => {
                        anchor = at;
                        lifted = true;
                    }
                    None => {
                        // Home layer: keep the hit-test slot, draw nothing.
                        self.register(id, el_ref, &el, order, base, false);
                        continue;
                    }
                }
            }
            self.register(id, el_ref, &el, order, anchor, lifted);

            let at = self.offset + anchor + el.position;
            let renderer = el.renderer.as_ref().unwrap_or(self.renderer).clone();
            if !el.shapes.is_empty() || !el.texts.is_empty() {
                self.ctx.save();
                self.ctx.translate(at.x, at.y);
                for mesh in &el.shapes {
                    renderer.draw(self.ctx, mesh);
                }
                for text in &el.texts {
                    renderer.write(self.ctx, text);
                }
                self.ctx.restore();
            }

            let post_render = el.post_render.clone();
            let children = el.children.clone();
            let position = el.position;
            drop(el);

            if let Some(hook) = post_render {
                self.ctx.save();
                self.ctx.translate(at.x, at.y);
                hook(&mut *self.ctx);
                self.ctx.restore();
            }
            self.walk(anchor + position, &children);
        }
    }

    fn register(
        &mut self,
        id: ElementId,
        el_ref: &ElementRef,
        el: &ShadowElement,
        order: u32,
        offset: Vec2,
        lifted: bool,
    ) {
        let key = self.registry.refresh(id, el_ref, order, offset);
        if let Some(record) = self.registry.get_mut(key) {
            record.state.lifted = lifted;
        }
        if self.membership.visit(id) {
            self.indexes.build(key, order, el.capabilities());
            self.stats.events_built += 1;
        }
    }
}
