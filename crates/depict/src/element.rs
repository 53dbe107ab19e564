//! # Elements
//!
//! [`ShadowElement`] is the basic scene node: an offset, what to draw, its
//! children, and optional capabilities (hit testing, gesture handlers, hooks).
//!
//! Elements are shared through [`ElementRef`]. The layer that renders an
//! element keeps its run-time bookkeeping in its own registry; nothing here
//! is written by the layer.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::Context2d;
use crate::drawable::{Mesh, Text};
use crate::events::EventContext;
use crate::renderer::RendererRef;

/// Stable identity of an element, assigned at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Decides whether a point, in the element's local coordinates, hits it.
pub type ContainFn = Rc<dyn Fn(f32, f32) -> bool>;

/// Runs before render with the frame timestamp.
pub type UpdateHook = Rc<dyn Fn(f64)>;

/// Draws extra content after the element's own meshes and texts.
pub type RenderHook = Rc<dyn Fn(&mut dyn Context2d)>;

/// Handles one gesture.
pub type MouseEventHandler = Rc<dyn Fn(&mut EventContext<'_>)>;

/// Shared, mutable element handle.
pub type ElementRef = Rc<RefCell<ShadowElement>>;

bitflags! {
    /// Optional capabilities present on an element.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        const CONTAIN = 1 << 0;
        const CLICK = 1 << 1;
        const MOUSE_UP = 1 << 2;
        const MOUSE_DOWN = 1 << 3;
        const MOUSE_ENTER = 1 << 4;
        const MOUSE_LEAVE = 1 << 5;
        const MOUSE_MOVE = 1 << 6;
        const UPDATE = 1 << 7;
        const POST_RENDER = 1 << 8;
        const RENDERER = 1 << 9;

        const HOVER = Self::MOUSE_ENTER.bits() | Self::MOUSE_LEAVE.bits();
    }
}

/// The basic scene node.
///
/// ```
/// use depict::{Mesh, ShadowElement};
///
/// let node = ShadowElement::new(24.0, 36.0)
///     .with_shape(Mesh::new("M 20 20 l 0 100"))
///     .into_ref();
/// assert_eq!(node.borrow().position.x, 24.0);
/// ```
pub struct ShadowElement {
    id: ElementId,
    /// Offset from the parent (or from the layer origin when `absolute`).
    pub position: Vec2,
    pub hidden: bool,
    pub absolute: bool,
    /// The element is drawn by the next layer up that also holds it.
    pub layer_up: bool,
    pub shapes: Vec<Mesh>,
    pub texts: Vec<Text>,
    pub children: Vec<ElementRef>,
    /// Without a predicate the element never receives pointer events.
    pub contain: Option<ContainFn>,
    /// Overrides the layer's default renderer.
    pub renderer: Option<RendererRef>,
    pub update: Option<UpdateHook>,
    pub post_render: Option<RenderHook>,
    pub on_click: Option<MouseEventHandler>,
    pub on_mouseup: Option<MouseEventHandler>,
    pub on_mousedown: Option<MouseEventHandler>,
    pub on_mouseenter: Option<MouseEventHandler>,
    pub on_mouseleave: Option<MouseEventHandler>,
    pub on_mousemove: Option<MouseEventHandler>,
    /// Free slot for application state.
    pub data: Option<Box<dyn Any>>,
}

impl Default for ShadowElement {
    fn default() -> Self {
        Self {
            id: ElementId::new(),
            position: Vec2::ZERO,
            hidden: false,
            absolute: false,
            layer_up: false,
            shapes: Vec::new(),
            texts: Vec::new(),
            children: Vec::new(),
            contain: None,
            renderer: None,
            update: None,
            post_render: None,
            on_click: None,
            on_mouseup: None,
            on_mousedown: None,
            on_mouseenter: None,
            on_mouseleave: None,
            on_mousemove: None,
            data: None,
        }
    }
}

impl fmt::Debug for ShadowElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowElement")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("hidden", &self.hidden)
            .field("absolute", &self.absolute)
            .field("layer_up", &self.layer_up)
            .field("shapes", &self.shapes.len())
            .field("texts", &self.texts.len())
            .field("children", &self.children.len())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

impl ShadowElement {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Default::default()
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn into_ref(self) -> ElementRef {
        Rc::new(RefCell::new(self))
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::CONTAIN, self.contain.is_some());
        caps.set(Capabilities::CLICK, self.on_click.is_some());
        caps.set(Capabilities::MOUSE_UP, self.on_mouseup.is_some());
        caps.set(Capabilities::MOUSE_DOWN, self.on_mousedown.is_some());
        caps.set(Capabilities::MOUSE_ENTER, self.on_mouseenter.is_some());
        caps.set(Capabilities::MOUSE_LEAVE, self.on_mouseleave.is_some());
        caps.set(Capabilities::MOUSE_MOVE, self.on_mousemove.is_some());
        caps.set(Capabilities::UPDATE, self.update.is_some());
        caps.set(Capabilities::POST_RENDER, self.post_render.is_some());
        caps.set(Capabilities::RENDERER, self.renderer.is_some());
        caps
    }

    /// Downcasts the user data slot.
    pub fn data_as<T: 'static>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    pub fn data_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.data.as_deref_mut()?.downcast_mut()
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }

    pub fn layer_up(mut self, layer_up: bool) -> Self {
        self.layer_up = layer_up;
        self
    }

    pub fn with_shape(mut self, mesh: Mesh) -> Self {
        self.shapes.push(mesh);
        self
    }

    pub fn with_text(mut self, text: Text) -> Self {
        self.texts.push(text);
        self
    }

    pub fn with_child(mut self, child: ElementRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_contain(mut self, contain: impl Fn(f32, f32) -> bool + 'static) -> Self {
        self.contain = Some(Rc::new(contain));
        self
    }

    pub fn with_contain_fn(mut self, contain: ContainFn) -> Self {
        self.contain = Some(contain);
        self
    }

    pub fn with_renderer(mut self, renderer: RendererRef) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_update(mut self, hook: impl Fn(f64) + 'static) -> Self {
        self.update = Some(Rc::new(hook));
        self
    }

    pub fn with_post_render(mut self, hook: impl Fn(&mut dyn Context2d) + 'static) -> Self {
        self.post_render = Some(Rc::new(hook));
        self
    }

    pub fn with_click(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    pub fn with_mouseup(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_mouseup = Some(Rc::new(handler));
        self
    }

    pub fn with_mousedown(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_mousedown = Some(Rc::new(handler));
        self
    }

    pub fn with_mouseenter(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_mouseenter = Some(Rc::new(handler));
        self
    }

    pub fn with_mouseleave(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_mouseleave = Some(Rc::new(handler));
        self
    }

    pub fn with_mousemove(mut self, handler: impl Fn(&mut EventContext<'_>) + 'static) -> Self {
        self.on_mousemove = Some(Rc::new(handler));
        self
    }

    pub fn with_data(mut self, data: impl Any) -> Self {
        self.data = Some(Box::new(data));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_follow_present_fields() {
        let el = ShadowElement::new(0.0, 0.0)
            .with_contain(|_, _| true)
            .with_click(|_| {})
            .with_mouseleave(|_| {});
        let caps = el.capabilities();
        assert!(caps.contains(Capabilities::CONTAIN | Capabilities::CLICK));
        assert!(caps.intersects(Capabilities::HOVER));
        assert!(!caps.contains(Capabilities::HOVER));
        assert!(!caps.contains(Capabilities::MOUSE_MOVE));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ShadowElement::default().id(), ShadowElement::default().id());
    }

    #[test]
    fn data_slot_downcasts() {
        let mut el = ShadowElement::default().with_data(7u32);
        assert_eq!(el.data_as::<u32>(), Some(&7));
        assert_eq!(el.data_as::<String>(), None);
        if let Some(v) = el.data_as_mut::<u32>() {
            *v += 1;
        }
        assert_eq!(el.data_as::<u32>(), Some(&8));
    }
}
