//! # Depict
//!
//! `depict` is a retained-mode 2D scene graph for canvas-like surfaces.
//! Applications hand trees of [`ShadowElement`]s to the layers of a [`Graph`];
//! the graph redraws layers that asked for it once per frame and routes
//! pointer events to the topmost element that contains them.
//!
//! ## Core Architecture
//! - **Drawables (`src/drawable.rs`)**: Meshes (SVG paths) and texts, data only.
//! - **Context (`src/context.rs`)**: The drawing API a host surface provides.
//! - **Renderer (`src/renderer.rs`)**: Turns drawables into context calls.
//! - **Layer (`src/layer.rs`)**: One surface, its render queue and event indexes.
//! - **Graph (`src/graph.rs`)**: Frame loop, event routing and the message protocol.
//! - **Render (`src/render.rs`)**: A headless surface that records `DrawCommand`s.
//!
//! Everything runs on one thread; the graph is meant to live on the thread
//! that owns the surfaces (see the `depict-worker` crate).

pub mod config;
pub mod context;
pub mod drawable;
pub mod element;
pub mod error;
pub mod events;
pub mod graph;
pub mod layer;
pub mod math;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod renderer;
pub mod scheduler;
pub mod text;

// Re-exports for convenience
pub use config::{GraphConfig, LayerStyle};
pub use context::{Context2d, Surface, SurfaceBox};
pub use drawable::{
    DrawableOptions, Mesh, MeshOptions, MeshSpecificOptions, Text, TextOptions, TextRect,
    TextSpecificOptions,
};
pub use element::{Capabilities, ElementId, ElementRef, ShadowElement};
pub use error::{DepictError, Result};
pub use events::{CanvasEvent, EventContext, EventIndex, RenderRequests};
pub use graph::{BoundingBoxProps, Dispatch, Graph, GraphOffset, Lifecycle};
pub use layer::{Layer, LayerOptions, LayerStats};
pub use protocol::{Envelope, InitPayload, Message, MessageType, PointerEvent, Size};
pub use render::{CommandLog, DrawCommand, RecordingSurface, RenderList};
pub use renderer::{MinimalistOptions, MinimalistRenderer, Renderer, RendererRef};
pub use scheduler::{FrameHandle, FrameScheduler, FrameTicker, ManualScheduler};
