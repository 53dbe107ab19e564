//! # Drawing Context
//!
//! The slice of a 2D canvas API the scene graph needs, plus the surface that
//! owns such a context. Hosts implement these traits for their real canvas
//! (an `OffscreenCanvas` through wasm bindings, a skia surface, ...);
//! [`crate::render::RecordingSurface`] is the headless implementation.

use crate::drawable::{
    DrawableOptions, LineCap, LineJoin, MeshOptions, MeshSpecificOptions, TextAlign, TextBaseline,
    TextOptions, TextSpecificOptions,
};

/// A 2D drawing context with canvas semantics.
///
/// Transform calls compose with the current transform, `save`/`restore`
/// push and pop the whole drawing state.
pub trait Context2d {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32);
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn set_line_width(&mut self, width: f32);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_miter_limit(&mut self, limit: f32);

    fn set_stroke_style(&mut self, style: &str);
    fn set_fill_style(&mut self, style: &str);
    fn set_shadow_color(&mut self, color: &str);
    fn set_shadow_blur(&mut self, blur: f32);
    fn set_shadow_offset_x(&mut self, offset: f32);
    fn set_shadow_offset_y(&mut self, offset: f32);

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    /// Strokes SVG path data.
    fn stroke_path(&mut self, path: &str);
    /// Fills SVG path data.
    fn fill_path(&mut self, path: &str);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
    /// Width of `text` in CSS pixels with the current font.
    fn measure_text(&mut self, text: &str) -> f32;
}

/// A drawing surface: a pixel buffer plus its context.
///
/// Surfaces are `Send` so the host can hand them to the worker that owns the
/// graph. The move is one-shot, the sender keeps nothing.
pub trait Surface: Send {
    /// Width in device pixels.
    fn width(&self) -> u32;
    /// Height in device pixels.
    fn height(&self) -> u32;
    /// Resizes the pixel buffer. Like a canvas, this may reset the context state.
    fn set_size(&mut self, width: u32, height: u32);
    fn context(&mut self) -> &mut dyn Context2d;
}

/// Owned, transferable surface.
pub type SurfaceBox = Box<dyn Surface>;

/// Applies every present field of the layer defaults to the context.
pub fn initialize_context(
    ctx: &mut dyn Context2d,
    mesh: &MeshSpecificOptions,
    text: &TextSpecificOptions,
    drawable: &DrawableOptions,
) {
    apply_mesh_specific(ctx, mesh);
    apply_text_specific(ctx, text);
    apply_drawable(ctx, drawable);
}

/// Builds the context state for a mesh.
pub type MeshContextBuilder = fn(&mut dyn Context2d, &MeshOptions);

/// Builds the context state for a text.
pub type TextContextBuilder = fn(&mut dyn Context2d, &TextOptions);

/// Default mesh context builder.
pub fn build_mesh_context(ctx: &mut dyn Context2d, opts: &MeshOptions) {
    apply_mesh_specific(ctx, &opts.mesh);
    apply_drawable(ctx, &opts.drawable);
}

/// Default text context builder.
pub fn build_text_context(ctx: &mut dyn Context2d, opts: &TextOptions) {
    apply_text_specific(ctx, &opts.text);
    apply_drawable(ctx, &opts.drawable);
}

fn apply_mesh_specific(ctx: &mut dyn Context2d, o: &MeshSpecificOptions) {
    if let Some(width) = o.line_width {
        ctx.set_line_width(width);
    }
    if let Some(cap) = o.line_cap {
        ctx.set_line_cap(cap);
    }
    if let Some(join) = o.line_join {
        ctx.set_line_join(join);
    }
    if let Some(limit) = o.miter_limit {
        ctx.set_miter_limit(limit);
    }
}

fn apply_text_specific(ctx: &mut dyn Context2d, o: &TextSpecificOptions) {
    if let Some(font) = &o.font {
        ctx.set_font(font);
    }
    if let Some(align) = o.text_align {
        ctx.set_text_align(align);
    }
    if let Some(baseline) = o.text_baseline {
        ctx.set_text_baseline(baseline);
    }
}

fn apply_drawable(ctx: &mut dyn Context2d, o: &DrawableOptions) {
    if let Some(stroke) = &o.stroke {
        ctx.set_stroke_style(stroke);
    }
    if let Some(fill) = &o.fill {
        ctx.set_fill_style(fill);
    }
    if let Some(rotation) = o.rotation {
        ctx.rotate(rotation);
    }
    if let Some(scale) = o.scale {
        ctx.scale(scale, scale);
    }
    if let Some(color) = &o.shadow_color {
        ctx.set_shadow_color(color);
    }
    if let Some(blur) = o.shadow_blur {
        ctx.set_shadow_blur(blur);
    }
    if let Some(x) = o.shadow_offset_x {
        ctx.set_shadow_offset_x(x);
    }
    if let Some(y) = o.shadow_offset_y {
        ctx.set_shadow_offset_y(y);
    }
}
