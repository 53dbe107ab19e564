//! # Renderers
//!
//! A [`Renderer`] turns drawables into context calls. The graph only depends
//! on the trait; [`MinimalistRenderer`] is the wire-frame implementation used
//! as the default of every layer.

use std::rc::Rc;

use crate::context::{
    build_mesh_context, build_text_context, Context2d, MeshContextBuilder, TextContextBuilder,
};
use crate::drawable::{Mesh, Text, TextLayout, TextRect};
use crate::text::{cut_last_line, estimate_lines, separate_text_into_lines};

/// Default distance between two baselines, in CSS pixels.
pub const DEFAULT_LINE_HEIGHT: f32 = 18.0;

/// Drawing capability shared by layers and elements.
pub trait Renderer {
    /// Draws one mesh.
    fn draw(&self, ctx: &mut dyn Context2d, mesh: &Mesh);
    /// Lays out (if needed) and writes one text.
    fn write(&self, ctx: &mut dyn Context2d, text: &Text);
    /// Size of the laid out text block.
    fn bounding_box(&self, ctx: &mut dyn Context2d, text: &Text) -> TextRect;
}

/// Shared renderer handle.
pub type RendererRef = Rc<dyn Renderer>;

/// Construction options of [`MinimalistRenderer`].
#[derive(Clone, Copy, Debug)]
pub struct MinimalistOptions {
    pub mesh_context_builder: MeshContextBuilder,
    pub text_context_builder: TextContextBuilder,
    /// Used for texts without an explicit line height.
    pub line_height: f32,
}

impl Default for MinimalistOptions {
    fn default() -> Self {
        Self {
            mesh_context_builder: build_mesh_context,
            text_context_builder: build_text_context,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

/// Plain strokes and fills, as fast as possible.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimalistRenderer {
    opts: MinimalistOptions,
}

impl MinimalistRenderer {
    pub fn new(opts: MinimalistOptions) -> Self {
        Self { opts }
    }

    fn line_height(&self, text: &Text) -> f32 {
        text.opts
            .as_ref()
            .and_then(|o| o.line_height)
            .filter(|lh| *lh > 0.0)
            .unwrap_or(self.opts.line_height)
    }

    fn prepare_text(&self, ctx: &mut dyn Context2d, text: &Text) -> (TextLayout, f32) {
        let line_height = self.line_height(text);
        if let Some(opts) = &text.opts {
            (self.opts.text_context_builder)(ctx, opts);
        }
        let layout = match text.cached_layout() {
            Some(layout) => layout,
            None => {
                let layout = layout_text(ctx, text, line_height);
                text.store_layout(layout.clone());
                layout
            }
        };
        (layout, line_height)
    }
}

fn layout_text(ctx: &mut dyn Context2d, text: &Text, line_height: f32) -> TextLayout {
    let mut measure = |s: &str, start: usize, end: Option<usize>| -> f32 {
        ctx.measure_text(&s[start..end.unwrap_or(s.len())])
    };
    let content = text.content.clone();

    let wrap = text
        .opts
        .as_ref()
        .and_then(|o| Some((o, o.width?, o.height?)));
    let Some((opts, width, height)) = wrap else {
        let line = match text.opts.as_ref().and_then(|o| o.width.map(|w| (o, w))) {
            Some((opts, width)) => cut_last_line(
                &content,
                width,
                0,
                &mut measure,
                opts.word_based,
                opts.ellipsis,
            ),
            None => content.clone(),
        };
        return TextLayout {
            content,
            lines: vec![line],
            width: 0.0,
            height: 0.0,
        };
    };

    let target = estimate_lines(height, line_height);
    let lines = separate_text_into_lines(
        &content,
        width,
        &mut measure,
        target,
        opts.word_based,
        opts.ellipsis,
    );
    let height = line_height * lines.len() as f32;
    TextLayout {
        content,
        lines,
        width,
        height,
    }
}

impl Renderer for MinimalistRenderer {
    fn draw(&self, ctx: &mut dyn Context2d, mesh: &Mesh) {
        ctx.save();
        if let Some(opts) = &mesh.opts {
            (self.opts.mesh_context_builder)(ctx, opts);
        }
        if mesh.x != 0.0 || mesh.y != 0.0 {
            ctx.translate(mesh.x, mesh.y);
        }

        let (stroke, fill) = match &mesh.opts {
            None => (true, false),
            Some(o) => (
                o.border != Some(false) || o.drawable.stroke.is_some(),
                o.background == Some(true) || o.drawable.fill.is_some(),
            ),
        };
        if stroke {
            ctx.stroke_path(&mesh.path);
        }
        if fill {
            ctx.fill_path(&mesh.path);
        }
        ctx.restore();
    }

    fn write(&self, ctx: &mut dyn Context2d, text: &Text) {
        ctx.save();
        let (layout, line_height) = self.prepare_text(ctx, text);

        let (stroke, fill) = match &text.opts {
            None => (false, true),
            Some(o) => (
                o.border == Some(true),
                o.background != Some(false) || o.drawable.fill.is_some(),
            ),
        };
        let mut y = text.y;
        for line in &layout.lines {
            if stroke {
                ctx.stroke_text(line, text.x, y);
            }
            if fill {
                ctx.fill_text(line, text.x, y);
            }
            y += line_height;
        }
        ctx.restore();
    }

    fn bounding_box(&self, ctx: &mut dyn Context2d, text: &Text) -> TextRect {
        ctx.save();
        let (layout, line_height) = self.prepare_text(ctx, text);
        let rect = match layout.lines.as_slice() {
            [line] => TextRect {
                width: ctx.measure_text(line),
                height: line_height,
            },
            _ => TextRect {
                width: layout.width,
                height: layout.height,
            },
        };
        ctx.restore();
        rect
    }
}
