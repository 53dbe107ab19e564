//! # Display List
//!
//! Headless rendering target. Instead of rasterizing, a [`RecordingSurface`]
//! turns every context call into a [`DrawCommand`]. The host (or a test) can
//! replay the list onto a real canvas, or just inspect it.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::context::{Context2d, Surface};
use crate::drawable::{LineCap, LineJoin, TextAlign, TextBaseline};

/// Canvas default font size.
const DEFAULT_FONT_PX: f32 = 10.0;

/// Advance of one display column, as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;

/// A single recorded context call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Scale { x: f32, y: f32 },
    Rotate { angle: f32 },
    SetTransform { matrix: [f32; 6] },
    ClearRect { x: f32, y: f32, w: f32, h: f32 },
    LineWidth(f32),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f32),
    StrokeStyle(String),
    FillStyle(String),
    ShadowColor(String),
    ShadowBlur(f32),
    ShadowOffsetX(f32),
    ShadowOffsetY(f32),
    Font(String),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    StrokePath(String),
    FillPath(String),
    StrokeText { text: String, x: f32, y: f32 },
    FillText { text: String, x: f32, y: f32 },
    /// Emitted by [`Surface::set_size`].
    Resize { width: u32, height: u32 },
}

/// A list of draw commands.
pub type RenderList = Vec<DrawCommand>;

/// Shared handle on the commands recorded by a surface.
///
/// Cloning the log is cheap; all clones observe the same list, even after the
/// surface itself moved to another thread. The list is never trimmed on its
/// own: long-running hosts call [`CommandLog::drain`] once per frame.
#[derive(Clone, Debug, Default)]
pub struct CommandLog(Arc<Mutex<RenderList>>);

impl CommandLog {
    fn lock(&self) -> MutexGuard<'_, RenderList> {
        // A panic while holding the lock cannot leave the list half written.
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn push(&self, cmd: DrawCommand) {
        self.lock().push(cmd);
    }

    pub fn snapshot(&self) -> RenderList {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Takes every command recorded so far, leaving the log empty.
    pub fn drain(&self) -> RenderList {
        std::mem::take(&mut *self.lock())
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }
}

/// A surface that records instead of drawing.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    log: CommandLog,
    font_px: f32,
    font_stack: Vec<f32>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            log: CommandLog::default(),
            font_px: DEFAULT_FONT_PX,
            font_stack: Vec::new(),
        }
    }

    /// Returns a handle on the recorded commands.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

/// Extracts the pixel size from a CSS font shorthand (`"bold 16px serif"`).
fn font_size_px(font: &str) -> Option<f32> {
    font.split_whitespace()
        .find_map(|token| token.strip_suffix("px")?.parse::<f32>().ok())
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        // Resizing a canvas resets its state.
        self.font_px = DEFAULT_FONT_PX;
        self.font_stack.clear();
        self.log.push(DrawCommand::Resize { width, height });
    }

    fn context(&mut self) -> &mut dyn Context2d {
        self
    }
}

impl Context2d for RecordingSurface {
    fn save(&mut self) {
        self.font_stack.push(self.font_px);
        self.log.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(px) = self.font_stack.pop() {
            self.font_px = px;
        }
        self.log.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.log.push(DrawCommand::Translate { x, y });
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.log.push(DrawCommand::Scale { x, y });
    }

    fn rotate(&mut self, angle: f32) {
        self.log.push(DrawCommand::Rotate { angle });
    }

    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.log.push(DrawCommand::SetTransform {
            matrix: [a, b, c, d, e, f],
        });
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.log.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn set_line_width(&mut self, width: f32) {
        self.log.push(DrawCommand::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.log.push(DrawCommand::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.log.push(DrawCommand::LineJoin(join));
    }

    fn set_miter_limit(&mut self, limit: f32) {
        self.log.push(DrawCommand::MiterLimit(limit));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.log.push(DrawCommand::StrokeStyle(style.to_string()));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.log.push(DrawCommand::FillStyle(style.to_string()));
    }

    fn set_shadow_color(&mut self, color: &str) {
        self.log.push(DrawCommand::ShadowColor(color.to_string()));
    }

    fn set_shadow_blur(&mut self, blur: f32) {
        self.log.push(DrawCommand::ShadowBlur(blur));
    }

    fn set_shadow_offset_x(&mut self, offset: f32) {
        self.log.push(DrawCommand::ShadowOffsetX(offset));
    }

    fn set_shadow_offset_y(&mut self, offset: f32) {
        self.log.push(DrawCommand::ShadowOffsetY(offset));
    }

    fn set_font(&mut self, font: &str) {
        if let Some(px) = font_size_px(font) {
            self.font_px = px;
        }
        self.log.push(DrawCommand::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.log.push(DrawCommand::TextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.log.push(DrawCommand::TextBaseline(baseline));
    }

    fn stroke_path(&mut self, path: &str) {
        self.log.push(DrawCommand::StrokePath(path.to_string()));
    }

    fn fill_path(&mut self, path: &str) {
        self.log.push(DrawCommand::FillPath(path.to_string()));
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        self.log.push(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.log.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn measure_text(&mut self, text: &str) -> f32 {
        text.width() as f32 * self.font_px * GLYPH_ADVANCE
    }
}
