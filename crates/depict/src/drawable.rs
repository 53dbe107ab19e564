//! # Drawable Model
//!
//! Data-only descriptions of what an element draws: meshes (an SVG path plus
//! style options) and texts (content plus layout/style options).
//! Nothing in here knows how to draw; see [`crate::renderer`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Canvas `lineCap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Canvas `lineJoin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

/// Canvas `textAlign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Start,
    End,
    Left,
    Right,
    Center,
}

/// Canvas `textBaseline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

/// Style options shared by meshes and texts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawableOptions {
    /// Stroke style (color, e.g. `"#333"`).
    pub stroke: Option<String>,
    /// Fill style.
    pub fill: Option<String>,
    /// Rotation in radians, applied to the context.
    pub rotation: Option<f32>,
    /// Uniform scale, applied to the context.
    pub scale: Option<f32>,
    pub shadow_color: Option<String>,
    pub shadow_blur: Option<f32>,
    pub shadow_offset_x: Option<f32>,
    pub shadow_offset_y: Option<f32>,
}

impl DrawableOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Line style options that only make sense for meshes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshSpecificOptions {
    pub line_width: Option<f32>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub miter_limit: Option<f32>,
}

/// Font options that only make sense for texts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSpecificOptions {
    /// CSS font shorthand, e.g. `"16px sans-serif"`.
    pub font: Option<String>,
    pub text_align: Option<TextAlign>,
    pub text_baseline: Option<TextBaseline>,
}

/// Full set of options a mesh may carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshOptions {
    #[serde(flatten)]
    pub mesh: MeshSpecificOptions,
    #[serde(flatten)]
    pub drawable: DrawableOptions,
    /// Stroke the outline. Default: true.
    pub border: Option<bool>,
    /// Fill the path. Default: false.
    pub background: Option<bool>,
}

/// Full set of options a text may carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOptions {
    #[serde(flatten)]
    pub text: TextSpecificOptions,
    #[serde(flatten)]
    pub drawable: DrawableOptions,
    /// Distance between two baselines. Falls back to the renderer's default.
    pub line_height: Option<f32>,
    /// Maximum width of a line.
    pub width: Option<f32>,
    /// Maximum height of the block; together with `width` enables wrapping.
    pub height: Option<f32>,
    /// Break lines on spaces instead of characters.
    pub word_based: bool,
    /// Terminate a truncated last line with `...`.
    pub ellipsis: bool,
    /// Recompute the layout on every draw instead of caching it.
    pub relayout: bool,
    /// Stroke the glyph outlines. Default: false.
    pub border: Option<bool>,
    /// Fill the glyphs. Default: true.
    pub background: Option<bool>,
}

/// Mesh is the basic render unit: a path in local element coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh {
    /// SVG path data, e.g. `"M 20 20 l 0 100"`.
    pub path: String,
    /// Keeps randomized renderers stable between frames.
    pub seed: Option<u64>,
    pub x: f32,
    pub y: f32,
    pub opts: Option<MeshOptions>,
}

impl Mesh {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_options(mut self, opts: MeshOptions) -> Self {
        self.opts = Some(opts);
        self
    }
}

/// Computed lines of a text, cached between draws.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    /// Content the layout was computed for.
    pub content: String,
    pub lines: Vec<String>,
    /// Width of a wrapped block; 0 for single lines.
    pub width: f32,
    /// Height of a wrapped block; 0 for single lines.
    pub height: f32,
}

/// A piece of text shown by an element.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Text {
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub opts: Option<TextOptions>,
    #[serde(skip)]
    layout: RefCell<Option<TextLayout>>,
}

impl Clone for Text {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            x: self.x,
            y: self.y,
            opts: self.opts.clone(),
            layout: RefCell::new(None),
        }
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.x == other.x
            && self.y == other.y
            && self.opts == other.opts
    }
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_options(mut self, opts: TextOptions) -> Self {
        self.opts = Some(opts);
        self
    }

    /// Returns the cached layout if it is still valid for the current content.
    pub fn cached_layout(&self) -> Option<TextLayout> {
        if self.opts.as_ref().is_some_and(|o| o.relayout) {
            return None;
        }
        self.layout
            .borrow()
            .as_ref()
            .filter(|l| l.content == self.content)
            .cloned()
    }

    pub fn store_layout(&self, layout: TextLayout) {
        *self.layout.borrow_mut() = Some(layout);
    }
}

/// Size of a laid out text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRect {
    pub width: f32,
    pub height: f32,
}
