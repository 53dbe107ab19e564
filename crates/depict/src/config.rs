//! # Configuration
//!
//! Defaults applied to every layer when the graph is initialized.

use serde::{Deserialize, Serialize};

use crate::drawable::{DrawableOptions, MeshSpecificOptions, TextSpecificOptions};
use crate::error::Result;
use crate::renderer::DEFAULT_LINE_HEIGHT;

/// Configuration parameters for a [`crate::Graph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    /// Base style primed into every layer's context.
    pub layer_defaults: LayerStyle,
    /// Run element update hooks before rendering. Default: true.
    pub update: bool,
    /// Re-render every frame regardless of the dirty flag. Default: false.
    pub dynamic: bool,
    /// Line height of the default renderer. Default: 18.0.
    pub line_height: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            layer_defaults: LayerStyle::default(),
            update: true,
            dynamic: false,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl GraphConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Persistent context style of a layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
    pub mesh: MeshSpecificOptions,
    pub text: TextSpecificOptions,
    pub drawable: DrawableOptions,
}
