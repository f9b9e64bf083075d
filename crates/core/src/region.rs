use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a recognised text block, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One recognised region produced by the classical engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    /// Recognition confidence in [0, 1].
    pub confidence: f32,
    pub bbox: BoundingBox,
}
