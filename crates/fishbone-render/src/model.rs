//! Geometric layout model for the standard fishbone canvas.
//!
//! All coordinates are logical canvas units with the origin at the top-left and y growing
//! downwards; SVG emission scales them by `px_per_unit`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn contains(&self, p: LayoutPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoneSide {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextLineKind {
    Problem,
    Category,
    SubCause,
    RootCause,
    /// Marks that the block was cut to fit the canvas.
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLineLayout {
    pub text: String,
    /// Left edge (or center, for centered lines) and baseline.
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub kind: TextLineKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlockLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<TextLineLayout>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpineLayout {
    pub start: LayoutPoint,
    pub end: LayoutPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    /// Centered lines of the wrapped problem statement.
    pub lines: Vec<TextLineLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneLayout {
    /// Input index of the category.
    pub index: usize,
    pub side: BoneSide,
    /// Position along the spine, counted from the tail on its side.
    pub slot: usize,
    pub label: String,
    /// Attach point on the spine.
    pub start: LayoutPoint,
    /// Outer tip.
    pub end: LayoutPoint,
    pub label_line: TextLineLayout,
    pub detail: TextBlockLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishboneLayout {
    pub width: f64,
    pub height: f64,
    pub arity: usize,
    pub top_slots: usize,
    pub bottom_slots: usize,
    pub spine: SpineLayout,
    pub head: HeadLayout,
    pub bones: Vec<BoneLayout>,
}

impl FishboneLayout {
    pub fn top_count(&self) -> usize {
        self.bones.iter().filter(|b| b.side == BoneSide::Top).count()
    }

    pub fn bottom_count(&self) -> usize {
        self.bones
            .iter()
            .filter(|b| b.side == BoneSide::Bottom)
            .count()
    }

    pub fn canvas_bounds(&self) -> Bounds {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: self.width,
            max_y: self.height,
        }
    }
}
