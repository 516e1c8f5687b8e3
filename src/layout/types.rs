use serde::Serialize;

use crate::config::BetaPlacement;
use crate::error::Warning;
use crate::geometry::{ArrowGeometry, Point, Rect};
use crate::text_metrics::FontRole;
use crate::theme::{MarkerKind, MarkerStyle};

#[derive(Debug, Clone, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub line_widths: Vec<f32>,
    pub line_height: f32,
    pub ascent: f32,
    pub line_spacing: f32,
    pub font_size: f32,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    /// Top edge of line `idx` relative to the block's top.
    pub fn line_top(&self, idx: usize) -> f32 {
        idx as f32 * (self.line_height + self.line_spacing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOutline {
    pub color: String,
    pub width: f32,
}

/// One line of text. `x`/`top` is the top-left of the line box and
/// `baseline` the y the glyphs sit on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub role: FontRole,
    pub font_size: f32,
    pub x: f32,
    pub top: f32,
    pub baseline: f32,
    pub fill: String,
    pub outline: Option<TextOutline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrowLayout {
    pub from_hold: String,
    pub to_hold: String,
    pub from: Point,
    pub to: Point,
    pub geometry: ArrowGeometry,
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLayout {
    pub hold_id: String,
    /// `None` for the hold index overlay.
    pub kind: Option<MarkerKind>,
    pub center: Point,
    pub radius: f32,
    pub outline_width: f32,
    pub style: MarkerStyle,
    pub dot_radius: f32,
    pub dot_color: String,
    pub label: Option<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub rect: Rect,
    pub fill: String,
}

/// Paint operations in the order they are drawn.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Arrow(ArrowLayout),
    Marker(MarkerLayout),
    Panel(Panel),
    Text(TextRun),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleLayout {
    pub rect: Rect,
    pub block: TextBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct BetaLayout {
    pub placement: BetaPlacement,
    /// Overlay only; `None` when the block sits in the extension band.
    pub corner: Option<Corner>,
    /// Footprint including padding.
    pub rect: Rect,
    pub block: TextBlock,
    /// True when no candidate corner was free.
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteLayout {
    pub route_name: String,
    pub base_width: f32,
    pub base_height: f32,
    /// Final canvas size; taller than the base image when the beta block
    /// extends it.
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
    /// Every resolved marker position (moves and feet).
    pub marker_points: Vec<Point>,
    pub title: Option<TitleLayout>,
    pub beta: Option<BetaLayout>,
    pub warnings: Vec<Warning>,
}

impl RouteLayout {
    pub fn arrows(&self) -> impl Iterator<Item = &ArrowLayout> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Arrow(arrow) => Some(arrow),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerLayout> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn extended(&self) -> bool {
        self.height > self.base_height
    }
}
