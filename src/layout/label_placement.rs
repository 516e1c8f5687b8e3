// Title and beta block placement with collision avoidance.
// Pure geometry: candidates are tested against marker points and the title
// rectangle, nothing is drawn here.

use crate::config::{BetaPlacement, LayoutConfig};
use crate::geometry::{Point, Rect};
use crate::text_metrics::FontRole;
use crate::theme::Theme;

use super::{BetaLayout, Corner, DrawOp, Panel, TextBlock, TextOutline, TextRun, TitleLayout};

/// Corners tried for the beta block, in order. Bottom-right belongs to the
/// title.
pub const BETA_CANDIDATES: [Corner; 3] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft];

/// Right-aligns `block` against the bottom-right corner of a `width` x
/// `height` canvas, inset by `margin`.
pub fn place_title(block: TextBlock, width: f32, height: f32, margin: f32) -> TitleLayout {
    let x1 = width - margin;
    let y1 = height - margin;
    let rect = Rect::new(x1 - block.width, y1 - block.height, x1, y1);
    TitleLayout { rect, block }
}

pub fn title_runs(title: &TitleLayout, theme: &Theme, config: &LayoutConfig) -> Vec<TextRun> {
    let block = &title.block;
    block
        .lines
        .iter()
        .zip(&block.line_widths)
        .enumerate()
        .filter(|(_, (line, _))| !line.is_empty())
        .map(|(idx, (line, line_width))| {
            let top = title.rect.y0 + block.line_top(idx);
            TextRun {
                text: line.clone(),
                role: FontRole::Title,
                font_size: block.font_size,
                x: title.rect.x1 - line_width,
                top,
                baseline: top + block.ascent,
                fill: theme.title_color.clone(),
                outline: Some(TextOutline {
                    color: theme.text_outline_color.clone(),
                    width: config.title_outline_width,
                }),
            }
        })
        .collect()
}

/// Footprint of a block placed at `corner`, padding included.
pub fn candidate_rect(
    corner: Corner,
    footprint_w: f32,
    footprint_h: f32,
    width: f32,
    height: f32,
    margin: f32,
) -> Rect {
    let origin = match corner {
        Corner::TopLeft => Point::new(margin, margin),
        Corner::TopRight => Point::new(width - margin - footprint_w, margin),
        Corner::BottomLeft => Point::new(margin, height - margin - footprint_h),
        Corner::BottomRight => Point::new(width - margin - footprint_w, height - margin - footprint_h),
    };
    Rect::from_origin_size(origin, footprint_w, footprint_h)
}

/// A candidate is blocked by any marker strictly inside it or by overlap with
/// the title.
pub fn is_blocked(rect: &Rect, markers: &[Point], title: Option<&Rect>) -> bool {
    markers.iter().any(|p| rect.strictly_contains(*p))
        || title.is_some_and(|title| rect.intersects(title))
}

/// Picks the first free corner. Returns `(corner, rect, fallback)`; when every
/// corner is blocked the top-left rect is returned with `fallback = true`.
pub fn choose_beta_corner(
    footprint_w: f32,
    footprint_h: f32,
    width: f32,
    height: f32,
    margin: f32,
    markers: &[Point],
    title: Option<&Rect>,
) -> (Corner, Rect, bool) {
    for corner in BETA_CANDIDATES {
        let rect = candidate_rect(corner, footprint_w, footprint_h, width, height, margin);
        if !is_blocked(&rect, markers, title) {
            return (corner, rect, false);
        }
    }
    let rect = candidate_rect(Corner::TopLeft, footprint_w, footprint_h, width, height, margin);
    (Corner::TopLeft, rect, true)
}

/// Places the beta block. Overlay mode searches the photo's corners; extend
/// mode puts it in a band below the photo and returns the band height.
pub fn place_beta(
    block: TextBlock,
    base_width: f32,
    base_height: f32,
    markers: &[Point],
    title: Option<&Rect>,
    config: &LayoutConfig,
) -> (BetaLayout, f32) {
    let pad = config.beta_padding.max(0.0);
    let footprint_w = block.width + pad * 2.0;
    let footprint_h = block.height + pad * 2.0;
    match config.beta_placement {
        BetaPlacement::Overlay => {
            let (corner, rect, fallback) = choose_beta_corner(
                footprint_w,
                footprint_h,
                base_width,
                base_height,
                config.beta_margin,
                markers,
                title,
            );
            (
                BetaLayout {
                    placement: BetaPlacement::Overlay,
                    corner: Some(corner),
                    rect,
                    block,
                    fallback,
                },
                0.0,
            )
        }
        BetaPlacement::Extend => {
            let band_height = footprint_h;
            let rect = Rect::from_origin_size(Point::new(0.0, base_height), base_width, band_height);
            (
                BetaLayout {
                    placement: BetaPlacement::Extend,
                    corner: None,
                    rect,
                    block,
                    fallback: false,
                },
                band_height,
            )
        }
    }
}

/// Background panel followed by left-aligned text runs. In extend mode the
/// panel is the opaque band below the photo.
pub fn beta_ops(beta: &BetaLayout, theme: &Theme, config: &LayoutConfig) -> Vec<DrawOp> {
    let pad = config.beta_padding.max(0.0);
    let mut ops = Vec::with_capacity(beta.block.lines.len() + 1);
    let fill = match beta.placement {
        BetaPlacement::Overlay => theme.beta_background.clone(),
        BetaPlacement::Extend => theme.band_background.clone(),
    };
    ops.push(DrawOp::Panel(Panel {
        rect: beta.rect,
        fill,
    }));
    let left = beta.rect.x0 + pad;
    let top = beta.rect.y0 + pad;
    for (idx, line) in beta.block.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_top = top + beta.block.line_top(idx);
        ops.push(DrawOp::Text(TextRun {
            text: line.clone(),
            role: FontRole::Beta,
            font_size: beta.block.font_size,
            x: left,
            top: line_top,
            baseline: line_top + beta.block.ascent,
            fill: theme.beta_text_color.clone(),
            outline: None,
        }));
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(width: f32, height: f32) -> TextBlock {
        TextBlock {
            lines: vec!["x".to_string()],
            line_widths: vec![width],
            line_height: height,
            ascent: height * 0.8,
            line_spacing: 0.0,
            font_size: height,
            width,
            height,
        }
    }

    #[test]
    fn title_hugs_bottom_right() {
        let title = place_title(block(200.0, 60.0), 1000.0, 800.0, 50.0);
        assert_eq!(title.rect, Rect::new(750.0, 690.0, 950.0, 750.0));
    }

    #[test]
    fn title_lines_are_right_aligned() {
        let mut b = block(200.0, 60.0);
        b.lines = vec!["long line".to_string(), "short".to_string()];
        b.line_widths = vec![200.0, 80.0];
        b.height = 130.0;
        b.line_spacing = 10.0;
        let title = place_title(b, 1000.0, 800.0, 50.0);
        let runs = title_runs(&title, &Theme::classic(), &LayoutConfig::default());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].x + 200.0, 950.0);
        assert_eq!(runs[1].x + 80.0, 950.0);
        assert_eq!(runs[1].top - runs[0].top, 70.0);
    }

    #[test]
    fn candidates_sit_inside_margins() {
        let tl = candidate_rect(Corner::TopLeft, 100.0, 50.0, 1000.0, 800.0, 20.0);
        let tr = candidate_rect(Corner::TopRight, 100.0, 50.0, 1000.0, 800.0, 20.0);
        let bl = candidate_rect(Corner::BottomLeft, 100.0, 50.0, 1000.0, 800.0, 20.0);
        assert_eq!(tl, Rect::new(20.0, 20.0, 120.0, 70.0));
        assert_eq!(tr, Rect::new(880.0, 20.0, 980.0, 70.0));
        assert_eq!(bl, Rect::new(20.0, 730.0, 120.0, 780.0));
    }

    #[test]
    fn marker_in_top_left_moves_block_right() {
        let markers = [Point::new(60.0, 40.0)];
        let (corner, rect, fallback) =
            choose_beta_corner(100.0, 50.0, 1000.0, 800.0, 20.0, &markers, None);
        assert_eq!(corner, Corner::TopRight);
        assert!(!fallback);
        assert!(!rect.strictly_contains(markers[0]));
    }

    #[test]
    fn marker_on_border_does_not_block() {
        let markers = [Point::new(20.0, 40.0)];
        let (corner, _, _) = choose_beta_corner(100.0, 50.0, 1000.0, 800.0, 20.0, &markers, None);
        assert_eq!(corner, Corner::TopLeft);
    }

    #[test]
    fn title_overlap_blocks_candidate() {
        let title = Rect::new(0.0, 700.0, 1000.0, 800.0);
        let markers = [Point::new(60.0, 40.0), Point::new(900.0, 40.0)];
        let (corner, _, fallback) =
            choose_beta_corner(100.0, 50.0, 1000.0, 800.0, 20.0, &markers, Some(&title));
        assert_eq!(corner, Corner::TopLeft);
        assert!(fallback);
    }

    #[test]
    fn extend_mode_adds_band_below_photo() {
        let config = LayoutConfig {
            beta_placement: BetaPlacement::Extend,
            beta_padding: 20.0,
            ..LayoutConfig::default()
        };
        let (beta, band) = place_beta(block(300.0, 90.0), 1000.0, 800.0, &[], None, &config);
        assert_eq!(band, 130.0);
        assert_eq!(beta.rect, Rect::new(0.0, 800.0, 1000.0, 930.0));
        assert!(beta.corner.is_none());
        let theme = Theme::classic();
        let ops = beta_ops(&beta, &theme, &config);
        assert!(matches!(&ops[0], DrawOp::Panel(panel) if panel.fill == theme.band_background));
        let DrawOp::Text(run) = &ops[1] else {
            unreachable!()
        };
        assert_eq!((run.x, run.top), (20.0, 820.0));
    }
}
