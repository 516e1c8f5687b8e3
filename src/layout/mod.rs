pub(crate) mod label_placement;
mod route_path;
pub mod text;
pub(crate) mod types;
pub use types::*;

use label_placement::{beta_ops, place_beta, place_title, title_runs};
use route_path::{marker_layout, resolve_route_path};
use text::layout_wrapped_block;

use crate::config::{BetaPlacement, Config};
use crate::error::Warning;
use crate::ir::{HoldMap, Route};
use crate::text_metrics::{FontRole, FontSet};

/// Lays out one route over a `canvas` (base image width, height).
///
/// The returned display list is in paint order: arrows, foot markers, move
/// markers, title text, then the beta panel and its text.
pub fn compute_layout(
    route: &Route,
    holds: &HoldMap,
    fonts: &FontSet,
    config: &Config,
    canvas: (u32, u32),
) -> RouteLayout {
    let layout_config = &config.layout;
    let theme = &config.theme;
    let base_width = canvas.0 as f32;
    let base_height = canvas.1 as f32;

    let path = resolve_route_path(route, holds, fonts, theme, layout_config);
    let marker_points = path.marker_points();
    let mut warnings = path.warnings;

    let mut ops: Vec<DrawOp> = Vec::with_capacity(
        path.arrows.len() + path.foot_markers.len() + path.move_markers.len() + 4,
    );
    ops.extend(path.arrows.into_iter().map(DrawOp::Arrow));
    ops.extend(path.foot_markers.into_iter().map(DrawOp::Marker));
    ops.extend(path.move_markers.into_iter().map(DrawOp::Marker));

    let title_block = layout_wrapped_block(
        &route.title(),
        FontRole::Title,
        layout_config.title_font_size,
        layout_config.title_wrap_width,
        layout_config.line_spacing,
        fonts,
        layout_config.wrap_mode,
    );
    let title = place_title(
        title_block,
        base_width,
        base_height,
        layout_config.title_margin,
    );
    ops.extend(
        title_runs(&title, theme, layout_config)
            .into_iter()
            .map(DrawOp::Text),
    );

    let mut height = base_height;
    let beta = route.beta_text().map(|text| {
        let block = layout_wrapped_block(
            text,
            FontRole::Beta,
            layout_config.beta_font_size,
            layout_config.beta_wrap_width,
            layout_config.line_spacing,
            fonts,
            layout_config.wrap_mode,
        );
        let (beta, band) = place_beta(
            block,
            base_width,
            base_height,
            &marker_points,
            Some(&title.rect),
            layout_config,
        );
        if beta.fallback {
            let warning = Warning::LayoutOverflow {
                route: route.name.clone(),
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }
        if beta.placement == BetaPlacement::Extend {
            height += band;
        }
        beta
    });
    if let Some(beta) = &beta {
        ops.extend(beta_ops(beta, theme, layout_config));
    }

    tracing::debug!(
        route = %route.name,
        ops = ops.len(),
        warnings = warnings.len(),
        "layout computed"
    );

    RouteLayout {
        route_name: route.name.clone(),
        base_width,
        base_height,
        width: base_width,
        height,
        ops,
        marker_points,
        title: Some(title),
        beta,
        warnings,
    }
}

/// Marks every hold in the map with a small ring and its id. Used to check a
/// coordinate file against the photograph.
pub fn compute_hold_index_layout(
    holds: &HoldMap,
    fonts: &FontSet,
    config: &Config,
    canvas: (u32, u32),
) -> RouteLayout {
    let theme = &config.theme;
    let index_config = crate::config::LayoutConfig {
        marker_radius: config.layout.index_marker_radius,
        marker_outline_width: (config.layout.index_marker_radius / 5.0).max(1.0),
        center_dot_radius: 0.0,
        label_offset: config.layout.index_marker_radius + 2.0,
        label_font_size: config.layout.index_font_size,
        ..config.layout.clone()
    };
    let mut ops = Vec::with_capacity(holds.len());
    let mut marker_points = Vec::with_capacity(holds.len());
    for (hold_id, center) in holds.iter() {
        marker_points.push(center);
        ops.push(DrawOp::Marker(marker_layout(
            hold_id,
            None,
            center,
            theme.index_marker.clone(),
            Some(hold_id.to_string()),
            fonts,
            theme,
            &index_config,
        )));
    }

    let width = canvas.0 as f32;
    let height = canvas.1 as f32;
    RouteLayout {
        route_name: "hold-index".to_string(),
        base_width: width,
        base_height: height,
        width,
        height,
        ops,
        marker_points,
        title: None,
        beta: None,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::ir::{Hand, Move};

    fn holds() -> HoldMap {
        [
            ("1", Point::new(100.0, 800.0)),
            ("2", Point::new(200.0, 700.0)),
            ("3", Point::new(300.0, 600.0)),
        ]
        .into_iter()
        .collect()
    }

    fn route() -> Route {
        let mut route = Route::new("Ladder", "V1");
        route.moves = vec![
            Move::start("1"),
            Move::hand("2", Hand::Left),
            Move::finish("3"),
        ];
        route.beta = Some("Stand up on the left foot".to_string());
        route
    }

    #[test]
    fn ops_follow_paint_order() {
        let layout = compute_layout(
            &route(),
            &holds(),
            &FontSet::fallback(),
            &Config::default(),
            (1000, 1000),
        );
        let rank = |op: &DrawOp| match op {
            DrawOp::Arrow(_) => 0,
            DrawOp::Marker(_) => 1,
            DrawOp::Text(run) if run.role == FontRole::Title => 2,
            DrawOp::Panel(_) => 3,
            DrawOp::Text(_) => 4,
        };
        let ranks: Vec<_> = layout.ops.iter().map(rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{ranks:?}");
        assert_eq!(layout.arrows().count(), 2);
        assert_eq!(layout.markers().count(), 3);
        assert!(layout.beta.is_some());
    }

    #[test]
    fn route_without_beta_has_no_panel() {
        let mut route = route();
        route.beta = Some("   ".to_string());
        let layout = compute_layout(
            &route,
            &holds(),
            &FontSet::fallback(),
            &Config::default(),
            (1000, 1000),
        );
        assert!(layout.beta.is_none());
        assert!(!layout.ops.iter().any(|op| matches!(op, DrawOp::Panel(_))));
    }

    #[test]
    fn extend_grows_canvas_by_band() {
        let mut config = Config::default();
        config.layout.beta_placement = BetaPlacement::Extend;
        let layout = compute_layout(&route(), &holds(), &FontSet::fallback(), &config, (1000, 1000));
        let beta = layout.beta.as_ref().expect("beta");
        let expected = beta.block.height + 2.0 * config.layout.beta_padding;
        assert!((layout.height - 1000.0 - expected).abs() < 1e-3);
        assert!(layout.extended());
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn index_layout_marks_every_hold() {
        let config = Config::default();
        let layout = compute_hold_index_layout(&holds(), &FontSet::fallback(), &config, (500, 500));
        assert_eq!(layout.markers().count(), 3);
        assert_eq!(layout.arrows().count(), 0);
        let labels: Vec<_> = layout
            .markers()
            .filter_map(|m| m.label.as_ref().map(|l| l.text.as_str()))
            .collect();
        assert_eq!(labels, vec!["1", "2", "3"]);
        assert!(layout.markers().all(|m| m.kind.is_none()));
    }
}
