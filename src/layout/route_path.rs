// Move sequence -> arrows and markers.
//
// Arrows are collected in a first pass and markers in a second so that, in
// paint order, no arrowhead lands on top of a marker ring.

use crate::config::LayoutConfig;
use crate::error::{HoldRole, Warning};
use crate::geometry::{Point, arrow_geometry};
use crate::ir::{HoldMap, Route};
use crate::text_metrics::{FontRole, FontSet};
use crate::theme::{MarkerKind, MarkerStyle, Theme};

use super::text::vertical_metrics;
use super::{ArrowLayout, MarkerLayout, TextOutline, TextRun};

pub(super) struct RoutePath {
    pub arrows: Vec<ArrowLayout>,
    pub foot_markers: Vec<MarkerLayout>,
    pub move_markers: Vec<MarkerLayout>,
    pub warnings: Vec<Warning>,
}

impl RoutePath {
    pub fn marker_points(&self) -> Vec<Point> {
        self.foot_markers
            .iter()
            .chain(self.move_markers.iter())
            .map(|marker| marker.center)
            .collect()
    }
}

pub(super) fn resolve_route_path(
    route: &Route,
    holds: &HoldMap,
    fonts: &FontSet,
    theme: &Theme,
    config: &LayoutConfig,
) -> RoutePath {
    let mut warnings = Vec::new();
    let mut missing = |hold_id: &str, role: HoldRole| {
        let warning = Warning::MissingHoldReference {
            route: route.name.clone(),
            hold_id: hold_id.to_string(),
            role,
        };
        tracing::warn!("{warning}");
        warnings.push(warning);
    };

    let mut foot_markers = Vec::new();
    for hold_id in &route.foot {
        match holds.get(hold_id) {
            Some(center) => foot_markers.push(marker_layout(
                hold_id,
                Some(MarkerKind::Foot),
                center,
                theme.marker_style(MarkerKind::Foot),
                None,
                fonts,
                theme,
                config,
            )),
            None => missing(hold_id, HoldRole::Foot),
        }
    }

    // Pass one: arrows between consecutive resolved moves.
    let resolved: Vec<Option<Point>> = route
        .moves
        .iter()
        .map(|mv| {
            let point = holds.get(&mv.hold_id);
            if point.is_none() {
                missing(&mv.hold_id, HoldRole::Move);
            }
            point
        })
        .collect();

    let mut arrows = Vec::new();
    let mut previous: Option<(&str, Point)> = None;
    for (mv, point) in route.moves.iter().zip(&resolved) {
        let Some(point) = *point else {
            continue;
        };
        if let Some((prev_id, prev_point)) = previous {
            arrows.push(ArrowLayout {
                from_hold: prev_id.to_string(),
                to_hold: mv.hold_id.clone(),
                from: prev_point,
                to: point,
                geometry: arrow_geometry(
                    prev_point,
                    point,
                    config.arrow_inset,
                    config.arrow_head_length,
                    config.arrow_head_angle,
                ),
                color: theme.arrow_color.clone(),
                width: config.arrow_width,
            });
        }
        previous = Some((mv.hold_id.as_str(), point));
    }

    // Pass two: markers for resolved moves that have a kind.
    let mut move_markers = Vec::new();
    for (mv, point) in route.moves.iter().zip(&resolved) {
        let (Some(center), Some(kind)) = (*point, mv.marker_kind()) else {
            continue;
        };
        let style = theme.marker_style(kind);
        let label = mv.label();
        move_markers.push(marker_layout(
            &mv.hold_id,
            Some(kind),
            center,
            style,
            label,
            fonts,
            theme,
            config,
        ));
    }

    tracing::debug!(
        route = %route.name,
        arrows = arrows.len(),
        markers = move_markers.len(),
        feet = foot_markers.len(),
        "route path resolved"
    );

    RoutePath {
        arrows,
        foot_markers,
        move_markers,
        warnings,
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn marker_layout(
    hold_id: &str,
    kind: Option<MarkerKind>,
    center: Point,
    style: MarkerStyle,
    label: Option<String>,
    fonts: &FontSet,
    theme: &Theme,
    config: &LayoutConfig,
) -> MarkerLayout {
    let label = label.map(|text| {
        let x = center.x + config.label_offset;
        let top = center.y - config.label_offset;
        let ascent = vertical_metrics(fonts, FontRole::Label, config.label_font_size).ascent;
        TextRun {
            text,
            role: FontRole::Label,
            font_size: config.label_font_size,
            x,
            top,
            baseline: top + ascent,
            fill: style.text_color.clone(),
            outline: Some(TextOutline {
                color: theme.text_outline_color.clone(),
                width: config.label_outline_width,
            }),
        }
    });
    MarkerLayout {
        hold_id: hold_id.to_string(),
        kind,
        center,
        radius: config.marker_radius,
        outline_width: config.marker_outline_width,
        style,
        dot_radius: config.center_dot_radius,
        dot_color: theme.center_dot_color.clone(),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Hand, Move};

    fn holds() -> HoldMap {
        [
            ("1", Point::new(100.0, 800.0)),
            ("2", Point::new(200.0, 700.0)),
            ("3", Point::new(300.0, 600.0)),
            ("a", Point::new(150.0, 900.0)),
        ]
        .into_iter()
        .collect()
    }

    fn resolve(route: &Route) -> RoutePath {
        resolve_route_path(
            route,
            &holds(),
            &FontSet::fallback(),
            &Theme::classic(),
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn arrows_follow_move_order() {
        let mut route = Route::new("Ladder", "V1");
        route.moves = vec![
            Move::start("1"),
            Move::hand("2", Hand::Left),
            Move::finish("3"),
        ];
        let path = resolve(&route);
        let pairs: Vec<_> = path
            .arrows
            .iter()
            .map(|a| (a.from_hold.as_str(), a.to_hold.as_str()))
            .collect();
        assert_eq!(pairs, vec![("1", "2"), ("2", "3")]);
        assert!(path.warnings.is_empty());
    }

    #[test]
    fn unknown_hold_does_not_break_chain() {
        let mut route = Route::new("Gap", "V2");
        route.moves = vec![
            Move::start("1"),
            Move::hand("99", Hand::Right),
            Move::finish("3"),
        ];
        let path = resolve(&route);
        assert_eq!(path.arrows.len(), 1);
        assert_eq!(path.arrows[0].from_hold, "1");
        assert_eq!(path.arrows[0].to_hold, "3");
        assert_eq!(path.move_markers.len(), 2);
        assert_eq!(
            path.warnings,
            vec![Warning::MissingHoldReference {
                route: "Gap".to_string(),
                hold_id: "99".to_string(),
                role: HoldRole::Move,
            }]
        );
    }

    #[test]
    fn move_without_kind_chains_but_has_no_marker() {
        let mut route = Route::new("Plain", "V0");
        route.moves = vec![Move::start("1"), Move::new("2"), Move::finish("3")];
        let path = resolve(&route);
        assert_eq!(path.arrows.len(), 2);
        assert_eq!(path.move_markers.len(), 2);
        assert!(path.warnings.is_empty());
    }

    #[test]
    fn feet_get_no_label_and_unknown_feet_warn() {
        let mut route = Route::new("Feet", "V0");
        route.add_foot("A");
        route.add_foot("zz");
        let path = resolve(&route);
        assert_eq!(path.foot_markers.len(), 1);
        assert!(path.foot_markers[0].label.is_none());
        assert_eq!(path.foot_markers[0].kind, Some(MarkerKind::Foot));
        assert!(matches!(
            &path.warnings[0],
            Warning::MissingHoldReference { role: HoldRole::Foot, hold_id, .. } if hold_id == "zz"
        ));
    }

    #[test]
    fn label_sits_up_and_right_of_center() {
        let config = LayoutConfig::default();
        let marker = marker_layout(
            "1",
            Some(MarkerKind::Start),
            Point::new(100.0, 800.0),
            MarkerStyle::default(),
            Some("S".to_string()),
            &FontSet::fallback(),
            &Theme::classic(),
            &config,
        );
        let label = marker.label.expect("label");
        assert_eq!(label.x, 100.0 + config.label_offset);
        assert_eq!(label.top, 800.0 - config.label_offset);
        assert!(label.baseline > label.top);
        assert!(label.outline.is_some());
    }
}
