use crate::config::BetaPlacement;
use crate::error::Warning;
use crate::layout::{Corner, RouteLayout};
use crate::theme::MarkerKind;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub route: String,
    pub base_width: f32,
    pub base_height: f32,
    pub width: f32,
    pub height: f32,
    pub arrows: Vec<ArrowDump>,
    pub markers: Vec<MarkerDump>,
    pub title: Option<BlockDump>,
    pub beta: Option<BetaDump>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct ArrowDump {
    pub from: String,
    pub to: String,
    pub tail: [f32; 2],
    pub tip: [f32; 2],
    pub has_head: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkerDump {
    pub hold_id: String,
    pub kind: Option<MarkerKind>,
    pub x: f32,
    pub y: f32,
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlockDump {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BetaDump {
    pub placement: BetaPlacement,
    pub corner: Option<Corner>,
    pub fallback: bool,
    #[serde(flatten)]
    pub block: BlockDump,
}

impl LayoutDump {
    pub fn from_layout(layout: &RouteLayout) -> Self {
        let arrows = layout
            .arrows()
            .map(|arrow| ArrowDump {
                from: arrow.from_hold.clone(),
                to: arrow.to_hold.clone(),
                tail: [arrow.geometry.tail.x, arrow.geometry.tail.y],
                tip: [arrow.geometry.tip.x, arrow.geometry.tip.y],
                has_head: arrow.geometry.head.is_some(),
            })
            .collect();

        let markers = layout
            .markers()
            .map(|marker| MarkerDump {
                hold_id: marker.hold_id.clone(),
                kind: marker.kind,
                x: marker.center.x,
                y: marker.center.y,
                label: marker.label.as_ref().map(|label| label.text.clone()),
            })
            .collect();

        let title = layout.title.as_ref().map(|title| BlockDump {
            x: title.rect.x0,
            y: title.rect.y0,
            width: title.rect.width(),
            height: title.rect.height(),
            lines: title.block.lines.clone(),
        });

        let beta = layout.beta.as_ref().map(|beta| BetaDump {
            placement: beta.placement,
            corner: beta.corner,
            fallback: beta.fallback,
            block: BlockDump {
                x: beta.rect.x0,
                y: beta.rect.y0,
                width: beta.rect.width(),
                height: beta.rect.height(),
                lines: beta.block.lines.clone(),
            },
        });

        LayoutDump {
            route: layout.route_name.clone(),
            base_width: layout.base_width,
            base_height: layout.base_height,
            width: layout.width,
            height: layout.height,
            arrows,
            markers,
            title,
            beta,
            warnings: layout.warnings.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &RouteLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geometry::Point;
    use crate::ir::{HoldMap, Move, Route};
    use crate::layout::compute_layout;
    use crate::text_metrics::FontSet;

    #[test]
    fn dump_lists_arrows_and_warnings() {
        let holds: HoldMap = [("1", Point::new(10.0, 90.0)), ("2", Point::new(60.0, 40.0))]
            .into_iter()
            .collect();
        let mut route = Route::new("Tiny", "V0");
        route.moves = vec![Move::start("1"), Move::new("7"), Move::finish("2")];
        let layout = compute_layout(&route, &holds, &FontSet::fallback(), &Config::default(), (100, 100));
        let dump = LayoutDump::from_layout(&layout);
        assert_eq!(dump.arrows.len(), 1);
        assert_eq!(dump.markers.len(), 2);
        assert_eq!(dump.warnings.len(), 1);

        let json = serde_json::to_value(&dump).expect("serialize");
        assert_eq!(json["arrows"][0]["from"], "1");
        assert_eq!(json["warnings"][0]["kind"], "missing_hold_reference");
        assert!(json["beta"].is_null());
    }
}
