//! One run over a route database: inputs load once, routes render in order.

use anyhow::Context as _;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{RenderResult, Warning};
use crate::ir::{HoldMap, Route};
use crate::layout::compute_hold_index_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::{load_hold_map, load_routes};
use crate::render::{load_base_image, output_file_name, rasterize, render_route_image, write_png};
use crate::text_metrics::FontSet;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub holds: PathBuf,
    pub routes: PathBuf,
    pub image: PathBuf,
    pub out_dir: PathBuf,
    /// Route names to render; empty renders every route.
    pub only: Vec<String>,
    /// Write `<stem>.layout.json` next to each image.
    pub dump_layout: bool,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    /// Route name and the reason it produced no image.
    pub failed: Vec<(String, String)>,
    pub warnings: Vec<Warning>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders every selected route. Input failures abort before anything is
/// written; a route that fails to rasterize or save is logged and skipped.
pub fn run_batch(options: &BatchOptions, config: &Config) -> RenderResult<BatchReport> {
    let holds = load_hold_map(&options.holds)?;
    let routes = load_routes(&options.routes)?;
    let base = load_base_image(&options.image)?;
    let (fonts, font_warnings) = FontSet::load(&config.fonts);

    let selected = select_routes(&routes, &options.only);
    std::fs::create_dir_all(&options.out_dir)?;
    tracing::info!(
        routes = selected.len(),
        holds = holds.len(),
        out = %options.out_dir.display(),
        "rendering routes"
    );

    let mut report = BatchReport {
        warnings: font_warnings,
        ..BatchReport::default()
    };
    for route in selected {
        match render_one(route, &base, &holds, &fonts, config, options) {
            Ok((path, warnings)) => {
                tracing::info!(route = %route.name, path = %path.display(), "route rendered");
                report.warnings.extend(warnings);
                report.written.push(path);
            }
            Err(err) => {
                tracing::error!(route = %route.name, "route failed: {err:#}");
                report.failed.push((route.name.clone(), format!("{err:#}")));
            }
        }
    }
    Ok(report)
}

fn select_routes<'a>(routes: &'a [Route], only: &[String]) -> Vec<&'a Route> {
    if only.is_empty() {
        return routes.iter().collect();
    }
    for name in only {
        if !routes.iter().any(|route| route.name == *name) {
            tracing::warn!(route = %name, "requested route not found in the route database");
        }
    }
    routes
        .iter()
        .filter(|route| only.iter().any(|name| *name == route.name))
        .collect()
}

fn render_one(
    route: &Route,
    base: &image::RgbaImage,
    holds: &HoldMap,
    fonts: &FontSet,
    config: &Config,
    options: &BatchOptions,
) -> anyhow::Result<(PathBuf, Vec<Warning>)> {
    let rendered = render_route_image(base, route, holds, fonts, config)?;
    let path = options
        .out_dir
        .join(output_file_name(&route.difficulty, &route.name));
    write_png(&rendered.image, &path, &config.render)
        .with_context(|| format!("write png '{}'", path.display()))?;
    if options.dump_layout {
        let dump_path = path.with_extension("layout.json");
        write_layout_dump(&dump_path, &rendered.layout)
            .with_context(|| format!("write layout dump '{}'", dump_path.display()))?;
    }
    Ok((path, rendered.layout.warnings))
}

/// Draws every hold of the map over the base image and writes it to `out`.
pub fn render_hold_index(
    holds_path: &Path,
    image_path: &Path,
    out: &Path,
    config: &Config,
) -> RenderResult<Vec<Warning>> {
    let holds = load_hold_map(holds_path)?;
    let base = load_base_image(image_path)?;
    if holds.is_empty() {
        tracing::warn!(path = %holds_path.display(), "hold map is empty, nothing to mark");
    }
    let (fonts, warnings) = FontSet::load(&config.fonts);
    let layout = compute_hold_index_layout(&holds, &fonts, config, base.dimensions());
    let image = rasterize(&base, &layout, &fonts)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_png(&image, out, &config.render)?;
    tracing::info!(holds = holds.len(), path = %out.display(), "hold index written");
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_routes_filters_by_name() {
        let routes = vec![Route::new("A", "V0"), Route::new("B", "V1"), Route::new("C", "V2")];
        let picked: Vec<_> = select_routes(&routes, &["C".to_string(), "A".to_string()])
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(picked, vec!["A", "C"]);
        assert_eq!(select_routes(&routes, &[]).len(), 3);
    }
}
