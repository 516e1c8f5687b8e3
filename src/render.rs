use crate::layout::{ArrowLayout, DrawOp, MarkerLayout, Panel, RouteLayout, TextRun};
use crate::text_metrics::FontSet;
use crate::theme::MarkerShape;
use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(feature = "raster")]
use crate::config::{Config, RenderConfig};
#[cfg(feature = "raster")]
use crate::error::{RenderError, RenderResult, Warning};
#[cfg(feature = "raster")]
use crate::ir::{HoldMap, Route};
#[cfg(feature = "raster")]
use std::path::Path;

/// Offsets used to fake a text outline: the text is stamped at each of these
/// (scaled by the outline width) before the fill pass.
const OUTLINE_OFFSETS: [(f32, f32); 8] = [
    (-1.0, 0.0),
    (1.0, 0.0),
    (0.0, -1.0),
    (0.0, 1.0),
    (-1.0, -1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (1.0, 1.0),
];

/// Serializes the display list as a transparent SVG overlay the size of the
/// final canvas. Ops are emitted in list order, so paint order is preserved.
pub fn render_svg(layout: &RouteLayout, fonts: &FontSet) -> String {
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    for op in &layout.ops {
        match op {
            DrawOp::Arrow(arrow) => push_arrow(&mut svg, arrow),
            DrawOp::Marker(marker) => push_marker(&mut svg, marker, fonts),
            DrawOp::Panel(panel) => push_panel(&mut svg, panel),
            DrawOp::Text(run) => push_text(&mut svg, run, fonts),
        }
    }
    svg.push_str("</svg>");
    svg
}

fn push_arrow(svg: &mut String, arrow: &ArrowLayout) {
    let geometry = &arrow.geometry;
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
        geometry.tail.x,
        geometry.tail.y,
        geometry.shaft_end.x,
        geometry.shaft_end.y,
        escape_xml(&arrow.color),
        arrow.width
    ));
    if let Some(head) = geometry.head {
        let points = head
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\"/>",
            points,
            escape_xml(&arrow.color)
        ));
    }
}

fn push_marker(svg: &mut String, marker: &MarkerLayout, fonts: &FontSet) {
    let c = marker.center;
    let r = marker.radius;
    let stroke = escape_xml(&marker.style.outline);
    match marker.style.shape {
        MarkerShape::Circle => svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            c.x, c.y, r, stroke, marker.outline_width
        )),
        MarkerShape::Rectangle => svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            c.x - r,
            c.y - r,
            r * 2.0,
            r * 2.0,
            stroke,
            marker.outline_width
        )),
    }
    if marker.dot_radius > 0.0 {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            c.x,
            c.y,
            marker.dot_radius,
            escape_xml(&marker.dot_color)
        ));
    }
    if let Some(label) = &marker.label {
        push_text(svg, label, fonts);
    }
}

fn push_panel(svg: &mut String, panel: &Panel) {
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        panel.rect.x0,
        panel.rect.y0,
        panel.rect.width(),
        panel.rect.height(),
        escape_xml(&panel.fill)
    ));
}

fn push_text(svg: &mut String, run: &TextRun, fonts: &FontSet) {
    if run.text.is_empty() {
        return;
    }
    let family = font_family_attr(fonts.family(run.role));
    let text = escape_xml(&run.text);
    let mut stamp = |x: f32, y: f32, fill: &str| {
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{family}\" font-size=\"{}\" fill=\"{}\" xml:space=\"preserve\">{text}</text>",
            run.font_size,
            escape_xml(fill)
        ));
    };
    if let Some(outline) = &run.outline
        && outline.width > 0.0
    {
        for (dx, dy) in OUTLINE_OFFSETS {
            stamp(
                run.x + dx * outline.width,
                run.baseline + dy * outline.width,
                &outline.color,
            );
        }
    }
    stamp(run.x, run.baseline, &run.fill);
}

fn font_family_attr(family: &str) -> String {
    let generic = matches!(
        family.trim().to_ascii_lowercase().as_str(),
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui"
    );
    if generic || family.contains(',') || family.contains('\'') {
        escape_xml(family)
    } else {
        escape_xml(&format!("'{family}'"))
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// Tab, newline and friends are left for WHITESPACE_RUN to turn into `_`.
static FORBIDDEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x08\x0e-\x1f\x7f]"#).expect("valid filename regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

fn sanitize_file_part(part: &str, empty: &str) -> String {
    let stripped = FORBIDDEN_CHARS.replace_all(part, "");
    let collapsed = WHITESPACE_RUN.replace_all(stripped.trim(), "_");
    if collapsed.is_empty() {
        empty.to_string()
    } else {
        collapsed.into_owned()
    }
}

/// `"{difficulty}_{name}.png"` with path-hostile characters removed and
/// whitespace runs collapsed to `_`.
pub fn output_file_name(difficulty: &str, name: &str) -> String {
    format!(
        "{}_{}.png",
        sanitize_file_part(difficulty, "unknown"),
        sanitize_file_part(name, "untitled")
    )
}

/// A composed route image. `height` exceeds the base image height when the
/// beta block was placed in an extension band.
#[cfg(feature = "raster")]
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub image: image::RgbaImage,
    pub width: u32,
    pub height: u32,
    pub layout: RouteLayout,
}

#[cfg(feature = "raster")]
impl RenderedImage {
    pub fn warnings(&self) -> &[Warning] {
        &self.layout.warnings
    }
}

#[cfg(feature = "raster")]
pub fn load_base_image(path: &Path) -> RenderResult<image::RgbaImage> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::MissingAsset {
        what: "base image",
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "base image loaded"
    );
    Ok(image.to_rgba8())
}

/// Lays out `route` over `base` and composes the result. `base` is not
/// modified.
#[cfg(feature = "raster")]
pub fn render_route_image(
    base: &image::RgbaImage,
    route: &Route,
    holds: &HoldMap,
    fonts: &FontSet,
    config: &Config,
) -> RenderResult<RenderedImage> {
    let layout = crate::layout::compute_layout(route, holds, fonts, config, base.dimensions());
    let image = rasterize(base, &layout, fonts)?;
    Ok(RenderedImage {
        width: image.width(),
        height: image.height(),
        image,
        layout,
    })
}

/// Copies `base` into a canvas sized for `layout` and draws the overlay on
/// top. Rows below the base image start transparent and are covered by the
/// band panel.
#[cfg(feature = "raster")]
pub fn rasterize(
    base: &image::RgbaImage,
    layout: &RouteLayout,
    fonts: &FontSet,
) -> RenderResult<image::RgbaImage> {
    use resvg::tiny_skia;

    let width = layout.width.round().max(1.0) as u32;
    let height = layout.height.ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::raster(format!("cannot allocate a {width}x{height} canvas")))?;

    let copy_w = base.width().min(width);
    let copy_h = base.height().min(height);
    let pixels = pixmap.pixels_mut();
    for y in 0..copy_h {
        for x in 0..copy_w {
            let [r, g, b, a] = base.get_pixel(x, y).0;
            pixels[(y * width + x) as usize] = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    let svg = render_svg(layout, fonts);
    let mut options = usvg::Options::default();
    options.fontdb = fonts.database();
    options.font_family = fonts.family(crate::text_metrics::FontRole::Label).to_string();
    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|err| RenderError::raster(format!("overlay rejected: {err}")))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    image::RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| RenderError::raster("canvas buffer size mismatch"))
}

/// Writes `image` as PNG. With quantization enabled the image is reduced to a
/// NeuQuant palette and written as an indexed PNG.
#[cfg(feature = "raster")]
pub fn write_png(image: &image::RgbaImage, path: &Path, config: &RenderConfig) -> RenderResult<()> {
    match config.quantize_colors {
        Some(colors) => write_indexed_png(image, path, colors, config.quantize_speed),
        None => {
            image.save_with_format(path, image::ImageFormat::Png)?;
            Ok(())
        }
    }
}

#[cfg(feature = "raster")]
fn write_indexed_png(
    image: &image::RgbaImage,
    path: &Path,
    colors: u16,
    speed: i32,
) -> RenderResult<()> {
    let colors = usize::from(colors.clamp(2, 256));
    let pixels = image.as_raw();
    let quant = color_quant::NeuQuant::new(speed.clamp(1, 30), colors, pixels);
    let indices: Vec<u8> = pixels
        .chunks_exact(4)
        .map(|px| quant.index_of(px) as u8)
        .collect();

    let mut palette = Vec::with_capacity(colors * 3);
    let mut alpha = Vec::with_capacity(colors);
    for entry in quant.color_map_rgba().chunks_exact(4) {
        palette.extend_from_slice(&entry[..3]);
        alpha.push(entry[3]);
    }

    let file = std::fs::File::create(path)?;
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    if alpha.iter().any(|a| *a != u8::MAX) {
        encoder.set_trns(alpha);
    }
    let mut writer = encoder
        .write_header()
        .map_err(|err| RenderError::raster(format!("png header: {err}")))?;
    writer
        .write_image_data(&indices)
        .map_err(|err| RenderError::raster(format!("png data: {err}")))?;
    tracing::debug!(path = %path.display(), colors, "indexed png written");
    Ok(())
}
