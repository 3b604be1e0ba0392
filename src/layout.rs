use crate::classify::BandSet;
use crate::config::LayoutConfig;
use crate::types::CoverageLayer;
use anyhow::{anyhow, Result};
use geo::MultiPolygon;
use std::fmt::Write;

const STROKE_COLOR: &str = "#838383";
const STROKE_WIDTH_MM: f64 = 0.1;

// Legend metrics, in layout millimeters.
const LEGEND_TITLE_FONT_MM: f64 = 4.0;
const LEGEND_LABEL_FONT_MM: f64 = 3.2;
const LEGEND_TITLE_ROW_MM: f64 = 7.0;
const LEGEND_ENTRY_ROW_MM: f64 = 6.0;
const LEGEND_SWATCH_MM: f64 = 4.5;

/// A composed print layout for one indicator. Disposable: built fresh each
/// iteration and consumed by the exporter, so reruns cannot accumulate stale
/// layouts.
#[derive(Debug)]
pub struct Layout {
    svg: String,
    width_px: u32,
    height_px: u32,
}

impl Layout {
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }
}

pub fn mm_to_px(mm: f64, dpi: u32) -> f64 {
    mm / 25.4 * f64::from(dpi)
}

/// Compose the print layout for the layer's current symbology: a white page,
/// the map frame zoomed to the dataset extent, and the legend anchored by its
/// lower-left corner.
pub fn compose(layer: &CoverageLayer, config: &LayoutConfig, title: &str) -> Result<Layout> {
    let symbology = layer
        .symbology()
        .ok_or_else(|| anyhow!("No symbology applied to the dataset layer"))?;
    let extent = layer
        .extent()
        .ok_or_else(|| anyhow!("Dataset has no spatial extent"))?;

    let px = |mm: f64| mm_to_px(mm, config.dpi);
    let page_w = px(config.page_width_mm);
    let page_h = px(config.page_height_mm);
    let width_px = page_w.round() as u32;
    let height_px = page_h.round() as u32;

    // Map frame: the page minus the margin on every side.
    let margin = px(config.margin_mm);
    let frame_w = page_w - 2.0 * margin;
    let frame_h = page_h - 2.0 * margin;
    if frame_w <= 0.0 || frame_h <= 0.0 {
        return Err(anyhow!("Margin leaves no room for the map frame"));
    }

    let extent_w = extent.max().x - extent.min().x;
    let extent_h = extent.max().y - extent.min().y;
    if extent_w <= 0.0 || extent_h <= 0.0 {
        return Err(anyhow!("Dataset extent is degenerate"));
    }

    // Aspect-preserving fit, centered in the frame. Y is flipped: north up.
    let scale = (frame_w / extent_w).min(frame_h / extent_h);
    let offset_x = margin + (frame_w - extent_w * scale) / 2.0;
    let offset_y = margin + (frame_h - extent_h * scale) / 2.0;
    let project_x = |x: f64| offset_x + (x - extent.min().x) * scale;
    let project_y = |y: f64| offset_y + (extent.max().y - y) * scale;

    let mut svg = String::new();
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_px}" height="{height_px}" viewBox="0 0 {width_px} {height_px}">"#
    )?;
    // Opaque page background; also keeps the exported buffer free of
    // partially transparent pixels.
    write!(
        svg,
        r##"<rect width="{width_px}" height="{height_px}" fill="#ffffff"/>"##
    )?;

    let stroke_width = px(STROKE_WIDTH_MM);
    for municipality in layer.municipalities() {
        let value = municipality
            .coverage
            .get(symbology.column())
            .copied()
            .flatten();
        let band = symbology.bands().classify(value);
        let path = path_data(&municipality.geometry, &project_x, &project_y);
        write!(
            svg,
            r#"<path d="{path}" fill="{color}" fill-rule="evenodd" stroke="{STROKE_COLOR}" stroke-width="{stroke_width:.2}"/>"#,
            color = band.color,
        )?;
    }

    write_legend(&mut svg, symbology.bands(), config, title)?;
    svg.push_str("</svg>");

    Ok(Layout {
        svg,
        width_px,
        height_px,
    })
}

/// Legend block anchored by its lower-left corner at
/// (inset, page height - inset): title line, then one swatch+label row per
/// band, in authored order. No frame, no background.
fn write_legend(
    svg: &mut String,
    bands: &BandSet,
    config: &LayoutConfig,
    title: &str,
) -> Result<()> {
    let px = |mm: f64| mm_to_px(mm, config.dpi);

    let entries = bands.legend_entries().count() as f64;
    let total_mm = LEGEND_TITLE_ROW_MM + entries * LEGEND_ENTRY_ROW_MM;
    let left_mm = config.legend_inset_mm;
    let top_mm = config.page_height_mm - config.legend_inset_mm - total_mm;

    write!(
        svg,
        r##"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.2}" fill="#000000">{title}</text>"##,
        x = px(left_mm),
        y = px(top_mm + LEGEND_TITLE_FONT_MM),
        size = px(LEGEND_TITLE_FONT_MM),
        title = xml_escape(title),
    )?;

    for (i, band) in bands.legend_entries().enumerate() {
        let row_top_mm = top_mm + LEGEND_TITLE_ROW_MM + i as f64 * LEGEND_ENTRY_ROW_MM;
        let swatch_mm = row_top_mm + (LEGEND_ENTRY_ROW_MM - LEGEND_SWATCH_MM) / 2.0;
        write!(
            svg,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{side:.2}" height="{side:.2}" fill="{color}" stroke="{STROKE_COLOR}" stroke-width="{stroke:.2}"/>"#,
            x = px(left_mm),
            y = px(swatch_mm),
            side = px(LEGEND_SWATCH_MM),
            color = band.color,
            stroke = px(STROKE_WIDTH_MM),
        )?;
        write!(
            svg,
            r##"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.2}" fill="#000000">{label}</text>"##,
            x = px(left_mm + LEGEND_SWATCH_MM + 2.0),
            y = px(row_top_mm + LEGEND_ENTRY_ROW_MM / 2.0 + LEGEND_LABEL_FONT_MM * 0.35),
            size = px(LEGEND_LABEL_FONT_MM),
            label = xml_escape(&band.label),
        )?;
    }
    Ok(())
}

fn path_data(
    geometry: &MultiPolygon<f64>,
    project_x: &impl Fn(f64) -> f64,
    project_y: &impl Fn(f64) -> f64,
) -> String {
    let mut d = String::new();
    for polygon in &geometry.0 {
        write_ring(&mut d, polygon.exterior(), project_x, project_y);
        for interior in polygon.interiors() {
            write_ring(&mut d, interior, project_x, project_y);
        }
    }
    d
}

fn write_ring(
    d: &mut String,
    ring: &geo::LineString<f64>,
    project_x: &impl Fn(f64) -> f64,
    project_y: &impl Fn(f64) -> f64,
) {
    for (i, coord) in ring.0.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(
            d,
            "{command}{x:.2} {y:.2} ",
            x = project_x(coord.x),
            y = project_y(coord.y)
        );
    }
    d.push('Z');
}

/// Band labels like "< 80.0" must not leak raw markup into the layout.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
