use crate::config::AppConfig;
use crate::types::{CoverageLayer, Municipality};
use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use std::collections::HashMap;
use std::fs::File;
use wkt::TryFromWkt;

/// Load the delimited-text dataset into the shared layer. Any structural
/// problem (missing file, missing columns, bad geometry, zero rows) is fatal.
pub fn load_dataset(config: &AppConfig) -> Result<CoverageLayer> {
    let input = &config.input;

    let file = File::open(&input.data_file)
        .with_context(|| format!("Failed to open dataset: {:?}", input.data_file))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(input.delimiter as u8)
        .from_reader(file);
    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read header of {:?}", input.data_file))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Column '{}' not found in {:?}", name, input.data_file))
    };

    let geometry_idx = column(&input.geometry_column)?;
    let code_idx = column(&input.code_column)?;
    let name_idx = column(&input.name_column)?;
    let state_idx = column(&input.state_column)?;
    // The row id column carries no data but must be present, or indicator
    // discovery would pick it up as a vaccine.
    column(&input.row_id_column)?;

    // Indicator columns: whatever is neither identity nor geometry,
    // in header order.
    let identity = input.identity_columns();
    let indicator_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != geometry_idx && !identity.contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();
    if indicator_columns.is_empty() {
        bail!("Dataset {:?} has no indicator columns", input.data_file);
    }

    let mut municipalities = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {}", row + 1))?;
        let line = row + 2; // 1-based, after the header

        let geometry = parse_geometry(record.get(geometry_idx).unwrap_or(""))
            .with_context(|| format!("Line {}: invalid geometry", line))?;

        let mut coverage = HashMap::new();
        for (idx, name) in &indicator_columns {
            let cell = record.get(*idx).unwrap_or("").trim();
            coverage.insert(name.clone(), cell.parse::<f64>().ok());
        }

        municipalities.push(Municipality {
            code: record.get(code_idx).unwrap_or("").to_string(),
            name: record.get(name_idx).unwrap_or("").to_string(),
            state: record.get(state_idx).unwrap_or("").to_string(),
            geometry,
            coverage,
        });
    }
    if municipalities.is_empty() {
        bail!("Dataset {:?} contains no rows", input.data_file);
    }

    let indicators: Vec<String> = indicator_columns.into_iter().map(|(_, h)| h).collect();
    println!(
        "Loaded {} municipalities with {} indicators (EPSG:{})",
        municipalities.len(),
        indicators.len(),
        input.crs_epsg
    );

    Ok(CoverageLayer::new(municipalities, indicators, input.crs_epsg))
}

fn parse_geometry(wkt_text: &str) -> Result<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> =
        geo::Geometry::try_from_wkt_str(wkt_text).map_err(|e| anyhow!("invalid WKT: {e}"))?;
    match geometry {
        geo::Geometry::MultiPolygon(multi) => Ok(multi),
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        other => bail!("unsupported geometry type: {}", kind_of(&other)),
    }
}

fn kind_of(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
        geo::Geometry::Polygon(_) | geo::Geometry::MultiPolygon(_) => "Polygon",
    }
}
