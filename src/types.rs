use crate::classify::Symbology;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::{MultiPolygon, Rect};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Municipality {
    pub code: String,
    pub name: String,
    pub state: String,
    pub geometry: MultiPolygon<f64>,
    // Map<IndicatorName, coverage fraction>; None marks an empty or
    // unparseable cell.
    pub coverage: HashMap<String, Option<f64>>,
}

/// The one shared dataset layer. Loaded once; the only mutation afterwards is
/// swapping the active symbology between indicators.
#[derive(Debug)]
pub struct CoverageLayer {
    municipalities: Vec<Municipality>,
    indicators: Vec<String>,
    crs_epsg: u32,
    symbology: Option<Symbology>,
}

impl CoverageLayer {
    pub fn new(municipalities: Vec<Municipality>, indicators: Vec<String>, crs_epsg: u32) -> Self {
        Self {
            municipalities,
            indicators,
            crs_epsg,
            symbology: None,
        }
    }

    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    /// Indicator columns in header order.
    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    pub fn crs_epsg(&self) -> u32 {
        self.crs_epsg
    }

    pub fn set_symbology(&mut self, symbology: Symbology) {
        self.symbology = Some(symbology);
    }

    pub fn symbology(&self) -> Option<&Symbology> {
        self.symbology.as_ref()
    }

    /// Spatial extent of the whole dataset, or None when no geometry has a
    /// bounding rect.
    pub fn extent(&self) -> Option<Rect<f64>> {
        let mut extent: Option<Rect<f64>> = None;
        for municipality in &self.municipalities {
            let Some(rect) = municipality.geometry.bounding_rect() else {
                continue;
            };
            extent = Some(match extent {
                None => rect,
                Some(acc) => Rect::new(
                    geo::Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    geo::Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                ),
            });
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    fn municipality(code: &str, geometry: MultiPolygon<f64>) -> Municipality {
        Municipality {
            code: code.to_string(),
            name: format!("Município {code}"),
            state: "SP".to_string(),
            geometry,
            coverage: HashMap::new(),
        }
    }

    #[test]
    fn extent_spans_all_municipalities() {
        let layer = CoverageLayer::new(
            vec![
                municipality("1", square(0.0, 0.0, 1.0)),
                municipality("2", square(4.0, 2.0, 2.0)),
            ],
            vec![],
            4674,
        );
        let extent = layer.extent().unwrap();
        assert_eq!(extent.min().x, 0.0);
        assert_eq!(extent.min().y, 0.0);
        assert_eq!(extent.max().x, 6.0);
        assert_eq!(extent.max().y, 4.0);
    }

    #[test]
    fn empty_layer_has_no_extent() {
        let layer = CoverageLayer::new(vec![], vec![], 4674);
        assert!(layer.extent().is_none());
    }
}
