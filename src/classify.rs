use crate::config::BandConfig;
use anyhow::{anyhow, bail, Result};

/// A classification band: a coverage interval with its legend label and fill
/// color. Range bands are matched by lower bound; `max` is legend metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub color: String, // Hex code
}

/// The validated band table: range bands sorted by lower bound plus the one
/// degenerate entry labelling missing data.
#[derive(Debug, Clone)]
pub struct BandSet {
    ranges: Vec<Band>,
    no_data: Band,
}

impl BandSet {
    pub fn from_config(bands: &[BandConfig]) -> Result<Self> {
        let mut ranges = Vec::new();
        let mut no_data = None;

        for band in bands {
            if !band.min.is_finite() {
                bail!("Band '{}' has a non-finite lower bound", band.label);
            }
            if band.max < band.min {
                bail!("Band '{}' has max below min", band.label);
            }
            parse_hex_color(&band.color)
                .ok_or_else(|| anyhow!("Band '{}' has invalid color '{}'", band.label, band.color))?;

            let band = Band {
                min: band.min,
                max: band.max,
                label: band.label.clone(),
                color: band.color.clone(),
            };
            if band.min == band.max {
                if no_data.replace(band).is_some() {
                    bail!("Band table has more than one degenerate (no-data) entry");
                }
            } else {
                ranges.push(band);
            }
        }

        let no_data =
            no_data.ok_or_else(|| anyhow!("Band table has no degenerate (no-data) entry"))?;
        if ranges.is_empty() {
            bail!("Band table has no range bands");
        }

        ranges.sort_by(|a, b| a.min.total_cmp(&b.min));
        if ranges[0].min != 0.0 {
            bail!("Range bands must start at 0.0, found {}", ranges[0].min);
        }
        for pair in ranges.windows(2) {
            if pair[0].min == pair[1].min {
                bail!(
                    "Bands '{}' and '{}' share the lower bound {}",
                    pair[0].label,
                    pair[1].label,
                    pair[0].min
                );
            }
        }

        Ok(Self { ranges, no_data })
    }

    /// Classify one coverage cell. Total: the sentinel value, NaN, negatives
    /// and absent cells all take the no-data band; everything else takes the
    /// last range band whose lower bound does not exceed it.
    pub fn classify(&self, value: Option<f64>) -> &Band {
        let Some(value) = value else {
            return &self.no_data;
        };
        if value.is_nan() || value == self.no_data.min {
            return &self.no_data;
        }
        self.ranges
            .iter()
            .rev()
            .find(|band| band.min <= value)
            .unwrap_or(&self.no_data)
    }

    pub fn ranges(&self) -> &[Band] {
        &self.ranges
    }

    pub fn no_data(&self) -> &Band {
        &self.no_data
    }

    /// Legend entries in display order: range bands ascending, no-data last.
    pub fn legend_entries(&self) -> impl Iterator<Item = &Band> {
        self.ranges.iter().chain(std::iter::once(&self.no_data))
    }
}

/// The renderer configuration for one indicator: the band table bound to the
/// column it classifies.
#[derive(Debug, Clone)]
pub struct Symbology {
    column: String,
    bands: BandSet,
}

impl Symbology {
    pub fn new(bands: BandSet, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            bands,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn bands(&self) -> &BandSet {
        &self.bands
    }
}

/// Parse a `#rrggbb` hex color. Returns None on any malformed input.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage_bands() -> Vec<BandConfig> {
        [
            (0.0, 0.799999, "< 80.0", "#e70304"),
            (0.80, 0.899999, "80.0 a 89.9", "#fe941e"),
            (0.90, 0.949999, "90.0 a 94.9", "#eee907"),
            (0.95, 1.0, "95.0 a 100.0", "#15a222"),
            (1.000001, f64::INFINITY, "> 100.0", "#4e27e6"),
            (-9999.0, -9999.0, "Sem informação", "#ffffff"),
        ]
        .into_iter()
        .map(|(min, max, label, color)| BandConfig {
            min,
            max,
            label: label.to_string(),
            color: color.to_string(),
        })
        .collect()
    }

    fn band_set() -> BandSet {
        BandSet::from_config(&coverage_bands()).unwrap()
    }

    #[test]
    fn boundary_values_land_in_the_authored_bands() {
        let bands = band_set();
        assert_eq!(bands.classify(Some(0.799999)).label, "< 80.0");
        assert_eq!(bands.classify(Some(0.80)).label, "80.0 a 89.9");
        assert_eq!(bands.classify(Some(0.899999)).label, "80.0 a 89.9");
        assert_eq!(bands.classify(Some(0.90)).label, "90.0 a 94.9");
        assert_eq!(bands.classify(Some(0.95)).label, "95.0 a 100.0");
        assert_eq!(bands.classify(Some(1.0)).label, "95.0 a 100.0");
        assert_eq!(bands.classify(Some(1.000001)).label, "> 100.0");
        assert_eq!(bands.classify(Some(0.0)).label, "< 80.0");
        assert_eq!(bands.classify(Some(2.5)).label, "> 100.0");
    }

    #[test]
    fn every_real_value_lands_in_exactly_one_band() {
        let bands = band_set();
        // Values between one band's authored max and the next band's min
        // (gaps in the original table) still classify.
        assert_eq!(bands.classify(Some(0.7999995)).label, "< 80.0");
        assert_eq!(bands.classify(Some(0.8999995)).label, "80.0 a 89.9");
        assert_eq!(bands.classify(Some(0.9499995)).label, "90.0 a 94.9");
    }

    #[test]
    fn sentinel_and_missing_take_the_no_data_band() {
        let bands = band_set();
        assert_eq!(bands.classify(Some(-9999.0)).label, "Sem informação");
        assert_eq!(bands.classify(None).label, "Sem informação");
        assert_eq!(bands.classify(Some(f64::NAN)).label, "Sem informação");
        assert_eq!(bands.classify(Some(-0.5)).label, "Sem informação");
    }

    #[test]
    fn sentinel_never_matches_a_real_coverage_value() {
        let bands = band_set();
        for v in [0.0, 0.5, 0.80, 0.95, 1.0, 3.0] {
            assert_ne!(bands.classify(Some(v)).label, "Sem informação");
        }
    }

    #[test]
    fn legend_keeps_authored_order_with_no_data_last() {
        let bands = band_set();
        let labels: Vec<_> = bands.legend_entries().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "< 80.0",
                "80.0 a 89.9",
                "90.0 a 94.9",
                "95.0 a 100.0",
                "> 100.0",
                "Sem informação"
            ]
        );
    }

    #[test]
    fn table_without_no_data_entry_is_rejected() {
        let mut bands = coverage_bands();
        bands.retain(|b| b.min != b.max);
        assert!(BandSet::from_config(&bands).is_err());
    }

    #[test]
    fn duplicate_lower_bounds_are_rejected() {
        let mut bands = coverage_bands();
        bands[1].min = 0.0;
        assert!(BandSet::from_config(&bands).is_err());
    }

    #[test]
    fn table_not_starting_at_zero_is_rejected() {
        let mut bands = coverage_bands();
        bands[0].min = 0.1;
        assert!(BandSet::from_config(&bands).is_err());
    }

    #[test]
    fn malformed_color_is_rejected() {
        let mut bands = coverage_bands();
        bands[0].color = "red".to_string();
        assert!(BandSet::from_config(&bands).is_err());
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#e70304"), Some([0xe7, 0x03, 0x04]));
        assert_eq!(parse_hex_color("#ffffff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("ffffff"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn symbology_binds_the_target_column() {
        let symbology = Symbology::new(band_set(), "BCG");
        assert_eq!(symbology.column(), "BCG");
        assert_eq!(symbology.bands().ranges().len(), 5);
    }
}
