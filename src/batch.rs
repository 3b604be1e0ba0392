use crate::classify::{BandSet, Symbology};
use crate::config::AppConfig;
use crate::render::RenderEngine;
use crate::{data, export, layout};
use anyhow::Result;
use std::path::PathBuf;

/// What one run produced: the written artifacts plus any indicators whose
/// export failed.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

#[derive(Debug)]
pub struct ExportFailure {
    pub indicator: String,
    pub reason: String,
}

/// Run the whole batch: one map image per indicator, strictly in sequence.
/// A dataset that fails to load (or a broken band table) is fatal before any
/// output; a failed export is reported and the batch moves on.
pub fn run(config: &AppConfig) -> Result<BatchReport> {
    let bands = BandSet::from_config(&config.classification.bands)?;

    // The engine brackets the entire batch: fonts load once here, teardown is
    // its Drop at the end of the run.
    let engine = RenderEngine::new();

    let mut layer = data::load_dataset(config)?;
    let indicators = layer.indicators().to_vec();

    let mut report = BatchReport::default();
    for indicator in &indicators {
        println!("Generating map for {}...", indicator);

        layer.set_symbology(Symbology::new(bands.clone(), indicator.as_str()));
        let title = format!("{} - {}", indicator, config.output.year);
        let path = export::artifact_path(&config.output.base_dir, config.output.year, indicator);

        let result = layout::compose(&layer, &config.layout, &title)
            .and_then(|composed| export::export_png(&engine, &composed, &path));
        match result {
            Ok(()) => report.generated.push(path),
            Err(err) => {
                eprintln!("Failed to export {}: {:#}", indicator, err);
                report.failures.push(ExportFailure {
                    indicator: indicator.clone(),
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    println!(
        "Exported {} of {} maps to {:?}",
        report.generated.len(),
        indicators.len(),
        config.output.base_dir.join("images")
    );
    Ok(report)
}
