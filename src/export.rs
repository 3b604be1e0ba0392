use crate::layout::Layout;
use crate::render::RenderEngine;
use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Output path for one indicator: `<base>/images/<year>_<indicator>.png`,
/// with `/` replaced since it cannot appear in a file name.
pub fn artifact_path(base_dir: &Path, year: u16, indicator: &str) -> PathBuf {
    let safe = indicator.replace('/', " ");
    base_dir.join("images").join(format!("{year}_{safe}.png"))
}

/// Rasterize the layout and write it as PNG, creating the output directory if
/// absent. An existing file of the same name is overwritten.
pub fn export_png(engine: &RenderEngine, layout: &Layout, path: &Path) -> Result<()> {
    let pixmap = engine.rasterize(layout.svg(), layout.width_px(), layout.height_px())?;
    let (width, height) = (pixmap.width(), pixmap.height());
    // The layout's page background keeps every pixel opaque, so the
    // premultiplied buffer already is straight RGBA.
    let img = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| anyhow!("Raster buffer does not match {}x{}", width, height))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    img.save(path)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn artifact_names_follow_year_and_indicator() {
        let path = artifact_path(Path::new("/base"), 2023, "BCG");
        assert_eq!(path, Path::new("/base/images/2023_BCG.png"));
    }

    #[test]
    fn slashes_in_indicator_names_are_replaced() {
        let path = artifact_path(Path::new("out"), 2023, "Polio 1/2/3");
        assert_eq!(path, Path::new("out/images/2023_Polio 1 2 3.png"));
    }
}
