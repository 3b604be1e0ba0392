use anyhow::{anyhow, Context, Result};
use resvg::{tiny_skia, usvg};

/// The rendering engine for the whole run: owns the SVG parsing options and
/// the font database. Loading system fonts is the expensive part, so the
/// engine is built once before the batch and dropped once after it.
pub struct RenderEngine {
    options: usvg::Options<'static>,
}

impl RenderEngine {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self { options }
    }

    /// Rasterize a composed layout into an RGBA pixmap of the given size.
    pub fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<tiny_skia::Pixmap> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .context("Failed to parse composed layout")?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Invalid raster size {}x{}", width, height))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}
