//! Batch rendering of named figures into an output directory.

use crate::domain::errors::VizError;
use crate::domain::figure::Figure;
use crate::infrastructure::plotting::{RenderSettings, render_figure};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Renders each `(stem, figure)` pair to `out_dir/<stem>.<ext>`.
///
/// The directory is created when missing. Files are rendered on the rayon pool when
/// `settings.parallel` is set; either way the returned paths follow job order and the
/// first failure aborts the batch.
pub fn render_batch(
    jobs: &[(&str, Figure)],
    out_dir: &Path,
    settings: &RenderSettings,
) -> Result<Vec<PathBuf>, VizError> {
    fs::create_dir_all(out_dir).map_err(|e| VizError::io(out_dir, e))?;

    let render_one = |(name, figure): &(&str, Figure)| -> Result<PathBuf, VizError> {
        let path = out_dir.join(format!("{}.{}", name, settings.format.extension()));
        render_figure(figure, &path, settings)?;
        Ok(path)
    };

    let paths = if settings.parallel {
        jobs.par_iter().map(render_one).collect::<Result<Vec<_>, _>>()?
    } else {
        jobs.iter().map(render_one).collect::<Result<Vec<_>, _>>()?
    };

    info!(
        "Rendered {} figures into {} ({})",
        paths.len(),
        out_dir.display(),
        settings.format.extension()
    );
    Ok(paths)
}
