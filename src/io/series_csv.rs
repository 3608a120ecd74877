use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::TimeSeries;

/// Write the tidy table (`day,label,compartment,value`) to `path`, creating
/// parent directories as needed.
pub fn write_tidy_csv(path: impl AsRef<Path>, series: &TimeSeries) -> anyhow::Result<PathBuf> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create output dir failed (path={:?})", dir))?;
    }
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create tidy CSV failed (path={:?})", path))?;
    for row in series.tidy_rows() {
        wtr.serialize(&row).with_context(|| format!("write tidy row failed at day {}", row.day))?;
    }
    wtr.flush().context("flush tidy CSV failed")?;
    Ok(path.to_path_buf())
}
