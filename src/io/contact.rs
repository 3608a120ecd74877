use anyhow::Context;

use crate::model::ContactMatrix;

/// Load a square contact matrix from CSV. Non-numeric cells (a header row or a
/// leading label column) are skipped; every remaining row must hold the same
/// number of numeric cells.
pub fn load_contact_matrix_csv(path: &str) -> anyhow::Result<ContactMatrix> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open contact CSV: {}", path))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("Failed to read contact CSV: {}", path))?;
        let row: Vec<f64> = record.iter().filter_map(|f| f.trim().parse::<f64>().ok()).collect();
        if !row.is_empty() { rows.push(row); }
    }

    let n = rows.len();
    anyhow::ensure!(n > 0, "contact matrix empty or unparsable: {}", path);
    anyhow::ensure!(rows.iter().all(|r| r.len() == n), "contact matrix must be square (n x n): {}", path);
    let m = ContactMatrix::new(rows);
    m.check(n, path)?;
    Ok(m)
}
