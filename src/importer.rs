use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::RawRow;

/// Read every row of a statement export. Columns are matched by header name,
/// so their order in the file does not matter. Only header names are trimmed;
/// field text reaches the later stages exactly as scanned.
pub fn load_rows(file_path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(std::io::BufReader::new(file));

    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<RawRow>, _>>()?;

    debug!(path = %file_path.display(), "input file read");
    info!("Loaded {} rows from {}", rows.len(), file_path.display());
    Ok(rows)
}
