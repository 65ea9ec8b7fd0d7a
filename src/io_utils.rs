//! I/O helpers for CSV reading and delimiter resolution.
//!
//! All CSV input in attr-discovery flows through this module: extension-based
//! delimiter auto-detection (`.csv` → comma, `.tsv` → tab) with manual
//! override, and reader construction with consistent quoting settings.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    Ok(builder.from_reader(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_resolution_prefers_override() {
        let path = PathBuf::from("data.tsv");
        assert_eq!(resolve_input_delimiter(&path, Some(b';')), b';');
        assert_eq!(resolve_input_delimiter(&path, None), DEFAULT_TSV_DELIMITER);
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("data.csv"), None),
            DEFAULT_CSV_DELIMITER
        );
    }
}
