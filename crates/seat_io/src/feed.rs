//! Results-feed snapshots: `;`-delimited text, first line is the header.
//!
//! Cells and header names are trimmed; quoted cells are unquoted; blank lines
//! are skipped; a short row leaves its trailing columns empty. Only local
//! files are read.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::{looks_like_url_strict, IoError, IoResult};

pub const DELIMITER: u8 = b';';

/// Column → cell text.
pub type FeedRow = BTreeMap<String, String>;

/// Parse snapshot text into rows.
pub fn parse_feed_str(text: &str) -> IoResult<Vec<FeedRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(IoError::Feed("empty snapshot (no header row)".into()));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: FeedRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "feed snapshot parsed");
    Ok(rows)
}

/// Read and parse a local snapshot; returns the rows and the raw bytes.
pub fn load_feed(path: &Path) -> IoResult<(Vec<FeedRow>, Vec<u8>)> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::UrlRejected(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let rows = parse_feed_str(&text)?;
    Ok((rows, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows() {
        let text = "gebiet-nr; D ;D1;D2\n1;100;60;40\n\n2;80;30\n";
        let rows = parse_feed_str(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["D"], "100");
        assert_eq!(rows[1]["D2"], "");
        assert_eq!(rows[1]["gebiet-nr"], "2");
    }

    #[test]
    fn windows_line_endings_and_bom() {
        let text = "\u{feff}gebiet-nr;D\r\n7;10\r\n";
        let rows = parse_feed_str(text).unwrap();
        assert_eq!(rows[0]["gebiet-nr"], "7");
        assert_eq!(rows[0]["D"], "10");
    }

    #[test]
    fn quoted_cells_are_unquoted() {
        let text = "\"gebiet-nr\";\"D\";\"D1\";\"name\"\n\"1\";\"100\";\"60\";\"Nord; Mitte\"\n";
        let rows = parse_feed_str(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["gebiet-nr"], "1");
        assert_eq!(rows[0]["D"], "100");
        assert_eq!(rows[0]["D1"], "60");
        assert_eq!(rows[0]["name"], "Nord; Mitte");
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(matches!(parse_feed_str("  \n"), Err(IoError::Feed(_))));
    }

    #[test]
    fn urls_are_rejected() {
        let err = load_feed(Path::new("https://wahlen.example/feed.csv")).unwrap_err();
        assert!(matches!(err, IoError::UrlRejected(_)));
    }
}
