use std::path::Path;

use sha2::{Digest, Sha256};
use time::Date;

use sayit_core::{dates, line, DocumentMeta, Line};

use crate::error::{ImportError, Result};

/// The extracted text of one transcript and what is known about it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub meta: DocumentMeta,
    pub lines: Vec<Line>,
}

impl SourceDocument {
    pub fn from_text(meta: DocumentMeta, text: &str) -> Self {
        Self {
            meta,
            lines: line::split_document(text),
        }
    }

    /// Read a text file. The file stem becomes the document id and a date in
    /// it (`2011-11-14am`, `FOMC20080318meeting`) the document date.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut meta = DocumentMeta::new(id);
        meta.date = date_in_id(&meta.id);
        Ok(Self::from_text(meta, &text))
    }

    /// SHA-256 of the document lines, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for line in &self.lines {
            hasher.update(line.text.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// A leading ISO date, or the first run of eight digits read as `YYYYMMDD`.
fn date_in_id(id: &str) -> Option<Date> {
    if let Some(date) = id.get(..10).and_then(dates::parse_iso_date) {
        return Some(date);
    }
    id.split(|c: char| !c.is_ascii_digit())
        .find(|digits| digits.len() == 8)
        .and_then(|d| dates::parse_iso_date(&format!("{}-{}-{}", &d[..4], &d[4..6], &d[6..])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn dates_from_ids() {
        let iso = |s| dates::parse_iso_date(s);
        assert_eq!(date_in_id("2011-11-14am"), iso("2011-11-14"));
        assert_eq!(date_in_id("FOMC20080318meeting"), iso("2008-03-18"));
        assert_eq!(date_in_id("sm032714"), None);
        assert_eq!(date_in_id(""), None);
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2012-01-17pm.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "one\ntwo").unwrap();

        let doc = SourceDocument::from_path(&path).unwrap();
        assert_eq!(doc.meta.id, "2012-01-17pm");
        assert_eq!(doc.meta.date, dates::parse_iso_date("2012-01-17"));
        assert_eq!(doc.lines[1].text, "two");
        assert_eq!(doc.digest().len(), 64);
    }

    #[test]
    fn digest_follows_content() {
        let meta = DocumentMeta::new("a");
        let a = SourceDocument::from_text(meta.clone(), "x\ny");
        let b = SourceDocument::from_text(DocumentMeta::new("b"), "x\ny");
        let c = SourceDocument::from_text(meta, "x\nz");
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn missing_file() {
        let err = SourceDocument::from_path(Path::new("/nonexistent/x.txt")).unwrap_err();
        assert!(matches!(err, ImportError::Read { .. }));
    }
}
