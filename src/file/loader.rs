//! Definition archive loading.
//!
//! Archives are zip files whose `.xml` entries are definition documents. Every
//! other entry (directories, images, readme files) is skipped. Parsing is
//! all-or-nothing: the first entry that fails to read, decode or parse aborts
//! the whole archive.

use crate::document::parser::parse_document;
use crate::document::store::LoadError;
use crate::document::tree::Document;
use anyhow::{Context, Result};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Entry-name suffix that marks a definition document.
pub const DOCUMENT_EXTENSION: &str = ".xml";

/// Parses every `.xml` entry of a zip archive, in archive order.
///
/// # Errors
///
/// Returns a `LoadError` if:
/// - The bytes are not a readable zip archive
/// - An `.xml` entry cannot be read or decompressed
/// - An `.xml` entry is not valid UTF-8
/// - An `.xml` entry is not well-formed XML
pub fn parse_archive(bytes: &[u8]) -> Result<Vec<Document>, LoadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut documents = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if entry.is_dir() || !is_document_entry(&name) {
            debug!(entry = %name, "skipping non-document entry");
            continue;
        }

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut raw).map_err(|source| LoadError::Read {
            entry: name.clone(),
            source,
        })?;
        let text = String::from_utf8(raw).map_err(|source| LoadError::Encoding {
            entry: name.clone(),
            source,
        })?;
        let document = parse_document(&name, strip_bom(&text)).map_err(|source| {
            warn!(entry = %name, error = %source, "archive entry failed to parse");
            LoadError::Parse {
                entry: name.clone(),
                source,
            }
        })?;
        documents.push(document);
    }

    Ok(documents)
}

/// Reads an archive from disk.
pub fn read_archive_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path_ref = path.as_ref();
    fs::read(path_ref).with_context(|| format!("Failed to read archive {}", path_ref.display()))
}

/// Determines whether an archive entry holds a definition document.
///
/// Matching is on the raw entry name, case-sensitive:
/// - `Defs/ThingDefs/Items.xml` → true
/// - `Defs/readme.txt` → false
/// - `Defs/ITEMS.XML` → false
fn is_document_entry(name: &str) -> bool {
    name.ends_with(DOCUMENT_EXTENSION)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_is_document_entry() {
        assert!(is_document_entry("Defs/ThingDefs/Items.xml"));
        assert!(!is_document_entry("Defs/readme.txt"));
        assert!(!is_document_entry("Defs/ITEMS.XML"));
    }

    #[test]
    fn test_parse_archive_skips_other_entries() {
        let bytes = archive(&[
            ("Defs/A.xml", "<Defs><ThingDef /></Defs>"),
            ("Defs/notes.txt", "not xml at all <"),
            ("Defs/B.xml", "<Defs />"),
        ]);
        let documents = parse_archive(&bytes).unwrap();
        let ids: Vec<&str> = documents.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["Defs/A.xml", "Defs/B.xml"]);
    }

    #[test]
    fn test_parse_archive_strips_bom() {
        let bytes = archive(&[("A.xml", "\u{feff}<Defs />")]);
        let documents = parse_archive(&bytes).unwrap();
        assert_eq!(documents[0].root().tag(), Some("Defs"));
    }

    #[test]
    fn test_parse_archive_reports_failing_entry() {
        let bytes = archive(&[("Good.xml", "<Defs />"), ("Bad.xml", "<Defs><A></Defs>")]);
        let err = parse_archive(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::Parse { ref entry, .. } if entry == "Bad.xml"));
        assert!(err.to_string().contains("Bad.xml"));
    }

    #[test]
    fn test_parse_archive_rejects_garbage() {
        let result = parse_archive(b"definitely not a zip file");
        assert!(matches!(result, Err(LoadError::Archive(_))));
    }

    #[test]
    fn test_read_archive_file() {
        use tempfile::NamedTempFile;

        let bytes = archive(&[("A.xml", "<Defs />")]);
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), &bytes).unwrap();

        let read = read_archive_file(temp_file.path()).unwrap();
        assert_eq!(parse_archive(&read).unwrap().len(), 1);

        let missing = read_archive_file(temp_file.path().with_extension("missing"));
        assert!(missing.unwrap_err().to_string().contains("Failed to read archive"));
    }
}
