//! DOCX template fill.
//!
//! A `.docx` is a zip archive; the pre-authored quote templates carry
//! `{{placeholder}}` tokens in their XML parts. Filling means copying the
//! archive entry by entry and substituting tokens in the document body,
//! headers and footers. Errors here never surface to the caller - the
//! renderer treats this stage as unavailable and falls through.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Preferred template filenames, probed in order before falling back to the
/// first `.docx` in the directory.
const KNOWN_TEMPLATE_NAMES: &[&str] = &["quote_template.docx", "anti_heeling_quote.docx"];

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

#[derive(Debug, Error)]
pub enum DocxTemplateError {
    #[error("no quote template found under {0}")]
    NotFound(PathBuf),
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),
    #[error("template archive is malformed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Locate a template in `dir` and fill it with `fields`.
pub fn fill_from_dir(
    dir: &Path,
    fields: &HashMap<String, String>,
) -> Result<Vec<u8>, DocxTemplateError> {
    let template = find_template(dir)?;
    fill_template(&template, fields)
}

/// First matching known filename, else the first `.docx` found.
pub fn find_template(dir: &Path) -> Result<PathBuf, DocxTemplateError> {
    for name in KNOWN_TEMPLATE_NAMES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("docx"))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    entries
        .into_iter()
        .next()
        .ok_or_else(|| DocxTemplateError::NotFound(dir.to_path_buf()))
}

/// Copy the archive, substituting placeholders in the text-bearing parts.
pub fn fill_template(
    path: &Path,
    fields: &HashMap<String, String>,
) -> Result<Vec<u8>, DocxTemplateError> {
    let bytes = fs::read(path)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;

        if is_text_part(&name) {
            let xml = String::from_utf8_lossy(&data).into_owned();
            data = substitute(&xml, fields).into_bytes();
        }

        writer.start_file(name, options)?;
        writer.write_all(&data)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.starts_with("word/header") && name.ends_with(".xml"))
        || (name.starts_with("word/footer") && name.ends_with(".xml"))
}

/// Replace `{{token}}` with the field value, XML-escaped. Unknown tokens
/// substitute to the empty string, matching the plain-text filler. Newlines
/// in a value become explicit line breaks in the document field.
fn substitute(xml: &str, fields: &HashMap<String, String>) -> String {
    TOKEN_RE
        .replace_all(xml, |caps: &regex::Captures| {
            let value = fields.get(&caps[1]).cloned().unwrap_or_default();
            xml_escape(&value).replace('\n', "</w:t><w:br/><w:t>")
        })
        .into_owned()
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_docx(body_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(body_xml.as_bytes()).unwrap();
        writer.start_file("word/_rels/document.xml.rels", options).unwrap();
        writer.write_all(b"<Relationships/>").unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn read_part(buffer: &[u8], part: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(buffer.to_vec())).unwrap();
        let mut entry = archive.by_name(part).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_substitutes_in_document_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_template.docx");
        std::fs::write(&path, fake_docx("<w:t>{{project_name}} / {{total_price}}</w:t>")).unwrap();

        let buffer =
            fill_template(&path, &fields(&[("project_name", "MV Test"), ("total_price", "100000")]))
                .unwrap();
        let body = read_part(&buffer, "word/document.xml");
        assert_eq!(body, "<w:t>MV Test / 100000</w:t>");
    }

    #[test]
    fn test_values_are_xml_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_template.docx");
        std::fs::write(&path, fake_docx("<w:t>{{notes}}</w:t>")).unwrap();

        let buffer = fill_template(&path, &fields(&[("notes", "a < b & c")])).unwrap();
        let body = read_part(&buffer, "word/document.xml");
        assert_eq!(body, "<w:t>a &lt; b &amp; c</w:t>");
    }

    #[test]
    fn test_unknown_tokens_substitute_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_template.docx");
        std::fs::write(&path, fake_docx("<w:t>[{{missing}}]</w:t>")).unwrap();

        let buffer = fill_template(&path, &HashMap::new()).unwrap();
        assert_eq!(read_part(&buffer, "word/document.xml"), "<w:t>[]</w:t>");
    }

    #[test]
    fn test_known_name_preferred_over_other_docx() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aaa.docx"), fake_docx("<w:t>other</w:t>")).unwrap();
        std::fs::write(
            dir.path().join("quote_template.docx"),
            fake_docx("<w:t>known</w:t>"),
        )
        .unwrap();

        let found = find_template(dir.path()).unwrap();
        assert!(found.ends_with("quote_template.docx"));
    }

    #[test]
    fn test_first_docx_used_when_no_known_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zzz.docx"), fake_docx("<w:t>z</w:t>")).unwrap();
        std::fs::write(dir.path().join("aaa.docx"), fake_docx("<w:t>a</w:t>")).unwrap();

        let found = find_template(dir.path()).unwrap();
        assert!(found.ends_with("aaa.docx"));
    }

    #[test]
    fn test_missing_directory_reports_not_found() {
        let result = fill_from_dir(Path::new("/nonexistent-template-dir"), &HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_archive_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_template.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        assert!(fill_template(&path, &HashMap::new()).is_err());
    }
}
