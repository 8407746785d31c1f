//! DOCX text extraction.
//!
//! A .docx file is a zip container; body text lives in `word/document.xml`.
//! Each `<w:p>` paragraph becomes one line of output, in document order.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn token_pattern() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        // Self-closing forms must come before their open-tag counterparts.
        Regex::new(
            r#"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>|</w:p>|<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(?P<text>.*?)</w:t>|<w:tab\s*/>|<w:br(?:\s[^>]*)?/>|<w:cr(?:\s[^>]*)?/>"#,
        )
        .expect("docx token pattern is valid")
    })
}

fn entity_pattern() -> &'static Regex {
    static ENTITIES: OnceLock<Regex> = OnceLock::new();
    ENTITIES.get_or_init(|| {
        Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").expect("entity pattern is valid")
    })
}

/// Reads the paragraphs of a .docx file, one per line.
pub fn extract_docx_text(path: &Path) -> Result<String, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    Ok(paragraphs_to_text(&xml))
}

/// Converts WordprocessingML body XML into newline-terminated paragraphs.
pub fn paragraphs_to_text(xml: &str) -> String {
    let mut text = String::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for token in token_pattern().captures_iter(xml) {
        let whole = &token[0];
        if let Some(run) = token.name("text") {
            if depth > 0 {
                current.push_str(&decode_entities(run.as_str()));
            }
        } else if whole == "</w:p>" {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                text.push_str(&current);
                text.push('\n');
                current.clear();
            }
        } else if whole.starts_with("<w:p") {
            if whole.ends_with("/>") {
                if depth == 0 {
                    text.push('\n');
                }
            } else {
                depth += 1;
            }
        } else if whole.starts_with("<w:tab") {
            if depth > 0 {
                current.push('\t');
            }
        } else if (whole.starts_with("<w:br") || whole.starts_with("<w:cr")) && depth > 0 {
            current.push('\n');
        }
    }

    text
}

fn decode_entities(raw: &str) -> String {
    entity_pattern()
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>John Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Software Engineer at </w:t></w:r><w:r><w:t>Acme &amp; Co</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Skills:</w:t><w:tab/><w:t>Python, Go</w:t></w:r></w:p>
    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
    <w:sectPr/>
  </w:body>
</w:document>"#;

    fn write_docx(dir: &Path, name: &str, document_xml: Option<&str>) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        if let Some(xml) = document_xml {
            zip.start_file(DOCUMENT_PART, options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_paragraphs_in_document_order() {
        let text = paragraphs_to_text(BODY);
        assert_eq!(
            text,
            "John Doe\nSoftware Engineer at Acme & Co\n\nSkills:\tPython, Go\nCell\n"
        );
    }

    #[test]
    fn test_tab_stop_definitions_are_not_text() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
        assert_eq!(paragraphs_to_text(xml), "x\n");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &quot;c&quot; &apos;d&apos;"), "a <b> \"c\" 'd'");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_extract_docx_text_from_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "resume.docx", Some(BODY));
        let text = extract_docx_text(&path).unwrap();
        assert!(text.starts_with("John Doe\n"));
        assert!(text.contains("Python, Go"));
    }

    #[test]
    fn test_docx_without_document_part_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "broken.docx", None);
        assert!(matches!(extract_docx_text(&path), Err(DocxError::Zip(_))));
    }

    #[test]
    fn test_non_zip_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, b"\xD0\xCF\x11\xE0 legacy OLE document").unwrap();
        assert!(extract_docx_text(&path).is_err());
    }

    #[test]
    fn test_extractor_trims_docx_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(dir.path(), "resume.docx", Some(BODY));
        let text = crate::extraction::TextExtractor::default()
            .extract(&path, ".docx")
            .unwrap();
        assert!(text.ends_with("Cell"));
    }
}
