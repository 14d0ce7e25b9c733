use std::io::Write;
use std::path::Path;

use docqa_core::traits::TextExtractor;
use docqa_core::Error;
use docqa_extract::{DocumentExtractor, DocumentFormat};
use zip::write::FileOptions;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn slide(text: &str) -> String {
    format!(r#"<p:sld><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#)
}

#[test]
fn docx_paragraphs_come_out_as_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.DOCX");
    write_zip(
        &path,
        &[(
            "word/document.xml",
            r#"<w:document><w:body><w:p><w:r><w:t>Water boils at 100 degrees.</w:t></w:r></w:p><w:p><w:r><w:t>The sky is blue.</w:t></w:r></w:p></w:body></w:document>"#,
        )],
    );
    let text = DocumentExtractor::new().extract(&path).unwrap();
    assert_eq!(text, "Water boils at 100 degrees.\nThe sky is blue.\n");
}

#[test]
fn pptx_slides_follow_numeric_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    let (s1, s2, s10) = (slide("first"), slide("second"), slide("tenth"));
    write_zip(
        &path,
        &[
            ("ppt/slides/slide10.xml", s10.as_str()),
            ("ppt/slides/slide2.xml", s2.as_str()),
            ("ppt/slides/slide1.xml", s1.as_str()),
            ("ppt/slideLayouts/slideLayout1.xml", slide("layout").as_str()),
        ],
    );
    let text = DocumentExtractor::new().extract(&path).unwrap();
    assert_eq!(text, "first\nsecond\ntenth\n");
}

#[test]
fn plain_text_is_read_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, b"caf\xe9 notes").unwrap();
    let text = DocumentExtractor::new().extract(&path).unwrap();
    assert!(text.starts_with("caf"));
    assert!(text.ends_with(" notes"));
}

#[test]
fn missing_and_unsupported_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = DocumentExtractor::new().extract(&dir.path().join("absent.pdf")).unwrap_err();
    assert!(matches!(missing, Error::NotFound(_)));

    let odd = dir.path().join("image.png");
    std::fs::write(&odd, b"\x89PNG").unwrap();
    let unsupported = DocumentExtractor::new().extract(&odd).unwrap_err();
    assert!(matches!(unsupported, Error::UnsupportedFormat(_)));
}

#[test]
fn corrupt_container_yields_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    std::fs::write(&path, b"not a zip at all").unwrap();
    assert_eq!(DocumentExtractor::new().extract(&path).unwrap(), "");
}

#[test]
fn malformed_pdfs_yield_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [
        ("garbage.pdf", &b"definitely not a pdf"[..]),
        ("truncated.pdf", &b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\ntrailer\n<< /Root 1 0 R"[..]),
        ("empty.pdf", &b""[..]),
    ] {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        assert_eq!(DocumentExtractor::new().extract(&path).unwrap(), "", "{name}");
    }
}

#[test]
fn format_detection_ignores_case() {
    assert_eq!(DocumentFormat::from_path(Path::new("a/B.PdF")), Some(DocumentFormat::Pdf));
    assert_eq!(DocumentFormat::from_path(Path::new("readme")), None);
}
