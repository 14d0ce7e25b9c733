use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

const DOCX_BODY: &str = "word/document.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Plain text of a `.docx` body: runs concatenated, one line per paragraph.
pub fn docx_text(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, DOCX_BODY)?;
    wordprocessing_text(&xml)
}

/// Plain text of every slide in a `.pptx`, in slide order.
pub fn pptx_text(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut text = String::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        text.push_str(&drawing_text(&xml)?);
    }
    Ok(text)
}

fn open_archive(path: &Path) -> Result<zip::ZipArchive<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    zip::ZipArchive::new(file).with_context(|| format!("{} is not a zip container", path.display()))
}

fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name).with_context(|| format!("missing entry {name}"))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).with_context(|| format!("reading {name}"))?;
    Ok(xml)
}

/// `ppt/slides/slide12.xml` -> 12. Layouts, notes and rels never match.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?.strip_suffix(".xml")?.parse().ok()
}

/// WordprocessingML: `w:t` runs, `w:tab`, `w:br`, paragraph ends on `w:p`.
pub fn wordprocessing_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().context("malformed document.xml")? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// DrawingML text bodies: `a:t` runs, one line per `a:p`.
pub fn drawing_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().context("malformed slide xml")? {
            Event::Start(e) if e.name().as_ref() == b"a:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"a:br" => out.push('\n'),
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_runs_join_into_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Solar</w:t></w:r><w:r><w:t xml:space="preserve"> panels</w:t></w:r></w:p>
            <w:p><w:r><w:t>A</w:t><w:tab/><w:t>B &amp; C</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = wordprocessing_text(xml).unwrap();
        assert_eq!(text, "Solar panels\nA\tB & C\n");
    }

    #[test]
    fn slide_runs_end_lines_per_paragraph() {
        let xml = r#"<p:sld><p:cSld><p:spTree><p:sp><p:txBody>
            <a:p><a:r><a:t>Title</a:t></a:r></a:p>
            <a:p><a:r><a:t>Point one</a:t></a:r></a:p>
        </p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;
        assert_eq!(drawing_text(xml).unwrap(), "Title\nPoint one\n");
    }

    #[test]
    fn slide_names_parse_numerically() {
        assert_eq!(slide_number("ppt/slides/slide10.xml"), Some(10));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }
}
