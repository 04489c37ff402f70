//! Plain text to PDF
//!
//! One line per fixed-height cell on A4 pages, Helvetica 12pt. Every cell
//! gets its own text object so extraction yields the lines back.

use super::ConvertError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MM: f32 = 72.0 / 25.4;
const MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 15.0 * MM;
const CELL_HEIGHT: f32 = 10.0 * MM;
const FONT_SIZE: f32 = 12.0;

/// Render text into a PDF document
pub fn text_to_pdf(text: &str) -> Result<Vec<u8>, ConvertError> {
    let lines: Vec<String> = text
        .lines()
        .map(|line| encodable(line.trim()))
        .flat_map(|line| wrap(&line, PAGE_WIDTH - 2.0 * MARGIN))
        .collect();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page_lines in paginate(&lines) {
        let page_id = add_page(&mut doc, pages_id, resources_id, page_lines)?;
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).map_err(|e| ConvertError::Build(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ConvertError::Build(e.to_string()))?;
    Ok(out)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    lines: &[String],
) -> Result<ObjectId, ConvertError> {
    let mut operations = Vec::new();
    let mut top = PAGE_HEIGHT - MARGIN;
    for line in lines {
        if !line.is_empty() {
            // Baseline sits roughly centred in the cell
            let baseline = top - CELL_HEIGHT / 2.0 - FONT_SIZE * 0.3;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
            operations.push(Operation::new("Td", vec![MARGIN.into(), baseline.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(win_ansi_bytes(line))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        top -= CELL_HEIGHT;
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| ConvertError::Build(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "Contents" => content_id,
    }))
}

fn lines_per_page() -> usize {
    let usable = PAGE_HEIGHT - MARGIN - BOTTOM_MARGIN;
    // Truncation is intended: a partial cell would cross the bottom margin
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (usable / CELL_HEIGHT).floor() as usize;
    count.max(1)
}

/// Split lines into pages; an empty document still gets one blank page
fn paginate(lines: &[String]) -> Vec<&[String]> {
    if lines.is_empty() {
        return vec![&[]];
    }
    lines.chunks(lines_per_page()).collect()
}

/// Replace characters the built-in font cannot show with `?`
fn encodable(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\t' => ' ',
            ' '..='~' | '\u{a0}'..='\u{ff}' => c,
            _ => '?',
        })
        .collect()
}

/// Latin-1 bytes for an already-encodable line
fn win_ansi_bytes(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Rough Helvetica advance width in points
fn char_width(c: char) -> f32 {
    let em = match c {
        'i' | 'j' | 'l' | 't' | 'f' | 'I' | '.' | ',' | ';' | ':' | '!' | '\'' | '|' | ' ' => 0.28,
        'm' | 'w' | 'M' | 'W' | '@' => 0.89,
        'A'..='Z' => 0.67,
        _ => 0.56,
    };
    em * FONT_SIZE
}

/// Break a line on spaces so each piece fits `max_width`; a single word wider
/// than the line is split mid-word.
fn wrap(line: &str, max_width: f32) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;

    for word in line.split(' ') {
        let word_width: f32 = word.chars().map(char_width).sum();
        let space = if current.is_empty() { 0.0 } else { char_width(' ') };
        if width + space + word_width <= max_width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            width += space + word_width;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            width = 0.0;
        }
        for c in word.chars() {
            let w = char_width(c);
            if width + w > max_width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                width = 0.0;
            }
            current.push(c);
            width += w;
        }
    }
    out.push(current);
    out
}
