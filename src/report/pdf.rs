//! PDF encoding of a laid-out report
//!
//! Uses the three built-in Helvetica faces with WinAnsiEncoding, so no font
//! data is embedded and output is byte-stable for a given layout.

use super::layout::{DrawOp, Font, ReportLayout, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use super::catalog::REPORT_TITLE;
use crate::error::{Result, ScreeningError};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

fn font_key(font: Font) -> &'static [u8] {
    match font {
        Font::Regular => b"F1",
        Font::Bold => b"F2",
        Font::Oblique => b"F3",
    }
}

/// Encode text for a WinAnsi font. Unmappable characters become '?'.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2026}' => 0x85,
            '\u{20ac}' => 0x80,
            _ => b'?',
        })
        .collect()
}

fn color_operands(color: Rgb) -> Vec<Object> {
    [color.0, color.1, color.2]
        .iter()
        .map(|c| Object::from(*c as f32 / 255.0))
        .collect()
}

fn page_operations(ops: &[DrawOp]) -> Vec<Operation> {
    let mut out = Vec::new();

    for op in ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                out.push(Operation::new("rg", color_operands(*color)));
                out.push(Operation::new(
                    "re",
                    vec![
                        Object::from(*x),
                        Object::from(PAGE_HEIGHT - y - height),
                        Object::from(*width),
                        Object::from(*height),
                    ],
                ));
                out.push(Operation::new("f", vec![]));
            }
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font_key(*font).to_vec()), Object::from(*size)],
                ));
                out.push(Operation::new("rg", color_operands(*color)));
                out.push(Operation::new(
                    "Td",
                    vec![Object::from(*x), Object::from(PAGE_HEIGHT - y)],
                ));
                out.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
                out.push(Operation::new("ET", vec![]));
            }
        }
    }

    out
}

/// Encode the layout as a complete PDF document
pub fn encode(layout: &ReportLayout) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for (key, base) in [
        (Font::Regular, "Helvetica"),
        (Font::Bold, "Helvetica-Bold"),
        (Font::Oblique, "Helvetica-Oblique"),
    ] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font_key(key).to_vec(), font_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = page_operations(&page.ops);
        operations.extend(page_operations(&page.footer));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ScreeningError::ReportFailed(format!("content encoding: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::from(0.0_f32),
            Object::from(0.0_f32),
            Object::from(PAGE_WIDTH),
            Object::from(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal("retina-screen"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ScreeningError::ReportFailed(format!("pdf write: {}", e)))?;

    tracing::debug!(
        "[Report] Encoded {} page(s), {} bytes",
        layout.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}
