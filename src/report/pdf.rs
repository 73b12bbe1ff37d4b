//! Minimal single-page PDF writer.
//!
//! Only what the sheets need: text in the two standard Helvetica faces and
//! stroked rectangles. Coordinates are PDF points with the origin at the
//! bottom-left corner.

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text(TextItem),
    Rect(Rect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn new(width: f32, height: f32) -> Self {
        Page {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: impl Into<String>) {
        self.items.push(PageItem::Text(TextItem {
            font,
            size,
            x,
            y,
            text: text.into(),
        }));
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.items.push(PageItem::Rect(Rect {
            x,
            y,
            width,
            height,
        }));
    }

    /// Text of every text item, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(t) => Some(t),
            PageItem::Rect(_) => None,
        })
    }
}

/// Escape a string for a PDF literal. The standard fonts only cover
/// Latin-1, so text is transliterated to ASCII first.
pub fn escape_text(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut out = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

fn fmt_num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn content_stream(page: &Page) -> String {
    let mut content = String::new();
    for item in &page.items {
        match item {
            PageItem::Text(t) => {
                content.push_str(&format!(
                    "BT /{} {} Tf {} {} Td ({}) Tj ET\n",
                    t.font.resource(),
                    fmt_num(t.size),
                    fmt_num(t.x),
                    fmt_num(t.y),
                    escape_text(&t.text)
                ));
            }
            PageItem::Rect(r) => {
                content.push_str(&format!(
                    "{} {} {} {} re S\n",
                    fmt_num(r.x),
                    fmt_num(r.y),
                    fmt_num(r.width),
                    fmt_num(r.height)
                ));
            }
        }
    }
    content
}

/// Write `page` as a complete PDF 1.4 document
pub fn write_pdf<W: Write>(page: &Page, mut writer: W) -> io::Result<()> {
    let content = content_stream(page);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>",
            fmt_num(page.width),
            fmt_num(page.height)
        ),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    writer.write_all(&out)?;
    writer.flush()
}
