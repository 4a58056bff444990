//! Minimal PDF 1.4 writer over a `PaginatedDocument`.
//!
//! Object layout: 1 catalog, 2 page tree, 3 Helvetica, 4 Helvetica-Bold,
//! 5 info, then a page object and its content stream for every page. Text is
//! encoded as WinAnsi; characters outside Latin-1 are replaced with `?`.
//! No timestamps are written, so output bytes depend only on the document.

use std::fmt::Write as _;

use ebook_core::{DocumentExporter, ExportOutput};
use ebook_domain::DocumentModel;
use log::debug;

use crate::layout::PageConfig;
use crate::paginator::{Page, PaginatedDocument, Paginator};

const FIRST_PAGE_OBJECT: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    paginator: Paginator,
}

impl PdfExporter {
    pub fn new(config: PageConfig) -> Self {
        Self { paginator: Paginator::new(config) }
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn render(&self, document: &PaginatedDocument) -> Vec<u8> {
        PdfWriter::new(self.paginator.config()).write(document)
    }
}

impl DocumentExporter for PdfExporter {
    fn media_type(&self) -> &str {
        "application/pdf"
    }

    fn file_extension(&self) -> &str {
        "pdf"
    }

    fn export(&self, document: &DocumentModel) -> ExportOutput {
        let paginated = self.paginator.paginate(document);
        let bytes = self.render(&paginated);
        debug!("pdf:export pages={} bytes={}", paginated.page_count(), bytes.len());
        ExportOutput { page_count: paginated.page_count(),
                       bytes }
    }
}

struct PdfWriter<'a> {
    config: &'a PageConfig,
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl<'a> PdfWriter<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self { config,
               buf: Vec::new(),
               offsets: Vec::new() }
    }

    fn write(mut self, document: &PaginatedDocument) -> Vec<u8> {
        self.buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let page_refs: Vec<String> = (0..document.pages.len()).map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * i))
                                                              .collect();
        self.object(b"<< /Type /Catalog /Pages 2 0 R >>");
        self.object(format!("<< /Type /Pages /Kids [{}] /Count {} >>",
                            page_refs.join(" "),
                            document.pages.len()).as_bytes());
        self.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
        self.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>");
        let mut info = b"<< /Producer (ebookflow) /Title ".to_vec();
        info.extend(pdf_string(&document.title));
        info.extend_from_slice(b" >>");
        self.object(&info);

        for (i, page) in document.pages.iter().enumerate() {
            let contents = FIRST_PAGE_OBJECT + 2 * i + 1;
            self.object(format!("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                                num(self.config.width),
                                num(self.config.height),
                                contents).as_bytes());
            let stream = self.page_stream(page);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend(stream);
            body.extend_from_slice(b"\nendstream");
            self.object(&body);
        }

        self.trailer();
        self.buf
    }

    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let n = self.offsets.len();
        self.buf.extend(format!("{n} 0 obj\n").into_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn trailer(&mut self) {
        let xref_at = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for off in &self.offsets {
            let _ = writeln!(xref, "{off:010} 00000 n ");
        }
        let _ = write!(xref,
                       "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                       self.offsets.len() + 1);
        self.buf.extend(xref.into_bytes());
    }

    fn page_stream(&self, page: &Page) -> Vec<u8> {
        let c = self.config;
        let mut out = Vec::new();
        let top = c.height - c.margin;

        if let Some(header) = &page.header {
            text_op(&mut out, false, c.header_footer_size, c.margin, c.height - c.margin / 2.0, header);
        }
        for placed in &page.blocks {
            let b = &placed.block;
            let leading = b.font_size * c.line_height;
            for (n, line) in b.lines.iter().enumerate() {
                let baseline = top - placed.y - b.font_size - n as f32 * leading;
                let x = if page.is_cover() {
                    ((c.width - c.text_width(line, b.font_size)) / 2.0).max(c.margin)
                } else {
                    c.margin
                };
                text_op(&mut out, b.style.bold(), b.font_size, x, baseline, line);
            }
        }
        if let Some(footer) = &page.footer {
            let x = (c.width - c.text_width(footer, c.header_footer_size)) / 2.0;
            text_op(&mut out, false, c.header_footer_size, x, c.margin / 2.0, footer);
        }
        out
    }
}

fn text_op(out: &mut Vec<u8>, bold: bool, size: f32, x: f32, y: f32, text: &str) {
    let font = if bold { "F2" } else { "F1" };
    out.extend(format!("BT /{font} {} Tf {} {} Td ", num(size), num(x), num(y)).into_bytes());
    out.extend(pdf_string(text));
    out.extend_from_slice(b" Tj ET\n");
}

/// Fixed two-decimal rendering, trailing zeros trimmed.
fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Literal string with `\`, `(` and `)` escaped and non-ASCII as octal.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            ' '..='~' => out.push(ch as u8),
            '\u{a0}'..='\u{ff}' => out.extend(format!("\\{:03o}", ch as u32).into_bytes()),
            '\u{2018}' | '\u{2019}' => out.push(b'\''),
            '\u{201c}' | '\u{201d}' => out.push(b'"'),
            '\u{2013}' | '\u{2014}' => out.push(b'-'),
            _ => out.push(b'?'),
        }
    }
    out.push(b')');
    out
}
