//! Geometría de página y bloques de texto que se colocan en ellas.
//!
//! Todas las medidas son puntos PDF. El ancho del texto se estima con un
//! ancho medio de glifo (`font_size * glyph_width_factor`): solo se usan las
//! fuentes base estándar y no se incrustan métricas.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Espacio extra libre sobre el margen inferior.
    pub bottom_safety: f32,
    pub line_height: f32,
    pub cover_size: f32,
    pub heading_size: f32,
    pub subheading_size: f32,
    pub body_size: f32,
    pub toc_size: f32,
    pub header_footer_size: f32,
    pub glyph_width_factor: f32,
    /// Los párrafos más cortos que esto (en caracteres) que acaban en `:` o
    /// `?` pasan a ser subtítulos.
    pub subheading_threshold: usize,
    /// Separación vertical tras cada bloque.
    pub block_spacing: f32,
}

impl Default for PageConfig {
    /// A4 vertical.
    fn default() -> Self {
        Self { width: 595.0,
               height: 842.0,
               margin: 56.0,
               bottom_safety: 24.0,
               line_height: 1.4,
               cover_size: 28.0,
               heading_size: 20.0,
               subheading_size: 14.0,
               body_size: 11.0,
               toc_size: 12.0,
               header_footer_size: 9.0,
               glyph_width_factor: 0.5,
               subheading_threshold: 80,
               block_spacing: 8.0 }
    }
}

impl PageConfig {
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Posición más baja en la que puede acabar un bloque sin forzar salto.
    pub fn content_limit(&self) -> f32 {
        self.usable_height() - self.bottom_safety
    }

    /// Caracteres por línea a `font_size`, nunca menos de uno.
    pub fn columns(&self, font_size: f32) -> usize {
        let glyph = font_size * self.glyph_width_factor;
        if glyph <= 0.0 {
            return 1;
        }
        ((self.usable_width() / glyph).floor() as usize).max(1)
    }

    /// Ancho estimado de `text` al renderizar.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.glyph_width_factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    Cover,
    Heading,
    SubHeading,
    Body,
    TocEntry,
}

impl BlockStyle {
    pub fn font_size(self, config: &PageConfig) -> f32 {
        match self {
            BlockStyle::Cover => config.cover_size,
            BlockStyle::Heading => config.heading_size,
            BlockStyle::SubHeading => config.subheading_size,
            BlockStyle::Body => config.body_size,
            BlockStyle::TocEntry => config.toc_size,
        }
    }

    pub fn bold(self) -> bool {
        matches!(self, BlockStyle::Cover | BlockStyle::Heading | BlockStyle::SubHeading)
    }
}

/// Tramo indivisible de líneas ajustadas con un mismo estilo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub style: BlockStyle,
    pub lines: Vec<String>,
    pub font_size: f32,
    pub height: f32,
}

impl Block {
    pub fn new(style: BlockStyle, text: &str, config: &PageConfig) -> Self {
        let font_size = style.font_size(config);
        let lines: Vec<String> = textwrap::wrap(text, config.columns(font_size)).into_iter()
                                                                                .map(|l| l.into_owned())
                                                                                .collect();
        let height = lines.len() as f32 * font_size * config.line_height;
        Self { style,
               lines,
               font_size,
               height }
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Divide la prosa generada en bloques con estilo.
///
/// Los párrafos se separan por líneas en blanco y sus saltos internos pasan
/// a espacios. Las líneas markdown `#` se vuelven subtítulos sin las
/// marcas, igual que los párrafos cortos que acaban en `:` o `?`.
pub fn content_blocks(content: &str, config: &PageConfig) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks, config);
        } else if line.starts_with('#') {
            flush_paragraph(&mut paragraph, &mut blocks, config);
            let heading = line.trim_start_matches('#').trim();
            if !heading.is_empty() {
                blocks.push(Block::new(BlockStyle::SubHeading, heading, config));
            }
        } else {
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks, config);
    blocks
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>, config: &PageConfig) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join(" ");
    paragraph.clear();
    blocks.push(Block::new(paragraph_style(&text, config), &text, config));
}

pub fn paragraph_style(paragraph: &str, config: &PageConfig) -> BlockStyle {
    let p = paragraph.trim();
    if p.chars().count() < config.subheading_threshold && (p.ends_with(':') || p.ends_with('?')) {
        BlockStyle::SubHeading
    } else {
        BlockStyle::Body
    }
}
