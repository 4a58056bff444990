//! Maqueta un `DocumentModel` en páginas de tamaño fijo.
//!
//! La estructura es fija: portada, contenidos, introducción, una sección por
//! capítulo y conclusión. Cada sección abre página nueva. Dentro de una
//! sección los bloques fluyen de arriba abajo y un bloque que no cabe sobre
//! el margen de seguridad inferior pasa entero a la página siguiente. Un
//! bloque más alto que una página ocupa una página propia y la desborda.

use ebook_domain::DocumentModel;
use serde::Serialize;

use crate::layout::{content_blocks, Block, BlockStyle, PageConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    pub block: Block,
    /// Distancia desde el borde superior del área de contenido al del bloque.
    pub y: f32,
}

impl PlacedBlock {
    pub fn bottom(&self) -> f32 {
        self.y + self.block.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Empieza en 1; la portada es la página 1.
    pub number: usize,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub blocks: Vec<PlacedBlock>,
}

impl Page {
    pub fn is_cover(&self) -> bool {
        self.number == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedDocument {
    pub title: String,
    pub pages: Vec<Page>,
}

impl PaginatedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Páginas cuyo último bloque se sale del área de contenido.
    pub fn overflowing_pages(&self, config: &PageConfig) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.blocks.iter().any(|b| b.bottom() > config.usable_height()))
            .map(|p| p.number)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PageConfig,
}

impl Paginator {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Determinista: el mismo documento da siempre las mismas páginas.
    pub fn paginate(&self, document: &DocumentModel) -> PaginatedDocument {
        let c = &self.config;
        let mut out = PageSink::new(c, document.title());

        out.cover(Block::new(BlockStyle::Cover, document.title(), c));

        out.open_page();
        out.place(Block::new(BlockStyle::Heading, "Contents", c));
        out.place(Block::new(BlockStyle::TocEntry, "Introduction", c));
        for chapter in document.chapters() {
            out.place(Block::new(BlockStyle::TocEntry, &chapter.display_title(), c));
        }
        out.place(Block::new(BlockStyle::TocEntry, "Conclusion", c));

        out.section("Introduction", document.introduction());
        for chapter in document.chapters() {
            out.section(&chapter.display_title(), &chapter.content);
        }
        out.section("Conclusion", document.conclusion());

        out.finish()
    }
}

/// Cursor sobre la página que se está llenando.
struct PageSink<'a> {
    config: &'a PageConfig,
    title: String,
    pages: Vec<Page>,
    current: Option<Page>,
    cursor: f32,
}

impl<'a> PageSink<'a> {
    fn new(config: &'a PageConfig, title: &str) -> Self {
        Self { config,
               title: title.to_string(),
               pages: Vec::new(),
               current: None,
               cursor: 0.0 }
    }

    fn close_page(&mut self) {
        if let Some(mut page) = self.current.take() {
            if !page.is_cover() {
                page.footer = Some(format!("Page {}", page.number));
            }
            self.pages.push(page);
        }
    }

    fn open_page(&mut self) {
        self.close_page();
        let number = self.pages.len() + 1;
        let header = (number > 1).then(|| self.title.clone());
        self.current = Some(Page { number,
                                   header,
                                   footer: None,
                                   blocks: Vec::new() });
        self.cursor = 0.0;
    }

    /// Portada: el título queda a un tercio de la altura.
    fn cover(&mut self, block: Block) {
        self.open_page();
        self.cursor = self.config.usable_height() / 3.0;
        self.place(block);
    }

    fn section(&mut self, heading: &str, content: &str) {
        self.open_page();
        self.place(Block::new(BlockStyle::Heading, heading, self.config));
        for block in content_blocks(content, self.config) {
            self.place(block);
        }
    }

    fn place(&mut self, block: Block) {
        let occupied = self.current.as_ref().is_some_and(|p| !p.blocks.is_empty());
        if self.current.is_none() || (occupied && self.cursor + block.height > self.config.content_limit()) {
            self.open_page();
        }
        let y = self.cursor;
        self.cursor += block.height + self.config.block_spacing;
        if let Some(page) = self.current.as_mut() {
            page.blocks.push(PlacedBlock { block, y });
        }
    }

    fn finish(mut self) -> PaginatedDocument {
        self.close_page();
        PaginatedDocument { title: self.title,
                            pages: self.pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebook_domain::{Chapter, ChapterOutline, TableOfContents};

    fn doc(chapter_bodies: &[&str]) -> DocumentModel {
        let toc: TableOfContents = (0..chapter_bodies.len()).map(|i| ChapterOutline::new(format!("Part {}", i + 1)))
                                                            .collect();
        let mut chapters = Chapter::slots_for(&toc);
        for (c, body) in chapters.iter_mut().zip(chapter_bodies) {
            c.content = Some(body.to_string());
        }
        DocumentModel::try_new("Better Habits", "Intro.", &toc, &chapters, "The end.").unwrap()
    }

    #[test]
    fn cover_has_no_header_or_footer() {
        let pages = Paginator::default().paginate(&doc(&["Short."])).pages;
        assert!(pages[0].header.is_none() && pages[0].footer.is_none());
        for p in &pages[1..] {
            assert_eq!(p.header.as_deref(), Some("Better Habits"));
            assert_eq!(p.footer, Some(format!("Page {}", p.number)));
        }
    }

    #[test]
    fn contents_lists_every_section() {
        let pages = Paginator::default().paginate(&doc(&["a", "b"])).pages;
        let entries: Vec<String> = pages[1].blocks.iter().map(|b| b.block.text()).collect();
        assert_eq!(entries,
                   vec!["Contents", "Introduction", "Chapter 1: Part 1", "Chapter 2: Part 2", "Conclusion"]);
    }

    #[test]
    fn long_chapter_breaks_between_blocks() {
        let para = "Habits compound over time. ".repeat(20);
        let body = vec![para.as_str(); 30].join("\n\n");
        let d = Paginator::default().paginate(&doc(&[body.as_str()]));
        let c = PageConfig::default();
        // cover, contents, intro, chapter pages..., conclusion
        assert!(d.page_count() > 5);
        assert!(d.overflowing_pages(&c).is_empty());
        for p in &d.pages {
            for pair in p.blocks.windows(2) {
                assert!(pair[1].y >= pair[0].bottom());
            }
            if p.blocks.len() > 1 {
                assert!(p.blocks.last().map_or(0.0, PlacedBlock::bottom) <= c.content_limit());
            }
        }
    }
}
