//! Los nueve steps integrados del flujo de eBook.

use ebook_domain::{chapters_match_toc, StepId, WorkflowInstance};

use super::definition::{OutputShape, PromptContext, StepDefinition, StepKind};
use super::toc_parser::parse_table_of_contents;
use super::value::StepValue;
use crate::config::EngineConfig;
use crate::constants::CHAPTER_EXCERPT_CHARS;
use crate::generation::GenerationParams;

const MAX_TITLE_CHARS: usize = 200;

fn present<'a>(field: &'a Option<String>) -> Option<&'a str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn require_text(field: &Option<String>, what: &str) -> Result<(), String> {
    present(field).map(|_| ()).ok_or_else(|| format!("{what} is empty"))
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

fn append_guidance(prompt: &mut String, ctx: &PromptContext<'_>) {
    if let Some(g) = ctx.guidance {
        prompt.push_str("\nAdditional instructions from the author:\n");
        prompt.push_str(g.trim());
        prompt.push('\n');
    }
}

fn outline_listing(instance: &WorkflowInstance) -> String {
    instance.outputs
            .table_of_contents
            .iter()
            .flat_map(|toc| toc.iter())
            .enumerate()
            .map(|(i, c)| format!("{}. {}\n", i + 1, c.title.trim()))
            .collect()
}

fn source_material(instance: &WorkflowInstance) -> &str {
    present(&instance.outputs.input).unwrap_or("")
}

// INPUT

pub struct InputStep;

impl StepDefinition for InputStep {
    fn id(&self) -> StepId {
        StepId::Input
    }
    fn kind(&self) -> StepKind {
        StepKind::UserInput
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::Text
    }
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        require_text(&instance.outputs.input, "input")
    }
}

// TITLE, INTRODUCTION, CONCLUSION, REVIEW

type PromptFn = fn(&PromptContext<'_>) -> String;

/// Step de generación de una llamada que produce texto libre.
pub struct TextStep {
    id: StepId,
    model: String,
    params: GenerationParams,
    optional: bool,
    build_prompt: PromptFn,
}

impl TextStep {
    pub fn new(id: StepId, model: impl Into<String>, params: GenerationParams, build_prompt: PromptFn) -> Self {
        Self { id,
               model: model.into(),
               params,
               optional: false,
               build_prompt }
    }

    pub fn as_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn title(config: &EngineConfig) -> Self {
        Self::new(StepId::Title, &config.default_model, capped(config, 64), title_prompt)
    }

    pub fn introduction(config: &EngineConfig) -> Self {
        Self::new(StepId::Introduction, &config.default_model, capped(config, 1500), introduction_prompt)
    }

    pub fn conclusion(config: &EngineConfig) -> Self {
        Self::new(StepId::Conclusion, &config.default_model, capped(config, 1500), conclusion_prompt)
    }

    pub fn review(config: &EngineConfig) -> Self {
        Self::new(StepId::Review, &config.default_model, capped(config, 1500), review_prompt).as_optional()
    }

    fn stored<'a>(&self, instance: &'a WorkflowInstance) -> &'a Option<String> {
        let o = &instance.outputs;
        match self.id {
            StepId::Title => &o.title,
            StepId::Introduction => &o.introduction,
            StepId::Conclusion => &o.conclusion,
            StepId::Review => &o.review,
            _ => &o.input,
        }
    }
}

fn capped(config: &EngineConfig, max_tokens: u32) -> GenerationParams {
    GenerationParams { temperature: config.temperature,
                       max_tokens: max_tokens.min(config.max_tokens) }
}

impl StepDefinition for TextStep {
    fn id(&self) -> StepId {
        self.id
    }
    fn kind(&self) -> StepKind {
        StepKind::Generation
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn params(&self) -> GenerationParams {
        self.params.clone()
    }
    fn optional(&self) -> bool {
        self.optional
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::Text
    }
    fn prompt(&self, ctx: &PromptContext<'_>) -> Option<String> {
        Some((self.build_prompt)(ctx))
    }
    fn accept(&self, raw: &str) -> Result<StepValue, String> {
        let text = if self.id == StepId::Title {
            // los modelos suelen entrecomillar o prefijar los títulos
            let decoration = |c: char| c == '"' || c == '*' || c == '#';
            let t = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
            let t = t.trim_matches(decoration).trim();
            let t = t.strip_prefix("Title:").unwrap_or(t);
            t.trim().trim_matches(decoration).trim().to_string()
        } else {
            raw.trim().to_string()
        };
        Ok(StepValue::Text(text))
    }
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        let what = self.id.as_str().to_ascii_lowercase();
        require_text(self.stored(instance), &what)?;
        if self.id == StepId::Title {
            let len = present(&instance.outputs.title).map_or(0, |t| t.chars().count());
            if len > MAX_TITLE_CHARS {
                return Err(format!("title is {len} characters long, at most {MAX_TITLE_CHARS} allowed"));
            }
        }
        Ok(())
    }
}

fn title_prompt(ctx: &PromptContext<'_>) -> String {
    let mut p = String::from("Write a compelling title for an eBook based on the material below.\n\
                              Answer with the title only, on a single line, without quotes.\n\n");
    p.push_str("Working title: ");
    p.push_str(ctx.instance.document_title.trim());
    p.push_str("\n\nMaterial:\n");
    p.push_str(source_material(ctx.instance));
    p.push('\n');
    append_guidance(&mut p, ctx);
    p
}

fn introduction_prompt(ctx: &PromptContext<'_>) -> String {
    let wf = ctx.instance;
    let mut p = format!("Write the introduction of the eBook \"{}\".\n\
                         Present the topic, who the book is for and what each chapter covers.\n\
                         Use plain paragraphs separated by blank lines.\n\nChapters:\n",
                        wf.effective_title());
    p.push_str(&outline_listing(wf));
    p.push_str("\nMaterial:\n");
    p.push_str(source_material(wf));
    p.push('\n');
    append_guidance(&mut p, ctx);
    p
}

fn conclusion_prompt(ctx: &PromptContext<'_>) -> String {
    let wf = ctx.instance;
    let mut p = format!("Write the conclusion of the eBook \"{}\".\n\
                         Summarize the key lessons of every chapter and end with a call to action.\n\
                         Use plain paragraphs separated by blank lines.\n\nChapters:\n",
                        wf.effective_title());
    p.push_str(&outline_listing(wf));
    if let Some(intro) = present(&wf.outputs.introduction) {
        p.push_str("\nIntroduction excerpt:\n");
        p.push_str(&excerpt(intro, CHAPTER_EXCERPT_CHARS));
        p.push('\n');
    }
    append_guidance(&mut p, ctx);
    p
}

fn review_prompt(ctx: &PromptContext<'_>) -> String {
    let wf = ctx.instance;
    let mut p = format!("Review the eBook \"{}\" as an editor.\n\
                         List concrete problems (consistency, repetition, gaps, tone) and a suggested fix for each.\n\n",
                        wf.effective_title());
    if let Some(intro) = present(&wf.outputs.introduction) {
        p.push_str("Introduction:\n");
        p.push_str(&excerpt(intro, CHAPTER_EXCERPT_CHARS));
        p.push_str("\n\n");
    }
    for c in &wf.outputs.chapters {
        p.push_str(&c.display_title());
        p.push_str(":\n");
        p.push_str(&excerpt(c.content.as_deref().unwrap_or(""), CHAPTER_EXCERPT_CHARS));
        p.push_str("\n\n");
    }
    if let Some(end) = present(&wf.outputs.conclusion) {
        p.push_str("Conclusion:\n");
        p.push_str(&excerpt(end, CHAPTER_EXCERPT_CHARS));
        p.push('\n');
    }
    append_guidance(&mut p, ctx);
    p
}

// TOC

pub struct TocStep {
    model: String,
    params: GenerationParams,
}

impl TocStep {
    pub fn new(config: &EngineConfig) -> Self {
        Self { model: config.default_model.clone(),
               params: capped(config, 1500) }
    }
}

impl StepDefinition for TocStep {
    fn id(&self) -> StepId {
        StepId::Toc
    }
    fn kind(&self) -> StepKind {
        StepKind::Generation
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn params(&self) -> GenerationParams {
        self.params.clone()
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::TableOfContents
    }
    fn prompt(&self, ctx: &PromptContext<'_>) -> Option<String> {
        let wf = ctx.instance;
        let mut p = format!("Create the table of contents for the eBook \"{}\".\n\
                             Answer with a JSON array only. Each element is an object with a \"title\" string \
                             and a \"dataPoints\" array of the key points the chapter must cover.\n\n\
                             Material:\n",
                            wf.effective_title());
        p.push_str(source_material(wf));
        p.push('\n');
        append_guidance(&mut p, ctx);
        Some(p)
    }
    fn accept(&self, raw: &str) -> Result<StepValue, String> {
        parse_table_of_contents(raw).map(StepValue::TableOfContents)
    }
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        match &instance.outputs.table_of_contents {
            Some(toc) => toc.validate().map_err(|e| e.to_string()),
            None => Err("table of contents is missing".to_string()),
        }
    }
}

// CHAPTERS

pub struct ChaptersStep {
    model: String,
    params: GenerationParams,
}

impl ChaptersStep {
    pub fn new(config: &EngineConfig) -> Self {
        Self { model: config.chapter_model.clone(),
               params: GenerationParams { temperature: config.temperature,
                                          max_tokens: config.max_tokens } }
    }
}

impl StepDefinition for ChaptersStep {
    fn id(&self) -> StepId {
        StepId::Chapters
    }
    fn kind(&self) -> StepKind {
        StepKind::MultiPart
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn params(&self) -> GenerationParams {
        self.params.clone()
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::Chapters
    }

    /// Prompt para `ctx.chapter_index`; se citan los capítulos previos para
    /// que el texto no se repita.
    fn prompt(&self, ctx: &PromptContext<'_>) -> Option<String> {
        let wf = ctx.instance;
        let index = ctx.chapter_index?;
        let toc = wf.outputs.table_of_contents.as_ref()?;
        let outline = toc.chapters.get(index)?;
        let mut p = format!("Write chapter {} of {} of the eBook \"{}\": \"{}\".\n\
                             Use plain paragraphs separated by blank lines. Short lines ending with a colon \
                             may introduce a section.\n",
                            index + 1,
                            toc.len(),
                            wf.effective_title(),
                            outline.title.trim());
        if !outline.data_points.is_empty() {
            p.push_str("\nCover these points:\n");
            for point in &outline.data_points {
                p.push_str("- ");
                p.push_str(point.trim());
                p.push('\n');
            }
        }
        p.push_str("\nFull outline:\n");
        p.push_str(&outline_listing(wf));
        let earlier: Vec<_> = wf.outputs.chapters.iter().filter(|c| c.index < index && c.has_content()).collect();
        if !earlier.is_empty() {
            p.push_str("\nEarlier chapters (excerpts):\n");
            for c in earlier {
                p.push_str(&c.display_title());
                p.push_str(": ");
                p.push_str(&excerpt(c.content.as_deref().unwrap_or(""), CHAPTER_EXCERPT_CHARS));
                p.push('\n');
            }
        }
        p.push_str("\nMaterial:\n");
        p.push_str(source_material(wf));
        p.push('\n');
        append_guidance(&mut p, ctx);
        Some(p)
    }

    fn accept(&self, raw: &str) -> Result<StepValue, String> {
        let content = raw.trim();
        if content.is_empty() {
            return Err("generated chapter is empty".to_string());
        }
        // el motor rellena el índice
        Ok(StepValue::Chapter { index: 0,
                                content: content.to_string() })
    }

    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        let o = &instance.outputs;
        let toc = o.table_of_contents.as_ref().ok_or("table of contents is missing")?;
        if !chapters_match_toc(&o.chapters, toc) {
            return Err("chapters do not match the table of contents".to_string());
        }
        let missing: Vec<String> = o.chapters
                                    .iter()
                                    .filter(|c| !c.has_content())
                                    .map(|c| (c.index + 1).to_string())
                                    .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("chapters without content: {}", missing.join(", ")))
        }
    }
}

// ASSEMBLE

pub struct AssembleStep;

impl StepDefinition for AssembleStep {
    fn id(&self) -> StepId {
        StepId::Assemble
    }
    fn kind(&self) -> StepKind {
        StepKind::Assembly
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::DocumentFingerprint
    }
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        require_text(&instance.outputs.document_fingerprint, "assembled document")
    }
}

// EXPORT

pub struct ExportStep;

impl StepDefinition for ExportStep {
    fn id(&self) -> StepId {
        StepId::Export
    }
    fn kind(&self) -> StepKind {
        StepKind::Export
    }
    fn requires(&self) -> &'static [StepId] {
        &[StepId::Assemble]
    }
    fn output_shape(&self) -> OutputShape {
        OutputShape::Versions
    }
    /// Pasa si la última versión es una exportación del documento actual.
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String> {
        let latest = instance.latest_version().ok_or("document has not been exported yet")?;
        match (&latest.document_fingerprint, &instance.outputs.document_fingerprint) {
            (Some(exported), Some(current)) if exported == current => Ok(()),
            _ => Err(format!("version {} predates the current document", latest.version_number)),
        }
    }
}
