#![allow(dead_code)]

use std::sync::Arc;

use ebook_core::{EngineConfig, GenerationError, GenerationRequest, InMemoryWorkflowRepository, MockGenerationClient,
                 PlainTextExporter, WorkflowEngine};

pub const TOC_JSON: &str = r#"[{"title":"Foundations","dataPoints":["cues","routines"]},{"title":"Mindset","dataPoints":[]}]"#;

/// Chapter number from a chapter prompt ("Write chapter 2 of 2 ...").
pub fn chapter_number(prompt: &str) -> Option<usize> {
    prompt.strip_prefix("Write chapter ")?.split(' ').next()?.parse().ok()
}

/// Answers every built-in prompt with plausible text.
pub fn book_responder(req: &GenerationRequest) -> Result<String, GenerationError> {
    let p = req.prompt.as_str();
    if p.starts_with("Write a compelling title") {
        Ok("Better Habits".to_string())
    } else if p.starts_with("Create the table of contents") {
        Ok(TOC_JSON.to_string())
    } else if let Some(n) = chapter_number(p) {
        Ok(format!("Chapter {n} opens here.\n\nSummary:\n\nChapter {n} closes here."))
    } else if p.starts_with("Write the introduction") {
        Ok("This book is about habits.".to_string())
    } else if p.starts_with("Write the conclusion") {
        Ok("Start small and keep going.".to_string())
    } else if p.starts_with("Review the eBook") {
        Ok("No issues found.".to_string())
    } else {
        Err(GenerationError::Rejected(format!("unexpected prompt: {p}")))
    }
}

pub fn book_client() -> Arc<MockGenerationClient> {
    Arc::new(MockGenerationClient::with_responder(book_responder))
}

pub type Engine = WorkflowEngine<Arc<InMemoryWorkflowRepository>>;

pub fn engine_with(client: Arc<MockGenerationClient>) -> (Engine, Arc<InMemoryWorkflowRepository>) {
    let repo = Arc::new(InMemoryWorkflowRepository::new());
    let engine = WorkflowEngine::builder(Arc::clone(&repo), client).config(EngineConfig::default())
                                                                   .exporter(PlainTextExporter)
                                                                   .build();
    (engine, repo)
}

pub fn chapter_prompts(client: &MockGenerationClient) -> Vec<usize> {
    client.prompts().iter().filter_map(|p| chapter_number(p)).collect()
}
