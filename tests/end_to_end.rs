use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ebookflow::engine::MockGenerationClient;
use ebookflow::{engine_with, DefaultEngine, EngineConfig, GenerationError, GenerationRequest, JsonFileRepository,
                StepId, StepValue, StoreConfig, WorkflowError};
use tempfile::TempDir;

const TOC: &str = r#"Here is the outline:
```json
{"chapters": [{"title": "Foundations", "dataPoints": ["cues"]}, {"title": "Mindset"}]}
```"#;

fn chapter_number(prompt: &str) -> Option<usize> {
    prompt.strip_prefix("Write chapter ")?.split(' ').next()?.parse().ok()
}

fn respond(req: &GenerationRequest) -> Result<String, GenerationError> {
    let p = req.prompt.as_str();
    let text = if p.starts_with("Write a compelling title") {
        "\"Better Habits\"".to_string()
    } else if p.starts_with("Create the table of contents") {
        TOC.to_string()
    } else if let Some(n) = chapter_number(p) {
        format!("## Where to begin\nChapter {n} body.\n\nWhat changes first?\n\nSmall things.")
    } else if p.starts_with("Write the introduction") {
        "Why habits matter.".to_string()
    } else if p.starts_with("Write the conclusion") {
        "Keep going.".to_string()
    } else if p.starts_with("Review the eBook") {
        "Looks consistent.".to_string()
    } else {
        return Err(GenerationError::Rejected("unexpected prompt".into()));
    };
    Ok(text)
}

fn fast_config() -> EngineConfig {
    EngineConfig { generation_backoff: Duration::from_millis(1),
                   ..EngineConfig::default() }
}

fn open_engine(dir: &TempDir, client: Arc<MockGenerationClient>) -> DefaultEngine {
    let store = JsonFileRepository::open(StoreConfig::new(dir.path())).unwrap();
    engine_with(store, client, fast_config())
}

#[tokio::test]
async fn full_run_produces_a_pdf_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(MockGenerationClient::with_responder(respond));
    let engine = open_engine(&dir, client.clone());
    let wf = engine.create("owner", "working title").unwrap();

    let done = engine.workflow(wf.id)
                     .with_input("Raw notes about habits.")
                     .run_to_completion()
                     .await
                     .unwrap();
    assert!(done.is_terminal());
    assert_eq!(done.effective_title(), "Better Habits");
    let v1 = done.latest_version().unwrap();
    assert_eq!(v1.version_number, 1);
    assert_eq!(v1.media_type, "application/pdf");
    // cover, contents, introduction, two chapters, conclusion
    assert_eq!(v1.page_count, 6);
    assert!(dir.path().join(format!("{}.json", wf.id)).exists());

    let exported = engine.export(wf.id).unwrap();
    assert!(exported.bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(exported.file_name(done.effective_title(), "pdf"), "better-habits-v2.pdf");
}

#[tokio::test]
async fn resume_after_restart_skips_finished_chapters() {
    let dir = tempfile::tempdir().unwrap();
    let healthy = Arc::new(AtomicBool::new(false));
    let gate = Arc::clone(&healthy);
    let client = Arc::new(MockGenerationClient::with_responder(move |req| {
                               if chapter_number(&req.prompt) == Some(2) && !gate.load(Ordering::SeqCst) {
                                   return Err(GenerationError::Unavailable("overloaded".into()));
                               }
                               respond(req)
                           }));

    let id = {
        let engine = open_engine(&dir, client.clone());
        let wf = engine.create("owner", "t").unwrap();
        let err = engine.workflow(wf.id).with_input("notes").run_to_completion().await.unwrap_err();
        assert!(matches!(err, WorkflowError::GenerationUnavailable { step: StepId::Chapters, .. }));
        wf.id
    };

    healthy.store(true, Ordering::SeqCst);
    client.clear_calls();
    let engine = open_engine(&dir, client.clone());
    let resumed = engine.resume(id).unwrap();
    assert_eq!(resumed.current_step, StepId::Chapters);
    assert!(resumed.outputs.chapters[0].has_content());
    assert!(resumed.outputs.chapters[1].content.is_none());

    let done = engine.workflow(id).run_to_completion().await.unwrap();
    let chapters: Vec<usize> = client.prompts().iter().filter_map(|p| chapter_number(p)).collect();
    assert_eq!(chapters, vec![2]);
    assert!(done.is_terminal());
    assert_eq!(done.versions.len(), 1);
}

#[tokio::test]
async fn editing_after_export_yields_a_new_version() {
    let dir = tempfile::tempdir().unwrap();
    let engine = open_engine(&dir, Arc::new(MockGenerationClient::with_responder(respond)));
    let wf = engine.create("owner", "t").unwrap();
    let done = engine.workflow(wf.id).with_input("notes").run_to_completion().await.unwrap();
    let first = done.latest_version().unwrap().clone();

    engine.save_manual_edit(wf.id, StepId::Conclusion, StepValue::text("A different ending."))
          .unwrap();
    let err = engine.export(wf.id).unwrap_err();
    assert!(matches!(err, WorkflowError::PrerequisiteNotMet(_)), "got {err}");

    let redone = engine.workflow(wf.id).run_to_completion().await.unwrap();
    let second = redone.latest_version().unwrap();
    assert_eq!(second.version_number, 2);
    assert_ne!(second.artifact_reference, first.artifact_reference);
    assert_ne!(second.document_fingerprint, first.document_fingerprint);
    assert_eq!(redone.versions[0], first);
}
