mod common;

use std::sync::Arc;

use common::{book_client, chapter_prompts, engine_with, TOC_JSON};
use ebook_core::ebook_domain::{ChapterOutline, StepId, TableOfContents, WorkflowEventKind};
use ebook_core::{InMemoryWorkflowRepository, MockGenerationClient, StepStatus, StepValue, WorkflowEngine, WorkflowError};

#[tokio::test]
async fn run_to_completion_produces_a_version() {
    let client = book_client();
    let (engine, _repo) = engine_with(client.clone());
    let wf = engine.create("owner-1", "Habits draft").unwrap();

    let done = engine.workflow(wf.id)
                     .with_input("Notes on building habits that stick.")
                     .run_to_completion()
                     .await
                     .expect("workflow should complete");

    assert!(done.is_terminal());
    assert!(done.is_prefix_closed());
    assert_eq!(done.steps_completed.len(), StepId::ORDER.len());
    assert_eq!(done.effective_title(), "Better Habits");
    assert_eq!(done.versions.len(), 1);
    assert_eq!(done.versions[0].version_number, 1);
    assert!(done.versions[0].artifact_reference.starts_with("blake3:"));
    assert!(done.last_error.is_none());
    assert!(!done.is_generating);
    // title, toc, 2 chapters, introduction, conclusion, review
    assert_eq!(client.call_count(), 7);

    let status = engine.status(wf.id).unwrap();
    assert!(status.steps.iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(status.latest_version, Some(1));

    let seqs: Vec<u64> = done.history.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (0..done.history.len() as u64).collect::<Vec<_>>());
}

#[tokio::test]
async fn toc_before_title_is_a_prerequisite_error() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    engine.start_step(wf.id, StepId::Input, Some("some notes")).await.unwrap();
    engine.advance(wf.id).unwrap();

    let err = engine.start_step(wf.id, StepId::Toc, None).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PrerequisiteNotMet(_)), "got {err}");
    assert_eq!(err.to_string(), "prerequisite not met: TOC requires TITLE to be completed first");

    let wf = engine.load(wf.id).unwrap();
    assert_eq!(wf.current_step, StepId::Title);
    assert!(wf.outputs.table_of_contents.is_none());
}

#[tokio::test]
async fn advance_requires_a_valid_output() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let err = engine.advance(wf.id).unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { step: StepId::Input, .. }));

    let err = engine.start_step(wf.id, StepId::Input, Some("   ")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { .. }));
}

#[tokio::test]
async fn unparseable_toc_is_stored_as_failure_and_fixed_by_edit() {
    let client = Arc::new(MockGenerationClient::new());
    client.push_text("Habits");
    client.push_text("Sorry, I can only answer in prose.");
    let (engine, _repo) = engine_with(client);
    let wf = engine.create("o", "t").unwrap();
    engine.start_step(wf.id, StepId::Input, Some("notes")).await.unwrap();
    engine.advance(wf.id).unwrap();
    engine.start_step(wf.id, StepId::Title, None).await.unwrap();
    engine.advance(wf.id).unwrap();

    let err = engine.start_step(wf.id, StepId::Toc, None).await.unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { step: StepId::Toc, .. }));
    let status = engine.status(wf.id).unwrap();
    assert_eq!(status.step(StepId::Toc), StepStatus::Failed);
    assert!(status.last_error.is_some());

    let toc = TableOfContents::new(vec![ChapterOutline::new("Foundations"), ChapterOutline::new("Mindset")]);
    engine.save_manual_edit(wf.id, StepId::Toc, StepValue::TableOfContents(toc)).unwrap();
    let wf = engine.advance(wf.id).unwrap();
    assert_eq!(wf.current_step, StepId::Chapters);
    assert_eq!(wf.outputs.chapters.len(), 2);
    assert!(wf.last_error.is_none());
}

#[tokio::test]
async fn generation_failure_leaves_step_current() {
    let client = Arc::new(MockGenerationClient::new());
    client.push_failure(ebook_core::GenerationError::Timeout(30_000));
    let (engine, _repo) = engine_with(client);
    let wf = engine.create("o", "t").unwrap();
    engine.start_step(wf.id, StepId::Input, Some("notes")).await.unwrap();
    engine.advance(wf.id).unwrap();

    let err = engine.start_step(wf.id, StepId::Title, None).await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.to_string(), "TITLE generation unavailable: generation timed out after 30000 ms");

    let wf = engine.load(wf.id).unwrap();
    assert_eq!(wf.current_step, StepId::Title);
    assert!(!wf.is_completed(StepId::Title));
    assert!(!wf.is_generating);
    assert!(wf.last_error.as_deref().unwrap_or("").contains("timed out"));
    assert!(matches!(wf.history.last().map(|e| &e.kind), Some(WorkflowEventKind::StepFailed { .. })));
}

#[tokio::test]
async fn editing_a_completed_step_invalidates_everything_after_it() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Assemble {
        ctx.step().await.unwrap();
    }

    let wf = engine.save_manual_edit(wf.id, StepId::Title, StepValue::text("A New Title")).unwrap();
    assert_eq!(wf.current_step, StepId::Title);
    assert_eq!(wf.steps_completed.iter().copied().collect::<Vec<_>>(), vec![StepId::Input]);
    assert_eq!(wf.outputs.title.as_deref(), Some("A New Title"));
    assert!(wf.outputs.table_of_contents.is_none());
    assert!(wf.outputs.chapters.iter().all(|c| c.content.is_none()));
    assert!(wf.outputs.introduction.is_none());
    assert!(wf.outputs.conclusion.is_none());
    assert!(wf.is_prefix_closed());
    let invalidated = wf.history.iter().find_map(|e| match &e.kind {
                                           WorkflowEventKind::StepsInvalidated { cause, steps } => Some((*cause, steps.clone())),
                                           _ => None,
                                       });
    let (cause, steps) = invalidated.expect("invalidation should be recorded");
    assert_eq!(cause, StepId::Title);
    assert_eq!(steps, StepId::ORDER[1..6].to_vec());
}

#[tokio::test]
async fn toc_edit_after_chapters_began_rebuilds_slots() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Chapters {
        ctx.step().await.unwrap();
    }
    engine.save_manual_edit(wf.id,
                            StepId::Chapters,
                            StepValue::Chapter { index: 0,
                                                 content: "Hand written.".into() })
          .unwrap();

    let toc = TableOfContents::new(vec![ChapterOutline::new("One"),
                                        ChapterOutline::new("Two"),
                                        ChapterOutline::new("Three")]);
    let wf = engine.save_manual_edit(wf.id, StepId::Toc, StepValue::TableOfContents(toc)).unwrap();
    assert_eq!(wf.current_step, StepId::Toc);
    assert_eq!(wf.outputs.chapters.len(), 3);
    assert!(wf.outputs.chapters.iter().all(|c| c.content.is_none()));
    assert_eq!(wf.outputs.chapters[2].title, "Three");
}

#[tokio::test]
async fn derived_steps_cannot_be_edited_and_shapes_must_match() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let err = engine.save_manual_edit(wf.id, StepId::Assemble, StepValue::text("x")).unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { step: StepId::Assemble, .. }));
    let err = engine.save_manual_edit(wf.id, StepId::Input, StepValue::Chapter { index: 0,
                                                                                 content: "x".into() })
                    .unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { .. }));
    let err = engine.save_manual_edit(wf.id, StepId::Title, StepValue::text("x")).unwrap_err();
    assert!(matches!(err, WorkflowError::PrerequisiteNotMet(_)));
}

#[tokio::test]
async fn review_is_optional_and_others_are_not() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let err = engine.skip_step(wf.id).unwrap_err();
    assert!(matches!(err, WorkflowError::ValidationFailed { step: StepId::Input, .. }));

    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Review {
        ctx.step().await.unwrap();
    }
    let wf = engine.skip_step(wf.id).unwrap();
    assert_eq!(wf.current_step, StepId::Export);
    assert!(wf.is_completed(StepId::Review));
    assert!(wf.outputs.review.is_none());
}

#[tokio::test]
async fn regenerate_chapters_calls_every_chapter_again() {
    let client = book_client();
    let (engine, _repo) = engine_with(client.clone());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Introduction {
        ctx.step().await.unwrap();
    }
    client.clear_calls();

    let wf = engine.regenerate(wf.id, StepId::Chapters, Some("more examples")).await.unwrap();
    assert_eq!(chapter_prompts(&client), vec![1, 2]);
    assert!(client.prompts().iter().all(|p| p.contains("more examples")));
    assert_eq!(wf.current_step, StepId::Chapters);
    assert!(!wf.is_completed(StepId::Chapters));
    assert_eq!(wf.per_step_progress, 100.0);
}

#[tokio::test]
async fn failed_regeneration_keeps_downstream_work() {
    let client = book_client();
    let (engine, _repo) = engine_with(client.clone());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Introduction {
        ctx.step().await.unwrap();
    }
    let before = engine.load(wf.id).unwrap();

    client.push_failure(ebook_core::GenerationError::Unavailable("503".into()));
    let err = engine.regenerate(wf.id, StepId::Title, None).await.unwrap_err();
    assert!(matches!(err, WorkflowError::GenerationUnavailable { step: StepId::Title, .. }), "got {err}");

    let after = engine.load(wf.id).unwrap();
    assert_eq!(after.current_step, StepId::Introduction);
    for step in [StepId::Input, StepId::Title, StepId::Toc, StepId::Chapters] {
        assert!(after.is_completed(step), "{step} lost its completion");
    }
    assert_eq!(after.outputs.title, before.outputs.title);
    assert_eq!(after.outputs.table_of_contents, before.outputs.table_of_contents);
    assert_eq!(after.outputs.chapters, before.outputs.chapters);
    assert_eq!(after.outputs.chapters_done(), 2);
    assert!(!after.is_generating);
    assert!(after.last_error.as_deref().unwrap_or("").contains("503"));
    assert!(!after.history.iter().any(|e| matches!(e.kind, WorkflowEventKind::StepsInvalidated { .. })));

    // a later successful regeneration is what invalidates the successors
    let wf = engine.regenerate(wf.id, StepId::Title, None).await.unwrap();
    assert_eq!(wf.current_step, StepId::Title);
    assert!(!wf.is_completed(StepId::Toc));
    assert!(wf.outputs.table_of_contents.is_none());
}

#[tokio::test]
async fn failed_chapter_regeneration_keeps_old_chapters() {
    let client = book_client();
    let (engine, _repo) = engine_with(client.clone());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Introduction {
        ctx.step().await.unwrap();
    }
    let before = engine.load(wf.id).unwrap();

    client.push_failure(ebook_core::GenerationError::Unavailable("503".into()));
    let err = engine.regenerate(wf.id, StepId::Chapters, None).await.unwrap_err();
    assert!(err.is_recoverable());
    let after = engine.load(wf.id).unwrap();
    assert_eq!(after.current_step, StepId::Introduction);
    assert!(after.is_completed(StepId::Chapters));
    assert_eq!(after.outputs.chapters, before.outputs.chapters);

    // first chapter replaced, second one fails: the old second chapter stays
    client.push_text("A sharper first chapter.");
    client.push_failure(ebook_core::GenerationError::Unavailable("503".into()));
    engine.regenerate(wf.id, StepId::Chapters, None).await.unwrap_err();
    let after = engine.load(wf.id).unwrap();
    assert_eq!(after.outputs.chapters[0].content.as_deref(), Some("A sharper first chapter."));
    assert_eq!(after.outputs.chapters[1].content, before.outputs.chapters[1].content);
    assert_eq!(after.outputs.chapters_done(), 2);
    assert_eq!(after.current_step, StepId::Chapters);
    assert!(!after.is_completed(StepId::Chapters));
}

#[tokio::test]
async fn export_needs_an_exporter_and_reexport_appends_versions() {
    let repo = Arc::new(InMemoryWorkflowRepository::new());
    let bare = WorkflowEngine::builder(Arc::clone(&repo), book_client()).build();
    let wf = bare.create("o", "t").unwrap();
    let mut ctx = bare.workflow(wf.id).with_input("notes");
    while bare.load(wf.id).unwrap().current_step != StepId::Export {
        ctx.step().await.unwrap();
    }
    assert!(matches!(bare.export(wf.id), Err(WorkflowError::ExporterMissing)));

    let (engine, _) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let done = engine.workflow(wf.id).with_input("notes").run_to_completion().await.unwrap();
    let first = done.versions[0].clone();

    let again = engine.export(wf.id).unwrap();
    assert_eq!(again.version.version_number, 2);
    assert_eq!(again.version.artifact_reference, first.artifact_reference);

    engine.save_manual_edit(wf.id, StepId::Conclusion, StepValue::text("A different ending.")).unwrap();
    let done = engine.workflow(wf.id).run_to_completion().await.unwrap();
    let third = done.latest_version().unwrap();
    assert_eq!(third.version_number, 3);
    assert_ne!(third.artifact_reference, first.artifact_reference);
    assert_eq!(done.version(1).map(|v| v.artifact_reference.clone()), Some(first.artifact_reference));
    assert!(String::from_utf8(again.bytes).unwrap().contains("Chapter 2: Mindset"));
}

#[tokio::test]
async fn toc_prompt_output_is_parsed_into_slots() {
    let (engine, _repo) = engine_with(book_client());
    let wf = engine.create("o", "t").unwrap();
    let mut ctx = engine.workflow(wf.id).with_input("notes");
    while engine.load(wf.id).unwrap().current_step != StepId::Chapters {
        ctx.step().await.unwrap();
    }
    let wf = engine.load(wf.id).unwrap();
    let toc = wf.outputs.table_of_contents.as_ref().unwrap();
    assert_eq!(toc, &ebook_core::step::parse_table_of_contents(TOC_JSON).unwrap());
    assert_eq!(wf.outputs.chapters.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1]);
}
