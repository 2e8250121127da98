//! The reducer: consumes events, mutates state, returns effects.
//!
//! Every async result is keyed on what it was requested for (a load
//! ticket, a topic id) and is dropped on arrival when the selection has
//! moved on. Only the reducer mutates state; I/O goes out as effects.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use notex_core::catalog::CatalogError;
use notex_core::content::ViewMode;
use notex_core::generate::{GenerateRequest, GeneratorError};
use notex_core::hierarchy::{Level, LoadState, Node, ResolveOutcome, SelectOutcome};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features;
use crate::mutations::StateMutation;
use crate::overlays::{self, AddReferenceState, Overlay, OverlayTransition};
use crate::render;
use crate::state::{AppState, GenerationState, PanelFocus, SaveStatus, TuiState};

/// How long a save outcome stays in the status line before it clears.
pub const SAVE_STATUS_LINGER: Duration = Duration::from_secs(2);

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { width, height } => {
            app.tui.frame = (width, height);
            Vec::new()
        }
        UiEvent::Tick => {
            handle_tick(&mut app.tui);
            Vec::new()
        }
        UiEvent::Terminal(event) => match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
            _ => Vec::new(),
        },
        UiEvent::LevelLoaded {
            level,
            ticket,
            result,
        } => {
            handle_level_loaded(&mut app.tui, level, ticket, result);
            Vec::new()
        }
        UiEvent::NotesLoaded { topic_id, result } => {
            handle_notes_loaded(&mut app.tui, &topic_id, result);
            Vec::new()
        }
        UiEvent::QuestionsLoaded { topic_id, result } => {
            handle_questions_loaded(&mut app.tui, &topic_id, result);
            Vec::new()
        }
        UiEvent::GenerationFinished { topic_id, result } => {
            handle_generation_finished(&mut app.tui, &topic_id, result);
            Vec::new()
        }
        UiEvent::SaveFinished {
            topic_id,
            text,
            result,
        } => {
            handle_save_finished(&mut app.tui, &topic_id, text, result);
            Vec::new()
        }
    }
}

fn handle_tick(tui: &mut TuiState) {
    tui.spinner_frame = tui.spinner_frame.wrapping_add(1);

    let expired = match &tui.notes.save {
        SaveStatus::Saved { at } | SaveStatus::Failed { at, .. } => {
            at.elapsed() >= SAVE_STATUS_LINGER
        }
        _ => false,
    };
    if expired {
        tui.notes.save = SaveStatus::Idle;
    }
}

fn handle_level_loaded(
    tui: &mut TuiState,
    level: Level,
    ticket: u64,
    result: Result<Vec<Node>, CatalogError>,
) {
    if let Err(err) = &result {
        tracing::warn!(level = level.id(), kind = %err.kind, "level load failed: {err}");
    }
    match tui
        .controller
        .resolve(level, ticket, result.map_err(|err| err.to_string()))
    {
        ResolveOutcome::Applied => {
            let len = tui.controller.store().options(level).len();
            tui.cursor[level] = tui.cursor[level].min(len.saturating_sub(1));
        }
        ResolveOutcome::Stale => {
            tracing::debug!(level = level.id(), ticket, "dropped stale level load");
        }
    }
}

fn handle_notes_loaded(
    tui: &mut TuiState,
    topic_id: &str,
    result: Result<Option<String>, CatalogError>,
) {
    if tui.selected_topic_id() != Some(topic_id) {
        tracing::debug!(topic_id, "dropped notes load for unselected topic");
        return;
    }
    tui.notes.loading = false;
    match result {
        Ok(Some(text)) => {
            tui.notes.baseline = Some(text.clone());
            tui.notes.text = text;
            tui.notes.scroll = 0;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(topic_id, kind = %err.kind, "notes load failed: {err}");
        }
    }
}

fn handle_questions_loaded(
    tui: &mut TuiState,
    topic_id: &str,
    result: Result<Vec<String>, CatalogError>,
) {
    if tui.selected_topic_id() != Some(topic_id) {
        return;
    }
    match result {
        Ok(questions) => tui.notes.questions = questions,
        Err(err) => {
            // A miss only costs prompt context; generation proceeds
            // without exemplar questions.
            tracing::warn!(topic_id, kind = %err.kind, "questions load failed: {err}");
        }
    }
}

fn handle_generation_finished(
    tui: &mut TuiState,
    topic_id: &str,
    result: Result<String, GeneratorError>,
) {
    if tui.selected_topic_id() != Some(topic_id) || !tui.notes.generation.is_running() {
        tracing::debug!(topic_id, "dropped generation result for unselected topic");
        return;
    }
    match result {
        Ok(text) => {
            tui.notes.generation = GenerationState::Idle;
            tui.notes.text = text;
            tui.notes.scroll = 0;
            tui.notes.view_mode = ViewMode::Structured;
        }
        Err(err) => {
            tracing::warn!(topic_id, kind = %err.kind, "generation failed: {err}");
            tui.notes.generation = GenerationState::Failed {
                message: err.to_string(),
            };
        }
    }
}

fn handle_save_finished(
    tui: &mut TuiState,
    topic_id: &str,
    text: String,
    result: Result<(), CatalogError>,
) {
    if tui.selected_topic_id() != Some(topic_id) || !tui.notes.save.is_saving() {
        return;
    }
    match result {
        Ok(()) => {
            tui.notes.save = SaveStatus::Saved { at: Instant::now() };
            // The baseline is the text that was actually written, not the
            // current buffer; generation may have replaced it mid-save.
            tui.notes.baseline = Some(text);
        }
        Err(err) => {
            tracing::warn!(topic_id, kind = %err.kind, "save failed: {err}");
            tui.notes.save = SaveStatus::Failed {
                message: err.to_string(),
                at: Instant::now(),
            };
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // An open overlay owns the keyboard.
    if let Some(mut overlay_update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key)
    {
        apply_mutations(&mut app.tui, std::mem::take(&mut overlay_update.mutations));
        if matches!(overlay_update.transition, OverlayTransition::Close) {
            app.overlay = None;
        }
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }
    match key.code {
        KeyCode::Char('q') => return vec![UiEffect::Quit],
        KeyCode::Tab => {
            app.tui.focus = app.tui.focus.next();
            return Vec::new();
        }
        KeyCode::BackTab => {
            app.tui.focus = app.tui.focus.prev();
            return Vec::new();
        }
        KeyCode::Char('v') => return toggle_view(&mut app.tui),
        KeyCode::Char('g') => return start_generation(&mut app.tui),
        KeyCode::Char('s') => return start_save(&mut app.tui),
        KeyCode::Char('R') => {
            reset_selection(&mut app.tui);
            return Vec::new();
        }
        _ => {}
    }

    match app.tui.focus {
        PanelFocus::Selector => selector_key(&mut app.tui, key),
        PanelFocus::References => references_key(app, key),
        PanelFocus::Notes => notes_key(&mut app.tui, key),
    }
}

fn apply_mutations(tui: &mut TuiState, mutations: Vec<StateMutation>) {
    for mutation in mutations {
        match mutation {
            StateMutation::AddBook { title } => {
                tui.references.add(&title);
            }
        }
    }
}

fn toggle_view(tui: &mut TuiState) -> Vec<UiEffect> {
    tui.notes.view_mode = tui.notes.view_mode.toggled();
    tui.notes.scroll = 0;
    vec![UiEffect::PersistViewMode {
        mode: tui.notes.view_mode,
    }]
}

fn start_generation(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.notes.generation.is_running() || !tui.can_generate() {
        return Vec::new();
    }
    let Some(path) = tui.controller.selected_path() else {
        return Vec::new();
    };
    let request = GenerateRequest::from_path(
        &path,
        tui.references.books.clone(),
        tui.notes.questions.clone(),
    );
    tui.notes.generation = GenerationState::Running;
    vec![UiEffect::Generate {
        topic_id: path.topic.id,
        request,
    }]
}

fn start_save(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.notes.save.is_saving() || tui.notes.text.is_empty() {
        return Vec::new();
    }
    let Some(topic_id) = tui.selected_topic_id().map(str::to_string) else {
        return Vec::new();
    };
    let Some(exam) = tui.controller.store().selected(Level::Exam) else {
        return Vec::new();
    };
    let exam_id = exam.id.clone();
    tui.notes.save = SaveStatus::Saving;
    vec![UiEffect::SaveNotes {
        topic_id,
        exam_id,
        text: tui.notes.text.clone(),
    }]
}

fn reset_selection(tui: &mut TuiState) {
    tui.controller.reset();
    tui.active_level = Level::Exam;
    for level in Level::all() {
        tui.cursor[*level] = 0;
    }
    tui.notes.clear_document();
    tui.focus = PanelFocus::Selector;
}

fn selector_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(tui, -1);
            Vec::new()
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(tui, 1);
            Vec::new()
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(parent) = tui.active_level.parent() {
                tui.active_level = parent;
            }
            Vec::new()
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(child) = tui.active_level.child()
                && tui.controller.store().selected(tui.active_level).is_some()
            {
                tui.active_level = child;
            }
            Vec::new()
        }
        KeyCode::Enter => select_at_cursor(tui),
        KeyCode::Char('r') => retry_level(tui),
        _ => Vec::new(),
    }
}

fn move_cursor(tui: &mut TuiState, delta: isize) {
    let level = tui.active_level;
    let len = tui.controller.store().options(level).len();
    if len == 0 {
        return;
    }
    let cursor = tui.cursor[level].min(len - 1) as isize + delta;
    tui.cursor[level] = cursor.clamp(0, len as isize - 1) as usize;
}

fn select_at_cursor(tui: &mut TuiState) -> Vec<UiEffect> {
    let level = tui.active_level;
    let Some(node) = tui
        .controller
        .store()
        .options(level)
        .get(tui.cursor[level])
        .cloned()
    else {
        return Vec::new();
    };
    apply_select(tui, level, &node.id)
}

fn retry_level(tui: &mut TuiState) -> Vec<UiEffect> {
    let level = tui.active_level;
    if !matches!(
        tui.controller.store().load_state(level),
        LoadState::Failed { .. }
    ) {
        return Vec::new();
    }
    match tui.controller.retry(level) {
        Some(request) => vec![UiEffect::LoadLevel { request }],
        None => Vec::new(),
    }
}

fn apply_select(tui: &mut TuiState, level: Level, node_id: &str) -> Vec<UiEffect> {
    match tui.controller.select(level, node_id) {
        // Unknown ids are ignored without feedback.
        SelectOutcome::Rejected => Vec::new(),
        SelectOutcome::Applied { load } => {
            for below in level.below() {
                tui.cursor[*below] = 0;
            }
            // Any applied selection invalidates the topic document, its
            // in-flight work included.
            tui.notes.clear_document();
            match load {
                Some(request) => {
                    tui.active_level = request.level;
                    vec![UiEffect::LoadLevel { request }]
                }
                None => start_topic_loads(tui),
            }
        }
    }
}

/// A topic was just selected: pull its saved notes and related questions.
fn start_topic_loads(tui: &mut TuiState) -> Vec<UiEffect> {
    let Some(topic_id) = tui.selected_topic_id().map(str::to_string) else {
        return Vec::new();
    };
    let Some(exam) = tui.controller.store().selected(Level::Exam) else {
        return Vec::new();
    };
    let exam_id = exam.id.clone();
    tui.notes.loading = true;
    vec![
        UiEffect::LoadNotes {
            topic_id: topic_id.clone(),
            exam_id,
        },
        UiEffect::LoadQuestions { topic_id },
    ]
}

fn references_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let references = &mut app.tui.references;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            references.cursor = references.cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            references.cursor = (references.cursor + 1).min(references.books.len().saturating_sub(1));
        }
        KeyCode::Char('a') => {
            app.overlay = Some(Overlay::AddReference(AddReferenceState::open()));
        }
        KeyCode::Char('d') => {
            references.remove_selected();
        }
        KeyCode::Char('J') => {
            references.move_down();
        }
        KeyCode::Char('K') => {
            references.move_up();
        }
        _ => {}
    }
    Vec::new()
}

fn notes_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            tui.notes.scroll = tui.notes.scroll.saturating_sub(1);
            Vec::new()
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(tui, 1);
            Vec::new()
        }
        KeyCode::PageUp => {
            let page = page_height(tui);
            tui.notes.scroll = tui.notes.scroll.saturating_sub(page);
            Vec::new()
        }
        KeyCode::PageDown => {
            let page = page_height(tui);
            scroll_down(tui, page);
            Vec::new()
        }
        KeyCode::Char('r') => {
            if matches!(tui.notes.generation, GenerationState::Failed { .. }) {
                start_generation(tui)
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

fn page_height(tui: &TuiState) -> u16 {
    render::notes_text_size(tui).1.max(1)
}

fn scroll_down(tui: &mut TuiState, delta: u16) {
    let (width, height) = render::notes_text_size(tui);
    let total = features::notes::document_lines(&tui.notes, width).len() as u16;
    let max = total.saturating_sub(height);
    tui.notes.scroll = tui.notes.scroll.saturating_add(delta).min(max);
}

#[cfg(test)]
mod tests {
    use notex_core::catalog::{CatalogError, CatalogErrorKind};
    use notex_core::config::Config;
    use notex_core::content::ViewMode;
    use notex_core::generate::GeneratorErrorKind;

    use super::*;

    fn app() -> AppState {
        AppState::new(Config::default())
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: None,
        }
    }

    fn catalog_err(message: &str) -> CatalogError {
        CatalogError::new(CatalogErrorKind::Timeout, message)
    }

    /// Issues the root load and resolves it with two exams.
    fn load_root(app: &mut AppState) {
        let request = app.tui.controller.start();
        update(
            app,
            UiEvent::LevelLoaded {
                level: Level::Exam,
                ticket: request.ticket,
                result: Ok(vec![node("jee", "JEE"), node("neet", "NEET")]),
            },
        );
    }

    /// Drills from the root down to a selected topic `t1` under exam `jee`.
    /// Returns the effects of the final topic selection.
    fn complete_selection(app: &mut AppState) -> Vec<UiEffect> {
        load_root(app);
        let mut effects = update(app, key(KeyCode::Enter));
        for (level, id, name) in [
            (Level::Course, "c1", "Course One"),
            (Level::Subject, "s1", "Subject One"),
            (Level::Unit, "u1", "Unit One"),
            (Level::Chapter, "ch1", "Chapter One"),
            (Level::Topic, "t1", "Topic One"),
        ] {
            let UiEffect::LoadLevel { request } = effects[0].clone() else {
                panic!("expected a level load, got {effects:?}");
            };
            assert_eq!(request.level, level);
            update(
                app,
                UiEvent::LevelLoaded {
                    level,
                    ticket: request.ticket,
                    result: Ok(vec![node(id, name)]),
                },
            );
            effects = update(app, key(KeyCode::Enter));
        }
        effects
    }

    #[test]
    fn test_quit_on_q_and_ctrl_c() {
        let mut app = app();
        assert_eq!(update(&mut app, key(KeyCode::Char('q'))), vec![UiEffect::Quit]);

        let ctrl_c = UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(update(&mut app, ctrl_c), vec![UiEffect::Quit]);
    }

    #[test]
    fn test_tab_cycles_panels() {
        let mut app = app();
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tui.focus, PanelFocus::References);
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tui.focus, PanelFocus::Notes);
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tui.focus, PanelFocus::Selector);
        update(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.tui.focus, PanelFocus::Notes);
    }

    #[test]
    fn test_key_release_events_are_ignored() {
        let mut app = app();
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(update(&mut app, UiEvent::Terminal(Event::Key(release))).is_empty());
    }

    #[test]
    fn test_failed_root_load_supports_retry() {
        let mut app = app();
        let request = app.tui.controller.start();
        update(
            &mut app,
            UiEvent::LevelLoaded {
                level: Level::Exam,
                ticket: request.ticket,
                result: Err(catalog_err("network down")),
            },
        );
        assert!(matches!(
            app.tui.controller.store().load_state(Level::Exam),
            LoadState::Failed { .. }
        ));

        let effects = update(&mut app, key(KeyCode::Char('r')));
        let UiEffect::LoadLevel { request: retried } = &effects[0] else {
            panic!("expected a retry load");
        };
        assert_eq!(retried.level, Level::Exam);
        assert!(retried.ticket > request.ticket);

        // A second `r` while the retry is in flight does nothing.
        assert!(update(&mut app, key(KeyCode::Char('r'))).is_empty());
    }

    #[test]
    fn test_enter_selects_and_advances_level() {
        let mut app = app();
        load_root(&mut app);
        let effects = update(&mut app, key(KeyCode::Enter));
        let UiEffect::LoadLevel { request } = &effects[0] else {
            panic!("expected a child load");
        };
        assert_eq!(request.level, Level::Course);
        assert_eq!(request.parent_id.as_deref(), Some("jee"));
        assert_eq!(app.tui.active_level, Level::Course);
    }

    #[test]
    fn test_reselection_drops_stale_children() {
        let mut app = app();
        load_root(&mut app);

        // Select JEE, then switch to NEET before its courses arrive.
        let first = update(&mut app, key(KeyCode::Enter));
        let UiEffect::LoadLevel { request: stale } = first[0].clone() else {
            panic!("expected a child load");
        };
        update(&mut app, key(KeyCode::Left));
        update(&mut app, key(KeyCode::Down));
        let second = update(&mut app, key(KeyCode::Enter));
        let UiEffect::LoadLevel { request: live } = second[0].clone() else {
            panic!("expected a child load");
        };

        update(
            &mut app,
            UiEvent::LevelLoaded {
                level: Level::Course,
                ticket: stale.ticket,
                result: Ok(vec![node("jee-course", "JEE Course")]),
            },
        );
        assert!(app.tui.controller.store().options(Level::Course).is_empty());

        update(
            &mut app,
            UiEvent::LevelLoaded {
                level: Level::Course,
                ticket: live.ticket,
                result: Ok(vec![node("neet-course", "NEET Course")]),
            },
        );
        let options = app.tui.controller.store().options(Level::Course);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "neet-course");
    }

    #[test]
    fn test_topic_selection_requests_notes_and_questions() {
        let mut app = app();
        let effects = complete_selection(&mut app);
        assert_eq!(
            effects,
            vec![
                UiEffect::LoadNotes {
                    topic_id: "t1".to_string(),
                    exam_id: "jee".to_string(),
                },
                UiEffect::LoadQuestions {
                    topic_id: "t1".to_string(),
                },
            ]
        );
        assert!(app.tui.notes.loading);
        assert!(app.tui.controller.is_complete());
    }

    #[test]
    fn test_loaded_notes_fill_buffer_and_baseline() {
        let mut app = app();
        complete_selection(&mut app);
        update(
            &mut app,
            UiEvent::NotesLoaded {
                topic_id: "t1".to_string(),
                result: Ok(Some("saved text".to_string())),
            },
        );
        assert!(!app.tui.notes.loading);
        assert_eq!(app.tui.notes.text, "saved text");
        assert!(!app.tui.notes.has_unsaved_changes());
    }

    #[test]
    fn test_missing_notes_leave_buffer_empty() {
        let mut app = app();
        complete_selection(&mut app);
        update(
            &mut app,
            UiEvent::NotesLoaded {
                topic_id: "t1".to_string(),
                result: Ok(None),
            },
        );
        assert!(!app.tui.notes.loading);
        assert!(app.tui.notes.text.is_empty());
        assert!(app.tui.notes.baseline.is_none());
    }

    #[test]
    fn test_notes_for_other_topics_are_dropped() {
        let mut app = app();
        complete_selection(&mut app);
        update(
            &mut app,
            UiEvent::NotesLoaded {
                topic_id: "t-old".to_string(),
                result: Ok(Some("other topic".to_string())),
            },
        );
        assert!(app.tui.notes.text.is_empty());
        assert!(app.tui.notes.loading);
    }

    #[test]
    fn test_generation_needs_a_complete_path_and_a_book() {
        let mut app = app();
        assert!(update(&mut app, key(KeyCode::Char('g'))).is_empty());

        complete_selection(&mut app);
        // Path complete, but no reference book yet.
        assert!(update(&mut app, key(KeyCode::Char('g'))).is_empty());
        assert!(!app.tui.notes.generation.is_running());

        app.tui.references.add("Physics Vol. 1");
        let effects = update(&mut app, key(KeyCode::Char('g')));
        let UiEffect::Generate { topic_id, request } = &effects[0] else {
            panic!("expected a generate effect");
        };
        assert_eq!(topic_id, "t1");
        assert_eq!(request.book_references, vec!["Physics Vol. 1".to_string()]);
        assert!(app.tui.notes.generation.is_running());

        // Pressing again while one is running is a no-op.
        assert!(update(&mut app, key(KeyCode::Char('g'))).is_empty());
    }

    #[test]
    fn test_generation_success_replaces_buffer() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        app.tui.notes.view_mode = ViewMode::Raw;
        update(&mut app, key(KeyCode::Char('g')));

        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t1".to_string(),
                result: Ok("# Kinematics\n\nBodies in motion.".to_string()),
            },
        );
        assert!(!app.tui.notes.generation.is_running());
        assert!(app.tui.notes.text.starts_with("# Kinematics"));
        assert_eq!(app.tui.notes.view_mode, ViewMode::Structured);
        assert!(app.tui.notes.has_unsaved_changes());
    }

    #[test]
    fn test_generation_failure_is_inline_and_retryable() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        update(&mut app, key(KeyCode::Char('g')));
        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t1".to_string(),
                result: Err(GeneratorError::new(
                    GeneratorErrorKind::ApiError,
                    "quota exceeded",
                )),
            },
        );
        assert!(matches!(
            &app.tui.notes.generation,
            GenerationState::Failed { message } if message.contains("quota")
        ));
        assert!(app.tui.notes.text.is_empty());

        // `r` in the notes panel retries.
        update(&mut app, key(KeyCode::Tab));
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tui.focus, PanelFocus::Notes);
        let effects = update(&mut app, key(KeyCode::Char('r')));
        assert!(matches!(effects[0], UiEffect::Generate { .. }));
        assert!(app.tui.notes.generation.is_running());
    }

    #[test]
    fn test_generation_for_other_topics_is_dropped() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        update(&mut app, key(KeyCode::Char('g')));
        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t-old".to_string(),
                result: Ok("stale notes".to_string()),
            },
        );
        assert!(app.tui.notes.generation.is_running());
        assert!(app.tui.notes.text.is_empty());
    }

    #[test]
    fn test_save_lifecycle_updates_status_and_baseline() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        update(&mut app, key(KeyCode::Char('g')));
        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t1".to_string(),
                result: Ok("fresh notes".to_string()),
            },
        );

        let effects = update(&mut app, key(KeyCode::Char('s')));
        assert_eq!(
            effects,
            vec![UiEffect::SaveNotes {
                topic_id: "t1".to_string(),
                exam_id: "jee".to_string(),
                text: "fresh notes".to_string(),
            }]
        );
        assert!(app.tui.notes.save.is_saving());
        // A second `s` while saving is a no-op.
        assert!(update(&mut app, key(KeyCode::Char('s'))).is_empty());

        update(
            &mut app,
            UiEvent::SaveFinished {
                topic_id: "t1".to_string(),
                text: "fresh notes".to_string(),
                result: Ok(()),
            },
        );
        assert!(matches!(app.tui.notes.save, SaveStatus::Saved { .. }));
        assert!(!app.tui.notes.has_unsaved_changes());

        // The confirmation clears after it has lingered long enough.
        if let SaveStatus::Saved { at } = &mut app.tui.notes.save {
            *at = Instant::now() - SAVE_STATUS_LINGER;
        }
        update(&mut app, UiEvent::Tick);
        assert!(matches!(app.tui.notes.save, SaveStatus::Idle));
    }

    #[test]
    fn test_save_failure_keeps_buffer_and_clears_later() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        update(&mut app, key(KeyCode::Char('g')));
        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t1".to_string(),
                result: Ok("fresh notes".to_string()),
            },
        );
        update(&mut app, key(KeyCode::Char('s')));
        update(
            &mut app,
            UiEvent::SaveFinished {
                topic_id: "t1".to_string(),
                text: "fresh notes".to_string(),
                result: Err(catalog_err("disk full")),
            },
        );
        assert!(matches!(
            &app.tui.notes.save,
            SaveStatus::Failed { message, .. } if message.contains("disk full")
        ));
        assert_eq!(app.tui.notes.text, "fresh notes");
        assert!(app.tui.notes.baseline.is_none());

        if let SaveStatus::Failed { at, .. } = &mut app.tui.notes.save {
            *at = Instant::now() - SAVE_STATUS_LINGER;
        }
        update(&mut app, UiEvent::Tick);
        assert!(matches!(app.tui.notes.save, SaveStatus::Idle));
    }

    #[test]
    fn test_empty_buffer_is_not_saved() {
        let mut app = app();
        complete_selection(&mut app);
        assert!(update(&mut app, key(KeyCode::Char('s'))).is_empty());
        assert!(!app.tui.notes.save.is_saving());
    }

    #[test]
    fn test_reset_keeps_root_options() {
        let mut app = app();
        complete_selection(&mut app);
        update(&mut app, key(KeyCode::Char('R')));

        let store = app.tui.controller.store();
        assert_eq!(store.options(Level::Exam).len(), 2);
        assert!(store.selected(Level::Exam).is_none());
        assert!(!app.tui.controller.is_complete());
        assert_eq!(app.tui.active_level, Level::Exam);
        assert!(app.tui.notes.text.is_empty());
    }

    #[test]
    fn test_reselecting_invalidates_the_notes_document() {
        let mut app = app();
        complete_selection(&mut app);
        update(
            &mut app,
            UiEvent::NotesLoaded {
                topic_id: "t1".to_string(),
                result: Ok(Some("old topic notes".to_string())),
            },
        );

        // Move back up and pick the other exam; the document must not
        // survive into the new subtree.
        update(&mut app, key(KeyCode::Left));
        update(&mut app, key(KeyCode::Left));
        update(&mut app, key(KeyCode::Left));
        update(&mut app, key(KeyCode::Left));
        update(&mut app, key(KeyCode::Left));
        assert_eq!(app.tui.active_level, Level::Exam);
        update(&mut app, key(KeyCode::Down));
        update(&mut app, key(KeyCode::Enter));
        assert!(app.tui.notes.text.is_empty());
        assert!(app.tui.notes.baseline.is_none());
    }

    #[test]
    fn test_add_reference_overlay_captures_keys() {
        let mut app = app();
        update(&mut app, key(KeyCode::Tab));
        assert_eq!(app.tui.focus, PanelFocus::References);
        update(&mut app, key(KeyCode::Char('a')));
        assert!(app.overlay.is_some());

        // `q` goes to the overlay input, not to quit.
        assert!(update(&mut app, key(KeyCode::Char('q'))).is_empty());
        assert!(app.overlay.is_some());

        for ch in "uantum".chars() {
            update(&mut app, key(KeyCode::Char(ch)));
        }
        update(&mut app, key(KeyCode::Enter));
        assert!(app.overlay.is_none());
        assert_eq!(app.tui.references.books, vec!["quantum".to_string()]);

        // Duplicates keep the overlay open instead of adding.
        update(&mut app, key(KeyCode::Char('a')));
        for ch in "quantum".chars() {
            update(&mut app, key(KeyCode::Char(ch)));
        }
        update(&mut app, key(KeyCode::Enter));
        assert!(app.overlay.is_some());
        assert_eq!(app.tui.references.books.len(), 1);

        update(&mut app, key(KeyCode::Esc));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_references_can_be_reordered_and_deleted() {
        let mut app = app();
        app.tui.references.add("first");
        app.tui.references.add("second");
        update(&mut app, key(KeyCode::Tab));

        update(&mut app, key(KeyCode::Char('K')));
        assert_eq!(app.tui.references.books, vec!["second", "first"]);
        assert_eq!(app.tui.references.cursor, 0);

        update(&mut app, key(KeyCode::Char('J')));
        assert_eq!(app.tui.references.books, vec!["first", "second"]);

        update(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.tui.references.books, vec!["first"]);
    }

    #[test]
    fn test_view_toggle_persists_preference() {
        let mut app = app();
        app.tui.notes.scroll = 4;
        let effects = update(&mut app, key(KeyCode::Char('v')));
        assert_eq!(
            effects,
            vec![UiEffect::PersistViewMode {
                mode: ViewMode::Raw
            }]
        );
        assert_eq!(app.tui.notes.scroll, 0);
    }

    #[test]
    fn test_notes_scroll_clamps_to_document() {
        let mut app = app();
        complete_selection(&mut app);
        app.tui.references.add("Physics Vol. 1");
        update(&mut app, UiEvent::Frame { width: 80, height: 24 });
        update(&mut app, key(KeyCode::Char('g')));
        let body: String = (0..40)
            .map(|i| format!("line {i}\n"))
            .collect();
        update(
            &mut app,
            UiEvent::GenerationFinished {
                topic_id: "t1".to_string(),
                result: Ok(body),
            },
        );

        update(&mut app, key(KeyCode::Tab));
        update(&mut app, key(KeyCode::Tab));
        for _ in 0..100 {
            update(&mut app, key(KeyCode::Char('j')));
        }
        let (width, height) = render::notes_text_size(&app.tui);
        let total = features::notes::document_lines(&app.tui.notes, width).len() as u16;
        assert_eq!(app.tui.notes.scroll, total.saturating_sub(height));

        update(&mut app, key(KeyCode::PageUp));
        update(&mut app, key(KeyCode::PageUp));
        update(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.tui.notes.scroll, 0);
    }
}
