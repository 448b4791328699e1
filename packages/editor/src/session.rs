//! # Edit Session
//!
//! One editing surface: owns the document and every piece of state that
//! tracks it. There is no process-wide editor; construct one session per
//! surface and feed it [`Intent`]s.
//!
//! Every intent is all-or-nothing. A rejected intent leaves the document
//! exactly as it was and is reported through the [`Notifier`]; a committed
//! one bumps the document version, records a history snapshot and
//! revalidates the selection.

use crate::blocks;
use crate::config::EditorConfig;
use crate::errors::{EditError, EditResult, ErrorKind};
use crate::formatting::{self, apply_link, apply_style, font_size_value, toggle_wrapper};
use crate::gesture::{set_placement, Gesture, GestureCommit};
use crate::images::{self, apply_crop, apply_image_command, CropJob};
use crate::intent::{FormatCommand, Intent};
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::search::SearchEngine;
use crate::selection::{block_kind_indicator, end_of_document, Selection};
use crate::tables::{apply_table_command, insert_table, TableDimensions};
use crate::text_ops::{insert_text, insertion_point_or_end};
use crate::undo_stack::UndoStack;
use chrono::Utc;
use quillpad_common::{IdCollector, SessionBundle};
use quillpad_model::{Block, BlockKind, Document, IdGenerator, Serializer, Wrapper};
use tracing::{debug, warn};

/// What a dispatched intent did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document changed; `version` is the new document version
    Committed { version: u64 },
    /// Only session state changed (selection, search, gesture)
    Updated,
    /// Nothing was changed; the reason went to the notifier
    Rejected { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }
}

pub struct EditSession<N: Notifier = LogNotifier> {
    name: String,
    document: Document,
    ids: IdGenerator,
    selection: Option<Selection>,
    search: SearchEngine,
    history: UndoStack,
    gesture: Gesture,
    block_kind: BlockKind,
    config: EditorConfig,
    notifier: N,
    /// Hand crops to the caller instead of rasterizing them inline
    defer_crops: bool,
    crop_jobs: Vec<CropJob>,
}

impl EditSession<LogNotifier> {
    /// Session with default settings, logging its notices
    pub fn untitled() -> Self {
        Self::new("untitled", EditorConfig::default(), LogNotifier)
    }
}

impl<N: Notifier> EditSession<N> {
    /// Start on an empty document (one blank paragraph)
    pub fn new(name: &str, config: EditorConfig, notifier: N) -> Self {
        let mut ids = IdGenerator::new(name);
        let document = Document::new(&mut ids);
        Self::with_document(name, document, ids, config, notifier)
    }

    /// Start on existing content
    pub fn from_document(name: &str, document: Document, config: EditorConfig, notifier: N) -> Self {
        let mut ids = IdGenerator::new(name);
        let existing = IdCollector::collect(&document);
        ids.advance_past(existing.iter().map(String::as_str));
        Self::with_document(name, document, ids, config, notifier)
    }

    /// Seed a session from the last persisted bundle
    pub fn from_bundle(
        name: &str,
        bundle: &SessionBundle,
        config: EditorConfig,
        notifier: N,
    ) -> EditResult<Self> {
        let mut document = Document::from_blocks(Vec::new());
        document.restore_snapshot(&bundle.content)?;
        if document.blocks.is_empty() {
            document.blocks.push(Block::new(format!("{}-restored", name), BlockKind::Paragraph));
        }
        debug!(name, title = %bundle.title, "Restored session bundle");
        Ok(Self::from_document(name, document, config, notifier))
    }

    fn with_document(
        name: &str,
        document: Document,
        ids: IdGenerator,
        config: EditorConfig,
        notifier: N,
    ) -> Self {
        let mut history = UndoStack::with_max_levels(config.history_depth);
        // Initial state is the history floor
        if let Err(e) = history.record(&document) {
            warn!(error = %e, "Could not record initial snapshot");
        }
        let selection = end_of_document(&document);
        let block_kind = block_kind_indicator(&document, selection.as_ref());

        Self {
            name: name.to_string(),
            document,
            ids,
            selection,
            search: SearchEngine::new(),
            history,
            gesture: Gesture::Idle,
            block_kind,
            config,
            notifier,
            defer_crops: false,
            crop_jobs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Value shown by the heading selector
    pub fn block_kind(&self) -> BlockKind {
        self.block_kind
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Queue crops as [`CropJob`]s instead of rasterizing them inline
    pub fn set_defer_crops(&mut self, defer: bool) {
        self.defer_crops = defer;
    }

    /// Crop jobs waiting to run; feed each result back as
    /// [`Intent::CompleteCrop`]
    pub fn take_crop_jobs(&mut self) -> Vec<CropJob> {
        std::mem::take(&mut self.crop_jobs)
    }

    pub fn to_html(&self) -> String {
        Serializer::new().serialize(&self.document)
    }

    pub fn to_plain_text(&self) -> String {
        self.document.to_plain_text()
    }

    /// Snapshot plus metadata for the persistence collaborator
    pub fn to_bundle(&self, title: &str, author: &str, dark_theme: bool) -> EditResult<SessionBundle> {
        Ok(SessionBundle {
            content: self.document.to_snapshot()?,
            title: title.to_string(),
            author: author.to_string(),
            dark_theme,
            saved_at: Utc::now(),
        })
    }

    /// Apply one UI intent
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        let name = intent.name();
        debug!(intent = name, version = self.document.version, "Dispatching intent");

        // Restored when the intent fails
        let checkpoint = intent.can_mutate().then(|| self.document.clone());

        match self.apply(intent) {
            Ok(outcome) => outcome,
            Err(error) => {
                if let Some(document) = checkpoint {
                    self.document = document;
                }
                let kind = error.kind();
                let message = error.to_string();
                debug!(intent = name, ?kind, %message, "Intent rejected");

                let duration = self.config.notice_duration();
                self.notifier.notify(Notice::error(kind, message.clone(), duration));
                Outcome::Rejected { kind, message }
            }
        }
    }

    fn apply(&mut self, intent: Intent) -> EditResult<Outcome> {
        match intent {
            Intent::SetSelection { selection } => {
                let known = self.document.contains(&selection.anchor.node)
                    && self.document.contains(&selection.focus.node);
                if !known {
                    return Err(EditError::validation(
                        "Selection refers to content that is no longer in the document",
                    ));
                }
                self.selection = selection.revalidate(&self.document);
                self.sync_block_kind();
                Ok(Outcome::Updated)
            }

            Intent::CaretMoved => {
                self.sync_block_kind();
                Ok(Outcome::Updated)
            }

            Intent::InsertText { text } => {
                if text.is_empty() {
                    return Err(EditError::no_op("Nothing to insert"));
                }
                let point =
                    insertion_point_or_end(&mut self.document, self.selection.as_ref(), &mut self.ids)?;
                let caret = insert_text(&mut self.document, &point, &text, &mut self.ids)?;
                self.commit(Some(Selection::collapsed(caret)))
            }

            Intent::Enter => {
                let caret = self
                    .selection
                    .as_ref()
                    .map(|s| s.caret().clone())
                    .or_else(|| end_of_document(&self.document).map(|s| s.focus))
                    .ok_or_else(|| EditError::validation("The document has no place for a line break"))?;
                let outcome = blocks::enter(&mut self.document, &caret, &mut self.ids)?;
                self.commit(Some(outcome.caret().clone()))
            }

            Intent::Format { command } => self.format(command),

            Intent::InsertImage { bytes } => {
                let (_, caret) =
                    images::insert_image(&mut self.document, self.selection.as_ref(), bytes, &mut self.ids)?;
                self.commit(Some(caret))
            }

            Intent::InsertImageUri { uri, width, height } => {
                let (_, caret) = images::insert_image_uri(
                    &mut self.document,
                    self.selection.as_ref(),
                    uri,
                    width,
                    height,
                    &mut self.ids,
                )?;
                self.commit(Some(caret))
            }

            Intent::InsertTable { rows, columns } => {
                let dimensions = TableDimensions::parse(&rows, &columns)?;
                let (_, caret) =
                    insert_table(&mut self.document, self.selection.as_ref(), dimensions, &mut self.ids)?;
                self.commit(Some(caret))
            }

            Intent::Image { target, command } => {
                apply_image_command(&mut self.document, &target, &command)?;
                let selection = self.selection.clone();
                self.commit(selection)
            }

            Intent::Table { target, command } => {
                apply_table_command(&mut self.document, &target, command, &mut self.ids)?;
                let selection = self.selection.clone();
                self.commit(selection)
            }

            Intent::Pointer { event } => {
                let commit = self.gesture.handle(&self.document, event);
                match commit {
                    Ok(Some(commit)) => self.finish_gesture(commit),
                    Ok(None) => Ok(Outcome::Updated),
                    Err(e) => {
                        self.gesture = Gesture::Idle;
                        Err(e)
                    }
                }
            }

            Intent::CompleteCrop { outcome } => {
                apply_crop(&mut self.document, outcome)?;
                let selection = self.selection.clone();
                self.commit(selection)
            }

            Intent::Find { pattern } => {
                let count = self.search.find(&self.document, &pattern)?;
                if count == 0 {
                    return Err(EditError::no_op("No matches found"));
                }
                self.inform(format!("{} matches found", count));
                Ok(Outcome::Updated)
            }

            Intent::FindNext => {
                let highlight = self.search.find_next(&self.document)?;
                self.selection = Some(highlight);
                self.sync_block_kind();
                Ok(Outcome::Updated)
            }

            Intent::Replace { replacement } => {
                // The engine commits the text change and rebuilds its index
                let caret = self.search.replace(&mut self.document, &replacement)?;
                self.settle(Some(caret))
            }

            Intent::ReplaceAll { pattern, replacement } => {
                let replaced = self.search.replace_all(&mut self.document, &pattern, &replacement)?;
                self.inform(format!("Replaced {} occurrences", replaced));
                let selection = self.selection.clone();
                self.settle(selection)
            }

            Intent::Undo => {
                self.history.undo(&mut self.document)?;
                self.restored()
            }

            Intent::Redo => {
                self.history.redo(&mut self.document)?;
                self.restored()
            }

            Intent::ClearFormatting => {
                let unwrapped = formatting::clear_formatting(&mut self.document, self.config.clear_formatting);
                debug!(unwrapped, "Cleared formatting");
                let selection = self.selection.clone();
                self.commit(selection)
            }

            Intent::Reset => {
                self.document.reset(&mut self.ids);
                self.search.clear();
                self.gesture = Gesture::Idle;
                self.commit(None)
            }
        }
    }

    fn format(&mut self, command: FormatCommand) -> EditResult<Outcome> {
        if let FormatCommand::Block { block } = command {
            let caret = self
                .selection
                .as_ref()
                .map(|s| s.caret().clone())
                .ok_or_else(|| EditError::validation("Place the caret in a line first"))?;
            blocks::set_block_kind(&mut self.document, &caret, block)?;
            let selection = self.selection.clone();
            return self.commit(selection);
        }

        let selection = self
            .selection
            .clone()
            .ok_or_else(|| EditError::validation("Select some text to format"))?;
        let doc = &mut self.document;
        let ids = &mut self.ids;

        let wrapped = match command {
            FormatCommand::Bold => toggle_wrapper(doc, &selection, Wrapper::Bold, ids)?,
            FormatCommand::Italic => toggle_wrapper(doc, &selection, Wrapper::Italic, ids)?,
            FormatCommand::Underline => toggle_wrapper(doc, &selection, Wrapper::Underline, ids)?,
            FormatCommand::FontName { family } => apply_style(doc, &selection, "font-family", &family, ids)?,
            FormatCommand::FontSize { size } => {
                let value = font_size_value(&size)?;
                apply_style(doc, &selection, "font-size", &value, ids)?
            }
            FormatCommand::Link { href } => apply_link(doc, &selection, &href, ids)?,
            FormatCommand::Block { .. } => selection,
        };
        self.commit(Some(wrapped))
    }

    fn finish_gesture(&mut self, commit: GestureCommit) -> EditResult<Outcome> {
        match commit {
            GestureCommit::Resize { target, width, height } => {
                images::resize(&mut self.document, &target, width, height)?;
            }
            GestureCommit::Move { target, placement } => {
                set_placement(&mut self.document, &target, placement)?;
            }
            GestureCommit::Crop { target, region } => {
                let job = CropJob::new(&self.document, &target, region)?;
                if self.defer_crops {
                    debug!(image = job.image_id(), "Deferred crop");
                    self.crop_jobs.push(job);
                    return Ok(Outcome::Updated);
                }
                apply_crop(&mut self.document, job.run()?)?;
            }
        }
        let selection = self.selection.clone();
        self.commit(selection)
    }

    /// Mark a mutation and settle the session around it
    fn commit(&mut self, selection: Option<Selection>) -> EditResult<Outcome> {
        self.document.touch();
        self.settle(selection)
    }

    /// Record history and repair the selection after a committed mutation
    fn settle(&mut self, selection: Option<Selection>) -> EditResult<Outcome> {
        self.history.record(&self.document)?;
        self.selection = selection
            .and_then(|s| s.revalidate(&self.document))
            .or_else(|| end_of_document(&self.document));
        self.sync_block_kind();
        Ok(Outcome::Committed {
            version: self.document.version,
        })
    }

    /// After undo/redo: caret to the end of the restored document
    fn restored(&mut self) -> EditResult<Outcome> {
        self.document.touch();
        self.gesture = Gesture::Idle;
        self.selection = end_of_document(&self.document);
        self.sync_block_kind();
        Ok(Outcome::Committed {
            version: self.document.version,
        })
    }

    fn sync_block_kind(&mut self) {
        self.block_kind = block_kind_indicator(&self.document, self.selection.as_ref());
    }

    fn inform(&mut self, message: String) {
        let duration = self.config.notice_duration();
        self.notifier.notify(Notice::info(message, duration));
    }
}
