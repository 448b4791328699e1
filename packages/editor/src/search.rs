//! # Search/Replace Engine
//!
//! ```text
//!          find(p)            find_next            replace
//!   Idle ──────────► Indexed ──────────► Highlighted ───────► Indexed
//!    ▲                                                 │
//!    └──────────────────── replace_all ◄───────────────┘
//! ```
//!
//! Each text run is scanned on its own; matches never span runs. The index
//! remembers the document version it was built against and is rebuilt,
//! never patched, whenever the document has moved on.

use crate::errors::{EditError, EditResult};
use crate::selection::{Position, Selection};
use crate::text_ops::replace_in_run;
use quillpad_common::{walk_inline_mut, TextRunCollector, VisitorMut};
use quillpad_model::{Document, Inline, NodeId};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

/// One occurrence inside a text run, in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub node: NodeId,
    pub start: usize,
    pub len: usize,
}

impl Match {
    pub fn to_selection(&self) -> Selection {
        Selection::new(
            Position::new(self.node.clone(), self.start),
            Position::new(self.node.clone(), self.start + self.len),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchState {
    Idle,
    Indexed,
    Highlighted,
}

/// Case-insensitive literal matcher shared by find, replace and replace-all
pub fn matcher(pattern: &str) -> EditResult<Regex> {
    RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| EditError::validation(format!("Invalid search pattern: {}", e)))
}

/// Matches of a regex within one run, converted to character offsets
fn matches_in_run(regex: &Regex, node: &str, text: &str) -> Vec<Match> {
    regex
        .find_iter(text)
        .map(|m| Match {
            node: node.to_string(),
            start: text[..m.start()].chars().count(),
            len: m.as_str().chars().count(),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct SearchEngine {
    pattern: Option<String>,
    regex: Option<Regex>,
    matches: Vec<Match>,
    cursor: Option<usize>,
    highlighted: bool,
    version: u64,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        match (&self.pattern, self.highlighted) {
            (None, _) => SearchState::Idle,
            (Some(_), false) => SearchState::Indexed,
            (Some(_), true) => SearchState::Highlighted,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The highlighted match, if any
    pub fn current(&self) -> Option<&Match> {
        if !self.highlighted {
            return None;
        }
        self.cursor.and_then(|i| self.matches.get(i))
    }

    /// Drop the index and return to Idle
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Index every text run for a pattern; returns the match count
    pub fn find(&mut self, doc: &Document, pattern: &str) -> EditResult<usize> {
        if pattern.is_empty() {
            self.clear();
            return Err(EditError::validation("Enter text to search for"));
        }

        self.regex = Some(matcher(pattern)?);
        self.pattern = Some(pattern.to_string());
        self.rebuild(doc);
        debug!(pattern, matches = self.matches.len(), "Indexed search");
        Ok(self.matches.len())
    }

    /// Advance the circular cursor and highlight the match under it
    pub fn find_next(&mut self, doc: &Document) -> EditResult<Selection> {
        if self.pattern.is_none() {
            return Err(EditError::validation("Enter text to search for"));
        }
        self.ensure_current(doc);
        if self.matches.is_empty() {
            return Err(EditError::no_op("No matches found"));
        }

        let next = match self.cursor {
            Some(i) => (i + 1) % self.matches.len(),
            None => 0,
        };
        self.cursor = Some(next);
        self.highlighted = true;
        Ok(self.matches[next].to_selection())
    }

    /// Replace the highlighted match, then rebuild the index
    ///
    /// The cursor moves to just before the first match remaining in the
    /// same run, so the next `find_next` lands on it. Returns the caret
    /// collapsed after the replacement text.
    pub fn replace(&mut self, doc: &mut Document, replacement: &str) -> EditResult<Selection> {
        self.ensure_current(doc);
        let target = self
            .current()
            .cloned()
            .ok_or_else(|| EditError::no_op("No match selected to replace"))?;

        let caret = replace_in_run(doc, &target.node, target.start, target.len, replacement)?;
        doc.touch();
        self.rebuild(doc);

        self.cursor = self
            .matches
            .iter()
            .position(|m| m.node == target.node)
            .and_then(|i| i.checked_sub(1));

        debug!(node = %target.node, remaining = self.matches.len(), "Replaced match");
        Ok(Selection::collapsed(caret))
    }

    /// Substitute every occurrence in every run and return to Idle
    pub fn replace_all(&mut self, doc: &mut Document, pattern: &str, replacement: &str) -> EditResult<usize> {
        if pattern.is_empty() {
            return Err(EditError::validation("Enter text to search for"));
        }
        let regex = matcher(pattern)?;

        let mut pass = ReplaceAll {
            regex: &regex,
            replacement,
            replaced: 0,
        };
        pass.visit_document_mut(doc);
        let replaced = pass.replaced;

        self.clear();
        if replaced == 0 {
            return Err(EditError::no_op("No matches found"));
        }
        doc.touch();
        debug!(pattern, replaced, "Replaced all");
        Ok(replaced)
    }

    fn ensure_current(&mut self, doc: &Document) {
        if self.pattern.is_some() && self.version != doc.version {
            debug!(built = self.version, now = doc.version, "Search index stale, rebuilding");
            self.rebuild(doc);
        }
    }

    fn rebuild(&mut self, doc: &Document) {
        self.matches = match &self.regex {
            Some(regex) => TextRunCollector::collect(doc)
                .iter()
                .flat_map(|(id, text)| matches_in_run(regex, id, text))
                .collect(),
            None => Vec::new(),
        };
        self.cursor = None;
        self.highlighted = false;
        self.version = doc.version;
    }
}

/// Per-run global substitution
struct ReplaceAll<'a> {
    regex: &'a Regex,
    replacement: &'a str,
    replaced: usize,
}

impl VisitorMut for ReplaceAll<'_> {
    fn visit_inline_mut(&mut self, inline: &mut Inline) {
        if let Inline::Text { text, .. } = inline {
            let count = self.regex.find_iter(text).count();
            if count > 0 {
                *text = self
                    .regex
                    .replace_all(text, NoExpand(self.replacement))
                    .into_owned();
                self.replaced += count;
            }
        }
        walk_inline_mut(self, inline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpad_model::{Block, BlockKind, Wrapper};

    fn doc(text: &str) -> Document {
        Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), text)])])
    }

    #[test]
    fn test_empty_pattern_stays_idle() {
        let mut engine = SearchEngine::new();
        let result = engine.find(&doc("abc"), "");
        assert!(matches!(result, Err(EditError::Validation(_))));
        assert_eq!(engine.state(), SearchState::Idle);
    }

    #[test]
    fn test_find_is_case_insensitive_and_literal() {
        let doc = doc("A.b a.B axb");
        let mut engine = SearchEngine::new();
        assert_eq!(engine.find(&doc, "a.b").unwrap(), 2);
        assert_eq!(engine.state(), SearchState::Indexed);
        assert_eq!(engine.matches()[1].start, 4);
    }

    #[test]
    fn test_offsets_are_characters() {
        let doc = doc("café café");
        let mut engine = SearchEngine::new();
        engine.find(&doc, "CAFÉ").unwrap();
        let starts: Vec<usize> = engine.matches().iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 5]);
        assert_eq!(engine.matches()[0].len, 4);
    }

    #[test]
    fn test_runs_are_scanned_independently() {
        let doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![
                Inline::text("t1".into(), "ca"),
                Inline::styled("b".into(), Wrapper::Bold, vec![Inline::text("t2".into(), "t cat")]),
            ])]);
        let mut engine = SearchEngine::new();
        assert_eq!(engine.find(&doc, "cat").unwrap(), 1);
        assert_eq!(engine.matches()[0].node, "t2");
    }

    #[test]
    fn test_find_next_wraps() {
        let doc = doc("at at");
        let mut engine = SearchEngine::new();
        engine.find(&doc, "at").unwrap();

        let first = engine.find_next(&doc).unwrap();
        let second = engine.find_next(&doc).unwrap();
        let third = engine.find_next(&doc).unwrap();

        assert_eq!(first, third);
        assert_eq!(second.anchor.offset, 3);
        assert_eq!(engine.state(), SearchState::Highlighted);
    }

    #[test]
    fn test_find_next_without_matches_is_no_op() {
        let doc = doc("nothing here");
        let mut engine = SearchEngine::new();
        assert_eq!(engine.find(&doc, "zzz").unwrap(), 0);
        assert!(matches!(engine.find_next(&doc), Err(EditError::NoOp(_))));
        assert_eq!(engine.state(), SearchState::Indexed);
    }

    #[test]
    fn test_replace_rebuilds_and_repositions() {
        let mut doc = doc("The cat sat on the mat");
        let mut engine = SearchEngine::new();
        assert_eq!(engine.find(&doc, "at").unwrap(), 3);
        engine.find_next(&doc).unwrap();

        let caret = engine.replace(&mut doc, "og").unwrap();

        assert_eq!(doc.to_plain_text(), "The cog sat on the mat");
        assert_eq!(caret, Selection::collapsed(Position::new("t", 7)));
        assert_eq!(engine.matches().len(), 2);
        assert_eq!(engine.state(), SearchState::Indexed);

        let next = engine.find_next(&doc).unwrap();
        assert_eq!(next.anchor, Position::new("t", 9));
    }

    #[test]
    fn test_replace_without_highlight_is_no_op() {
        let mut doc = doc("cat");
        let mut engine = SearchEngine::new();
        engine.find(&doc, "cat").unwrap();
        assert!(matches!(engine.replace(&mut doc, "dog"), Err(EditError::NoOp(_))));
        assert_eq!(doc.to_plain_text(), "cat");
    }

    #[test]
    fn test_foreign_mutation_invalidates_index() {
        let mut doc = doc("cat");
        let mut engine = SearchEngine::new();
        engine.find(&doc, "cat").unwrap();
        engine.find_next(&doc).unwrap();

        if let Some(Inline::Text { text, .. }) = doc.inline_mut("t") {
            *text = "a cat and a cat".into();
        }
        doc.touch();

        // The stale highlight is gone and the index reflects the new text
        assert!(matches!(engine.replace(&mut doc, "dog"), Err(EditError::NoOp(_))));
        assert_eq!(engine.matches().len(), 2);
        assert_eq!(engine.find_next(&doc).unwrap().anchor.offset, 2);
    }

    #[test]
    fn test_replace_all_per_run_and_twice() {
        let mut doc = doc("Cat cat CAT $1");
        let mut engine = SearchEngine::new();
        engine.find(&doc, "cat").unwrap();

        assert_eq!(engine.replace_all(&mut doc, "cat", "$1").unwrap(), 3);
        assert_eq!(doc.to_plain_text(), "$1 $1 $1 $1");
        assert_eq!(engine.state(), SearchState::Idle);
        assert!(engine.matches().is_empty());

        let version = doc.version;
        assert!(matches!(
            engine.replace_all(&mut doc, "cat", "dog"),
            Err(EditError::NoOp(_))
        ));
        assert_eq!(doc.version, version);
    }
}
