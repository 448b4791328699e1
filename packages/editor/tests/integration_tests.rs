//! End-to-end editing scenarios driven through `EditSession::dispatch`
//!
//! This tests:
//! - Heading escape on Enter
//! - Paragraph splits at styled-run edges
//! - Find / replace cycles
//! - Table structure edits and their limits
//! - Clear formatting
//! - Undo / redo across mixed edits
//! - Rejected intents leave the document untouched

use quillpad_common::IdCollector;
use quillpad_editor::{
    EditSession, EditorConfig, ErrorKind, FormatCommand, ImageCommand, Intent, Outcome, Position,
    RecordingNotifier, Selection, TableCommand,
};
use quillpad_model::{Block, BlockKind, Document, Inline, Wrapper};

fn session() -> EditSession<RecordingNotifier> {
    EditSession::new("integration", EditorConfig::default(), RecordingNotifier::default())
}

fn type_text(session: &mut EditSession<RecordingNotifier>, text: &str) {
    let outcome = session.dispatch(Intent::InsertText { text: text.into() });
    assert!(outcome.is_committed(), "typing {:?} was rejected: {:?}", text, outcome);
}

fn first_table_id(doc: &Document) -> String {
    IdCollector::collect(doc)
        .into_iter()
        .find(|id| doc.find_table(id).is_some())
        .expect("document has a table")
}

fn first_image_id(doc: &Document) -> Option<String> {
    IdCollector::collect(doc)
        .into_iter()
        .find(|id| doc.find_image(id).is_some())
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_enter_in_heading_opens_paragraph() {
    let mut session = session();
    type_text(&mut session, "Title");
    session.dispatch(Intent::Format {
        command: FormatCommand::Block {
            block: BlockKind::Heading1,
        },
    });

    assert!(session.dispatch(Intent::Enter).is_committed());
    assert_eq!(session.block_kind(), BlockKind::Paragraph);
    type_text(&mut session, "body text");

    assert_eq!(session.to_html(), "<h1>Title</h1><p>body text</p>");
}

#[test]
fn test_enter_in_paragraph_splits_it() {
    let mut session = session();
    type_text(&mut session, "first");
    session.dispatch(Intent::Enter);
    type_text(&mut session, "second");

    assert_eq!(session.to_html(), "<p>first</p><p>second</p>");
}

#[test]
fn test_enter_after_bold_run_starts_plain_paragraph() {
    let mut session = session();
    type_text(&mut session, "bold");
    let run = session.selection().unwrap().focus.node.clone();
    session.dispatch(Intent::SetSelection {
        selection: Selection::new(Position::new(run.clone(), 0), Position::new(run, 4)),
    });
    assert!(session
        .dispatch(Intent::Format {
            command: FormatCommand::Bold
        })
        .is_committed());

    let end = session.selection().unwrap().focus.clone();
    session.dispatch(Intent::SetSelection {
        selection: Selection::collapsed(end),
    });
    assert!(session.dispatch(Intent::Enter).is_committed());
    type_text(&mut session, "next");

    assert_eq!(session.to_html(), "<p><b>bold</b></p><p>next</p>");
}

#[test]
fn test_find_replace_cycle() {
    let mut session = session();
    type_text(&mut session, "cat cat cat");

    assert_eq!(
        session.dispatch(Intent::Find {
            pattern: "CAT".into()
        }),
        Outcome::Updated
    );
    assert_eq!(session.notifier().last().unwrap().message, "3 matches found");

    session.dispatch(Intent::FindNext);
    let highlighted = session.selection().unwrap().clone();
    assert_eq!((highlighted.anchor.offset, highlighted.focus.offset), (0, 3));

    assert!(session
        .dispatch(Intent::Replace {
            replacement: "cog".into()
        })
        .is_committed());
    assert_eq!(session.to_plain_text(), "cog cat cat");
    assert_eq!(session.search().matches().len(), 2);

    session.dispatch(Intent::FindNext);
    assert_eq!(session.selection().unwrap().anchor.offset, 4);

    // Typing elsewhere invalidates the index; the next step rebuilds it
    let run = session.selection().unwrap().anchor.node.clone();
    session.dispatch(Intent::SetSelection {
        selection: Selection::collapsed(Position::new(run, 11)),
    });
    type_text(&mut session, " cat");
    assert_eq!(session.to_plain_text(), "cog cat cat cat");
    session.dispatch(Intent::FindNext);
    assert_eq!(session.search().matches().len(), 3);
}

#[test]
fn test_replace_without_highlight_is_rejected() {
    let mut session = session();
    type_text(&mut session, "cat");
    session.dispatch(Intent::Find {
        pattern: "cat".into(),
    });

    let outcome = session.dispatch(Intent::Replace {
        replacement: "dog".into(),
    });
    assert!(matches!(
        outcome,
        Outcome::Rejected {
            kind: ErrorKind::NoOp,
            ..
        }
    ));
    assert_eq!(session.to_plain_text(), "cat");
}

#[test]
fn test_replace_all_then_again_finds_nothing() {
    let mut session = session();
    type_text(&mut session, "a b a");

    let replace_all = || Intent::ReplaceAll {
        pattern: "A".into(),
        replacement: "$x".into(),
    };
    assert!(session.dispatch(replace_all()).is_committed());
    assert_eq!(session.to_plain_text(), "$x b $x");
    assert!(session
        .notifier()
        .messages()
        .contains(&"Replaced 2 occurrences"));

    let version = session.document().version;
    assert!(session.dispatch(replace_all()).is_rejected());
    assert_eq!(session.document().version, version);
}

#[test]
fn test_table_lifecycle() {
    let mut session = session();
    assert!(session
        .dispatch(Intent::InsertTable {
            rows: "2".into(),
            columns: "2".into()
        })
        .is_committed());

    let table_id = first_table_id(session.document());
    let table_cmd = |command| Intent::Table {
        target: table_id.clone(),
        command,
    };

    session.dispatch(table_cmd(TableCommand::AddRow));
    let table = session.document().find_table(&table_id).unwrap();
    assert_eq!((table.row_count(), table.column_count()), (3, 2));

    assert!(session.dispatch(table_cmd(TableCommand::RemoveColumn)).is_committed());
    let before = session.document().clone();
    let outcome = session.dispatch(table_cmd(TableCommand::RemoveColumn));
    assert_eq!(
        outcome,
        Outcome::Rejected {
            kind: ErrorKind::NoOp,
            message: "Cannot remove the last column".into()
        }
    );
    assert_eq!(session.document(), &before);

    assert!(session.dispatch(table_cmd(TableCommand::Delete)).is_committed());
    assert!(session.document().find_table(&table_id).is_none());

    // The context menu still holds the old id
    let stale = session.dispatch(table_cmd(TableCommand::AddRow));
    assert!(matches!(
        stale,
        Outcome::Rejected {
            kind: ErrorKind::NoOp,
            ..
        }
    ));
}

#[test]
fn test_invalid_table_input_changes_nothing() {
    let mut session = session();
    type_text(&mut session, "keep");
    let before = session.document().clone();
    let levels = session.history().undo_levels();

    let outcome = session.dispatch(Intent::InsertTable {
        rows: "abc".into(),
        columns: "2".into(),
    });

    assert!(outcome.is_rejected());
    assert_eq!(session.document(), &before);
    assert_eq!(session.history().undo_levels(), levels);
    assert_eq!(
        session.notifier().last().unwrap().message,
        "Please enter valid numbers for rows and columns"
    );
}

#[test]
fn test_clear_formatting_keeps_semantic_wrappers() {
    let doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
        .with_children(vec![
            Inline::text("a".into(), "a"),
            Inline::Styled {
                id: "s".into(),
                wrapper: Wrapper::Span,
                attributes: quillpad_model::Attributes::with_style("color", "red"),
                children: vec![Inline::text("b".into(), "b")],
            },
            Inline::styled("bold".into(), Wrapper::Bold, vec![Inline::text("c".into(), "c")]),
        ])]);
    let mut session =
        EditSession::from_document("cleanup", doc, EditorConfig::default(), RecordingNotifier::default());

    session.dispatch(Intent::ClearFormatting);
    assert_eq!(session.to_html(), "<p>ab<b>c</b></p>");

    // Second pass is a no-op on content
    session.dispatch(Intent::ClearFormatting);
    assert_eq!(session.to_html(), "<p>ab<b>c</b></p>");
}

#[test]
fn test_undo_redo_across_edits() {
    let mut session = session();
    type_text(&mut session, "one");
    type_text(&mut session, " two");
    assert_eq!(session.to_plain_text(), "one two");

    session.dispatch(Intent::Undo);
    assert_eq!(session.to_plain_text(), "one");
    session.dispatch(Intent::Redo);
    assert_eq!(session.to_plain_text(), "one two");

    session.dispatch(Intent::Undo);
    type_text(&mut session, "!");
    assert_eq!(session.to_plain_text(), "one!");

    // A new edit after undo discards the redo branch
    let outcome = session.dispatch(Intent::Redo);
    assert_eq!(
        outcome,
        Outcome::Rejected {
            kind: ErrorKind::NoOp,
            message: "Nothing to redo".into()
        }
    );
}

#[test]
fn test_undo_to_initial_state_then_stop() {
    let mut session = session();
    let initial = session.to_html();
    type_text(&mut session, "x");

    assert!(session.dispatch(Intent::Undo).is_committed());
    assert_eq!(session.to_html(), initial);
    assert!(session.dispatch(Intent::Undo).is_rejected());
}

#[test]
fn test_history_depth_is_bounded() {
    let config = EditorConfig {
        history_depth: 3,
        ..EditorConfig::default()
    };
    let mut session = EditSession::new("bounded", config, RecordingNotifier::default());
    for word in ["a", "b", "c", "d", "e"] {
        type_text(&mut session, word);
    }

    assert_eq!(session.history().undo_levels(), 3);
    session.dispatch(Intent::Undo);
    session.dispatch(Intent::Undo);
    assert_eq!(session.to_plain_text(), "abc");
    assert!(session.dispatch(Intent::Undo).is_rejected());
}

#[test]
fn test_image_insert_delete_and_undo() {
    let mut session = session();
    assert!(session
        .dispatch(Intent::InsertImage { bytes: png(4, 3) })
        .is_committed());

    let html = session.to_html();
    assert!(html.contains("src=\"data:image/png;base64,"));
    assert!(html.contains("width=\"4\" height=\"3\""));

    let image_id = first_image_id(session.document()).unwrap();
    session.dispatch(Intent::Image {
        target: image_id.clone(),
        command: ImageCommand::Delete,
    });
    assert!(first_image_id(session.document()).is_none());

    session.dispatch(Intent::Undo);
    assert_eq!(first_image_id(session.document()), Some(image_id));
}

#[test]
fn test_undecodable_image_is_external_failure() {
    let mut session = session();
    let before = session.document().clone();

    let outcome = session.dispatch(Intent::InsertImage {
        bytes: b"not an image".to_vec(),
    });

    assert!(matches!(
        outcome,
        Outcome::Rejected {
            kind: ErrorKind::External,
            ..
        }
    ));
    assert_eq!(session.document(), &before);
}

#[test]
fn test_scripted_intents_from_json() -> anyhow::Result<()> {
    let script = r#"[
        {"type": "insertText", "text": "Report"},
        {"type": "format", "command": {"kind": "block", "block": "heading2"}},
        {"type": "enter"},
        {"type": "insertText", "text": "see docs"}
    ]"#;
    let intents: Vec<Intent> = serde_json::from_str(script)?;

    let mut session = session();
    for intent in intents {
        assert!(!session.dispatch(intent).is_rejected());
    }

    assert_eq!(session.to_html(), "<h2>Report</h2><p>see docs</p>");
    Ok(())
}

#[test]
fn test_reset_is_undoable() {
    let mut session = session();
    type_text(&mut session, "draft");

    session.dispatch(Intent::Reset);
    assert_eq!(session.to_plain_text(), "");
    assert_eq!(session.document().blocks.len(), 1);

    session.dispatch(Intent::Undo);
    assert_eq!(session.to_plain_text(), "draft");
}
