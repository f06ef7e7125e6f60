use std::sync::Arc;

use core_events::KeyEvent;
use core_graph::{GraphSource, GraphStream, LoadError};
use core_jj::{CommandRunner, JjCommand, RunError};
use core_keymap::KeyMap;
use core_model::{Commit, GraphRowLine, LineFlags, Row, Segment, SegmentRole};
use core_render::list::Chrome;
use core_render::{CellFlags, RenderEngine, Tone, compose_frame};
use core_revisions::{Backend, MemoryClipboard, Msg, RevisionsModel, Settings};
use pretty_assertions::assert_eq;

struct NoRunner;

impl CommandRunner for NoRunner {
    fn run(&self, command: &JjCommand) -> Result<String, RunError> {
        Err(RunError::Failed {
            command: command.to_string(),
            status: "exit status: 1".into(),
            stdout: String::new(),
            stderr: "not available".into(),
        })
    }
}

struct NoSource;

impl GraphSource for NoSource {
    fn open(&self, revset: &str) -> Result<Box<dyn GraphStream>, LoadError> {
        Err(LoadError::NoRevisions {
            revset: revset.to_string(),
        })
    }

    fn load_all(&self, _revset: &str, _limit: usize) -> Result<Vec<Row>, LoadError> {
        Ok(Vec::new())
    }
}

fn row(i: usize, working_copy: bool, extra_line: bool) -> Row {
    let mut commit = Commit::new(format!("r{i:03}"), format!("{i:08x}"));
    if working_copy {
        commit = commit.working_copy();
    }
    let description = format!("change number {i}");
    let mut lines = vec![GraphRowLine {
        gutter: vec![Segment::new(if working_copy { "@  " } else { "○  " })],
        segments: vec![
            Segment::with_role(commit.change_id.clone(), SegmentRole::ChangeId),
            Segment::with_role(description.clone(), SegmentRole::Description),
        ],
        flags: LineFlags::REVISION,
    }];
    if extra_line {
        lines.push(GraphRowLine {
            gutter: vec![Segment::new("│")],
            segments: Vec::new(),
            flags: LineFlags::CONNECTOR,
        });
    }
    Row::new(commit.with_description(description), lines)
}

fn model(rows: Vec<Row>, height: usize) -> RevisionsModel {
    let backend = Backend {
        runner: Arc::new(NoRunner),
        source: Arc::new(NoSource),
        clipboard: Arc::new(MemoryClipboard::default()),
    };
    let mut model = RevisionsModel::new(backend, Settings::default(), KeyMap::default(), "ancestors(@, 10)");
    model.set_viewport_height(height);
    model.update_graph_rows(rows, Some("@"));
    model
}

#[test]
fn lists_rows_with_cursor_and_status() {
    let m = model((0..3).map(|i| row(i, i == 0, false)).collect(), 5);
    let (frame, map) = compose_frame(&m, Chrome::default(), 40, 6);
    assert_eq!(frame.line_text(0), "  @  r000 change number 0");
    assert_eq!(frame.line_text(1), "  ○  r001 change number 1");
    assert!(frame.line(0).iter().all(|c| c.flags.contains(CellFlags::REVERSE)));
    assert!(!frame.line(1)[0].flags.contains(CellFlags::REVERSE));
    assert_eq!(frame.line_text(5), "ancestors(@, 10) | 3 rows");
    assert_eq!(map.row_at(1), Some(1));
    assert_eq!(map.row_at(3), None);
}

#[test]
fn multi_line_rows_map_every_line() {
    let m = model((0..3).map(|i| row(i, i == 0, true)).collect(), 5);
    let (frame, map) = compose_frame(&m, Chrome::default(), 30, 6);
    assert_eq!(frame.line_text(1), "  │");
    assert_eq!(map.row_at(0), Some(0));
    assert_eq!(map.row_at(1), Some(0));
    assert_eq!(map.row_at(2), Some(1));
    // Cursor highlight covers both lines of the working-copy row.
    assert!(frame.line(1)[5].flags.contains(CellFlags::REVERSE));
}

#[test]
fn checked_rows_and_operation_marker() {
    let mut m = model((0..3).map(|i| row(i, i == 0, false)).collect(), 5);
    let commit = m.rows()[1].commit.clone();
    m.toggle_checked(commit);
    m.update(Msg::Key(KeyEvent::char('a')));
    let (frame, _) = compose_frame(&m, Chrome::default(), 120, 6);
    assert!(frame.line_text(1).starts_with("✓ ○  r001"));
    assert!(frame.line_text(1).ends_with("<< abandon >>"));
    assert!(frame.line_text(5).contains("1 checked | [abandon]"));
}

#[test]
fn quick_search_underlines_matches() {
    let mut m = model((0..3).map(|i| row(i, i == 0, false)).collect(), 5);
    m.update(Msg::QuickSearch("Number 2".into()));
    let (frame, _) = compose_frame(&m, Chrome::default(), 40, 6);
    let line = frame.line(2);
    let start = frame.line_text(2).find("number 2").unwrap_or(0);
    assert!(line[start].flags.contains(CellFlags::UNDERLINE));
    assert!(!line[0].flags.contains(CellFlags::UNDERLINE));
    assert!(frame.line_text(5).contains("/number 2"));
}

#[test]
fn flash_and_prompt_chrome() {
    let m = model(vec![row(0, true, false)], 5);
    let chrome = Chrome {
        prompt: None,
        flash: Some(("Copied commit SHA: 00000000", false)),
    };
    let (frame, _) = compose_frame(&m, chrome, 60, 6);
    assert!(frame.line_text(5).ends_with("Copied commit SHA: 00000000"));
    assert_eq!(frame.line(5)[59].tone, Tone::Info);

    let chrome = Chrome {
        prompt: Some("fix"),
        flash: None,
    };
    let (frame, _) = compose_frame(&m, chrome, 60, 6);
    assert_eq!(frame.line_text(5), "/fix_");
}

#[test]
fn empty_list_shows_placeholder() {
    let m = model(Vec::new(), 5);
    let (frame, map) = compose_frame(&m, Chrome::default(), 30, 6);
    assert_eq!(frame.line_text(0), "  No revisions");
    assert_eq!(map.row_at(0), None);
}

#[test]
fn cursor_move_repaints_two_lines() {
    let mut m = model((0..4).map(|i| row(i, i == 0, false)).collect(), 5);
    let mut engine = RenderEngine::new();
    let mut out = Vec::new();
    let (frame, _) = compose_frame(&m, Chrome::default(), 40, 6);
    engine.render(frame, &mut out).unwrap();
    m.update(Msg::Key(KeyEvent::char('j')));
    let (frame, _) = compose_frame(&m, Chrome::default(), 40, 6);
    engine.render(frame, &mut out).unwrap();
    assert_eq!(engine.last_repaint_lines(), &[0, 1]);
}
