mod common;
use common::*;

use core_graph::Batch;
use core_revisions::{Msg, Notice, Settings};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ids(h: &Harness) -> Vec<String> {
    h.model
        .rows()
        .iter()
        .map(|r| r.commit.change_id.clone())
        .collect()
}

#[test]
fn initial_load_pulls_until_viewport_is_full() {
    let h = Harness::loaded(rows(120, Some(3)), 10, 25);

    assert_eq!(h.model.rows().len(), 30);
    assert_eq!(h.cursor(), Some(3));
    assert!(h.model.has_more());
    assert!(!h.model.is_loading());
    assert_eq!(h.source.closed(), 0, "stream stays open for later pages");
    assert_eq!(h.source.opened(), vec![String::new()]);
}

#[test]
fn exhausted_stream_is_closed_and_published() {
    let h = Harness::loaded(rows(15, Some(0)), 10, 25);

    assert_eq!(h.model.rows().len(), 15);
    assert!(!h.model.has_more());
    assert_eq!(h.source.closed(), 1);
}

#[test]
fn rows_updated_notice_follows_every_publish() {
    let mut h = Harness::new(rows(5, Some(0)), 10);
    h.model.set_viewport_height(10);
    let tasks = h.model.init();
    let notices = h.drain(tasks);
    assert_eq!(notices, vec![Notice::RevisionsUpdated]);
}

#[test]
fn stale_batch_is_dropped_and_its_stream_closed() {
    let mut h = Harness::new(rows(40, Some(0)), 10);
    h.model.set_viewport_height(5);

    let open = single_job(h.model.init());
    let pull = single_job(h.model.update(open()));

    // A second refresh overtakes the first while its batch is being pulled.
    let reopen = h.model.update(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    let stale = pull();
    assert!(h.model.update(stale).is_empty());
    assert!(h.model.rows().is_empty());
    assert_eq!(h.source.closed(), 1);

    h.drain(reopen);
    assert_eq!(h.model.rows().len(), 10);
    assert_eq!(h.model.generation(), 2);
}

#[test]
fn stale_stream_open_is_closed() {
    let mut h = Harness::new(rows(40, Some(0)), 10);
    let open = single_job(h.model.init());
    let newer = h.model.update(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    assert!(h.model.update(open()).is_empty());
    assert_eq!(h.source.closed(), 1);
    h.drain(newer);
    assert_eq!(h.model.rows().len(), 10);
}

#[test]
fn request_more_is_a_noop_while_a_pull_is_outstanding() {
    let mut h = Harness::loaded(rows(120, Some(0)), 10, 25);
    h.chars("G");
    assert_eq!(h.cursor(), Some(29));

    let first = h.model.update(Msg::Key(core_events::KeyEvent::char('j')));
    assert_eq!(first.len(), 1);
    let second = h.model.update(Msg::Key(core_events::KeyEvent::char('j')));
    assert!(second.is_empty(), "second pull must wait for the first");

    h.drain(first);
    assert_eq!(h.model.rows().len(), 40);
    assert_eq!(h.cursor(), Some(29));
    assert!(h.model.has_more());
}

#[test]
fn later_pages_are_highlighted_and_announced() {
    let mut h = Harness::loaded(rows(40, Some(0)), 10, 5);
    h.send(Msg::CommandCompleted {
        output: "Rebased 2 commits\n  r003 x\n  r015 y\n".into(),
        error: None,
    });
    h.send(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    assert_eq!(h.model.rows().len(), 10);
    assert!(h.model.row(3).unwrap().is_affected);

    h.chars("G");
    let notices = h.chars("j");

    assert_eq!(h.model.rows().len(), 20);
    assert!(h.model.row(15).unwrap().is_affected);
    assert!(!h.model.row(14).unwrap().is_affected);
    assert_eq!(notices, vec![Notice::RevisionsUpdated]);
}

#[test]
fn open_failure_keeps_rows_and_flashes_diagnostic() {
    let mut h = Harness::loaded(rows(12, Some(0)), 50, 25);
    h.source.set_revset_rows("none()", Vec::new());

    let notices = h.send(Msg::UpdateRevset("none()".into()));

    assert_eq!(
        flashes(&notices),
        vec![("No revisions found for revset `none()`".to_string(), true)]
    );
    assert_eq!(h.model.rows().len(), 12);
    assert_eq!(h.model.revset(), "none()");
    assert!(!h.model.is_loading());
}

#[test]
fn refresh_keeps_cursor_on_same_change() {
    let mut h = Harness::loaded(rows(40, Some(0)), 50, 25);
    h.chars("jjjjj");
    assert_eq!(h.cursor_id(), "r005");

    // New rows pushed on top shift every index down by two.
    let mut shifted = rows(2, None);
    for row in &mut shifted {
        row.commit.change_id = format!("n{}", row.commit.change_id);
    }
    shifted.extend(rows(40, Some(0)));
    h.source.set_rows(shifted);

    h.send(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    assert_eq!(h.cursor(), Some(7));
    assert_eq!(h.cursor_id(), "r005");
}

#[test]
fn refresh_clears_checked_unless_kept() {
    let mut h = Harness::loaded(rows(10, Some(0)), 50, 25);
    h.chars(" ");
    assert_eq!(h.model.checked().len(), 1);

    h.send(Msg::Refresh {
        keep_selections: true,
        selected_revision: None,
    });
    assert_eq!(h.model.checked().len(), 1);

    h.send(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    assert!(h.model.checked().is_empty());
}

#[test]
fn single_shot_load_honours_limit() {
    let settings = Settings {
        log_batching: false,
        limit: 5,
    };
    let mut h = Harness::with_settings(rows(20, Some(2)), 10, settings, "all()");
    let tasks = h.model.init();
    h.drain(tasks);

    assert_eq!(h.model.rows().len(), 5);
    assert_eq!(h.cursor(), Some(2));
    assert!(!h.model.has_more());
    assert_eq!(h.source.opened(), vec!["all()".to_string()]);
}

#[test]
fn stale_single_shot_result_is_ignored() {
    let settings = Settings {
        log_batching: false,
        limit: 0,
    };
    let mut h = Harness::with_settings(rows(4, Some(0)), 10, settings, "");
    let tasks = h.model.init();
    h.drain(tasks);
    let before = ids(&h);

    let old_tag = h.model.generation();
    let pending = h.model.update(Msg::Refresh {
        keep_selections: false,
        selected_revision: None,
    });
    assert!(h.model.update(Msg::RowsLoaded {
        tag: old_tag,
        rows: rows(9, None),
        selected_revision: None,
    })
    .is_empty());
    assert_eq!(ids(&h), before);
    h.drain(pending);
    assert_eq!(h.model.rows().len(), 4);
}

#[test]
fn update_graph_rows_replaces_and_resolves_hint() {
    let mut h = Harness::loaded(rows(3, Some(0)), 10, 25);
    h.model.update_graph_rows(rows(6, Some(5)), Some("r004"));
    assert_eq!(h.model.rows().len(), 6);
    assert_eq!(h.cursor(), Some(4));

    h.model.update_graph_rows(rows(6, Some(5)), Some("missing"));
    assert_eq!(h.cursor(), Some(4), "falls back to the previous revision");
}

proptest! {
    #[test]
    fn batches_from_older_generations_never_touch_rows(
        refreshes in 1usize..5,
        stale_rows in 0usize..20,
        has_more in any::<bool>(),
    ) {
        let mut h = Harness::loaded(rows(30, Some(0)), 50, 10);
        let before = ids(&h);
        for _ in 0..refreshes {
            h.model.update(Msg::Refresh { keep_selections: false, selected_revision: None });
        }
        let current = h.model.generation();
        let closed = h.source.closed();
        for tag in 0..current {
            let stream = h.source.stream(rows(1, None));
            let tasks = h.model.update(Msg::BatchLoaded {
                tag,
                batch: Batch { rows: rows(stale_rows, None), has_more },
                stream,
            });
            prop_assert!(tasks.is_empty());
        }
        prop_assert_eq!(ids(&h), before);
        prop_assert_eq!(h.source.closed(), closed + current as usize);
    }
}
