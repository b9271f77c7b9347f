// tests/ingest_dedup.rs
use recent_actions_ingest::ingest::types::Comment;
use recent_actions_ingest::{filter_new, RecentAction};

fn batch(ts: &[i64]) -> Vec<RecentAction> {
    ts.iter().copied().map(RecentAction::at).collect()
}

fn times(v: &[RecentAction]) -> Vec<i64> {
    v.iter().map(|a| a.time_seconds).collect()
}

#[test]
fn filtering_twice_gives_same_answer() {
    let b = batch(&[12, 4, 30, 30, 8, 15]);
    let first = filter_new(b.clone(), 10);
    let second = filter_new(b, 10);
    assert_eq!(first, second);
    assert_eq!(times(&first.0), vec![12, 30, 30, 15]);
    assert_eq!(first.1, 30);
}

#[test]
fn older_item_excluded_but_max_still_wins() {
    let (fresh, wm) = filter_new(batch(&[10, 5]), 7);
    assert_eq!(times(&fresh), vec![10]);
    assert_eq!(wm, 10);

    let (fresh, wm) = filter_new(batch(&[10, 20]), 7);
    assert_eq!(times(&fresh), vec![10, 20]);
    assert_eq!(wm, 20);
}

#[test]
fn empty_batch_keeps_watermark() {
    let (fresh, wm) = filter_new(Vec::<RecentAction>::new(), 42);
    assert!(fresh.is_empty());
    assert_eq!(wm, 42);
}

#[test]
fn all_stale_batch_keeps_watermark() {
    let (fresh, wm) = filter_new(batch(&[3, 3]), 5);
    assert!(fresh.is_empty());
    assert_eq!(wm, 5);
}

#[test]
fn unsorted_feed_order_is_preserved() {
    let (fresh, wm) = filter_new(batch(&[90, 110, 105]), 100);
    assert_eq!(times(&fresh), vec![110, 105]);
    assert_eq!(wm, 110);
}

#[test]
fn payload_passes_through_untouched() {
    let mut a = RecentAction::at(50);
    a.comment = Some(Comment {
        id: 1,
        creation_time_seconds: 50,
        commentator_handle: "petr".into(),
        text: "<p>first!</p>".into(),
        parent_comment_id: Some(7),
        ..Comment::default()
    });
    let (fresh, _) = filter_new(vec![a.clone()], 0);
    assert_eq!(fresh, vec![a]);
}
