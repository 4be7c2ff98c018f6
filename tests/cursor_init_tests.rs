//! Manual cursor seeding and repair.

mod support;

use activity_sync::client::{Activity, ActivityId, SourceClient, UserId};
use activity_sync::error::SyncError;
use activity_sync::store::{CursorStore, FileCursorStore};
use activity_sync::sync::CursorInitializer;
use rstest::rstest;
use support::*;
use tempfile::TempDir;

#[test]
fn test_init_with_explicit_user() {
    let mut store = RecordingStore::default();

    let written = CursorInitializer::new(None, &mut store)
        .init(Some(user()), ActivityId(305))
        .unwrap();

    assert_eq!(written, user());
    assert_eq!(store.get(&user()).unwrap(), Some(ActivityId(305)));
}

#[test]
fn test_init_resolves_user_from_activity() {
    let source = FakeSource::new(vec![Activity::new(305, "42"), Activity::new(300, "42")]);
    let mut store = RecordingStore::default();

    let written = CursorInitializer::new(Some(&source as &dyn SourceClient), &mut store)
        .init(None, ActivityId(300))
        .unwrap();

    assert_eq!(written, UserId::new("42"));
    assert_eq!(
        store.get(&UserId::new("42")).unwrap(),
        Some(ActivityId(300))
    );
}

#[test]
fn test_init_unknown_activity_is_source_error() {
    let source = FakeSource::new(feed(&[2, 1]));
    let mut store = RecordingStore::default();

    let err = CursorInitializer::new(Some(&source as &dyn SourceClient), &mut store)
        .init(None, ActivityId(99))
        .unwrap_err();

    assert!(matches!(err, SyncError::Source(_)));
    assert!(store.writes.is_empty());
}

#[test]
fn test_init_without_user_or_source_fails() {
    let mut store = RecordingStore::default();
    let err = CursorInitializer::new(None, &mut store)
        .init(None, ActivityId(1))
        .unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}

#[rstest]
#[case::rewind(500, 100)]
#[case::advance(100, 500)]
#[case::same(100, 100)]
fn test_init_overwrites_unconditionally(#[case] existing: u64, #[case] requested: u64) {
    let mut store = RecordingStore::with_cursor(&user(), existing);

    CursorInitializer::new(None, &mut store)
        .init(Some(user()), ActivityId(requested))
        .unwrap();

    assert_eq!(store.get(&user()).unwrap(), Some(ActivityId(requested)));
}

#[test]
fn test_init_persists_to_file_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cursors.json");

    {
        let mut store = FileCursorStore::open(&path).unwrap();
        CursorInitializer::new(None, &mut store)
            .init(Some(UserId::new("9001")), ActivityId(77))
            .unwrap();
    }

    let store = FileCursorStore::open(&path).unwrap();
    assert_eq!(
        store.entries().unwrap(),
        vec![(UserId::new("9001"), ActivityId(77))]
    );
}
