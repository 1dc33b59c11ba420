mod common;

use common::{TestDb, create_finished_build, create_test_job};
use keeper_store::{FIRST_BUILD_NUMBER, StoreError};

#[tokio::test]
async fn test_new_job_starts_at_first_build_number() {
    let db = TestDb::new().await;
    let store = &db.store;
    create_test_job(store, "fresh").await;

    assert_eq!(
        store.next_build_number("fresh").await.unwrap(),
        FIRST_BUILD_NUMBER
    );
}

#[tokio::test]
async fn test_next_and_increment_hands_out_consecutive_numbers() {
    let db = TestDb::new().await;
    let store = &db.store;
    create_test_job(store, "seq").await;

    let mut handed_out = Vec::new();
    for _ in 0..3 {
        handed_out.push(store.next_and_increment("seq").await.unwrap());
    }

    assert_eq!(handed_out, vec![1, 2, 3]);
    assert_eq!(store.next_build_number("seq").await.unwrap(), 4);
}

#[tokio::test]
async fn test_reset_to_first_number_when_no_builds_remain() {
    let db = TestDb::new().await;
    let store = &db.store;
    create_test_job(store, "empty").await;
    for _ in 0..3 {
        create_finished_build(store, "empty", false).await;
    }
    for number in 1..=3 {
        store.builds().delete("empty", number).await.unwrap();
    }

    store.reset_next_build_number("empty", 1).await.unwrap();

    assert_eq!(store.next_build_number("empty").await.unwrap(), 1);
}

#[tokio::test]
async fn test_reset_below_existing_build_is_rejected() {
    let db = TestDb::new().await;
    let store = &db.store;
    create_test_job(store, "guarded").await;
    for _ in 0..3 {
        create_finished_build(store, "guarded", true).await;
    }

    let err = store
        .reset_next_build_number("guarded", 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidCounterValue {
            value: 3,
            min_allowed: 4,
            ..
        }
    ));

    // counter untouched
    assert_eq!(store.next_build_number("guarded").await.unwrap(), 4);

    store.reset_next_build_number("guarded", 4).await.unwrap();
    assert_eq!(store.next_build_number("guarded").await.unwrap(), 4);
}

#[tokio::test]
async fn test_reset_to_zero_is_rejected() {
    let db = TestDb::new().await;
    let store = &db.store;
    create_test_job(store, "zero").await;

    let err = store.reset_next_build_number("zero", 0).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidCounterValue { min_allowed: 1, .. }
    ));
}

#[tokio::test]
async fn test_counter_on_unknown_job() {
    let db = TestDb::new().await;
    let store = &db.store;

    assert!(matches!(
        store.next_and_increment("ghost").await.unwrap_err(),
        StoreError::JobNotFound(_)
    ));
    assert!(matches!(
        store.reset_next_build_number("ghost", 1).await.unwrap_err(),
        StoreError::JobNotFound(_)
    ));
}
