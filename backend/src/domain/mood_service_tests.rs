//! Tests for the mood service.

use std::sync::Arc;

use chrono::NaiveDate;
use mockall::predicate::always;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixture_clock::FixtureClock;
use crate::domain::ports::{MockEventPublisher, MockMoodRepository, MoodUpsert};
use crate::domain::{ErrorCode, MoodCategory};

#[fixture]
fn user() -> UserId {
    UserId::random()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn request(user_id: UserId, mood_date: Option<NaiveDate>) -> RecordMoodRequest {
    RecordMoodRequest {
        user_id,
        mood_date,
        category: MoodCategory::Calm,
        intensity: 5,
        note: None,
    }
}

fn service(
    repo: MockMoodRepository,
    events: MockEventPublisher,
) -> MoodService<MockMoodRepository> {
    MoodService::new(
        Arc::new(repo),
        Arc::new(events),
        Arc::new(FixtureClock::default()),
    )
}

fn echo_upsert(created: bool) -> impl Fn(&MoodEntry) -> Result<MoodUpsert, MoodRepositoryError> {
    move |entry| {
        Ok(MoodUpsert {
            entry: entry.clone(),
            created,
        })
    }
}

#[rstest]
#[tokio::test]
async fn first_entry_for_a_date_announces_mood_recorded(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_upsert().times(1).returning(echo_upsert(true));
    let mut events = MockEventPublisher::new();
    events
        .expect_publish()
        .withf(move |event| {
            matches!(
                event,
                DomainEvent::MoodRecorded { user_id, mood_date, .. }
                    if *user_id == user && *mood_date == date(2026, 3, 14)
            )
        })
        .times(1)
        .return_const(());

    let response = service(repo, events)
        .record_mood(request(user, None))
        .await
        .expect("record succeeds");

    assert!(response.created);
    assert_eq!(response.entry.mood_date(), date(2026, 3, 14));
}

#[rstest]
#[tokio::test]
async fn overwriting_an_entry_is_silent(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_upsert().times(1).returning(echo_upsert(false));
    let mut events = MockEventPublisher::new();
    events.expect_publish().times(0);

    let response = service(repo, events)
        .record_mood(request(user, Some(date(2026, 3, 10))))
        .await
        .expect("record succeeds");

    assert!(!response.created);
}

#[rstest]
#[case(date(2026, 3, 15), true)]
#[case(date(2026, 3, 16), false)]
#[tokio::test]
async fn dates_more_than_a_day_ahead_are_rejected(
    user: UserId,
    #[case] mood_date: NaiveDate,
    #[case] accepted: bool,
) {
    let mut repo = MockMoodRepository::new();
    repo.expect_upsert()
        .times(usize::from(accepted))
        .returning(echo_upsert(false));

    let result = service(repo, MockEventPublisher::new())
        .record_mood(request(user, Some(mood_date)))
        .await;

    match result {
        Ok(_) => assert!(accepted),
        Err(err) => {
            assert!(!accepted);
            assert_eq!(err.code(), ErrorCode::InvalidRequest);
        }
    }
}

#[rstest]
#[tokio::test]
async fn invalid_intensity_reports_the_field(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_upsert().times(0);
    let mut bad = request(user, None);
    bad.intensity = 0;

    let err = service(repo, MockEventPublisher::new())
        .record_mood(bad)
        .await
        .expect_err("invalid intensity");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "intensity");
}

#[rstest]
#[tokio::test]
async fn repository_outage_maps_to_service_unavailable(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_upsert()
        .return_once(|_| Err(MoodRepositoryError::connection("pool exhausted")));

    let err = service(repo, MockEventPublisher::new())
        .record_mood(request(user, None))
        .await
        .expect_err("outage");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn list_rejects_oversized_ranges(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_list_range().times(0);

    let err = service(repo, MockEventPublisher::new())
        .list_moods(&user, date(2024, 1, 1), date(2025, 6, 1))
        .await
        .expect_err("range too long");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn missing_entry_is_not_found(user: UserId) {
    let mut repo = MockMoodRepository::new();
    repo.expect_find_for_date()
        .with(always(), always())
        .return_once(|_, _| Ok(None));

    let err = service(repo, MockEventPublisher::new())
        .mood_for_date(&user, date(2026, 3, 1))
        .await
        .expect_err("not found");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
