//! Tests for the friend service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixture_clock::FixtureClock;
use crate::domain::ports::{MockEventPublisher, MockFriendRepository, MockUserRepository};
use crate::domain::{DisplayName, ErrorCode, User};

type Service = FriendService<MockFriendRepository, MockUserRepository>;

struct Pair {
    me: UserId,
    them: UserId,
}

#[fixture]
fn pair() -> Pair {
    Pair {
        me: UserId::random(),
        them: UserId::random(),
    }
}

fn known_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|id| {
        Ok(Some(User::new(
            *id,
            DisplayName::new("Grace Hopper").expect("display name"),
        )))
    });
    users
}

fn service(friends: MockFriendRepository, events: MockEventPublisher) -> Service {
    FriendService::new(
        Arc::new(friends),
        Arc::new(known_users()),
        Arc::new(events),
        Arc::new(FixtureClock::default()),
    )
}

fn request(sender: UserId, receiver: UserId, status: FriendStatus) -> FriendRequest {
    FriendRequest::restore(
        Uuid::new_v4(),
        sender,
        receiver,
        status,
        FixtureClock::default_instant(),
        None,
    )
}

fn existing(
    friends: &mut MockFriendRepository,
    forward: Option<FriendRequest>,
    reverse: Option<FriendRequest>,
) {
    let mut answers = vec![forward, reverse].into_iter();
    friends
        .expect_find_request()
        .times(2)
        .returning(move |_, _| Ok(answers.next().flatten()));
}

#[rstest]
#[tokio::test]
async fn self_requests_are_invalid(pair: Pair) {
    let err = service(MockFriendRepository::new(), MockEventPublisher::new())
        .send_request(&pair.me, &pair.me)
        .await
        .expect_err("self request");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn fresh_request_is_inserted_and_announced(pair: Pair) {
    let mut friends = MockFriendRepository::new();
    existing(&mut friends, None, None);
    friends.expect_insert().times(1).returning(|_| Ok(()));
    let mut events = MockEventPublisher::new();
    events
        .expect_publish()
        .withf(|event| matches!(event, DomainEvent::FriendRequested { .. }))
        .times(1)
        .return_const(());

    let sent = service(friends, events)
        .send_request(&pair.me, &pair.them)
        .await
        .expect("request sent");

    assert_eq!(sent.status(), FriendStatus::Pending);
    assert_eq!(sent.sender_id(), &pair.me);
}

#[rstest]
#[case::pending_forward(Some(FriendStatus::Pending), None)]
#[case::accepted_forward(Some(FriendStatus::Accepted), None)]
#[case::accepted_reverse(None, Some(FriendStatus::Accepted))]
#[tokio::test]
async fn open_or_settled_pairs_conflict(
    pair: Pair,
    #[case] forward: Option<FriendStatus>,
    #[case] reverse: Option<FriendStatus>,
) {
    let mut friends = MockFriendRepository::new();
    existing(
        &mut friends,
        forward.map(|status| request(pair.me, pair.them, status)),
        reverse.map(|status| request(pair.them, pair.me, status)),
    );
    friends.expect_insert().times(0);

    let err = service(friends, MockEventPublisher::new())
        .send_request(&pair.me, &pair.them)
        .await
        .expect_err("conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn reverse_pending_request_is_auto_accepted(pair: Pair) {
    let incoming = request(pair.them, pair.me, FriendStatus::Pending);
    let incoming_id = incoming.id();
    let mut friends = MockFriendRepository::new();
    existing(&mut friends, None, Some(incoming));
    friends.expect_are_friends().times(1).returning(|_, _| Ok(false));
    friends
        .expect_update_status()
        .withf(|req| req.status() == FriendStatus::Accepted)
        .times(1)
        .returning(|_| Ok(()));
    friends.expect_insert().times(0);
    let (me, them) = (pair.me, pair.them);
    let mut events = MockEventPublisher::new();
    events
        .expect_publish()
        .withf(move |event| {
            matches!(
                event,
                DomainEvent::FriendAccepted { requester_id, accepter_id, .. }
                    if *requester_id == them && *accepter_id == me
            )
        })
        .times(1)
        .return_const(());

    let accepted = service(friends, events)
        .send_request(&pair.me, &pair.them)
        .await
        .expect("auto accept");

    assert_eq!(accepted.id(), incoming_id);
    assert_eq!(accepted.status(), FriendStatus::Accepted);
}

#[rstest]
#[tokio::test]
async fn rejected_request_can_be_resent(pair: Pair) {
    let rejected = request(pair.me, pair.them, FriendStatus::Rejected);
    let rejected_id = rejected.id();
    let mut friends = MockFriendRepository::new();
    existing(&mut friends, Some(rejected), None);
    friends
        .expect_delete()
        .withf(move |id| *id == rejected_id)
        .times(1)
        .returning(|_| Ok(()));
    friends.expect_insert().times(1).returning(|_| Ok(()));
    let mut events = MockEventPublisher::new();
    events.expect_publish().times(1).return_const(());

    let sent = service(friends, events)
        .send_request(&pair.me, &pair.them)
        .await
        .expect("resend");

    assert_ne!(sent.id(), rejected_id);
}

#[rstest]
#[tokio::test]
async fn concurrent_duplicate_insert_conflicts(pair: Pair) {
    let mut friends = MockFriendRepository::new();
    existing(&mut friends, None, None);
    friends
        .expect_insert()
        .return_once(|_| Err(FriendRepositoryError::duplicate()));
    let mut events = MockEventPublisher::new();
    events.expect_publish().times(0);

    let err = service(friends, events)
        .send_request(&pair.me, &pair.them)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn only_the_receiver_may_respond(pair: Pair) {
    let pending = request(pair.me, pair.them, FriendStatus::Pending);
    let id = pending.id();
    let mut friends = MockFriendRepository::new();
    friends
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(pending)));
    friends.expect_update_status().times(0);

    let err = service(friends, MockEventPublisher::new())
        .respond(&pair.me, id, true)
        .await
        .expect_err("sender cannot accept");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn accepting_a_second_request_for_an_existing_friendship_conflicts(pair: Pair) {
    let crossing = request(pair.me, pair.them, FriendStatus::Pending);
    let id = crossing.id();
    let mut friends = MockFriendRepository::new();
    friends
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(crossing)));
    friends.expect_are_friends().times(1).returning(|_, _| Ok(true));
    friends.expect_update_status().times(0);
    let mut events = MockEventPublisher::new();
    events.expect_publish().times(0);

    let err = service(friends, events)
        .respond(&pair.them, id, true)
        .await
        .expect_err("friendship already exists");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn answered_requests_conflict(pair: Pair) {
    let accepted = request(pair.me, pair.them, FriendStatus::Accepted);
    let id = accepted.id();
    let mut friends = MockFriendRepository::new();
    friends
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(accepted)));

    let err = service(friends, MockEventPublisher::new())
        .respond(&pair.them, id, false)
        .await
        .expect_err("already answered");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn rejection_is_silent(pair: Pair) {
    let pending = request(pair.me, pair.them, FriendStatus::Pending);
    let id = pending.id();
    let mut friends = MockFriendRepository::new();
    friends
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(pending)));
    friends.expect_update_status().times(1).returning(|_| Ok(()));
    let mut events = MockEventPublisher::new();
    events.expect_publish().times(0);

    let rejected = service(friends, events)
        .respond(&pair.them, id, false)
        .await
        .expect("reject");

    assert_eq!(rejected.status(), FriendStatus::Rejected);
}
