//! Tests for the chat service.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixture_clock::FixtureClock;
use crate::domain::ports::{MockChatRepository, MockEventPublisher, MockFriendRepository};
use crate::domain::ErrorCode;

type Service = ChatService<MockChatRepository, MockFriendRepository>;

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

fn service(
    chats: MockChatRepository,
    friends: MockFriendRepository,
    events: MockEventPublisher,
) -> Service {
    ChatService::new(
        Arc::new(chats),
        Arc::new(friends),
        Arc::new(events),
        Arc::new(FixtureClock::default()),
    )
}

fn friends_if(answer: bool) -> MockFriendRepository {
    let mut friends = MockFriendRepository::new();
    friends
        .expect_are_friends()
        .returning(move |_, _| Ok(answer));
    friends
}

fn conversation(pair: &Pair) -> Conversation {
    Conversation::between(
        Uuid::new_v4(),
        pair.me,
        pair.them,
        FixtureClock::default_instant(),
    )
    .expect("distinct participants")
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_open_conversations(pair: Pair) {
    let mut chats = MockChatRepository::new();
    chats.expect_insert_conversation().times(0);

    let err = service(chats, friends_if(false), MockEventPublisher::new())
        .open_conversation(&pair.me, &pair.them)
        .await
        .expect_err("not friends");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn existing_conversation_is_reused(pair: Pair) {
    let existing = conversation(&pair);
    let existing_id = existing.id();
    let mut chats = MockChatRepository::new();
    chats
        .expect_find_conversation()
        .return_once(move |_, _| Ok(Some(existing)));
    chats.expect_insert_conversation().times(0);

    let opened = service(chats, friends_if(true), MockEventPublisher::new())
        .open_conversation(&pair.them, &pair.me)
        .await
        .expect("open succeeds");

    assert_eq!(opened.id(), existing_id);
}

#[rstest]
#[tokio::test]
async fn lost_open_race_returns_winner(pair: Pair) {
    let winner = conversation(&pair);
    let winner_id = winner.id();
    let mut lookups = vec![None, Some(winner)].into_iter();
    let mut chats = MockChatRepository::new();
    chats
        .expect_find_conversation()
        .times(2)
        .returning(move |_, _| Ok(lookups.next().flatten()));
    chats
        .expect_insert_conversation()
        .return_once(|_| Err(ChatRepositoryError::duplicate()));

    let opened = service(chats, friends_if(true), MockEventPublisher::new())
        .open_conversation(&pair.me, &pair.them)
        .await
        .expect("open succeeds");

    assert_eq!(opened.id(), winner_id);
}

#[rstest]
#[tokio::test]
async fn send_message_announces_to_peer(pair: Pair) {
    let conv = conversation(&pair);
    let conv_id = conv.id();
    let mut chats = MockChatRepository::new();
    chats
        .expect_find_conversation_by_id()
        .return_once(move |_| Ok(Some(conv)));
    chats.expect_insert_message().times(1).returning(|_| Ok(()));
    let (me, them) = (pair.me, pair.them);
    let mut events = MockEventPublisher::new();
    events
        .expect_publish()
        .withf(move |event| {
            matches!(
                event,
                DomainEvent::MessageSent { sender_id, recipient_id, preview, .. }
                    if *sender_id == me && *recipient_id == them && preview == "See you at 10?"
            )
        })
        .times(1)
        .return_const(());

    let message = service(chats, MockFriendRepository::new(), events)
        .send_message(&pair.me, conv_id, " See you at 10? ".to_owned())
        .await
        .expect("send succeeds");

    assert_eq!(message.content(), "See you at 10?");
}

#[rstest]
#[tokio::test]
async fn outsiders_cannot_send(pair: Pair) {
    let conv = conversation(&pair);
    let conv_id = conv.id();
    let mut chats = MockChatRepository::new();
    chats
        .expect_find_conversation_by_id()
        .return_once(move |_| Ok(Some(conv)));
    chats.expect_insert_message().times(0);

    let err = service(chats, MockFriendRepository::new(), MockEventPublisher::new())
        .send_message(&UserId::random(), conv_id, "hi".to_owned())
        .await
        .expect_err("outsider");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn message_pages_report_next_key(pair: Pair) {
    let conv = conversation(&pair);
    let conv_id = conv.id();
    let now = FixtureClock::default_instant();
    let history: Vec<Message> = (0..3)
        .map(|i| {
            Message::new(
                Uuid::new_v4(),
                conv_id,
                pair.me,
                "hello",
                now - Duration::seconds(i),
            )
            .expect("valid message")
        })
        .collect();
    let expected_next = history[1].key();

    let mut chats = MockChatRepository::new();
    chats
        .expect_find_conversation_by_id()
        .return_once(move |_| Ok(Some(conv)));
    chats
        .expect_list_messages()
        .withf(|_, after, limit| after.is_none() && *limit == 3)
        .return_once(move |_, _, _| Ok(history));

    let page = service(chats, MockFriendRepository::new(), MockEventPublisher::new())
        .list_messages(ListMessagesRequest {
            user_id: pair.them,
            conversation_id: conv_id,
            after: None,
            limit: 2,
        })
        .await
        .expect("page");

    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.next, Some(expected_next));
}
