//! PostgreSQL-backed `ChatRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{Conversation, ConversationSummary, Message, MessageKey, UserId, ordered_pair};

use super::diesel_basic_error_mapping::{
    is_unique_violation, limit_to_i64, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ConversationRow, MessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::{conversations, messages};

/// Diesel-backed implementation of the chat repository port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChatRepositoryError {
    map_basic_pool_error(error, ChatRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ChatRepositoryError {
    if is_unique_violation(&error) {
        return ChatRepositoryError::duplicate();
    }
    map_basic_diesel_error(
        error,
        ChatRepositoryError::query,
        ChatRepositoryError::connection,
    )
}

fn row_to_conversation(row: ConversationRow) -> Conversation {
    Conversation::restore(
        row.id,
        UserId::from_uuid(row.participant_a),
        UserId::from_uuid(row.participant_b),
        row.created_at,
    )
}

fn row_to_message(row: MessageRow) -> Message {
    Message::restore(
        row.id,
        row.conversation_id,
        UserId::from_uuid(row.sender_id),
        row.content,
        row.sent_at,
    )
}

/// Newest activity first.
fn sort_by_activity(summaries: &mut [ConversationSummary]) {
    summaries.sort_by_key(|summary| std::cmp::Reverse(summary.last_activity()));
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn find_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (first, second) = ordered_pair(*a, *b);

        let row = conversations::table
            .filter(conversations::participant_a.eq(first.as_uuid()))
            .filter(conversations::participant_b.eq(second.as_uuid()))
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_conversation))
    }

    async fn insert_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (a, b) = conversation.participants();
        let row = ConversationRow {
            id: conversation.id(),
            participant_a: *a.as_uuid(),
            participant_b: *b.as_uuid(),
            created_at: conversation.created_at(),
        };

        diesel::insert_into(conversations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conversations::table
            .find(conversation_id)
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_conversation))
    }

    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let me = *user_id.as_uuid();

        let rows: Vec<ConversationRow> = conversations::table
            .filter(
                conversations::participant_a
                    .eq(me)
                    .or(conversations::participant_b.eq(me)),
            )
            .select(ConversationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut latest: HashMap<Uuid, Message> = messages::table
            .filter(messages::conversation_id.eq_any(ids))
            .distinct_on(messages::conversation_id)
            .order((
                messages::conversation_id,
                messages::sent_at.desc(),
                messages::id.desc(),
            ))
            .select(MessageRow::as_select())
            .load::<MessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.conversation_id, row_to_message(row)))
            .collect();

        let mut summaries: Vec<ConversationSummary> = rows
            .into_iter()
            .filter_map(|row| {
                let conversation = row_to_conversation(row);
                let peer_id = conversation.peer_of(user_id)?;
                Some(ConversationSummary {
                    id: conversation.id(),
                    peer_id,
                    created_at: conversation.created_at(),
                    last_message: latest.remove(&conversation.id()),
                })
            })
            .collect();
        sort_by_activity(&mut summaries);
        Ok(summaries)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = MessageRow {
            id: message.id(),
            conversation_id: message.conversation_id(),
            sender_id: *message.sender_id().as_uuid(),
            content: message.content().to_owned(),
            sent_at: message.sent_at(),
        };

        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<MessageKey>,
        limit: usize,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .select(MessageRow::as_select())
            .into_boxed();
        if let Some(key) = before {
            query = query.filter(
                messages::sent_at.lt(key.sent_at).or(messages::sent_at
                    .eq(key.sent_at)
                    .and(messages::id.lt(key.id))),
            );
        }

        let rows: Vec<MessageRow> = query
            .order((messages::sent_at.desc(), messages::id.desc()))
            .limit(limit_to_i64(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }
}
