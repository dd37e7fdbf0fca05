//! HTTP inbound adapter exposing the `/api/v1` REST surface.

use actix_web::web;

pub mod cache_control;
pub mod chat;
pub mod error;
pub mod friends;
pub mod health;
pub mod moods;
pub mod notifications;
pub mod posts;
pub mod push_tokens;
pub mod rewards;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal paths are registered before their `{id}` siblings so
/// `/notifications/unread-count` never matches `/notifications/{id}/...`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(moods::record_mood)
        .service(moods::list_moods)
        .service(moods::mood_for_date)
        .service(posts::create_post)
        .service(posts::list_feed)
        .service(posts::get_post)
        .service(posts::delete_post)
        .service(posts::toggle_reaction)
        .service(friends::send_friend_request)
        .service(friends::list_pending_requests)
        .service(friends::respond_to_request)
        .service(friends::list_friends)
        .service(chat::open_conversation)
        .service(chat::list_conversations)
        .service(chat::list_messages)
        .service(chat::send_message)
        .service(notifications::unread_count)
        .service(notifications::list_notifications)
        .service(notifications::mark_read)
        .service(push_tokens::register_push_token)
        .service(push_tokens::unregister_push_token)
        .service(rewards::list_rewards)
        .service(rewards::list_achievements);
}
