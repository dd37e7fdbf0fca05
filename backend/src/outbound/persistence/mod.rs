//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel rows and domain types. Rules such as "one mood per day" or "one
//!   reward per achievement" are backed by unique constraints so concurrent
//!   writers cannot break them.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Database errors are mapped to the port error
//!   of each repository.
//!
//! # Example
//!
//! ```no_run
//! use homecafe::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/homecafe")).await?;
//! let posts = DieselPostRepository::new(pool);
//! # let _ = posts;
//! # Ok(())
//! # }
//! ```

mod diesel_achievement_repository;
mod diesel_activity_stats_repository;
mod diesel_basic_error_mapping;
mod diesel_chat_repository;
mod diesel_friend_repository;
mod diesel_mood_repository;
mod diesel_notification_repository;
mod diesel_post_repository;
mod diesel_push_token_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_achievement_repository::DieselAchievementRepository;
pub use diesel_activity_stats_repository::DieselActivityStatsRepository;
pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_friend_repository::DieselFriendRepository;
pub use diesel_mood_repository::DieselMoodRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_push_token_repository::DieselPushTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
