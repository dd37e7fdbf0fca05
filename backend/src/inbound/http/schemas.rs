//! OpenAPI schema definitions for adapter-level envelopes.
//!
//! `pagination::Paginated<T>` lives in a framework-free crate, so the page
//! shapes returned by list endpoints are described here instead.

use utoipa::ToSchema;

use crate::domain::{Message, Post};

/// OpenAPI schema for `pagination::PaginationLinks`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationLinksSchema {
    /// Link to the current page.
    #[schema(rename = "self", example = "http://localhost:8080/api/v1/feed")]
    self_: String,
    /// Link to the following page, absent on the last page.
    next: Option<String>,
}

/// OpenAPI schema for a page of feed posts.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PostPageSchema {
    data: Vec<Post>,
    /// Opaque cursor for the following page.
    next_cursor: Option<String>,
    links: PaginationLinksSchema,
}

/// OpenAPI schema for a page of chat messages.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MessagePageSchema {
    data: Vec<Message>,
    /// Opaque cursor for the following page.
    next_cursor: Option<String>,
    links: PaginationLinksSchema,
}
