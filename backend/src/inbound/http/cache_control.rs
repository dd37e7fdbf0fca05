//! Cache headers for per-user responses.

use actix_web::http::header::CACHE_CONTROL;

/// Value for responses that depend on the session: shared caches must not
/// store them and browsers must revalidate.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Header pair for `HttpResponseBuilder::insert_header`.
pub const fn private_no_cache_header() -> (actix_web::http::header::HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
