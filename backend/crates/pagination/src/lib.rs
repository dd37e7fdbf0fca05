//! Keyset pagination primitives shared by the HTTP adapters.
//!
//! Cursors are opaque to clients: a cursor wraps a serializable key, encodes
//! it as JSON and then as unpadded URL-safe base64. Pages are wrapped in a
//! [`Paginated`] envelope that carries the data, the next cursor and
//! ready-made navigation links.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default number of items returned when the client does not ask for a size.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 50;

/// Errors raised while decoding a client supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The cursor was not valid base64.
    #[error("cursor is not valid base64: {message}")]
    Encoding {
        /// Decoder diagnostic.
        message: String,
    },
    /// The decoded bytes did not match the expected key shape.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Deserializer diagnostic.
        message: String,
    },
}

/// Opaque cursor wrapping a keyset position.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::new((42_u64, "abc".to_owned()));
/// let encoded = cursor.encode().expect("encode cursor");
/// let decoded: Cursor<(u64, String)> = Cursor::decode(&encoded).expect("decode cursor");
/// assert_eq!(decoded.key(), &(42, "abc".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a key in a cursor.
    pub fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Unwrap the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K> Cursor<K>
where
    K: Serialize,
{
    /// Encode the cursor into its opaque string form.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialized.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K> Cursor<K>
where
    K: DeserializeOwned,
{
    /// Decode a cursor previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for invalid base64 and
    /// [`CursorError::Payload`] when the JSON does not match `K`.
    pub fn decode(raw: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|err| CursorError::Encoding {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}

/// Errors raised while normalising page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageParamsError {
    /// The requested limit was outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {max}, got {requested}")]
    LimitOutOfRange {
        /// Value supplied by the client.
        requested: usize,
        /// Largest accepted value.
        max: usize,
    },
}

/// Query parameters accepted by paginated endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Opaque cursor returned by a previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Requested page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl PageParams {
    /// Resolve the effective page size.
    ///
    /// # Errors
    /// Returns [`PageParamsError::LimitOutOfRange`] when the client asked for
    /// zero items or more than [`MAX_LIMIT`].
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageParams, DEFAULT_LIMIT};
    ///
    /// assert_eq!(PageParams::default().limit(), Ok(DEFAULT_LIMIT));
    /// ```
    pub fn limit(&self) -> Result<usize, PageParamsError> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(requested) if (1..=MAX_LIMIT).contains(&requested) => Ok(requested),
            Some(requested) => Err(PageParamsError::LimitOutOfRange {
                requested,
                max: MAX_LIMIT,
            }),
        }
    }
}

/// Navigation links attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the following page, if there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Response envelope for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Cursor for the following page, absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Build a page envelope for `request_url`.
    ///
    /// The `next` link reuses the request URL with `cursor` replaced and
    /// `limit` pinned to the effective page size.
    ///
    /// # Examples
    /// ```
    /// use pagination::Paginated;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost/api/v1/feed").expect("url");
    /// let page = Paginated::new(vec![1, 2], Some("abc".to_owned()), 2, &url);
    /// assert_eq!(
    ///     page.links.next.as_deref(),
    ///     Some("http://localhost/api/v1/feed?limit=2&cursor=abc")
    /// );
    /// ```
    pub fn new(data: Vec<T>, next_cursor: Option<String>, limit: usize, request_url: &Url) -> Self {
        let next = next_cursor
            .as_deref()
            .map(|cursor| with_cursor(request_url, cursor, limit));
        Self {
            data,
            next_cursor,
            links: PaginationLinks {
                self_: request_url.to_string(),
                next,
            },
        }
    }

    /// Transform every item on the page, keeping cursor and links.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            links: self.links,
        }
    }
}

fn with_cursor(base: &Url, cursor: &str, limit: usize) -> String {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "cursor" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("limit", &limit.to_string());
        pairs.append_pair("cursor", cursor);
    }
    url.to_string()
}
