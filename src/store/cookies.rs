//! Cookie storage and the bridge that lets `reqwest` use it like a browser.
//!
//! All cookies live at path `/` and are keyed by name alone: the client talks
//! to one API origin, so domain and path scoping collapse to a single bucket.

use std::sync::Arc;

use cookie::Cookie;
use cookie::time::OffsetDateTime;
use reqwest::Url;
use reqwest::header::HeaderValue;

/// Name/value cookie storage. Setting a name overwrites any previous value.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
    fn remove(&self, name: &str);
    /// Every stored cookie, in a stable order.
    fn pairs(&self) -> Vec<(String, String)>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Apply one `Set-Cookie` header value to `store`.
///
/// Expired cookies (`Max-Age` <= 0, `Expires` in the past) and empty values
/// delete the entry. Unparseable headers are ignored.
pub fn apply_set_cookie(store: &dyn CookieStore, raw: &str) {
    let Ok(parsed) = Cookie::parse(raw) else {
        tracing::debug!("ignoring unparseable Set-Cookie header");
        return;
    };

    let expired_by_age = parsed.max_age().is_some_and(|age| age.is_zero() || age.is_negative());
    let expired_by_date = parsed
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc());

    if expired_by_age || expired_by_date || parsed.value().is_empty() {
        store.remove(parsed.name());
    } else {
        store.set(parsed.name(), parsed.value());
    }
}

/// Format stored cookies as a `Cookie` request header value.
#[must_use]
pub fn cookie_header(pairs: &[(String, String)]) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }
    let joined = pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    Some(joined)
}

/// Adapter installing a [`CookieStore`] as the `reqwest` cookie provider.
pub struct CookieJar {
    store: Arc<dyn CookieStore>,
}

impl CookieJar {
    #[must_use]
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        Self { store }
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                apply_set_cookie(self.store.as_ref(), raw);
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let header = cookie_header(&self.store.pairs())?;
        HeaderValue::from_str(&header).ok()
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
