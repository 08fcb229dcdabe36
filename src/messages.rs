//! Cookie-backed single-use messages.
//!
//! Three independent slots ([`MessageSlot`]) survive a redirect by riding in
//! cookies scoped to `/`: the flash confirmation, an error, and an extra data
//! value. A slot is cleared by overwriting it with the empty value, and a
//! cookie that is empty or holds nothing but quote characters reads as absent.
//! [`MessageStore::take`] is the read-and-clear transition that guarantees a
//! message is shown at most once.

use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Path every message cookie is scoped to.
const COOKIE_PATH: &str = "/";

/// Characters trimmed from both ends of a cookie value on read.
const QUOTES: &[char] = &['\'', '"'];

/// One of the message slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSlot {
    /// One-time confirmation shown after a redirect.
    Flash,
    /// One-time error shown after a redirect.
    Error,
    /// Free-form value carried to the next request.
    ExtraData,
}

impl MessageSlot {
    pub const ALL: [MessageSlot; 3] = [MessageSlot::Flash, MessageSlot::Error, MessageSlot::ExtraData];

    /// Name of the cookie backing this slot.
    pub const fn cookie_name(self) -> &'static str {
        match self {
            MessageSlot::Flash => "flash",
            MessageSlot::Error => "error",
            MessageSlot::ExtraData => "extra_data",
        }
    }
}

/// Message slots for one request/response cycle.
///
/// Reads see the cookies the request arrived with, plus anything set earlier
/// in the same cycle; writes become `Set-Cookie` headers when the store is
/// turned back into a [`CookieJar`] and returned from the handler.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    jar: CookieJar,
}

impl MessageStore {
    pub fn new(jar: CookieJar) -> Self {
        MessageStore { jar }
    }

    /// Returns the slot's message with surrounding quotes trimmed, or `None`
    /// if the cookie is missing or blank.
    pub fn get(&self, slot: MessageSlot) -> Option<String> {
        let cookie = self.jar.get(slot.cookie_name())?;
        let value = cookie.value().trim_matches(QUOTES);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn has(&self, slot: MessageSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Stores `message` in the slot as a session cookie on path `/`.
    pub fn set(&mut self, slot: MessageSlot, message: &str) {
        let cookie = Cookie::build((slot.cookie_name(), format!("\"{message}\"")))
            .path(COOKIE_PATH)
            .build();
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    /// Overwrites the slot with the empty value.
    pub fn clear(&mut self, slot: MessageSlot) {
        self.set(slot, "");
    }

    /// Reads the slot's message and clears it in the same cycle.
    ///
    /// Returns `None` without touching the cookie when nothing is pending.
    pub fn take(&mut self, slot: MessageSlot) -> Option<String> {
        let message = self.get(slot)?;
        self.clear(slot);
        Some(message)
    }

    pub fn add_flash(&mut self, message: &str) {
        self.set(MessageSlot::Flash, message);
    }

    pub fn add_error(&mut self, message: &str) {
        self.set(MessageSlot::Error, message);
    }

    pub fn add_extra_data(&mut self, message: &str) {
        self.set(MessageSlot::ExtraData, message);
    }

    pub fn clear_flash(&mut self) {
        self.clear(MessageSlot::Flash);
    }

    pub fn clear_error(&mut self) {
        self.clear(MessageSlot::Error);
    }

    pub fn clear_extra_data(&mut self) {
        self.clear(MessageSlot::ExtraData);
    }

    pub fn has_flash(&self) -> bool {
        self.has(MessageSlot::Flash)
    }

    pub fn has_error(&self) -> bool {
        self.has(MessageSlot::Error)
    }

    pub fn has_extra_data(&self) -> bool {
        self.has(MessageSlot::ExtraData)
    }

    pub fn get_flash(&self) -> Option<String> {
        self.get(MessageSlot::Flash)
    }

    pub fn get_error(&self) -> Option<String> {
        self.get(MessageSlot::Error)
    }

    pub fn get_extra_data(&self) -> Option<String> {
        self.get(MessageSlot::ExtraData)
    }

    /// Returns the jar carrying any pending cookie changes.
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{HeaderMap, HeaderValue};
    use axum::response::IntoResponse;

    fn store_with_cookies(cookie_header: &str) -> MessageStore {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        MessageStore::new(CookieJar::from_headers(&headers))
    }

    #[test]
    fn cookie_names() {
        assert_eq!(MessageSlot::Flash.cookie_name(), "flash");
        assert_eq!(MessageSlot::Error.cookie_name(), "error");
        assert_eq!(MessageSlot::ExtraData.cookie_name(), "extra_data");
    }

    #[test]
    fn empty_store_has_nothing() {
        let store = MessageStore::default();
        for slot in MessageSlot::ALL {
            assert!(!store.has(slot));
            assert_eq!(store.get(slot), None);
        }
    }

    #[test]
    fn quoted_values_are_trimmed() {
        let store = store_with_cookies("flash=\"hello\"; error='oops'");
        assert_eq!(store.get_flash().as_deref(), Some("hello"));
        assert_eq!(store.get_error().as_deref(), Some("oops"));
        assert!(!store.has_extra_data());
    }

    #[test]
    fn blank_and_quote_only_values_are_absent() {
        let store = store_with_cookies("flash=\"\"; error=; extra_data='\"'");
        assert!(!store.has_flash());
        assert!(!store.has_error());
        assert!(!store.has_extra_data());
    }

    #[test]
    fn set_then_get_within_same_cycle() {
        let mut store = MessageStore::default();
        store.add_extra_data("42");
        assert_eq!(store.get_extra_data().as_deref(), Some("42"));

        store.clear_extra_data();
        assert!(!store.has_extra_data());
    }

    #[test]
    fn take_reads_and_clears() {
        let mut store = store_with_cookies("flash=\"saved\"");
        assert_eq!(store.take(MessageSlot::Flash).as_deref(), Some("saved"));
        assert!(!store.has_flash());
        assert_eq!(store.take(MessageSlot::Flash), None);
    }

    #[test]
    fn take_on_absent_slot_writes_nothing() {
        let mut store = MessageStore::default();
        assert_eq!(store.take(MessageSlot::Error), None);

        // An untouched jar produces no Set-Cookie headers.
        let response = (store.into_jar(), "").into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn written_cookie_is_scoped_to_root_path() {
        let mut store = MessageStore::default();
        store.add_flash("hi");

        let jar = store.into_jar();
        let cookie = jar.get("flash").unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.value(), "\"hi\"");
        assert!(cookie.expires().is_none());
        assert!(cookie.max_age().is_none());
    }
}
