//! Remote translation store contract.
//!
//! The store exposes two calls: fetch every translation of a project, and
//! push new keys. [`RemoteTransport`] is the seam the orchestrator is written
//! against; the binary supplies an HTTP implementation and tests supply an
//! in-memory one.
//!
//! The wire shape of a fetch is key-major (`{key: {locale: value}}`) and may
//! arrive wrapped in the server's `{code, message, data}` envelope. Both are
//! accepted and transposed into a locale-major [`LocaleSet`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use i18nflow_core::{FlatMap, LocaleSet};

use crate::error::TransportError;

/// Two-call contract with the remote translation store.
pub trait RemoteTransport {
    /// All translations of `project_id`, optionally narrowed to one locale.
    fn fetch_translations(
        &self,
        project_id: &str,
        locale: Option<&str>,
    ) -> Result<LocaleSet, TransportError>;

    /// Submit new keys in one request. No retry happens at this layer.
    fn push_keys(&self, request: &PushRequest) -> Result<PushResponse, TransportError>;
}

/// Body of a push request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    pub project_id: String,
    pub keys: Vec<String>,
    pub defaults: BTreeMap<String, String>,
    /// Full per-locale payload keyed by remote locale code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<LocaleSet>,
}

/// The store's verdict on a push, reported back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub existed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Wire decoding
// ---------------------------------------------------------------------------

type KeyMajor = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranslationsCompat {
    Envelope(Envelope<KeyMajor>),
    Bare(KeyMajor),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PushCompat {
    Envelope(Envelope<PushResponse>),
    Bare(PushResponse),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    code: Value,
    #[allow(dead_code)]
    message: Value,
    data: T,
}

/// Decode a fetch response body into a locale-major set.
///
/// String values are kept, numbers and booleans stringified. `null` and empty
/// strings mean "not translated" and are left out, so a locale with no
/// translated key does not appear at all.
pub fn decode_translations(body: &str) -> Result<LocaleSet, serde_json::Error> {
    let key_major = match serde_json::from_str::<TranslationsCompat>(body)? {
        TranslationsCompat::Envelope(envelope) => envelope.data,
        TranslationsCompat::Bare(map) => map,
    };

    let mut set = LocaleSet::new();
    for (key, per_locale) in key_major {
        for (locale, value) in per_locale {
            let text = match value {
                Value::String(s) if s.is_empty() => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            set.entry(locale)
                .or_insert_with(FlatMap::new)
                .insert(key.clone(), text);
        }
    }
    Ok(set)
}

/// Decode a push response body.
pub fn decode_push_response(body: &str) -> Result<PushResponse, serde_json::Error> {
    Ok(match serde_json::from_str::<PushCompat>(body)? {
        PushCompat::Envelope(envelope) => envelope.data,
        PushCompat::Bare(response) => response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_major_body_is_transposed() {
        let body = r#"{"a.b": {"en": "Hello", "fr": "Bonjour"}, "a.c": {"en": "x"}}"#;
        let set = decode_translations(body).unwrap();
        assert_eq!(set["en"]["a.b"], "Hello");
        assert_eq!(set["en"]["a.c"], "x");
        assert_eq!(set["fr"].len(), 1);
    }

    #[test]
    fn enveloped_body_is_unwrapped() {
        let body = r#"{"code": 0, "message": "ok", "data": {"nav.home": {"en": "Home"}}}"#;
        let set = decode_translations(body).unwrap();
        assert_eq!(set["en"]["nav.home"], "Home");
    }

    #[test]
    fn untranslated_values_are_left_out() {
        let body = r#"{"k": {"en": "", "fr": null, "de": 3, "it": true}}"#;
        let set = decode_translations(body).unwrap();
        assert!(!set.contains_key("en"));
        assert!(!set.contains_key("fr"));
        assert_eq!(set["de"]["k"], "3");
        assert_eq!(set["it"]["k"], "true");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(decode_translations("[1, 2]").is_err());
    }

    #[test]
    fn push_response_accepts_both_shapes_and_missing_lists() {
        let bare = decode_push_response(r#"{"added": ["a"], "failed": ["b"]}"#).unwrap();
        assert_eq!(bare.added, vec!["a"]);
        assert!(bare.existed.is_empty());
        assert_eq!(bare.failed, vec!["b"]);

        let wrapped = decode_push_response(
            r#"{"code": 0, "message": "ok", "data": {"added": [], "existed": ["x"], "failed": []}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.existed, vec!["x"]);
    }

    #[test]
    fn push_request_omits_absent_translations() {
        let request = PushRequest {
            project_id: "7".into(),
            keys: vec!["a.b".into()],
            defaults: BTreeMap::new(),
            translations: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("translations").is_none());
        assert_eq!(json["project_id"], "7");
    }
}
