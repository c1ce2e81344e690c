//! Appliance response interpretation.
//!
//! Responses are loosely XML-shaped:
//!
//! ```text
//! <response status="success"><result><key>LUFRPT1...</key></result></response>
//! <response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>
//! <response status="error"><msg><line>Import of cert failed</line></msg></response>
//! ```
//!
//! Matching tolerates attributes, single or double quotes, newlines inside
//! elements, CDATA sections, and the predefined XML entities.

#![allow(clippy::expect_used)] // Patterns are compile-time constants

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::operation::OperationKind;

/// `<response ... status="..." ...>`
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<response\b[^>]*?\bstatus\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});

/// Bare `success` token, for keygen responses lacking a status attribute.
static BARE_SUCCESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsuccess\b").expect("valid regex"));

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<key\b[^>]*>(.*?)</key\s*>").expect("valid regex"));

/// Message-bearing elements, most specific first.
static MESSAGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["line", "msg", "result"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>")).expect("valid regex")
        })
        .collect()
});

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Structured result of one request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    pub success: bool,
    /// A response was received at all.
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub extracted_key: Option<String>,
}

impl OperationOutcome {
    /// Outcome for a request that never got a response.
    #[must_use]
    pub fn unreachable(kind: OperationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            success: false,
            reachable: false,
            message: Some(detail.into()),
            extracted_key: None,
        }
    }

    /// Message for the operator, falling back to a generic description.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.message {
            Some(msg) => msg.clone(),
            None if self.reachable => format!("{} rejected by appliance", self.kind),
            None => "no response".to_string(),
        }
    }
}

/// Interpret a raw response body for the given operation.
#[must_use]
pub fn interpret(raw: &str, kind: OperationKind) -> OperationOutcome {
    let reachable = !raw.trim().is_empty();
    let status = STATUS_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_ascii_lowercase());

    let success = match kind {
        OperationKind::KeyGen => match status.as_deref() {
            Some(s) => s == "success",
            None => BARE_SUCCESS_RE.is_match(raw),
        },
        _ => status.as_deref() == Some("success"),
    };

    let extracted_key = if kind == OperationKind::KeyGen && success {
        KEY_RE
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .filter(|k| !k.is_empty())
    } else {
        None
    };

    OperationOutcome {
        kind,
        // A keygen "success" without a key is useless to the caller.
        success: success && (kind != OperationKind::KeyGen || extracted_key.is_some()),
        reachable,
        // The key sits inside <result>; never surface it as a message.
        message: if extracted_key.is_some() {
            None
        } else {
            first_message(raw)
        },
        extracted_key,
    }
}

fn first_message(raw: &str) -> Option<String> {
    MESSAGE_RES.iter().find_map(|re| {
        re.captures_iter(raw)
            .filter_map(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .find(|text| !text.is_empty())
    })
}

/// Unwrap CDATA, strip nested tags, decode entities, collapse whitespace.
fn clean_text(fragment: &str) -> String {
    let unwrapped = CDATA_RE.replace_all(fragment, "$1");
    let untagged = TAG_RE.replace_all(&unwrapped, " ");
    let decoded = decode_entities(&untagged);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
