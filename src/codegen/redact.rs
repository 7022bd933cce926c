//! DSC-015: Redaction of sensitive literals for diagnostic output.
//!
//! The redacted text is for logs only. The interpreter always receives the
//! original script.

use super::expr::SENSITIVE_MARKER;
use regex::Regex;
use std::sync::LazyLock;

/// Replacement for a redacted literal.
pub const REDACTED: &str = "'#<Sensitive [value redacted]>'";

static PASSWORD_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<flag>-Password )'(?:[^']|'')*' {}",
        regex::escape(SENSITIVE_MARKER)
    ))
    .expect("static regex")
});

static ANY_SENSITIVE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"'(?:[^']|'')*' {}", regex::escape(SENSITIVE_MARKER)))
        .expect("static regex")
});

/// Replace every sensitive literal in `text` with [`REDACTED`].
///
/// Password arguments are the expected case. Anything else still tagged
/// afterwards is redacted too, with a warning, since it means a secret ended up
/// somewhere other than a credential.
pub fn redact_secrets(text: &str) -> String {
    let redacted = PASSWORD_LITERAL.replace_all(text, format!("${{flag}}{}", REDACTED));
    let stray = ANY_SENSITIVE_LITERAL.find_iter(&redacted).count();
    if stray == 0 {
        return redacted.into_owned();
    }
    tracing::warn!(
        count = stray,
        "sensitive values outside credential passwords were redacted"
    );
    ANY_SENSITIVE_LITERAL
        .replace_all(&redacted, REDACTED)
        .into_owned()
}
