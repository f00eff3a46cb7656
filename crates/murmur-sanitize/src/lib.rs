//! Normalizes raw platform message text before it enters chat history.
//!
//! OneBot encodes rich content inline as CQ codes, e.g.
//! `[CQ:image,file=abc.png,url=...]`. Those are replaced with short
//! human-readable placeholders so downstream consumers (prompt building,
//! display) only see plain text.
//!
//! ```rust
//! use murmur_sanitize::sanitize;
//!
//! assert_eq!(sanitize("hi[CQ:image,file=1.png]bye"), "hi(图片)bye");
//! assert_eq!(sanitize("[CQ:reply,id=5]ok"), "ok");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Placeholder table applied by [`Sanitizer::new`].
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    ("image", "(图片)"),
    ("face", "(表情)"),
    ("record", "(语音)"),
    ("video", "(视频)"),
    ("at", "@某人"),
    // Back-references only add noise to the context.
    ("reply", ""),
    ("json", "(卡片消息)"),
    ("xml", "(卡片消息)"),
];

fn cq_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[CQ:([A-Za-z0-9_]+),.*?\]").expect("CQ code pattern is valid"))
}

/// Table-driven CQ code sanitizer.
///
/// Each recognized code type maps to a fixed replacement; types without a
/// rule render as `(<type>)`. Text that does not form a complete
/// `[CQ:<type>,...]` token is left untouched.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: HashMap<String, String>,
}

impl Sanitizer {
    /// Sanitizer with the [`DEFAULT_RULES`] table.
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(ty, replacement)| (ty.to_string(), replacement.to_string()))
                .collect(),
        }
    }

    /// Add or override the placeholder for one code type.
    pub fn with_rule(mut self, cq_type: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.rules.insert(cq_type.into(), replacement.into());
        self
    }

    /// The text a code of `cq_type` is replaced with.
    pub fn replacement_for<'a>(&'a self, cq_type: &str) -> Cow<'a, str> {
        match self.rules.get(cq_type) {
            Some(replacement) => Cow::Borrowed(replacement.as_str()),
            None => {
                tracing::trace!(cq_type, "no placeholder rule, using type name");
                Cow::Owned(format!("({cq_type})"))
            }
        }
    }

    /// Replace every CQ code in one left-to-right pass and trim the result.
    pub fn sanitize(&self, raw: &str) -> String {
        let replaced = cq_code_pattern()
            .replace_all(raw, |caps: &Captures<'_>| self.replacement_for(&caps[1]).into_owned());
        replaced.trim().to_string()
    }

    /// Like [`Sanitizer::sanitize`], treating a missing message as empty.
    pub fn sanitize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|r| self.sanitize(r)).unwrap_or_default()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize with the default rule table.
pub fn sanitize(raw: &str) -> String {
    static DEFAULT: OnceLock<Sanitizer> = OnceLock::new();
    DEFAULT.get_or_init(Sanitizer::new).sanitize(raw)
}
