//! Namespace rewriting for command and agent markdown
//!
//! Commands are referenced as `/word` throughout Framework content; the plugin
//! distribution namespaces them as `/sc:word`. Agents carry their identity in
//! a `name:` field inside the leading `---` metadata block, which becomes
//! `sc-<name>`.
//!
//! Reference boundaries:
//!
//! - heading: `#`, `##`, ... at column 0, whitespace, then `/word`
//! - bare: `/word` not preceded by `/` or a word character and followed by
//!   whitespace, end of text, `:`, `` ` ``, `)` or `]`
//! - bracketed: `[/word]`
//!
//! All three are located in the input and rewritten in one pass, so a slash
//! gets at most one prefix per call. Running [`ContentTransformer::transform_command`]
//! again over its own output *does* add a second prefix: `/sc` followed by `:`
//! is itself a valid bare reference.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "sc";

static HEADING_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s+/(\w+)").expect("Invalid heading regex"));

static BARE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\w+)").expect("Invalid command reference regex"));

static BRACKET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[/(\w+)\]").expect("Invalid bracket reference regex"));

static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w$").expect("Invalid word char regex"));

static METADATA_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^---\n(.*?)\n---").expect("Invalid metadata regex"));

static NAME_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^name:\s*(.+)$").expect("Invalid name field regex"));

fn is_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(c.encode_utf8(&mut buf))
}

/// Which rewrite a mapping applies to each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Command,
    Agent,
    None,
}

impl Transform {
    pub fn apply(self, transformer: &ContentTransformer, text: &str, filename: &str) -> String {
        match self {
            Self::Command => transformer.transform_command(text, filename),
            Self::Agent => transformer.transform_agent(text, filename),
            Self::None => text.to_string(),
        }
    }
}

/// Pure text rewriter for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTransformer {
    namespace: String,
}

impl Default for ContentTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl ContentTransformer {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `sc:`, inserted after the slash of a command reference.
    pub fn command_prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    /// `sc-`, prepended to agent names and synced file names.
    pub fn agent_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    /// Namespace every command reference in `text`.
    pub fn transform_command(&self, text: &str, filename: &str) -> String {
        tracing::debug!(filename, "transforming command");

        let mut slashes = BTreeSet::new();

        for caps in HEADING_REF.captures_iter(text) {
            if let Some(word) = caps.get(1) {
                slashes.insert(word.start() - 1);
            }
        }

        for caps in BARE_REF.captures_iter(text) {
            let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let preceded_ok = text[..whole.start()]
                .chars()
                .next_back()
                .is_none_or(|c| c != '/' && !is_word_char(c));
            let followed_ok = text[word.end()..]
                .chars()
                .next()
                .is_none_or(|c| c.is_whitespace() || matches!(c, ':' | '`' | ')' | ']'));
            if preceded_ok && followed_ok {
                slashes.insert(whole.start());
            }
        }

        for caps in BRACKET_REF.captures_iter(text) {
            if let Some(word) = caps.get(1) {
                slashes.insert(word.start() - 1);
            }
        }

        if slashes.is_empty() {
            return text.to_string();
        }

        let prefix = self.command_prefix();
        let mut out = String::with_capacity(text.len() + slashes.len() * prefix.len());
        let mut last = 0;
        for slash in slashes {
            out.push_str(&text[last..=slash]);
            out.push_str(&prefix);
            last = slash + 1;
        }
        out.push_str(&text[last..]);
        out
    }

    /// Prefix the `name:` field of the leading metadata block.
    ///
    /// Text without a metadata block, or without a `name:` field in it, comes
    /// back unchanged. Names already carrying the prefix are left alone.
    pub fn transform_agent(&self, text: &str, filename: &str) -> String {
        tracing::debug!(filename, "transforming agent");

        let Some(block) = METADATA_BLOCK.captures(text).and_then(|caps| caps.get(1)) else {
            tracing::warn!(filename, "no metadata block found in agent");
            return text.to_string();
        };

        let prefix = self.agent_prefix();
        let rewritten = NAME_FIELD.replace_all(block.as_str(), |caps: &regex::Captures<'_>| {
            let name = caps[1].trim();
            if name.starts_with(&prefix) {
                caps[0].to_string()
            } else {
                format!("name: {prefix}{name}")
            }
        });

        let mut out = String::with_capacity(text.len() + prefix.len());
        out.push_str(&text[..block.start()]);
        out.push_str(&rewritten);
        out.push_str(&text[block.end()..]);
        out
    }
}
