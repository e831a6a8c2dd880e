//! # Anchor Pattern Matcher
//!
//! Finds a list literal assigned to a named attribute inside an otherwise
//! opaque text file, pulls the quoted entries out of it, and rewrites only
//! that literal. It is not a parser for the host language.
//!
//! ## Grammar
//!
//! ```text
//! literal  := \b NAME ws* '=' ws* '[' body ']'
//! body     := ( '"' [^"]* '"' | '\'' [^']* '\'' | [^\]] )*
//! entry    := '"' [^"]+ '"' | '\'' [^']+ '\''
//! ```
//!
//! Only the first literal for `NAME` is considered. Brackets inside a quoted
//! string belong to the string, so `"https://x.com/u?ids[]=1"` does not close
//! the literal. A stray quote with no partner is read as plain text. Anything
//! in `body` that is not an `entry`, a comma, or whitespace is ignored (and
//! logged at debug level).
//!
//! Entries are written without escapes, so a value holding a line break or
//! both quote characters cannot be stored; see [`unstorable_reason`].
//!
//! ## Rewriting
//!
//! ```text
//! NAME = [            <- head, kept exactly as written
//!     "a",            <- entry indent inferred from the existing body
//!     "b"             <- no trailing comma on the last entry
//! ]                   <- closing indent inferred from the existing body
//! ```
//!
//! An empty list is written as `[]`. Bytes before and after the literal are
//! copied through untouched, so saving the same entries twice produces the
//! same file.

use std::ops::Range;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// Entry indentation used when the existing literal gives nothing to copy.
pub const DEFAULT_ENTRY_INDENT: &str = "    ";

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("entry pattern is a valid regex")
});

/// A located list literal, borrowed from the file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLiteral<'a> {
    /// Byte range from the start of the attribute name through the closing `]`.
    pub span: Range<usize>,
    /// `NAME = [` exactly as it appears in the file.
    pub head: &'a str,
    /// Everything between `[` and `]`.
    pub body: &'a str,
}

impl ListLiteral<'_> {
    pub fn entries(&self) -> Vec<String> {
        extract_entries(self.body)
    }
}

/// Compiled matcher for one attribute name.
#[derive(Debug, Clone)]
pub struct Anchor {
    attribute: String,
    literal: Regex,
    opening: Regex,
}

impl Anchor {
    pub fn new(attribute: &str) -> Result<Self, regex::Error> {
        let name = regex::escape(attribute);
        let literal = Regex::new(&format!(
            r#"\b(?P<head>{name}\s*=\s*\[)(?P<body>(?:"[^"]*"|'[^']*'|[^\]])*)\]"#
        ))?;
        let opening = Regex::new(&format!(r"\b{name}\s*=\s*\["))?;
        Ok(Self {
            attribute: attribute.to_string(),
            literal,
            opening,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Locate the first literal for this attribute.
    pub fn find<'a>(&self, content: &'a str) -> Option<ListLiteral<'a>> {
        let caps = self.literal.captures(content)?;
        let whole = caps.get(0)?;
        let head = caps.name("head")?;
        let body = caps.name("body")?;
        Some(ListLiteral {
            span: whole.range(),
            head: head.as_str(),
            body: body.as_str(),
        })
    }

    /// True when `NAME = [` is present but never closed.
    pub fn is_unterminated(&self, content: &str) -> bool {
        self.find(content).is_none() && self.opening.is_match(content)
    }

    /// Replace the literal's entries, returning the new file content.
    ///
    /// Returns `None` when the attribute has no literal to replace; a missing
    /// literal is never injected.
    pub fn replace(&self, content: &str, entries: &[String]) -> Option<String> {
        let literal = self.find(content)?;
        let layout = ListLayout::infer(literal.body);
        let body = render_body(entries, &layout);

        let mut out = String::with_capacity(content.len() + body.len());
        out.push_str(&content[..literal.span.start]);
        out.push_str(literal.head);
        out.push_str(&body);
        out.push(']');
        out.push_str(&content[literal.span.end..]);
        Some(out)
    }
}

/// Pull every cleanly quoted entry out of a literal body, in source order.
pub fn extract_entries(body: &str) -> Vec<String> {
    let fragments = ignored_fragments(body);
    if !fragments.is_empty() {
        debug!("Ignoring unquoted list content: {:?}", fragments);
    }

    ENTRY
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Body text that is neither a quoted entry, a comma, nor whitespace.
pub fn ignored_fragments(body: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut cursor = 0;
    let gaps = ENTRY
        .find_iter(body)
        .map(|m| {
            let gap = &body[cursor..m.start()];
            cursor = m.end();
            gap
        })
        .collect::<Vec<_>>();

    for gap in gaps.into_iter().chain(std::iter::once(&body[cursor..])) {
        fragments.extend(
            gap.split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty()),
        );
    }
    fragments
}

/// Whitespace conventions copied from an existing literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLayout {
    pub entry_indent: String,
    pub closing_indent: String,
}

impl Default for ListLayout {
    fn default() -> Self {
        Self {
            entry_indent: DEFAULT_ENTRY_INDENT.to_string(),
            closing_indent: String::new(),
        }
    }
}

impl ListLayout {
    pub fn infer(body: &str) -> Self {
        let entry_indent = body
            .lines()
            .skip(1)
            .find(|line| {
                let trimmed = line.trim_start();
                trimmed.starts_with('"') || trimmed.starts_with('\'')
            })
            .map(|line| line[..line.len() - line.trim_start().len()].to_string())
            .filter(|indent| !indent.is_empty())
            .unwrap_or_else(|| DEFAULT_ENTRY_INDENT.to_string());

        let closing_indent = body
            .rfind('\n')
            .map(|pos| &body[pos + 1..])
            .filter(|tail| tail.chars().all(|c| c == ' ' || c == '\t'))
            .unwrap_or("")
            .to_string();

        Self {
            entry_indent,
            closing_indent,
        }
    }
}

/// Why `entry` cannot be written into a literal, or `None` when it can.
pub fn unstorable_reason(entry: &str) -> Option<&'static str> {
    if entry.contains(['\n', '\r']) {
        Some("line breaks cannot be stored")
    } else if entry.contains('"') && entry.contains('\'') {
        Some("it uses both quote characters")
    } else {
        None
    }
}

/// Quote an entry. No escaping: an entry holding `"` is single-quoted instead.
pub fn quote_entry(entry: &str) -> String {
    if entry.contains('"') && !entry.contains('\'') {
        format!("'{entry}'")
    } else {
        format!("\"{entry}\"")
    }
}

/// Render everything between `[` and `]`.
pub fn render_body(entries: &[String], layout: &ListLayout) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let lines = entries
        .iter()
        .map(|entry| format!("{}{}", layout.entry_indent, quote_entry(entry)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("\n{lines}\n{}", layout.closing_indent)
}
