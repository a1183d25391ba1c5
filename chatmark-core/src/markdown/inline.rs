//! Inline scanner: classifies the spans of a single line into tokens.
//!
//! Protected spans (code, math, kbd, links, autolinks) are recognised first at
//! any position where their rule comes earlier in the table, and delimiter
//! rules skip over them while looking for their closing delimiter. A URL
//! containing `_` or `*` is therefore never split by emphasis.

use super::autolink::{self, AutolinkOptions};
use super::html::SafeUrl;
use super::rules::Rule;

/// Inline token tree for one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Math { tex: String, display: bool },
    Kbd(String),
    Link { href: SafeUrl, children: Vec<Inline> },
    Autolink { href: SafeUrl, text: String },
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Highlight(Vec<Inline>),
}

/// How strictly a delimiter must hug its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    /// Any non-blank content
    Loose,
    /// No whitespace right inside the delimiters
    Tight,
    /// Tight, and the delimiter character may not touch the same character
    /// outside the span (`*` next to `**`)
    NoAdjacent,
    /// Tight, and the delimiter may not sit inside a word (`snake_case`)
    Intraword,
}

pub struct InlineScanner<'c> {
    rules: Vec<Rule>,
    autolink: &'c AutolinkOptions,
}

impl<'c> InlineScanner<'c> {
    pub fn new(rules: Vec<Rule>, autolink: &'c AutolinkOptions) -> Self {
        Self { rules, autolink }
    }

    /// Tokenize one line.
    pub fn scan(&self, line: &str) -> Vec<Inline> {
        self.scan_inner(line, false)
    }

    fn scan_inner(&self, src: &str, in_link: bool) -> Vec<Inline> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut misses = Misses::new(src.len());
        let mut pos = 0;

        while pos < src.len() {
            if let Some((node, len)) = self.match_at(src, pos, in_link, &mut misses) {
                if !text.is_empty() {
                    nodes.push(Inline::Text(std::mem::take(&mut text)));
                }
                nodes.push(node);
                pos += len;
                continue;
            }
            let Some(ch) = src[pos..].chars().next() else {
                break;
            };
            text.push(ch);
            pos += ch.len_utf8();
        }

        if !text.is_empty() {
            nodes.push(Inline::Text(text));
        }
        merge_text(nodes)
    }

    fn match_at(
        &self,
        src: &str,
        pos: usize,
        in_link: bool,
        misses: &mut Misses,
    ) -> Option<(Inline, usize)> {
        self.rules
            .iter()
            .find_map(|rule| self.apply(*rule, src, pos, in_link, misses))
    }

    fn apply(
        &self,
        rule: Rule,
        src: &str,
        pos: usize,
        in_link: bool,
        misses: &mut Misses,
    ) -> Option<(Inline, usize)> {
        match rule {
            Rule::Bold => self
                .delimited(src, pos, "**", Flank::Loose, in_link, misses)
                .or_else(|| self.delimited(src, pos, "__", Flank::Intraword, in_link, misses))
                .map(|(children, len)| (Inline::Strong(children), len)),
            Rule::Strikethrough => self
                .delimited(src, pos, "~~", Flank::Tight, in_link, misses)
                .map(|(children, len)| (Inline::Strikethrough(children), len)),
            Rule::Highlight => self
                .delimited(src, pos, "==", Flank::Tight, in_link, misses)
                .map(|(children, len)| (Inline::Highlight(children), len)),
            Rule::Italic => self
                .delimited(src, pos, "*", Flank::NoAdjacent, in_link, misses)
                .or_else(|| self.delimited(src, pos, "_", Flank::Intraword, in_link, misses))
                .map(|(children, len)| (Inline::Emphasis(children), len)),
            _ => self.protected(rule, src, pos, in_link),
        }
    }

    /// Match a protected span (code, math, kbd, link, autolink) at `pos`.
    fn protected(&self, rule: Rule, src: &str, pos: usize, in_link: bool) -> Option<(Inline, usize)> {
        match rule {
            Rule::InlineCode => code_span(src, pos),
            Rule::InlineMath => math_span(src, pos),
            Rule::Kbd => kbd_span(src, pos),
            Rule::MarkdownLink if !in_link => self.link(src, pos),
            Rule::Autolink if !in_link => {
                let link = autolink::detect(src, pos, self.autolink)?;
                let href = SafeUrl::parse(&link.href)?;
                let len = link.len();
                Some((
                    Inline::Autolink {
                        href,
                        text: link.text,
                    },
                    len,
                ))
            }
            _ => None,
        }
    }

    /// `[label](url)`; the label is scanned without link rules.
    fn link(&self, src: &str, pos: usize) -> Option<(Inline, usize)> {
        let rest = &src[pos..];
        if !rest.starts_with('[') {
            return None;
        }
        let label_end = rest.find(']')?;
        let label = &rest[1..label_end];
        if label.trim().is_empty() || label.contains('[') {
            return None;
        }
        let after = &rest[label_end + 1..];
        if !after.starts_with('(') {
            return None;
        }
        let url_end = after.find(')')?;
        let url = &after[1..url_end];
        if url.is_empty() || url.chars().any(char::is_whitespace) {
            return None;
        }
        let href = SafeUrl::parse(url)?;
        let children = self.scan_inner(label, true);
        let len = label_end + 1 + url_end + 1;
        Some((Inline::Link { href, children }, len))
    }

    /// Pair `delim` at `pos` with the next valid closer, skipping protected
    /// spans. A search that runs off the end of the line is remembered, and
    /// any later search reaching one of the same positions fails at once.
    #[allow(clippy::too_many_arguments)]
    fn delimited(
        &self,
        src: &str,
        pos: usize,
        delim: &str,
        flank: Flank,
        in_link: bool,
        misses: &mut Misses,
    ) -> Option<(Vec<Inline>, usize)> {
        if !src[pos..].starts_with(delim) {
            return None;
        }
        let marker = delim.chars().next()?;
        let start = pos + delim.len();
        if !opens(src, pos, start, marker, flank) {
            return None;
        }
        let bit = delimiter_bit(delim);
        if misses.contains(start, bit) {
            return None;
        }

        let mut visited = Vec::new();
        let mut cursor = start;
        while cursor < src.len() {
            if misses.contains(cursor, bit) {
                break;
            }
            // The start is never tried as a closer, so it is not a known miss
            if cursor > start {
                visited.push(cursor);
            }
            if cursor > start
                && src[cursor..].starts_with(delim)
                && closes(src, start, cursor, cursor + delim.len(), marker, flank)
            {
                let content = &src[start..cursor];
                if content.trim().is_empty() {
                    return None;
                }
                let children = self.scan_inner(content, in_link);
                return Some((children, cursor + delim.len() - pos));
            }
            if let Some(len) = self.protected_len(src, cursor, in_link) {
                cursor += len;
                continue;
            }
            cursor += src[cursor..].chars().next().map_or(1, char::len_utf8);
        }
        misses.record(&visited, bit);
        None
    }

    /// Length of a protected span starting at `pos`, if any.
    fn protected_len(&self, src: &str, pos: usize, in_link: bool) -> Option<usize> {
        self.rules
            .iter()
            .filter(|rule| rule.is_protected())
            .find_map(|rule| self.protected(*rule, src, pos, in_link))
            .map(|(_, len)| len)
    }
}

/// Positions of one line from which a closing-delimiter search is known to
/// fail, one bit per delimiter. The walk from a position is the same for
/// every opener that reaches it, and `closes` only looks at the characters
/// around the candidate, so a failed walk fails from any of its positions.
struct Misses(Vec<u8>);

impl Misses {
    fn new(len: usize) -> Self {
        Self(vec![0; len + 1])
    }

    fn contains(&self, pos: usize, bit: u8) -> bool {
        self.0.get(pos).is_some_and(|mark| mark & bit != 0)
    }

    fn record(&mut self, positions: &[usize], bit: u8) {
        for &pos in positions {
            if let Some(mark) = self.0.get_mut(pos) {
                *mark |= bit;
            }
        }
    }
}

fn delimiter_bit(delim: &str) -> u8 {
    match delim {
        "**" => 1,
        "__" => 2,
        "~~" => 4,
        "==" => 8,
        "*" => 16,
        _ => 32,
    }
}

fn opens(src: &str, pos: usize, start: usize, marker: char, flank: Flank) -> bool {
    let next = src[start..].chars().next();
    let prev = src[..pos].chars().next_back();
    match next {
        None => return false,
        Some(c) if flank != Flank::Loose && c.is_whitespace() => return false,
        _ => {}
    }
    match flank {
        Flank::Loose | Flank::Tight => true,
        Flank::NoAdjacent => next != Some(marker) && prev != Some(marker),
        Flank::Intraword => {
            next != Some(marker) && !prev.is_some_and(|c| c.is_ascii_alphanumeric() || c == marker)
        }
    }
}

fn closes(src: &str, start: usize, at: usize, end: usize, marker: char, flank: Flank) -> bool {
    let before = src[start..at].chars().next_back();
    let after = src[end..].chars().next();
    if flank != Flank::Loose && before.is_some_and(char::is_whitespace) {
        return false;
    }
    match flank {
        Flank::Loose | Flank::Tight => true,
        Flank::NoAdjacent => before != Some(marker) && after != Some(marker),
        Flank::Intraword => {
            before != Some(marker) && !after.is_some_and(|c| c.is_ascii_alphanumeric() || c == marker)
        }
    }
}

/// Code span delimited by equal runs of backticks (`` `x` ``, ```` ```x``` ````).
/// A run without a matching closer on the line stays literal.
fn code_span(src: &str, pos: usize) -> Option<(Inline, usize)> {
    let rest = &src[pos..];
    if !rest.starts_with('`') {
        return None;
    }
    let run = rest.bytes().take_while(|b| *b == b'`').count();
    let body = &rest[run..];
    match closing_run(body, run) {
        Some(close) if close > 0 => Some((Inline::Code(body[..close].to_string()), run * 2 + close)),
        _ if run > 1 => Some((Inline::Text("`".repeat(run)), run)),
        _ => None,
    }
}

/// Offset of the first backtick run in `body` exactly `run` long.
fn closing_run(body: &str, run: usize) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] != b'`' {
            idx += 1;
            continue;
        }
        let len = bytes[idx..].iter().take_while(|b| **b == b'`').count();
        if len == run {
            return Some(idx);
        }
        idx += len;
    }
    None
}

/// `$tex$` or `$$tex$$` on one line.
fn math_span(src: &str, pos: usize) -> Option<(Inline, usize)> {
    let rest = &src[pos..];
    if let Some(body) = rest.strip_prefix("$$") {
        let close = body.find("$$")?;
        let tex = &body[..close];
        if tex.trim().is_empty() {
            return None;
        }
        return Some((
            Inline::Math {
                tex: tex.trim().to_string(),
                display: true,
            },
            close + 4,
        ));
    }

    let body = rest.strip_prefix('$')?;
    let close = body.find('$')?;
    let tex = &body[..close];
    let first = tex.chars().next()?;
    let last = tex.chars().next_back()?;
    if first.is_whitespace() || last.is_whitespace() {
        return None;
    }
    // "$5 and $10" is money, not math
    if body[close + 1..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((
        Inline::Math {
            tex: tex.to_string(),
            display: false,
        },
        close + 2,
    ))
}

/// `<kbd>key</kbd>` already present in the input.
fn kbd_span(src: &str, pos: usize) -> Option<(Inline, usize)> {
    const OPEN: &str = "<kbd>";
    const CLOSE: &str = "</kbd>";
    let body = src[pos..].strip_prefix(OPEN)?;
    let close = body.find(CLOSE)?;
    let key = &body[..close];
    if key.is_empty() || key.contains('<') {
        return None;
    }
    Some((Inline::Kbd(key.to_string()), OPEN.len() + close + CLOSE.len()))
}

fn merge_text(nodes: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match (merged.last_mut(), node) {
            (Some(Inline::Text(prev)), Inline::Text(next)) => prev.push_str(&next),
            (_, node) => merged.push(node),
        }
    }
    merged
}
