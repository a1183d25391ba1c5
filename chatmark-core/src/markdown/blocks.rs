//! Block scanner: splits the input into block-level constructs.
//!
//! Lines that no block rule claims are collected verbatim into
//! [`Block::Text`] runs, which the assembler later turns into paragraphs.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Consecutive unclaimed lines, blank lines included
    Text(Vec<String>),
    Heading { level: u8, text: String },
    Code { lang: Option<String>, code: String },
    Math(String),
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Divider,
    Quote(Vec<String>),
    List(Vec<ListItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Leading whitespace width, tabs counted as four
    pub indent: usize,
    pub marker: Marker,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Bullet,
    /// Numeral text as written (`"3"` for `3.`)
    Number(String),
    Task { checked: bool },
}

impl Marker {
    pub fn is_ordered(&self) -> bool {
        matches!(self, Marker::Number(_))
    }
}

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3}) (.*)$").expect("valid heading regex"));

static TABLE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)*\|?\s*$").expect("valid separator regex")
});

static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*] \[([ xX])\] (.*)$").expect("valid task regex"));

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*] (.*)$").expect("valid bullet regex"));

static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,9})\. (.*)$").expect("valid ordered regex"));

pub struct BlockScanner {
    rules: Vec<Rule>,
}

impl BlockScanner {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn scan(&self, src: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut text: Vec<String> = Vec::new();
        let mut pos = 0;

        while pos < src.len() {
            let (line, next) = line_at(src, pos);
            if !line.trim().is_empty() {
                if let Some((block, end)) = self.match_block(src, pos, line, next) {
                    if !text.is_empty() {
                        blocks.push(Block::Text(std::mem::take(&mut text)));
                    }
                    blocks.push(block);
                    pos = end;
                    continue;
                }
                if let Some((before, block, end)) = self.fence_after_text(src, pos, line) {
                    if !before.trim().is_empty() {
                        text.push(before.trim_end().to_string());
                    }
                    if !text.is_empty() {
                        blocks.push(Block::Text(std::mem::take(&mut text)));
                    }
                    blocks.push(block);
                    pos = end;
                    continue;
                }
            }
            text.push(line.to_string());
            pos = next;
        }

        if !text.is_empty() {
            blocks.push(Block::Text(text));
        }
        blocks
    }

    /// Try each block rule in table order at the line starting at `pos`.
    /// Returns the block and the offset just past what it consumed.
    fn match_block(&self, src: &str, pos: usize, line: &str, next: usize) -> Option<(Block, usize)> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::FencedCode => fenced_code(src, pos, line),
            Rule::BlockMath => block_math(src, pos, line),
            Rule::Table => table(src, line, next),
            Rule::Heading => heading(line).map(|b| (b, next)),
            Rule::HorizontalRule => (line.trim() == "---").then_some((Block::Divider, next)),
            Rule::Blockquote => quote(src, pos),
            rule if rule.is_list() => self.list(src, pos),
            _ => None,
        })
    }

    /// A fence that opens after text on its line and closes on a later line.
    /// Returns the text before the fence along with the code block.
    fn fence_after_text<'s>(
        &self,
        src: &str,
        pos: usize,
        line: &'s str,
    ) -> Option<(&'s str, Block, usize)> {
        if !self.rules.contains(&Rule::FencedCode) {
            return None;
        }
        let idx = line.find("```")?;
        if idx == 0 || line[idx + 3..].contains("```") {
            return None;
        }
        let (block, end) = fenced_code(src, pos + idx, &line[idx..])?;
        Some((&line[..idx], block, end))
    }

    /// Consume consecutive list item lines. The first line decides whether
    /// this is a list at all; later lines may use any enabled list rule. A
    /// single blank line between two items does not end the list.
    fn list(&self, src: &str, pos: usize) -> Option<(Block, usize)> {
        let mut items = Vec::new();
        let mut cursor = pos;
        while cursor < src.len() {
            let (line, next) = line_at(src, cursor);
            if line.trim().is_empty() && !items.is_empty() && next < src.len() {
                let (following, _) = line_at(src, next);
                if self.list_item(following).is_some() {
                    cursor = next;
                    continue;
                }
            }
            match self.list_item(line) {
                Some(item) => items.push(item),
                None => break,
            }
            cursor = next;
        }
        if items.is_empty() {
            None
        } else {
            Some((Block::List(items), cursor))
        }
    }

    fn list_item(&self, line: &str) -> Option<ListItem> {
        let body = line.trim_start();
        let indent = line[..line.len() - body.len()]
            .chars()
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();

        self.rules.iter().find_map(|rule| {
            let (marker, text) = match rule {
                Rule::TaskList => {
                    let caps = TASK_RE.captures(body)?;
                    let checked = caps.get(1)?.as_str() != " ";
                    (Marker::Task { checked }, caps.get(2)?.as_str())
                }
                Rule::UnorderedList => (Marker::Bullet, BULLET_RE.captures(body)?.get(1)?.as_str()),
                Rule::OrderedList => {
                    let caps = ORDERED_RE.captures(body)?;
                    (
                        Marker::Number(caps.get(1)?.as_str().to_string()),
                        caps.get(2)?.as_str(),
                    )
                }
                _ => return None,
            };
            Some(ListItem {
                indent,
                marker,
                text: text.to_string(),
            })
        })
    }
}

/// Line starting at `pos` (without its newline) and the offset of the next line.
fn line_at(src: &str, pos: usize) -> (&str, usize) {
    match src[pos..].find('\n') {
        Some(idx) => (&src[pos..pos + idx], pos + idx + 1),
        None => (&src[pos..], src.len()),
    }
}

/// Skip the rest of a line after a closing fence if it is blank; otherwise
/// leave it to be scanned as a new line.
fn after_closing(src: &str, end: usize) -> usize {
    let (rest, next) = line_at(src, end);
    if rest.trim().is_empty() {
        next
    } else {
        end
    }
}

fn strip_one_newline(text: &str) -> &str {
    let text = text.strip_prefix('\n').unwrap_or(text);
    text.strip_suffix('\n').unwrap_or(text)
}

fn fenced_code(src: &str, pos: usize, line: &str) -> Option<(Block, usize)> {
    let indent = line.len() - line.trim_start().len();
    let open = pos + indent;
    if !src[open..].starts_with("```") {
        return None;
    }
    let after_fence = open + 3;
    let close = after_fence + src[after_fence..].find("```")?;
    let end = close + 3;

    if !src[after_fence..close].contains('\n') {
        // A fence closed on its own line is a block only if nothing follows
        // it; otherwise the inline code span takes it.
        let (rest, next) = line_at(src, end);
        if !rest.trim().is_empty() {
            return None;
        }
        let code = Block::Code {
            lang: None,
            code: src[after_fence..close].to_string(),
        };
        return Some((code, next));
    }

    let lang_len = src[after_fence..close]
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.')))
        .unwrap_or(close - after_fence);
    let lang = &src[after_fence..after_fence + lang_len];
    let mut code = &src[after_fence + lang_len..close];
    // Anything after the language tag on the opening line is dropped when it
    // is only whitespace.
    if let Some(newline) = code.find('\n') {
        if code[..newline].trim().is_empty() {
            code = &code[newline..];
        }
    }
    let code = strip_one_newline(code);
    let end = after_closing(src, end);

    let lang = if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    };
    Some((
        Block::Code {
            lang,
            code: code.to_string(),
        },
        end,
    ))
}

fn block_math(src: &str, pos: usize, line: &str) -> Option<(Block, usize)> {
    let indent = line.len() - line.trim_start().len();
    let open = pos + indent;
    let body = src[open..].strip_prefix("$$")?;
    let close = body.find("$$")?;
    let tex = strip_one_newline(&body[..close]);
    if tex.trim().is_empty() {
        return None;
    }
    let end = after_closing(src, open + 2 + close + 2);
    Some((Block::Math(tex.to_string()), end))
}

fn heading(line: &str) -> Option<Block> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = caps.get(2)?.as_str().trim_end().to_string();
    Some(Block::Heading { level, text })
}

fn table(src: &str, line: &str, next: usize) -> Option<(Block, usize)> {
    if !line.contains('|') || next >= src.len() {
        return None;
    }
    let (separator, mut cursor) = line_at(src, next);
    if !separator.contains('|') || !TABLE_SEPARATOR_RE.is_match(separator) {
        return None;
    }

    let mut rows = Vec::new();
    while cursor < src.len() {
        let (row, after) = line_at(src, cursor);
        if row.trim().is_empty() || !row.contains('|') {
            break;
        }
        rows.push(split_row(row));
        cursor = after;
    }
    if rows.is_empty() {
        return None;
    }

    Some((
        Block::Table {
            header: split_row(line),
            rows,
        },
        cursor,
    ))
}

/// Split a pipe-delimited row, dropping the empty edge cells produced by
/// leading and trailing pipes.
fn split_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn quote(src: &str, pos: usize) -> Option<(Block, usize)> {
    let mut lines = Vec::new();
    let mut cursor = pos;
    while cursor < src.len() {
        let (line, next) = line_at(src, cursor);
        match line.strip_prefix("> ") {
            Some(body) => lines.push(body.to_string()),
            None => break,
        }
        cursor = next;
    }
    if lines.is_empty() {
        None
    } else {
        Some((Block::Quote(lines), cursor))
    }
}
