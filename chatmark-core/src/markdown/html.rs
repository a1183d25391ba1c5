//! Allow-listed HTML output.
//!
//! The renderer never concatenates markup by hand: every tag goes through
//! [`HtmlWriter`], which only knows the elements and attributes in
//! [`Element`] and [`Attr`]. Text is escaped on the way in and link targets
//! must pass [`SafeUrl::parse`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Elements the renderer is allowed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    P,
    Br,
    H1,
    H2,
    H3,
    Strong,
    Em,
    Del,
    Mark,
    Code,
    Pre,
    Span,
    Div,
    A,
    Ul,
    Ol,
    Li,
    Input,
    Blockquote,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    Hr,
    Kbd,
}

impl Element {
    pub fn name(self) -> &'static str {
        match self {
            Element::P => "p",
            Element::Br => "br",
            Element::H1 => "h1",
            Element::H2 => "h2",
            Element::H3 => "h3",
            Element::Strong => "strong",
            Element::Em => "em",
            Element::Del => "del",
            Element::Mark => "mark",
            Element::Code => "code",
            Element::Pre => "pre",
            Element::Span => "span",
            Element::Div => "div",
            Element::A => "a",
            Element::Ul => "ul",
            Element::Ol => "ol",
            Element::Li => "li",
            Element::Input => "input",
            Element::Blockquote => "blockquote",
            Element::Table => "table",
            Element::Thead => "thead",
            Element::Tbody => "tbody",
            Element::Tr => "tr",
            Element::Th => "th",
            Element::Td => "td",
            Element::Hr => "hr",
            Element::Kbd => "kbd",
        }
    }

    pub fn is_void(self) -> bool {
        matches!(self, Element::Br | Element::Hr | Element::Input)
    }

    /// Element for a heading level, clamped to the three supported tiers.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Element::H1,
            2 => Element::H2,
            _ => Element::H3,
        }
    }
}

/// Link target that passed scheme validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeUrl(String);

impl SafeUrl {
    /// Accept `http`, `https`, `mailto` and scheme-less (relative) targets.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return None;
        }

        let scheme_end = raw.find(':');
        let first_delim = raw.find(['/', '?', '#']);
        let has_scheme = match (scheme_end, first_delim) {
            (Some(colon), Some(delim)) => colon < delim,
            (Some(_), None) => true,
            _ => false,
        };

        if !has_scheme {
            return Some(Self(raw.to_string()));
        }

        let scheme = raw[..scheme_end.unwrap_or(0)].to_ascii_lowercase();
        match scheme.as_str() {
            "http" | "https" | "mailto" => Some(Self(raw.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attributes the renderer is allowed to emit.
#[derive(Debug, Clone, Copy)]
pub enum Attr<'a> {
    Class(&'a str),
    Href(&'a SafeUrl),
    /// `target="_blank"`
    TargetBlank,
    /// `rel="noopener noreferrer"`
    RelNoopener,
    Type(&'static str),
    Checked,
    Disabled,
    DataLang(&'a str),
    Value(&'a str),
}

/// Streaming HTML builder over the allow-listed element set.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
    open: Vec<Element>,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, element: Element, attrs: &[Attr<'_>]) {
        self.start_tag(element, attrs);
        if !element.is_void() {
            self.open.push(element);
        }
    }

    /// Emit a void element (`<br>`, `<hr>`, `<input>`).
    pub fn void(&mut self, element: Element, attrs: &[Attr<'_>]) {
        debug_assert!(element.is_void());
        self.start_tag(element, attrs);
    }

    pub fn close(&mut self, element: Element) {
        let top = self.open.pop();
        debug_assert_eq!(top, Some(element), "mismatched close tag");
        self.out.push_str("</");
        self.out.push_str(element.name());
        self.out.push('>');
    }

    /// Escaped prose text.
    pub fn text(&mut self, text: &str) {
        escape_text_into(text, &mut self.out);
    }

    /// Escaped verbatim text for code and math spans.
    pub fn code(&mut self, text: &str) {
        escape_code_into(text, &mut self.out);
    }

    /// Close anything still open and return the markup.
    pub fn finish(mut self) -> String {
        while let Some(element) = self.open.pop() {
            self.out.push_str("</");
            self.out.push_str(element.name());
            self.out.push('>');
        }
        self.out
    }

    fn start_tag(&mut self, element: Element, attrs: &[Attr<'_>]) {
        self.out.push('<');
        self.out.push_str(element.name());
        for attr in attrs {
            match attr {
                Attr::Class(class) => {
                    if !class.trim().is_empty() {
                        self.attr("class", class);
                    }
                }
                Attr::Href(url) => self.attr("href", url.as_str()),
                Attr::TargetBlank => self.attr("target", "_blank"),
                Attr::RelNoopener => self.attr("rel", "noopener noreferrer"),
                Attr::Type(ty) => self.attr("type", ty),
                Attr::Checked => self.out.push_str(" checked"),
                Attr::Disabled => self.out.push_str(" disabled"),
                Attr::DataLang(lang) => self.attr("data-lang", lang),
                Attr::Value(value) => self.attr("value", value),
            }
        }
        self.out.push('>');
    }

    fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        escape_attr_into(value, &mut self.out);
        self.out.push('"');
    }
}

static CHAR_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid character reference regex")
});

/// Escape prose text, leaving existing character references intact.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text_into(text, &mut out);
    out
}

fn escape_text_into(text: &str, out: &mut String) {
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if CHAR_REF_RE.is_match(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// Escape verbatim code. Characters that could trigger a rule on a second
/// render pass are written as numeric references.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_code_into(text, &mut out);
    out
}

fn escape_code_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' | '*' | '_' | '~' | '=' | '$' | '[' | ':' | '@' | '.' => {
                out.push_str("&#");
                out.push_str(&(ch as u32).to_string());
                out.push(';');
            }
            _ => out.push(ch),
        }
    }
}

fn escape_attr_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escaping_keeps_references() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("&amp; &#42; &#x2A;"), "&amp; &#42; &#x2A;");
        assert_eq!(escape_text("\"x\" 'y'"), "&quot;x&quot; &#39;y&#39;");
        assert_eq!(escape_text("AT&T;"), "AT&amp;T;");
    }

    #[test]
    fn code_escaping_neutralises_triggers() {
        assert_eq!(escape_code("**x**"), "&#42;&#42;x&#42;&#42;");
        assert_eq!(escape_code("a&lt;"), "a&amp;lt;");
        assert_eq!(escape_code("a+b"), "a+b");
    }

    #[test]
    fn safe_url_filters_schemes() {
        assert!(SafeUrl::parse("https://example.com/x").is_some());
        assert!(SafeUrl::parse("HTTP://example.com").is_some());
        assert!(SafeUrl::parse("mailto:me@example.com").is_some());
        assert!(SafeUrl::parse("/docs/intro").is_some());
        assert!(SafeUrl::parse("#section").is_some());
        assert!(SafeUrl::parse("guide?a=b:c").is_some());
        assert!(SafeUrl::parse("javascript:alert(1)").is_none());
        assert!(SafeUrl::parse("JavaScript:alert(1)").is_none());
        assert!(SafeUrl::parse("data:text/html,hi").is_none());
        assert!(SafeUrl::parse("").is_none());
        assert!(SafeUrl::parse("java\tscript:x").is_none());
    }

    #[test]
    fn writer_skips_empty_class_and_escapes_attrs() {
        let url = SafeUrl::parse("https://example.com/?a=1&b=\"2\"").unwrap();
        let mut w = HtmlWriter::new();
        w.open(Element::A, &[Attr::Href(&url), Attr::Class("")]);
        w.text("x");
        w.close(Element::A);
        w.void(Element::Br, &[]);
        assert_eq!(
            w.finish(),
            "<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">x</a><br>"
        );
    }

    #[test]
    fn finish_closes_dangling_elements() {
        let mut w = HtmlWriter::new();
        w.open(Element::Ul, &[]);
        w.open(Element::Li, &[Attr::Class("item")]);
        w.text("a");
        assert_eq!(w.finish(), "<ul><li class=\"item\">a</li></ul>");
    }
}
