//! Link/contact detection for bare URLs, `www.` domains, bare domains and
//! email addresses.
//!
//! Detection is attempted by the inline scanner at every position; a match
//! is only possible at a token boundary, so the tail of an identifier or the
//! middle of a path never starts a link.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What kind of bare text produced the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Url,
    Www,
    Domain,
    Email,
}

/// A detected autolink starting at the scanned position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autolink {
    pub kind: LinkKind,
    /// Link target (scheme added for `www.`, domain and email links)
    pub href: String,
    /// Visible text, exactly as it appeared in the input
    pub text: String,
}

impl Autolink {
    /// Number of input bytes covered by the link.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Tunables for the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutolinkOptions {
    /// Link bare `example.com` style tokens
    pub bare_domains: bool,
    /// Link `local@domain.tld` tokens
    pub emails: bool,
    /// Final labels that mark a token as a file name rather than a domain
    pub excluded_extensions: Vec<String>,
    /// Longer-than-two-letter final labels accepted for bare domains. Any
    /// two-letter country code is accepted without listing it.
    pub domain_suffixes: Vec<String>,
}

impl Default for AutolinkOptions {
    fn default() -> Self {
        Self {
            bare_domains: true,
            emails: true,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            domain_suffixes: DEFAULT_DOMAIN_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    "txt", "doc", "docx", "pdf", "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "md", "rs",
    "js", "ts", "tsx", "jsx", "py", "rb", "go", "java", "json", "yaml", "yml", "toml", "csv",
    "xls", "xlsx", "ppt", "pptx", "zip", "tar", "gz", "exe", "sh", "html", "htm", "css", "xml",
    "log", "mp3", "mp4", "wav", "mov",
];

const DEFAULT_DOMAIN_SUFFIXES: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "info", "biz", "name", "pro", "dev", "app",
    "xyz", "site", "online", "tech", "blog", "cloud", "page", "wiki", "news", "shop", "store",
    "art", "design", "aero", "asia", "coop", "jobs", "mobi", "museum", "travel",
];

const URL_CHARS: &str = r"[A-Za-z0-9\-._~:/?#\[\]@!$&()*+,;=%]";

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^https?://{URL_CHARS}+")).expect("valid url regex"));

static WWW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^www\.(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{{2,}}(?:[/?#]{URL_CHARS}*)?"
    ))
    .expect("valid www regex")
});

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+([a-z]{{2,24}})([/?#]{URL_CHARS}*)?"
    ))
    .expect("valid domain regex")
});

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+").expect("valid version regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9][A-Za-z0-9._%+-]*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}",
    )
    .expect("valid email regex")
});

/// Try to detect an autolink starting exactly at byte `pos` of `src`.
///
/// Priority: full URL, `www.` domain, bare domain, email.
pub fn detect(src: &str, pos: usize, options: &AutolinkOptions) -> Option<Autolink> {
    if !at_boundary(src, pos) {
        return None;
    }
    let rest = &src[pos..];

    detect_url(rest)
        .or_else(|| detect_www(rest))
        .or_else(|| {
            if options.bare_domains {
                detect_domain(rest, options)
            } else {
                None
            }
        })
        .or_else(|| {
            if options.emails {
                detect_email(rest)
            } else {
                None
            }
        })
}

fn at_boundary(src: &str, pos: usize) -> bool {
    match src[..pos].chars().next_back() {
        None => true,
        Some(c) => !(c.is_ascii_alphanumeric() || matches!(c, '.' | '@' | '/' | '-' | '_' | '%' | '+')),
    }
}

fn continues_token(rest: &str, end: usize) -> bool {
    rest[end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@' | '+' | '%'))
}

fn detect_url(rest: &str) -> Option<Autolink> {
    let m = URL_RE.find(rest)?;
    let text = trim_trailing(m.as_str());
    let scheme_len = if text.starts_with("https://") { 8 } else { 7 };
    if text.len() <= scheme_len {
        return None;
    }
    Some(Autolink {
        kind: LinkKind::Url,
        href: text.to_string(),
        text: text.to_string(),
    })
}

fn detect_www(rest: &str) -> Option<Autolink> {
    let m = WWW_RE.find(rest)?;
    let text = trim_trailing(m.as_str());
    if continues_token(rest, text.len()) {
        return None;
    }
    Some(Autolink {
        kind: LinkKind::Www,
        href: format!("https://{text}"),
        text: text.to_string(),
    })
}

fn detect_domain(rest: &str, options: &AutolinkOptions) -> Option<Autolink> {
    let caps = DOMAIN_RE.captures(rest)?;
    let whole = caps.get(0)?.as_str();
    let tld = caps.get(1)?;

    if VERSION_RE.is_match(whole) {
        return None;
    }
    // The token is the local part of an email address
    if EMAIL_RE.is_match(rest) {
        return None;
    }
    let tld = tld.as_str();
    if options
        .excluded_extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(tld))
    {
        return None;
    }
    if tld.len() > 2 && !options.domain_suffixes.iter().any(|known| known == tld) {
        return None;
    }

    let text = match caps.get(2) {
        Some(_) => trim_trailing(whole),
        None => whole,
    };
    if continues_token(rest, text.len()) {
        return None;
    }

    Some(Autolink {
        kind: LinkKind::Domain,
        href: format!("https://{text}"),
        text: text.to_string(),
    })
}

fn detect_email(rest: &str) -> Option<Autolink> {
    let m = EMAIL_RE.find(rest)?;
    let text = m.as_str();
    if continues_token(rest, text.len()) {
        return None;
    }
    Some(Autolink {
        kind: LinkKind::Email,
        href: format!("mailto:{text}"),
        text: text.to_string(),
    })
}

/// Drop trailing punctuation and unbalanced closing brackets.
fn trim_trailing(mut text: &str) -> &str {
    loop {
        let Some(last) = text.chars().next_back() else {
            return text;
        };
        let drop = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '*' | '_' | '~' | '\'' => true,
            ')' => text.matches('(').count() < text.matches(')').count(),
            ']' => text.matches('[').count() < text.matches(']').count(),
            _ => false,
        };
        if !drop {
            return text;
        }
        text = &text[..text.len() - last.len_utf8()];
    }
}
