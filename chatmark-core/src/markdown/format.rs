//! Formatting pass: turns scanned blocks and inline tokens into HTML.

use super::assembler::{self, List};
use super::blocks::{Block, Marker};
use super::html::{Attr, Element, HtmlWriter};
use super::inline::{Inline, InlineScanner};
use crate::config::RenderConfig;

pub struct Formatter<'c> {
    config: &'c RenderConfig,
    inline: InlineScanner<'c>,
}

impl<'c> Formatter<'c> {
    pub fn new(config: &'c RenderConfig) -> Self {
        Self {
            config,
            inline: InlineScanner::new(config.rules().inline_rules(), config.autolink()),
        }
    }

    pub fn format(&self, blocks: &[Block]) -> String {
        let mut w = HtmlWriter::new();
        for block in blocks {
            self.block(&mut w, block);
        }
        w.finish()
    }

    fn block(&self, w: &mut HtmlWriter, block: &Block) {
        let style = self.config.style();
        match block {
            Block::Text(lines) => {
                for paragraph in assembler::paragraphs(lines) {
                    w.open(Element::P, &[Attr::Class(&style.paragraph)]);
                    self.lines(w, paragraph.iter().copied());
                    w.close(Element::P);
                }
            }
            Block::Heading { level, text } => {
                let element = Element::heading(*level);
                w.open(element, &[Attr::Class(style.heading(*level))]);
                self.line(w, text);
                w.close(element);
            }
            Block::Code { lang, code } => {
                let lang = lang.as_deref().unwrap_or(self.config.default_language());
                let code_class = format!("{} language-{lang}", style.pre_code);
                w.open(
                    Element::Pre,
                    &[Attr::Class(&style.pre), Attr::DataLang(lang)],
                );
                w.open(Element::Code, &[Attr::Class(code_class.trim())]);
                w.code(code);
                w.close(Element::Code);
                w.close(Element::Pre);
            }
            Block::Math(tex) => {
                w.open(Element::Div, &[Attr::Class(&style.math_block)]);
                w.code(tex);
                w.close(Element::Div);
            }
            Block::Table { header, rows } => self.table(w, header, rows),
            Block::Divider => w.void(Element::Hr, &[Attr::Class(&style.hr)]),
            Block::Quote(lines) => {
                w.open(Element::Blockquote, &[Attr::Class(&style.blockquote)]);
                self.lines(w, lines.iter().map(String::as_str));
                w.close(Element::Blockquote);
            }
            Block::List(items) => {
                for list in assembler::nest(items) {
                    self.list(w, &list);
                }
            }
        }
    }

    fn table(&self, w: &mut HtmlWriter, header: &[String], rows: &[Vec<String>]) {
        let style = self.config.style();
        w.open(Element::Table, &[Attr::Class(&style.table)]);
        w.open(Element::Thead, &[]);
        w.open(Element::Tr, &[]);
        for cell in header {
            w.open(Element::Th, &[Attr::Class(&style.th)]);
            self.line(w, cell);
            w.close(Element::Th);
        }
        w.close(Element::Tr);
        w.close(Element::Thead);

        w.open(Element::Tbody, &[]);
        for row in rows {
            w.open(Element::Tr, &[]);
            // Rows are cut or padded to the header width
            for idx in 0..header.len() {
                w.open(Element::Td, &[Attr::Class(&style.td)]);
                if let Some(cell) = row.get(idx) {
                    self.line(w, cell);
                }
                w.close(Element::Td);
            }
            w.close(Element::Tr);
        }
        w.close(Element::Tbody);
        w.close(Element::Table);
    }

    fn list(&self, w: &mut HtmlWriter, list: &List<'_>) {
        let style = self.config.style();
        let (element, class) = if list.ordered {
            (Element::Ol, &style.ol)
        } else {
            (Element::Ul, &style.ul)
        };
        w.open(element, &[Attr::Class(class)]);

        for node in &list.items {
            let item = node.item;
            match &item.marker {
                Marker::Number(n) => {
                    w.open(Element::Li, &[Attr::Class(&style.li), Attr::Value(n)]);
                    self.line(w, &item.text);
                }
                Marker::Bullet => {
                    w.open(Element::Li, &[Attr::Class(&style.li)]);
                    self.line(w, &item.text);
                }
                Marker::Task { checked } => {
                    let class = format!("{} {}", style.li, style.task_item);
                    w.open(Element::Li, &[Attr::Class(class.trim())]);
                    let mut attrs = vec![
                        Attr::Type("checkbox"),
                        Attr::Disabled,
                        Attr::Class(&style.checkbox),
                    ];
                    if *checked {
                        attrs.push(Attr::Checked);
                    }
                    w.void(Element::Input, &attrs);
                    if *checked {
                        w.open(Element::Del, &[Attr::Class(&style.task_done)]);
                        self.line(w, &item.text);
                        w.close(Element::Del);
                    } else {
                        self.line(w, &item.text);
                    }
                }
            }
            for child in &node.children {
                self.list(w, child);
            }
            w.close(Element::Li);
        }

        w.close(element);
    }

    /// Lines joined with `<br>`.
    fn lines<'l>(&self, w: &mut HtmlWriter, lines: impl Iterator<Item = &'l str>) {
        for (idx, line) in lines.enumerate() {
            if idx > 0 {
                w.void(Element::Br, &[]);
            }
            self.line(w, line);
        }
    }

    fn line(&self, w: &mut HtmlWriter, line: &str) {
        let tokens = self.inline.scan(line);
        self.inlines(w, &tokens);
    }

    fn inlines(&self, w: &mut HtmlWriter, tokens: &[Inline]) {
        let style = self.config.style();
        for token in tokens {
            match token {
                Inline::Text(text) => w.text(text),
                Inline::Code(code) => {
                    w.open(Element::Code, &[Attr::Class(&style.code)]);
                    w.code(code);
                    w.close(Element::Code);
                }
                Inline::Math { tex, display } => {
                    let class = if *display {
                        &style.math_block
                    } else {
                        &style.math_inline
                    };
                    w.open(Element::Span, &[Attr::Class(class)]);
                    w.code(tex);
                    w.close(Element::Span);
                }
                Inline::Kbd(key) => {
                    w.open(Element::Kbd, &[Attr::Class(&style.kbd)]);
                    w.code(key);
                    w.close(Element::Kbd);
                }
                Inline::Link { href, children } => {
                    w.open(
                        Element::A,
                        &[
                            Attr::Href(href),
                            Attr::Class(&style.link),
                            Attr::TargetBlank,
                            Attr::RelNoopener,
                        ],
                    );
                    self.inlines(w, children);
                    w.close(Element::A);
                }
                Inline::Autolink { href, text } => {
                    w.open(
                        Element::A,
                        &[
                            Attr::Href(href),
                            Attr::Class(&style.link),
                            Attr::TargetBlank,
                            Attr::RelNoopener,
                        ],
                    );
                    w.text(text);
                    w.close(Element::A);
                }
                Inline::Strong(children) => self.wrap(w, Element::Strong, &style.strong, children),
                Inline::Emphasis(children) => self.wrap(w, Element::Em, &style.em, children),
                Inline::Strikethrough(children) => self.wrap(w, Element::Del, &style.del, children),
                Inline::Highlight(children) => self.wrap(w, Element::Mark, &style.mark, children),
            }
        }
    }

    fn wrap(&self, w: &mut HtmlWriter, element: Element, class: &str, children: &[Inline]) {
        w.open(element, &[Attr::Class(class)]);
        self.inlines(w, children);
        w.close(element);
    }
}
