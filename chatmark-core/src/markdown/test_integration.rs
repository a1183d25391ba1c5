//! End-to-end rendering tests

use super::*;
use crate::config::RenderConfig;

fn compact(src: &str) -> String {
    Renderer::new(RenderConfig::compact()).render(src)
}

fn rich(src: &str) -> String {
    Renderer::new(RenderConfig::rich()).render(src)
}

/// Text between the first `<code ...>` and `</code>`.
fn code_contents(html: &str) -> &str {
    let start = html.find("<code").expect("code element");
    let body = start + html[start..].find('>').expect("end of code tag") + 1;
    let end = body + html[body..].find("</code>").expect("closing code tag");
    &html[body..end]
}

#[test]
fn plain_text_becomes_paragraphs() {
    let html = compact("hello world\nsecond line\n\nnew para");
    insta::assert_snapshot!(html, @"<p>hello world<br>second line</p><p>new para</p>");
}

#[test]
fn whitespace_only_lines_split_paragraphs() {
    assert_eq!(compact("a\n   \nb"), "<p>a</p><p>b</p>");
    assert_eq!(compact("a\n\n\n\nb\n"), "<p>a</p><p>b</p>");
}

#[test]
fn protected_spans_survive_a_second_pass() {
    let renderer = Renderer::new(RenderConfig::compact());

    let once = renderer.render("use `a*b_c` here");
    let inline = code_contents(&once).to_string();
    let twice = renderer.render(&once);
    assert!(twice.contains(&inline), "{twice}");

    let once = renderer.render("```\nx = **y** + $z$\n```");
    let block = code_contents(&once).to_string();
    let twice = renderer.render(&once);
    assert!(twice.contains(&block), "{twice}");
    assert!(!twice.contains("<strong>"));
}

#[test]
fn inline_code_is_not_reformatted() {
    insta::assert_snapshot!(compact("`a+b`"), @"<p><code>a+b</code></p>");
    assert_eq!(
        compact("`**not bold**`"),
        "<p><code>&#42;&#42;not bold&#42;&#42;</code></p>"
    );
}

#[test]
fn markdown_link_renders_one_anchor() {
    let html = compact("[Docs](https://example.com/x)");
    insta::assert_snapshot!(html, @r#"<p><a href="https://example.com/x" target="_blank" rel="noopener noreferrer">Docs</a></p>"#);
    assert_eq!(html.matches("<a ").count(), 1);
}

#[test]
fn www_autolink_gets_scheme() {
    let html = compact("Visit www.example.com today");
    insta::assert_snapshot!(html, @r#"<p>Visit <a href="https://www.example.com" target="_blank" rel="noopener noreferrer">www.example.com</a> today</p>"#);
}

#[test]
fn version_numbers_are_not_linked() {
    assert_eq!(compact("1.0 release notes"), "<p>1.0 release notes</p>");
    assert_eq!(compact("upgrade to v2.3.1 now"), "<p>upgrade to v2.3.1 now</p>");
}

#[test]
fn code_block_then_bold_on_closing_line() {
    let html = compact("```js\ncode\n```**bold**");
    insta::assert_snapshot!(html, @r#"<pre data-lang="js"><code class="language-js">code</code></pre><p><strong>bold</strong></p>"#);
}

#[test]
fn malformed_table_stays_literal() {
    assert_eq!(
        compact("| a | b |\n| 1 | 2 |"),
        "<p>| a | b |<br>| 1 | 2 |</p>"
    );
}

#[test]
fn table_renders_header_and_body() {
    let html = compact("| a | b |\n|---|---|\n| 1 | 2 |");
    insta::assert_snapshot!(html, @"<table><thead><tr><th>a</th><th>b</th></tr></thead><tbody><tr><td>1</td><td>2</td></tr></tbody></table>");
}

#[test]
fn short_rows_are_padded() {
    let html = compact("| a | b |\n|---|---|\n| 1 |");
    assert!(html.contains("<tr><td>1</td><td></td></tr>"), "{html}");
}

#[test]
fn presets_coexist() {
    let plain = compact("**x**");
    let styled = rich("**x**");
    assert_eq!(plain, "<p><strong>x</strong></p>");
    assert_eq!(
        styled,
        "<p class=\"mb-2\"><strong class=\"font-bold text-gray-900 dark:text-gray-100\">x</strong></p>"
    );
}

#[test]
fn removed_rule_no_longer_fires() {
    let config = RenderConfig::compact().with_rules(RuleSet::standard().without(Rule::Bold));
    let renderer = Renderer::new(config);
    assert_eq!(renderer.render("**x**"), "<p>**x**</p>");

    let config = RenderConfig::compact().with_rules(RuleSet::standard().without(Rule::Heading));
    assert_eq!(Renderer::new(config).render("# t"), "<p># t</p>");
}

#[test]
fn script_tags_are_escaped() {
    assert_eq!(
        compact("<script>alert(1)</script>"),
        "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
    );
}

#[test]
fn javascript_links_are_not_anchors() {
    let html = compact("[x](javascript:alert(1))");
    assert!(!html.contains("<a"), "{html}");
    assert_eq!(html, "<p>[x](javascript:alert(1))</p>");
}

#[test]
fn existing_character_references_are_kept() {
    assert_eq!(compact("AT&amp;T & co"), "<p>AT&amp;T &amp; co</p>");
}

#[test]
fn headings_and_paragraphs() {
    assert_eq!(compact("# Title\ntext"), "<h1>Title</h1><p>text</p>");
    assert_eq!(
        compact("## Sub *it*"),
        "<h2>Sub <em>it</em></h2>"
    );
}

#[test]
fn task_lists_render_disabled_checkboxes() {
    let html = compact("- [x] done\n- [ ] todo");
    insta::assert_snapshot!(html, @r#"<ul><li><input type="checkbox" disabled checked><del>done</del></li><li><input type="checkbox" disabled>todo</li></ul>"#);
}

#[test]
fn nested_and_ordered_lists() {
    assert_eq!(
        compact("- a\n  - b\n- c"),
        "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
    );
    assert_eq!(
        compact("1. one\n2. two"),
        "<ol><li value=\"1\">one</li><li value=\"2\">two</li></ol>"
    );
}

#[test]
fn quotes_join_lines() {
    assert_eq!(compact("> a\n> b"), "<blockquote>a<br>b</blockquote>");
}

#[test]
fn email_autolink() {
    assert_eq!(
        compact("mail me@x.io"),
        "<p>mail <a href=\"mailto:me@x.io\" target=\"_blank\" rel=\"noopener noreferrer\">me@x.io</a></p>"
    );
}

#[test]
fn rich_code_block_carries_language_classes() {
    let html = rich("```\nplain\n```");
    assert!(html.starts_with(
        "<pre class=\"bg-gray-100 dark:bg-gray-800 p-3 rounded-lg overflow-x-auto my-2\" data-lang=\"text\"><code class=\"text-sm language-text\">"
    ), "{html}");
}

#[test]
fn math_and_kbd() {
    assert_eq!(
        compact("$E = mc^2$ costs $5"),
        "<p><span>E &#61; mc^2</span> costs $5</p>"
    );
    assert_eq!(
        compact("press <kbd>Ctrl</kbd>"),
        "<p>press <kbd>Ctrl</kbd></p>"
    );
}

#[test]
fn triple_backticks_inside_a_line() {
    assert_eq!(
        compact("Run ```a*b*c``` now"),
        "<p>Run <code>a&#42;b&#42;c</code> now</p>"
    );

    let html = compact("Text ```py\nx = a_b_c * 2 * 3\n```");
    assert!(html.starts_with("<p>Text</p><pre"), "{html}");
    assert!(html.contains("data-lang=\"py\""), "{html}");
    assert_eq!(code_contents(&html), "x &#61; a&#95;b&#95;c &#42; 2 &#42; 3");
    assert!(!html.contains("<em>"), "{html}");
}

#[test]
fn list_items_separated_by_one_blank_line() {
    assert_eq!(compact("- a\n\n- b"), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn plus_address_is_one_mailto_link() {
    let html = compact("Contact first.last+tag@example.com");
    assert_eq!(html.matches("<a ").count(), 1, "{html}");
    assert!(html.contains("href=\"mailto:first.last+tag@example.com\""), "{html}");
}

#[test]
fn dotted_identifiers_stay_text() {
    let html = compact("Array.prototype.map and self.value");
    assert!(!html.contains("<a"), "{html}");
}

#[test]
fn many_unclosed_openers_render_quickly() {
    let src = "*a _b ".repeat(4000);
    let started = std::time::Instant::now();
    let html = compact(&src);
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert!(!html.contains("<em>"));
}
