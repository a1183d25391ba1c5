//! Groups scanned lines into paragraphs and flat list items into nested lists.

use super::blocks::ListItem;

/// Split a text run into paragraphs. Runs of blank (or whitespace-only) lines
/// separate paragraphs; the lines of a paragraph are later joined with `<br>`.
pub fn paragraphs(lines: &[String]) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.as_str());
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// A `<ul>` or `<ol>` with its items.
#[derive(Debug, PartialEq, Eq)]
pub struct List<'a> {
    pub ordered: bool,
    pub items: Vec<ListNode<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ListNode<'a> {
    pub item: &'a ListItem,
    pub children: Vec<List<'a>>,
}

/// Nest list items by indentation. Adjacent items at one level share a list
/// as long as they agree on ordered vs unordered; a change of kind starts a
/// sibling list.
pub fn nest(items: &[ListItem]) -> Vec<List<'_>> {
    let Some(base) = items.iter().map(|item| item.indent).min() else {
        return Vec::new();
    };
    let mut idx = 0;
    collect(items, &mut idx, base)
}

fn collect<'a>(items: &'a [ListItem], idx: &mut usize, level: usize) -> Vec<List<'a>> {
    let mut lists: Vec<List<'a>> = Vec::new();
    while let Some(item) = items.get(*idx) {
        if item.indent < level {
            break;
        }
        if item.indent > level {
            if let Some(parent) = lists.last_mut().and_then(|list| list.items.last_mut()) {
                let nested = collect(items, idx, item.indent);
                parent.children.extend(nested);
                continue;
            }
        }

        let ordered = item.marker.is_ordered();
        let node = ListNode {
            item,
            children: Vec::new(),
        };
        match lists.last_mut() {
            Some(list) if list.ordered == ordered => list.items.push(node),
            _ => lists.push(List {
                ordered,
                items: vec![node],
            }),
        }
        *idx += 1;
    }
    lists
}
