//! The ordered rule table driving the renderer.
//!
//! Rules are plain descriptors: the scanners consult the table to decide which
//! constructs are recognised and, when two rules could start at the same
//! position, which one wins (earlier entries first).

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A single transform rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    // Block-level rules, matched at line starts
    FencedCode,
    BlockMath,
    Table,
    Heading,
    HorizontalRule,
    Blockquote,
    TaskList,
    UnorderedList,
    OrderedList,

    // Inline rules, matched inside a line
    InlineCode,
    InlineMath,
    Kbd,
    MarkdownLink,
    Autolink,
    Bold,
    Strikethrough,
    Highlight,
    Italic,
}

impl Rule {
    /// Every rule in the default priority order.
    pub const ALL: [Rule; 18] = [
        Rule::FencedCode,
        Rule::BlockMath,
        Rule::Table,
        Rule::Heading,
        Rule::HorizontalRule,
        Rule::Blockquote,
        Rule::TaskList,
        Rule::UnorderedList,
        Rule::OrderedList,
        Rule::InlineCode,
        Rule::InlineMath,
        Rule::Kbd,
        Rule::MarkdownLink,
        Rule::Autolink,
        Rule::Bold,
        Rule::Strikethrough,
        Rule::Highlight,
        Rule::Italic,
    ];

    pub fn is_block(self) -> bool {
        matches!(
            self,
            Rule::FencedCode
                | Rule::BlockMath
                | Rule::Table
                | Rule::Heading
                | Rule::HorizontalRule
                | Rule::Blockquote
                | Rule::TaskList
                | Rule::UnorderedList
                | Rule::OrderedList
        )
    }

    /// Protected spans are never rescanned by later rules, and delimiter
    /// rules skip over them when looking for a closing delimiter.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Rule::InlineCode | Rule::InlineMath | Rule::Kbd | Rule::MarkdownLink | Rule::Autolink
        )
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            Rule::TaskList | Rule::UnorderedList | Rule::OrderedList
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Rule::FencedCode => "fenced_code",
            Rule::BlockMath => "block_math",
            Rule::Table => "table",
            Rule::Heading => "heading",
            Rule::HorizontalRule => "horizontal_rule",
            Rule::Blockquote => "blockquote",
            Rule::TaskList => "task_list",
            Rule::UnorderedList => "unordered_list",
            Rule::OrderedList => "ordered_list",
            Rule::InlineCode => "inline_code",
            Rule::InlineMath => "inline_math",
            Rule::Kbd => "kbd",
            Rule::MarkdownLink => "markdown_link",
            Rule::Autolink => "autolink",
            Rule::Bold => "bold",
            Rule::Strikethrough => "strikethrough",
            Rule::Highlight => "highlight",
            Rule::Italic => "italic",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, duplicate-free list of enabled rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicates.
    pub fn new(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        let mut seen = Vec::with_capacity(rules.len());
        for rule in &rules {
            if seen.contains(rule) {
                return Err(ConfigError::DuplicateRule(rule.name().to_string()));
            }
            seen.push(*rule);
        }
        Ok(Self { rules })
    }

    /// All rules in the default order.
    pub fn standard() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
        }
    }

    /// Copy of this set with `rule` removed.
    pub fn without(&self, rule: Rule) -> Self {
        Self {
            rules: self.rules.iter().copied().filter(|r| *r != rule).collect(),
        }
    }

    pub fn contains(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        self.rules.iter().copied()
    }

    /// Block rules, in table order.
    pub fn block_rules(&self) -> Vec<Rule> {
        self.rules.iter().copied().filter(|r| r.is_block()).collect()
    }

    /// Inline rules, in table order.
    pub fn inline_rules(&self) -> Vec<Rule> {
        self.rules.iter().copied().filter(|r| !r.is_block()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_splits_by_level() {
        let set = RuleSet::standard();
        assert_eq!(set.len(), Rule::ALL.len());
        assert!(set.block_rules().iter().all(|r| r.is_block()));
        assert_eq!(set.inline_rules()[0], Rule::InlineCode);
        // Autolinking comes before any emphasis rule
        let inline = set.inline_rules();
        let autolink = inline.iter().position(|r| *r == Rule::Autolink).unwrap();
        let bold = inline.iter().position(|r| *r == Rule::Bold).unwrap();
        assert!(autolink < bold);
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = RuleSet::new(vec![Rule::Bold, Rule::Italic, Rule::Bold]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRule(name) if name == "bold"));
    }

    #[test]
    fn without_drops_a_rule() {
        let set = RuleSet::standard().without(Rule::Table);
        assert!(!set.contains(Rule::Table));
        assert!(set.contains(Rule::Heading));
    }

    #[test]
    fn rule_names_match_serde() {
        for rule in Rule::ALL {
            let yaml = serde_yaml::to_string(&rule).unwrap();
            assert_eq!(yaml.trim(), rule.name());
        }
    }
}
