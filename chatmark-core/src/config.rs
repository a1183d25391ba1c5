//! Renderer configuration: presets, style classes and the rule table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::markdown::autolink::AutolinkOptions;
use crate::markdown::rules::{Rule, RuleSet};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Unknown style key: {0}")]
    UnknownStyle(String),

    #[error("Unknown preset: {0} (expected 'rich' or 'compact')")]
    UnknownPreset(String),

    #[error("Rule listed more than once: {0}")]
    DuplicateRule(String),
}

/// Built-in styling presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Utility classes for the chat page
    #[default]
    Rich,
    /// Bare markup with no classes
    Compact,
}

impl Preset {
    pub fn style(self) -> StyleSheet {
        match self {
            Preset::Rich => StyleSheet::rich(),
            Preset::Compact => StyleSheet::default(),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(Preset::Rich),
            "compact" => Ok(Preset::Compact),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// CSS classes attached to each emitted element. Empty strings emit no
/// `class` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub paragraph: String,
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub strong: String,
    pub em: String,
    pub del: String,
    pub mark: String,
    pub code: String,
    pub pre: String,
    pub pre_code: String,
    pub link: String,
    pub ul: String,
    pub ol: String,
    pub li: String,
    pub task_item: String,
    pub checkbox: String,
    pub task_done: String,
    pub blockquote: String,
    pub table: String,
    pub th: String,
    pub td: String,
    pub hr: String,
    pub math_block: String,
    pub math_inline: String,
    pub kbd: String,
}

impl StyleSheet {
    pub fn rich() -> Self {
        let s = |v: &str| v.to_string();
        Self {
            paragraph: s("mb-2"),
            h1: s("text-2xl font-bold mt-4 mb-2 text-gray-800 dark:text-gray-200"),
            h2: s("text-xl font-bold mt-4 mb-2 text-gray-800 dark:text-gray-200"),
            h3: s("text-lg font-semibold mt-4 mb-2 text-gray-800 dark:text-gray-200"),
            strong: s("font-bold text-gray-900 dark:text-gray-100"),
            em: s("italic text-gray-700 dark:text-gray-300"),
            del: s("line-through text-gray-500 dark:text-gray-400"),
            mark: s("bg-yellow-200 dark:bg-yellow-800 px-1 rounded"),
            code: s("bg-gray-100 dark:bg-gray-800 px-1 py-0.5 rounded text-sm font-mono"),
            pre: s("bg-gray-100 dark:bg-gray-800 p-3 rounded-lg overflow-x-auto my-2"),
            pre_code: s("text-sm"),
            link: s("text-blue-600 dark:text-blue-400 hover:underline"),
            ul: s("list-disc pl-6 my-2"),
            ol: s("list-decimal pl-6 my-2"),
            li: s("ml-4 mb-1"),
            task_item: s("list-none"),
            checkbox: s("mr-2"),
            task_done: s("line-through text-gray-500"),
            blockquote: s(
                "border-l-4 border-gray-300 dark:border-gray-600 pl-4 italic text-gray-600 dark:text-gray-400 my-2",
            ),
            table: s("min-w-full border-collapse border border-gray-300 dark:border-gray-600 my-2"),
            th: s("border border-gray-300 dark:border-gray-600 px-3 py-1 bg-gray-100 dark:bg-gray-800 font-semibold text-left"),
            td: s("border border-gray-300 dark:border-gray-600 px-3 py-1"),
            hr: s("my-4 border-gray-300 dark:border-gray-600"),
            math_block: s("bg-gray-50 dark:bg-gray-900 p-3 rounded-lg overflow-x-auto my-2 font-mono text-sm"),
            math_inline: s("font-mono text-sm"),
            kbd: s("px-1.5 py-0.5 text-xs font-mono bg-gray-100 dark:bg-gray-800 border border-gray-300 dark:border-gray-600 rounded"),
        }
    }

    /// Override a single class by its key (`h1`, `pre_code`, ...).
    pub fn set(&mut self, key: &str, class: impl Into<String>) -> Result<(), ConfigError> {
        let slot = self
            .slot_mut(key)
            .ok_or_else(|| ConfigError::UnknownStyle(key.to_string()))?;
        *slot = class.into();
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        let slot = match key {
            "paragraph" => &mut self.paragraph,
            "h1" => &mut self.h1,
            "h2" => &mut self.h2,
            "h3" => &mut self.h3,
            "strong" => &mut self.strong,
            "em" => &mut self.em,
            "del" => &mut self.del,
            "mark" => &mut self.mark,
            "code" => &mut self.code,
            "pre" => &mut self.pre,
            "pre_code" => &mut self.pre_code,
            "link" => &mut self.link,
            "ul" => &mut self.ul,
            "ol" => &mut self.ol,
            "li" => &mut self.li,
            "task_item" => &mut self.task_item,
            "checkbox" => &mut self.checkbox,
            "task_done" => &mut self.task_done,
            "blockquote" => &mut self.blockquote,
            "table" => &mut self.table,
            "th" => &mut self.th,
            "td" => &mut self.td,
            "hr" => &mut self.hr,
            "math_block" => &mut self.math_block,
            "math_inline" => &mut self.math_inline,
            "kbd" => &mut self.kbd,
            _ => return None,
        };
        Some(slot)
    }

    /// Class for a heading level (levels past three use `h3`).
    pub fn heading(&self, level: u8) -> &str {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            _ => &self.h3,
        }
    }
}

fn default_language() -> String {
    String::from("text")
}

/// On-disk shape of a renderer config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    preset: Preset,

    #[serde(default)]
    rules: Option<Vec<Rule>>,

    #[serde(default)]
    default_language: Option<String>,

    #[serde(default)]
    style: BTreeMap<String, String>,

    #[serde(default)]
    autolink: AutolinkOptions,
}

/// Immutable renderer configuration.
///
/// Built once and handed to [`crate::Renderer::new`]; several configurations
/// can be alive at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    preset: Preset,
    rules: RuleSet,
    style: StyleSheet,
    default_language: String,
    autolink: AutolinkOptions,
}

impl RenderConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            rules: RuleSet::standard(),
            style: preset.style(),
            default_language: default_language(),
            autolink: AutolinkOptions::default(),
        }
    }

    pub fn rich() -> Self {
        Self::from_preset(Preset::Rich)
    }

    pub fn compact() -> Self {
        Self::from_preset(Preset::Compact)
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = if yaml.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        let mut config = Self::from_preset(file.preset);
        if let Some(rules) = file.rules {
            config.rules = RuleSet::new(rules)?;
        }
        if let Some(lang) = file.default_language {
            config.default_language = lang;
        }
        for (key, class) in file.style {
            config.style.set(&key, class)?;
        }
        config.autolink = file.autolink;
        Ok(config)
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_style(mut self, style: StyleSheet) -> Self {
        self.style = style;
        self
    }

    pub fn with_autolink(mut self, autolink: AutolinkOptions) -> Self {
        self.autolink = autolink;
        self
    }

    pub fn with_default_language(mut self, lang: impl Into<String>) -> Self {
        self.default_language = lang.into();
        self
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn style(&self) -> &StyleSheet {
        &self.style
    }

    /// Label used for fenced blocks without a language tag
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn autolink(&self) -> &AutolinkOptions {
        &self.autolink
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::rich()
    }
}
