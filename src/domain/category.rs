use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use anyhow::anyhow;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::normalize::normalize;

/// Productivity class of a domain.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Productive,
    #[default]
    Neutral,
    Distracting,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Productive,
        Category::Neutral,
        Category::Distracting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Productive => "productive",
            Category::Neutral => "neutral",
            Category::Distracting => "distracting",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown category {s}"))
    }
}

/// User-authoritative assignments, keyed by normalized domain.
pub type CategoryOverrides = BTreeMap<String, Category>;

const PRODUCTIVE_KEYWORDS: &[&str] = &[
    "github",
    "stackoverflow",
    "dev.to",
    "medium",
    "docs",
    "documentation",
    "learn",
    "tutorial",
    "course",
    "education",
    "wiki",
    "research",
    "office",
    "drive.google",
    "gmail",
    "outlook",
    "teams",
    "slack",
    "notion",
    "trello",
];

const DISTRACTING_KEYWORDS: &[&str] = &[
    "facebook",
    "twitter",
    "instagram",
    "tiktok",
    "youtube",
    "netflix",
    "reddit",
    "gaming",
    "entertainment",
    "social",
    "news",
    "sport",
    "twitch",
    "discord",
    "whatsapp",
    "telegram",
    "snapchat",
    "pinterest",
];

/// Decides the category of a domain. Overrides always win; otherwise the keyword lists are
/// scanned in a fixed order (productive first), and anything unmatched is neutral.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    productive: &'static [&'static str],
    distracting: &'static [&'static str],
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(PRODUCTIVE_KEYWORDS, DISTRACTING_KEYWORDS)
    }
}

impl CategoryClassifier {
    pub fn new(
        productive: &'static [&'static str],
        distracting: &'static [&'static str],
    ) -> Self {
        Self {
            productive,
            distracting,
        }
    }

    pub fn classify(&self, domain: &str, overrides: &CategoryOverrides) -> Category {
        let domain = normalize(domain);
        if let Some(category) = overrides.get(&domain) {
            return *category;
        }
        self.heuristic(&domain)
    }

    /// Keyword-only classification of an already normalized domain.
    pub fn heuristic(&self, domain: &str) -> Category {
        let matches = |keywords: &[&str]| keywords.iter().any(|keyword| domain.contains(keyword));
        if matches(self.productive) {
            Category::Productive
        } else if matches(self.distracting) {
            Category::Distracting
        } else {
            Category::Neutral
        }
    }
}
