//! Classification of metric names into dashboard sections.
//!
//! All rules are case-sensitive substring checks on the full metric name and
//! are evaluated independently, so a name may land in several sections.

use std::collections::BTreeSet;

use serde::Serialize;

/// Dashboard grouping for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    /// DORA delivery metrics.
    Delivery,
    /// CI/CD pipeline metrics.
    Pipeline,
    Infrastructure,
    Application,
    /// Matches no rule. Never part of a classification set.
    Uncategorized,
}

impl Category {
    /// The categories that have their own dashboard section, in display order.
    pub const SECTIONS: [Category; 4] = [
        Category::Delivery,
        Category::Pipeline,
        Category::Infrastructure,
        Category::Application,
    ];

    /// Returns the section heading.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Delivery => "DORA",
            Category::Pipeline => "Pipeline",
            Category::Infrastructure => "Infrastructure",
            Category::Application => "Application",
            Category::Uncategorized => "Other",
        }
    }

    /// Returns a short tag for table cells.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Delivery => "DORA",
            Category::Pipeline => "CI",
            Category::Infrastructure => "INF",
            Category::Application => "APP",
            Category::Uncategorized => "-",
        }
    }
}

/// Substring rules per section, evaluated independently.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Delivery, &["deployment", "lead.time", "failure", "mttr"]),
    (Category::Pipeline, &["build", "test", "code.churn"]),
    (Category::Infrastructure, &["cpu", "memory", "disk", "network"]),
    (Category::Application, &["api", "request", "error", "db"]),
];

/// Map a metric name to every section whose rule it matches.
///
/// An empty set means the metric is uncategorized.
pub fn classify(name: &str) -> BTreeSet<Category> {
    CATEGORY_RULES
        .iter()
        .filter(|(_, needles)| needles.iter().any(|n| name.contains(n)))
        .map(|(category, _)| *category)
        .collect()
}

/// First matching section, or [`Category::Uncategorized`].
pub fn primary_category(name: &str) -> Category {
    classify(name).into_iter().next().unwrap_or(Category::Uncategorized)
}

/// Presentation tone for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Success,
    Warning,
    Primary,
}

/// First match wins.
const TONE_RULES: &[(Tone, &[&str])] = &[
    (Tone::Danger, &["error", "failure"]),
    (Tone::Success, &["success", "coverage"]),
    (Tone::Warning, &["deployment", "build"]),
];

/// Pick the display tone for a metric name.
pub fn tone(name: &str) -> Tone {
    TONE_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| name.contains(n)))
        .map(|(tone, _)| *tone)
        .unwrap_or(Tone::Primary)
}

const ICON_RULES: &[(&str, &[&str])] = &[
    ("🚀", &["deployment"]),
    ("🔨", &["build"]),
    ("✅", &["test"]),
    ("❌", &["error", "failure"]),
    ("💻", &["cpu"]),
    ("🧠", &["memory"]),
    ("🌐", &["network"]),
    ("⚡", &["api"]),
];

const DEFAULT_ICON: &str = "📊";

/// Pick the display icon for a metric name.
pub fn icon(name: &str) -> &'static str {
    ICON_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| name.contains(n)))
        .map(|(icon, _)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

/// Human label for a dotted metric name: `lead.time.minutes` -> `LEAD TIME MINUTES`.
pub fn display_name(name: &str) -> String {
    name.replace('.', " ").to_uppercase()
}
