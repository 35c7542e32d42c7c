use crate::log::{MAIN_NAMES, NETWORK_NAMES, TRANSACTION_PREFIX, TsungLog, USER_NAMES};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Helper transactions the load scripts use internally; never reported
pub const DEFAULT_EXCLUDED_TRANSACTIONS: &[&str] =
    &["tr_rand_name", "tr_set_var", "tr_readfile", "tr_get_host_name"];

/// Semantic group a metric name is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transaction,
    Http,
    Match,
    Error,
    Network,
    Main,
    Users,
    Cpu,
    Load,
    Freemem,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Transaction,
        Category::Http,
        Category::Match,
        Category::Error,
        Category::Network,
        Category::Main,
        Category::Users,
        Category::Cpu,
        Category::Load,
        Category::Freemem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transaction => "transaction",
            Category::Http => "http",
            Category::Match => "match",
            Category::Error => "error",
            Category::Network => "network",
            Category::Main => "main",
            Category::Users => "users",
            Category::Cpu => "cpu",
            Category::Load => "load",
            Category::Freemem => "freemem",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a metric name to its category, first match wins
///
/// Depends on the name only, never on sample values.
pub fn classify(name: &str) -> Option<Category> {
    if name == "timestamp" {
        return None;
    }
    if name.starts_with(TRANSACTION_PREFIX) {
        Some(Category::Transaction)
    } else if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        Some(Category::Http)
    } else if name.contains("error") {
        Some(Category::Error)
    } else if name.contains("match") {
        Some(Category::Match)
    } else if name.starts_with("cpu") {
        Some(Category::Cpu)
    } else if name.starts_with("load") {
        Some(Category::Load)
    } else if name.starts_with("freemem") {
        Some(Category::Freemem)
    } else if MAIN_NAMES.contains(&name) {
        Some(Category::Main)
    } else if NETWORK_NAMES.contains(&name) {
        Some(Category::Network)
    } else if USER_NAMES.contains(&name) {
        Some(Category::Users)
    } else {
        None
    }
}

/// Classifies every name seen in a log
#[derive(Debug, Clone)]
pub struct Classifier {
    excluded_transactions: BTreeSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_TRANSACTIONS.iter().map(|s| s.to_string()))
    }
}

impl Classifier {
    /// Create a classifier hiding the given names from transaction output
    pub fn new<I, S>(excluded_transactions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_transactions: excluded_transactions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify_log(&self, log: &TsungLog) -> Classification {
        let mut classification = Classification {
            excluded_transactions: self.excluded_transactions.clone(),
            ..Default::default()
        };

        let names: BTreeSet<&str> = log
            .intervals
            .iter()
            .flat_map(|record| record.samples.keys().map(|k| k.as_str()))
            .collect();

        for name in names {
            match classify(name) {
                Some(category) => {
                    classification
                        .by_category
                        .entry(category)
                        .or_default()
                        .insert(name.to_string());
                    classification.by_name.insert(name.to_string(), category);
                }
                None => {
                    classification.unclassified.insert(name.to_string());
                }
            }
        }

        tracing::debug!(
            "Classified {} names, {} unclassified",
            classification.by_name.len(),
            classification.unclassified.len()
        );

        classification
    }
}

/// Result of classifying a log: every name lands in one category or in `unclassified`
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classification {
    by_category: BTreeMap<Category, BTreeSet<String>>,
    #[serde(skip)]
    by_name: BTreeMap<String, Category>,
    unclassified: BTreeSet<String>,
    excluded_transactions: BTreeSet<String>,
}

impl Classification {
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.by_name.get(name).copied()
    }

    /// All names of a category in lexicographic order
    pub fn names(&self, category: Category) -> Vec<&str> {
        self.by_category
            .get(&category)
            .map(|names| names.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Names of a category as they appear in tables and charts
    ///
    /// Only the transaction category honours the exclusion set.
    pub fn reported_names(&self, category: Category) -> Vec<&str> {
        let names = self.names(category);
        if category != Category::Transaction {
            return names;
        }
        names
            .into_iter()
            .filter(|name| !self.excluded_transactions.contains(*name))
            .collect()
    }

    pub fn unclassified(&self) -> impl Iterator<Item = &str> {
        self.unclassified.iter().map(|s| s.as_str())
    }
}
