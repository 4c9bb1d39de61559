// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static travel product catalog and search.

use serde::Deserialize;

/// One bookable travel product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
    pub duration_days: u32,
    pub price_twd: u32,
    pub tags: &'static [&'static str],
}

/// The full product catalog.
pub const CATALOG: &[CatalogItem] = &[
    CatalogItem {
        id: "P001",
        name: "小琉球潛水＋島語英語營",
        duration_days: 8,
        price_twd: 42_000,
        tags: &["潛水", "英語"],
    },
    CatalogItem {
        id: "P002",
        name: "花東部落文化深潛旅",
        duration_days: 14,
        price_twd: 68_000,
        tags: &["潛水", "文化"],
    },
    CatalogItem {
        id: "P003",
        name: "峇里島遠距工作瑜伽包",
        duration_days: 21,
        price_twd: 95_000,
        tags: &["瑜伽", "遠距"],
    },
];

/// Search constraints, either extracted from the user's text or parsed from
/// a model-emitted `<SEARCH>` block. Ephemeral, one per search turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TravelCriteria {
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
    #[serde(default = "default_duration_max")]
    pub duration_max: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Upper bound on price; `None` means unbounded.
    #[serde(default)]
    pub budget_twd: Option<u32>,
}

impl Default for TravelCriteria {
    fn default() -> Self {
        Self {
            duration_min: default_duration_min(),
            duration_max: default_duration_max(),
            tags: Vec::new(),
            budget_twd: None,
        }
    }
}

fn default_duration_min() -> u32 {
    1
}

fn default_duration_max() -> u32 {
    365
}

/// Filters the catalog with all constraints AND-combined: duration range
/// inclusive, price within budget, and every requested tag present in the
/// item's tag set (exact string match, case-sensitive).
pub fn search(criteria: &TravelCriteria) -> Vec<&'static CatalogItem> {
    CATALOG
        .iter()
        .filter(|item| {
            item.duration_days >= criteria.duration_min
                && item.duration_days <= criteria.duration_max
                && criteria.budget_twd.is_none_or(|b| item.price_twd <= b)
                && criteria
                    .tags
                    .iter()
                    .all(|tag| item.tags.contains(&tag.as_str()))
        })
        .collect()
}
