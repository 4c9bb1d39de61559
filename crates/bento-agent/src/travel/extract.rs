// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct criteria extraction from the user's literal text.
//!
//! When the user's message already names a budget, a day count, or activity
//! keywords, the search can run without any LLM round trip. At least one
//! recognized tag is required for a match attempt; otherwise extraction
//! yields nothing and the conversational path takes over.

use std::sync::LazyLock;

use regex::Regex;

use super::catalog::TravelCriteria;

/// Budget assumed when the message names activities but no figure.
const DEFAULT_BUDGET_TWD: u32 = 100_000;

/// Days of slack applied around a stated day count.
const DURATION_PADDING: u32 = 2;

/// Keyword → canonical catalog tag.
const TAG_KEYWORDS: &[(&[&str], &str)] = &[
    (&["潛水"], "潛水"),
    (&["英語", "英文"], "英語"),
    (&["文化"], "文化"),
    (&["瑜伽"], "瑜伽"),
    (&["遠距", "工作"], "遠距"),
];

static BUDGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(萬|元|塊)").expect("budget regex is valid"));

static DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[天日]").expect("days regex is valid"));

/// Attempts to derive [`TravelCriteria`] straight from the message text.
///
/// Returns `None` unless at least one activity tag was recognized.
pub fn extract_criteria(message: &str) -> Option<TravelCriteria> {
    let tags: Vec<String> = TAG_KEYWORDS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, tag)| (*tag).to_string())
        .collect();

    if tags.is_empty() {
        return None;
    }

    let mut criteria = TravelCriteria {
        tags,
        budget_twd: Some(DEFAULT_BUDGET_TWD),
        ..TravelCriteria::default()
    };

    if message.contains("預算")
        && let Some(caps) = BUDGET_RE.captures(message)
    {
        let amount: u32 = caps[1].parse().ok()?;
        criteria.budget_twd = Some(match &caps[2] {
            "萬" => amount.saturating_mul(10_000),
            _ => amount,
        });
    }

    if let Some(caps) = DAYS_RE.captures(message) {
        let days: u32 = caps[1].parse().ok()?;
        criteria.duration_min = days.saturating_sub(DURATION_PADDING).max(1);
        criteria.duration_max = days + DURATION_PADDING;
    }

    Some(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_in_wan_units_with_space() {
        let criteria = extract_criteria("我想去潛水，預算 5 萬").unwrap();
        assert_eq!(criteria.budget_twd, Some(50_000));
    }

    #[test]
    fn budget_in_yuan_units() {
        let criteria = extract_criteria("想學瑜伽，預算 5000元").unwrap();
        assert_eq!(criteria.budget_twd, Some(5_000));
    }

    #[test]
    fn budget_defaults_without_figure() {
        let criteria = extract_criteria("我想去潛水").unwrap();
        assert_eq!(criteria.budget_twd, Some(100_000));
    }

    #[test]
    fn day_count_padded_both_ways() {
        let criteria = extract_criteria("潛水 8天 行程").unwrap();
        assert_eq!(criteria.duration_min, 6);
        assert_eq!(criteria.duration_max, 10);
    }

    #[test]
    fn short_day_count_floors_at_one() {
        let criteria = extract_criteria("潛水一下，2日遊").unwrap();
        assert_eq!(criteria.duration_min, 1);
        assert_eq!(criteria.duration_max, 4);
    }

    #[test]
    fn no_tags_yields_nothing() {
        assert!(extract_criteria("幫我規劃行程，預算 5 萬").is_none());
    }

    #[test]
    fn english_keyword_maps_to_canonical_tag() {
        let criteria = extract_criteria("想邊旅行邊學英文").unwrap();
        assert_eq!(criteria.tags, vec!["英語".to_string()]);
    }

    #[test]
    fn multiple_tags_collected() {
        let criteria = extract_criteria("想找潛水加文化體驗").unwrap();
        assert_eq!(
            criteria.tags,
            vec!["潛水".to_string(), "文化".to_string()]
        );
    }

    #[test]
    fn remote_work_keywords_map_to_one_tag() {
        let criteria = extract_criteria("可以遠距工作的行程").unwrap();
        assert_eq!(criteria.tags, vec!["遠距".to_string()]);
    }
}
