// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The travel tool-use loop.
//!
//! Drives a multi-turn exchange with the LLM, scanning each assistant turn
//! for embedded directives (search, order, safety flag) and executing them.
//! The loop is bounded: after [`MAX_TURNS`] turns without a terminal
//! directive it gives up with a fixed fallback instead of spending tokens
//! on a "no results, keep searching" cycle.

use std::sync::LazyLock;

use bento_openai::{ChatMessage, ChatRequest};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::catalog::{search, CatalogItem, TravelCriteria, CATALOG};
use super::extract::extract_criteria;
use crate::ports::CompletionApi;
use crate::prompts::TRAVEL_SYSTEM_PROMPT;

/// Upper bound on LLM turns per invocation.
const MAX_TURNS: usize = 5;

/// Substrings that mark a message as travel intent.
const TRAVEL_KEYWORDS: &[&str] = &["旅遊", "旅行", "行程", "規劃", "travel"];

const SAFE_MODE_MARKER: &str = "<SAFE_MODE>";

const NO_RESULTS_NOTICE: &str = "很抱歉，沒有找到符合條件的旅行產品。";

const SAFE_MODE_DEFLECTION: &str =
    "我們注意到您的訊息可能包含敏感內容。如需協助，請聯繫我們的客服團隊。";

const TRAVEL_FALLBACK: &str =
    "抱歉，我還沒有找到合適的方案，請換個方式描述您的旅遊需求（例如活動、天數與預算）。";

const TRAVEL_APOLOGY: &str = "抱歉，目前無法處理您的訊息。";

static SEARCH_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<SEARCH>(.*?)</SEARCH>").expect("search regex is valid"));

static ORDER_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<CREATE_ORDER>(.*?)</CREATE_ORDER>").expect("order regex is valid")
});

static SELECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"方案(\d+)|選擇(\d+)|^(\d+)$").expect("selection regex is valid"));

/// True when the text matches the travel-intent keywords.
pub fn is_travel_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRAVEL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// An order-creation directive emitted by the model.
#[derive(Debug, Deserialize)]
struct OrderRequest {
    product_id: String,
    #[serde(default)]
    date: Option<String>,
}

/// A synthesized order. Stub contract: the payment link points at a demo
/// gateway, no real payment integration exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub payment_link: String,
    pub product_id: String,
    pub date: String,
}

/// Generates an opaque order id and payment link for a product.
pub fn create_order(product_id: &str, date: Option<String>) -> Order {
    let token = Uuid::new_v4().simple().to_string();
    Order {
        order_id: format!("ORD-{token}"),
        payment_link: format!("https://pay.demo/tx/{product_id}-{token}"),
        product_id: product_id.to_string(),
        date: date.unwrap_or_else(|| chrono::Utc::now().date_naive().to_string()),
    }
}

/// The travel sub-flow driver.
pub struct TravelFlow<'a> {
    llm: &'a dyn CompletionApi,
    model: &'a str,
    max_tokens: u32,
}

impl<'a> TravelFlow<'a> {
    pub fn new(llm: &'a dyn CompletionApi, model: &'a str, max_tokens: u32) -> Self {
        Self {
            llm,
            model,
            max_tokens,
        }
    }

    /// Processes one travel message and returns the final reply text.
    ///
    /// Tries the direct-extraction short-circuit first; a message whose
    /// surface text already yields criteria and at least one match never
    /// reaches the LLM.
    pub async fn process(&self, user_message: &str) -> String {
        if let Some(criteria) = extract_criteria(user_message) {
            let results = search(&criteria);
            debug!(matches = results.len(), "direct extraction search");
            if !results.is_empty() {
                return format_results(&results);
            }
        }

        self.converse(user_message).await
    }

    /// The conversational path: seed history, then loop bounded turns.
    async fn converse(&self, user_message: &str) -> String {
        let mut messages = vec![
            ChatMessage::system(TRAVEL_SYSTEM_PROMPT),
            ChatMessage::user(user_message),
        ];

        for turn in 0..MAX_TURNS {
            let request = ChatRequest {
                model: self.model.to_string(),
                messages: messages.clone(),
                temperature: Some(0.7),
                max_tokens: Some(self.max_tokens),
                response_format: None,
            };

            let response = match self.llm.chat(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, turn, "travel completion failed");
                    return TRAVEL_APOLOGY.to_string();
                }
            };

            let assistant_text = response.first_content().unwrap_or_default().to_string();
            messages.push(ChatMessage::assistant(assistant_text.clone()));

            // 1. Search directive.
            if let Some(criteria) = extract_block::<TravelCriteria>(&SEARCH_BLOCK_RE, &assistant_text) {
                let results = search(&criteria);
                debug!(turn, matches = results.len(), "model-directed search");
                if !results.is_empty() {
                    return format_results(&results);
                }
                messages.push(ChatMessage::user(NO_RESULTS_NOTICE));
                continue;
            }

            // 2. Numeric product selection in the original user message.
            if let Some(index) = select_product_index(user_message)
                && let Some(item) = CATALOG.get(index)
            {
                let order = create_order(item.id, None);
                debug!(turn, product = item.id, order_id = %order.order_id, "order from selection");
                return booking_confirmation(item, &order);
            }

            // 3. Order directive.
            if let Some(order_request) =
                extract_block::<OrderRequest>(&ORDER_BLOCK_RE, &assistant_text)
            {
                let order = create_order(&order_request.product_id, order_request.date);
                debug!(turn, product = %order.product_id, order_id = %order.order_id, "order from directive");
                messages.push(ChatMessage::user(format!(
                    "已為你建立訂單：{}",
                    order.payment_link
                )));
                return order_confirmation(&order);
            }

            // 4. Safety flag: discard the assistant output entirely.
            if assistant_text.contains(SAFE_MODE_MARKER) {
                return SAFE_MODE_DEFLECTION.to_string();
            }

            // No directive: the assistant text is the final reply.
            return assistant_text;
        }

        TRAVEL_FALLBACK.to_string()
    }
}

/// Parses the JSON payload of the first tagged block in the text, if any.
fn extract_block<T: serde::de::DeserializeOwned>(re: &Regex, text: &str) -> Option<T> {
    let caps = re.captures(text)?;
    match serde_json::from_str(caps[1].trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "malformed directive block ignored");
            None
        }
    }
}

/// Parses a 1-based product selection ("方案2", "選擇2", or a bare integer)
/// into a 0-based catalog index.
fn select_product_index(user_message: &str) -> Option<usize> {
    let caps = SELECTION_RE.captures(user_message.trim())?;
    let digits = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str();
    let number: usize = digits.parse().ok()?;
    number.checked_sub(1)
}

/// Formats search results as a numbered, human-readable list.
fn format_results(results: &[&CatalogItem]) -> String {
    let mut response = String::from("根據您的需求，我找到了以下旅行方案：\n\n");
    for (index, item) in results.iter().enumerate() {
        response.push_str(&format!("{}. {}\n", index + 1, item.name));
        response.push_str(&format!("   ⏱️ 天數：{} 天\n", item.duration_days));
        response.push_str(&format!("   💰 價格：{} 元\n", item.price_twd));
        response.push_str(&format!("   🏷️ 標籤：{}\n\n", item.tags.join("、")));
    }
    response.push_str("如果您對某個方案感興趣，請回覆方案編號，我可以協助您預訂。");
    response
}

fn booking_confirmation(item: &CatalogItem, order: &Order) -> String {
    format!(
        "已為您預訂「{}」，請前往以下連結完成付款：{}",
        item.name, order.payment_link
    )
}

fn order_confirmation(order: &Order) -> String {
    format!(
        "已為您建立訂單，請前往以下連結完成付款：{}",
        order.payment_link
    )
}
