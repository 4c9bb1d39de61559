// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Travel booking sub-flow: catalog, criteria extraction, and the
//! bounded tool-use loop.

pub mod catalog;
pub mod extract;
pub mod flow;

pub use catalog::{search, CatalogItem, TravelCriteria, CATALOG};
pub use extract::extract_criteria;
pub use flow::{create_order, is_travel_intent, Order, TravelFlow};
