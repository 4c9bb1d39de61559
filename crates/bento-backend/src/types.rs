// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the persistence backend's JSON CRUD API.

use serde::{Deserialize, Serialize};

/// A user record as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    pub line_user_id: String,
}

/// Body for creating a new user.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub goal: String,
    pub line_user_id: String,
}

/// Body for creating a food record from a confirmed analysis.
#[derive(Debug, Clone, Serialize)]
pub struct NewFoodRecord {
    pub user_id: u64,
    pub food_analysis: String,
    /// Base64-encoded photo.
    pub food_photo: String,
    pub protein: f64,
    pub carb: f64,
    pub fat: f64,
    pub calories: f64,
}
