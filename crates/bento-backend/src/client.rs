// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the remote user/food persistence backend.
//!
//! Plain JSON CRUD over three routes: user lookup by LINE id, user
//! creation, and food record creation. No auth beyond network-level trust.

use std::time::Duration;

use bento_core::BentoError;
use tracing::debug;

use crate::types::{BackendUser, NewFoodRecord, NewUser};

/// HTTP client for the persistence backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BentoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BentoError::Persistence {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Looks up a user by LINE user id. Returns `None` when the backend
    /// knows no such user (empty result list or 404).
    pub async fn find_user_by_line_id(
        &self,
        line_user_id: &str,
    ) -> Result<Option<BackendUser>, BentoError> {
        let response = self
            .client
            .get(format!("{}/users/", self.base_url))
            .query(&[("line_user_id", line_user_id)])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BentoError::Persistence {
                message: format!("user lookup returned {status}: {body}"),
                source: None,
            });
        }

        let users: Vec<BackendUser> =
            response.json().await.map_err(|e| BentoError::Persistence {
                message: format!("failed to decode user lookup response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(users.into_iter().next())
    }

    /// Creates a new user record.
    pub async fn create_user(&self, user: &NewUser) -> Result<BackendUser, BentoError> {
        let response = self
            .client
            .post(format!("{}/users/", self.base_url))
            .json(user)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BentoError::Persistence {
                message: format!("user creation returned {status}: {body}"),
                source: None,
            });
        }

        let created: BackendUser =
            response.json().await.map_err(|e| BentoError::Persistence {
                message: format!("failed to decode created user: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(user_id = created.id, "backend user created");
        Ok(created)
    }

    /// Persists a confirmed food analysis.
    pub async fn create_food_record(&self, record: &NewFoodRecord) -> Result<(), BentoError> {
        let response = self
            .client
            .post(format!("{}/foods/", self.base_url))
            .json(record)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BentoError::Persistence {
                message: format!("food creation returned {status}: {body}"),
                source: None,
            });
        }
        debug!(user_id = record.user_id, "food record created");
        Ok(())
    }
}

fn request_error(e: reqwest::Error) -> BentoError {
    BentoError::Persistence {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
