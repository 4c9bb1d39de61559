// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-template handlers for membership events.
//!
//! Member-joined events get the welcome template. Follow events also
//! register the user with the persistence backend so later food records can
//! reference them; backend failures degrade to a welcome with an apology.

use bento_backend::NewUser;
use bento_core::types::{ReplyToken, UserId};
use bento_core::BentoError;
use bento_line::OutboundMessage;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;

const MEMBER_WELCOME: &str =
    "歡迎加入！我是您的健康飲食助手。\n您可以傳送食物照片給我，我會幫您分析營養成分。";

const FOLLOW_WELCOME_DEGRADED: &str =
    "歡迎加入！很抱歉，目前無法建立您的用戶資料。請稍後再試。";

const DEFAULT_GOAL: &str = "Moderate";

fn follow_welcome(display_name: &str) -> String {
    format!(
        "Hi {display_name}！歡迎使用 Bento！\n\n您可以：\n1. 傳送食物照片給我分析營養成分\n2. 跟我聊天討論健康飲食相關問題\n\n讓我們一起邁向健康的生活！"
    )
}

/// Fallback display name derived from the tail of the LINE user id.
fn fallback_name(user_id: &UserId) -> String {
    let tail: String = user_id
        .0
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("LINEUser-{tail}")
}

impl Dispatcher {
    pub(crate) async fn handle_member_joined(
        &self,
        reply_token: &ReplyToken,
        joined: &[UserId],
    ) -> Result<(), BentoError> {
        info!(members = joined.len(), "members joined group");
        self.line
            .reply(reply_token, vec![OutboundMessage::text(MEMBER_WELCOME)])
            .await
    }

    /// Registers the follower with the backend, then welcomes them.
    pub(crate) async fn handle_follow(
        &self,
        reply_token: &ReplyToken,
        user_id: &UserId,
    ) -> Result<(), BentoError> {
        let display_name = match self.line.get_profile(user_id).await {
            Ok(profile) => profile.display_name,
            Err(e) => {
                warn!(error = %e, user_id = %user_id.0, "profile fetch failed on follow");
                fallback_name(user_id)
            }
        };

        let registered = self.register_user(user_id, &display_name).await;

        let welcome = if registered {
            follow_welcome(&display_name)
        } else {
            FOLLOW_WELCOME_DEGRADED.to_string()
        };
        self.line
            .reply(reply_token, vec![OutboundMessage::text(welcome)])
            .await
    }

    /// Ensures the user exists in the backend. Returns false when the
    /// backend could not be reached or refused the creation.
    async fn register_user(&self, user_id: &UserId, display_name: &str) -> bool {
        match self.backend.find_user_by_line_id(&user_id.0).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                let new_user = NewUser {
                    name: display_name.to_string(),
                    goal: DEFAULT_GOAL.to_string(),
                    line_user_id: user_id.0.clone(),
                };
                match self.backend.create_user(&new_user).await {
                    Ok(created) => {
                        info!(backend_id = created.id, "backend user created on follow");
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, "backend user creation failed");
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "backend user lookup failed on follow");
                false
            }
        }
    }
}
