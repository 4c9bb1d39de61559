// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch: routes each normalized inbound event to exactly one
//! handler based on its kind and conversational context.
//!
//! Text events run through a small per-user state machine: when an
//! unconfirmed food analysis is pending, the literal confirmation and
//! rejection phrases drive the save/discard paths; everything else goes to
//! the conversational responder. Phrase matching is exact and
//! case-sensitive, no fuzzy matching.

use std::sync::Arc;

use bento_backend::NewFoodRecord;
use bento_core::session::SessionStore;
use bento_core::types::{
    EventKind, EventSource, InboundEvent, PendingAnalysis, ReplyToken, UserId,
};
use bento_core::BentoError;
use bento_line::OutboundMessage;
use tracing::{debug, info, warn};

use crate::chat;
use crate::ports::{BackendApi, CompletionApi, LineApi};
use crate::travel::{is_travel_intent, TravelFlow};

/// Literal phrase the save quick-reply button sends.
pub const CONFIRM_PHRASE: &str = "儲存這筆記錄";

/// Literal phrase the discard quick-reply button sends.
pub const REJECT_PHRASE: &str = "不用了";

const SAVE_SUCCESS: &str = "已為您儲存此食物紀錄！";
const SAVE_FAILED: &str = "無法儲存此食物紀錄，請稍後再試。";
const NO_PENDING_DATA: &str = "抱歉，無法找到分析資料，請再試一次。";
const NO_BACKEND_ACCOUNT: &str = "抱歉，尚未建立用戶資料。請先加我為好友或重新嘗試。";
const DISCARD_ACK: &str = "好的，沒有儲存這筆資料。";

/// Model and behavior settings the dispatcher needs at runtime.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Substring required (case-insensitively) in group messages.
    pub group_trigger: String,
    pub chat_model: String,
    pub vision_model: String,
    pub travel_model: String,
    pub max_tokens: u32,
}

/// Routes inbound events to handlers. One instance serves the whole process.
pub struct Dispatcher {
    pub(crate) line: Arc<dyn LineApi>,
    pub(crate) llm: Arc<dyn CompletionApi>,
    pub(crate) backend: Arc<dyn BackendApi>,
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) settings: AgentSettings,
}

impl Dispatcher {
    pub fn new(
        line: Arc<dyn LineApi>,
        llm: Arc<dyn CompletionApi>,
        backend: Arc<dyn BackendApi>,
        sessions: Arc<dyn SessionStore>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            line,
            llm,
            backend,
            sessions,
            settings,
        }
    }

    /// Handles one normalized event. Errors are the caller's to log; one
    /// event's failure must not prevent processing of subsequent events.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<(), BentoError> {
        match event.kind {
            EventKind::TextMessage { text } => {
                self.handle_text(&event.reply_token, &event.source, &text)
                    .await
            }
            EventKind::ImageMessage { message_id } => {
                self.handle_image(&event.reply_token, &event.source, &message_id)
                    .await
            }
            EventKind::MemberJoined { joined } => {
                self.handle_member_joined(&event.reply_token, &joined).await
            }
            EventKind::Follow => {
                self.handle_follow(&event.reply_token, event.source.user_id())
                    .await
            }
        }
    }

    async fn handle_text(
        &self,
        reply_token: &ReplyToken,
        source: &EventSource,
        text: &str,
    ) -> Result<(), BentoError> {
        if let EventSource::Direct { user_id } = source {
            if text == CONFIRM_PHRASE {
                return self.save_pending(reply_token, user_id).await;
            }
            if text == REJECT_PHRASE {
                // Idempotent: discarding with no pending entry still acks.
                let _ = self.sessions.take(user_id);
                return self
                    .line
                    .reply(reply_token, vec![OutboundMessage::text(DISCARD_ACK)])
                    .await;
            }
        }

        if let EventSource::Group { group_id, .. } = source {
            let trigger = self.settings.group_trigger.to_lowercase();
            if !text.to_lowercase().contains(&trigger) {
                debug!(group_id = %group_id.0, "group message without trigger, ignoring");
                return Ok(());
            }
        }

        let reply_text = if is_travel_intent(text) {
            TravelFlow::new(
                self.llm.as_ref(),
                &self.settings.travel_model,
                self.settings.max_tokens,
            )
            .process(text)
            .await
        } else {
            chat::respond(
                self.llm.as_ref(),
                &self.settings.chat_model,
                self.settings.max_tokens,
                text,
            )
            .await
        };

        self.line
            .reply(reply_token, vec![OutboundMessage::text(reply_text)])
            .await
    }

    /// The save path: persist the pending analysis, then clear it. The
    /// entry is cleared only on the user's explicit decision; persistence
    /// failure puts it back so the user may retry.
    async fn save_pending(
        &self,
        reply_token: &ReplyToken,
        user_id: &UserId,
    ) -> Result<(), BentoError> {
        let Some(pending) = self.sessions.take(user_id) else {
            return self
                .line
                .reply(reply_token, vec![OutboundMessage::text(NO_PENDING_DATA)])
                .await;
        };

        let backend_user = match self.backend.find_user_by_line_id(&user_id.0).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.restore_pending(user_id, pending);
                return self
                    .line
                    .reply(reply_token, vec![OutboundMessage::text(NO_BACKEND_ACCOUNT)])
                    .await;
            }
            Err(e) => {
                warn!(error = %e, "backend user lookup failed");
                self.restore_pending(user_id, pending);
                return self
                    .line
                    .reply(reply_token, vec![OutboundMessage::text(SAVE_FAILED)])
                    .await;
            }
        };

        let record = NewFoodRecord {
            user_id: backend_user.id,
            food_analysis: pending.analysis.text.clone(),
            food_photo: pending.image_base64.clone(),
            protein: pending.analysis.protein,
            carb: pending.analysis.carbohydrates,
            fat: pending.analysis.fat,
            calories: pending.analysis.calories,
        };

        match self.backend.create_food_record(&record).await {
            Ok(()) => {
                info!(user_id = %user_id.0, "food record saved");
                self.line
                    .reply(reply_token, vec![OutboundMessage::text(SAVE_SUCCESS)])
                    .await
            }
            Err(e) => {
                warn!(error = %e, "food record creation failed");
                self.restore_pending(user_id, pending);
                self.line
                    .reply(reply_token, vec![OutboundMessage::text(SAVE_FAILED)])
                    .await
            }
        }
    }

    fn restore_pending(&self, user_id: &UserId, pending: PendingAnalysis) {
        self.sessions.put(user_id, pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_core::session::MemorySessionStore;
    use bento_core::types::{FoodAnalysis, GroupId};
    use crate::testing::{FakeBackend, RecordingLine, ScriptedCompletions};

    fn settings() -> AgentSettings {
        AgentSettings {
            group_trigger: "bento".into(),
            chat_model: "gpt-4o-2024-08-06".into(),
            vision_model: "gpt-4o".into(),
            travel_model: "gpt-4o-mini".into(),
            max_tokens: 512,
        }
    }

    struct Harness {
        line: Arc<RecordingLine>,
        llm: Arc<ScriptedCompletions>,
        backend: Arc<FakeBackend>,
        sessions: Arc<MemorySessionStore>,
        dispatcher: Dispatcher,
    }

    fn harness(line: RecordingLine, llm: ScriptedCompletions, backend: FakeBackend) -> Harness {
        let line = Arc::new(line);
        let llm = Arc::new(llm);
        let backend = Arc::new(backend);
        let sessions = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::new(
            line.clone(),
            llm.clone(),
            backend.clone(),
            sessions.clone(),
            settings(),
        );
        Harness {
            line,
            llm,
            backend,
            sessions,
            dispatcher,
        }
    }

    fn direct_text(text: &str) -> InboundEvent {
        InboundEvent {
            kind: EventKind::TextMessage { text: text.into() },
            reply_token: ReplyToken("rt".into()),
            source: EventSource::Direct {
                user_id: UserId("U1".into()),
            },
        }
    }

    fn group_text(text: &str) -> InboundEvent {
        InboundEvent {
            kind: EventKind::TextMessage { text: text.into() },
            reply_token: ReplyToken("rt".into()),
            source: EventSource::Group {
                group_id: GroupId("G1".into()),
                user_id: UserId("U1".into()),
            },
        }
    }

    fn pending(text: &str) -> PendingAnalysis {
        PendingAnalysis {
            analysis: FoodAnalysis {
                text: text.into(),
                carbohydrates: 62.0,
                protein: 18.0,
                fat: 21.0,
                calories: 540.0,
            },
            image_base64: "aW1n".into(),
        }
    }

    #[tokio::test]
    async fn confirmation_saves_and_clears_pending() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new().with_user("U1", 7, "小明"),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        h.dispatcher.handle_event(direct_text(CONFIRM_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![SAVE_SUCCESS.to_string()]);
        let records = h.backend.food_records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, 7);
        assert_eq!(records[0].carb, 62.0);
        drop(records);
        assert!(
            h.sessions.take(&UserId("U1".into())).is_none(),
            "entry cleared after save"
        );
    }

    #[tokio::test]
    async fn persistence_failure_preserves_pending() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new()
                .with_user("U1", 7, "小明")
                .failing_food_creation(),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        h.dispatcher.handle_event(direct_text(CONFIRM_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![SAVE_FAILED.to_string()]);
        assert!(
            h.sessions.take(&UserId("U1".into())).is_some(),
            "entry preserved so the user may retry"
        );
    }

    #[tokio::test]
    async fn missing_backend_account_preserves_pending() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        h.dispatcher.handle_event(direct_text(CONFIRM_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![NO_BACKEND_ACCOUNT.to_string()]);
        assert!(h.sessions.take(&UserId("U1".into())).is_some());
    }

    #[tokio::test]
    async fn confirmation_without_pending_apologizes() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );

        h.dispatcher.handle_event(direct_text(CONFIRM_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![NO_PENDING_DATA.to_string()]);
    }

    #[tokio::test]
    async fn rejection_clears_pending_and_acks() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        h.dispatcher.handle_event(direct_text(REJECT_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![DISCARD_ACK.to_string()]);
        assert!(h.sessions.take(&UserId("U1".into())).is_none());
    }

    #[tokio::test]
    async fn rejection_without_pending_is_idempotent() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );

        h.dispatcher.handle_event(direct_text(REJECT_PHRASE)).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![DISCARD_ACK.to_string()]);
    }

    #[tokio::test]
    async fn phrase_matching_is_exact() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec!["好的！".to_string()]),
            FakeBackend::new().with_user("U1", 7, "小明"),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        // A near-miss phrase routes to the conversational responder.
        h.dispatcher
            .handle_event(direct_text("儲存這筆記錄！"))
            .await
            .unwrap();

        assert_eq!(h.llm.calls(), 1);
        assert!(h.sessions.take(&UserId("U1".into())).is_some());
    }

    #[tokio::test]
    async fn free_text_routes_to_responder() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec!["蛋白質很重要。".to_string()]),
            FakeBackend::new(),
        );

        h.dispatcher
            .handle_event(direct_text("蛋白質要吃多少？"))
            .await
            .unwrap();

        assert_eq!(h.line.reply_texts(), vec!["蛋白質很重要。".to_string()]);
    }

    #[tokio::test]
    async fn travel_intent_routes_to_travel_flow() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );

        // Direct extraction short-circuit: no LLM call at all.
        h.dispatcher
            .handle_event(direct_text("想去潛水旅遊，預算 5 萬"))
            .await
            .unwrap();

        assert_eq!(h.llm.calls(), 0);
        let texts = h.line.reply_texts();
        assert!(texts[0].contains("小琉球潛水＋島語英語營"));
    }

    #[tokio::test]
    async fn group_message_without_trigger_is_ignored() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new(),
        );

        h.dispatcher
            .handle_event(group_text("大家午餐吃什麼？"))
            .await
            .unwrap();

        assert_eq!(h.line.outbound_count(), 0, "zero outbound calls");
        assert_eq!(h.llm.calls(), 0);
    }

    #[tokio::test]
    async fn group_message_with_trigger_gets_reply() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec!["我在！".to_string()]),
            FakeBackend::new(),
        );

        h.dispatcher
            .handle_event(group_text("Bento 在嗎？"))
            .await
            .unwrap();

        assert_eq!(h.line.reply_texts(), vec!["我在！".to_string()]);
    }

    #[tokio::test]
    async fn group_source_never_hits_save_path() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![]),
            FakeBackend::new().with_user("U1", 7, "小明"),
        );
        h.sessions.put(&UserId("U1".into()), pending("滷肉飯"));

        // The confirmation phrase in a group (without trigger) is ignored.
        h.dispatcher
            .handle_event(group_text(CONFIRM_PHRASE))
            .await
            .unwrap();

        assert_eq!(h.line.outbound_count(), 0);
        assert!(h.sessions.take(&UserId("U1".into())).is_some());
    }
}
