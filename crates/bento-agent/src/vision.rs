// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Food photo vision analysis.
//!
//! One completion call with the fixed nutritionist prompts and strict JSON
//! output, then a named classification of the narrative text into food /
//! non-food. A food result in a direct chat creates a pending analysis and
//! offers the save/discard quick reply; group results @-mention the sender.

use base64::Engine;
use bento_core::types::{EventSource, MessageId, PendingAnalysis, ReplyToken, UserId};
use bento_core::{BentoError, FoodAnalysis};
use bento_line::OutboundMessage;
use bento_openai::{ChatMessage, ChatRequest, ResponseFormat};
use tracing::{debug, error, warn};

use crate::dispatch::{Dispatcher, CONFIRM_PHRASE, REJECT_PHRASE};
use crate::prompts::{VISION_SYSTEM_PROMPT, VISION_USER_PROMPT};

const IMAGE_APOLOGY: &str = "抱歉，目前無法處理這張圖片。";
const ANALYZING_PROGRESS: &str = "正在辨識你的食物中，請稍候...✨";
const SAVE_PROMPT_SUFFIX: &str = "\n\n是否要儲存到您的紀錄？";
const ADD_FRIEND_SUFFIX: &str = "\n記得加入此帳號為好友以獲得最佳體驗：）";

/// Outcome of classifying an analysis narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodClassification {
    /// The narrative carries at least one nutrition figure.
    FoodResult,
    /// No figures: a refusal or a non-food image.
    NonFood,
}

/// Classifies the analyzer's narrative text.
///
/// Digit presence is the heuristic proxy for "a plausible nutrition figure
/// was found"; the vision prompt instructs the model to keep non-food
/// narratives digit-free.
pub fn classify_analysis(text: &str) -> FoodClassification {
    if text.chars().any(|c| c.is_ascii_digit()) {
        FoodClassification::FoodResult
    } else {
        FoodClassification::NonFood
    }
}

/// Parses the model's JSON output into a [`FoodAnalysis`].
///
/// Missing fields, malformed JSON, or negative macros are all parse errors;
/// they must surface as a user-facing apology, never a crash.
pub fn parse_analysis(content: &str) -> Result<FoodAnalysis, BentoError> {
    let analysis: FoodAnalysis = serde_json::from_str(content)
        .map_err(|e| BentoError::Parse(format!("model output is not valid analysis JSON: {e}")))?;

    let macros = [
        analysis.carbohydrates,
        analysis.protein,
        analysis.fat,
        analysis.calories,
    ];
    if macros.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(BentoError::Parse(
            "analysis macros must be non-negative numbers".to_string(),
        ));
    }

    Ok(analysis)
}

impl Dispatcher {
    pub(crate) async fn handle_image(
        &self,
        reply_token: &ReplyToken,
        source: &EventSource,
        message_id: &MessageId,
    ) -> Result<(), BentoError> {
        let bytes = self.line.get_message_content(message_id).await?;
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&bytes);

        match source {
            EventSource::Direct { user_id } => {
                self.direct_image(reply_token, user_id, image_base64).await
            }
            EventSource::Group { user_id, .. } => {
                self.group_image(reply_token, user_id, image_base64).await
            }
        }
    }

    async fn direct_image(
        &self,
        reply_token: &ReplyToken,
        user_id: &UserId,
        image_base64: String,
    ) -> Result<(), BentoError> {
        let analysis = match self.analyze_food(&image_base64).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "food analysis failed");
                return self
                    .line
                    .reply(reply_token, vec![OutboundMessage::text(IMAGE_APOLOGY)])
                    .await;
            }
        };

        match classify_analysis(&analysis.text) {
            FoodClassification::FoodResult => {
                let prompt = format!("{}{SAVE_PROMPT_SUFFIX}", analysis.text);
                self.sessions.put(
                    user_id,
                    PendingAnalysis {
                        analysis,
                        image_base64,
                    },
                );
                self.line
                    .reply(
                        reply_token,
                        vec![OutboundMessage::text_with_quick_replies(
                            prompt,
                            &[("是", CONFIRM_PHRASE), ("否", REJECT_PHRASE)],
                        )],
                    )
                    .await
            }
            FoodClassification::NonFood => {
                self.line
                    .reply(reply_token, vec![OutboundMessage::text(analysis.text)])
                    .await
            }
        }
    }

    /// Group variant. The profile fetch and the vision call are issued
    /// together and awaited jointly to hide latency.
    async fn group_image(
        &self,
        reply_token: &ReplyToken,
        user_id: &UserId,
        image_base64: String,
    ) -> Result<(), BentoError> {
        let (analysis_result, profile_result) = tokio::join!(
            self.analyze_food(&image_base64),
            self.line.get_profile(user_id)
        );

        match profile_result {
            Ok(profile) => {
                let analysis = match analysis_result {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        warn!(error = %e, "food analysis failed");
                        return self
                            .line
                            .reply(reply_token, vec![OutboundMessage::text(IMAGE_APOLOGY)])
                            .await;
                    }
                };
                self.line
                    .reply(
                        reply_token,
                        vec![
                            OutboundMessage::text(ANALYZING_PROGRESS),
                            OutboundMessage::mention(
                                &UserId(profile.user_id),
                                &analysis.text,
                            ),
                        ],
                    )
                    .await
            }
            Err(e) if e.is_not_found() => {
                // Sender has not added the bot: degrade to a plain reply
                // with an invitation.
                debug!(user_id = %user_id.0, "profile not found, replying without mention");
                let analysis = match analysis_result {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        warn!(error = %e, "food analysis failed");
                        return self
                            .line
                            .reply(reply_token, vec![OutboundMessage::text(IMAGE_APOLOGY)])
                            .await;
                    }
                };
                self.line
                    .reply(
                        reply_token,
                        vec![OutboundMessage::text(format!(
                            "{}{ADD_FRIEND_SUFFIX}",
                            analysis.text
                        ))],
                    )
                    .await
            }
            Err(e) => {
                // Any other profile failure is fatal for this event: no reply.
                error!(error = %e, user_id = %user_id.0, "profile lookup failed");
                Err(e)
            }
        }
    }

    /// One vision completion with strict JSON output.
    async fn analyze_food(&self, image_base64: &str) -> Result<FoodAnalysis, BentoError> {
        let request = ChatRequest {
            model: self.settings.vision_model.clone(),
            messages: vec![
                ChatMessage::system(VISION_SYSTEM_PROMPT),
                ChatMessage::user_with_image(VISION_USER_PROMPT, image_base64),
            ],
            temperature: Some(0.2),
            max_tokens: Some(self.settings.max_tokens),
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self.llm.chat(request).await?;
        let content = response
            .first_content()
            .ok_or_else(|| BentoError::Parse("completion carried no content".to_string()))?;
        parse_analysis(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bento_core::session::{MemorySessionStore, SessionStore};
    use bento_core::types::{EventKind, GroupId, InboundEvent};
    use bento_line::client::Profile;
    use crate::dispatch::AgentSettings;
    use crate::testing::{FakeBackend, ProfileBehavior, RecordingLine, ScriptedCompletions};

    const FOOD_JSON: &str = r#"{"text":"一份雞腿便當，蛋白質約 32 克","carbohydrates":75.0,"protein":32.0,"fat":28.0,"calories":690.0}"#;
    const NON_FOOD_JSON: &str = r#"{"text":"這張照片看起來不是食物","carbohydrates":0.0,"protein":0.0,"fat":0.0,"calories":0.0}"#;

    #[test]
    fn classification_digit_heuristic() {
        assert_eq!(
            classify_analysis("this contains 12.5g protein"),
            FoodClassification::FoodResult
        );
        assert_eq!(
            classify_analysis("not food detected"),
            FoodClassification::NonFood
        );
        assert_eq!(
            classify_analysis("這不是食物"),
            FoodClassification::NonFood
        );
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(matches!(
            parse_analysis("我不知道"),
            Err(BentoError::Parse(_))
        ));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert!(parse_analysis(r#"{"text":"x","protein":1.0}"#).is_err());
    }

    #[test]
    fn parse_rejects_negative_macros() {
        let json = r#"{"text":"x","carbohydrates":-1.0,"protein":0.0,"fat":0.0,"calories":0.0}"#;
        assert!(parse_analysis(json).is_err());
    }

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
        sessions: Arc<MemorySessionStore>,
        dispatcher: Dispatcher,
    }

    fn harness(line: RecordingLine, llm: ScriptedCompletions) -> Harness {
        let line = Arc::new(line);
        let sessions = Arc::new(MemorySessionStore::default());
        let dispatcher = Dispatcher::new(
            line.clone(),
            Arc::new(llm),
            Arc::new(FakeBackend::new()),
            sessions.clone(),
            settings(),
        );
        Harness {
            line,
            sessions,
            dispatcher,
        }
    }

    fn direct_image() -> InboundEvent {
        InboundEvent {
            kind: EventKind::ImageMessage {
                message_id: MessageId("m1".into()),
            },
            reply_token: ReplyToken("rt".into()),
            source: EventSource::Direct {
                user_id: UserId("U1".into()),
            },
        }
    }

    fn group_image() -> InboundEvent {
        InboundEvent {
            kind: EventKind::ImageMessage {
                message_id: MessageId("m1".into()),
            },
            reply_token: ReplyToken("rt".into()),
            source: EventSource::Group {
                group_id: GroupId("G1".into()),
                user_id: UserId("U1".into()),
            },
        }
    }

    #[tokio::test]
    async fn direct_food_result_stores_pending_and_offers_save() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![FOOD_JSON.to_string()]),
        );

        h.dispatcher.handle_event(direct_image()).await.unwrap();

        let stored = h.sessions.take(&UserId("U1".into())).expect("pending stored");
        assert_eq!(stored.analysis.protein, 32.0);

        let reply = h.line.last_reply().unwrap();
        let json = serde_json::to_value(&reply[0]).unwrap();
        assert!(json["text"].as_str().unwrap().contains("是否要儲存到您的紀錄？"));
        assert_eq!(json["quickReply"]["items"][0]["action"]["text"], "儲存這筆記錄");
        assert_eq!(json["quickReply"]["items"][1]["action"]["text"], "不用了");
    }

    #[tokio::test]
    async fn direct_non_food_replies_plainly_without_state() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec![NON_FOOD_JSON.to_string()]),
        );

        h.dispatcher.handle_event(direct_image()).await.unwrap();

        assert!(h.sessions.take(&UserId("U1".into())).is_none(), "no pending state");
        let reply = h.line.last_reply().unwrap();
        let json = serde_json::to_value(&reply[0]).unwrap();
        assert_eq!(json["text"], "這張照片看起來不是食物");
        assert!(json.get("quickReply").is_none());
    }

    #[tokio::test]
    async fn malformed_model_output_becomes_apology() {
        let h = harness(
            RecordingLine::new(),
            ScriptedCompletions::new(vec!["這不是 JSON".to_string()]),
        );

        h.dispatcher.handle_event(direct_image()).await.unwrap();

        assert_eq!(h.line.reply_texts(), vec![IMAGE_APOLOGY.to_string()]);
        assert!(h.sessions.take(&UserId("U1".into())).is_none());
    }

    #[tokio::test]
    async fn group_image_mentions_sender() {
        let line = RecordingLine::new().with_profile(ProfileBehavior::Found(Profile {
            user_id: "U1".into(),
            display_name: "小明".into(),
            picture_url: None,
            status_message: None,
        }));
        let h = harness(line, ScriptedCompletions::new(vec![FOOD_JSON.to_string()]));

        h.dispatcher.handle_event(group_image()).await.unwrap();

        let reply = h.line.last_reply().unwrap();
        assert_eq!(reply.len(), 2, "progress text plus mention");
        let mention = serde_json::to_value(&reply[1]).unwrap();
        assert_eq!(mention["type"], "textV2");
        assert_eq!(
            mention["substitution"]["user"]["mentionee"]["userId"],
            "U1"
        );
        // Group results never create pending state.
        assert!(h.sessions.take(&UserId("U1".into())).is_none());
    }

    #[tokio::test]
    async fn group_profile_not_found_degrades_gracefully() {
        let line = RecordingLine::new().with_profile(ProfileBehavior::NotFound);
        let h = harness(line, ScriptedCompletions::new(vec![FOOD_JSON.to_string()]));

        h.dispatcher.handle_event(group_image()).await.unwrap();

        let texts = h.line.reply_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("記得加入此帳號為好友"));
    }

    #[tokio::test]
    async fn group_profile_failure_is_fatal_with_no_reply() {
        let line = RecordingLine::new().with_profile(ProfileBehavior::Fail);
        let h = harness(line, ScriptedCompletions::new(vec![FOOD_JSON.to_string()]));

        let result = h.dispatcher.handle_event(group_image()).await;

        assert!(result.is_err());
        assert_eq!(h.line.outbound_count(), 0, "no reply on fatal profile failure");
    }
}
