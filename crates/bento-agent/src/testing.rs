// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording fakes for the adapter seams.
//!
//! Used by this crate's unit tests and the binary's webhook integration
//! tests to observe outbound calls without any network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bento_backend::{BackendUser, NewFoodRecord, NewUser};
use bento_core::types::{MessageId, ReplyToken, UserId};
use bento_core::BentoError;
use bento_line::client::Profile;
use bento_line::messages::OutboundMessage;
use bento_openai::types::{ChatResponse, Choice, MessageContent, ResponseMessage};
use bento_openai::ChatRequest;

use crate::ports::{BackendApi, CompletionApi, LineApi};

/// How the fake platform answers profile lookups.
#[derive(Debug, Clone)]
pub enum ProfileBehavior {
    Found(Profile),
    NotFound,
    Fail,
}

/// A [`LineApi`] fake that records every outbound call.
pub struct RecordingLine {
    pub replies: Mutex<Vec<(String, Vec<OutboundMessage>)>>,
    pub pushes: Mutex<Vec<(String, Vec<OutboundMessage>)>>,
    profile: Mutex<ProfileBehavior>,
    content: Mutex<Vec<u8>>,
}

impl RecordingLine {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
            profile: Mutex::new(ProfileBehavior::Found(Profile {
                user_id: "U-test".into(),
                display_name: "測試使用者".into(),
                picture_url: None,
                status_message: None,
            })),
            content: Mutex::new(vec![0x89, 0x50, 0x4e, 0x47]),
        }
    }

    pub fn with_profile(self, behavior: ProfileBehavior) -> Self {
        *self.profile.lock().unwrap() = behavior;
        self
    }

    pub fn with_content(self, bytes: Vec<u8>) -> Self {
        *self.content.lock().unwrap() = bytes;
        self
    }

    /// Total number of outbound calls (replies + pushes).
    pub fn outbound_count(&self) -> usize {
        self.replies.lock().unwrap().len() + self.pushes.lock().unwrap().len()
    }

    /// Text content of every message in every recorded reply, in order.
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, messages)| messages.iter().map(message_text))
            .collect()
    }

    /// The messages of the most recent reply.
    pub fn last_reply(&self) -> Option<Vec<OutboundMessage>> {
        self.replies.lock().unwrap().last().map(|(_, m)| m.clone())
    }
}

impl Default for RecordingLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the display text of an outbound message.
pub fn message_text(message: &OutboundMessage) -> String {
    match message {
        OutboundMessage::Text { text, .. } => text.clone(),
        OutboundMessage::TextV2 { text, .. } => text.clone(),
    }
}

#[async_trait]
impl LineApi for RecordingLine {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), BentoError> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.0.clone(), messages));
        Ok(())
    }

    async fn push(&self, to: &str, messages: Vec<OutboundMessage>) -> Result<(), BentoError> {
        self.pushes.lock().unwrap().push((to.to_string(), messages));
        Ok(())
    }

    async fn get_profile(&self, _user_id: &UserId) -> Result<Profile, BentoError> {
        match &*self.profile.lock().unwrap() {
            ProfileBehavior::Found(profile) => Ok(profile.clone()),
            ProfileBehavior::NotFound => Err(BentoError::Platform {
                message: "profile not found".into(),
                status: Some(404),
                source: None,
            }),
            ProfileBehavior::Fail => Err(BentoError::Platform {
                message: "profile lookup failed".into(),
                status: Some(500),
                source: None,
            }),
        }
    }

    async fn get_message_content(&self, _message_id: &MessageId) -> Result<Vec<u8>, BentoError> {
        Ok(self.content.lock().unwrap().clone())
    }
}

/// A [`CompletionApi`] fake that plays back a fixed script of assistant
/// turns and records everything it was asked.
///
/// An exhausted script fails the call with a provider error.
pub struct ScriptedCompletions {
    script: Mutex<Vec<String>>,
    calls: AtomicUsize,
    observed: Mutex<Vec<String>>,
}

impl ScriptedCompletions {
    pub fn new(script: Vec<String>) -> Self {
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text content of every message observed across all requests.
    pub fn observed_messages(&self) -> Vec<String> {
        self.observed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for ScriptedCompletions {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BentoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut observed = self.observed.lock().unwrap();
        for message in &request.messages {
            match &message.content {
                MessageContent::Text(text) => observed.push(text.clone()),
                MessageContent::Parts(parts) => {
                    for part in parts {
                        if let bento_openai::types::ContentPart::Text { text } = part {
                            observed.push(text.clone());
                        }
                    }
                }
            }
        }
        drop(observed);

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(BentoError::Provider {
                message: "scripted completions exhausted".into(),
                source: None,
            });
        }
        let content = script.remove(0);
        Ok(ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some(content),
                },
            }],
        })
    }
}

/// A [`BackendApi`] fake with an in-memory user table.
pub struct FakeBackend {
    users: Mutex<HashMap<String, BackendUser>>,
    pub created_users: Mutex<Vec<NewUser>>,
    pub food_records: Mutex<Vec<NewFoodRecord>>,
    fail_food_creation: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            created_users: Mutex::new(Vec::new()),
            food_records: Mutex::new(Vec::new()),
            fail_food_creation: Mutex::new(false),
        }
    }

    pub fn with_user(self, line_user_id: &str, id: u64, name: &str) -> Self {
        self.users.lock().unwrap().insert(
            line_user_id.to_string(),
            BackendUser {
                id,
                name: name.to_string(),
                goal: Some("Moderate".into()),
                line_user_id: line_user_id.to_string(),
            },
        );
        self
    }

    pub fn failing_food_creation(self) -> Self {
        *self.fail_food_creation.lock().unwrap() = true;
        self
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn find_user_by_line_id(
        &self,
        line_user_id: &str,
    ) -> Result<Option<BackendUser>, BentoError> {
        Ok(self.users.lock().unwrap().get(line_user_id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<BackendUser, BentoError> {
        let created = BackendUser {
            id: 1 + self.users.lock().unwrap().len() as u64,
            name: user.name.clone(),
            goal: Some(user.goal.clone()),
            line_user_id: user.line_user_id.clone(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(user.line_user_id.clone(), created.clone());
        self.created_users.lock().unwrap().push(user.clone());
        Ok(created)
    }

    async fn create_food_record(&self, record: &NewFoodRecord) -> Result<(), BentoError> {
        if *self.fail_food_creation.lock().unwrap() {
            return Err(BentoError::Persistence {
                message: "food creation failed".into(),
                source: None,
            });
        }
        self.food_records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
