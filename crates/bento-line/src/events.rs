// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook envelope parsing and event normalization.
//!
//! Maps the raw platform webhook payload into canonical [`InboundEvent`]s.
//! Unrecognized event or message subtypes are dropped silently. The original
//! array order is preserved: the platform issues one single-use reply token
//! per event and assumes at most one reply, so events must be processed
//! strictly in order, never concurrently.

use bento_core::types::{
    EventKind, EventSource, GroupId, InboundEvent, MessageId, ReplyToken, UserId,
};
use serde::Deserialize;
use tracing::debug;

/// Top-level webhook delivery body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One raw platform event, as delivered.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RawEvent {
    #[serde(rename_all = "camelCase")]
    Message {
        reply_token: String,
        source: RawSource,
        message: RawMessage,
    },
    #[serde(rename_all = "camelCase")]
    MemberJoined {
        reply_token: String,
        source: RawSource,
        joined: JoinedMembers,
    },
    #[serde(rename_all = "camelCase")]
    Follow {
        reply_token: String,
        source: RawSource,
    },
    /// Any event type this bot does not handle (unfollow, postback, ...).
    #[serde(other)]
    Unsupported,
}

/// The message payload of a message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RawMessage {
    Text { id: String, text: String },
    Image { id: String },
    /// Stickers, video, audio, location, ...
    #[serde(other)]
    Unsupported,
}

/// Where a raw event came from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RawSource {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
}

/// Member list attached to a member-joined event.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinedMembers {
    pub members: Vec<JoinedMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMember {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Normalizes a parsed webhook envelope into canonical events, preserving
/// the delivery order. Events the bot cannot handle are dropped.
pub fn normalize(envelope: WebhookEnvelope) -> Vec<InboundEvent> {
    envelope.events.into_iter().filter_map(normalize_event).collect()
}

fn normalize_event(raw: RawEvent) -> Option<InboundEvent> {
    match raw {
        RawEvent::Message {
            reply_token,
            source,
            message,
        } => {
            let source = normalize_source(source)?;
            let kind = match message {
                RawMessage::Text { text, .. } => EventKind::TextMessage { text },
                RawMessage::Image { id } => EventKind::ImageMessage {
                    message_id: MessageId(id),
                },
                RawMessage::Unsupported => {
                    debug!("dropping unsupported message subtype");
                    return None;
                }
            };
            Some(InboundEvent {
                kind,
                reply_token: ReplyToken(reply_token),
                source,
            })
        }
        RawEvent::MemberJoined {
            reply_token,
            source,
            joined,
        } => {
            let joined: Vec<UserId> = joined
                .members
                .into_iter()
                .filter_map(|m| m.user_id.map(UserId))
                .collect();
            // The member-joined source carries no sender id; attribute the
            // event to the first joined member.
            let group_id = match source {
                RawSource::Group { group_id, .. } => GroupId(group_id),
                RawSource::Room { room_id, .. } => GroupId(room_id),
                RawSource::User { .. } => {
                    debug!("dropping member-joined event with non-group source");
                    return None;
                }
            };
            let first = joined.first().cloned()?;
            Some(InboundEvent {
                kind: EventKind::MemberJoined { joined },
                reply_token: ReplyToken(reply_token),
                source: EventSource::Group {
                    group_id,
                    user_id: first,
                },
            })
        }
        RawEvent::Follow {
            reply_token,
            source,
        } => {
            let source = normalize_source(source)?;
            Some(InboundEvent {
                kind: EventKind::Follow,
                reply_token: ReplyToken(reply_token),
                source,
            })
        }
        RawEvent::Unsupported => {
            debug!("dropping unsupported event type");
            None
        }
    }
}

fn normalize_source(raw: RawSource) -> Option<EventSource> {
    match raw {
        RawSource::User { user_id } => Some(EventSource::Direct {
            user_id: UserId(user_id),
        }),
        RawSource::Group { group_id, user_id } => Some(EventSource::Group {
            group_id: GroupId(group_id),
            user_id: UserId(user_id?),
        }),
        // Rooms behave like groups for this bot.
        RawSource::Room { room_id, user_id } => Some(EventSource::Group {
            group_id: GroupId(room_id),
            user_id: UserId(user_id?),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WebhookEnvelope {
        serde_json::from_str(json).expect("envelope should parse")
    }

    #[test]
    fn text_message_from_direct_chat() {
        let envelope = parse(
            r#"{"destination":"bot","events":[
                {"type":"message","replyToken":"rt-1",
                 "source":{"type":"user","userId":"U1"},
                 "message":{"type":"text","id":"m1","text":"你好"}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            EventKind::TextMessage { text: "你好".into() }
        );
        assert_eq!(
            events[0].source,
            EventSource::Direct {
                user_id: UserId("U1".into())
            }
        );
        assert_eq!(events[0].reply_token, ReplyToken("rt-1".into()));
    }

    #[test]
    fn image_message_from_group() {
        let envelope = parse(
            r#"{"events":[
                {"type":"message","replyToken":"rt-2",
                 "source":{"type":"group","groupId":"G1","userId":"U2"},
                 "message":{"type":"image","id":"m2"}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert_eq!(
            events[0].kind,
            EventKind::ImageMessage {
                message_id: MessageId("m2".into())
            }
        );
        assert_eq!(
            events[0].source,
            EventSource::Group {
                group_id: GroupId("G1".into()),
                user_id: UserId("U2".into())
            }
        );
    }

    #[test]
    fn room_source_is_treated_as_group() {
        let envelope = parse(
            r#"{"events":[
                {"type":"message","replyToken":"rt",
                 "source":{"type":"room","roomId":"R1","userId":"U1"},
                 "message":{"type":"text","id":"m","text":"hi"}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert!(matches!(
            &events[0].source,
            EventSource::Group { group_id, .. } if group_id.0 == "R1"
        ));
    }

    #[test]
    fn member_joined_collects_member_ids() {
        let envelope = parse(
            r#"{"events":[
                {"type":"memberJoined","replyToken":"rt",
                 "source":{"type":"group","groupId":"G1"},
                 "joined":{"members":[
                    {"type":"user","userId":"U5"},
                    {"type":"user","userId":"U6"}
                 ]}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert_eq!(
            events[0].kind,
            EventKind::MemberJoined {
                joined: vec![UserId("U5".into()), UserId("U6".into())]
            }
        );
    }

    #[test]
    fn follow_event_normalizes() {
        let envelope = parse(
            r#"{"events":[
                {"type":"follow","replyToken":"rt",
                 "source":{"type":"user","userId":"U9"}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert_eq!(events[0].kind, EventKind::Follow);
    }

    #[test]
    fn unsupported_kinds_are_dropped_silently() {
        let envelope = parse(
            r#"{"events":[
                {"type":"unfollow","source":{"type":"user","userId":"U1"}},
                {"type":"message","replyToken":"rt",
                 "source":{"type":"user","userId":"U1"},
                 "message":{"type":"sticker","id":"m","packageId":"1","stickerId":"2"}},
                {"type":"message","replyToken":"rt-keep",
                 "source":{"type":"user","userId":"U1"},
                 "message":{"type":"text","id":"m","text":"kept"}}
            ]}"#,
        );
        let events = normalize(envelope);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reply_token, ReplyToken("rt-keep".into()));
    }

    #[test]
    fn order_is_preserved() {
        let envelope = parse(
            r#"{"events":[
                {"type":"message","replyToken":"a",
                 "source":{"type":"user","userId":"U1"},
                 "message":{"type":"text","id":"1","text":"first"}},
                {"type":"message","replyToken":"b",
                 "source":{"type":"user","userId":"U1"},
                 "message":{"type":"text","id":"2","text":"second"}}
            ]}"#,
        );
        let events = normalize(envelope);
        let tokens: Vec<&str> = events.iter().map(|e| e.reply_token.0.as_str()).collect();
        assert_eq!(tokens, vec!["a", "b"]);
    }

    #[test]
    fn group_message_without_sender_is_dropped() {
        let envelope = parse(
            r#"{"events":[
                {"type":"message","replyToken":"rt",
                 "source":{"type":"group","groupId":"G1"},
                 "message":{"type":"text","id":"m","text":"hi"}}
            ]}"#,
        );
        assert!(normalize(envelope).is_empty());
    }
}
