//! Translation of Telegram updates into coordinator events.

use chrono::{DateTime, Utc};
use doorman_core::{CallbackAction, InboundEvent, MAX_UPDATE_AGE_SECS};
use serde::Deserialize;

/// Subset of the Telegram `Update` object doorman consumes.
#[derive(Debug, Default, Deserialize)]
pub struct Update {
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix timestamp.
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub new_chat_members: Option<Vec<User>>,
    pub left_chat_member: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
}

impl Chat {
    fn is_group(&self) -> bool {
        self.kind == "group" || self.kind == "supergroup"
    }
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub data: Option<String>,
    pub message: Option<Message>,
}

/// What one update amounts to.
#[derive(Debug, Default)]
pub(crate) struct Translation {
    pub events: Vec<InboundEvent>,
    /// Join/leave service messages to remove from the group.
    pub delete_messages: Vec<(i64, i64)>,
}

/// Translate one update. Pure; the caller applies the result.
pub(crate) fn translate(update: Update, now: DateTime<Utc>) -> Translation {
    let mut out = Translation::default();

    if let Some(callback) = update.callback_query {
        translate_callback(callback, &mut out);
        return out;
    }

    let Some(message) = update.message else {
        return out;
    };
    // Stale redeliveries (long webhook outage) are not worth acting on.
    if now.timestamp() - message.date > MAX_UPDATE_AGE_SECS {
        return out;
    }
    if !message.chat.is_group() {
        return out;
    }

    let chat_id = message.chat.id;

    if let Some(members) = message.new_chat_members {
        out.delete_messages.push((chat_id, message.message_id));
        let chat_title = message.chat.title.clone().unwrap_or_default();
        for member in members.into_iter().filter(|m| !m.is_bot) {
            out.events.push(InboundEvent::MemberJoined {
                chat_id,
                chat_title: chat_title.clone(),
                user_id: member.id,
                first_name: member.first_name,
                last_name: member.last_name,
            });
        }
        return out;
    }

    if let Some(left) = message.left_chat_member {
        out.delete_messages.push((chat_id, message.message_id));
        out.events.push(InboundEvent::MemberLeft { chat_id, user_id: left.id });
        return out;
    }

    // Any other group message is a candidate answer attempt; the
    // coordinator ignores it unless the sender has a pending record.
    if let Some(from) = message.from {
        out.events.push(InboundEvent::CandidateAnswer {
            chat_id,
            user_id: from.id,
            message_id: message.message_id,
            text: message.text.unwrap_or_default(),
        });
    }
    out
}

fn translate_callback(callback: CallbackQuery, out: &mut Translation) {
    let Some(message) = callback.message else {
        return;
    };
    if !message.chat.is_group() {
        return;
    }
    // Unknown callback data (stale buttons from older releases) is dropped
    // at the boundary; the coordinator only sees the closed action set.
    let Some(action) = callback.data.as_deref().and_then(|d| d.parse::<CallbackAction>().ok())
    else {
        return;
    };
    out.events.push(InboundEvent::Callback {
        chat_id: message.chat.id,
        message_id: message.message_id,
        actor_id: callback.from.id,
        callback_id: callback.id,
        action,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_chat() -> serde_json::Value {
        serde_json::json!({ "id": -100, "type": "supergroup", "title": "Rustaceans" })
    }

    fn parse(v: serde_json::Value) -> Update {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn join_update_yields_member_joined_and_service_delete() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 11,
                "date": now.timestamp(),
                "chat": group_chat(),
                "from": { "id": 1, "first_name": "Adder" },
                "new_chat_members": [
                    { "id": 42, "first_name": "Ada", "last_name": "L" },
                    { "id": 43, "first_name": "Bot", "is_bot": true }
                ]
            }
        }));

        let t = translate(update, now);
        assert_eq!(t.delete_messages, vec![(-100, 11)]);
        assert_eq!(t.events.len(), 1, "bot members are skipped");
        match &t.events[0] {
            InboundEvent::MemberJoined { chat_id, chat_title, user_id, first_name, last_name } => {
                assert_eq!((*chat_id, *user_id), (-100, 42));
                assert_eq!(chat_title, "Rustaceans");
                assert_eq!(first_name, "Ada");
                assert_eq!(last_name.as_deref(), Some("L"));
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn leave_update_yields_member_left() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 12,
                "date": now.timestamp(),
                "chat": group_chat(),
                "left_chat_member": { "id": 42, "first_name": "Ada" }
            }
        }));

        let t = translate(update, now);
        assert_eq!(t.delete_messages, vec![(-100, 12)]);
        assert!(matches!(
            t.events[0],
            InboundEvent::MemberLeft { chat_id: -100, user_id: 42 }
        ));
    }

    #[test]
    fn group_text_yields_candidate_answer() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 13,
                "date": now.timestamp(),
                "chat": group_chat(),
                "from": { "id": 42, "first_name": "Ada" },
                "text": "一马当先"
            }
        }));

        let t = translate(update, now);
        assert!(t.delete_messages.is_empty());
        match &t.events[0] {
            InboundEvent::CandidateAnswer { chat_id, user_id, message_id, text } => {
                assert_eq!((*chat_id, *user_id, *message_id), (-100, 42, 13));
                assert_eq!(text, "一马当先");
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn media_message_still_counts_as_answer_attempt() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 14,
                "date": now.timestamp(),
                "chat": group_chat(),
                "from": { "id": 42, "first_name": "Ada" }
            }
        }));

        let t = translate(update, now);
        assert!(matches!(
            &t.events[0],
            InboundEvent::CandidateAnswer { text, .. } if text.is_empty()
        ));
    }

    #[test]
    fn stale_update_is_dropped() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 15,
                "date": now.timestamp() - 7200,
                "chat": group_chat(),
                "from": { "id": 42, "first_name": "Ada" },
                "text": "late"
            }
        }));

        let t = translate(update, now);
        assert!(t.events.is_empty());
    }

    #[test]
    fn private_chat_is_ignored() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "message": {
                "message_id": 16,
                "date": now.timestamp(),
                "chat": { "id": 9, "type": "private" },
                "from": { "id": 42, "first_name": "Ada" },
                "text": "/help"
            }
        }));

        assert!(translate(update, now).events.is_empty());
    }

    #[test]
    fn callback_update_yields_callback_event() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "callback_query": {
                "id": "cb-9",
                "from": { "id": 99, "first_name": "Admin" },
                "data": "kick",
                "message": {
                    "message_id": 501,
                    "date": now.timestamp(),
                    "chat": group_chat()
                }
            }
        }));

        let t = translate(update, now);
        match &t.events[0] {
            InboundEvent::Callback { chat_id, message_id, actor_id, callback_id, action } => {
                assert_eq!((*chat_id, *message_id, *actor_id), (-100, 501, 99));
                assert_eq!(callback_id, "cb-9");
                assert_eq!(*action, CallbackAction::Kick);
            },
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_callback_data_is_dropped() {
        let now = Utc::now();
        let update = parse(serde_json::json!({
            "callback_query": {
                "id": "cb-10",
                "from": { "id": 99, "first_name": "Admin" },
                "data": "donate_alipay",
                "message": {
                    "message_id": 501,
                    "date": now.timestamp(),
                    "chat": group_chat()
                }
            }
        }));

        assert!(translate(update, now).events.is_empty());
    }

    #[test]
    fn empty_update_translates_to_nothing() {
        let t = translate(Update::default(), Utc::now());
        assert!(t.events.is_empty() && t.delete_messages.is_empty());
    }
}
