use serde::{Deserialize, Serialize};

/// Action attached to an inline keyboard button on a challenge message.
///
/// Closed set: unknown callback data from stale messages is rejected at
/// parse time instead of falling through a string match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackAction {
    /// The candidate asks for a new challenge image.
    Refresh,
    /// An admin approves the member without an answer.
    PassThrough,
    /// An admin removes the member immediately.
    Kick,
}

impl CallbackAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Refresh => "refresh",
            Self::PassThrough => "pass_through",
            Self::Kick => "kick",
        }
    }
}

impl std::str::FromStr for CallbackAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refresh" => Ok(Self::Refresh),
            "pass_through" => Ok(Self::PassThrough),
            "kick" => Ok(Self::Kick),
            _ => Err(anyhow::anyhow!("Invalid callback action: {s}")),
        }
    }
}

/// One inbound event for the verification coordinator.
///
/// The ingress layer translates platform updates and queue deliveries into
/// these variants; the coordinator's dispatch over them is exhaustive.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    MemberJoined {
        chat_id: i64,
        chat_title: String,
        user_id: i64,
        first_name: String,
        last_name: Option<String>,
    },
    MemberLeft {
        chat_id: i64,
        user_id: i64,
    },
    /// A message posted in the group by a user with a pending record.
    CandidateAnswer {
        chat_id: i64,
        user_id: i64,
        message_id: i64,
        text: String,
    },
    CountdownTick {
        chat_id: i64,
        user_id: i64,
    },
    Callback {
        chat_id: i64,
        message_id: i64,
        actor_id: i64,
        callback_id: String,
        action: CallbackAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn callback_action_round_trips() {
        for action in [CallbackAction::Refresh, CallbackAction::PassThrough, CallbackAction::Kick] {
            assert_eq!(CallbackAction::from_str(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn callback_action_rejects_unknown() {
        assert!(CallbackAction::from_str("donate_wx").is_err());
        assert!(CallbackAction::from_str("").is_err());
    }
}
