use serde::{Deserialize, Serialize};

/// Logical delay queue a job belongs to. Both live in the same table;
/// the name keeps their consumers independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueName {
    /// Self-re-scheduling countdown ticks (one chain per pending record).
    Countdown,
    /// One-shot deferred deletion of platform messages.
    Cleanup,
}

impl QueueName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Countdown => "countdown",
            Self::Cleanup => "cleanup",
        }
    }
}

impl std::str::FromStr for QueueName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "countdown" => Ok(Self::Countdown),
            "cleanup" => Ok(Self::Cleanup),
            _ => Err(anyhow::anyhow!("Invalid queue name: {s}")),
        }
    }
}

/// Payload of a countdown tick. Carries identity only; the handler
/// re-derives everything else from the stored record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountdownJob {
    pub chat_id: i64,
    pub user_id: i64,
}

/// Payload of a deferred message deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CleanupJob {
    pub chat_id: i64,
    pub message_id: i64,
}
