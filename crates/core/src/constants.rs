//! Shared constants for doorman.
//!
//! Centralizes deadlines, delays and message templates used across crates.

/// Seconds a new member has to answer the challenge before removal.
pub const DEFAULT_WINDOW_SECS: i64 = 300;

/// Cap on the countdown re-scheduling delay; also how often the visible
/// caption is refreshed.
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 15;

/// Seconds the "verified" notice stays in the group before cleanup.
pub const DEFAULT_SUCCESS_NOTICE_TTL_SECS: i64 = 10;

/// Seconds a removed member is barred from rejoining.
pub const DEFAULT_REJOIN_BAN_SECS: i64 = 60;

/// Webhook updates older than this are dropped (stale redelivery).
pub const MAX_UPDATE_AGE_SECS: i64 = 3600;

/// Display names longer than this are truncated before rendering.
pub const MAX_DISPLAY_NAME_CHARS: usize = 10;

/// Placeholder substituted with the remaining seconds on every caption edit.
pub const SECONDS_PLACEHOLDER: &str = "{seconds}";

/// Challenge caption template. `{chat}` is filled once when the member
/// joins; `{seconds}` survives into the stored record and is re-rendered
/// on every countdown tick.
pub const JOIN_PROMPT_TEMPLATE: &str = "hello and welcome to {chat}! \
New members must verify: send the <b>four characters</b> shown above as a message.\n\
Until you pass, everything you post here is deleted.\n\
This challenge expires in {seconds} seconds. If you have not passed by then \
you will be removed from the group and unable to rejoin for one minute.";

/// Appended to the member's mention link on the success notice.
pub const VERIFIED_MSG: &str = "you passed verification, welcome!";

/// Callback answer shown to non-admins and to users without a pending record.
pub const ANSWER_NO_PERMISSION: &str = "No permission";

/// Callback answer when the challenge deadline has already passed.
pub const ANSWER_EXPIRED: &str = "Expired";

/// Callback answer after a successful challenge refresh.
pub const ANSWER_REFRESHED: &str = "Refreshed";
