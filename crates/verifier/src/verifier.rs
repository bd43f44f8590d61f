use std::sync::Arc;

use chrono::{Duration, Utc};
use doorman_captcha::ChallengeProvider;
use doorman_core::{
    mention_link, render_caption, CallbackAction, CleanupJob, CountdownJob, InboundEvent,
    PendingVerification, QueueName, VerifierConfig, ANSWER_EXPIRED, ANSWER_NO_PERMISSION,
    ANSWER_REFRESHED, JOIN_PROMPT_TEMPLATE, VERIFIED_MSG,
};
use doorman_storage::{DelayQueueStore, VerificationStore};
use doorman_telegram::{challenge_keyboard, ChatActuator};

use crate::error::VerifierError;

/// The verification lifecycle coordinator.
///
/// Drives the per-(chat, user) state machine NONE to PENDING to NONE. There
/// is no stored "verified" or "expired" state: termination is always record
/// deletion plus a side effect. The record store is the single source of
/// truth; platform effects are fire-and-forget.
pub struct Verifier {
    store: Arc<dyn VerificationStore>,
    queue: Arc<dyn DelayQueueStore>,
    chat: Arc<dyn ChatActuator>,
    captcha: Arc<dyn ChallengeProvider>,
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        queue: Arc<dyn DelayQueueStore>,
        chat: Arc<dyn ChatActuator>,
        captcha: Arc<dyn ChallengeProvider>,
        config: VerifierConfig,
    ) -> Self {
        Self { store, queue, chat, captcha, config }
    }

    /// Dispatch one inbound event.
    pub async fn handle(&self, event: InboundEvent) -> Result<(), VerifierError> {
        match event {
            InboundEvent::MemberJoined { chat_id, chat_title, user_id, first_name, last_name } => {
                self.on_member_joined(chat_id, &chat_title, user_id, &first_name, last_name.as_deref())
                    .await
            },
            InboundEvent::MemberLeft { chat_id, user_id } => {
                self.on_member_left(chat_id, user_id).await
            },
            InboundEvent::CandidateAnswer { chat_id, user_id, message_id, text } => {
                self.on_candidate_answer(chat_id, user_id, message_id, &text).await
            },
            InboundEvent::CountdownTick { chat_id, user_id } => {
                self.on_countdown_tick(chat_id, user_id).await
            },
            InboundEvent::Callback { chat_id, message_id, actor_id, callback_id, action } => {
                self.on_callback(chat_id, message_id, actor_id, &callback_id, action).await
            },
        }
    }

    /// A non-bot member joined: challenge them and start the countdown.
    pub async fn on_member_joined(
        &self,
        chat_id: i64,
        chat_title: &str,
        user_id: i64,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<(), VerifierError> {
        // A leftover record means the member left and rejoined without us
        // observing the leave. The new join supersedes it entirely.
        if let Some(stale) = self.store.get(chat_id, user_id).await? {
            tracing::info!(chat_id, user_id, "superseding stale verification record");
            self.try_delete_message(chat_id, stale.challenge_message_id).await;
        }

        let challenge = self.captcha.issue().await?;
        let display_name = mention_link(user_id, first_name, last_name);
        let prompt_template = JOIN_PROMPT_TEMPLATE.replace("{chat}", chat_title);
        let caption = render_caption(&display_name, &prompt_template, self.config.window_secs);

        let challenge_message_id = match self
            .chat
            .send_photo(chat_id, challenge.image, &caption, &challenge_keyboard())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                // Without a posted challenge there is nothing to verify
                // against; abandon the join rather than create a record the
                // member cannot see.
                tracing::warn!(chat_id, user_id, error = %e, "posting challenge failed, join not tracked");
                return Ok(());
            },
        };

        let record = PendingVerification {
            chat_id,
            user_id,
            challenge_secret: challenge.secret,
            challenge_message_id,
            expires_at: Utc::now() + Duration::seconds(self.config.window_secs),
            display_name,
            prompt_template,
        };
        self.store.create(&record).await?;

        self.schedule_tick(chat_id, user_id, self.config.tick_delay(self.config.window_secs))
            .await;
        Ok(())
    }

    /// A pending member left on their own: tear the challenge down.
    pub async fn on_member_left(&self, chat_id: i64, user_id: i64) -> Result<(), VerifierError> {
        let Some(record) = self.store.get(chat_id, user_id).await? else {
            return Ok(());
        };
        self.try_delete_message(chat_id, record.challenge_message_id).await;
        self.store.delete(chat_id, user_id).await?;
        Ok(())
    }

    /// A message from a member with an outstanding challenge.
    ///
    /// The challenge channel stays clean: the candidate's message is always
    /// deleted, right or wrong. A wrong answer changes nothing else.
    pub async fn on_candidate_answer(
        &self,
        chat_id: i64,
        user_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), VerifierError> {
        let Some(record) = self.store.get(chat_id, user_id).await? else {
            return Ok(());
        };
        self.try_delete_message(chat_id, message_id).await;
        if self.captcha.check(record.challenge_secret, text) {
            self.try_delete_message(chat_id, record.challenge_message_id).await;
            self.succeed(record).await?;
        }
        Ok(())
    }

    /// One tick of the countdown chain.
    ///
    /// Remaining time is re-derived from the stored deadline on every tick;
    /// the queue's own delay accounting is never trusted. An absent record
    /// means the chain lost a race with another resolution and simply ends.
    pub async fn on_countdown_tick(&self, chat_id: i64, user_id: i64) -> Result<(), VerifierError> {
        let Some(record) = self.store.get(chat_id, user_id).await? else {
            return Ok(());
        };

        if self.member_has_left(chat_id, user_id).await {
            self.try_delete_message(chat_id, record.challenge_message_id).await;
            self.store.delete(chat_id, user_id).await?;
            return Ok(());
        }

        let remaining = record.remaining_secs(Utc::now());
        if remaining <= 0 {
            self.try_delete_message(chat_id, record.challenge_message_id).await;
            self.try_ban(chat_id, user_id).await;
            self.store.delete(chat_id, user_id).await?;
            return Ok(());
        }

        let caption = record.caption(remaining);
        if let Err(e) = self
            .chat
            .edit_caption(chat_id, record.challenge_message_id, &caption, &challenge_keyboard())
            .await
        {
            tracing::warn!(chat_id, user_id, error = %e, "countdown caption edit failed");
        }
        self.schedule_tick(chat_id, user_id, self.config.tick_delay(remaining)).await;
        Ok(())
    }

    /// Deferred deletion of a platform message (cleanup queue consumer).
    pub async fn on_cleanup(&self, chat_id: i64, message_id: i64) {
        self.try_delete_message(chat_id, message_id).await;
    }

    /// An inline keyboard press on a challenge message.
    pub async fn on_callback(
        &self,
        chat_id: i64,
        message_id: i64,
        actor_id: i64,
        callback_id: &str,
        action: CallbackAction,
    ) -> Result<(), VerifierError> {
        match action {
            CallbackAction::Refresh => {
                self.refresh(chat_id, actor_id, callback_id).await
            },
            CallbackAction::Kick => {
                if !self.actor_is_admin(chat_id, actor_id).await {
                    self.try_answer(callback_id, ANSWER_NO_PERMISSION).await;
                    return Ok(());
                }
                let Some(record) = self.store.find_by_message(chat_id, message_id).await? else {
                    return Ok(());
                };
                self.try_delete_message(chat_id, record.challenge_message_id).await;
                self.try_ban(chat_id, record.user_id).await;
                self.store.delete(chat_id, record.user_id).await?;
                Ok(())
            },
            CallbackAction::PassThrough => {
                if !self.actor_is_admin(chat_id, actor_id).await {
                    self.try_answer(callback_id, ANSWER_NO_PERMISSION).await;
                    return Ok(());
                }
                let Some(record) = self.store.find_by_message(chat_id, message_id).await? else {
                    return Ok(());
                };
                self.try_delete_message(chat_id, record.challenge_message_id).await;
                self.succeed(record).await?;
                Ok(())
            },
        }
    }

    /// The candidate asked for a fresh challenge image.
    ///
    /// Only the secret changes: the deadline and the challenge message are
    /// kept, so refreshing can never buy more time.
    async fn refresh(
        &self,
        chat_id: i64,
        actor_id: i64,
        callback_id: &str,
    ) -> Result<(), VerifierError> {
        let Some(record) = self.store.get(chat_id, actor_id).await? else {
            self.try_answer(callback_id, ANSWER_NO_PERMISSION).await;
            return Ok(());
        };
        let now = Utc::now();
        if record.is_expired(now) {
            self.try_answer(callback_id, ANSWER_EXPIRED).await;
            return Ok(());
        }

        let challenge = self.captcha.issue().await?;
        self.store.update_challenge(chat_id, actor_id, challenge.secret).await?;

        let caption = record.caption(record.remaining_secs(now));
        if let Err(e) = self
            .chat
            .edit_photo(
                chat_id,
                record.challenge_message_id,
                challenge.image,
                &caption,
                &challenge_keyboard(),
            )
            .await
        {
            tracing::warn!(chat_id, actor_id, error = %e, "challenge photo edit failed");
        }
        self.try_answer(callback_id, ANSWER_REFRESHED).await;
        Ok(())
    }

    /// Shared success path for a correct answer and an admin pass-through:
    /// delete the record, post a confirmation, schedule its cleanup.
    async fn succeed(&self, record: PendingVerification) -> Result<(), VerifierError> {
        self.store.delete(record.chat_id, record.user_id).await?;
        let notice = format!("{} {VERIFIED_MSG}", record.display_name);
        match self.chat.send_message(record.chat_id, &notice).await {
            Ok(notice_id) => {
                let payload =
                    serde_json::json!(CleanupJob { chat_id: record.chat_id, message_id: notice_id });
                if let Err(e) = self
                    .queue
                    .enqueue(QueueName::Cleanup, &payload, self.config.success_notice_ttl_secs)
                    .await
                {
                    tracing::warn!(chat_id = record.chat_id, error = %e, "scheduling notice cleanup failed");
                }
            },
            Err(e) => {
                tracing::warn!(chat_id = record.chat_id, error = %e, "sending success notice failed");
            },
        }
        Ok(())
    }

    /// Re-enqueue the countdown. A failure here is logged and accepted: the
    /// deadline stops being enforced until another event touches the record.
    async fn schedule_tick(&self, chat_id: i64, user_id: i64, delay_secs: i64) {
        let payload = serde_json::json!(CountdownJob { chat_id, user_id });
        if let Err(e) = self.queue.enqueue(QueueName::Countdown, &payload, delay_secs).await {
            tracing::error!(chat_id, user_id, error = %e, "countdown re-enqueue failed; deadline unenforced");
        }
    }

    async fn member_has_left(&self, chat_id: i64, user_id: i64) -> bool {
        match self.chat.has_left(chat_id, user_id).await {
            Ok(left) => left,
            Err(e) => {
                tracing::warn!(chat_id, user_id, error = %e, "membership lookup failed, assuming present");
                false
            },
        }
    }

    /// Admin lookup failures deny the action: refusing a legitimate admin
    /// is recoverable, kicking on behalf of a non-admin is not.
    async fn actor_is_admin(&self, chat_id: i64, actor_id: i64) -> bool {
        match self.chat.is_admin(chat_id, actor_id).await {
            Ok(admin) => admin,
            Err(e) => {
                tracing::warn!(chat_id, actor_id, error = %e, "admin lookup failed, denying");
                false
            },
        }
    }

    async fn try_delete_message(&self, chat_id: i64, message_id: i64) {
        if let Err(e) = self.chat.delete_message(chat_id, message_id).await {
            tracing::warn!(chat_id, message_id, error = %e, "message delete failed");
        }
    }

    async fn try_ban(&self, chat_id: i64, user_id: i64) {
        let until = Utc::now() + Duration::seconds(self.config.rejoin_ban_secs);
        if let Err(e) = self.chat.ban_member(chat_id, user_id, until).await {
            tracing::warn!(chat_id, user_id, error = %e, "ban failed");
        }
    }

    async fn try_answer(&self, callback_id: &str, text: &str) {
        if let Err(e) = self.chat.answer_callback(callback_id, text).await {
            tracing::warn!(callback_id, error = %e, "callback answer failed");
        }
    }
}
