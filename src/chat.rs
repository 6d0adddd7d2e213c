//! Per-counterpart chat threads with simulated replies.
//!
//! Each thread is stored under its own key and is independent of every other
//! thread. Sending appends the learner's message immediately and schedules a
//! canned reply on the tokio runtime. The reply is owned by a
//! [`PendingReply`]; dropping that handle aborts the reply unless it was
//! detached. A [`ChatSession`] keeps the handles of everything it sent, so
//! closing the view cancels replies still in flight.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{ChatMessage, Counterpart, Sender};
use crate::seed;
use crate::storage::{keys, Storage};

// Import logging macros
use crate::{log_service_error, log_service_success, log_service_warn, log_validation};

#[derive(Debug, Clone, Copy)]
pub struct ReplyDelays {
    pub tutor: Duration,
    pub buddy: Duration,
}

impl Default for ReplyDelays {
    fn default() -> Self {
        Self {
            tutor: Duration::from_millis(500),
            buddy: Duration::from_millis(600),
        }
    }
}

pub fn thread_key(counterpart: Counterpart) -> String {
    match counterpart {
        Counterpart::Tutor(id) => format!("{}{}", keys::TUTOR_THREAD_PREFIX, id),
        Counterpart::Buddy(id) => format!("{}{}", keys::BUDDY_THREAD_PREFIX, id),
    }
}

fn message(from: Sender, text: String, ts: i64) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4().to_string(),
        from,
        text,
        ts,
    }
}

fn seeded(id: &str, from: Sender, text: String, ts: i64) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        from,
        text,
        ts,
    }
}

/// Thread contents before anything was stored. Buddies start with a short
/// greeting exchange with fixed ids; tutor threads start empty.
fn initial_thread(counterpart: Counterpart) -> Vec<ChatMessage> {
    match counterpart {
        Counterpart::Buddy(id) => match seed::buddy(id) {
            Some(buddy) => {
                let now = Utc::now();
                vec![
                    seeded(
                        "t1",
                        Sender::Learner,
                        format!("Hey {}! Want to revise {} later?", buddy.name, buddy.subject),
                        (now - ChronoDuration::minutes(22 * 60)).timestamp_millis(),
                    ),
                    seeded(
                        "t2",
                        Sender::Counterpart,
                        "Sure! I'm free after 9pm.".to_string(),
                        (now - ChronoDuration::minutes(21 * 60 + 30)).timestamp_millis(),
                    ),
                ]
            }
            None => Vec::new(),
        },
        Counterpart::Tutor(_) => Vec::new(),
    }
}

/// Handle to a scheduled canned reply
#[must_use = "dropping a PendingReply cancels the reply"]
pub struct PendingReply {
    counterpart: Counterpart,
    handle: Option<JoinHandle<AppResult<ChatMessage>>>,
}

impl PendingReply {
    pub fn counterpart(&self) -> Counterpart {
        self.counterpart
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Let the reply land even after this handle is gone
    pub fn detach(mut self) {
        self.handle.take();
    }

    /// Wait for the reply. `None` when it was cancelled.
    pub async fn wait(mut self) -> AppResult<Option<ChatMessage>> {
        let Some(handle) = self.handle.take() else {
            return Ok(None);
        };
        match handle.await {
            Ok(result) => result.map(Some),
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(AppError::StorageError(anyhow::Error::from(e))),
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                log_service_warn!(
                    "chat",
                    "scheduled_reply",
                    format!("reply to {} cancelled", self.counterpart)
                );
            }
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct ChatThreadStore {
    storage: Storage,
    delays: ReplyDelays,
}

impl ChatThreadStore {
    pub fn new(storage: Storage, delays: ReplyDelays) -> Self {
        Self { storage, delays }
    }

    /// Canned reply text and its delay; unknown counterparts are rejected
    fn canned_reply(&self, counterpart: Counterpart) -> AppResult<(String, Duration)> {
        match counterpart {
            Counterpart::Tutor(id) => seed::tutor(id)
                .map(|t| {
                    (
                        format!("Thanks for reaching out! I can help with {}.", t.subject),
                        self.delays.tutor,
                    )
                })
                .ok_or_else(|| AppError::not_found("tutor", id)),
            Counterpart::Buddy(id) => seed::buddy(id)
                .map(|_| ("Got it 👍 See you later!".to_string(), self.delays.buddy))
                .ok_or_else(|| AppError::not_found("buddy", id)),
        }
    }

    pub async fn load(&self, counterpart: Counterpart) -> AppResult<Vec<ChatMessage>> {
        self.canned_reply(counterpart)?;
        let key = thread_key(counterpart);
        if let Some(thread) = self.storage.try_get(&key).await {
            return Ok(thread);
        }
        match counterpart {
            Counterpart::Tutor(_) => Ok(Vec::new()),
            // the greeting is stored on first view so its timestamps stay put
            Counterpart::Buddy(_) => {
                self.storage
                    .update(
                        &key,
                        || initial_thread(counterpart),
                        |thread: &mut Vec<ChatMessage>| Ok(thread.clone()),
                    )
                    .await
            }
        }
    }

    /// Append to the end of a thread and return the whole thread
    pub async fn append(
        &self,
        counterpart: Counterpart,
        message: ChatMessage,
    ) -> AppResult<Vec<ChatMessage>> {
        self.storage
            .update(
                &thread_key(counterpart),
                || initial_thread(counterpart),
                move |thread: &mut Vec<ChatMessage>| {
                    thread.push(message);
                    Ok(thread.clone())
                },
            )
            .await
    }

    /// Store the learner's message and schedule the counterpart's reply
    pub async fn send(
        &self,
        counterpart: Counterpart,
        text: &str,
    ) -> AppResult<(Vec<ChatMessage>, PendingReply)> {
        let text = text.trim();
        if text.is_empty() {
            log_validation!(failure, "chat_message", error = "empty message");
            return Err(AppError::validation("Message text is required"));
        }
        let (reply_text, delay) = self.canned_reply(counterpart)?;

        let now = Utc::now().timestamp_millis();
        let thread = self
            .append(counterpart, message(Sender::Learner, text.to_string(), now))
            .await?;
        log_service_success!("chat", "send", resource_id = counterpart, "message stored");

        let reply = message(
            Sender::Counterpart,
            reply_text,
            now + delay.as_millis() as i64,
        );
        let store = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let delivered = reply.clone();
            match store.append(counterpart, reply).await {
                Ok(_) => Ok(delivered),
                Err(e) => {
                    log_service_error!("chat", "scheduled_reply", resource_id = counterpart, error = e);
                    Err(e)
                }
            }
        });

        Ok((
            thread,
            PendingReply {
                counterpart,
                handle: Some(handle),
            },
        ))
    }
}

/// One open chat view: selected counterpart, its messages, the unsent draft
/// and the replies it is still waiting for.
pub struct ChatSession {
    store: ChatThreadStore,
    selected: Option<Counterpart>,
    messages: Vec<ChatMessage>,
    draft: String,
    pending: Vec<PendingReply>,
}

impl ChatSession {
    pub fn new(store: ChatThreadStore) -> Self {
        Self {
            store,
            selected: None,
            messages: Vec::new(),
            draft: String::new(),
            pending: Vec::new(),
        }
    }

    /// Switch threads: reload from storage and clear the draft
    pub async fn select(&mut self, counterpart: Counterpart) -> AppResult<&[ChatMessage]> {
        self.messages = self.store.load(counterpart).await?;
        self.selected = Some(counterpart);
        self.draft.clear();
        Ok(&self.messages)
    }

    pub fn selected(&self) -> Option<Counterpart> {
        self.selected
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub async fn send(&mut self) -> AppResult<&[ChatMessage]> {
        let counterpart = self
            .selected
            .ok_or_else(|| AppError::BadRequest("No conversation selected".to_string()))?;
        let (thread, reply) = self.store.send(counterpart, &self.draft).await?;
        self.messages = thread;
        self.draft.clear();
        self.pending.retain(|p| !p.is_finished());
        self.pending.push(reply);
        Ok(&self.messages)
    }

    /// Re-read the selected thread to pick up delivered replies
    pub async fn refresh(&mut self) -> AppResult<&[ChatMessage]> {
        if let Some(counterpart) = self.selected {
            self.messages = self.store.load(counterpart).await?;
        }
        Ok(&self.messages)
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.iter().filter(|p| !p.is_finished()).count()
    }

    /// Close the view, cancelling replies that have not arrived yet
    pub fn close(self) {}
}
