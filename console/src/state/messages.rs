//! Flash messages
//!
//! Adding a message also schedules its expiry: the reducer returns a delayed
//! `Hide` wrapped in a cancellable effect keyed by the message id. Hiding a
//! message early cancels that timer, so a message is removed at most once.

use chrono::{DateTime, Utc};
use gopypi_admin_core::{cancellable, delay, smallvec, Effect, EffectId, Reducer, SmallVec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Neutral notice
    Info,
    /// Something worked
    Success,
    /// Something needs attention
    Warning,
    /// Something failed
    Danger,
}

impl Level {
    /// Name used by the view layer for styling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Unique id, never reused
    pub id: String,
    /// Text shown to the operator
    pub text: String,
    /// Severity
    pub level: Level,
    /// When the message was raised
    pub created_at: DateTime<Utc>,
}

/// Messages on screen, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagesState {
    /// Visible messages; duplicates are allowed
    pub all: Vec<FlashMessage>,
}

/// Flash message mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageMutation {
    /// Show a message and schedule its expiry
    Add(FlashMessage),
    /// Remove the message with this id; unknown ids are ignored
    Hide(String),
}

/// Reducer for [`MessagesState`]; the environment is the time to live
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesReducer;

impl Reducer for MessagesReducer {
    type State = MessagesState;
    type Action = MessageMutation;
    type Environment = Duration;

    fn reduce(
        &self,
        state: &mut MessagesState,
        action: MessageMutation,
        ttl: &Duration,
    ) -> SmallVec<[Effect<MessageMutation>; 4]> {
        match action {
            MessageMutation::Add(message) => {
                let id = message.id.clone();
                state.all.push(message);

                smallvec![cancellable! {
                    id: id.clone(),
                    effect: delay! {
                        duration: *ttl,
                        action: MessageMutation::Hide(id)
                    }
                }]
            },
            MessageMutation::Hide(id) => {
                let before = state.all.len();
                state.all.retain(|message| message.id != id);

                if state.all.len() == before {
                    smallvec![Effect::None]
                } else {
                    smallvec![Effect::Cancel(EffectId::from(id))]
                }
            },
        }
    }
}
