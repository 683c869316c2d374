//! Conversation state and the submit flow that drives it.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error};

use crate::core::Completer;
use crate::reply::{FAILURE_REPLY, NO_RESULT_REPLY, ReplyEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
    pub correction: Option<String>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            correction: None,
        }
    }

    pub fn bot(text: impl Into<String>, correction: Option<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            correction,
        }
    }
}

impl From<ReplyEnvelope> for ConversationTurn {
    fn from(envelope: ReplyEnvelope) -> Self {
        // A correction is only worth showing when there is some text to show.
        let correction = envelope.correction.filter(|c| !c.trim().is_empty());
        ConversationTurn::bot(envelope.reply, correction)
    }
}

/// Ordered record of every turn. Turns can be added but never changed.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Where turns and the typing indicator end up.
pub trait View {
    /// Called once for every turn, in transcript order.
    fn show_turn(&mut self, turn: &ConversationTurn);

    fn set_busy(&mut self, busy: bool);
}

/// One chat session: the input buffer, the transcript and the busy flag.
///
/// `submit` borrows the session mutably, so a session never has two
/// requests in flight; further input waits its turn.
pub struct Session<C, V> {
    completer: C,
    view: V,
    input: String,
    transcript: Transcript,
    busy: bool,
}

impl<C: Completer, V: View> Session<C, V> {
    pub fn new(completer: C, view: V) -> Self {
        Self {
            completer,
            view,
            input: String::new(),
            transcript: Transcript::new(),
            busy: false,
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Send whatever is in the input buffer.
    ///
    /// Returns `false` without doing anything when the trimmed input is
    /// empty. Otherwise exactly one user turn and one bot turn are added.
    pub async fn submit(&mut self) -> bool {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return false;
        }

        self.input.clear();
        self.append(ConversationTurn::user(text.clone()));
        self.set_busy(true);

        let outcome = AssertUnwindSafe(self.completer.complete(&text))
            .catch_unwind()
            .await;

        self.set_busy(false);

        let turn = match outcome {
            Ok(Some(envelope)) => envelope.into(),
            Ok(None) => ConversationTurn::bot(NO_RESULT_REPLY, None),
            Err(_) => {
                error!("Completer panicked while answering");
                ConversationTurn::bot(FAILURE_REPLY, None)
            }
        };
        self.append(turn);

        true
    }

    fn append(&mut self, turn: ConversationTurn) {
        debug!(sender = ?turn.sender, "Appending turn");
        self.view.show_turn(&turn);
        self.transcript.push(turn);
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.view.set_busy(busy);
    }
}
