//! Choices: the decision-source boundary.
//!
//! The engine produces a `ChoiceRequest` and blocks until the decision
//! source answers. Exactly one choice is outstanding at a time; the
//! engine re-asks on replies that violate the request's cardinality and
//! treats cancellation of a non-cancellable choice as an invalid reply.
//!
//! Two delivery modes ship with the engine:
//!
//! - `ScriptedSource`: an in-process queue of replies (tests, AI).
//! - `ChannelSource`: an mpsc rendezvous with a decision thread. The
//!   game thread sends the request and blocks on the reply channel; the
//!   decision thread receives requests from a `DecisionEndpoint`.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::abilities::TargetRef;
use crate::core::{ManaSymbol, ObjectId};

/// An action offered at a priority window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityAction {
    Pass,
    CastSpell(ObjectId),
    ActivateAbility(ObjectId, usize),
    ActivateManaAbility(ObjectId, usize),
    PlayLand(ObjectId),
}

/// One way to satisfy a single mana symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManaPaymentOption {
    /// Spend a symbol already in the pool.
    UseMana(ManaSymbol),
    /// Activate a mana ability first.
    ActivateManaAbility(ObjectId, usize),
}

/// One selectable item in a choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceItem {
    Priority(PriorityAction),
    ManaPayment(ManaPaymentOption),
    Object(ObjectId),
    Target(TargetRef),
}

/// A pending decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub title: String,
    pub items: Vec<ChoiceItem>,
    /// Minimum number of selections.
    pub min: usize,
    /// Maximum number of selections.
    pub max: usize,
    /// May the decision source cancel instead of answering?
    pub cancellable: bool,
}

impl ChoiceRequest {
    /// A pick-exactly-one request.
    #[must_use]
    pub fn pick_one(title: impl Into<String>, items: Vec<ChoiceItem>) -> Self {
        Self {
            title: title.into(),
            items,
            min: 1,
            max: 1,
            cancellable: false,
        }
    }

    /// Set selection bounds (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Allow cancellation (builder pattern).
    #[must_use]
    pub fn cancellable(mut self) -> Self {
        self.cancellable = true;
        self
    }

    /// Does a list of selected indices satisfy this request?
    #[must_use]
    pub fn accepts(&self, indices: &[usize]) -> bool {
        if indices.len() < self.min || indices.len() > self.max {
            return false;
        }
        if indices.iter().any(|&i| i >= self.items.len()) {
            return false;
        }
        // No duplicate selections.
        for (n, &i) in indices.iter().enumerate() {
            if indices[..n].contains(&i) {
                return false;
            }
        }
        true
    }
}

/// The decision source's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceReply {
    /// Indices into `ChoiceRequest::items`.
    Chosen(Vec<usize>),
    Cancelled,
}

/// The boundary the engine blocks on.
///
/// Implementations must eventually return; there is no timeout. The
/// engine validates every reply and re-asks until one is acceptable.
pub trait DecisionSource {
    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceReply;
}

/// A queue of pre-scripted replies.
///
/// Panics when a request arrives and the queue is empty: a test that
/// under-scripts its decisions is broken, not unlucky.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    replies: VecDeque<ChoiceReply>,
}

impl ScriptedSource {
    /// Create with a reply script.
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = ChoiceReply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }

    /// Append a reply.
    pub fn push(&mut self, reply: ChoiceReply) {
        self.replies.push_back(reply);
    }
}

impl DecisionSource for ScriptedSource {
    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceReply {
        self.replies
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for choice '{}'", request.title))
    }
}

/// Always selects the first `min` items (for a priority window, that is
/// "pass"). Never cancels.
#[derive(Debug, Default)]
pub struct PassiveSource;

impl DecisionSource for PassiveSource {
    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceReply {
        ChoiceReply::Chosen((0..request.min).collect())
    }
}

/// The game-thread half of a cross-thread choice rendezvous.
///
/// `choose` publishes the request and blocks until the decision thread
/// replies. A disconnected peer is a boundary-contract violation and
/// panics.
pub struct ChannelSource {
    requests: Sender<ChoiceRequest>,
    replies: Receiver<ChoiceReply>,
}

/// The decision-thread half of the rendezvous.
pub struct DecisionEndpoint {
    requests: Receiver<ChoiceRequest>,
    replies: Sender<ChoiceReply>,
}

impl ChannelSource {
    /// Create a connected source/endpoint pair.
    #[must_use]
    pub fn pair() -> (ChannelSource, DecisionEndpoint) {
        let (request_tx, request_rx) = channel();
        let (reply_tx, reply_rx) = channel();
        (
            ChannelSource {
                requests: request_tx,
                replies: reply_rx,
            },
            DecisionEndpoint {
                requests: request_rx,
                replies: reply_tx,
            },
        )
    }
}

impl DecisionSource for ChannelSource {
    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceReply {
        self.requests
            .send(request.clone())
            .expect("decision thread disconnected");
        self.replies.recv().expect("decision thread disconnected")
    }
}

impl DecisionEndpoint {
    /// Block until the engine publishes a choice.
    ///
    /// Returns `None` when the game has shut down.
    pub fn next_request(&self) -> Option<ChoiceRequest> {
        self.requests.recv().ok()
    }

    /// Answer the outstanding choice.
    pub fn reply(&self, reply: ChoiceReply) {
        self.replies.send(reply).expect("game thread disconnected");
    }
}
