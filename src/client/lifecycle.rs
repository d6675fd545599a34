//! Request Lifecycle State Machine
//! Mission: One three-phase transition model for every remote call

use crate::errors::ErrorKind;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::warn;

/// Structured failure carried through `fail` transitions.
///
/// The `kind` tag is what the forced-logout cascade matches on; the
/// message is for display and logs only.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Client-side transport failure (connection refused, timeout, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn is_token_rejected(&self) -> bool {
        self.kind == ErrorKind::TokenRejected
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl std::error::Error for RemoteError {}

/// Lifecycle phase of one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Tracked state of one logical operation.
///
/// `data` survives `start` and `fail`, so a view can keep showing the
/// previous result while a refresh is in flight.
#[derive(Debug, Clone)]
pub struct RequestState<T> {
    pub status: RequestStatus,
    pub data: Option<T>,
    pub error: Option<RemoteError>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> RequestState<T> {
    fn start(&mut self) {
        self.status = RequestStatus::Pending;
        self.error = None;
    }

    /// Terminal transitions require a prior `start`; returns false when
    /// the transition was refused.
    fn succeed(&mut self, data: T) -> bool {
        if self.status == RequestStatus::Idle {
            return false;
        }
        self.status = RequestStatus::Succeeded;
        self.data = Some(data);
        self.error = None;
        true
    }

    fn fail(&mut self, error: RemoteError) -> bool {
        if self.status == RequestStatus::Idle {
            return false;
        }
        self.status = RequestStatus::Failed;
        self.error = Some(error);
        true
    }

    fn reset(&mut self) {
        self.status = RequestStatus::Idle;
        self.data = None;
        self.error = None;
    }
}

/// A shared slice tracking one logical operation ("list bugs",
/// "update user", ...), created once at store initialization.
///
/// Overlapping `start` calls are allowed; transitions land in
/// completion order and the last terminal transition wins. There is no
/// generation fencing — `Pending` already signals latest intent, and
/// callers never cancel.
pub struct Operation<T> {
    name: &'static str,
    state: Mutex<RequestState<T>>,
}

/// Type-erased view of an operation slice, so the store can sweep a
/// heterogeneous set of slices during the logout cascade.
pub trait OperationSlice {
    fn name(&self) -> &'static str;
    fn reset(&self);
}

impl<T: Clone> OperationSlice for Operation<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn reset(&self) {
        Operation::reset(self);
    }
}

impl<T: Clone> Operation<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(RequestState::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn start(&self) {
        self.state.lock().start();
    }

    pub fn succeed(&self, data: T) {
        if !self.state.lock().succeed(data) {
            warn!("Ignoring succeed on never-started operation '{}'", self.name);
        }
    }

    pub fn fail(&self, error: RemoteError) {
        if !self.state.lock().fail(error) {
            warn!("Ignoring fail on never-started operation '{}'", self.name);
        }
    }

    pub fn reset(&self) {
        self.state.lock().reset();
    }

    pub fn snapshot(&self) -> RequestState<T> {
        self.state.lock().clone()
    }
}
