//! Process-wide session state container.
//!
//! Holds "the current [`IdentitySession`] or the absence of one" behind
//! a defined lifecycle, and is the single source of truth consulted by
//! every guarded view. The store is shared by reference (`Arc`); it is
//! never an ambient singleton. Presentational consumers get the read
//! surface only — the write surface is used by the auth gateway and the
//! application bootstrap sequence.
//!
//! Mutations are atomic from a consumer's point of view: state is
//! swapped as a whole, so a torn session (roles without profile) is
//! never observable. An internal epoch counter orders asynchronous
//! outcomes: a login or session-fetch result that raced a logout
//! carries a stale epoch and is discarded instead of applied.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::identity::models::IdentitySession;

/// Lifecycle state of the current session.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// App just started; session unknown, no fetch issued yet
    Uninitialized,
    /// Initial session fetch in flight
    Loading,
    /// Provider confirmed a valid session
    Authenticated(Arc<IdentitySession>),
    /// No valid session (logged out, expired, or fetch failed)
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Settled means the store holds a definite answer; `Uninitialized`
    /// and `Loading` are not settled and guards defer on them.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}

/// Ticket handed out when a load/refresh starts; resolving with a stale
/// ticket is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct LoadTicket {
    epoch: u64,
}

struct Inner {
    state: SessionState,
    /// Refresh of an already-settled store in flight; the settled state
    /// stays visible until the refresh resolves
    refreshing: bool,
    /// Bumped by logout and session adoption; stale async outcomes are
    /// discarded against it
    epoch: u64,
}

/// Authoritative holder of the current session.
pub struct SessionStore {
    inner: RwLock<Inner>,
    version: watch::Sender<u64>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: RwLock::new(Inner {
                state: SessionState::Uninitialized,
                refreshing: false,
                epoch: 0,
            }),
            version,
        }
    }

    // -- read surface -------------------------------------------------

    /// Snapshot of the current state. The session payload is shared, so
    /// this is cheap.
    pub fn state(&self) -> SessionState {
        self.inner.read().state.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().state.is_authenticated()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.read().state.is_settled()
    }

    /// The current session, when authenticated.
    pub fn session(&self) -> Option<Arc<IdentitySession>> {
        match &self.inner.read().state {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Change notification channel. Subscribers re-read [`state`] when
    /// the version bumps; this is the revalidation signal for
    /// authorization-dependent views.
    ///
    /// [`state`]: Self::state
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    // -- write surface (gateway / bootstrap only) ---------------------

    /// Begin a session load or refresh.
    ///
    /// An uninitialized store transitions to `Loading`; a settled store
    /// keeps its state visible and only flags the refresh, so consumers
    /// never flash to anonymous while a re-validation is in flight.
    pub fn begin_load(&self) -> LoadTicket {
        let mut inner = self.inner.write();
        match inner.state {
            SessionState::Uninitialized => inner.state = SessionState::Loading,
            _ => inner.refreshing = true,
        }
        let ticket = LoadTicket { epoch: inner.epoch };
        drop(inner);
        self.bump();
        ticket
    }

    /// Resolve a load started with [`begin_load`]. Returns `false` when
    /// the ticket was superseded (logout or a newer login happened in
    /// the meantime) and the outcome was discarded.
    ///
    /// [`begin_load`]: Self::begin_load
    pub fn resolve_load(&self, ticket: LoadTicket, session: Option<IdentitySession>) -> bool {
        let mut inner = self.inner.write();
        if ticket.epoch != inner.epoch {
            return false;
        }
        inner.state = match session {
            Some(session) => SessionState::Authenticated(Arc::new(session)),
            None => SessionState::Anonymous,
        };
        inner.refreshing = false;
        drop(inner);
        self.bump();
        true
    }

    /// Current epoch, captured by the gateway before a login call.
    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    /// Install a freshly authenticated session, unless `epoch` is stale.
    ///
    /// Adoption bumps the epoch so any still-in-flight fetch started
    /// before the login resolves as superseded.
    pub fn adopt_if_current(&self, epoch: u64, session: IdentitySession) -> Option<Arc<IdentitySession>> {
        let mut inner = self.inner.write();
        if epoch != inner.epoch {
            return None;
        }
        let session = Arc::new(session);
        inner.state = SessionState::Authenticated(session.clone());
        inner.refreshing = false;
        inner.epoch += 1;
        drop(inner);
        self.bump();
        Some(session)
    }

    /// Drop to `Anonymous` unconditionally. Idempotent; also supersedes
    /// every in-flight load or login.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.state = SessionState::Anonymous;
        inner.refreshing = false;
        inner.epoch += 1;
        drop(inner);
        self.bump();
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
