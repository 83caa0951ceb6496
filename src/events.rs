use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::extract::StrategyYield;

/// Something that happened during one resolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    PagesDiscovered {
        via: &'static str,
        found: usize,
        selected: usize,
    },
    UnitCompleted {
        locator: String,
        records: usize,
        strategies: Vec<StrategyYield>,
    },
    UnitFailed {
        locator: String,
        error: String,
    },
    ModelFallback {
        locator: String,
        found: usize,
        suggested: usize,
    },
    ProfileVerified {
        identity_key: String,
    },
    RoleDiscrepancy {
        identity_key: String,
        primary_role: String,
        observed_role: String,
    },
    DocumentOnlyAdded {
        identity_key: String,
    },
    ScopeFiltered {
        before: usize,
        after: usize,
    },
    Finished {
        profiles: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Request-scoped event trail. Each entry is also emitted through `tracing`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<ResolutionEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn record(&mut self, kind: EventKind) {
        emit(&kind);
        self.events.push(ResolutionEvent {
            at: Utc::now(),
            kind,
        });
    }

    pub fn events(&self) -> &[ResolutionEvent] {
        &self.events
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EventKind> {
        self.events.iter().map(|e| &e.kind)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Move another log's events onto the end of this one.
    pub fn absorb(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}

fn emit(kind: &EventKind) {
    match kind {
        EventKind::PagesDiscovered { via, found, selected } => {
            info!(via, found, selected, "leadership pages discovered")
        }
        EventKind::UnitCompleted { locator, records, .. } => {
            info!(%locator, records, "extraction unit completed")
        }
        EventKind::UnitFailed { locator, error } => {
            warn!(%locator, %error, "extraction unit failed")
        }
        EventKind::ModelFallback { locator, found, suggested } => {
            info!(%locator, found, suggested, "model fallback used")
        }
        EventKind::ProfileVerified { identity_key } => {
            debug!(%identity_key, "profile verified by document")
        }
        EventKind::RoleDiscrepancy {
            identity_key,
            primary_role,
            observed_role,
        } => info!(%identity_key, %primary_role, %observed_role, "role discrepancy, primary kept"),
        EventKind::DocumentOnlyAdded { identity_key } => {
            debug!(%identity_key, "document-only profile added")
        }
        EventKind::ScopeFiltered { before, after } => {
            info!(before, after, "global scope filter applied")
        }
        EventKind::Finished { profiles } => info!(profiles, "resolution finished"),
    }
}
