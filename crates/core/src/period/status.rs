//! Per-book period status state machine and posting guard.
//!
//! A period's status lives on the (book, fiscal period) pair. Transitions:
//!
//! ```text
//! OPEN ──close(soft)──> SOFT_CLOSED ──close(hard)──> HARD_CLOSED
//!   │                                                    ▲
//!   └──────────────────close(hard)───────────────────────┘
//! SOFT_CLOSED | HARD_CLOSED ──reopen──> OPEN
//! ```

use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// Status of a fiscal period within one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    /// Accepts ordinary postings. A missing status row means `Open`.
    #[default]
    Open,
    /// Only the close workflow may post.
    SoftClosed,
    /// Only the close workflow may post.
    HardClosed,
}

/// Target status of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseStatus {
    /// Soft close.
    SoftClosed,
    /// Hard close.
    HardClosed,
}

impl From<CloseStatus> for PeriodStatus {
    fn from(status: CloseStatus) -> Self {
        match status {
            CloseStatus::SoftClosed => Self::SoftClosed,
            CloseStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl CloseStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SoftClosed => "SOFT_CLOSED",
            Self::HardClosed => "HARD_CLOSED",
        }
    }
}

impl std::fmt::Display for CloseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is posting.
///
/// The close workflow posts its generated journals into periods it is in the
/// middle of closing, so it is exempt from the closed-period guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingPrivilege {
    /// Users and integrations.
    Standard,
    /// The close/reopen workflow.
    CloseWorkflow,
}

impl PeriodStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::SoftClosed => "SOFT_CLOSED",
            Self::HardClosed => "HARD_CLOSED",
        }
    }

    /// Returns true for either closed status.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Returns the status after closing to `target`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidTransition` for same-status closes and for
    /// HARD_CLOSED → SOFT_CLOSED.
    pub fn close(self, target: CloseStatus) -> Result<Self, PeriodError> {
        match (self, target) {
            (Self::Open, _) | (Self::SoftClosed, CloseStatus::HardClosed) => Ok(target.into()),
            (from, to) => Err(PeriodError::InvalidTransition {
                from,
                to: to.into(),
            }),
        }
    }

    /// Returns the status after a reopen.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidTransition` if the period is already open.
    pub fn reopen(self) -> Result<Self, PeriodError> {
        if self.is_closed() {
            Ok(Self::Open)
        } else {
            Err(PeriodError::InvalidTransition {
                from: self,
                to: Self::Open,
            })
        }
    }

    /// Returns true if a posting with `privilege` is allowed in this status.
    #[must_use]
    pub const fn can_post(self, privilege: PostingPrivilege) -> bool {
        matches!(
            (self, privilege),
            (Self::Open, _) | (_, PostingPrivilege::CloseWorkflow)
        )
    }

    /// Rejects postings that the status does not admit.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::PostingNotAllowed` for standard postings into a
    /// closed period.
    pub fn ensure_can_post(self, privilege: PostingPrivilege) -> Result<(), PeriodError> {
        if self.can_post(privilege) {
            Ok(())
        } else {
            Err(PeriodError::PostingNotAllowed { status: self })
        }
    }
}

impl std::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodStatus {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "SOFT_CLOSED" => Ok(Self::SoftClosed),
            "HARD_CLOSED" => Ok(Self::HardClosed),
            other => Err(PeriodError::UnknownStatus(other.to_string())),
        }
    }
}
