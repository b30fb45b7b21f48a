//! Review pipeline transition rules.
//!
//! Agents move submitted files to `verifiee` or `a_completer`, directors
//! send verified files to IT (`en_attente_it`) or reject them, and IT closes
//! the case (`complete`) once the student account exists. `rejetee` and
//! `complete` are terminal.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::ApplicationStatus;

/// How the service treats transitions outside the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Reject any transition not listed in the table.
    #[default]
    Strict,
    /// Accept every transition; the table is advisory only.
    Permissive,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" | "advisory" => Ok(Self::Permissive),
            other => Err(other.to_string()),
        }
    }
}

impl ApplicationStatus {
    /// Next states reachable from this one.
    pub const fn allowed_next(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Draft => &[Submitted],
            Submitted => &[UnderReview, Verified, NeedsCompletion],
            UnderReview => &[Verified, NeedsCompletion],
            NeedsCompletion => &[UnderReview, Submitted],
            Verified => &[PendingIt, Approved, Rejected],
            Approved => &[Completed],
            PendingIt => &[Completed],
            Rejected | Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Completed)
    }
}

/// Outcome of checking a requested transition against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    Allowed,
    /// Outside the table but let through by a permissive policy.
    Tolerated,
    Refused,
}

impl TransitionPolicy {
    pub fn check(self, from: ApplicationStatus, to: ApplicationStatus) -> TransitionCheck {
        if from.can_transition_to(to) {
            TransitionCheck::Allowed
        } else if self == TransitionPolicy::Permissive {
            TransitionCheck::Tolerated
        } else {
            TransitionCheck::Refused
        }
    }
}
