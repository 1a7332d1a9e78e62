/// Target status definitions for tracking contact discovery
///
/// A target starts out pending and leaves that state exactly once.
use std::fmt;

/// Represents the scrape status of a target's website
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetStatus {
    /// Waiting to be crawled (also the state of skipped targets)
    Pending,

    /// Crawl completed and at least one email was found
    SuccessWithEmail,

    /// Crawl completed but no email was found
    SuccessNoEmail,

    /// Crawl could not complete (base page fetch failed or deadline exceeded)
    Failed,
}

impl TargetStatus {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the crawl itself completed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SuccessWithEmail | Self::SuccessNoEmail)
    }

    /// Checks whether a status write from `self` to `next` is allowed
    ///
    /// Only `Pending -> terminal` transitions are permitted. Re-queueing a
    /// finished target requires an external reset.
    pub fn can_transition_to(&self, next: TargetStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SuccessWithEmail => "success_with_email",
            Self::SuccessNoEmail => "success_no_email",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success_with_email" => Some(Self::SuccessWithEmail),
            "success_no_email" => Some(Self::SuccessNoEmail),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::SuccessWithEmail,
            Self::SuccessNoEmail,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
