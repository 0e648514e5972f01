//! Transaction status and its allowed transitions.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a transaction.
///
/// A transaction is created `Pending` at checkout and moves to `Completed`
/// once payment succeeds. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
}

impl TransactionStatus {
    /// Whether a record in this state may be moved to `next`.
    ///
    /// Staying in the same state is allowed (a no-op update).
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _) | (Self::Completed, Self::Completed)
        )
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid transaction status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        use TransactionStatus::{Completed, Pending};

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Pending));
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_completed_never_goes_back() {
        assert!(!TransactionStatus::Completed.can_transition_to(TransactionStatus::Pending));
    }

    #[test]
    fn test_string_forms_agree() {
        for status in [TransactionStatus::Pending, TransactionStatus::Completed] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
        assert!("paid".parse::<TransactionStatus>().is_err());
    }
}
