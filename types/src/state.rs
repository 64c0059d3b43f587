//! State enums for accounts, duels, tournaments, and withdrawals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// KYC verification state of an account.
///
/// Document collection happens in an external collaborator; only the
/// resulting gate matters here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationState {
    /// Account exists but has never submitted verification.
    Unverified,
    /// Verification submitted, awaiting review.
    Pending,
    /// Verified — eligible to play.
    Verified,
    /// Verification reviewed and rejected.
    Rejected,
}

impl VerificationState {
    /// Whether this state allows staking tickets in duels and tournaments.
    pub fn allows_play(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Platform role of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Player,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role may invoke privileged dispute/cancel operations.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// Lifecycle state of a duel.
///
/// `Waiting` survives for archived rows from the old readiness flow; the
/// current flow commits both stakes at join and goes straight to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelState {
    /// Created, stake escrowed from the creator, no opponent yet.
    Open,
    /// Opponent attached but play not started (legacy readiness phase).
    Waiting,
    /// Both stakes escrowed, clock running.
    Active,
    /// Conflicting declarations — awaiting admin review.
    Disputed,
    /// Settled with a winner; pot paid out.
    Completed,
    /// Time ran out without a resolution; stakes refunded.
    Expired,
    /// Cancelled before resolution; stakes refunded.
    Cancelled,
}

impl DuelState {
    /// Terminal states are retained as an audit record and never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Cancelled)
    }
}

impl fmt::Display for DuelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Disputed => "disputed",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A participant's self-reported outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Declaration {
    Victory,
    Defeat,
    Forfeit,
}

/// Which seat of a duel an account occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Creator,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Self {
        match self {
            Self::Creator => Self::Opponent,
            Self::Opponent => Self::Creator,
        }
    }
}

/// Lifecycle state of a tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TournamentState {
    /// Registrations open.
    Open,
    /// Bracket generated, matches in play.
    Ongoing,
    /// Champion decided, prize pool paid out.
    Completed,
    /// Cancelled; entry fees refunded.
    Cancelled,
}

impl TournamentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Lifecycle state of a withdrawal request.
///
/// Bank transfer is simulated — settling is a single idempotent transition,
/// not a payments integration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalState {
    /// Tickets debited, awaiting (simulated) transfer.
    Pending,
    /// Transfer recorded; tickets permanently converted.
    Settled,
    /// Rejected by an admin; tickets refunded.
    Rejected,
}

impl fmt::Display for WithdrawalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(DuelState::Completed.is_terminal());
        assert!(DuelState::Expired.is_terminal());
        assert!(DuelState::Cancelled.is_terminal());
        assert!(!DuelState::Open.is_terminal());
        assert!(!DuelState::Active.is_terminal());
        assert!(!DuelState::Disputed.is_terminal());
        assert!(!DuelState::Waiting.is_terminal());
    }

    #[test]
    fn only_verified_accounts_play() {
        assert!(VerificationState::Verified.allows_play());
        assert!(!VerificationState::Pending.allows_play());
        assert!(!VerificationState::Rejected.allows_play());
        assert!(!VerificationState::Unverified.allows_play());
    }

    #[test]
    fn side_other_flips() {
        assert_eq!(Side::Creator.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Creator);
    }
}
