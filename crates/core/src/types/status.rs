//! Status enums for cart lifecycle entities.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an abandoned-cart record.
///
/// Transitions are monotonic:
///
/// ```text
/// abandoned -> reminded -> { recovered | expired }
/// abandoned -> recovered
/// abandoned -> expired
/// ```
///
/// Once `recovered` or `expired`, no further reminder or recovery is
/// possible. The full transition set is encoded in
/// [`AbandonedCartStatus::can_transition_to`], a data-driven lookup used by
/// both the repository predicates and the maintenance tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AbandonedCartStatus {
    /// Cart detected idle past the abandonment threshold; no reminder sent yet.
    #[default]
    Abandoned,
    /// At least one recovery reminder has been delivered.
    Reminded,
    /// Customer completed an order via the recovery link. Terminal.
    Recovered,
    /// Cart aged out without recovery. Terminal.
    Expired,
}

impl AbandonedCartStatus {
    /// All states a record in `self` may legally move to.
    #[must_use]
    pub const fn allowed_transitions(&self) -> &'static [Self] {
        match self {
            Self::Abandoned => &[Self::Reminded, Self::Recovered, Self::Expired],
            Self::Reminded => &[Self::Reminded, Self::Recovered, Self::Expired],
            Self::Recovered | Self::Expired => &[],
        }
    }

    /// Whether a transition from `self` to `next` is legal.
    ///
    /// `Reminded -> Reminded` is allowed: each further reminder re-stamps the
    /// record without changing its phase.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Terminal states accept no further reminders or recovery.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Recovered | Self::Expired)
    }

    /// Whether a recovery token for a record in this state is still usable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Abandoned | Self::Reminded)
    }
}

impl std::fmt::Display for AbandonedCartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Abandoned => "abandoned",
            Self::Reminded => "reminded",
            Self::Recovered => "recovered",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AbandonedCartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abandoned" => Ok(Self::Abandoned),
            "reminded" => Ok(Self::Reminded),
            "recovered" => Ok(Self::Recovered),
            "expired" => Ok(Self::Expired),
            _ => Err(format!("invalid abandoned cart status: {s}")),
        }
    }
}
