//! Three-valued selection status.
//!
//! `Inapplicable` is not a weak form of `Rejected`: it states that the
//! predicate could not be evaluated at all against the supplied data, and
//! every combinator propagates it unchanged.

/// Outcome of evaluating a cut.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    /// The data passes the cut.
    Accepted,
    /// The data fails the cut.
    Rejected,
    /// The cut could not be evaluated against the data.
    Inapplicable,
}

impl SelectionStatus {
    /// All three statuses, in declaration order.
    pub const ALL: [Self; 3] = [Self::Accepted, Self::Rejected, Self::Inapplicable];

    /// Map a boolean decision onto `Accepted` / `Rejected`.
    pub fn from_bool(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    /// The boolean decision, or `None` for `Inapplicable`.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Accepted => Some(true),
            Self::Rejected => Some(false),
            Self::Inapplicable => None,
        }
    }

    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }

    pub fn is_rejected(self) -> bool {
        self == Self::Rejected
    }

    pub fn is_inapplicable(self) -> bool {
        self == Self::Inapplicable
    }

    /// Swap `Accepted` and `Rejected`; `Inapplicable` stays put.
    pub fn negate(self) -> Self {
        match self {
            Self::Accepted => Self::Rejected,
            Self::Rejected => Self::Accepted,
            Self::Inapplicable => Self::Inapplicable,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Inapplicable => "inapplicable",
        }
    }
}

impl std::fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accepted" | "accept" | "a" => Ok(Self::Accepted),
            "rejected" | "reject" | "r" => Ok(Self::Rejected),
            "inapplicable" | "i" => Ok(Self::Inapplicable),
            _ => Err(format!("unknown selection status: {s}")),
        }
    }
}
