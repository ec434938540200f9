//! Integer domains.

/// Inclusive integer interval `[lb, ub]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Domain {
    lb: i64,
    ub: i64,
}

impl Domain {
    /// Returns `None` for an empty interval.
    #[must_use]
    pub const fn new(lb: i64, ub: i64) -> Option<Self> {
        if lb > ub { None } else { Some(Self { lb, ub }) }
    }

    /// Smallest value.
    #[must_use]
    pub const fn lb(self) -> i64 {
        self.lb
    }

    /// Largest value.
    #[must_use]
    pub const fn ub(self) -> i64 {
        self.ub
    }

    /// Number of values in the domain.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub const fn size(self) -> usize {
        (self.ub - self.lb) as usize + 1
    }

    /// True if `v` lies in the interval.
    #[must_use]
    pub const fn contains(self, v: i64) -> bool {
        self.lb <= v && v <= self.ub
    }

    /// Every value, in increasing order.
    pub fn values(self) -> impl Iterator<Item = i64> {
        self.lb..=self.ub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain() {
        assert!(Domain::new(3, 2).is_none());
        let d = Domain::new(-1, 2).unwrap();
        assert_eq!(d.size(), 4);
        assert!(d.contains(-1));
        assert!(!d.contains(3));
        assert_eq!(d.values().collect::<Vec<_>>(), vec![-1, 0, 1, 2]);
    }
}
