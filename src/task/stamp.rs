//! Evidence stamps
//!
//! A stamp records the evidential trail of a sentence: which pieces of input
//! evidence contributed to it, when it was created, and when the statement
//! occurs. Overlapping evidential bases signal circular inference; the rule
//! tables consult the overlap flag through the derivation context.

use std::fmt;

/// A unique piece of evidence: (reasoner id, monotonic counter)
pub type StampSerial = (u64, u64);

/// Upper bound on the evidential base length; older evidence falls off the
/// end of the interleaved merge.
pub const MAX_EVIDENTIAL_BASE: usize = 20;

/// When the statement of a sentence holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occurrence {
    /// Timeless truth
    Eternal,

    /// Truth at a specific cycle
    At(i64),
}

/// Evidence-trail metadata attached to every sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stamp {
    /// The serial issued when this stamp was created
    serial: StampSerial,

    /// Evidential base, most recent first
    evidential_base: Vec<StampSerial>,

    /// Cycle at which the stamp was created
    creation_time: i64,

    /// When the statement occurs
    occurrence: Occurrence,
}

impl Stamp {
    /// Create a stamp for fresh input evidence
    pub fn new(serial: StampSerial, creation_time: i64, occurrence: Occurrence) -> Self {
        Stamp {
            serial,
            evidential_base: vec![serial],
            creation_time,
            occurrence,
        }
    }

    /// Zipper-merge two parent stamps for a two-premise derivation. The
    /// base interleaves both parents, most recent first, truncated to
    /// [`MAX_EVIDENTIAL_BASE`]; occurrence follows the first (task) parent.
    pub fn merge(a: &Stamp, b: &Stamp, creation_time: i64) -> Self {
        let mut base = Vec::with_capacity(
            (a.evidential_base.len() + b.evidential_base.len()).min(MAX_EVIDENTIAL_BASE),
        );
        let mut left = a.evidential_base.iter();
        let mut right = b.evidential_base.iter();
        loop {
            let (l, r) = (left.next(), right.next());
            if l.is_none() && r.is_none() {
                break;
            }
            for s in [l, r].into_iter().flatten() {
                if base.len() < MAX_EVIDENTIAL_BASE && !base.contains(s) {
                    base.push(*s);
                }
            }
        }
        Stamp {
            serial: a.serial,
            evidential_base: base,
            creation_time,
            occurrence: a.occurrence,
        }
    }

    /// Copy of this stamp with a new creation time, for single-premise use
    pub fn retimed(&self, creation_time: i64) -> Self {
        Stamp {
            creation_time,
            ..self.clone()
        }
    }

    /// Check whether two stamps share any evidence
    pub fn overlaps(&self, other: &Stamp) -> bool {
        self.evidential_base
            .iter()
            .any(|s| other.evidential_base.contains(s))
    }

    pub fn serial(&self) -> StampSerial {
        self.serial
    }

    pub fn evidential_base(&self) -> &[StampSerial] {
        &self.evidential_base
    }

    pub fn creation_time(&self) -> i64 {
        self.creation_time
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }

    pub fn is_eternal(&self) -> bool {
        matches!(self.occurrence, Occurrence::Eternal)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.creation_time)?;
        if let Occurrence::At(t) = self.occurrence {
            write!(f, "|{}", t)?;
        }
        write!(f, " :")?;
        for (_, counter) in &self.evidential_base {
            write!(f, " {}", counter)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(counter: u64) -> Stamp {
        Stamp::new((1, counter), 0, Occurrence::Eternal)
    }

    #[test]
    fn test_fresh_stamp() {
        let s = stamp(7);
        assert_eq!(s.serial(), (1, 7));
        assert_eq!(s.evidential_base(), &[(1, 7)]);
        assert!(s.is_eternal());
    }

    #[test]
    fn test_overlap() {
        let a = stamp(1);
        let b = stamp(2);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&a));

        let merged = Stamp::merge(&a, &b, 5);
        assert!(merged.overlaps(&a));
        assert!(merged.overlaps(&b));
    }

    #[test]
    fn test_merge_interleaves_and_dedups() {
        let a = stamp(1);
        let b = stamp(2);
        let ab = Stamp::merge(&a, &b, 1);
        assert_eq!(ab.evidential_base(), &[(1, 1), (1, 2)]);
        assert_eq!(ab.creation_time(), 1);

        // merging a parent back in must not duplicate evidence
        let aba = Stamp::merge(&ab, &a, 2);
        assert_eq!(aba.evidential_base(), &[(1, 1), (1, 2)]);
    }

    #[test]
    fn test_merge_bounded() {
        let mut acc = stamp(0);
        for i in 1..100u64 {
            acc = Stamp::merge(&acc, &stamp(i), i as i64);
        }
        assert!(acc.evidential_base().len() <= MAX_EVIDENTIAL_BASE);
    }

    #[test]
    fn test_retimed() {
        let s = Stamp::new((1, 3), 4, Occurrence::At(4));
        let r = s.retimed(9);
        assert_eq!(r.creation_time(), 9);
        assert_eq!(r.occurrence(), Occurrence::At(4));
        assert_eq!(r.evidential_base(), s.evidential_base());
    }
}
