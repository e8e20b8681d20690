//! Distance → bin mapping shared by the density model and the gravity term.

use crate::error::{ErgmError, Result};

/// Integer distance bin. Bin 0 is never produced.
pub type Bin = u32;

/// Quantizes distances into bins of fixed width `w`: `0 ↦ 1`, `d ↦ ⌈d / w⌉`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Discretizer {
    width: f64,
}

impl Discretizer {
    pub fn new(width: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(ErgmError::config(format!(
                "bin width must be finite and > 0, got {width}"
            )));
        }
        Ok(Self { width })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Bin of a non-negative distance. Saturates at `Bin::MAX` for huge distances.
    #[inline]
    pub fn discretize(&self, d: f64) -> Bin {
        if d == 0.0 {
            return 1;
        }
        // `as` saturates; the max(1) keeps tiny positive distances out of bin 0.
        ((d / self.width).ceil() as Bin).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_maps_to_one() {
        for w in [0.1, 1.0, 7.5, 1e6] {
            assert_eq!(Discretizer::new(w).unwrap().discretize(0.0), 1);
        }
    }

    #[test]
    fn ceil_semantics() {
        let disc = Discretizer::new(1.0).unwrap();
        assert_eq!(disc.discretize(10.0), 10);
        assert_eq!(disc.discretize(10.0001), 11);
        assert_eq!(disc.discretize(0.3), 1);
        let half = Discretizer::new(0.5).unwrap();
        assert_eq!(half.discretize(1.2), 3);
    }

    #[test]
    fn rejects_non_positive_width() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Discretizer::new(w),
                Err(ErgmError::InvalidConfig { .. })
            ));
        }
    }

    proptest! {
        #[test]
        fn monotone(w in 0.01f64..100.0, a in 0.0f64..1e5, b in 0.0f64..1e5) {
            let disc = Discretizer::new(w).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(disc.discretize(lo) <= disc.discretize(hi));
            prop_assert!(disc.discretize(lo) >= 1);
        }
    }
}
