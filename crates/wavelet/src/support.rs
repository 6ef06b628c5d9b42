//! Support intervals of primal and dual basis functions.

use std::fmt;

use crate::error::WaveletError;
use crate::filter::{FilterBank, WaveletFamily};

/// Selects the primal (reconstruction) or dual (decomposition) function set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Which {
    /// Primal functions, used to rebuild a density from coefficients.
    Base,
    /// Dual functions, used to compute coefficients from samples.
    Dual,
}

/// Per-axis choice between the scaling and the wavelet function.
///
/// `Scaling` orders before `Wavelet`, so the all-scaling quadrant is the
/// first element of any sorted quadrant list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quad {
    /// Low-pass scaling function (phi).
    Scaling,
    /// High-pass wavelet function (psi).
    Wavelet,
}

impl Quad {
    /// `0` for scaling, `1` for wavelet.
    pub fn bit(&self) -> u8 {
        match self {
            Self::Scaling => 0,
            Self::Wavelet => 1,
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Open interval `(lower, upper)` outside of which a function vanishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Support {
    lower: f64,
    upper: f64,
}

impl Support {
    /// Creates a support interval.
    pub fn new(lower: f64, upper: f64) -> Self {
        debug_assert!(lower < upper);
        Self { lower, upper }
    }

    /// Lower end.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper end.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Strict membership: `lower < x < upper`.
    pub fn contains(&self, x: f64) -> bool {
        self.lower < x && x < self.upper
    }

    /// Support of `f(s·x − z)` when `self` is the support of `f`.
    pub fn transformed(&self, scale: f64, z: f64) -> Self {
        Self::new((self.lower + z) / scale, (self.upper + z) / scale)
    }
}

/// Integer supports of the four functions derived from a filter bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportInfo {
    base: [(i64, i64); 2],
    dual: [(i64, i64); 2],
}

impl SupportInfo {
    /// Integer support `(lower, upper)` of one function.
    pub fn get(&self, which: Which, quad: Quad) -> (i64, i64) {
        let pair = match which {
            Which::Base => &self.base,
            Which::Dual => &self.dual,
        };
        pair[quad.bit() as usize]
    }

    /// Same as [`get`](Self::get), as a [`Support`].
    pub fn support(&self, which: Which, quad: Quad) -> Support {
        let (a, b) = self.get(which, quad);
        Support::new(a as f64, b as f64)
    }
}

/// Computes the supports of phi and psi, primal and dual, from the family.
///
/// | Family | phi | psi |
/// |--------|-----|-----|
/// | Daubechies, Symlets | `(0, L−1)` | `(1−L/2, L/2)` |
/// | Coiflets | `(1−L/2, L/2)` | `(1−L/2, L/2)` |
/// | Biorthogonal `Nr.Nd` | primal `(−⌊Nr/2⌋, ⌊(Nr+1)/2⌋)`, dual `(−Nd−⌊Nr/2⌋+1, Nd+⌊(Nr−1)/2⌋)` | from both low-pass supports |
/// | Reverse biorthogonal | as biorthogonal with primal and dual swapped | |
///
/// # Errors
///
/// Returns [`WaveletError::UnsupportedFamily`] for families without a formula.
pub fn support_info(bank: &FilterBank) -> Result<SupportInfo, WaveletError> {
    let len = bank.rec_lo().len() as i64;
    match bank.family() {
        WaveletFamily::Daubechies | WaveletFamily::Symlets => {
            let phi = (0, len - 1);
            let psi = (1 - len / 2, len / 2);
            Ok(SupportInfo {
                base: [phi, psi],
                dual: [phi, psi],
            })
        }
        WaveletFamily::Coiflets => {
            let phi = (1 - len / 2, len / 2);
            Ok(SupportInfo {
                base: [phi, phi],
                dual: [phi, phi],
            })
        }
        WaveletFamily::Biorthogonal | WaveletFamily::ReverseBiorthogonal => {
            let (nr, nd) = bank.orders();
            let (nr, nd) = (nr as i64, nd as i64);
            let (n1, n2) = (-nr.div_euclid(2), (nr + 1).div_euclid(2));
            let (nd1, nd2) = (-nd - nr.div_euclid(2) + 1, nd + (nr - 1).div_euclid(2));
            let base = [
                (n1, n2),
                ((n1 - nd2 + 1).div_euclid(2), (n2 - nd1 + 1).div_euclid(2)),
            ];
            let dual = [
                (nd1, nd2),
                ((nd1 - n2 + 1).div_euclid(2), (nd2 - n1 + 1).div_euclid(2)),
            ];
            if bank.family() == WaveletFamily::ReverseBiorthogonal {
                Ok(SupportInfo {
                    base: dual,
                    dual: base,
                })
            } else {
                Ok(SupportInfo { base, dual })
            }
        }
        WaveletFamily::Haar => Err(WaveletError::UnsupportedFamily {
            name: bank.name().to_string(),
            family: bank.family().name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> SupportInfo {
        support_info(&FilterBank::from_name(name).unwrap()).unwrap()
    }

    #[test]
    fn daubechies_supports() {
        let s = info("db2");
        assert_eq!(s.get(Which::Base, Quad::Scaling), (0, 3));
        assert_eq!(s.get(Which::Base, Quad::Wavelet), (-1, 2));
        assert_eq!(s.get(Which::Dual, Quad::Wavelet), (-1, 2));
        assert_eq!(info("db1").get(Which::Base, Quad::Wavelet), (0, 1));
        assert_eq!(info("sym4").get(Which::Dual, Quad::Scaling), (0, 7));
    }

    #[test]
    fn coiflet_supports() {
        let s = info("coif1");
        assert_eq!(s.get(Which::Base, Quad::Scaling), (-2, 3));
        assert_eq!(s.get(Which::Base, Quad::Wavelet), (-2, 3));
    }

    #[test]
    fn biorthogonal_supports() {
        let s = info("bior2.2");
        assert_eq!(s.get(Which::Base, Quad::Scaling), (-1, 1));
        assert_eq!(s.get(Which::Base, Quad::Wavelet), (-1, 2));
        assert_eq!(s.get(Which::Dual, Quad::Scaling), (-2, 2));
        assert_eq!(s.get(Which::Dual, Quad::Wavelet), (-1, 2));

        let s = info("bior1.3");
        assert_eq!(s.get(Which::Base, Quad::Scaling), (0, 1));
        assert_eq!(s.get(Which::Dual, Quad::Scaling), (-2, 3));
        assert_eq!(s.get(Which::Base, Quad::Wavelet), (-1, 2));
    }

    #[test]
    fn low_pass_support_matches_filter_length() {
        for name in crate::filter::wavelist().into_iter().filter(|n| *n != "haar") {
            let bank = FilterBank::from_name(name).unwrap();
            let s = support_info(&bank).unwrap();
            let (a, b) = s.get(Which::Base, Quad::Scaling);
            assert_eq!((b - a + 1) as usize, bank.rec_lo().len(), "{name}");
            let (a, b) = s.get(Which::Dual, Quad::Scaling);
            assert_eq!((b - a + 1) as usize, bank.dec_lo().len(), "{name}");
        }
    }

    #[test]
    fn reverse_biorthogonal_swaps_roles() {
        let b = info("bior2.4");
        let r = info("rbio2.4");
        for quad in [Quad::Scaling, Quad::Wavelet] {
            assert_eq!(b.get(Which::Base, quad), r.get(Which::Dual, quad));
            assert_eq!(b.get(Which::Dual, quad), r.get(Which::Base, quad));
        }
    }

    #[test]
    fn haar_has_no_support_formula() {
        let err = support_info(&FilterBank::from_name("haar").unwrap()).unwrap_err();
        assert!(matches!(err, WaveletError::UnsupportedFamily { ref family, .. } if family == "Haar"));
    }

    #[test]
    fn transformed_support() {
        let s = Support::new(0.0, 3.0).transformed(4.0, 2.0);
        assert_eq!(s, Support::new(0.5, 1.25));
        assert!(s.contains(1.0));
        assert!(!s.contains(0.5));
        assert!(!s.contains(1.25));
    }

    #[test]
    fn quadrants_order_scaling_first() {
        assert!(Quad::Scaling < Quad::Wavelet);
        assert_eq!(Quad::Wavelet.to_string(), "1");
    }
}
