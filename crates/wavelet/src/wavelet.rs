//! One-dimensional wavelet function algebra.

use tracing::debug;

use crate::cascade::{REFINEMENT_LEVEL, SampledFunction, scaling_function, wavelet_function};
use crate::error::WaveletError;
use crate::filter::{FilterBank, WaveletFamily};
use crate::support::{Quad, Support, SupportInfo, Which, support_info};

/// Primal and dual scaling and wavelet functions of a named wavelet.
///
/// Primal functions come from the reconstruction filter, dual functions
/// from the decomposition filter. For orthogonal families they coincide.
///
/// # Example
///
/// ```
/// use wde_wavelet::{Quad, Wavelet, Which};
///
/// let wave = Wavelet::new("db2").unwrap();
/// let phi = wave.fun_ix(Which::Base, Quad::Scaling, 4.0, 1.0);
/// assert_eq!(phi.support().lower(), 0.25);
/// assert_eq!(phi.support().upper(), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct Wavelet {
    bank: FilterBank,
    supports: SupportInfo,
    base: [SampledFunction; 2],
    dual: [SampledFunction; 2],
}

impl Wavelet {
    /// Resolves `name` and builds its four functions.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::UnknownWavelet`] | name not in the filter tables |
    /// | [`WaveletError::UnsupportedFamily`] | family without a support formula |
    pub fn new(name: &str) -> Result<Self, WaveletError> {
        let bank = FilterBank::from_name(name)?;
        let supports = support_info(&bank)?;
        let level = REFINEMENT_LEVEL;

        let base_lower = supports.get(Which::Base, Quad::Scaling).0;
        let dual_lower = supports.get(Which::Dual, Quad::Scaling).0;

        let base_phi = scaling_function(bank.rec_lo(), base_lower, level);
        let dual_phi = if bank.is_orthogonal() {
            base_phi.clone()
        } else {
            scaling_function(bank.dec_lo(), dual_lower, level)
        };
        let base_psi = wavelet_function(
            &base_phi,
            bank.dec_lo(),
            dual_lower,
            supports.get(Which::Base, Quad::Wavelet),
            level,
        );
        let dual_psi = if bank.is_orthogonal() {
            base_psi.clone()
        } else {
            wavelet_function(
                &dual_phi,
                bank.rec_lo(),
                base_lower,
                supports.get(Which::Dual, Quad::Wavelet),
                level,
            )
        };

        debug!(
            wavelet = bank.name(),
            family = %bank.family(),
            grid_points = base_phi.values().len(),
            "built wavelet functions"
        );

        Ok(Self {
            bank,
            supports,
            base: [base_phi, base_psi],
            dual: [dual_phi, dual_psi],
        })
    }

    /// Normalized wavelet name.
    pub fn name(&self) -> &str {
        self.bank.name()
    }

    /// Wavelet family.
    pub fn family(&self) -> WaveletFamily {
        self.bank.family()
    }

    /// Underlying filters.
    pub fn filters(&self) -> &FilterBank {
        &self.bank
    }

    /// Returns `true` if primal and dual functions coincide.
    pub fn is_orthogonal(&self) -> bool {
        self.bank.is_orthogonal()
    }

    /// One of the four functions.
    pub fn function(&self, which: Which, quad: Quad) -> &SampledFunction {
        let set = match which {
            Which::Base => &self.base,
            Which::Dual => &self.dual,
        };
        &set[quad.bit() as usize]
    }

    /// Support of one of the four functions.
    pub fn support(&self, which: Which, quad: Quad) -> Support {
        self.supports.support(which, quad)
    }

    /// Integer supports of all four functions.
    pub fn support_info(&self) -> &SupportInfo {
        &self.supports
    }

    /// Evaluates `f(s·x − z)`.
    #[inline]
    pub fn eval(&self, which: Which, quad: Quad, scale: f64, z: f64, x: f64) -> f64 {
        self.function(which, quad).eval(scale * x - z)
    }

    /// The dilated and translated function `x ↦ f(s·x − z)`.
    pub fn fun_ix(&self, which: Which, quad: Quad, scale: f64, z: f64) -> Dilated<'_> {
        Dilated {
            function: self.function(which, quad),
            scale,
            z,
            support: self.supp_ix(which, quad, scale, z),
        }
    }

    /// Support of `x ↦ f(s·x − z)`. Its [`Support::contains`] is the
    /// strict membership indicator.
    pub fn supp_ix(&self, which: Which, quad: Quad, scale: f64, z: f64) -> Support {
        self.support(which, quad).transformed(scale, z)
    }
}

/// A dilated and translated view of one wavelet function.
#[derive(Clone, Copy, Debug)]
pub struct Dilated<'a> {
    function: &'a SampledFunction,
    scale: f64,
    z: f64,
    support: Support,
}

impl Dilated<'_> {
    /// Evaluates the function at `x`.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.function.eval(self.scale * x - self.z)
    }

    /// Support after dilation and translation.
    pub fn support(&self) -> Support {
        self.support
    }

    /// Returns `true` if `x` lies strictly inside the support.
    pub fn contains(&self, x: f64) -> bool {
        self.support.contains(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn orthogonal_duals_coincide() {
        let wave = Wavelet::new("db3").unwrap();
        assert!(wave.is_orthogonal());
        for quad in [Quad::Scaling, Quad::Wavelet] {
            assert_eq!(
                wave.function(Which::Base, quad).values(),
                wave.function(Which::Dual, quad).values()
            );
        }
    }

    #[test]
    fn functions_span_their_supports() {
        for name in ["db2", "coif1", "bior1.3", "rbio2.2", "sym4"] {
            let wave = Wavelet::new(name).unwrap();
            for which in [Which::Base, Which::Dual] {
                for quad in [Quad::Scaling, Quad::Wavelet] {
                    let f = wave.function(which, quad);
                    assert_eq!(f.support(), wave.support(which, quad), "{name}");
                }
            }
        }
    }

    #[test]
    fn dilation_rescales_values() {
        let wave = Wavelet::new("db2").unwrap();
        let phi = wave.function(Which::Base, Quad::Scaling);
        let dilated = wave.fun_ix(Which::Base, Quad::Scaling, 4.0, 3.0);
        for x in [0.8, 0.9, 1.1, 1.3] {
            assert_abs_diff_eq!(dilated.eval(x), phi.eval(4.0 * x - 3.0), epsilon = 1e-15);
        }
        assert_abs_diff_eq!(dilated.support().lower(), 0.75, epsilon = 1e-15);
        assert_abs_diff_eq!(dilated.support().upper(), 1.5, epsilon = 1e-15);
        assert!(dilated.contains(1.0));
        assert!(!dilated.contains(1.5));
        assert_eq!(dilated.eval(2.0), 0.0);
    }

    #[test]
    fn supp_ix_matches_fun_ix() {
        let wave = Wavelet::new("bior2.2").unwrap();
        let s = wave.supp_ix(Which::Dual, Quad::Wavelet, 8.0, -2.0);
        let f = wave.fun_ix(Which::Dual, Quad::Wavelet, 8.0, -2.0);
        assert_eq!(s, f.support());
    }

    #[test]
    fn reverse_biorthogonal_swaps_functions() {
        let bior = Wavelet::new("bior1.3").unwrap();
        let rbio = Wavelet::new("rbio1.3").unwrap();
        assert_eq!(
            bior.function(Which::Dual, Quad::Scaling).values(),
            rbio.function(Which::Base, Quad::Scaling).values()
        );
    }

    #[test]
    fn haar_is_rejected() {
        let err = Wavelet::new("haar").unwrap_err();
        assert!(matches!(err, WaveletError::UnsupportedFamily { .. }));
    }
}
