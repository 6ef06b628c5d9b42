//! Wavelet filter tables.
//!
//! Low-pass filters are stored with unit-norm scaling (they sum to `√2`).
//! Orthogonal families store a single filter that serves as both the
//! reconstruction and decomposition low-pass. Spline biorthogonal families
//! store both, as exact dyadic rationals.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};
use std::fmt;

use crate::error::WaveletError;

/// Family a named wavelet belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveletFamily {
    /// Haar wavelet. Resolves, but carries no support formula.
    Haar,
    /// Daubechies extremal phase (`dbN`).
    Daubechies,
    /// Daubechies least asymmetric (`symN`).
    Symlets,
    /// Coiflets (`coifN`).
    Coiflets,
    /// Spline biorthogonal (`biorNr.Nd`).
    Biorthogonal,
    /// Reverse spline biorthogonal (`rbioNr.Nd`).
    ReverseBiorthogonal,
}

impl WaveletFamily {
    /// Human-readable family name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Haar => "Haar",
            Self::Daubechies => "Daubechies",
            Self::Symlets => "Symlets",
            Self::Coiflets => "Coiflets",
            Self::Biorthogonal => "Biorthogonal",
            Self::ReverseBiorthogonal => "Reverse biorthogonal",
        }
    }

    /// Returns `true` if primal and dual functions coincide.
    pub fn is_orthogonal(&self) -> bool {
        !matches!(self, Self::Biorthogonal | Self::ReverseBiorthogonal)
    }
}

impl fmt::Display for WaveletFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reconstruction and decomposition low-pass filters of a named wavelet.
///
/// # Example
///
/// ```
/// use wde_wavelet::{FilterBank, WaveletFamily};
///
/// let bank = FilterBank::from_name("db2").unwrap();
/// assert_eq!(bank.family(), WaveletFamily::Daubechies);
/// assert_eq!(bank.rec_lo().len(), 4);
/// assert!(bank.is_orthogonal());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FilterBank {
    name: String,
    family: WaveletFamily,
    rec_lo: Vec<f64>,
    dec_lo: Vec<f64>,
    orders: (usize, usize),
}

impl FilterBank {
    /// Resolves a wavelet by case-insensitive name.
    ///
    /// | Pattern | Family | Available |
    /// |---------|--------|-----------|
    /// | `haar` | Haar | |
    /// | `dbN` | Daubechies | N = 1..=5 |
    /// | `symN` | Symlets | N = 2..=4 |
    /// | `coifN` | Coiflets | N = 1, 2 |
    /// | `biorNr.Nd` | Biorthogonal | 1.1, 1.3, 2.2, 2.4, 3.1, 3.3 |
    /// | `rbioNr.Nd` | Reverse biorthogonal | as `bior` |
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::UnknownWavelet`] if the name does not resolve.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        let lower = name.trim().to_lowercase();
        let unknown = || WaveletError::UnknownWavelet(name.to_string());

        if lower == "haar" {
            return Ok(Self::orthogonal(lower, WaveletFamily::Haar, 1, &DB1));
        }
        if let Some(order) = lower.strip_prefix("db") {
            let n: usize = order.parse().map_err(|_| unknown())?;
            let taps: &[f64] = match n {
                1 => &DB1,
                2 => &DB2,
                3 => &DB3,
                4 => &DB4,
                5 => &DB5,
                _ => return Err(unknown()),
            };
            return Ok(Self::orthogonal(lower, WaveletFamily::Daubechies, n, taps));
        }
        if let Some(order) = lower.strip_prefix("sym") {
            let n: usize = order.parse().map_err(|_| unknown())?;
            let taps: &[f64] = match n {
                2 => &DB2,
                3 => &DB3,
                4 => &SYM4,
                _ => return Err(unknown()),
            };
            return Ok(Self::orthogonal(lower, WaveletFamily::Symlets, n, taps));
        }
        if let Some(order) = lower.strip_prefix("coif") {
            let n: usize = order.parse().map_err(|_| unknown())?;
            let taps: &[f64] = match n {
                1 => &COIF1,
                2 => &COIF2,
                _ => return Err(unknown()),
            };
            return Ok(Self::orthogonal(lower, WaveletFamily::Coiflets, n, taps));
        }

        let (family, orders) = if let Some(rest) = lower.strip_prefix("bior") {
            (WaveletFamily::Biorthogonal, rest)
        } else if let Some(rest) = lower.strip_prefix("rbio") {
            (WaveletFamily::ReverseBiorthogonal, rest)
        } else {
            return Err(unknown());
        };
        let (nr, nd) = orders.split_once('.').ok_or_else(unknown)?;
        let nr: usize = nr.parse().map_err(|_| unknown())?;
        let nd: usize = nd.parse().map_err(|_| unknown())?;
        let (primal, dual) = spline_pair(nr, nd).ok_or_else(unknown)?;
        let primal: Vec<f64> = primal.iter().map(|t| t * SQRT_2).collect();
        let dual: Vec<f64> = dual.iter().map(|t| t * SQRT_2).collect();
        let (rec_lo, dec_lo) = match family {
            WaveletFamily::ReverseBiorthogonal => (dual, primal),
            _ => (primal, dual),
        };
        Ok(Self {
            name: lower,
            family,
            rec_lo,
            dec_lo,
            orders: (nr, nd),
        })
    }

    fn orthogonal(name: String, family: WaveletFamily, order: usize, taps: &[f64]) -> Self {
        Self {
            name,
            family,
            rec_lo: taps.to_vec(),
            dec_lo: taps.to_vec(),
            orders: (order, order),
        }
    }

    /// Normalized (lowercase) wavelet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family of this wavelet.
    pub fn family(&self) -> WaveletFamily {
        self.family
    }

    /// Reconstruction (primal) low-pass filter.
    pub fn rec_lo(&self) -> &[f64] {
        &self.rec_lo
    }

    /// Decomposition (dual) low-pass filter.
    pub fn dec_lo(&self) -> &[f64] {
        &self.dec_lo
    }

    /// Order parameters from the name: `(N, N)` for orthogonal families,
    /// `(Nr, Nd)` for the spline families.
    pub fn orders(&self) -> (usize, usize) {
        self.orders
    }

    /// Returns `true` if the family is orthogonal.
    pub fn is_orthogonal(&self) -> bool {
        self.family.is_orthogonal()
    }
}

/// Lists every wavelet name accepted by [`FilterBank::from_name`].
pub fn wavelist() -> Vec<&'static str> {
    vec![
        "haar", "db1", "db2", "db3", "db4", "db5", "sym2", "sym3", "sym4", "coif1", "coif2",
        "bior1.1", "bior1.3", "bior2.2", "bior2.4", "bior3.1", "bior3.3", "rbio1.1", "rbio1.3",
        "rbio2.2", "rbio2.4", "rbio3.1", "rbio3.3",
    ]
}

/// Spline biorthogonal pair `(primal, dual)` before the `√2` scaling.
fn spline_pair(nr: usize, nd: usize) -> Option<(&'static [f64], &'static [f64])> {
    let pair: (&'static [f64], &'static [f64]) = match (nr, nd) {
        (1, 1) => (&SPLINE_1, &DUAL_1_1),
        (1, 3) => (&SPLINE_1, &DUAL_1_3),
        (2, 2) => (&SPLINE_2, &DUAL_2_2),
        (2, 4) => (&SPLINE_2, &DUAL_2_4),
        (3, 1) => (&SPLINE_3, &DUAL_3_1),
        (3, 3) => (&SPLINE_3, &DUAL_3_3),
        _ => return None,
    };
    Some(pair)
}

const DB1: [f64; 2] = [FRAC_1_SQRT_2, FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    0.4829629131445341,
    0.8365163037378077,
    0.2241438680420134,
    -0.12940952255126034,
];

const DB3: [f64; 6] = [
    0.3326705529509569,
    0.8068915093133388,
    0.4598775021193313,
    -0.13501102001039084,
    -0.08544127388224149,
    0.035226291882100656,
];

const DB4: [f64; 8] = [
    0.23037781330885523,
    0.7148465705525415,
    0.6308807679295904,
    -0.02798376941698385,
    -0.18703481171888114,
    0.030841381835986965,
    0.032883011666982945,
    -0.010597401784997278,
];

const DB5: [f64; 10] = [
    0.160102397974125,
    0.6038292697974729,
    0.7243085284385744,
    0.13842814590110342,
    -0.24229488706619015,
    -0.03224486958502952,
    0.07757149384006515,
    -0.006241490213011705,
    -0.012580751999015526,
    0.003335725285001549,
];

const SYM4: [f64; 8] = [
    0.032223100604042702,
    -0.012603967262037833,
    -0.099219543576847216,
    0.29785779560527736,
    0.80373875180591614,
    0.49761866763201545,
    -0.02963552764599851,
    -0.075765714789273325,
];

const COIF1: [f64; 6] = [
    -0.0727326195128539,
    0.3378976624578092,
    0.8525720202122554,
    0.38486484686420286,
    -0.0727326195128539,
    -0.01565572813546454,
];

const COIF2: [f64; 12] = [
    -0.0007205494453645122,
    -0.0018232088707029932,
    0.0056114348193944995,
    0.023680171946334084,
    -0.0594344186464569,
    -0.0764885990783064,
    0.41700518442169254,
    0.8127236354455423,
    0.3861100668211622,
    -0.06737255472196302,
    -0.04146493678175915,
    0.016387336463522112,
];

const SPLINE_1: [f64; 2] = [0.5, 0.5];
const SPLINE_2: [f64; 3] = [0.25, 0.5, 0.25];
const SPLINE_3: [f64; 4] = [0.125, 0.375, 0.375, 0.125];

const DUAL_1_1: [f64; 2] = [0.5, 0.5];
const DUAL_1_3: [f64; 6] = [
    -1.0 / 16.0,
    1.0 / 16.0,
    0.5,
    0.5,
    1.0 / 16.0,
    -1.0 / 16.0,
];
const DUAL_2_2: [f64; 5] = [-0.125, 0.25, 0.75, 0.25, -0.125];
const DUAL_2_4: [f64; 9] = [
    3.0 / 128.0,
    -3.0 / 64.0,
    -0.125,
    19.0 / 64.0,
    45.0 / 64.0,
    19.0 / 64.0,
    -0.125,
    -3.0 / 64.0,
    3.0 / 128.0,
];
const DUAL_3_1: [f64; 4] = [-0.25, 0.75, 0.75, -0.25];
const DUAL_3_3: [f64; 8] = [
    3.0 / 64.0,
    -9.0 / 64.0,
    -7.0 / 64.0,
    45.0 / 64.0,
    45.0 / 64.0,
    -7.0 / 64.0,
    -9.0 / 64.0,
    3.0 / 64.0,
];
