//! Coefficient keys and records.

use std::collections::BTreeMap;

use wde_wavelet::Quad;

/// Identifies one tensor basis function: level offset, quadrant selector,
/// translation and dyadic scale per axis.
///
/// Keys order by level, then quadrant (all-scaling first), then
/// translation, which matches the lattice enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoeffKey {
    level: u32,
    qq: Vec<Quad>,
    z: Vec<i64>,
    scales: Vec<u64>,
}

impl CoeffKey {
    pub fn new(level: u32, qq: Vec<Quad>, z: Vec<i64>, scales: Vec<u64>) -> Self {
        debug_assert_eq!(qq.len(), z.len());
        debug_assert_eq!(qq.len(), scales.len());
        Self {
            level,
            qq,
            z,
            scales,
        }
    }

    /// Level offset `j` above the base levels.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn qq(&self) -> &[Quad] {
        &self.qq
    }

    pub fn z(&self) -> &[i64] {
        &self.z
    }

    /// Scales `2^(j0ᵢ + j)`.
    pub fn scales(&self) -> &[u64] {
        &self.scales
    }

    /// Returns `true` for a scaling coefficient at level zero.
    pub fn is_alpha(&self) -> bool {
        self.level == 0 && self.qq.iter().all(|&q| q == Quad::Scaling)
    }
}

/// Empirical coefficient of one basis function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coeff {
    /// Estimate from the dual functions, `ω·Σ dual(xᵢ)·vᵢ`.
    pub coeff: f64,
    /// Estimate from the primal functions; equals `coeff` when orthogonal.
    pub dual: f64,
    /// Samples strictly inside the dual support.
    pub num: usize,
}

impl Coeff {
    /// `coeff · dual`, the contribution to the squared norm.
    pub fn norm2(&self) -> f64 {
        self.coeff * self.dual
    }
}

/// Ordered coefficient mapping.
pub type CoeffMap = BTreeMap<CoeffKey, Coeff>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key(level: u32, qq: [Quad; 2], z: [i64; 2]) -> CoeffKey {
        CoeffKey::new(level, qq.to_vec(), z.to_vec(), vec![4, 4])
    }

    #[test]
    fn alpha_keys_have_scaling_quadrants() {
        assert!(key(0, [Quad::Scaling, Quad::Scaling], [0, 0]).is_alpha());
        assert!(!key(0, [Quad::Scaling, Quad::Wavelet], [0, 0]).is_alpha());
        assert!(!key(1, [Quad::Scaling, Quad::Scaling], [0, 0]).is_alpha());
    }

    #[test]
    fn ordering_matches_enumeration() {
        let alpha = key(0, [Quad::Scaling, Quad::Scaling], [5, 5]);
        let beta0 = key(0, [Quad::Scaling, Quad::Wavelet], [-3, -3]);
        let beta0b = key(0, [Quad::Wavelet, Quad::Scaling], [-3, -3]);
        let beta1 = key(1, [Quad::Scaling, Quad::Wavelet], [-9, -9]);
        assert!(alpha < beta0);
        assert!(beta0 < beta0b);
        assert!(beta0b < beta1);
        assert!(key(0, [Quad::Scaling, Quad::Scaling], [0, 1]) < key(0, [Quad::Scaling, Quad::Scaling], [1, 0]));
    }

    #[test]
    fn norm2_is_coeff_times_dual() {
        let c = Coeff {
            coeff: 0.5,
            dual: 0.25,
            num: 3,
        };
        assert_eq!(c.norm2(), 0.125);
    }
}
