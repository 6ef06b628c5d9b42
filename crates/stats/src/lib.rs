//! Small numeric helpers shared by the estimator crates.
//!
//! Curve smoothing and peak picking for the cross-validated risk curves,
//! plus summary statistics for reporting.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Centred moving average with reflected edges.
///
/// The input is padded on both sides by mirroring around the end samples
/// (the end sample itself is not repeated), then averaged with a flat
/// window of width `window`. The output has the same length as the input
/// and `out[i]` is centred on `data[i]`.
///
/// Returns the input unchanged when `window < 3` or when the input is
/// shorter than the window. An even `window` is widened by one.
///
/// ```
/// let smoothed = wde_stats::moving_average(&[0.0, 3.0, 0.0, 3.0, 0.0], 3);
/// assert_eq!(smoothed, vec![2.0, 1.0, 2.0, 1.0, 2.0]);
/// ```
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    let n = data.len();
    if window < 3 || n < window {
        return data.to_vec();
    }
    let half = window / 2;
    let width = 2 * half + 1;

    let reflect = |idx: isize| -> f64 {
        let last = n as isize - 1;
        let i = if idx < 0 {
            -idx
        } else if idx > last {
            2 * last - idx
        } else {
            idx
        };
        data[i as usize]
    };

    (0..n as isize)
        .map(|i| {
            let total: f64 = (i - half as isize..=i + half as isize)
                .map(reflect)
                .sum();
            total / width as f64
        })
        .collect()
}

/// Index of the largest value, first occurrence on ties.
///
/// NaN values are skipped. Returns `None` for an empty slice or a slice
/// of NaNs.
pub fn argmax(data: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in data.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Trapezoidal integral of equally spaced samples.
pub fn trapezoid(values: &[f64], step: f64) -> f64 {
    match values {
        [] | [_] => 0.0,
        [first, inner @ .., last] => step * (0.5 * (first + last) + inner.iter().sum::<f64>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_slice() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn sample_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn sd_of_single_is_zero() {
        assert_eq!(sd(&[5.0]), 0.0);
    }

    #[test]
    fn variance_of_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn moving_average_reflects_edges() {
        // padded: [2, 1, 2, 3, 4, 3]; window 3
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        let want = [5.0 / 3.0, 2.0, 3.0, 10.0 / 3.0];
        assert_eq!(out.len(), 4);
        for (o, w) in out.iter().zip(want.iter()) {
            assert_relative_eq!(o, w, epsilon = 1e-12);
        }
    }

    #[test]
    fn moving_average_width_five() {
        // padded: [3, 2, 1, 2, 3, 4, 5, 4, 3]
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 5);
        let want = [2.2, 2.4, 3.0, 3.6, 3.8];
        for (o, w) in out.iter().zip(want.iter()) {
            assert_relative_eq!(o, w, epsilon = 1e-12);
        }
    }

    #[test]
    fn moving_average_constant_is_fixed_point() {
        let out = moving_average(&[0.5; 9], 5);
        assert!(out.iter().all(|&v| (v - 0.5).abs() < 1e-15));
    }

    #[test]
    fn moving_average_short_input_passthrough() {
        let data = [1.0, 5.0, 2.0];
        assert_eq!(moving_average(&data, 5), data.to_vec());
        assert_eq!(moving_average(&data, 1), data.to_vec());
        assert!(moving_average(&[], 5).is_empty());
    }

    #[test]
    fn argmax_first_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0, 3.0]), Some(1));
        assert_eq!(argmax(&[-1.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f64::NAN, 0.5, f64::NAN, 0.7]), Some(3));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn trapezoid_integrates_linear() {
        // integral of x on [0, 1] with 5 points
        let values: Vec<f64> = (0..5).map(|i| i as f64 / 4.0).collect();
        assert_relative_eq!(trapezoid(&values, 0.25), 0.5, epsilon = 1e-12);
        assert_eq!(trapezoid(&[3.0], 1.0), 0.0);
    }
}
