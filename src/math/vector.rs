//! Elementwise primitives over `f64` slices.
//!
//! Length disagreements are programmer errors and panic.

/// out[i] = a[i] - b[i]
pub fn sub(a: &[f64], b: &[f64], out: &mut [f64]) {
    if a.len() != b.len() || a.len() != out.len() {
        panic!("Vectors are of incorrect sizes")
    }
    for ((o, x), y) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
        *o = x - y;
    }
}

/// y[i] = alpha·x[i] + beta·y[i]
///
/// With `beta == 0.0` the previous contents of `y` are never read, so stale
/// NaNs in a reused buffer do not leak into the result.
pub fn axpby(alpha: f64, x: &[f64], beta: f64, y: &mut [f64]) {
    if x.len() != y.len() {
        panic!("Vectors are of incorrect sizes")
    }
    if beta == 0.0 {
        for (yi, xi) in y.iter_mut().zip(x.iter()) {
            *yi = alpha * xi;
        }
    } else {
        for (yi, xi) in y.iter_mut().zip(x.iter()) {
            *yi = alpha * xi + beta * *yi;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sub_is_elementwise() {
        let mut out = vec![0.0; 3];
        sub(&[3.0, 1.0, -2.0], &[1.0, 1.0, 2.0], &mut out);
        assert_eq!(out, vec![2.0, 0.0, -4.0]);
    }

    #[test]
    fn axpby_with_zero_beta_ignores_old_contents() {
        let mut y = vec![f64::NAN, f64::NAN];
        axpby(0.0125, &[80.0, -160.0], 0.0, &mut y);
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y[1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn axpby_accumulates_with_beta() {
        let mut y = vec![1.0, 2.0];
        axpby(2.0, &[1.0, 1.0], 0.5, &mut y);
        assert_eq!(y, vec![2.5, 3.0]);
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn sub_rejects_length_mismatch() {
        let mut out = vec![0.0; 2];
        sub(&[1.0, 2.0], &[1.0], &mut out);
    }
}
