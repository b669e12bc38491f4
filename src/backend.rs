use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::math::vector;

/// Execution backend for the per-example loss kernels.
///
/// - `Cpu`      — plain sequential loops.
/// - `Parallel` — the same kernels dispatched over rayon's thread pool.
///
/// Every example is independent, so both backends produce identical
/// per-example values; only the order of the final loss summation differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Cpu,
    Parallel,
}

impl Backend {
    /// out[i] = a[i] - b[i]
    pub fn sub(self, a: &[f64], b: &[f64], out: &mut [f64]) {
        match self {
            Backend::Cpu => vector::sub(a, b, out),
            Backend::Parallel => {
                if a.len() != b.len() || a.len() != out.len() {
                    panic!("Vectors are of incorrect sizes")
                }
                out.par_iter_mut()
                    .zip(a.par_iter().zip(b.par_iter()))
                    .for_each(|(o, (x, y))| *o = x - y);
            }
        }
    }

    /// out[i] = f(i) for every index of `out`.
    pub fn fill_indexed<F>(self, out: &mut [f64], f: F)
    where
        F: Fn(usize) -> f64 + Sync + Send,
    {
        match self {
            Backend::Cpu => {
                for (i, o) in out.iter_mut().enumerate() {
                    *o = f(i);
                }
            }
            Backend::Parallel => {
                out.par_iter_mut()
                    .enumerate()
                    .for_each(|(i, o)| *o = f(i));
            }
        }
    }

    /// Σ f(values[i])
    pub fn sum_by<F>(self, values: &[f64], f: F) -> f64
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        match self {
            Backend::Cpu => values.iter().map(|&v| f(v)).sum(),
            Backend::Parallel => values.par_iter().map(|&v| f(v)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_agree_on_indexed_fill() {
        let src: Vec<f64> = (0..1000).map(|i| i as f64 * 0.5 - 100.0).collect();
        let mut cpu = vec![0.0; src.len()];
        let mut par = vec![0.0; src.len()];
        Backend::Cpu.fill_indexed(&mut cpu, |i| (0.3 - src[i]).max(0.0));
        Backend::Parallel.fill_indexed(&mut par, |i| (0.3 - src[i]).max(0.0));
        assert_eq!(cpu, par);
    }

    #[test]
    fn parallel_sub_matches_cpu() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![0.5, 4.0, -1.0];
        let mut cpu = vec![0.0; 3];
        let mut par = vec![0.0; 3];
        Backend::Cpu.sub(&a, &b, &mut cpu);
        Backend::Parallel.sub(&a, &b, &mut par);
        assert_eq!(cpu, par);
    }

    #[test]
    fn sum_by_agrees_within_tolerance() {
        let values: Vec<f64> = (0..10_000).map(|i| (i as f64).sin()).collect();
        let cpu = Backend::Cpu.sum_by(&values, |v| (0.3 - v).max(0.0));
        let par = Backend::Parallel.sum_by(&values, |v| (0.3 - v).max(0.0));
        assert!((cpu - par).abs() < 1e-9);
    }

    #[test]
    fn default_is_cpu() {
        assert_eq!(Backend::default(), Backend::Cpu);
        let b: Backend = serde_json::from_str("\"parallel\"").unwrap();
        assert_eq!(b, Backend::Parallel);
    }
}
