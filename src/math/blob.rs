use serde::{Serialize, Deserialize};

/// An engine-owned N×C×H×W buffer with a value plane (`data`) and a
/// gradient plane (`diff`).
///
/// Loss layers read `data` and write `diff`; they never resize a blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub num: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f64>,
    pub diff: Vec<f64>,
}

impl Blob {
    pub fn new(num: usize, channels: usize, height: usize, width: usize) -> Blob {
        let count = num * channels * height * width;
        Blob {
            num,
            channels,
            height,
            width,
            data: vec![0.0; count],
            diff: vec![0.0; count],
        }
    }

    /// One scalar per example: shape (N, 1, 1, 1).
    pub fn from_scores(scores: Vec<f64>) -> Blob {
        let num = scores.len();
        Blob {
            num,
            channels: 1,
            height: 1,
            width: 1,
            diff: vec![0.0; num],
            data: scores,
        }
    }

    pub fn count(&self) -> usize {
        self.num * self.per_example()
    }

    /// Feature width of one example (C·H·W).
    pub fn per_example(&self) -> usize {
        self.channels * self.height * self.width
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.num, self.channels, self.height, self.width]
    }
}

impl Default for Blob {
    fn default() -> Self {
        Blob::new(0, 1, 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scores_is_scalar_per_example() {
        let b = Blob::from_scores(vec![0.5, 1.5, -2.0]);
        assert_eq!(b.shape(), [3, 1, 1, 1]);
        assert_eq!(b.per_example(), 1);
        assert_eq!(b.count(), 3);
        assert_eq!(b.diff, vec![0.0; 3]);
    }

    #[test]
    fn new_allocates_both_planes() {
        let b = Blob::new(2, 3, 1, 1);
        assert_eq!(b.count(), 6);
        assert_eq!(b.data.len(), 6);
        assert_eq!(b.diff.len(), 6);
    }
}
