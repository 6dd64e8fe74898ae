//! Pseudo-random helpers: normal deviates and dataset names.

use rand::Rng;

/// Logical directory every dataset name lives under.
pub const DATASET_DIR: &str = "f/";
/// Random characters in a dataset name.
pub const NAME_LEN: usize = 6;
/// Extension appended to every dataset name.
pub const DATASET_EXT: &str = ".txt";

/// Normally-distributed deviate generator using the Box-Muller polar method.
///
/// Each rejection-sampled pair of uniforms yields two deviates; the second is
/// cached and handed out on the next call, so on average one uniform pair
/// serves two samples.
#[derive(Debug, Clone)]
pub struct NormalSource {
    mean: f64,
    std_dev: f64,
    spare: Option<f64>,
}

impl NormalSource {
    /// Standard normal: mean 0, standard deviation 1.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Normal with the given mean and standard deviation.
    #[must_use]
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev,
            spare: None,
        }
    }

    /// Draw one deviate.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if let Some(y) = self.spare.take() {
            return self.mean + y * self.std_dev;
        }

        let (y1, y2) = loop {
            let x1 = 2.0 * rng.random::<f64>() - 1.0;
            let x2 = 2.0 * rng.random::<f64>() - 1.0;
            let w = x1 * x1 + x2 * x2;
            if w < 1.0 && w > 0.0 {
                let scale = (-2.0 * w.ln() / w).sqrt();
                break (x1 * scale, x2 * scale);
            }
        };

        self.spare = Some(y2);
        self.mean + y1 * self.std_dev
    }
}

/// Generate a fresh dataset name: `f/` plus six random lowercase letters
/// plus `.txt`.
pub fn random_blob_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut name = String::with_capacity(DATASET_DIR.len() + NAME_LEN + DATASET_EXT.len());
    name.push_str(DATASET_DIR);
    for _ in 0..NAME_LEN {
        name.push(rng.random_range('a'..='z'));
    }
    name.push_str(DATASET_EXT);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn blob_names_have_fixed_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let name = random_blob_name(&mut rng);
            assert_eq!(name.len(), 12);
            assert!(name.starts_with("f/"));
            assert!(name.ends_with(".txt"));
            assert!(name[2..8].chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn standard_normal_has_expected_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut source = NormalSource::standard();
        let n = 100_000;
        let samples: Vec<f64> = (0..n).map(|_| source.sample(&mut rng)).collect();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.02, "mean {mean} too far from 0");
        assert!((var - 1.0).abs() < 0.05, "variance {var} too far from 1");
    }

    #[test]
    fn shifted_normal_applies_mean_and_scale() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut source = NormalSource::new(10.0, 0.5);
        let n = 50_000;
        let mean = (0..n).map(|_| source.sample(&mut rng)).sum::<f64>() / f64::from(n);
        assert!((mean - 10.0).abs() < 0.02, "mean {mean} too far from 10");
    }
}
