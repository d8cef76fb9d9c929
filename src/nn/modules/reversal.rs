//! # Feature Reversal Noise Layer

use crate::nn::{LayerError, Mode, Module};
use crate::tensor::{ops, Tensor, TensorData};
use crate::utils::serialization::{ConfigValue, LayerConfig, SerializationError};
use ndarray::{ArrayD, IxDyn};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// During training, flips the sign of input features with probability `prob`.
///
/// Each training-mode call draws one uniform value per feature position and
/// negates the positions whose draw falls at or below `prob`, so the fraction
/// of flipped features is binomially distributed around `prob` rather than
/// being exactly `prob`. The mask is a single row shared by every sample in
/// the batch. During evaluation this layer does nothing and acts as an
/// identity function.
#[derive(Clone, Debug)]
pub struct FeatureReversalNoise {
    input_vector_length: usize,
    prob: f64,
    name: Option<String>,
}

impl FeatureReversalNoise {
    /// Registry key for this layer type.
    pub const CLASS_NAME: &'static str = "FeatureReversalNoise";

    /// Creates a new FeatureReversalNoise layer.
    ///
    /// # Arguments
    /// * `input_vector_length`: expected feature-vector width, must be positive.
    /// * `prob`: target probability of flipping each feature's sign, in `[0, 1]`.
    pub fn new(input_vector_length: usize, prob: f64) -> Result<Self, LayerError> {
        if !(0.0..=1.0).contains(&prob) {
            return Err(LayerError::InvalidConfiguration(format!(
                "prob must be between 0 and 1, got {prob}"
            )));
        }
        if input_vector_length == 0 {
            return Err(LayerError::InvalidConfiguration(
                "input_vector_length must be positive".to_string(),
            ));
        }
        Ok(FeatureReversalNoise {
            input_vector_length,
            prob,
            name: None,
        })
    }

    /// Attaches the optional layer name carried through `get_config`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn input_vector_length(&self) -> usize {
        self.input_vector_length
    }

    pub fn prob(&self) -> f64 {
        self.prob
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Reconstructs the layer from a configuration produced by `get_config`.
    /// Re-runs constructor validation, so an out-of-range `prob` in a saved
    /// config is rejected here too.
    pub fn from_config(config: &LayerConfig) -> Result<Self, SerializationError> {
        let input_vector_length = config.get_usize("input_vector_length")?;
        let prob = config.get_float("prob")?;
        let mut layer = FeatureReversalNoise::new(input_vector_length, prob)?;
        if let Some(name) = config.get_opt_str("name") {
            layer = layer.with_name(name);
        }
        Ok(layer)
    }

    /// Forward pass with an explicit random source, for reproducible runs.
    ///
    /// A training-mode call consumes exactly `input_vector_length` draws from
    /// `rng`; an evaluation-mode call consumes none.
    pub fn forward_with_rng<R: Rng + ?Sized>(
        &self,
        input: &Tensor,
        mode: Mode,
        rng: &mut R,
    ) -> Result<Tensor, LayerError> {
        match mode {
            Mode::Eval => Ok(input.clone()),
            Mode::Train => {
                let draws = ArrayD::random_using(
                    IxDyn(&[1, self.input_vector_length]),
                    Uniform::new(0.0 as TensorData, 1.0),
                    rng,
                );
                let prob = self.prob as TensorData;
                // Row of [1, -1, ..., 1, -1] where the odds of -1 are `prob`.
                // Strict comparison: prob = 0 flips only on a draw of exactly
                // zero, effectively never.
                let mask = Tensor::new(draws.mapv(|u| if u > prob { 1.0 } else { -1.0 }));
                Ok(ops::mul(input, &mask)?)
            }
        }
    }
}

impl Module for FeatureReversalNoise {
    fn forward(&self, input: &Tensor, mode: Mode) -> Result<Tensor, LayerError> {
        self.forward_with_rng(input, mode, &mut rand::thread_rng())
    }

    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn get_config(&self) -> LayerConfig {
        let mut config = LayerConfig::new();
        config.insert(
            "input_vector_length",
            ConfigValue::Int(self.input_vector_length as i64),
        );
        config.insert("prob", ConfigValue::Float(self.prob));
        if let Some(name) = &self.name {
            config.insert("name", ConfigValue::Str(name.clone()));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Axis;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_batch(rows: usize, cols: usize) -> Tensor {
        let data = (0..rows * cols).map(|i| i as TensorData - 3.0).collect();
        Tensor::from_vec(&[rows, cols], data).unwrap()
    }

    #[test]
    fn construction_accepts_the_full_prob_range() {
        for prob in [0.0, 0.25, 0.5, 1.0] {
            let layer = FeatureReversalNoise::new(16, prob).unwrap();
            assert_eq!(layer.input_vector_length(), 16);
            assert_eq!(layer.prob(), prob);
            assert_eq!(layer.name(), None);
        }
    }

    #[test]
    fn construction_rejects_out_of_range_prob() {
        for prob in [-0.1, 1.5, f64::NAN] {
            let err = FeatureReversalNoise::new(16, prob).unwrap_err();
            assert!(matches!(err, LayerError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn construction_rejects_zero_width() {
        let err = FeatureReversalNoise::new(0, 0.5).unwrap_err();
        assert!(matches!(err, LayerError::InvalidConfiguration(_)));
    }

    #[test]
    fn invalid_prob_message_carries_the_value() {
        let err = FeatureReversalNoise::new(16, 1.5).unwrap_err();
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn eval_mode_is_the_identity() {
        let layer = FeatureReversalNoise::new(4, 0.5).unwrap();
        let input = sample_batch(3, 4);
        let out = layer.forward(&input, Mode::Eval).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn train_mode_preserves_magnitudes() {
        let layer = FeatureReversalNoise::new(4, 0.5).unwrap();
        let input = sample_batch(3, 4);
        let mut rng = StdRng::seed_from_u64(1);
        let out = layer
            .forward_with_rng(&input, Mode::Train, &mut rng)
            .unwrap();
        assert_eq!(out.shape(), input.shape());
        for (o, i) in out.data().iter().zip(input.data().iter()) {
            assert_eq!(o.abs(), i.abs());
        }
    }

    #[test]
    fn prob_zero_keeps_every_sign() {
        let layer = FeatureReversalNoise::new(8, 0.0).unwrap();
        let input = sample_batch(2, 8);
        let mut rng = StdRng::seed_from_u64(2);
        let out = layer
            .forward_with_rng(&input, Mode::Train, &mut rng)
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn prob_one_flips_every_sign() {
        let layer = FeatureReversalNoise::new(8, 1.0).unwrap();
        let input = sample_batch(2, 8);
        let mut rng = StdRng::seed_from_u64(3);
        let out = layer
            .forward_with_rng(&input, Mode::Train, &mut rng)
            .unwrap();
        assert_eq!(*out.data(), -input.data());
    }

    #[test]
    fn mask_row_is_shared_across_the_batch() {
        let layer = FeatureReversalNoise::new(16, 0.5).unwrap();
        // Identical rows in, so differing output rows would reveal a
        // per-row mask.
        let input = Tensor::from_vec(&[5, 16], vec![1.0; 5 * 16]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let out = layer
            .forward_with_rng(&input, Mode::Train, &mut rng)
            .unwrap();
        let first = out.data().index_axis(Axis(0), 0).to_owned();
        for row in out.data().axis_iter(Axis(0)) {
            assert_eq!(row, first.view());
        }
    }

    #[test]
    fn fixed_seed_reproduces_the_output() {
        let layer = FeatureReversalNoise::new(32, 0.4).unwrap();
        let input = sample_batch(4, 32);
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let out_a = layer
            .forward_with_rng(&input, Mode::Train, &mut rng_a)
            .unwrap();
        let out_b = layer
            .forward_with_rng(&input, Mode::Train, &mut rng_b)
            .unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn flip_fraction_converges_to_prob() {
        let prob = 0.3;
        let layer = FeatureReversalNoise::new(64, prob).unwrap();
        let input = Tensor::from_vec(&[1, 64], vec![1.0; 64]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut flipped = 0usize;
        let mut total = 0usize;
        for _ in 0..500 {
            let out = layer
                .forward_with_rng(&input, Mode::Train, &mut rng)
                .unwrap();
            flipped += out.data().iter().filter(|v| **v < 0.0).count();
            total += out.size();
        }
        // 32_000 draws; binomial stddev is ~0.0026, so 0.02 is a wide margin.
        let fraction = flipped as f64 / total as f64;
        assert!(
            (fraction - prob).abs() < 0.02,
            "empirical flip fraction {fraction} strayed from {prob}"
        );
    }
}
