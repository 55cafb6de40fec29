// Velocity-field predictors

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{ScalarField, VectorField, error::PredictorError, numeric};

/// A collaborator that maps a velocity field to a predicted velocity
/// field of the same shape. The simulation core treats the concrete
/// implementation as opaque and re-applies its own boundary conditions
/// to whatever comes back.
pub trait Predictor {
    fn predict(&self, velocity: &VectorField) -> Result<VectorField, PredictorError>;
}

impl Predictor for Box<dyn Predictor> {
    fn predict(&self, velocity: &VectorField) -> Result<VectorField, PredictorError> {
        (**self).predict(velocity)
    }
}

/// Passes the field through unchanged.
pub struct IdentityPredictor;

impl Predictor for IdentityPredictor {
    fn predict(&self, velocity: &VectorField) -> Result<VectorField, PredictorError> {
        Ok(velocity.clone())
    }
}

/// Heuristic predictor: blends each cell with the mean of its four
/// toroidal neighbors.
pub struct SmoothingPredictor {
    /// Blend factor in [0, 1]; 0 is identity, 1 is the pure neighbor mean
    blend: f32,
}

impl SmoothingPredictor {
    pub fn new(blend: f32) -> Self {
        SmoothingPredictor {
            blend: blend.clamp(0., 1.),
        }
    }
}

impl Predictor for SmoothingPredictor {
    fn predict(&self, velocity: &VectorField) -> Result<VectorField, PredictorError> {
        let smooth = |component: &ScalarField| -> ScalarField {
            (1. - self.blend) * component + self.blend * numeric::neighbor_mean(component)
        };

        Ok([smooth(&velocity[0]), smooth(&velocity[1])])
    }
}

/// Weights for a 5-point linear stencil, loadable from a JSON file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictorWeights {
    pub center: f32,
    pub north: f32,
    pub south: f32,
    pub east: f32,
    pub west: f32,
    pub bias: (f32, f32),
}

impl Default for PredictorWeights {
    fn default() -> Self {
        // mild diffusion around identity
        PredictorWeights {
            center: 0.8,
            north: 0.05,
            south: 0.05,
            east: 0.05,
            west: 0.05,
            bias: (0., 0.),
        }
    }
}

/// Stand-in for a trained model: applies a linear stencil with learned
/// weights to each velocity component. Output containing non-finite
/// values is reported as an error rather than handed to the core.
pub struct LearnedPredictor {
    weights: PredictorWeights,
}

impl LearnedPredictor {
    pub fn new(weights: PredictorWeights) -> Self {
        LearnedPredictor { weights }
    }

    /// Load stencil weights from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, PredictorError> {
        let file = File::open(path).map_err(|err| PredictorError::WeightLoad {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;

        let reader = BufReader::new(file);
        let weights: PredictorWeights =
            serde_json::from_reader(reader).map_err(|err| PredictorError::WeightLoad {
                path: path.to_owned(),
                reason: err.to_string(),
            })?;

        Ok(Self::new(weights))
    }

    fn apply_stencil(&self, component: &ScalarField, bias: f32) -> ScalarField {
        let w = &self.weights;
        let (rows, cols) = component.shape();

        let mut out: ScalarField = ScalarField::zeros(rows, cols);

        for r in 0..rows {
            for c in 0..cols {
                let north = *component.index(((r + rows - 1) % rows, c));
                let south = *component.index(((r + 1) % rows, c));
                let west = *component.index((r, (c + cols - 1) % cols));
                let east = *component.index((r, (c + 1) % cols));
                let center = *component.index((r, c));

                *(out.index_mut((r, c))) = w.center * center
                    + w.north * north
                    + w.south * south
                    + w.east * east
                    + w.west * west
                    + bias;
            }
        }

        out
    }
}

impl Predictor for LearnedPredictor {
    fn predict(&self, velocity: &VectorField) -> Result<VectorField, PredictorError> {
        let predicted = [
            self.apply_stencil(&velocity[0], self.weights.bias.0),
            self.apply_stencil(&velocity[1], self.weights.bias.1),
        ];

        for component in predicted.iter() {
            if component.iter().any(|v| !v.is_finite()) {
                return Err(PredictorError::NonFinite);
            }
        }

        Ok(predicted)
    }
}

#[cfg(test)]
mod tests {
    use na::DMatrix;
    use rand::Rng;

    use super::*;

    fn random_field(n: usize) -> VectorField {
        let mut rng = rand::rng();
        [
            DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0f32)),
            DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0f32)),
        ]
    }

    #[test]
    fn test_identity_returns_input() {
        let field = random_field(6);
        let predicted = IdentityPredictor.predict(&field).unwrap();

        assert_eq!(predicted, field);
    }

    #[test]
    fn test_smoothing_preserves_uniform_field() {
        let field = [
            DMatrix::from_element(5, 5, 0.3f32),
            DMatrix::from_element(5, 5, -0.2f32),
        ];

        let predicted = SmoothingPredictor::new(0.5).predict(&field).unwrap();

        // a uniform field is a fixed point of the neighbor blend
        assert_eq!(predicted, field);
    }

    #[test]
    fn test_weights_save_load() {
        let original = PredictorWeights {
            center: 0.7,
            north: 0.1,
            south: 0.1,
            east: 0.05,
            west: 0.05,
            bias: (0.01, -0.01),
        };

        let serialized = serde_json::to_string(&original).unwrap();

        println!("Serialized weights:\n\n{serialized}");

        let deserialized: PredictorWeights = serde_json::from_str(&serialized).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_learned_identity_weights() {
        let weights = PredictorWeights {
            center: 1.0,
            north: 0.,
            south: 0.,
            east: 0.,
            west: 0.,
            bias: (0., 0.),
        };

        let field = random_field(4);
        let predicted = LearnedPredictor::new(weights).predict(&field).unwrap();

        assert_eq!(predicted, field);
    }

    #[test]
    fn test_learned_rejects_non_finite_output() {
        let weights = PredictorWeights {
            bias: (f32::NAN, 0.),
            ..PredictorWeights::default()
        };

        let field = random_field(4);
        let result = LearnedPredictor::new(weights).predict(&field);

        assert!(matches!(result, Err(PredictorError::NonFinite)));
    }

    #[test]
    fn test_missing_weight_file() {
        let result = LearnedPredictor::from_json_file(Path::new("does-not-exist.json"));

        assert!(matches!(result, Err(PredictorError::WeightLoad { .. })));
    }
}
