// Velocity and density field state

use na::DMatrix;

use crate::{ScalarField, VectorField, error::PredictorError, numeric};

/// Density pinned on the top and bottom boundary rows.
const BOUNDARY_DENSITY: f32 = 1.0;

/// Aggregate simulation state: an N x N velocity field and an N x N
/// density field. Owned exclusively by the simulation loop; dimensions
/// are fixed at construction.
pub struct FieldState {
    /// Number of rows/columns in the square grid
    grid_size: usize,

    /// Inflow velocity applied by `initialize` (x, y)
    inflow: (f32, f32),

    /// The velocity field
    u: VectorField,

    /// The density field
    density: ScalarField,
}

impl FieldState {
    /// Create a new field state with zero velocity and uniform density.
    ///
    /// Parameters
    /// - `grid_size` - The number of rows/columns in the square grid (>= 2)
    /// - `inflow` - The uniform inflow velocity set by `initialize`
    pub fn new(grid_size: usize, inflow: (f32, f32)) -> Self {
        debug_assert!(grid_size >= 2, "grid must be at least 2x2");

        let ux: DMatrix<f32> = DMatrix::zeros(grid_size, grid_size);
        let uy: DMatrix<f32> = DMatrix::zeros(grid_size, grid_size);
        let density: DMatrix<f32> = DMatrix::from_element(grid_size, grid_size, 1.0);

        FieldState {
            grid_size,
            inflow,
            u: [ux, uy],
            density,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn velocity(&self) -> &VectorField {
        &self.u
    }

    pub fn density(&self) -> &ScalarField {
        &self.density
    }

    /// Set the uniform inflow velocity across every cell.
    pub fn initialize(&mut self) {
        self.u[0].fill(self.inflow.0);
        self.u[1].fill(self.inflow.1);
    }

    /// Set the boundary values on the velocity and density fields:
    /// velocity is zeroed on all four edges, density is pinned on the
    /// top and bottom rows. Must run after every mutation of the field,
    /// including a predictor substitution.
    pub fn apply_boundary(&mut self) {
        let n = self.grid_size;

        for component in self.u.iter_mut() {
            component.row_mut(0).fill(0.);
            component.row_mut(n - 1).fill(0.);
            component.column_mut(0).fill(0.);
            component.column_mut(n - 1).fill(0.);
        }

        self.density.row_mut(0).fill(BOUNDARY_DENSITY);
        self.density.row_mut(n - 1).fill(BOUNDARY_DENSITY);
    }

    /// Per-cell speed (Euclidean norm of the velocity vector). Read-only
    /// derived view; does not mutate the state.
    pub fn compute_speed(&self) -> ScalarField {
        numeric::magnitude(&self.u)
    }

    /// Install a same-shape velocity field produced inside the crate and
    /// restore the boundary. Callers guarantee the shape.
    pub(crate) fn set_velocity(&mut self, velocity: VectorField) {
        debug_assert!(
            velocity
                .iter()
                .all(|c| c.shape() == (self.grid_size, self.grid_size))
        );

        self.u = velocity;
        self.apply_boundary();
    }

    /// Substitute a predictor-produced velocity field, then re-apply the
    /// boundary conditions. The substitution is rejected (and the current
    /// field left untouched) if the shape does not match the grid or the
    /// data is not finite.
    pub fn replace_velocity(&mut self, predicted: VectorField) -> Result<(), PredictorError> {
        let expected = (self.grid_size, self.grid_size);

        for component in predicted.iter() {
            if component.shape() != expected {
                return Err(PredictorError::ShapeMismatch {
                    expected,
                    got: component.shape(),
                });
            }
            if component.iter().any(|v| !v.is_finite()) {
                return Err(PredictorError::NonFinite);
            }
        }

        self.u = predicted;
        self.apply_boundary();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_sets_uniform_inflow() {
        let mut state = FieldState::new(5, (0.1, 0.));
        state.initialize();

        assert!(state.velocity()[0].iter().all(|vx| *vx == 0.1));
        assert!(state.velocity()[1].iter().all(|vy| *vy == 0.));
    }

    #[test]
    fn test_boundary_zeroes_edges_and_pins_density() {
        let mut state = FieldState::new(6, (0.1, 0.));
        state.initialize();
        state.apply_boundary();

        let n = state.grid_size();
        for k in 0..n {
            for component in state.velocity() {
                assert_eq!(*component.index((0, k)), 0.);
                assert_eq!(*component.index((n - 1, k)), 0.);
                assert_eq!(*component.index((k, 0)), 0.);
                assert_eq!(*component.index((k, n - 1)), 0.);
            }
            assert_eq!(*state.density().index((0, k)), 1.0);
            assert_eq!(*state.density().index((n - 1, k)), 1.0);
        }

        // interior untouched
        assert_eq!(*state.velocity()[0].index((2, 3)), 0.1);
    }

    #[test]
    fn test_compute_speed_zero_iff_velocity_zero() {
        let mut state = FieldState::new(4, (0.1, 0.));
        state.initialize();
        state.apply_boundary();

        let speed = state.compute_speed();

        assert!(speed.iter().all(|s| *s >= 0.));
        for r in 0..4 {
            for c in 0..4 {
                let vx = *state.velocity()[0].index((r, c));
                let vy = *state.velocity()[1].index((r, c));
                let expect_zero = vx == 0. && vy == 0.;
                assert_eq!(*speed.index((r, c)) == 0., expect_zero);
            }
        }
    }

    #[test]
    fn test_corner_and_center_after_initialize_and_boundary() {
        // grid_size=4, inflow=(0.1, 0): corner is zeroed, (1,1) keeps the inflow
        let mut state = FieldState::new(4, (0.1, 0.));
        state.initialize();
        state.apply_boundary();

        assert_eq!(*state.velocity()[0].index((0, 0)), 0.);
        assert_eq!(*state.velocity()[1].index((0, 0)), 0.);
        assert_eq!(*state.velocity()[0].index((1, 1)), 0.1);
        assert_eq!(*state.velocity()[1].index((1, 1)), 0.);
    }

    #[test]
    fn test_replace_velocity_rejects_bad_shape() {
        let mut state = FieldState::new(4, (0.1, 0.));
        state.initialize();
        state.apply_boundary();

        let before = state.velocity().clone();

        let wrong = [DMatrix::zeros(3, 3), DMatrix::zeros(3, 3)];
        assert!(state.replace_velocity(wrong).is_err());
        assert_eq!(state.velocity(), &before);

        let non_finite = [
            DMatrix::from_element(4, 4, f32::NAN),
            DMatrix::zeros(4, 4),
        ];
        assert!(state.replace_velocity(non_finite).is_err());
        assert_eq!(state.velocity(), &before);
    }

    #[test]
    fn test_replace_velocity_reapplies_boundary() {
        let mut state = FieldState::new(4, (0.1, 0.));

        let predicted = [
            DMatrix::from_element(4, 4, 2.0),
            DMatrix::from_element(4, 4, 3.0),
        ];
        state.replace_velocity(predicted).unwrap();

        assert_eq!(*state.velocity()[0].index((0, 0)), 0.);
        assert_eq!(*state.velocity()[0].index((1, 1)), 2.0);
        assert_eq!(*state.velocity()[1].index((1, 2)), 3.0);
    }
}
