// Discrete time-step transition for the velocity field

use crate::{ScalarField, field::FieldState, numeric};

/// Default damping coefficient in the neighbor mix.
pub const DEFAULT_DAMPING: f32 = 0.1;

/// Applies one discrete update to a `FieldState`: each cell's new velocity
/// is the sum of its row-shifted and column-shifted neighbors (toroidal
/// wrap) minus a damping term on the cell's own velocity. A cheap local
/// mix for animated flow, not a momentum solve. Deterministic given the
/// same prior state.
pub struct FieldUpdater {
    damping: f32,
}

impl FieldUpdater {
    pub fn new(damping: f32) -> Self {
        FieldUpdater { damping }
    }

    /// Advance the state by one step, then restore the boundary values.
    pub fn step(&self, state: &mut FieldState) {
        let [ux, uy] = state.velocity();

        let next_ux: ScalarField =
            numeric::roll_down_rows(ux) + numeric::roll_left_cols(ux) - self.damping * ux;
        let next_uy: ScalarField =
            numeric::roll_down_rows(uy) + numeric::roll_left_cols(uy) - self.damping * uy;

        state.set_velocity([next_ux, next_uy]);
    }
}

impl Default for FieldUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING)
    }
}
