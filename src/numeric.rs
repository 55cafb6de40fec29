// Grid helpers with toroidal indexing

use na::DMatrix;

use crate::{ScalarField, VectorField};

/// Shift a scalar field one row downward with wrap-around, so that
/// `out[(i, j)] == field[(i-1, j)]` and row 0 receives the last row.
///
/// Parameters:
/// - `field` - A reference to the scalar field to shift
///
/// Returns:
/// - A `ScalarField` with every row moved down by one
pub fn roll_down_rows(field: &ScalarField) -> ScalarField {
    let (rows, cols) = field.shape();

    let mut rolled: DMatrix<f32> = DMatrix::zeros(rows, cols);

    for r in 0..rows {
        let src = (r + rows - 1) % rows;
        for c in 0..cols {
            *(rolled.index_mut((r, c))) = *field.index((src, c));
        }
    }

    rolled
}

/// Shift a scalar field one column leftward with wrap-around, so that
/// `out[(i, j)] == field[(i, j+1)]` and the last column receives column 0.
///
/// Parameters:
/// - `field` - A reference to the scalar field to shift
///
/// Returns:
/// - A `ScalarField` with every column moved left by one
pub fn roll_left_cols(field: &ScalarField) -> ScalarField {
    let (rows, cols) = field.shape();

    let mut rolled: DMatrix<f32> = DMatrix::zeros(rows, cols);

    for r in 0..rows {
        for c in 0..cols {
            let src = (c + 1) % cols;
            *(rolled.index_mut((r, c))) = *field.index((r, src));
        }
    }

    rolled
}

/// Compute the per-cell Euclidean norm of a vector field F=<u,v>.
///
/// Parameters:
/// - `field` - The `VectorField` to take the magnitude of
///
/// Returns:
///     A `ScalarField` of per-cell speeds.
pub fn magnitude(field: &VectorField) -> ScalarField {
    (field[0].map(|x| x.powi(2)) + field[1].map(|y| y.powi(2))).map(|k| k.sqrt())
}

/// Mean of the four toroidal neighbors (north, south, east, west) of each cell.
pub fn neighbor_mean(field: &ScalarField) -> ScalarField {
    let (rows, cols) = field.shape();

    let mut mean: DMatrix<f32> = DMatrix::zeros(rows, cols);

    for r in 0..rows {
        for c in 0..cols {
            let north = *field.index(((r + rows - 1) % rows, c));
            let south = *field.index(((r + 1) % rows, c));
            let west = *field.index((r, (c + cols - 1) % cols));
            let east = *field.index((r, (c + 1) % cols));

            *(mean.index_mut((r, c))) = (north + south + west + east) / 4.0;
        }
    }

    mean
}
