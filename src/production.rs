// Ammonia production model

use ndarray::Array1;

use crate::error::ComputationError;

/// Temperature of peak yield (K)
pub const PEAK_TEMPERATURE: f32 = 450.;

/// Gaussian spread of the yield curve (K)
pub const TEMPERATURE_SPREAD: f32 = 50.;

/// Default sweep bounds and resolution
const SWEEP_START: f32 = 200.;
const SWEEP_END: f32 = 700.;
const SWEEP_SAMPLES: usize = 100;

/// The default temperature sweep: 100 samples over 200 K to 700 K.
pub fn temperature_range() -> Array1<f32> {
    Array1::linspace(SWEEP_START, SWEEP_END, SWEEP_SAMPLES)
}

/// Relative ammonia yield for each temperature sample, as a Gaussian
/// centered on `PEAK_TEMPERATURE`:
///
///   yield(T) = exp(-(T - 450)^2 / (2 * 50^2))
///
/// Parameters
/// - `temperatures` - Temperature samples in Kelvin
///
/// Returns
/// - The per-sample yield in (0, 1], or a `ComputationError` for an
///   empty or non-finite input
pub fn production_curve(temperatures: &Array1<f32>) -> Result<Array1<f32>, ComputationError> {
    if temperatures.is_empty() {
        return Err(ComputationError::EmptyRange);
    }

    if let Some(bad) = temperatures.iter().find(|t| !t.is_finite()) {
        return Err(ComputationError::NonFiniteTemperature(*bad));
    }

    let curve = temperatures.mapv(|t| {
        let deviation = t - PEAK_TEMPERATURE;
        (-(deviation * deviation) / (2. * TEMPERATURE_SPREAD * TEMPERATURE_SPREAD)).exp()
    });

    Ok(curve)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_peak_yield_at_center() {
        let temps = array![450.0f32];
        let curve = production_curve(&temps).unwrap();

        assert_eq!(curve[0], 1.0);
    }

    #[test]
    fn test_curve_is_symmetric_about_peak() {
        let temps = array![400.0f32, 500.0];
        let curve = production_curve(&temps).unwrap();

        assert_eq!(curve[0], curve[1]);
        assert!(curve[0] < 1.0);
    }

    #[test]
    fn test_default_sweep_peaks_near_center() {
        let temps = temperature_range();
        let curve = production_curve(&temps).unwrap();

        let (argmax, _) = curve
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |(bi, bv), (i, v)| {
                if *v > bv { (i, *v) } else { (bi, bv) }
            });

        let peak_temp = temps[argmax];
        assert!((peak_temp - PEAK_TEMPERATURE).abs() < 5.);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(matches!(
            production_curve(&Array1::<f32>::zeros(0)),
            Err(ComputationError::EmptyRange)
        ));

        assert!(matches!(
            production_curve(&array![300.0f32, f32::NAN]),
            Err(ComputationError::NonFiniteTemperature(_))
        ));
    }
}
