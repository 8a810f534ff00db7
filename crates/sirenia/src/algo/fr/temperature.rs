use crate::geometry::Box2D;

/// Cooling schedule: the displacement cap for each iteration of a run.
///
/// Schedules are pure functions of the iteration index, the budget and the drawable area. The
/// driver never feeds measured energy back into them, so a run's total work is fixed up front.
pub trait TemperatureModel {
    fn temperature(&self, iteration: usize, iterations: usize, area: Box2D) -> f64;
}

impl<F> TemperatureModel for F
where
    F: Fn(usize, usize, Box2D) -> f64,
{
    fn temperature(&self, iteration: usize, iterations: usize, area: Box2D) -> f64 {
        self(iteration, iterations, area)
    }
}

/// Linear decay from a tenth of the area's smaller side down to zero on the last iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseLinearTemperature;

impl TemperatureModel for InverseLinearTemperature {
    fn temperature(&self, iteration: usize, iterations: usize, area: Box2D) -> f64 {
        if iterations == 0 || iteration + 1 >= iterations {
            return 0.0;
        }
        let start = area.width().min(area.height()) / 10.0;
        let slope = -start / iterations as f64;
        (start + slope * iteration as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_linear_cools_to_zero() {
        let area = Box2D::of_size(20.0, 10.0);
        let t = InverseLinearTemperature;
        assert_eq!(t.temperature(0, 10, area), 1.0);
        assert!((t.temperature(5, 10, area) - 0.5).abs() < 1e-12);
        assert_eq!(t.temperature(9, 10, area), 0.0);

        let mut prev = f64::INFINITY;
        for i in 0..10 {
            let cur = t.temperature(i, 10, area);
            assert!(cur <= prev);
            prev = cur;
        }
    }
}
