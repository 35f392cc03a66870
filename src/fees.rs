// Excess baggage fee calculation

use crate::flight::FlightLimits;

// Share of the per-passenger baggage allowance actually granted
pub const ALLOWANCE_SAFETY_FACTOR: f64 = 0.8;

// Baggage as presented at a desk: width, height and depth plus weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Baggage {
    pub dimensions: [f64; 3],
    pub weight: f64,
}

impl Baggage {
    pub fn new(dimensions: [f64; 3], weight: f64) -> Self {
        Self { dimensions, weight }
    }

    // Negative inputs are read as magnitudes rather than rejected
    pub fn volume(&self) -> f64 {
        (self.dimensions[0] * self.dimensions[1] * self.dimensions[2]).abs()
    }

    pub fn normalized_weight(&self) -> f64 {
        self.weight.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeAssessment {
    pub volume: f64,
    pub weight: f64,
    pub weight_allowance: f64,
    pub volume_allowance: f64,
    pub weight_excess: f64,
    pub volume_excess: f64,
    pub fee: f64,
}

// Prices a passenger's baggage against their share of the flight's limits.
pub fn assess(baggage: &Baggage, limits: &FlightLimits) -> FeeAssessment {
    let volume = baggage.volume();
    let weight = baggage.normalized_weight();
    let capacity = limits.passenger_capacity as f64;

    let weight_allowance = (limits.max_baggage_weight / capacity) * ALLOWANCE_SAFETY_FACTOR;
    let volume_allowance = (limits.max_baggage_volume / capacity) * ALLOWANCE_SAFETY_FACTOR;

    let weight_excess = (weight - weight_allowance).max(0.0);
    let volume_excess = (volume - volume_allowance).max(0.0);

    FeeAssessment {
        volume,
        weight,
        weight_allowance,
        volume_allowance,
        weight_excess,
        volume_excess,
        fee: (weight_excess + volume_excess) * limits.fee_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn limits() -> FlightLimits {
        FlightLimits {
            passenger_capacity: 2,
            max_baggage_volume: 2.0,
            max_baggage_weight: 40.0,
            fee_multiplier: 10.0,
        }
    }

    #[test]
    fn test_fee_over_both_allowances() {
        let a = assess(&Baggage::new([1.0, 1.0, 1.5], 30.0), &limits());

        assert_abs_diff_eq!(a.volume, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(a.weight_allowance, 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.volume_allowance, 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(a.weight_excess, 14.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.volume_excess, 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(a.fee, 147.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_fee_within_allowance() {
        let a = assess(&Baggage::new([0.5, 0.5, 0.5], 10.0), &limits());
        assert_eq!(a.weight_excess, 0.0);
        assert_eq!(a.volume_excess, 0.0);
        assert_eq!(a.fee, 0.0);
    }

    #[test]
    fn test_negative_inputs_use_magnitude() {
        let negative = assess(&Baggage::new([-1.0, 1.0, 1.5], -5.0), &limits());
        assert_abs_diff_eq!(negative.weight, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(negative.volume, 1.5, epsilon = 1e-9);

        let positive = assess(&Baggage::new([1.0, 1.0, 1.5], 5.0), &limits());
        assert_abs_diff_eq!(negative.fee, positive.fee, epsilon = 1e-9);
        // only the volume is over its allowance here
        assert_abs_diff_eq!(negative.fee, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_multiplier_waives_fee() {
        let free = FlightLimits {
            fee_multiplier: 0.0,
            ..limits()
        };
        assert_eq!(assess(&Baggage::new([3.0, 3.0, 3.0], 100.0), &free).fee, 0.0);
    }
}
