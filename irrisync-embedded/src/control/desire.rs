use super::IrrigationConfig;

/// Sticky hysteresis between the low and high moisture thresholds.
///
/// At or below `low_threshold` the plant wants water, at or above `high_threshold` it does
/// not, and in between the previous answer holds.
pub fn evaluate_desire(humidity: u8, wants_water: bool, config: &IrrigationConfig) -> bool {
    if humidity <= config.low_threshold {
        true
    } else if humidity >= config.high_threshold {
        false
    } else {
        wants_water
    }
}
