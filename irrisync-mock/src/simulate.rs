use std::f64::consts::PI;

const MIN_TEMPERATURE: f64 = 14.0;
const DAY_SWING: f64 = 12.0;

/// Air temperature over a day, coolest before sunrise and warmest mid-afternoon.
pub fn simulated_temperature(day_fraction: f64) -> f32 {
    // Shift the peak from noon to 15:00.
    let radians = (day_fraction - 0.375) * 2.0 * PI;
    let celsius = MIN_TEMPERATURE + DAY_SWING * (radians.sin() + 1.0) / 2.0;

    ((celsius * 10.0).round() / 10.0) as f32
}

pub fn day_fraction(start: f64, elapsed_ms: u64) -> f64 {
    (start + elapsed_ms as f64 / 86_400_000.0).rem_euclid(1.0)
}
