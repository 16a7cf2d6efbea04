/// Bulk soil moisture with a delay between watering and what the probe sees.
///
/// Water from the pump first collects in a pending pool near the surface, then seeps into
/// the measured moisture exponentially with time constant `diffusion_ms`. Evaporation removes
/// moisture at a constant rate.
#[derive(Debug, Clone)]
pub struct SoilModel {
    moisture: f32,
    pending: f32,
    dry_rate_per_min: f32,
    watering_rate_per_s: f32,
    diffusion_ms: u32,
}

impl SoilModel {
    pub fn new(
        initial_moisture: f32,
        dry_rate_per_min: f32,
        watering_rate_per_s: f32,
        diffusion_ms: u32,
    ) -> Self {
        Self {
            moisture: initial_moisture.clamp(0.0, 100.0),
            pending: 0.0,
            dry_rate_per_min,
            watering_rate_per_s,
            diffusion_ms,
        }
    }

    /// Moisture in percent as the probe would measure it.
    pub fn moisture(&self) -> f32 {
        self.moisture
    }

    pub fn pending(&self) -> f32 {
        self.pending
    }

    pub fn advance(&mut self, dt_ms: u32, pump_on: bool) {
        let dt_s = dt_ms as f32 / 1000.0;

        if pump_on {
            self.pending += self.watering_rate_per_s * dt_s;
        }

        let absorbed = if self.diffusion_ms == 0 {
            self.pending
        } else {
            self.pending * (1.0 - (-(dt_ms as f32) / self.diffusion_ms as f32).exp())
        };
        self.pending -= absorbed;

        self.moisture = (self.moisture + absorbed - self.dry_rate_per_min * dt_s / 60.0)
            .clamp(0.0, 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soil_dries_without_water() {
        let mut soil = SoilModel::new(50.0, 6.0, 5.0, 1000);

        soil.advance(60_000, false);

        assert!((soil.moisture() - 44.0).abs() < 1e-3);
        assert_eq!(soil.pending(), 0.0);
    }

    #[test]
    fn test_watering_reaches_probe_with_delay() {
        let mut soil = SoilModel::new(20.0, 0.0, 10.0, 4000);

        soil.advance(1000, true);
        let right_after = soil.moisture();
        assert!(right_after < 23.0);
        assert!(soil.pending() > 7.0);

        for _ in 0..30 {
            soil.advance(1000, false);
        }
        assert!((soil.moisture() - 30.0).abs() < 0.1);
        assert!(soil.pending() < 0.1);
    }

    #[test]
    fn test_moisture_stays_in_range() {
        let mut soil = SoilModel::new(99.0, 0.0, 50.0, 0);
        soil.advance(1000, true);
        assert_eq!(soil.moisture(), 100.0);

        let mut soil = SoilModel::new(1.0, 600.0, 0.0, 0);
        soil.advance(1000, false);
        assert_eq!(soil.moisture(), 0.0);
    }
}
