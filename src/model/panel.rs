//! Photovoltaic panel output with cosine misalignment loss.

use super::types::REFERENCE_IRRADIANCE_WM2;

/// Fraction of aligned output left after misalignment, `max(0, cos(error))`.
///
/// Errors of 90° or more yield exactly zero.
pub fn cosine_efficiency(angular_error_deg: f32) -> f32 {
    if angular_error_deg.abs() >= 90.0 {
        return 0.0;
    }
    angular_error_deg.to_radians().cos().max(0.0)
}

/// A panel rated at `capacity_w` under the reference irradiance.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    /// Rated output at 1000 W/m² and zero misalignment (W).
    pub capacity_w: f32,
}

impl Panel {
    pub fn new(capacity_w: f32) -> Self {
        Self {
            capacity_w: capacity_w.max(0.0),
        }
    }

    /// Electrical output (W, never negative).
    pub fn power_w(&self, irradiance_wm2: f32, angular_error_deg: f32) -> f32 {
        let aligned = irradiance_wm2.max(0.0) * (self.capacity_w / REFERENCE_IRRADIANCE_WM2);
        aligned * cosine_efficiency(angular_error_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_panel_delivers_rated_share() {
        let panel = Panel::new(250.0);
        assert_eq!(panel.power_w(1000.0, 0.0), 250.0);
        assert_eq!(panel.power_w(400.0, 0.0), 100.0);
    }

    #[test]
    fn ninety_degrees_or_more_is_zero() {
        let panel = Panel::new(250.0);
        assert_eq!(panel.power_w(1000.0, 90.0), 0.0);
        assert_eq!(panel.power_w(1000.0, 135.0), 0.0);
        assert_eq!(panel.power_w(1000.0, 180.0), 0.0);
    }

    #[test]
    fn cosine_loss_at_sixty_degrees_halves_output() {
        let panel = Panel::new(200.0);
        assert!((panel.power_w(1000.0, 60.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn negative_capacity_clamped() {
        let panel = Panel::new(-5.0);
        assert_eq!(panel.power_w(1000.0, 0.0), 0.0);
    }
}
