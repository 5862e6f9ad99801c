//! Wax actuator: deadband plus linear ramp from temperature differential to panel angle.

/// Passive wax linkage mapping the wax-over-air temperature differential to a panel angle.
///
/// Below the deadband the linkage does not move and the panel stays parked
/// at `-max_rotation_deg`. Above it, extension grows linearly over
/// `actuation_range_c` and sweeps the panel across the full
/// `[-max_rotation_deg, max_rotation_deg]` span.
#[derive(Debug, Clone, Copy)]
pub struct WaxActuator {
    /// Rotation limit either side of zenith (degrees).
    pub max_rotation_deg: f32,
    /// Differential the wax must exceed before the linkage moves (°C).
    pub deadband_c: f32,
    /// Differential above the deadband that drives full extension (°C).
    pub actuation_range_c: f32,
}

impl WaxActuator {
    pub fn new(max_rotation_deg: f32, deadband_c: f32, actuation_range_c: f32) -> Self {
        Self {
            max_rotation_deg: max_rotation_deg.abs(),
            deadband_c: deadband_c.max(0.0),
            actuation_range_c,
        }
    }

    /// Parked angle (minimum rotation limit).
    pub fn parked_angle_deg(&self) -> f32 {
        -self.max_rotation_deg
    }

    /// Extension fraction in `[0, 1]` for a given differential.
    pub fn extension(&self, differential_c: f32) -> f32 {
        if differential_c < self.deadband_c || self.actuation_range_c <= 0.0 {
            return 0.0;
        }
        ((differential_c - self.deadband_c) / self.actuation_range_c).clamp(0.0, 1.0)
    }

    /// Panel angle for the given wax and ambient temperatures.
    pub fn panel_angle_deg(&self, wax_temp_c: f32, ambient_temp_c: f32) -> f32 {
        let differential = wax_temp_c - ambient_temp_c;
        if differential < self.deadband_c {
            return self.parked_angle_deg();
        }
        let angle = -self.max_rotation_deg + self.extension(differential) * 2.0 * self.max_rotation_deg;
        angle.clamp(-self.max_rotation_deg, self.max_rotation_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuator() -> WaxActuator {
        WaxActuator::new(45.0, 10.0, 60.0)
    }

    #[test]
    fn parked_inside_deadband_regardless_of_margin() {
        let a = actuator();
        for diff in [-30.0, -5.0, 0.0, 5.0, 9.99] {
            assert_eq!(a.panel_angle_deg(30.0 + diff, 30.0), -45.0, "diff={diff}");
        }
    }

    #[test]
    fn deadband_edge_starts_ramp_at_parked_angle() {
        let a = actuator();
        assert_eq!(a.panel_angle_deg(40.0, 30.0), -45.0);
        assert!(a.panel_angle_deg(41.0, 30.0) > -45.0);
    }

    #[test]
    fn ramp_is_linear_and_clipped() {
        let a = actuator();
        // midpoint of the ramp faces the zenith
        assert!((a.panel_angle_deg(70.0, 30.0) - 0.0).abs() < 1e-4);
        assert!((a.panel_angle_deg(100.0, 30.0) - 45.0).abs() < 1e-4);
        assert_eq!(a.panel_angle_deg(200.0, 30.0), 45.0);
    }

    #[test]
    fn extension_bounds() {
        let a = actuator();
        assert_eq!(a.extension(0.0), 0.0);
        assert_eq!(a.extension(40.0), 0.5);
        assert_eq!(a.extension(500.0), 1.0);
    }

    #[test]
    fn zero_range_never_moves() {
        let a = WaxActuator::new(45.0, 10.0, 0.0);
        assert_eq!(a.panel_angle_deg(90.0, 20.0), -45.0);
    }
}
