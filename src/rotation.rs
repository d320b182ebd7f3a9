/// Rotation of a wheel or carry gear, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    /// Angle currently drawn
    pub current: f64,
    /// Angle the animation is heading for
    pub target: f64,
}

impl RotationState {
    pub fn at(angle: f64) -> Self {
        RotationState {
            current: angle,
            target: angle,
        }
    }
}
