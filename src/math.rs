/// Eases animation progress: cubic in for the first half, quartic out for the second.
pub fn ease_in_out(progress: f64) -> f64 {
    if progress < 0.5 {
        4.0 * progress * progress * progress
    } else {
        1.0 - (-2.0 * progress + 2.0).powi(4) / 2.0
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `0.0..=1.0`
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Linear interpolation between two angles
pub fn interpolate(start: f64, target: f64, t: f64) -> f64 {
    start + (target - start) * t
}

/// Offset of a point at `angle_degrees` on a circle of `radius`, in screen space (y grows downwards,
/// 0° points right, angles turn clockwise).
pub fn polar_offset(angle_degrees: f64, radius: f64) -> [f64; 2] {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    [radius * cos, radius * sin]
}

/// Angle folded into `0.0..360.0`
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}
