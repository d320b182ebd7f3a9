use crate::display::Locale;
use crate::error::ConfigError;

/// Largest wheel count whose total, in smallest units, still fits a `u128`.
pub const MAX_WHEELS: usize = 38;

/// How a wheel decides how many units to carry into its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarryMode {
    /// Carry one unit only when the old digit is 9 and exactly one unit is added.
    #[default]
    Reference,
    /// Carry `(old_digit + amount) / 10` units, for any amount.
    Generalized,
}

impl CarryMode {
    /// Number of units passed to the next wheel when `amount` lands on a wheel showing `old_digit`.
    pub fn carries(self, old_digit: u8, amount: u64) -> u64 {
        match self {
            CarryMode::Reference => u64::from(old_digit == 9 && amount == 1),
            CarryMode::Generalized => amount / 10 + (u64::from(old_digit) + amount % 10) / 10,
        }
    }
}

/// Machine layout and timing
#[derive(Debug, Clone, PartialEq)]
pub struct PascalineConfig {
    /// Number of digit wheels
    pub wheel_count: usize,
    /// Wheels below this index form the fractional part
    pub split_index: usize,
    /// Degrees turned per unit added
    pub unit_angle: f64,
    /// Angle every wheel and carry gear starts from
    pub baseline_angle: f64,
    /// Time an animation takes to reach its target
    pub animation_duration: f64,
    /// Time a carry indicator stays lit
    pub carry_flash_duration: f64,
    pub carry_mode: CarryMode,
    pub locale: Locale,
}

impl Default for PascalineConfig {
    fn default() -> Self {
        PascalineConfig {
            wheel_count: 6,
            split_index: 3,
            unit_angle: 36.0,
            baseline_angle: 180.0,
            animation_duration: 350.0,
            carry_flash_duration: 800.0,
            carry_mode: CarryMode::Reference,
            locale: Locale::es_es(),
        }
    }
}

impl PascalineConfig {
    /// Checks the layout and timings before a machine is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wheel_count == 0 {
            return Err(ConfigError::NoWheels);
        }
        if self.wheel_count > MAX_WHEELS {
            return Err(ConfigError::TooManyWheels {
                wheel_count: self.wheel_count,
                max: MAX_WHEELS,
            });
        }
        if self.split_index > self.wheel_count {
            return Err(ConfigError::SplitOutOfRange {
                split_index: self.split_index,
                wheel_count: self.wheel_count,
            });
        }
        if !self.animation_duration.is_finite() || self.animation_duration <= 0.0 {
            return Err(ConfigError::InvalidDuration(self.animation_duration));
        }
        if !self.carry_flash_duration.is_finite() || self.carry_flash_duration < 0.0 {
            return Err(ConfigError::InvalidFlashDuration(self.carry_flash_duration));
        }
        Ok(())
    }
}
