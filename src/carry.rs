//! Carry propagation between digit wheels.
//!
//! Adding to a wheel may roll it over from 9 to 0, which pushes a unit into the next more
//! significant wheel, which may roll over in turn. The cascade is walked as a loop over wheel
//! indexes so it never goes deeper than the wheel count.

use crate::config::CarryMode;
use crate::state::WheelStore;

/// One wheel touched while resolving an addition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelStep {
    pub index: usize,
    pub amount: u64,
    /// Digit shown before `amount` was added
    pub old_digit: u8,
    /// Units this wheel pushed into the next one (or lost off the top)
    pub carries: u64,
}

/// Everything an addition did to the store, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarryCascade {
    pub steps: Vec<WheelStep>,
    /// Units carried out of the most significant wheel
    pub lost: u64,
}

/// Adds `amount` to wheel `index` and resolves every resulting carry before returning.
///
/// An out-of-range `index` leaves the store untouched and yields an empty cascade.
pub fn propagate(
    store: &mut WheelStore,
    index: usize,
    amount: u64,
    mode: CarryMode,
) -> CarryCascade {
    let mut cascade = CarryCascade::default();
    let mut pending = Some((index, amount));

    while let Some((index, amount)) = pending.take() {
        let Some(old_digit) = store.digit(index) else {
            break;
        };
        let carries = mode.carries(old_digit, amount);
        store.add(index, amount);
        cascade.steps.push(WheelStep {
            index,
            amount,
            old_digit,
            carries,
        });

        if carries > 0 {
            if index + 1 < store.wheel_count() {
                pending = Some((index + 1, carries));
            } else {
                cascade.lost = carries;
            }
        }
    }

    cascade
}
