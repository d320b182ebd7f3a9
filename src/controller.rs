//! The machine as a whole: wheel values, animations, carry indicators and the total readout.
//!
//! [`Pascaline::add_unit`] settles every carry before it returns, so the animation frames run by
//! [`Pascaline::tick`] only ever see a consistent machine.

use std::fmt;

use crate::animator::{AnimationTarget, Animations};
use crate::carry;
use crate::clock::{Clock, SystemClock};
use crate::config::PascalineConfig;
use crate::display::{format_total, place_label, total_units};
use crate::error::ConfigError;
use crate::events::{PascalineEvent, PascalineObserver};
use crate::rotation::RotationState;
use crate::state::WheelStore;

pub struct Pascaline<C: Clock = SystemClock> {
    config: PascalineConfig,
    store: WheelStore,
    animations: Animations,
    /// Time until which each wheel's carry indicator stays lit
    carry_flashes: Vec<Option<f64>>,
    total: String,
    clock: C,
    observers: Vec<Box<dyn PascalineObserver>>,
}

impl<C: Clock> Pascaline<C> {
    /// Builds a machine with every wheel at zero and every rotation at the baseline.
    pub fn new(config: PascalineConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let wheel_count = config.wheel_count;
        let store = WheelStore::new(wheel_count);
        let total = format_total(&store, config.split_index, &config.locale);
        Ok(Pascaline {
            animations: Animations::new(
                wheel_count,
                config.baseline_angle,
                config.animation_duration,
            ),
            carry_flashes: vec![None; wheel_count],
            store,
            total,
            clock,
            config,
            observers: Vec::new(),
        })
    }

    /// Registers an observer for every later event.
    pub fn subscribe(&mut self, observer: impl PascalineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: PascalineEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    /// Adds `amount` units to wheel `index`, carrying into the wheels above as needed. Indexes
    /// past the last wheel are ignored.
    pub fn add_unit(&mut self, index: usize, amount: u64) {
        if index >= self.wheel_count() {
            tracing::debug!(index, amount, "ignoring out-of-range wheel");
            return;
        }

        let cascade = carry::propagate(&mut self.store, index, amount, self.config.carry_mode);
        let now = self.clock.now();

        for step in &cascade.steps {
            let delta = step.amount as f64 * self.config.unit_angle;
            self.animations.arm_wheel(step.index, delta, now);
        }
        self.total = format_total(&self.store, self.config.split_index, &self.config.locale);

        for step in &cascade.steps {
            let value = self.store.value(step.index).unwrap_or_default();
            self.emit(PascalineEvent::WheelChanged {
                index: step.index,
                value,
                digit: (value % 10) as u8,
            });
            if step.carries == 0 || step.index + 1 >= self.wheel_count() {
                continue;
            }
            let to = step.index + 1;
            self.carry_flashes[to] = Some(now + self.config.carry_flash_duration);
            tracing::debug!(from = step.index, to, units = step.carries, "carry");
            self.emit(PascalineEvent::Carry {
                from: step.index,
                to,
                units: step.carries,
            });
        }

        if cascade.lost > 0 {
            let from = self.wheel_count() - 1;
            tracing::debug!(from, units = cascade.lost, "carry lost past the last wheel");
            self.emit(PascalineEvent::CarryLost {
                from,
                units: cascade.lost,
            });
        }

        self.emit(PascalineEvent::TotalChanged {
            total: self.total.clone(),
        });
    }

    /// Puts every wheel back to zero and drops all pending animation frames.
    pub fn reset(&mut self) {
        let cancelled = self.animations.scheduler().pending_count();
        self.animations.reset(self.config.baseline_angle);
        self.store.clear();
        self.carry_flashes.iter_mut().for_each(|flash| *flash = None);
        self.total = format_total(&self.store, self.config.split_index, &self.config.locale);
        tracing::debug!(cancelled, "reset");

        self.emit(PascalineEvent::Reset);
        self.emit(PascalineEvent::TotalChanged {
            total: self.total.clone(),
        });
    }

    /// Runs one animation frame. Returns true while any wheel or carry gear is still moving.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        for (target, angle) in self.animations.tick(now) {
            self.emit(PascalineEvent::RotationChanged { target, angle });
        }
        self.animations.is_animating()
    }

    /// Layout and timing the machine was built with
    pub fn config(&self) -> &PascalineConfig {
        &self.config
    }

    /// Wheel accumulators
    pub fn store(&self) -> &WheelStore {
        &self.store
    }

    /// Wheel and carry gear animators
    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    /// Number of digit wheels
    pub fn wheel_count(&self) -> usize {
        self.store.wheel_count()
    }

    /// Units accumulated on wheel `index`
    pub fn value(&self, index: usize) -> Option<u64> {
        self.store.value(index)
    }

    /// Digit wheel `index` shows
    pub fn digit(&self, index: usize) -> Option<u8> {
        self.store.digit(index)
    }

    /// Current and target angle of wheel `index`
    pub fn wheel_rotation(&self, index: usize) -> Option<RotationState> {
        self.animations.wheel(index).map(|wheel| wheel.rotation())
    }

    /// Current and target angle of the gear between wheel `index` and the next one
    pub fn carry_gear_rotation(&self, index: usize) -> Option<RotationState> {
        self.animations.carry_gear(index).map(|gear| gear.rotation())
    }

    /// Rotation of either kind of animated part
    pub fn rotation(&self, target: AnimationTarget) -> Option<RotationState> {
        match target {
            AnimationTarget::Wheel(index) => self.wheel_rotation(index),
            AnimationTarget::CarryGear(index) => self.carry_gear_rotation(index),
        }
    }

    /// Formatted total, e.g. `1.234,567`
    pub fn total(&self) -> &str {
        &self.total
    }

    /// Total in units of the least significant wheel
    pub fn total_units(&self) -> u128 {
        total_units(&self.store)
    }

    /// Label for the button feeding wheel `index`
    pub fn place_label(&self, index: usize) -> Option<String> {
        (index < self.wheel_count())
            .then(|| place_label(index, self.config.split_index, &self.config.locale))
    }

    /// Whether any frame is still pending
    pub fn is_animating(&self) -> bool {
        self.animations.is_animating()
    }

    /// Whether wheel `index` received a carry recently enough for its indicator to be lit
    pub fn is_carry_active(&self, index: usize) -> bool {
        let now = self.clock.now();
        matches!(self.carry_flashes.get(index), Some(Some(until)) if now < *until)
    }
}

impl<C: Clock> fmt::Debug for Pascaline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pascaline")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("animations", &self.animations)
            .field("total", &self.total)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CarryMode;
    use crate::display::Locale;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const BASELINE: f64 = 180.0;

    fn machine() -> (Pascaline<ManualClock>, ManualClock) {
        machine_with(PascalineConfig::default())
    }

    fn machine_with(config: PascalineConfig) -> (Pascaline<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let pascaline = Pascaline::new(config, clock.clone()).expect("valid config");
        (pascaline, clock)
    }

    fn record(pascaline: &mut Pascaline<ManualClock>) -> Rc<RefCell<Vec<PascalineEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        pascaline.subscribe(move |event: &PascalineEvent| sink.borrow_mut().push(event.clone()));
        events
    }

    fn carries_into(events: &[PascalineEvent], wheel: usize) -> u64 {
        events
            .iter()
            .filter_map(|event| match event {
                PascalineEvent::Carry { to, units, .. } if *to == wheel => Some(*units),
                _ => None,
            })
            .sum()
    }

    fn settle(pascaline: &mut Pascaline<ManualClock>, clock: &ManualClock) {
        while pascaline.tick() {
            clock.advance(16.0);
        }
    }

    fn digits(pascaline: &Pascaline<ManualClock>) -> Vec<u8> {
        pascaline.store().digits().collect()
    }

    #[test]
    fn starts_at_zero_and_baseline() {
        let (pascaline, _) = machine();
        assert_eq!(digits(&pascaline), vec![0; 6]);
        assert_eq!(pascaline.total(), "0,000");
        for index in 0..6 {
            assert_eq!(
                pascaline.wheel_rotation(index),
                Some(RotationState::at(BASELINE))
            );
        }
        for index in 0..5 {
            assert_eq!(
                pascaline.carry_gear_rotation(index),
                Some(RotationState::at(BASELINE))
            );
        }
        assert_eq!(pascaline.carry_gear_rotation(5), None);
    }

    #[test_case(0)]
    #[test_case(3)]
    #[test_case(7)]
    fn ten_units_return_to_the_same_digit_with_one_carry(start: u64) {
        let (mut pascaline, _) = machine();
        pascaline.add_unit(2, start);
        let events = record(&mut pascaline);

        for _ in 0..10 {
            pascaline.add_unit(2, 1);
        }

        assert_eq!(pascaline.digit(2), Some(start as u8));
        assert_eq!(carries_into(&events.borrow(), 3), 1);
        assert_eq!(pascaline.digit(3), Some(1));
    }

    #[test]
    fn carry_cascades_through_several_wheels() {
        let (mut pascaline, _) = machine();
        for index in 0..3 {
            pascaline.add_unit(index, 9);
        }
        assert_eq!(pascaline.total(), "0,999");

        pascaline.add_unit(0, 1);

        assert_eq!(digits(&pascaline), vec![0, 0, 0, 1, 0, 0]);
        assert_eq!(pascaline.total(), "1,000");
        assert!(pascaline.is_carry_active(1));
        assert!(pascaline.is_carry_active(3));
        assert!(!pascaline.is_carry_active(0));
    }

    #[test]
    fn carry_cascade_is_settled_before_any_frame() {
        let (mut pascaline, _) = machine();
        for index in 0..3 {
            pascaline.add_unit(index, 9);
        }
        let events = record(&mut pascaline);
        pascaline.add_unit(0, 1);

        let events = events.borrow();
        assert!(events
            .iter()
            .all(|event| !matches!(event, PascalineEvent::RotationChanged { .. })));
        assert_eq!(
            events.last(),
            Some(&PascalineEvent::TotalChanged {
                total: "1,000".to_string()
            })
        );
    }

    #[test]
    fn overflow_past_the_last_wheel_is_lost() {
        let (mut pascaline, _) = machine();
        pascaline.add_unit(5, 9);
        let events = record(&mut pascaline);
        pascaline.add_unit(5, 1);

        assert_eq!(pascaline.total(), "0,000");
        assert_eq!(pascaline.value(5), Some(10));
        assert!(events
            .borrow()
            .contains(&PascalineEvent::CarryLost { from: 5, units: 1 }));
    }

    #[test]
    fn out_of_range_index_changes_nothing() {
        let (mut pascaline, _) = machine();
        pascaline.add_unit(1, 4);
        let before_total = pascaline.total().to_string();
        let before_digits = digits(&pascaline);
        let events = record(&mut pascaline);

        pascaline.add_unit(6, 1);
        pascaline.add_unit(usize::MAX, 1);

        assert_eq!(pascaline.total(), before_total);
        assert_eq!(digits(&pascaline), before_digits);
        assert_eq!(pascaline.wheel_rotation(5), Some(RotationState::at(BASELINE)));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn reset_returns_everything_to_the_baseline() {
        let (mut pascaline, clock) = machine();
        for index in 0..6 {
            pascaline.add_unit(index, 1);
        }
        pascaline.add_unit(0, 9);
        clock.advance(100.0);
        pascaline.tick();
        assert!(pascaline.is_animating());

        let events = record(&mut pascaline);
        pascaline.reset();

        assert_eq!(digits(&pascaline), vec![0; 6]);
        assert_eq!(pascaline.total(), "0,000");
        assert!(!pascaline.is_animating());
        assert!(!pascaline.is_carry_active(1));
        for index in 0..6 {
            assert_eq!(
                pascaline.wheel_rotation(index),
                Some(RotationState::at(BASELINE))
            );
        }

        // no frame requested before the reset may still run
        clock.advance(100.0);
        assert!(!pascaline.tick());
        assert_eq!(pascaline.wheel_rotation(0), Some(RotationState::at(BASELINE)));
        assert_eq!(
            events.borrow().as_slice(),
            &[
                PascalineEvent::Reset,
                PascalineEvent::TotalChanged {
                    total: "0,000".to_string()
                }
            ]
        );

        pascaline.reset();
        assert_eq!(pascaline.total(), "0,000");
    }

    #[test]
    fn targets_accumulate_inside_and_outside_the_animation_window() {
        let (mut pascaline, clock) = machine();
        let presses = [0.0, 50.0, 120.0, 200.0, 340.0];
        for (pressed, at) in presses.iter().enumerate() {
            clock.set(*at);
            pascaline.add_unit(1, 1);
            pascaline.tick();
            let expected = BASELINE + 36.0 * (pressed as f64 + 1.0);
            assert_eq!(pascaline.wheel_rotation(1).map(|r| r.target), Some(expected));
        }

        // all presses landed within the first run, so it still ends 350 units after the first
        clock.set(350.0);
        assert!(!pascaline.tick());
        assert_eq!(
            pascaline.wheel_rotation(1),
            Some(RotationState::at(BASELINE + 180.0))
        );
    }

    #[test]
    fn carry_gear_target_mirrors_wheel_target() {
        let (mut pascaline, clock) = machine();
        for round in 0..25 {
            pascaline.add_unit(round % 4, 1);
            clock.advance(40.0);
            pascaline.tick();
            for index in 0..5 {
                let wheel = pascaline.wheel_rotation(index).map(|r| r.target);
                let gear = pascaline.carry_gear_rotation(index).map(|r| r.target);
                assert_eq!(gear, wheel.map(|target| BASELINE - (target - BASELINE)));
            }
        }
    }

    #[test]
    fn wheel_rests_on_its_digit_after_settling() {
        let (mut pascaline, clock) = machine();
        for _ in 0..12 {
            pascaline.add_unit(0, 1);
        }
        settle(&mut pascaline, &clock);
        let rotation = pascaline.wheel_rotation(0);
        assert_eq!(rotation, Some(RotationState::at(BASELINE + 12.0 * 36.0)));
        // the carried unit turned wheel 1 too
        assert_eq!(
            pascaline.wheel_rotation(1),
            Some(RotationState::at(BASELINE + 36.0))
        );
    }

    #[test]
    fn total_matches_digit_weights() {
        let (mut pascaline, _) = machine();
        let presses = [0, 0, 1, 3, 5, 5, 5, 2, 0, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 1, 0];
        for index in presses {
            pascaline.add_unit(index, 1);
        }
        let expected: u128 = digits(&pascaline)
            .iter()
            .enumerate()
            .map(|(index, &digit)| u128::from(digit) * 10u128.pow(index as u32))
            .sum();
        assert_eq!(pascaline.total_units(), expected);

        let parsed: u128 = pascaline
            .total()
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .expect("digits");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn carry_indicator_fades_after_the_flash() {
        let (mut pascaline, clock) = machine();
        pascaline.add_unit(0, 9);
        pascaline.add_unit(0, 1);
        assert!(pascaline.is_carry_active(1));
        clock.advance(799.0);
        assert!(pascaline.is_carry_active(1));
        clock.advance(1.0);
        assert!(!pascaline.is_carry_active(1));
    }

    #[test]
    fn rotation_events_follow_the_frames() {
        let (mut pascaline, clock) = machine();
        let events = record(&mut pascaline);
        pascaline.add_unit(5, 1);
        clock.advance(175.0);
        pascaline.tick();

        assert!(events.borrow().contains(&PascalineEvent::RotationChanged {
            target: AnimationTarget::Wheel(5),
            angle: BASELINE + 18.0,
        }));
        assert_eq!(
            pascaline.rotation(AnimationTarget::Wheel(5)),
            Some(RotationState {
                current: BASELINE + 18.0,
                target: BASELINE + 36.0
            })
        );
        assert_eq!(pascaline.rotation(AnimationTarget::CarryGear(5)), None);
    }

    #[test]
    fn generalized_mode_carries_multi_unit_additions() {
        let config = PascalineConfig {
            carry_mode: CarryMode::Generalized,
            ..Default::default()
        };
        let (mut pascaline, _) = machine_with(config);
        pascaline.add_unit(0, 7);
        pascaline.add_unit(0, 15);
        assert_eq!(pascaline.total(), "0,022");
        // the carried units turn wheel 1 by two steps
        assert_eq!(
            pascaline.wheel_rotation(1).map(|r| r.target),
            Some(BASELINE + 72.0)
        );
    }

    #[test]
    fn generalized_mode_accepts_the_largest_amount() {
        let (mut pascaline, _) = machine_with(PascalineConfig {
            carry_mode: CarryMode::Generalized,
            ..Default::default()
        });
        pascaline.add_unit(0, 1);
        pascaline.add_unit(0, u64::MAX);
        // 1 + 18446744073709551615 ends on 6 and carries 1844674407370955161 units
        assert_eq!(pascaline.digit(0), Some(6));
        assert_eq!(pascaline.digit(1), Some(1));
    }

    #[test]
    fn digit_keeps_counting_after_a_huge_addition() {
        let (mut pascaline, _) = machine();
        pascaline.add_unit(0, u64::MAX);
        assert_eq!(pascaline.digit(0), Some(5));
        pascaline.add_unit(0, 1);
        assert_eq!(pascaline.digit(0), Some(6));
        for _ in 0..9 {
            pascaline.add_unit(0, 1);
        }
        assert_eq!(pascaline.digit(0), Some(5));
    }

    #[test]
    fn reference_mode_drops_multi_unit_rollover() {
        let (mut pascaline, _) = machine();
        pascaline.add_unit(0, 7);
        pascaline.add_unit(0, 15);
        assert_eq!(pascaline.total(), "0,002");
    }

    #[test]
    fn english_layout_and_labels() {
        let config = PascalineConfig {
            wheel_count: 8,
            split_index: 2,
            locale: Locale::en_us(),
            ..Default::default()
        };
        let (mut pascaline, _) = machine_with(config);
        pascaline.add_unit(5, 1);
        pascaline.add_unit(0, 5);
        assert_eq!(pascaline.total(), "1,000.05");
        assert_eq!(pascaline.place_label(0).as_deref(), Some("+0.01"));
        assert_eq!(pascaline.place_label(7).as_deref(), Some("+100,000"));
        assert_eq!(pascaline.place_label(8), None);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PascalineConfig {
            split_index: 9,
            ..Default::default()
        };
        assert!(Pascaline::new(config, ManualClock::new()).is_err());
    }
}
