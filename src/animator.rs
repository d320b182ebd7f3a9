//! Frame-driven rotation animations for the digit wheels and the carry gears between them.
//!
//! Every wheel and every carry gear owns an [`AngleAnimator`]. Arming an idle animator records
//! where and when it starts and requests a frame from the [`FrameScheduler`]. Arming a running one
//! only pushes its target further: the clock is not restarted, so the same duration has to cover
//! the longer distance. The host drives everything by calling [`Animations::tick`] once per frame.

use std::collections::BTreeMap;

use crate::math::{ease_in_out, interpolate, progress};
use crate::rotation::RotationState;

/// Ticket for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

/// What a requested frame animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnimationTarget {
    Wheel(usize),
    /// Gear between wheel `i` and wheel `i + 1`
    CarryGear(usize),
}

/// Pending frame requests, served in request order.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_handle: u64,
    pending: BTreeMap<FrameHandle, AnimationTarget>,
}

impl FrameScheduler {
    /// Empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame for `target` and returns its ticket.
    pub fn request(&mut self, target: AnimationTarget) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(handle, target);
        handle
    }

    /// Returns false if the frame already ran or was never requested.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// Drops every pending frame and returns how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Number of frames waiting to run
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Hands over every frame requested so far. Frames requested while these run wait for the next
    /// call.
    pub fn take_due(&mut self) -> Vec<(FrameHandle, AnimationTarget)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPhase {
    Idle,
    Animating {
        start_angle: f64,
        start_time: f64,
        frame: FrameHandle,
    },
}

/// Eases one rotation towards its target
#[derive(Debug, Clone, PartialEq)]
pub struct AngleAnimator {
    rotation: RotationState,
    phase: AnimationPhase,
}

impl AngleAnimator {
    /// Idle animator resting at `baseline`
    pub fn new(baseline: f64) -> Self {
        AngleAnimator {
            rotation: RotationState::at(baseline),
            phase: AnimationPhase::Idle,
        }
    }

    /// Current and target angle
    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    /// Whether a run is in progress, and where it started
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, AnimationPhase::Animating { .. })
    }

    /// Moves the target by `delta`. Starts a new run only when idle; returns whether it did.
    pub fn arm(
        &mut self,
        delta: f64,
        now: f64,
        scheduler: &mut FrameScheduler,
        target: AnimationTarget,
    ) -> bool {
        self.rotation.target += delta;
        match self.phase {
            AnimationPhase::Animating { .. } => false,
            AnimationPhase::Idle => {
                self.phase = AnimationPhase::Animating {
                    start_angle: self.rotation.current,
                    start_time: now,
                    frame: scheduler.request(target),
                };
                true
            }
        }
    }

    /// Runs the frame `handle`. Returns true while the animation needs more frames. A handle that
    /// does not belong to the current run is ignored.
    pub fn step(
        &mut self,
        handle: FrameHandle,
        now: f64,
        duration: f64,
        scheduler: &mut FrameScheduler,
        target: AnimationTarget,
    ) -> bool {
        let AnimationPhase::Animating {
            start_angle,
            start_time,
            frame,
        } = self.phase
        else {
            return false;
        };
        if frame != handle {
            return true;
        }

        let elapsed = now - start_time;
        if elapsed >= duration {
            self.rotation.current = self.rotation.target;
            self.phase = AnimationPhase::Idle;
            return false;
        }

        let eased = ease_in_out(progress(elapsed, duration));
        self.rotation.current = interpolate(start_angle, self.rotation.target, eased);
        self.phase = AnimationPhase::Animating {
            start_angle,
            start_time,
            frame: scheduler.request(target),
        };
        true
    }

    /// Drops any pending frame and puts the rotation back to `baseline`.
    pub fn reset(&mut self, baseline: f64, scheduler: &mut FrameScheduler) {
        if let AnimationPhase::Animating { frame, .. } = self.phase {
            scheduler.cancel(frame);
        }
        self.phase = AnimationPhase::Idle;
        self.rotation = RotationState::at(baseline);
    }
}

/// All wheel and carry gear animators plus the scheduler that drives them.
#[derive(Debug)]
pub struct Animations {
    scheduler: FrameScheduler,
    wheels: Vec<AngleAnimator>,
    carry_gears: Vec<AngleAnimator>,
    duration: f64,
}

impl Animations {
    /// One animator per wheel and one per adjacent wheel pair, all at `baseline`.
    pub fn new(wheel_count: usize, baseline: f64, duration: f64) -> Self {
        Animations {
            scheduler: FrameScheduler::new(),
            wheels: vec![AngleAnimator::new(baseline); wheel_count],
            carry_gears: vec![AngleAnimator::new(baseline); wheel_count.saturating_sub(1)],
            duration,
        }
    }

    /// Animator for wheel `index`
    pub fn wheel(&self, index: usize) -> Option<&AngleAnimator> {
        self.wheels.get(index)
    }

    /// Animator for the gear between wheel `index` and the next one
    pub fn carry_gear(&self, index: usize) -> Option<&AngleAnimator> {
        self.carry_gears.get(index)
    }

    /// Pending frames
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.pending_count() > 0
    }

    /// Turns wheel `index` by `delta` and its carry gear, when it has one, by `-delta`.
    pub fn arm_wheel(&mut self, index: usize, delta: f64, now: f64) {
        let Some(wheel) = self.wheels.get_mut(index) else {
            return;
        };
        wheel.arm(
            delta,
            now,
            &mut self.scheduler,
            AnimationTarget::Wheel(index),
        );
        if let Some(gear) = self.carry_gears.get_mut(index) {
            gear.arm(
                -delta,
                now,
                &mut self.scheduler,
                AnimationTarget::CarryGear(index),
            );
        }
    }

    /// Runs every due frame once. Returns the targets that moved along with their new angle.
    pub fn tick(&mut self, now: f64) -> Vec<(AnimationTarget, f64)> {
        let mut moved = Vec::new();
        for (handle, target) in self.scheduler.take_due() {
            let animator = match target {
                AnimationTarget::Wheel(index) => self.wheels.get_mut(index),
                AnimationTarget::CarryGear(index) => self.carry_gears.get_mut(index),
            };
            let Some(animator) = animator else {
                continue;
            };
            let before = animator.rotation.current;
            animator.step(handle, now, self.duration, &mut self.scheduler, target);
            tracing::trace!(?target, angle = animator.rotation.current, "frame");
            if animator.rotation.current != before {
                moved.push((target, animator.rotation.current));
            }
        }
        moved
    }

    pub fn reset(&mut self, baseline: f64) {
        for animator in self.wheels.iter_mut().chain(self.carry_gears.iter_mut()) {
            animator.reset(baseline, &mut self.scheduler);
        }
        self.scheduler.cancel_all();
    }
}
