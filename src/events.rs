use crate::animator::AnimationTarget;

/// Something a renderer may want to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum PascalineEvent {
    WheelChanged {
        index: usize,
        value: u64,
        digit: u8,
    },
    /// Wheel `from` rolled over and pushed `units` into wheel `to`
    Carry { from: usize, to: usize, units: u64 },
    /// The most significant wheel rolled over; the carry has nowhere to go
    CarryLost { from: usize, units: u64 },
    RotationChanged {
        target: AnimationTarget,
        angle: f64,
    },
    TotalChanged { total: String },
    Reset,
}

/// Receives every [`PascalineEvent`] in the order it happened.
pub trait PascalineObserver {
    fn on_event(&mut self, event: &PascalineEvent);
}

impl<F> PascalineObserver for F
where
    F: FnMut(&PascalineEvent),
{
    fn on_event(&mut self, event: &PascalineEvent) {
        self(event)
    }
}
