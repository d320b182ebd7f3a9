//! A mechanical adding machine in the style of Pascal's calculator.
//!
//! A row of decimal wheels accumulates units and carries from one wheel to the next the way the
//! gears of the real machine do, while each wheel (and the carry gear beside it) eases its drawn
//! angle towards where the mechanism has put it. The engine knows nothing about drawing: a host
//! calls [`Pascaline::add_unit`], [`Pascaline::reset`] and, once per frame, [`Pascaline::tick`], then
//! reads angles and the formatted total back or listens for [`PascalineEvent`]s.

pub mod animator;
pub mod carry;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod events;
pub mod graphics;
pub mod logging;
pub mod math;
pub mod rotation;
pub mod state;
pub mod widget;

pub use animator::{AnimationTarget, Animations};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CarryMode, PascalineConfig};
pub use controller::Pascaline;
pub use display::Locale;
pub use error::{ConfigError, PascalineError};
pub use events::{PascalineEvent, PascalineObserver};
pub use rotation::RotationState;
pub use widget::{PascalineWidget, WidgetAction};
