use crate::clock::{Clock, SystemClock};
use crate::controller::Pascaline;
use crate::events::PascalineEvent;
use crate::graphics::{
    draw_dial, draw_digit_strip, needle_angle, wheel_position, Canvas, Cell, Ink,
};
use crossterm::cursor::MoveTo;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Instant;

const MARGIN: isize = 2;
const COLUMN_WIDTH: isize = 12;
const SEPARATOR_WIDTH: isize = 2;
const RECENT_EVENTS: usize = 5;

const TITLE_ROW: isize = 0;
const DIAL_ROW: f64 = 4.0;
const DIAL_RADIUS: f64 = 2.0;
const GEAR_ROW: f64 = 7.0;
const GEAR_RADIUS: f64 = 1.0;
const STRIP_ROW: isize = 10;
const CARRY_ROW: isize = 12;
const LABEL_ROW: isize = 13;
const HELP_ROW: isize = 15;
const DEBUG_ROW: isize = 17;

/// What the run loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Continue,
    Quit,
}

/// Terminal view of a [`Pascaline`]: turns key presses into additions and draws the machine
pub struct PascalineWidget<C: Clock = SystemClock> {
    pascaline: Pascaline<C>,
    /// Show the debug overlay
    debug: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Latest carries and resets, newest last
    recent_events: Rc<RefCell<VecDeque<String>>>,
}

impl<C: Clock> PascalineWidget<C> {
    pub fn new(mut pascaline: Pascaline<C>) -> Self {
        let recent_events = Rc::new(RefCell::new(VecDeque::with_capacity(RECENT_EVENTS)));
        let sink = Rc::clone(&recent_events);
        pascaline.subscribe(move |event: &PascalineEvent| {
            if let Some(line) = describe(event) {
                let mut sink = sink.borrow_mut();
                if sink.len() == RECENT_EVENTS {
                    sink.pop_front();
                }
                sink.push_back(line);
            }
        });

        PascalineWidget {
            pascaline,
            debug: false,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            recent_events,
        }
    }

    pub fn pascaline(&self) -> &Pascaline<C> {
        &self.pascaline
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn recent_events(&self) -> Vec<String> {
        self.recent_events.borrow().iter().cloned().collect()
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> WidgetAction {
        if key.kind != KeyEventKind::Press {
            return WidgetAction::Continue;
        }
        match key.code {
            KeyCode::Esc => return WidgetAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return WidgetAction::Quit
            }
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch as usize - '1' as usize;
                self.pascaline.add_unit(index, 1);
            }
            KeyCode::Char('d' | 'D') => self.debug = !self.debug,
            KeyCode::Char('r' | 'R') => self.pascaline.reset(),
            KeyCode::Char('q' | 'Q') => return WidgetAction::Quit,
            _ => {}
        }
        WidgetAction::Continue
    }

    /// Advance the animations by one frame
    pub fn tick(&mut self) -> bool {
        self.pascaline.tick()
    }

    fn column_left(&self, index: usize) -> isize {
        let wheel_count = self.pascaline.wheel_count();
        let slot = (wheel_count - 1 - index) as isize;
        let gap = if index < self.pascaline.config().split_index {
            SEPARATOR_WIDTH
        } else {
            0
        };
        MARGIN + slot * COLUMN_WIDTH + gap
    }

    /// Draws the whole machine into an off-screen canvas
    pub fn compose(&self, width: usize, height: usize) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        let pascaline = &self.pascaline;
        let config = pascaline.config();
        let wheel_count = pascaline.wheel_count();

        canvas.text(MARGIN, TITLE_ROW, "PASCALINE", Ink::Highlight);
        canvas.text(
            MARGIN + 12,
            TITLE_ROW,
            &format!("Total: {}", pascaline.total()),
            Ink::Plain,
        );

        for index in 0..wheel_count {
            let left = self.column_left(index);
            let center_x = (left + COLUMN_WIDTH / 2) as f64;
            let Some(rotation) = pascaline.wheel_rotation(index) else {
                continue;
            };

            draw_dial(
                &mut canvas,
                [center_x, DIAL_ROW],
                DIAL_RADIUS,
                needle_angle(rotation.current, config.baseline_angle),
                Ink::Wheel,
                Ink::Highlight,
            );
            draw_digit_strip(
                &mut canvas,
                center_x as isize,
                STRIP_ROW,
                wheel_position(rotation.current, config.baseline_angle, config.unit_angle),
            );
            if pascaline.is_carry_active(index) {
                canvas.text(center_x as isize - 2, CARRY_ROW, "CARRY", Ink::Highlight);
            }
            if let Some(label) = pascaline.place_label(index) {
                let label = if index < 9 {
                    format!("[{}] {label}", index + 1)
                } else {
                    label
                };
                canvas.text(left + 1, LABEL_ROW, &label, Ink::Dim);
            }

            if let Some(gear) = pascaline.carry_gear_rotation(index) {
                let gear_x = (self.column_left(index + 1) + COLUMN_WIDTH + left) as f64 / 2.0;
                draw_dial(
                    &mut canvas,
                    [gear_x, GEAR_ROW],
                    GEAR_RADIUS,
                    needle_angle(gear.current, config.baseline_angle),
                    Ink::Gear,
                    Ink::Gear,
                );
            }
        }

        if config.split_index > 0 {
            let x = MARGIN + (wheel_count - config.split_index) as isize * COLUMN_WIDTH;
            canvas.put(x, STRIP_ROW, config.locale.decimal_separator, Ink::Highlight);
        }

        let last_key = wheel_count.min(9);
        canvas.text(
            MARGIN,
            HELP_ROW,
            &format!("1-{last_key}: add a unit   r: reset   d: debug   q: quit"),
            Ink::Dim,
        );

        if self.debug {
            self.compose_debug(&mut canvas);
        }
        canvas
    }

    fn compose_debug(&self, canvas: &mut Canvas) {
        let pascaline = &self.pascaline;
        let wheels: Vec<String> = (0..pascaline.wheel_count())
            .filter_map(|index| pascaline.wheel_rotation(index))
            .map(|rotation| format!("{:.1}", rotation.current))
            .collect();
        let gears: Vec<String> = (0..pascaline.wheel_count())
            .filter_map(|index| pascaline.carry_gear_rotation(index))
            .map(|rotation| format!("{:.1}", rotation.current))
            .collect();

        let mut lines = vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("FPS: {:.2}", self.fps),
            format!("Wheels: {}", wheels.join(" ")),
            format!("Gears: {}", gears.join(" ")),
            format!(
                "Pending frames: {}",
                pascaline.animations().scheduler().pending_count()
            ),
        ];
        lines.extend(self.recent_events.borrow().iter().cloned());

        for (row, line) in lines.iter().enumerate() {
            canvas.text(MARGIN, DEBUG_ROW + row as isize, line, Ink::Dim);
        }
    }

    /// Paint the machine to the terminal
    pub fn paint(&mut self, out: &mut impl Write, width: usize, height: usize) -> io::Result<()> {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let canvas = self.compose(width, height);
        queue!(out, Clear(ClearType::All))?;
        for (y, row) in canvas.rows().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            write_row(out, row)?;
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

fn write_row(out: &mut impl Write, row: &[Cell]) -> io::Result<()> {
    let mut ink = None;
    for cell in row {
        if ink != Some(cell.ink) {
            queue!(out, SetForegroundColor(ink_color(cell.ink)))?;
            ink = Some(cell.ink);
        }
        queue!(out, Print(cell.ch))?;
    }
    Ok(())
}

fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Plain => Color::White,
        Ink::Wheel => Color::Yellow,
        Ink::Gear => Color::DarkYellow,
        Ink::Highlight => Color::Green,
        Ink::Dim => Color::DarkGrey,
    }
}

fn describe(event: &PascalineEvent) -> Option<String> {
    match event {
        PascalineEvent::Carry { from, to, units } => {
            Some(format!("carry {units} from wheel {from} to wheel {to}"))
        }
        PascalineEvent::CarryLost { from, units } => {
            Some(format!("lost {units} past wheel {from}"))
        }
        PascalineEvent::Reset => Some("reset".to_string()),
        _ => None,
    }
}
