use crate::math::{normalize_degrees, polar_offset};

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;

/// Colour role of a cell; the widget maps these to terminal colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Plain,
    Wheel,
    Gear,
    Highlight,
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub ink: Ink,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        ink: Ink::Plain,
    };
}

/// Grid of character cells drawn off-screen, then flushed to the terminal in one go
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sets one cell; anything outside the canvas is clipped.
    pub fn put(&mut self, x: isize, y: isize, ch: char, ink: Ink) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = Cell { ch, ink };
    }

    pub fn text(&mut self, x: isize, y: isize, text: &str, ink: Ink) {
        for (offset, ch) in text.chars().enumerate() {
            self.put(x + offset as isize, y, ch, ink);
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn row_text(&self, y: usize) -> String {
        self.rows()
            .nth(y)
            .map(|row| row.iter().map(|cell| cell.ch).collect())
            .unwrap_or_default()
    }
}

/// Draws a line between two cells using Bresenham's algorithm
pub fn draw_line(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    ch: char,
    ink: Ink,
) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        canvas.put(x0, y0, ch, ink);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Cell reached from `center` by going `radius` rows out at `angle_degrees`
fn cell_at(center: [f64; 2], angle_degrees: f64, radius: f64) -> [f64; 2] {
    let [dx, dy] = polar_offset(angle_degrees, radius);
    [center[0] + dx * CELL_ASPECT, center[1] + dy]
}

/// Draws a circle outline sampled every few degrees
pub fn draw_ring(canvas: &mut Canvas, center: [f64; 2], radius: f64, ch: char, ink: Ink) {
    for step in 0..36 {
        let [x, y] = cell_at(center, f64::from(step) * 10.0, radius);
        canvas.put(x.round() as isize, y.round() as isize, ch, ink);
    }
}

/// Angle a dial needle points at: straight up at the baseline, one unit clockwise per unit turned.
pub fn needle_angle(rotation: f64, baseline: f64) -> f64 {
    normalize_degrees(rotation - baseline - 90.0)
}

/// A ring with a needle from its centre at `needle_degrees`
pub fn draw_dial(
    canvas: &mut Canvas,
    center: [f64; 2],
    radius: f64,
    needle_degrees: f64,
    ring_ink: Ink,
    needle_ink: Ink,
) {
    draw_ring(canvas, center, radius, '·', ring_ink);
    let [x1, y1] = cell_at(center, needle_degrees, radius - 0.5);
    draw_line(canvas, center[0], center[1], x1, y1, '*', needle_ink);
    canvas.put(
        center[0].round() as isize,
        center[1].round() as isize,
        'o',
        needle_ink,
    );
}

/// Continuous wheel position in units turned since the baseline
pub fn wheel_position(rotation: f64, baseline: f64, unit_angle: f64) -> f64 {
    (rotation - baseline) / unit_angle
}

/// Draws the reading window of a wheel: the digit nearest the marker plus its neighbours above
/// and below, as they pass behind the window while the wheel turns.
pub fn draw_digit_strip(canvas: &mut Canvas, x: isize, y: isize, position: f64) {
    let center = position.round() as i64;
    for (row, offset) in [(-1, -1i64), (0, 0), (1, 1)] {
        let digit = (center + offset).rem_euclid(10) as u32;
        let ch = char::from_digit(digit, 10).unwrap_or('?');
        let ink = if offset == 0 { Ink::Highlight } else { Ink::Dim };
        canvas.put(x, y + row, ch, ink);
    }
    canvas.put(x - 2, y, '▶', Ink::Plain);
}
