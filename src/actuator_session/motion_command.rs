/// A position in plotter units (millimetres on the reference hardware).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The drawable area, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        // A4 portrait
        Self::new(210.0, 297.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Pen up, travel to the point.
    MoveTo(Point),
    /// Pen down, draw a straight line to the point.
    LineTo(Point),
}

impl MotionCommand {
    #[cfg(test)]
    pub fn target(&self) -> Point {
        match self {
            MotionCommand::MoveTo(point) | MotionCommand::LineTo(point) => *point,
        }
    }
}
