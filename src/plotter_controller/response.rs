use crate::actuator_session::motion_command::{Bounds, MotionCommand, Point};
use std::f64::consts::TAU;

/// The shape drawn when a qualifying detection arrives: a circle
/// approximated by a closed polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleShape {
    pub center: Point,
    pub radius: f64,
    pub segments: usize,
}

impl Default for CircleShape {
    fn default() -> Self {
        Self {
            center: Point::new(100.0, 100.0),
            radius: 50.0,
            segments: 100,
        }
    }
}

impl CircleShape {
    pub fn fits(&self, bounds: Bounds) -> bool {
        self.radius > 0.0
            && bounds.contains(Point::new(self.center.x - self.radius, self.center.y - self.radius))
            && bounds.contains(Point::new(self.center.x + self.radius, self.center.y + self.radius))
    }

    pub fn program(&self) -> Vec<MotionCommand> {
        let Point { x: cx, y: cy } = self.center;
        let step = TAU / self.segments as f64;

        let mut program = Vec::with_capacity(self.segments + 2);
        program.push(MotionCommand::MoveTo(Point::new(cx + self.radius, cy)));
        program.extend((0..=self.segments).map(|i| {
            let angle = i as f64 * step;
            MotionCommand::LineTo(Point::new(
                cx + self.radius * angle.cos(),
                cy + self.radius * angle.sin(),
            ))
        }));
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_starts_with_travel_and_closes_the_loop() {
        let shape = CircleShape {
            center: Point::new(100.0, 100.0),
            radius: 50.0,
            segments: 4,
        };

        let program = shape.program();

        assert_eq!(program.len(), 6);
        assert_eq!(program[0], MotionCommand::MoveTo(Point::new(150.0, 100.0)));
        assert!(program[1..]
            .iter()
            .all(|c| matches!(c, MotionCommand::LineTo(_))));
        let last = program[5].target();
        assert!((last.x - 150.0).abs() < 1e-9);
        assert!((last.y - 100.0).abs() < 1e-9);
        let quarter = program[2].target();
        assert!((quarter.x - 100.0).abs() < 1e-9);
        assert!((quarter.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_point_lies_on_the_circle() {
        let shape = CircleShape::default();

        for command in shape.program() {
            let p = command.target();
            let distance = ((p.x - 100.0).powi(2) + (p.y - 100.0).powi(2)).sqrt();
            assert!((distance - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fits() {
        assert!(CircleShape::default().fits(Bounds::default()));
        assert!(!CircleShape {
            center: Point::new(20.0, 100.0),
            ..CircleShape::default()
        }
        .fits(Bounds::default()));
    }
}
