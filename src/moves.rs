use std::fmt;

use crate::color::Color;
use crate::point::Point;

/// A stone of some color at a point, or a pass when `point` is `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    color: Color,
    point: Option<Point>,
}

impl Move {
    pub fn new(color: Color, point: Point) -> Self {
        Move {
            color,
            point: Some(point),
        }
    }

    pub fn pass(color: Color) -> Self {
        Move { color, point: None }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn point(&self) -> Option<Point> {
        self.point
    }

    pub fn is_pass(&self) -> bool {
        self.point.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(p) => write!(f, "{}{}", self.color, p),
            None => write!(f, "{} pass", self.color),
        }
    }
}

/// A list of moves. Sorting orders by color, then x, then y.
pub type MoveList = Vec<Move>;

/// Sort moves into canonical (color, x, y) order.
pub fn sort_moves(moves: &mut MoveList) {
    moves.sort_by_key(|m| (m.color, m.point.map(|p| (p.x, p.y))));
}

/// Build a sorted move list of one color from a set of points.
pub fn moves_of_color(color: Color, points: impl IntoIterator<Item = Point>) -> MoveList {
    let mut out: MoveList = points.into_iter().map(|p| Move::new(color, p)).collect();
    sort_moves(&mut out);
    out
}
