//! Go board engine.
//!
//! A square grid of [`Color`]s plus the active ko point. Stones enter the
//! board either through [`Board::place_stone`], which enforces captures,
//! suicide and ko, or through [`Board::set_placements`], which writes setup
//! stones without any rules.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use tracing::trace;

use crate::color::Color;
use crate::error::{Error, MoveError, Result};
use crate::moves::{Move, MoveList, moves_of_color, sort_moves};
use crate::point::Point;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Color>,
    /// Most recent single-stone capture. Always an empty intersection.
    ko: Option<Point>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Color::Empty; size * size],
            ko: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        let s = self.size as i32;
        p.x >= 0 && p.y >= 0 && p.x < s && p.y < s
    }

    fn idx(&self, p: Point) -> usize {
        p.y as usize * self.size + p.x as usize
    }

    /// Color at `p`, or `None` off the board.
    pub fn get(&self, p: Point) -> Option<Color> {
        if !self.in_bounds(p) {
            return None;
        }
        Some(self.cells[self.idx(p)])
    }

    fn set(&mut self, p: Point, color: Color) {
        let i = self.idx(p);
        self.cells[i] = color;
    }

    fn neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        [
            Point::new(p.x - 1, p.y),
            Point::new(p.x + 1, p.y),
            Point::new(p.x, p.y - 1),
            Point::new(p.x, p.y + 1),
        ]
        .into_iter()
        .filter(|n| self.in_bounds(*n))
    }

    /// Play a move, returning the opponent stones it captured.
    ///
    /// A pass places nothing and clears ko. On any error the board is left
    /// exactly as it was.
    pub fn place_stone(&mut self, mv: &Move) -> Result<MoveList> {
        let color = mv.color();
        let Some(pt) = mv.point() else {
            self.ko = None;
            return Ok(MoveList::new());
        };
        if color == Color::Empty {
            return Ok(MoveList::new());
        }
        if !self.in_bounds(pt) {
            return Err(MoveError::OutOfBounds {
                point: pt,
                size: self.size,
            }
            .into());
        }
        if self.get(pt) != Some(Color::Empty) {
            return Err(MoveError::Occupied(pt).into());
        }

        self.set(pt, color);

        let opp = color.opposite();
        let mut captures: HashSet<Point> = HashSet::new();
        let adjacent: Vec<Point> = self.neighbors(pt).collect();
        for n in adjacent {
            if self.get(n) != Some(opp) || captures.contains(&n) {
                continue;
            }
            if let Some(group) = self.captured_group(n) {
                captures.extend(group);
            }
        }

        if captures.is_empty() && self.captured_group(pt).is_some() {
            self.set(pt, Color::Empty);
            return Err(MoveError::Suicide(pt).into());
        }

        let single = if captures.len() == 1 {
            captures.iter().next().copied()
        } else {
            None
        };
        if single.is_some() && self.ko == Some(pt) {
            self.set(pt, Color::Empty);
            return Err(MoveError::Ko(pt).into());
        }
        self.ko = single;

        for &c in &captures {
            self.set(c, Color::Empty);
        }
        if !captures.is_empty() {
            trace!(%mv, captured = captures.len(), "captured stones");
        }
        Ok(moves_of_color(opp, captures))
    }

    /// Breadth-first search of the group containing `seed`.
    ///
    /// Returns the group's points if it has no liberties, or `None` as soon
    /// as an empty neighbor turns up.
    fn captured_group(&self, seed: Point) -> Option<Vec<Point>> {
        let color = self.get(seed)?;
        if color == Color::Empty {
            return None;
        }
        let mut visited = vec![false; self.size * self.size];
        let mut queue = VecDeque::from([seed]);
        let mut group = Vec::new();
        visited[self.idx(seed)] = true;

        while let Some(p) = queue.pop_front() {
            group.push(p);
            for n in self.neighbors(p) {
                let i = self.idx(n);
                match self.cells[i] {
                    Color::Empty => return None,
                    c if c == color && !visited[i] => {
                        visited[i] = true;
                        queue.push_back(n);
                    }
                    _ => {}
                }
            }
        }
        Some(group)
    }

    /// Write setup stones with no legality checks. Passes are skipped.
    ///
    /// Every point is bounds-checked before anything is written, so an error
    /// leaves the board untouched.
    pub fn set_placements(&mut self, moves: &[Move]) -> Result<()> {
        if let Some(pt) = moves
            .iter()
            .filter_map(Move::point)
            .find(|&pt| !self.in_bounds(pt))
        {
            return Err(MoveError::OutOfBounds {
                point: pt,
                size: self.size,
            }
            .into());
        }
        for mv in moves {
            let Some(pt) = mv.point() else { continue };
            self.set(pt, mv.color());
            if self.ko == Some(pt) && mv.color() != Color::Empty {
                self.ko = None;
            }
        }
        Ok(())
    }

    /// Like [`Board::set_placements`], then reject any group left without
    /// liberties. On failure the board is left as it was.
    pub fn set_placements_strict(&mut self, moves: &[Move]) -> Result<()> {
        let mut next = self.clone();
        next.set_placements(moves)?;

        let mut dead: HashSet<Point> = HashSet::new();
        for mv in moves {
            let Some(pt) = mv.point() else { continue };
            if dead.contains(&pt) {
                continue;
            }
            if let Some(group) = next.captured_group(pt) {
                dead.extend(group);
            }
        }
        if dead.is_empty() {
            *self = next;
            return Ok(());
        }
        let mut points: Vec<Point> = dead.into_iter().collect();
        points.sort();
        Err(Error::InvalidBoardState(points))
    }

    /// Copy of the grid, indexed `[y][x]`.
    pub fn full_board_state(&self) -> Vec<Vec<Color>> {
        self.cells
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Every stone on the board, sorted.
    pub fn stone_state(&self) -> MoveList {
        let mut out = MoveList::new();
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                let p = Point::new(x, y);
                let c = self.cells[self.idx(p)];
                if c != Color::Empty {
                    out.push(Move::new(c, p));
                }
            }
        }
        sort_moves(&mut out);
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size as i32 {
            let row: Vec<String> = (0..self.size as i32)
                .map(|x| {
                    let p = Point::new(x, y);
                    if self.ko == Some(p) {
                        "*".to_string()
                    } else {
                        self.cells[self.idx(p)].as_char().to_string()
                    }
                })
                .collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}
