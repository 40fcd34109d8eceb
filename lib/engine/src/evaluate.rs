//! Static evaluation
//!
//! Scores a board for one color from four features: material, capture potential,
//! pawn advancement and pawn edge safety. Each feature compares the two sides as
//! `(own - other) / (1 + own + other)`, which keeps every term inside `(-1, 1)` before
//! weighting. The score for white is the exact negation of the score for black.

use crate::board::{Board, Color};
use crate::capture::captures_for_piece;
use crate::constant::{ADVANCE_WEIGHT, CAPTURE_WEIGHT, MATERIAL_WEIGHT, SAFETY_WEIGHT};

/// Weights applied to each normalized feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub material: f64,
    pub capture: f64,
    pub advance: f64,
    pub safety: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            material: MATERIAL_WEIGHT,
            capture: CAPTURE_WEIGHT,
            advance: ADVANCE_WEIGHT,
            safety: SAFETY_WEIGHT,
        }
    }
}

// 单方统计量
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Tally {
    pawns: f64,
    kings: f64,
    captures: f64,
    advance: f64,
    safety: f64,
}

impl Tally {
    fn material(&self) -> f64 {
        self.pawns + 2.0 * self.kings
    }
}

fn ratio(own: f64, other: f64) -> f64 {
    (own - other) / (1.0 + own + other)
}

// 离棋盘中心越远越安全：取到较远一侧边的行列距离，求斜边长度的一半并向下取整
fn edge_safety(length: usize, row: i32, col: i32) -> f64 {
    let last = length as i32 - 1;
    let r = row.max(last - row) as f64;
    let c = col.max(last - col) as f64;
    ((r * r + c * c).sqrt() / 2.0).floor()
}

fn tally(board: &Board) -> (Tally, Tally) {
    let length = board.length();
    let mut black = Tally::default();
    let mut white = Tally::default();
    for (pos, piece) in board.pieces() {
        let side = match piece.color {
            Color::Black => &mut black,
            Color::White => &mut white,
        };
        side.captures += captures_for_piece(board, pos, false)
            .iter()
            .map(|path| path.len() as f64)
            .sum::<f64>();
        if piece.is_king() {
            side.kings += 1.0;
        } else {
            side.pawns += 1.0;
            side.advance += match piece.color {
                Color::Black => (pos.row + 1) as f64,
                Color::White => (length as i32 - pos.row) as f64,
            };
            side.safety += edge_safety(length, pos.row, pos.col);
        }
    }
    (black, white)
}

/// Utility of `board` for `turn` with the default weights. Positive favors `turn`.
pub fn evaluate(board: &Board, turn: Color) -> f64 {
    evaluate_with(board, turn, &Weights::default())
}

pub fn evaluate_with(board: &Board, turn: Color, weights: &Weights) -> f64 {
    let (black, white) = tally(board);
    let (own, other) = match turn {
        Color::Black => (black, white),
        Color::White => (white, black),
    };
    weights.material * ratio(own.material(), other.material())
        + weights.capture * ratio(own.captures, other.captures)
        + weights.advance * ratio(own.advance, other.advance)
        + weights.safety * ratio(own.safety, other.safety)
}
