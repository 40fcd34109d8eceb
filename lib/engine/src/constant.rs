use crate::board::{Color, Piece, Rank};
use std::{collections::HashMap, sync::LazyLock};

pub const MIN_BOARD_LENGTH: usize = 2;
// 行号用字母表示，a..z
pub const MAX_BOARD_LENGTH: usize = 26;
pub const DEFAULT_BOARD_LENGTH: usize = 8;

pub const DEFAULT_DEPTH: u32 = 6;
// 无子可走时的哨兵估值
pub const PASS_VALUE: f64 = -1.0;

pub const MATERIAL_WEIGHT: f64 = 3.125;
pub const CAPTURE_WEIGHT: f64 = 1.0417;
pub const ADVANCE_WEIGHT: f64 = 1.429;
pub const SAFETY_WEIGHT: f64 = 5.263;

pub static GLYPH_MAP: LazyLock<HashMap<char, Piece>> = LazyLock::new(|| {
    HashMap::from([
        ('b', Piece::new(Color::Black, Rank::Pawn)),
        ('w', Piece::new(Color::White, Rank::Pawn)),
        ('B', Piece::new(Color::Black, Rank::King)),
        ('W', Piece::new(Color::White, Rank::King)),
    ])
});
