/*
 * 棋盘模块（Board 与棋子表示）
 *
 * 设计要点
 * - N×N 棋盘，行号 0 在上方，黑方从上方出发向下走，白方从下方出发向上走
 * - 棋子用 Option<Piece> 表示，None 表示空格；Piece = 颜色 + 兵/王
 * - Position 是内部 (row, col) 坐标，对外的文本形式为 "行字母 + 从 1 开始的列号"，如 a1、h8
 * - Move / CapturePath / Action 描述一次行动：单步斜走、连跳吃子
 *
 * 主要功能
 * - 初始化标准开局（任意偶数边长）
 * - 单个棋子的斜走 (moves_for_piece) 与单步跳吃 (jumps_for_piece) 生成
 *
 * 连跳搜索见 capture 模块，规则聚合见 rules 模块。
 */

use std::fmt;
use std::str::FromStr;

use crate::constant::{MAX_BOARD_LENGTH, MIN_BOARD_LENGTH};
use crate::error::{EngineError, Result};

// 下方两个斜向在前，上方两个斜向在后
const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn next(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Row on which a pawn of this color is promoted.
    pub fn promotion_row(&self, length: usize) -> i32 {
        match self {
            Color::Black => length as i32 - 1,
            Color::White => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::Black),
            "white" => Ok(Color::White),
            _ => Err(EngineError::UnknownColor(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Rank {
    Pawn,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub fn new(color: Color, rank: Rank) -> Self {
        Piece { color, rank }
    }
    pub fn pawn(color: Color) -> Self {
        Piece::new(color, Rank::Pawn)
    }
    pub fn king(color: Color) -> Self {
        Piece::new(color, Rank::King)
    }
    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }
    pub fn belong_to(&self, color: Color) -> bool {
        self.color == color
    }

    // 兵只能向前斜走，王四个方向都可以
    fn directions(&self) -> &'static [(i32, i32)] {
        match (self.rank, self.color) {
            (Rank::King, _) => &DIAGONALS,
            (Rank::Pawn, Color::Black) => &DIAGONALS[..2],
            (Rank::Pawn, Color::White) => &DIAGONALS[2..],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Position::new(self.row + d_row, self.col + d_col)
    }
    /// Cell jumped over when moving from `self` to `to`.
    pub fn midpoint(&self, to: Position) -> Self {
        Position::new((self.row + to.row) / 2, (self.col + to.col) / 2)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = char::from_u32('a' as u32 + self.row as u32).unwrap_or('?');
        write!(f, "{}{}", letter, self.col + 1)
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || EngineError::MalformedCoordinate(s.to_owned());
        let mut chars = s.chars();
        let row = match chars.next() {
            Some(c @ 'a'..='z') => c as i32 - 'a' as i32,
            _ => return Err(malformed()),
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let col: i32 = digits.parse().map_err(|_| malformed())?;
        if col < 1 {
            return Err(malformed());
        }
        Ok(Position::new(row, col - 1))
    }
}

// 按位置切分动作文本：每个坐标是一个行字母加若干数字，坐标之间夹一个分隔符。
// 行字母本身可能是 'x'，所以不能直接按分隔符 split
fn split_action(s: &str) -> Result<(Vec<Position>, Vec<char>)> {
    let invalid = || EngineError::InvalidAction(s.to_owned());
    let mut positions = vec![];
    let mut separators = vec![];
    let mut rest = s;
    loop {
        let mut chars = rest.char_indices();
        chars.next().ok_or_else(invalid)?;
        let end = chars
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        positions.push(rest[..end].parse()?);
        let mut tail = rest[end..].chars();
        match tail.next() {
            Some(separator) => {
                separators.push(separator);
                rest = tail.as_str();
            }
            None => break,
        }
    }
    Ok((positions, separators))
}

// 按坐标字符串的字典序排序，与对外展示一致
pub(crate) fn sort_by_coordinate(positions: &mut [Position]) {
    positions.sort_by_cached_key(|p| p.to_string());
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match split_action(s)? {
            (positions, separators) if separators == ['-'] => Ok(Move::new(positions[0], positions[1])),
            _ => Err(EngineError::InvalidAction(s.to_owned())),
        }
    }
}

/// A chain of jumps made by one piece in one turn. Always holds at least two positions.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CapturePath(Vec<Position>);

impl CapturePath {
    pub fn new(positions: Vec<Position>) -> Result<Self> {
        if positions.len() < 2 {
            let text = positions.iter().map(|p| p.to_string()).collect::<Vec<_>>().join("x");
            return Err(EngineError::InvalidAction(text));
        }
        Ok(CapturePath(positions))
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }
    pub fn start(&self) -> Position {
        self.0[0]
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Consecutive (from, to) pairs, one per jump.
    pub fn jumps(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }
}

impl fmt::Display for CapturePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pos) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("x")?;
            }
            write!(f, "{}", pos)?;
        }
        Ok(())
    }
}

impl FromStr for CapturePath {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let (positions, separators) = split_action(s)?;
        if separators.is_empty() || separators.iter().any(|&c| c != 'x') {
            return Err(EngineError::InvalidAction(s.to_owned()));
        }
        CapturePath::new(positions)
    }
}

/// One legal turn: a single step or a capture chain.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Move(Move),
    Capture(CapturePath),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(m) => m.fmt(f),
            Action::Capture(path) => path.fmt(f),
        }
    }
}

impl FromStr for Action {
    type Err = EngineError;

    // 分隔符决定类型：'-' 为斜走，'x' 为跳吃
    fn from_str(s: &str) -> Result<Self> {
        match split_action(s)?.1.first() {
            Some('-') => Ok(Action::Move(s.parse()?)),
            Some('x') => Ok(Action::Capture(s.parse()?)),
            _ => Err(EngineError::InvalidAction(s.to_owned())),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Board {
    length: usize,
    // 按行优先存放 length × length 个格子
    cells: Vec<Option<Piece>>,
}

impl Board {
    // 创建一个空棋盘
    pub fn new(length: usize) -> Result<Self> {
        if !(MIN_BOARD_LENGTH..=MAX_BOARD_LENGTH).contains(&length) {
            return Err(EngineError::Configuration(format!(
                "board length must be between {} and {}, got {}",
                MIN_BOARD_LENGTH, MAX_BOARD_LENGTH, length
            )));
        }
        Ok(Board {
            length,
            cells: vec![None; length * length],
        })
    }

    // 标准开局：黑方占上方 length/2-1 行，白方占下方 length/2-1 行，只放在深色格
    pub fn init(length: usize) -> Result<Self> {
        let mut board = Board::new(length)?;
        let init_rows = length / 2 - 1;
        for row in 0..init_rows {
            for col in ((row + 1) % 2..length).step_by(2) {
                board.place(Position::new(row as i32, col as i32), Piece::pawn(Color::Black));
            }
        }
        for row in length - init_rows..length {
            for col in ((row + 1) % 2..length).step_by(2) {
                board.place(Position::new(row as i32, col as i32), Piece::pawn(Color::White));
            }
        }
        Ok(board)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn in_board(&self, pos: Position) -> bool {
        let length = self.length as i32;
        pos.row >= 0 && pos.row < length && pos.col >= 0 && pos.col < length
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_board(pos) {
            Some(pos.row as usize * self.length + pos.col as usize)
        } else {
            None
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// True if `pos` is on the board and holds no piece.
    pub fn is_free(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i].is_none())
    }

    /// Overwrites the cell and returns its previous content. Off-board positions are ignored.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) -> Option<Piece> {
        let i = self.index(pos)?;
        std::mem::replace(&mut self.cells[i], piece)
    }

    pub fn place(&mut self, pos: Position, piece: Piece) -> Option<Piece> {
        self.set(pos, Some(piece))
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        let i = self.index(pos)?;
        self.cells[i].take()
    }

    /// Parses a coordinate and checks that it lies on this board.
    pub fn locate(&self, text: &str) -> Result<Position> {
        let pos: Position = text.parse()?;
        if !self.in_board(pos) {
            return Err(EngineError::MalformedCoordinate(text.to_owned()));
        }
        Ok(pos)
    }

    /// Occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        let length = self.length;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|piece| (Position::new((i / length) as i32, (i % length) as i32), piece))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    // 统计双方棋子数，返回 (黑, 白)
    pub fn count_pieces(&self) -> (usize, usize) {
        self.pieces().fold((0, 0), |(black, white), (_, piece)| match piece.color {
            Color::Black => (black + 1, white),
            Color::White => (black, white + 1),
        })
    }

    /// Whether `piece` landing on `to` is promoted to king.
    pub fn promotes(&self, piece: Piece, to: Position) -> bool {
        !piece.is_king() && to.row == piece.color.promotion_row(self.length)
    }

    // 单个棋子的斜走目标：一步之内、棋盘内、空格
    // 参数 sorted: 是否按坐标字符串排序
    pub fn moves_for_piece(&self, pos: Position, sorted: bool) -> Vec<Position> {
        let piece = match self.piece_at(pos) {
            Some(piece) => piece,
            None => return vec![],
        };
        let mut targets: Vec<Position> = piece
            .directions()
            .iter()
            .map(|&(d_row, d_col)| pos.offset(d_row, d_col))
            .filter(|&target| self.is_free(target))
            .collect();
        if sorted {
            sort_by_coordinate(&mut targets);
        }
        targets
    }

    // 单个棋子的单步跳吃目标：落点在棋盘内且为空，中间格是对方棋子
    // 参数 sorted: 是否按坐标字符串排序
    pub fn jumps_for_piece(&self, pos: Position, sorted: bool) -> Vec<Position> {
        let piece = match self.piece_at(pos) {
            Some(piece) => piece,
            None => return vec![],
        };
        let mut targets: Vec<Position> = piece
            .directions()
            .iter()
            .filter(|&&(d_row, d_col)| {
                let landing = pos.offset(2 * d_row, 2 * d_col);
                self.is_free(landing)
                    && self
                        .piece_at(pos.offset(d_row, d_col))
                        .is_some_and(|over| over.color != piece.color)
            })
            .map(|&(d_row, d_col)| pos.offset(2 * d_row, 2 * d_col))
            .collect();
        if sorted {
            sort_by_coordinate(&mut targets);
        }
        targets
    }
}
