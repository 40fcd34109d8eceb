//! Rules engine
//!
//! Collects the legal actions of one color, enforces the mandatory capture rule, applies
//! actions to a board and decides when the game is over.

use tracing::debug;

use crate::board::{Action, Board, CapturePath, Color, Move, Piece, Position};
use crate::capture::captures_for_piece;
use crate::error::{EngineError, Result};

/// Legal actions of one color. `moves` is empty whenever `captures` is not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hints {
    pub moves: Vec<Move>,
    pub captures: Vec<CapturePath>,
}

impl Hints {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.captures.is_empty()
    }

    /// The actions to branch over: captures when any exist, otherwise moves.
    pub fn actions(&self) -> Vec<Action> {
        if self.captures.is_empty() {
            self.moves.iter().copied().map(Action::Move).collect()
        } else {
            self.captures.iter().cloned().map(Action::Capture).collect()
        }
    }

    pub fn contains(&self, action: &Action) -> bool {
        match action {
            Action::Move(m) => self.moves.contains(m),
            Action::Capture(path) => self.captures.contains(path),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Win(Color),
    Draw,
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Win(color) => color.fmt(f),
            GameResult::Draw => f.write_str("draw"),
        }
    }
}

// 所有 color 方棋子的斜走
pub fn get_all_moves(board: &Board, color: Color, sorted: bool) -> Vec<Move> {
    let mut moves: Vec<Move> = board
        .pieces()
        .filter(|(_, piece)| piece.belong_to(color))
        .flat_map(|(from, _)| {
            board
                .moves_for_piece(from, sorted)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect();
    if sorted {
        moves.sort_by_cached_key(|m| (m.from.to_string(), m.to.to_string()));
    }
    moves
}

/// Longer chains first, then by starting coordinate. Stable for equal keys.
pub fn sort_captures(captures: &mut [CapturePath]) {
    captures.sort_by_cached_key(|path| (std::cmp::Reverse(path.len()), path.start().to_string()));
}

// 所有 color 方棋子的连跳路径
pub fn get_all_captures(board: &Board, color: Color, sorted: bool) -> Vec<CapturePath> {
    let mut captures: Vec<CapturePath> = board
        .pieces()
        .filter(|(_, piece)| piece.belong_to(color))
        .flat_map(|(from, _)| captures_for_piece(board, from, sorted))
        .collect();
    if sorted {
        sort_captures(&mut captures);
    }
    captures
}

/// Legal actions for `color`. Simple moves are withheld while a capture is available.
pub fn get_hints(board: &Board, color: Color, sorted: bool) -> Hints {
    let captures = get_all_captures(board, color, sorted);
    if !captures.is_empty() {
        return Hints {
            moves: vec![],
            captures,
        };
    }
    Hints {
        moves: get_all_moves(board, color, sorted),
        captures,
    }
}

// 落子并在到达底线时升王
fn relocate(board: &mut Board, from: Position, to: Position, piece: Piece) {
    board.remove(from);
    let landed = if board.promotes(piece, to) {
        Piece::king(piece.color)
    } else {
        piece
    };
    board.place(to, landed);
}

/// Applies a single step if `m.to` is currently reachable from `m.from`.
pub fn apply_move(board: &mut Board, m: &Move) -> Result<()> {
    if !board.moves_for_piece(m.from, false).contains(&m.to) {
        return Err(EngineError::InvalidAction(m.to_string()));
    }
    let piece = board
        .piece_at(m.from)
        .ok_or_else(|| EngineError::InvalidAction(m.to_string()))?;
    relocate(board, m.from, m.to, piece);
    Ok(())
}

/// Applies a capture chain, re-validating each jump against the board as it changes.
///
/// The chain is replayed on a copy and only committed once every jump has been accepted,
/// so a rejected path leaves `board` untouched.
pub fn apply_capture(board: &mut Board, path: &CapturePath) -> Result<()> {
    let mut scratch = board.clone();
    for (from, to) in path.jumps() {
        if !scratch.jumps_for_piece(from, false).contains(&to) {
            debug!(path = %path, from = %from, to = %to, "rejected jump");
            return Err(EngineError::InvalidAction(path.to_string()));
        }
        let piece = scratch
            .piece_at(from)
            .ok_or_else(|| EngineError::InvalidAction(path.to_string()))?;
        scratch.remove(from.midpoint(to));
        relocate(&mut scratch, from, to, piece);
    }
    *board = scratch;
    Ok(())
}

pub fn apply_action(board: &mut Board, action: &Action) -> Result<()> {
    match action {
        Action::Move(m) => apply_move(board, m),
        Action::Capture(path) => apply_capture(board, path),
    }
}

/// Decides the result of the position.
///
/// A side without actions loses; both sides without actions is a draw. Otherwise a lone
/// king against a lone king is a draw and any other position goes to the larger army.
pub fn get_winner(board: &Board) -> GameResult {
    let black_stuck = get_hints(board, Color::Black, false).is_empty();
    let white_stuck = get_hints(board, Color::White, false).is_empty();
    match (black_stuck, white_stuck) {
        (false, true) => return GameResult::Win(Color::Black),
        (true, false) => return GameResult::Win(Color::White),
        (true, true) => return GameResult::Draw,
        (false, false) => {}
    }

    let (black, white) = board.count_pieces();
    let kings = |color: Color| {
        board
            .pieces()
            .filter(|(_, piece)| piece.belong_to(color) && piece.is_king())
            .count()
    };
    if black == 1 && white == 1 && kings(Color::Black) == 1 && kings(Color::White) == 1 {
        return GameResult::Draw;
    }
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => GameResult::Win(Color::Black),
        std::cmp::Ordering::Less => GameResult::Win(Color::White),
        std::cmp::Ordering::Equal => GameResult::Draw,
    }
}

pub fn is_game_finished(board: &Board) -> bool {
    get_hints(board, Color::Black, false).is_empty() || get_hints(board, Color::White, false).is_empty()
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::rules::*;

    fn pos(text: &str) -> Position {
        text.parse().unwrap()
    }

    #[test]
    fn test_initial_hints() {
        let board = Board::init(8).unwrap();
        let hints = get_hints(&board, Color::Black, true);
        assert_eq!(hints.moves.len(), 7);
        assert!(hints.captures.is_empty());
        assert_eq!(hints.moves[0].to_string(), "c2-d1");
        let white = get_hints(&board, Color::White, false);
        assert_eq!(white.moves.len(), 7);
        assert!(!is_game_finished(&board));
    }

    #[test]
    fn test_mandatory_capture() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("c3"), Piece::pawn(Color::Black));
        board.place(pos("d4"), Piece::pawn(Color::White));
        board.place(pos("a7"), Piece::pawn(Color::Black));
        assert!(!get_all_moves(&board, Color::Black, false).is_empty());
        let hints = get_hints(&board, Color::Black, false);
        assert!(hints.moves.is_empty());
        assert_eq!(hints.captures.len(), 1);
        assert_eq!(hints.actions(), vec!["c3xe5".parse::<Action>().unwrap()]);
    }

    #[test]
    fn test_sorted_captures() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("a4"), Piece::pawn(Color::Black));
        board.place(pos("b5"), Piece::pawn(Color::White));
        board.place(pos("d5"), Piece::pawn(Color::White));
        board.place(pos("b3"), Piece::pawn(Color::White));
        board.place(pos("a8"), Piece::pawn(Color::Black));
        board.place(pos("b7"), Piece::pawn(Color::White));
        let captures = get_all_captures(&board, Color::Black, true);
        let texts: Vec<String> = captures.iter().map(|c| c.to_string()).collect();
        assert_eq!(texts, ["a4xc6xe4", "a8xc6xe4", "a4xc2"]);
    }

    #[test]
    fn test_apply_move_promotes() {
        let mut board = Board::new(4).unwrap();
        board.place(pos("c2"), Piece::pawn(Color::Black));
        apply_move(&mut board, &"c2-d3".parse().unwrap()).unwrap();
        assert_eq!(board.piece_at(pos("d3")), Some(Piece::king(Color::Black)));
        assert_eq!(board.piece_at(pos("c2")), None);

        // 升王后四个方向都能走
        let mut board = Board::new(8).unwrap();
        board.place(pos("g4"), Piece::pawn(Color::Black));
        apply_move(&mut board, &"g4-h5".parse().unwrap()).unwrap();
        apply_move(&mut board, &"h5-g6".parse().unwrap()).unwrap();
        let targets: Vec<String> = board
            .moves_for_piece(pos("g6"), true)
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(targets, ["f5", "f7", "h5", "h7"]);
    }

    #[test]
    fn test_apply_move_rejects_illegal() {
        let mut board = Board::init(8).unwrap();
        let before = board.clone();
        for text in ["c2-b1", "c2-e4", "d1-e2", "f1-g2", "c2-c3"] {
            let result = apply_move(&mut board, &text.parse().unwrap());
            assert!(matches!(result, Err(EngineError::InvalidAction(_))), "{}", text);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_capture() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("a4"), Piece::pawn(Color::Black));
        board.place(pos("b5"), Piece::pawn(Color::White));
        board.place(pos("d5"), Piece::pawn(Color::White));
        board.place(pos("f5"), Piece::pawn(Color::White));
        apply_capture(&mut board, &"a4xc6xe4".parse().unwrap()).unwrap();
        assert_eq!(board.piece_at(pos("e4")), Some(Piece::pawn(Color::Black)));
        assert_eq!(board.piece_at(pos("b5")), None);
        assert_eq!(board.piece_at(pos("d5")), None);
        assert_eq!(board.piece_at(pos("f5")), Some(Piece::pawn(Color::White)));
        assert_eq!(board.count_pieces(), (1, 1));
    }

    #[test]
    fn test_apply_capture_promotes_on_landing() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("c3"), Piece::pawn(Color::White));
        board.place(pos("b4"), Piece::pawn(Color::Black));
        board.place(pos("b6"), Piece::pawn(Color::Black));
        apply_capture(&mut board, &"c3xa5xc7".parse().unwrap()).unwrap();
        assert_eq!(board.piece_at(pos("c7")), Some(Piece::king(Color::White)));
        assert_eq!(board.count_pieces(), (0, 1));
    }

    #[test]
    fn test_apply_capture_is_atomic() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("a4"), Piece::pawn(Color::Black));
        board.place(pos("b5"), Piece::pawn(Color::White));
        board.place(pos("d5"), Piece::pawn(Color::White));
        let before = board.clone();
        // 第一跳合法，第二跳非法
        let result = apply_capture(&mut board, &"a4xc6xa8".parse().unwrap());
        assert!(matches!(result, Err(EngineError::InvalidAction(_))));
        assert_eq!(board, before);
    }

    #[test]
    fn test_winner_by_blockade() {
        let mut board = Board::new(4).unwrap();
        board.place(pos("a2"), Piece::pawn(Color::Black));
        board.place(pos("d1"), Piece::pawn(Color::White));
        board.place(pos("d3"), Piece::pawn(Color::White));
        assert!(!is_game_finished(&board));

        // 白兵在第一行，无路可走
        let mut board = Board::new(4).unwrap();
        board.place(pos("c2"), Piece::pawn(Color::Black));
        board.place(pos("a1"), Piece::pawn(Color::White));
        board.place(pos("b2"), Piece::pawn(Color::Black));
        assert!(get_hints(&board, Color::White, false).is_empty());
        assert!(is_game_finished(&board));
        assert_eq!(get_winner(&board), GameResult::Win(Color::Black));
    }

    #[test]
    fn test_both_stuck_is_draw() {
        // 黑兵在最后一行不再前进，白兵在第一行
        let mut board = Board::new(4).unwrap();
        board.place(pos("d1"), Piece::pawn(Color::Black));
        board.place(pos("d3"), Piece::pawn(Color::Black));
        board.place(pos("a2"), Piece::pawn(Color::White));
        assert!(get_hints(&board, Color::Black, false).is_empty());
        assert!(get_hints(&board, Color::White, false).is_empty());
        assert!(is_game_finished(&board));
        assert_eq!(get_winner(&board), GameResult::Draw);
    }

    #[test]
    fn test_winner_by_material() {
        let mut board = Board::new(8).unwrap();
        board.place(pos("d4"), Piece::king(Color::Black));
        board.place(pos("h8"), Piece::king(Color::White));
        assert_eq!(get_winner(&board), GameResult::Draw);

        board.place(pos("a2"), Piece::pawn(Color::Black));
        assert_eq!(get_winner(&board), GameResult::Win(Color::Black));
        assert_eq!(GameResult::Win(Color::Black).to_string(), "black");
    }
}
