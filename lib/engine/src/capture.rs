//! Capture chain search
//!
//! Enumerates every maximal sequence of jumps one piece can make in a single turn. Each
//! speculative jump is taken through a [`BoardLease`], which records what the jump changed
//! and puts it back when the lease is dropped, so the board is restored on every exit path.

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::board::{Board, CapturePath, Piece, Position};

/// Information needed to undo one jump
struct JumpUndo {
    from: Position,
    over: Position,
    to: Position,
    moved: Piece,
    captured: Option<Piece>,
}

/// Exclusive use of the board while one speculative jump is applied.
///
/// The jump is undone when the lease goes out of scope.
pub(crate) struct BoardLease<'a> {
    board: &'a mut Board,
    undo: Option<JumpUndo>,
}

impl<'a> BoardLease<'a> {
    /// Moves the piece on `from` to `to`, promoting it if it reaches its far rank, and
    /// lifts the piece jumped over. Yields no lease if `from` is empty.
    pub(crate) fn jump(board: &'a mut Board, from: Position, to: Position) -> Option<Self> {
        let moved = board.remove(from)?;
        let over = from.midpoint(to);
        let captured = board.remove(over);
        let landed = if board.promotes(moved, to) {
            Piece::king(moved.color)
        } else {
            moved
        };
        board.place(to, landed);
        Some(BoardLease {
            board,
            undo: Some(JumpUndo {
                from,
                over,
                to,
                moved,
                captured,
            }),
        })
    }
}

impl Deref for BoardLease<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for BoardLease<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for BoardLease<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.board.remove(undo.to);
            self.board.set(undo.over, undo.captured);
            self.board.place(undo.from, undo.moved);
        }
    }
}

// 深度优先递归：当前格子再无可跳即为一条完整路径
fn extend(board: &mut Board, current: Position, path: &mut Vec<Position>, paths: &mut Vec<Vec<Position>>) {
    path.push(current);
    let jumps = board.jumps_for_piece(current, false);
    if jumps.is_empty() {
        paths.push(path.clone());
    } else {
        for to in jumps {
            if let Some(mut lease) = BoardLease::jump(board, current, to) {
                extend(&mut lease, to, path, paths);
            }
        }
    }
    path.pop();
}

/// Searches capture chains from `from` directly on `board`.
///
/// The board is mutated while the search runs and is identical to its entry state when
/// the call returns. With `sorted`, the finished paths are ordered by their coordinates.
pub fn search_path(board: &mut Board, from: Position, sorted: bool) -> Vec<CapturePath> {
    let mut found = vec![];
    extend(board, from, &mut vec![], &mut found);

    let mut paths: Vec<CapturePath> = found
        .into_iter()
        .filter_map(|positions| CapturePath::new(positions).ok())
        .collect();
    if sorted {
        paths.sort_by_cached_key(|path| path.positions().iter().map(|p| p.to_string()).collect::<Vec<_>>());
    }
    trace!(from = %from, count = paths.len(), "capture chains");
    paths
}

/// Every capture chain of the piece on `from`, searched on a private copy of the board.
pub fn captures_for_piece(board: &Board, from: Position, sorted: bool) -> Vec<CapturePath> {
    if board.piece_at(from).is_none() {
        return vec![];
    }
    let mut scratch = board.clone();
    search_path(&mut scratch, from, sorted)
}
