/*
 * Search Module - 对抗搜索
 *
 * 在规则引擎给出的合法动作上做定深搜索：
 * - GameState 持有独立的棋盘副本，兄弟分支互不影响
 * - 极大极小与 alpha-beta 共用同一套分支逻辑，后者只多出剪枝
 * - 有吃子时只在吃子路径上分支（强制吃子）
 * - 叶子节点一律从发起搜索的一方来评估
 */

use tracing::debug;

use crate::board::{Action, Board, Color};
use crate::constant::{DEFAULT_DEPTH, PASS_VALUE};
use crate::error::{EngineError, Result};
use crate::evaluate::{evaluate_with, Weights};
use crate::rules::{apply_action, get_hints};

/// 搜索算法
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

/// 搜索参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    /// 最大搜索层数（半回合），至少为 1
    pub max_depth: u32,
    pub algorithm: Algorithm,
    pub weights: Weights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: DEFAULT_DEPTH,
            algorithm: Algorithm::AlphaBeta,
            weights: Weights::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(EngineError::Configuration("search depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// 搜索树中的一个节点：棋盘快照、轮到哪一方、距根的层数
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub depth: u32,
}

impl GameState {
    pub fn new(board: Board, turn: Color) -> Self {
        GameState { board, turn, depth: 0 }
    }

    /// 当前行动方可分支的动作，按生成顺序；有吃子时只有吃子
    pub fn actions(&self) -> Vec<Action> {
        get_hints(&self.board, self.turn, false).actions()
    }

    /// 未到终局时返回可分支的动作；到达深度上限或无棋可走即为终局
    pub fn branches(&self, max_depth: u32) -> Option<Vec<Action>> {
        if self.depth >= max_depth {
            return None;
        }
        let actions = self.actions();
        if actions.is_empty() {
            None
        } else {
            Some(actions)
        }
    }

    pub fn is_terminal(&self, max_depth: u32) -> bool {
        self.branches(max_depth).is_none()
    }

    /// 在新的棋盘副本上执行动作，换边并加深一层
    pub fn transition(&self, action: &Action) -> Result<GameState> {
        let mut board = self.board.clone();
        apply_action(&mut board, action)?;
        Ok(GameState {
            board,
            turn: self.turn.next(),
            depth: self.depth + 1,
        })
    }
}

/// 根节点的搜索结果；`action` 为空表示无棋可走（弃权）
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub action: Option<Action>,
    pub value: f64,
}

impl SearchOutcome {
    fn pass() -> Self {
        SearchOutcome {
            action: None,
            value: PASS_VALUE,
        }
    }
}

/// AI搜索状态
pub struct SearchState {
    /// 叶子节点评估次数
    pub counter: u64,
    /// 节点展开次数
    pub gen_counter: u64,
    /// 剪枝次数
    pub cutoffs: u64,
    config: SearchConfig,
    /// 发起搜索的一方
    perspective: Color,
}

impl SearchState {
    pub fn new(config: SearchConfig, perspective: Color) -> Result<Self> {
        config.validate()?;
        Ok(SearchState {
            counter: 0,
            gen_counter: 0,
            cutoffs: 0,
            config,
            perspective,
        })
    }

    fn prune(&self) -> bool {
        self.config.algorithm == Algorithm::AlphaBeta
    }

    fn expand(&mut self, state: &GameState) -> Option<Vec<Action>> {
        self.gen_counter += 1;
        state.branches(self.config.max_depth)
    }

    fn leaf(&mut self, state: &GameState) -> f64 {
        self.counter += 1;
        evaluate_with(&state.board, self.perspective, &self.config.weights)
    }

    fn max_value(&mut self, state: &GameState, mut alpha: f64, beta: f64) -> Result<f64> {
        let Some(actions) = self.expand(state) else {
            return Ok(self.leaf(state));
        };
        let mut v = f64::NEG_INFINITY;
        for action in &actions {
            let child = state.transition(action)?;
            v = v.max(self.min_value(&child, alpha, beta)?);
            if self.prune() && v >= beta {
                self.cutoffs += 1;
                return Ok(v);
            }
            alpha = alpha.max(v);
        }
        Ok(v)
    }

    fn min_value(&mut self, state: &GameState, alpha: f64, mut beta: f64) -> Result<f64> {
        let Some(actions) = self.expand(state) else {
            return Ok(self.leaf(state));
        };
        let mut v = f64::INFINITY;
        for action in &actions {
            let child = state.transition(action)?;
            v = v.min(self.max_value(&child, alpha, beta)?);
            if self.prune() && v <= alpha {
                self.cutoffs += 1;
                return Ok(v);
            }
            beta = beta.min(v);
        }
        Ok(v)
    }

    /// 根节点不剪枝：每个动作都以完整窗口求值，取第一个严格最大者
    pub fn search(&mut self, root: &GameState) -> Result<SearchOutcome> {
        if root.is_terminal(self.config.max_depth) {
            debug!(turn = %root.turn, "no action at root, passing");
            return Ok(SearchOutcome::pass());
        }
        self.gen_counter += 1;
        let actions = root.actions();

        let mut best = SearchOutcome::pass();
        let mut best_value = f64::NEG_INFINITY;
        for action in actions {
            let child = root.transition(&action)?;
            let value = self.min_value(&child, f64::NEG_INFINITY, f64::INFINITY)?;
            debug!(action = %action, value, "root action");
            if best.action.is_none() || value > best_value {
                best_value = value;
                best = SearchOutcome {
                    action: Some(action),
                    value,
                };
            }
        }

        debug!(
            algorithm = ?self.config.algorithm,
            depth = self.config.max_depth,
            leaves = self.counter,
            generated = self.gen_counter,
            cutoffs = self.cutoffs,
            value = best.value,
            "search finished"
        );
        Ok(best)
    }
}

/// 使用给定参数为 `color` 搜索
pub fn search(board: &Board, color: Color, config: SearchConfig) -> Result<SearchOutcome> {
    let mut state = SearchState::new(config, color)?;
    state.search(&GameState::new(board.clone(), color))
}

pub fn minimax_search(board: &Board, color: Color, max_depth: u32) -> Result<SearchOutcome> {
    search(
        board,
        color,
        SearchConfig {
            max_depth,
            algorithm: Algorithm::Minimax,
            ..SearchConfig::default()
        },
    )
}

pub fn alpha_beta_search(board: &Board, color: Color, max_depth: u32) -> Result<SearchOutcome> {
    search(
        board,
        color,
        SearchConfig {
            max_depth,
            algorithm: Algorithm::AlphaBeta,
            ..SearchConfig::default()
        },
    )
}

/// Picks the action for `color` with a depth 6 alpha-beta search. `None` means pass.
pub fn get_next_move(board: &Board, color: Color) -> Result<Option<Action>> {
    Ok(alpha_beta_search(board, color, DEFAULT_DEPTH)?.action)
}
