/**
 * 引擎核心库入口
 *
 * 说明
 * - board: 棋盘、棋子、坐标与动作的表示
 * - capture: 连跳路径搜索（借用棋盘并在返回前还原）
 * - rules: 合法动作、强制吃子、执行动作与胜负判定
 * - evaluate / search: 局面评估与极大极小、alpha-beta 搜索
 * - engine: 对外的行协议驱动
 */
pub mod board;
pub mod capture;
pub mod constant;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod rules;
pub mod search;
