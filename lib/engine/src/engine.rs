/* 引擎核心：对接棋盘、规则与搜索，提供行协议接口 */
use std::io::{self, BufRead, Write};

use regex::Regex;
use tracing::{info, warn};

use crate::board::{Action, Board, Color};
use crate::constant::{DEFAULT_BOARD_LENGTH, DEFAULT_DEPTH, GLYPH_MAP};
use crate::error::{EngineError, Result};
use crate::rules::{apply_action, get_hints, get_winner, is_game_finished};
use crate::search::{search, SearchConfig};

// 协议引擎
pub struct CheckersEngine {
    pub board: Board,
    pub turn: Color,
    pub config: SearchConfig,
}

// 校验动作属于当前行动方的合法集合（含强制吃子），然后执行
fn play_on(board: &mut Board, turn: Color, text: &str) -> Result<()> {
    let action: Action = text.parse()?;
    if !get_hints(board, turn, false).contains(&action) {
        return Err(EngineError::InvalidAction(text.to_string()));
    }
    apply_action(board, &action)
}

fn list_line<T: ToString>(head: &str, items: &[T]) -> String {
    std::iter::once(head.to_string())
        .chain(items.iter().map(|it| it.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

impl CheckersEngine {
    pub fn new() -> Result<Self> {
        Ok(CheckersEngine {
            board: Board::init(DEFAULT_BOARD_LENGTH)?,
            turn: Color::Black,
            config: SearchConfig::default(),
        })
    }

    /// 从标准输入逐行读取命令，直到 `quit` 或输入结束
    pub fn start(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim() == "quit" {
                break;
            }
            match self.handle(&line) {
                Ok(lines) => {
                    for line in lines {
                        writeln!(stdout, "{line}")?;
                    }
                }
                Err(e) => {
                    warn!(command = %line, error = %e, "command failed");
                    writeln!(stdout, "error {e}")?;
                }
            }
            stdout.flush()?;
        }
        Ok(())
    }

    /// Runs one protocol line and returns the response lines.
    pub fn handle(&mut self, line: &str) -> Result<Vec<String>> {
        let line = line.trim();
        let mut token = line.splitn(2, ' ');
        let cmd = token.next().unwrap_or_default();
        let param = token.next().unwrap_or_default().trim();
        match cmd {
            "" | "quit" => Ok(vec![]),
            "checkers" => Ok(self.info()),
            "isready" => Ok(self.is_ready()),
            "position" => self.position(param).map(|_| vec![]),
            "hints" => Ok(self.hints()),
            "play" => self.play(param).map(|_| vec![]),
            "go" => self.go(param),
            "result" => Ok(self.result()),
            _ => Err(EngineError::UnknownCommand(line.to_string())),
        }
    }

    pub fn info(&self) -> Vec<String> {
        vec![
            format!("id name rs-checkers {}", env!("CARGO_PKG_VERSION")),
            format!("option depth type spin default {DEFAULT_DEPTH}"),
            "checkersok".to_string(),
        ]
    }

    pub fn is_ready(&self) -> Vec<String> {
        vec!["readyok".to_string()]
    }

    /// `[size N] (startpos|empty) [pieces <glyph><coord>...] [turn black|white] [moves <action>...]`
    ///
    /// The new position only replaces the current one if every part of the line is accepted.
    pub fn position(&mut self, param: &str) -> Result<()> {
        let regex = Regex::new(
            r#"^(?:size (?P<size>\d+) )?(?:(?P<startpos>startpos)|(?P<empty>empty))(?: pieces (?P<pieces>[bwBW][a-z]\d+(?: [bwBW][a-z]\d+)*))?(?: turn (?P<turn>\w+))?(?: moves (?P<moves>\S+(?: \S+)*))?$"#,
        )
        .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let captures = regex
            .captures(param)
            .ok_or_else(|| EngineError::UnknownCommand(format!("position {param}")))?;

        let length = match captures.name("size") {
            Some(size) => size
                .as_str()
                .parse::<usize>()
                .map_err(|_| EngineError::Configuration(format!("board size {}", size.as_str())))?,
            None => DEFAULT_BOARD_LENGTH,
        };
        let mut board = if captures.name("startpos").is_some() {
            Board::init(length)?
        } else {
            Board::new(length)?
        };

        if let Some(pieces) = captures.name("pieces") {
            for item in pieces.as_str().split(' ') {
                let mut chars = item.chars();
                let piece = chars
                    .next()
                    .and_then(|glyph| GLYPH_MAP.get(&glyph))
                    .copied()
                    .ok_or_else(|| EngineError::MalformedCoordinate(item.to_string()))?;
                let pos = board.locate(chars.as_str())?;
                board.place(pos, piece);
            }
        }

        let mut turn = match captures.name("turn") {
            Some(turn) => turn.as_str().parse()?,
            None => Color::Black,
        };

        if let Some(moves) = captures.name("moves") {
            for text in moves.as_str().split(' ') {
                play_on(&mut board, turn, text)?;
                turn = turn.next();
            }
        }

        info!(length, turn = %turn, "position set");
        self.board = board;
        self.turn = turn;
        Ok(())
    }

    pub fn hints(&self) -> Vec<String> {
        let hints = get_hints(&self.board, self.turn, true);
        if hints.captures.is_empty() {
            vec![list_line("moves", &hints.moves)]
        } else {
            vec![list_line("captures", &hints.captures)]
        }
    }

    pub fn play(&mut self, param: &str) -> Result<()> {
        play_on(&mut self.board, self.turn, param)?;
        info!(action = param, turn = %self.turn, "played");
        self.turn = self.turn.next();
        Ok(())
    }

    // 执行搜索并输出最佳动作
    // 参数可选 depth N，缺省使用配置中的深度
    pub fn go(&mut self, param: &str) -> Result<Vec<String>> {
        let regex = Regex::new(r#"^(?:depth (?P<depth>\d+))?$"#)
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let captures = regex
            .captures(param)
            .ok_or_else(|| EngineError::UnknownCommand(format!("go {param}")))?;
        let mut config = self.config;
        if let Some(depth) = captures.name("depth") {
            config.max_depth = depth
                .as_str()
                .parse()
                .map_err(|_| EngineError::Configuration(format!("search depth {}", depth.as_str())))?;
        }

        let outcome = search(&self.board, self.turn, config)?;
        Ok(match outcome.action {
            Some(action) => vec![format!("bestmove {} value {:.4}", action, outcome.value)],
            None => vec!["bestmove pass".to_string()],
        })
    }

    pub fn result(&self) -> Vec<String> {
        if is_game_finished(&self.board) {
            vec![format!("result {}", get_winner(&self.board))]
        } else {
            vec!["result ongoing".to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::*;
    use crate::engine::*;

    #[test]
    fn test_handshake() {
        let mut engine = CheckersEngine::new().unwrap();
        let lines = engine.handle("checkers").unwrap();
        assert_eq!(lines.last().map(String::as_str), Some("checkersok"));
        assert_eq!(engine.handle("isready").unwrap(), ["readyok"]);
        assert_eq!(engine.handle("").unwrap(), Vec::<String>::new());
        assert!(matches!(engine.handle("ucci"), Err(EngineError::UnknownCommand(_))));
    }

    #[test]
    fn test_position_with_moves() {
        let mut engine = CheckersEngine::new().unwrap();
        engine.handle("position startpos moves c2-d3").unwrap();
        assert_eq!(engine.turn, Color::White);
        assert_eq!(
            engine.handle("hints").unwrap(),
            ["moves f1-e2 f3-e2 f3-e4 f5-e4 f5-e6 f7-e6 f7-e8"]
        );
    }

    #[test]
    fn test_position_size() {
        let mut engine = CheckersEngine::new().unwrap();
        engine.handle("position size 4 startpos").unwrap();
        assert_eq!(engine.board.length(), 4);
        assert_eq!(engine.handle("hints").unwrap(), ["moves a2-b1 a2-b3 a4-b3"]);
        assert!(matches!(
            engine.handle("position size 30 startpos"),
            Err(EngineError::Configuration(_))
        ));
        assert_eq!(engine.board.length(), 4);
    }

    #[test]
    fn test_rejected_position_keeps_board() {
        let mut engine = CheckersEngine::new().unwrap();
        assert!(matches!(
            engine.handle("position startpos moves c2-c3"),
            Err(EngineError::InvalidAction(_))
        ));
        assert!(matches!(
            engine.handle("position empty pieces bz9"),
            Err(EngineError::MalformedCoordinate(_))
        ));
        assert!(matches!(
            engine.handle("position empty turn red"),
            Err(EngineError::UnknownColor(_))
        ));
        assert_eq!(engine.board, Board::init(8).unwrap());
        assert_eq!(engine.turn, Color::Black);
    }

    #[test]
    fn test_mandatory_capture_and_result() {
        let mut engine = CheckersEngine::new().unwrap();
        engine.handle("position empty pieces bc3 ba1 wd4 turn black").unwrap();
        assert_eq!(engine.handle("hints").unwrap(), ["captures c3xe5"]);
        assert_eq!(engine.handle("result").unwrap(), ["result ongoing"]);
        assert!(matches!(engine.handle("play a1-b2"), Err(EngineError::InvalidAction(_))));
        engine.handle("play c3xe5").unwrap();
        assert_eq!(engine.turn, Color::White);
        assert_eq!(engine.handle("result").unwrap(), ["result black"]);
    }

    #[test]
    fn test_go() {
        let mut engine = CheckersEngine::new().unwrap();
        engine.handle("position startpos").unwrap();
        let lines = engine.handle("go depth 2").unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("bestmove c"));
        assert!(lines[0].contains(" value "));
        assert!(matches!(engine.handle("go depth 0"), Err(EngineError::Configuration(_))));

        engine.handle("position empty pieces wd4 turn black").unwrap();
        assert_eq!(engine.handle("go").unwrap(), ["bestmove pass"]);
    }
}
