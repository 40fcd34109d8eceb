/* 自我对弈：两个 alpha-beta 代理从标准开局对下，直到终局、弃权或达到步数上限 */
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::board::{Board, Color};
use engine::constant::{DEFAULT_BOARD_LENGTH, DEFAULT_DEPTH, MAX_BOARD_LENGTH, MIN_BOARD_LENGTH};
use engine::rules::{apply_action, get_winner, is_game_finished};
use engine::search::{search, SearchConfig};

/// Self-play between two alpha-beta agents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Board side length
    #[arg(
        default_value_t = DEFAULT_BOARD_LENGTH as u8,
        value_parser = clap::value_parser!(u8).range(MIN_BOARD_LENGTH as i64..=MAX_BOARD_LENGTH as i64)
    )]
    length: u8,

    /// Search depth in half-moves
    #[arg(default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// Stop after this many half-moves
    #[arg(default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    max_plies: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = SearchConfig {
        max_depth: args.depth,
        ..SearchConfig::default()
    };
    let mut board = Board::init(usize::from(args.length))?;
    let mut turn = Color::Black;
    info!(length = args.length, depth = args.depth, max_plies = args.max_plies, "self-play started");

    for ply in 1..=args.max_plies {
        if is_game_finished(&board) {
            break;
        }
        let outcome = search(&board, turn, config)?;
        let Some(action) = outcome.action else {
            info!(ply, turn = %turn, "pass");
            break;
        };
        apply_action(&mut board, &action).with_context(|| format!("ply {ply}: {action}"))?;
        info!(ply, turn = %turn, action = %action, value = outcome.value, "played");
        turn = turn.next();
    }

    let (black, white) = board.count_pieces();
    info!(winner = %get_winner(&board), black, white, "game over");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Args;
    use clap::error::ErrorKind;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rs-checkers"]).unwrap();
        assert_eq!((args.length, args.depth, args.max_plies), (8, 6, 200));

        let args = Args::try_parse_from(["rs-checkers", "10", "3", "40"]).unwrap();
        assert_eq!((args.length, args.depth, args.max_plies), (10, 3, 40));
    }

    #[test]
    fn test_help_and_bad_arguments() {
        let err = Args::try_parse_from(["rs-checkers", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        for argv in [
            vec!["rs-checkers", "8", "0"],
            vec!["rs-checkers", "8", "6", "0"],
            vec!["rs-checkers", "1"],
            vec!["rs-checkers", "27"],
            vec!["rs-checkers", "eight"],
        ] {
            let err = Args::try_parse_from(argv.clone()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{:?}", argv);
        }

        let err = Args::try_parse_from(["rs-checkers", "8", "6", "200", "extra"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        let err = Args::try_parse_from(["rs-checkers", "--fast"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
