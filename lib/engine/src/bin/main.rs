extern crate engine;

use engine::engine::CheckersEngine;
use tracing_subscriber::EnvFilter;

fn main() {
    // 日志写到 stderr，stdout 只留给协议
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let result = CheckersEngine::new()
        .map_err(std::io::Error::other)
        .and_then(|mut engine| engine.start());
    if let Err(e) = result {
        tracing::error!(error = %e, "engine stopped");
        std::process::exit(1);
    }
}
