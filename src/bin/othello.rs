use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use othello::{Difficulty, GameSession, Phase, Position, SessionConfig, Side, Trigger};

/// Play Othello against the minimax engine in the terminal.
#[derive(Debug, Parser)]
#[command(name = "othello", version)]
struct Args {
    /// easy (depth 1), medium (depth 2) or hard (depth 5)
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Let the engine play black and move first.
    #[arg(long)]
    ai_first: bool,

    /// Cap each engine move at this many milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SessionConfig {
        human: if args.ai_first { Side::White } else { Side::Black },
        time_limit_ms: args.time_limit_ms,
    };
    let mut session = GameSession::new(config);
    session.handle(Trigger::DifficultyChosen(args.difficulty))?;
    info!("playing {} as {:?}", args.difficulty, config.human);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match session.phase() {
            Phase::PlayerTurn => {
                print_board(&session);
                println!("{}", session.status());
                let Some(line) = prompt(&mut lines, "Your move (e.g. d3, or q): ")? else {
                    return Ok(());
                };
                if line.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                match line.parse::<Position>() {
                    Ok(position) => {
                        if let Err(err) = session.handle(Trigger::CellClicked(position)) {
                            println!("{err}");
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Phase::AiTurn => {
                session.step_ai().context("engine move failed")?;
                if let Some(mv) = session.history().last() {
                    println!("AI plays {}", mv.position);
                }
            }
            Phase::GameOver => {
                print_board(&session);
                if let Some(result) = session.result() {
                    println!(
                        "{} Final score: black {} / white {}",
                        session.status(),
                        result.black_count,
                        result.white_count
                    );
                }
                let Some(line) = prompt(&mut lines, "Play again? [y]es / [d]ifficulty / [q]uit: ")?
                else {
                    return Ok(());
                };
                match line.to_ascii_lowercase().as_str() {
                    "y" | "yes" => {
                        session.handle(Trigger::PlayAgain)?;
                    }
                    "d" | "difficulty" => {
                        session.handle(Trigger::ChangeDifficulty)?;
                    }
                    _ => return Ok(()),
                }
            }
            Phase::DifficultySelect => {
                for level in Difficulty::ALL {
                    println!("  {:<7} {}", level.label(), level.description());
                }
                let Some(line) = prompt(&mut lines, "Difficulty: ")? else {
                    return Ok(());
                };
                match line.parse::<Difficulty>() {
                    Ok(level) => {
                        session.handle(Trigger::DifficultyChosen(level))?;
                    }
                    Err(err) => println!("{err}"),
                }
            }
        }
    }
}

fn print_board(session: &GameSession) {
    let hints = session
        .legal_moves()
        .iter()
        .fold(0u64, |mask, position| mask | (1u64 << position.index()));
    let (black, white) = session.state().score();
    println!();
    println!("{}", session.state().board().render(hints));
    println!("X (black): {black}  O (white): {white}");
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}
