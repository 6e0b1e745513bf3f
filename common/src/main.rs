use clap::{Parser, ValueEnum};
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "minesweeper-bot",
    version,
    about = "Knowledge-based Minesweeper bot"
)]
struct Cli {
    /// Board height in rows.
    #[arg(long, default_value = "8")]
    height: usize,

    /// Board width in columns.
    #[arg(long, default_value = "8")]
    width: usize,

    /// Number of mines on the board.
    #[arg(long, default_value = "8")]
    mines: usize,

    /// Number of games to play.
    #[arg(long, default_value = "1")]
    games: usize,

    /// Seed for mine placement and random guesses.
    #[arg(long)]
    seed: Option<u64>,

    /// How far to run inference after each move.
    #[arg(long, value_enum, default_value = "fixed-point")]
    policy: Policy,

    /// Pause between moves, to make a single game watchable.
    #[arg(long, default_value = "0")]
    delay_ms: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    SinglePass,
    FixedPoint,
}

impl From<Policy> for ClosurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::SinglePass => ClosurePolicy::SinglePass,
            Policy::FixedPoint => ClosurePolicy::FixedPoint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GameState {
    Won,
    Lost,
    /// No move left to make without the board being won.
    Stuck,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = GameConfig::new(cli.height, cli.width, cli.mines);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let delay = Duration::from_millis(cli.delay_ms);

    println!("--- Knowledge-Based Minesweeper Bot ---");
    println!("Strategy: play cells proven safe, guess randomly otherwise.");

    let mut tally: HashMap<GameState, usize> = HashMap::new();
    for game in 1..=cli.games {
        let mut board = Board::new(config, &mut rng)?;
        let ai = MinesweeperAI::new(config).with_policy(cli.policy.into());

        println!("\n--- Game #{game} ---");
        let state = play_game(&mut board, ai, &mut rng, delay)?;
        println!("{board}");

        match state {
            GameState::Won => println!("Result: The bot won!"),
            GameState::Lost => println!("Result: The bot hit a mine and lost."),
            GameState::Stuck => println!("Result: The bot ran out of moves."),
        }
        *tally.entry(state).or_default() += 1;
    }

    if cli.games > 1 {
        let count = |state| tally.get(&state).copied().unwrap_or(0);
        println!(
            "\nWon {} / Lost {} / Stuck {} of {} games",
            count(GameState::Won),
            count(GameState::Lost),
            count(GameState::Stuck),
            cli.games
        );
    }

    Ok(())
}

/// Plays one game to the end, feeding every revealed cell back to the agent.
fn play_game(
    board: &mut Board,
    mut ai: MinesweeperAI,
    rng: &mut StdRng,
    delay: Duration,
) -> anyhow::Result<GameState> {
    let mut revealed: HashMap<Cell, usize> = HashMap::new();
    let mut move_count = 0;

    loop {
        // Flag everything the agent has proven, then check for a win.
        for &mine in ai.mines() {
            board.flag(mine);
        }
        if board.won() {
            return Ok(GameState::Won);
        }

        // Strategy 1: a cell that is guaranteed to be safe.
        // Strategy 2: otherwise, a random guess.
        let point = match ai.make_safe_move() {
            Some(cell) => {
                debug!(%cell, "logic found a guaranteed safe cell");
                cell
            }
            None => match ai.make_random_move(rng) {
                Some(cell) => {
                    info!(%cell, "no logically safe move, guessing");
                    cell
                }
                None => return Ok(GameState::Stuck),
            },
        };

        move_count += 1;
        info!(move_count, %point, "revealing");

        if board.is_mine(point) {
            print_view(&ai, &revealed, Some(point));
            return Ok(GameState::Lost);
        }

        let count = board.nearby_mines(point);
        revealed.insert(point, count);
        ai.add_knowledge(point, count)?;

        if !ai.is_consistent() {
            anyhow::bail!(
                "agent derived contradictory knowledge: {:?}",
                ai.contradictions()
            );
        }

        if !delay.is_zero() {
            print_view(&ai, &revealed, None);
            thread::sleep(delay);
        }
    }
}

/// Prints the board as the agent sees it.
fn print_view(ai: &MinesweeperAI, revealed: &HashMap<Cell, usize>, exploded: Option<Cell>) {
    let GameConfig { height, width, .. } = ai.config();

    print!("   ");
    for col in 0..width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(width));

    for row in 0..height {
        print!("{:^2}|", row);
        for col in 0..width {
            let cell = Cell::new(row, col);
            let display = if exploded == Some(cell) {
                " * ".to_string()
            } else if let Some(count) = revealed.get(&cell) {
                format!(" {} ", count)
            } else if ai.mines().contains(&cell) {
                " F ".to_string()
            } else if ai.safes().contains(&cell) {
                " . ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_games_end_without_contradictions() {
        // Every game ends in a win or a loss on a consistent board
        let config = GameConfig::new(8, 8, 8);
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(config, &mut rng).unwrap();
            let ai = MinesweeperAI::new(config);

            let state = play_game(&mut board, ai, &mut rng, Duration::ZERO).unwrap();
            assert_ne!(state, GameState::Stuck, "seed {seed}");
        }
    }

    #[test]
    fn test_solved_layout_is_won() {
        // A single mine in the corner: a zero in the opposite corner opens everything
        let mut board = Board::from_mines(3, 3, [Cell::new(0, 0)]).unwrap();
        let mut ai = MinesweeperAI::new(board.config());
        ai.add_knowledge(Cell::new(2, 2), 0).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let state = play_game(&mut board, ai, &mut rng, Duration::ZERO).unwrap();
        assert_eq!(state, GameState::Won);
    }
}
