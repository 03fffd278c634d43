//! UCT throughput benchmark
//!
//! Measures:
//! 1. Raw playouts per second on empty boards of several sizes
//! 2. Time per decision for a full UCT search

use std::time::Instant;

use dots_core::Board;
use dots_mcts::{playout, RandomSource, Uct, UctConfig};

// ============================================================================
// BENCHMARK STRUCTURES
// ============================================================================

#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    board: String,
    runs: u64,
    total_time_ms: f64,
}

impl BenchmarkResult {
    fn per_second(&self) -> f64 {
        self.runs as f64 / (self.total_time_ms / 1000.0)
    }

    fn to_table_row(&self) -> String {
        format!(
            "| {} | {} | {} | {:.0}ms | {:.0}/s |",
            self.name,
            self.board,
            self.runs,
            self.total_time_ms,
            self.per_second()
        )
    }
}

// ============================================================================
// BENCHMARK: Raw Playouts
// ============================================================================

fn bench_playouts(dot_rows: usize, dot_cols: usize, runs: u64) -> BenchmarkResult {
    let board = Board::new(dot_rows, dot_cols).expect("benchmark board");
    let mut shadow = board.clone();
    let mut rng = RandomSource::new(1);

    let start = Instant::now();
    for _ in 0..runs {
        shadow.clone_from(&board);
        std::hint::black_box(playout(&mut shadow, &mut rng, 60));
    }

    BenchmarkResult {
        name: "playout".to_string(),
        board: format!("{}x{}", dot_rows, dot_cols),
        runs,
        total_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

// ============================================================================
// BENCHMARK: Full Decision
// ============================================================================

fn bench_decision(dot_rows: usize, dot_cols: usize, iterations: u32) -> BenchmarkResult {
    let board = Board::new(dot_rows, dot_cols).expect("benchmark board");
    let mut uct = Uct::new(UctConfig::default().with_iterations(iterations));

    let start = Instant::now();
    let report = uct.run(&board).expect("arena large enough");
    std::hint::black_box(report.vertex);

    BenchmarkResult {
        name: format!("decision ({} nodes)", report.nodes_used),
        board: format!("{}x{}", dot_rows, dot_cols),
        runs: u64::from(iterations),
        total_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

fn main() {
    println!("| Benchmark | Board | Runs | Time | Rate |");
    println!("|-----------|-------|------|------|------|");

    for (rows, cols) in [(3, 3), (5, 5), (8, 8)] {
        println!("{}", bench_playouts(rows, cols, 200_000).to_table_row());
    }
    for (rows, cols) in [(3, 3), (5, 5)] {
        println!("{}", bench_decision(rows, cols, 100_000).to_table_row());
    }
}
