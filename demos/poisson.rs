//! Solve the manufactured Poisson problem from the command line.
//!
//! ```text
//! cargo run --release --example poisson -- --n 256 --operator assembled --history res.txt
//! ```
//!
//! Set `RUST_LOG=debug` for assembly and setup details.

use std::path::PathBuf;

use clap::Parser;
use poisson_cg::{OperatorKind, PoissonContext, Precision, SolverOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Conjugate Gradient on the shifted 2-D 5-point Poisson problem
#[derive(Parser, Debug)]
#[command(name = "poisson")]
#[command(about, long_about = None)]
struct Args {
    /// Grid resolution N (N² unknowns)
    #[arg(long, default_value_t = 128)]
    n: usize,

    /// Absolute tolerance on the residual norm
    #[arg(long, default_value_t = 1e-6)]
    eps: f64,

    /// Spectral shift added to the diagonal
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Operator representation: assembled or stencil
    #[arg(long, default_value_t = OperatorKind::Stencil)]
    operator: OperatorKind,

    /// Floating-point precision: f32 or f64
    #[arg(long, default_value_t = Precision::Double)]
    precision: Precision,

    /// Iteration cap (default N²)
    #[arg(long)]
    max_iters: Option<usize>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Only report the initial residual and the outcome
    #[arg(short, long)]
    quiet: bool,

    /// Write the residual of every iteration to this file
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> SolverOptions {
        SolverOptions {
            n: self.n,
            eps: self.eps,
            offset: self.offset,
            quiet: self.quiet,
            precision: self.precision,
            operator: self.operator,
            max_iters: self.max_iters,
            record_history: self.history.is_some(),
            threads: self.threads,
            max_triplets: None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let report = PoissonContext::new(args.options()).solve()?;

    println!(
        "{} operator, {}, N = {}, {} threads: {} after {} iterations",
        report.operator,
        report.precision,
        report.n,
        report.threads,
        if report.converged { "converged" } else { "not converged" },
        report.iterations
    );
    println!("  final residual    {:e}", report.final_residual);
    println!("  verified residual {:e}", report.verified_residual);
    println!("  time              {:.3?}", report.elapsed);

    if let (Some(path), Some(history)) = (args.history.as_ref(), report.history.as_ref()) {
        history.save(path)?;
        println!("  history written to {}", path.display());
    }
    Ok(())
}
