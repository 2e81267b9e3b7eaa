use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cte_breakdown::config::{apply_overrides, load_config, Overrides};
use cte_breakdown::error::Result;
use cte_breakdown::observability::init_logging;
use cte_breakdown::report;

/// Walk through a recursive CTE over a manager hierarchy, one step at a time.
#[derive(Debug, Parser)]
#[command(name = "cte-breakdown", version, about)]
struct Cli {
    /// YAML config file (policy, report options, replacement employee table).
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reject invalid rows, dangling managers and cycles instead of skipping them.
    #[arg(long)]
    strict: bool,

    /// Leave the SQL text out of the report.
    #[arg(long)]
    no_sql: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn execute(cli: &Cli) -> Result<()> {
    let config = apply_overrides(
        load_config(cli.config.as_deref())?,
        Overrides {
            strict: cli.strict,
            no_sql: cli.no_sql,
        },
    );
    tracing::info!(policy = %config.policy, show_sql = config.show_sql, "starting walkthrough");

    let color = console::colors_enabled();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let walkthrough = report::run(&config, &mut out, color)?;
    tracing::info!(
        levels = walkthrough.traversal.depth(),
        rows = walkthrough.traversal.rows().len(),
        "walkthrough complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
