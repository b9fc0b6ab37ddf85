use anyhow::Result;
use tracing::info;

use rungs_lifecycle_sim::config::{usage, Config};
use rungs_lifecycle_sim::simulate;

fn main() -> Result<()> {
    rungs::logging::init_tracing();

    let config = Config::from_args();
    if config.show_help {
        println!("{}", usage());
        return Ok(());
    }

    info!(
        cycles = config.cycles,
        io_mode = config.io_mode.label(),
        "simulation started"
    );

    let report = simulate(&config)?;
    for step in &report.steps {
        println!(
            "{:<8} presenter={:<10} gateway={}",
            format!("{:?}", step.signal),
            step.presenter,
            step.gateway
        );
    }

    info!(
        shown = report.shown,
        polls = report.polls,
        remaining = report.remaining,
        "simulation finished"
    );
    Ok(())
}
