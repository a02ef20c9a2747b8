//! Sweep command implementation.

use crate::app::App;
use crate::cli::SweepArgs;
use crate::error::Result;
use crate::output::Formatter;
use vigil_sync::Sweeper;

/// Execute the sweep command.
pub async fn execute_sweep(args: SweepArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let sweeper = Sweeper::new(app.store.clone(), &app.config.sync).with_metrics(app.metrics.clone());

    if app.config.sync.cache_ttl_secs.is_none() {
        println!(
            "{}",
            formatter.info("No cache TTL configured; verdicts never expire")
        );
        if !args.daemon {
            return Ok(());
        }
    }

    if args.daemon {
        println!(
            "{}",
            formatter.info(&format!(
                "Sweeping every {} minute(s); Ctrl+C to stop",
                app.config.sync.sweep_interval().as_secs() / 60
            ))
        );
        let purged = sweeper.run().await;
        println!("{}", formatter.success(&format!("Purged {} expired verdict(s)", purged)));
        return Ok(());
    }

    let purged = sweeper.sweep_once().await?;
    println!("{}", formatter.success(&format!("Purged {} expired verdict(s)", purged)));
    Ok(())
}
