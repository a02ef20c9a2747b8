//! Check command implementation.

use crate::app::App;
use crate::cli::TargetArgs;
use crate::error::Result;
use crate::output::Formatter;
use vigil_domain::DomainName;
use vigil_sync::BannerView;

/// Execute the check command (the popup path).
pub async fn execute_check(args: TargetArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let domain = DomainName::from_url_or_host(&args.target)?;
    let view = app.popup().open(&domain).await;

    println!("{}", formatter.format_popup(&view)?);

    // The banner only ever reads what the popup cached
    if view.verdict().is_some() {
        let record = app.resolver.lookup(&domain).await;
        if let Some(banner) = record.as_ref().and_then(BannerView::for_record) {
            println!();
            println!("{}", formatter.format_banner(&banner));
        }
    }

    Ok(())
}
