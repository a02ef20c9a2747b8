//! Lookup command implementation.

use crate::app::App;
use crate::cli::TargetArgs;
use crate::error::Result;
use crate::output::Formatter;
use vigil_domain::DomainName;

/// Execute the lookup command (cache only, never classifies).
pub async fn execute_lookup(args: TargetArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let domain = DomainName::from_url_or_host(&args.target)?;
    let record = app.resolver.lookup(&domain).await;
    println!("{}", formatter.format_record(&domain, record.as_ref())?);
    Ok(())
}
