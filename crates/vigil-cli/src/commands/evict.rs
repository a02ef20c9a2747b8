//! Evict and clear command implementations.

use crate::app::App;
use crate::cli::EvictArgs;
use crate::error::Result;
use crate::output::Formatter;
use vigil_domain::DomainName;

/// Execute the evict command.
pub async fn execute_evict(args: EvictArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let domains = args
        .domains
        .iter()
        .map(|d| DomainName::from_url_or_host(d))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for domain in &domains {
        if app.store.evict(domain).await? {
            println!("{}", formatter.success(&format!("Evicted {}", domain)));
        } else {
            println!("{}", formatter.info(&format!("{} was not cached", domain)));
        }
    }

    Ok(())
}

/// Execute the clear command.
pub async fn execute_clear(app: &App, formatter: &Formatter) -> Result<()> {
    let removed = app.store.clear().await?;
    println!("{}", formatter.success(&format!("Cleared {} cached verdict(s)", removed)));
    Ok(())
}
