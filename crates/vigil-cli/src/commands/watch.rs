//! Watch command implementation.
//!
//! Reads one event per line from stdin:
//!
//! ```text
//! <tab-id> <url>           page finished loading
//! loading <tab-id> <url>   navigation started
//! close <tab-id>           tab closed
//! popup <url-or-domain>    open the popup (classifies uncached domains)
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::app::App;
use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use vigil_domain::DomainName;
use vigil_sync::{BadgeListener, BadgeSurface, ContextId, NavigationEvent, NavigationWatcher, SurfaceCall};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput {
    /// Feed to the navigation watcher
    Event(NavigationEvent),
    /// Open the popup for a site
    Popup(String),
}

/// Parse an input line; `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<WatchInput>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let first = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    let input = match (first, rest.as_slice()) {
        ("close", [id]) => WatchInput::Event(NavigationEvent::Closed {
            context: parse_context(id)?,
        }),
        ("loading", [id, url]) => WatchInput::Event(NavigationEvent::loading(parse_context(id)?, *url)),
        ("popup", [target]) => WatchInput::Popup(target.to_string()),
        (id, [url]) => WatchInput::Event(NavigationEvent::complete(parse_context(id)?, *url)),
        _ => {
            return Err(CliError::InvalidInput(format!(
                "Expected '<tab-id> <url>', 'loading <tab-id> <url>', 'close <tab-id>' or 'popup <url>', got '{}'",
                line
            )))
        }
    };

    Ok(Some(input))
}

fn parse_context(id: &str) -> Result<ContextId> {
    id.parse::<u32>()
        .map(ContextId)
        .map_err(|_| CliError::InvalidInput(format!("Invalid tab id '{}'", id)))
}

/// Badge surface that prints every call.
struct ConsoleSurface {
    formatter: Formatter,
}

impl ConsoleSurface {
    fn print(&self, call: SurfaceCall) {
        println!("{}", self.formatter.format_surface_call(&call));
    }
}

impl BadgeSurface for ConsoleSurface {
    fn set_icon(&self, context: Option<ContextId>) {
        self.print(SurfaceCall::SetIcon(context));
    }

    fn set_badge_text(&self, context: Option<ContextId>, text: &str) {
        self.print(SurfaceCall::SetBadgeText(context, text.to_string()));
    }

    fn set_badge_color(&self, context: Option<ContextId>, color: &str) {
        self.print(SurfaceCall::SetBadgeColor(context, color.to_string()));
    }

    fn open_popup(&self) {
        self.print(SurfaceCall::OpenPopup);
    }
}

/// Execute the watch command.
pub async fn execute_watch(args: WatchArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let surface: Arc<dyn BadgeSurface> = Arc::new(ConsoleSurface {
        formatter: formatter.clone(),
    });
    let watcher = Arc::new(
        NavigationWatcher::new(app.resolver.clone(), surface.clone())
            .with_auto_open_popup(app.config.sync.auto_open_popup && !args.no_popup),
    );
    let listener = BadgeListener::global(surface).spawn(app.notifier.subscribe()?);
    let popup = app.popup();

    let (tx, rx) = mpsc::channel(64);
    let runner = tokio::spawn(watcher.clone().run(rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(WatchInput::Event(event))) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Some(WatchInput::Popup(target))) => match DomainName::from_url_or_host(&target) {
                Ok(domain) => {
                    let view = popup.open(&domain).await;
                    println!("{}", formatter.format_popup(&view)?);
                }
                Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
            },
            Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
        }
    }

    drop(tx);
    let handled = match runner.await {
        Ok(handled) => handled,
        Err(e) => {
            tracing::error!(error = %e, "navigation watcher task failed");
            0
        }
    };
    listener.abort();

    println!("{}", formatter.info(&format!("Handled {} navigation event(s)", handled)));
    println!("{}", app.metrics.snapshot().summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete() {
        assert_eq!(
            parse_line("3 https://example.com/x").unwrap(),
            Some(WatchInput::Event(NavigationEvent::complete(
                ContextId(3),
                "https://example.com/x"
            )))
        );
    }

    #[test]
    fn test_parse_other_events() {
        assert_eq!(
            parse_line("loading 1 https://a.com").unwrap(),
            Some(WatchInput::Event(NavigationEvent::loading(ContextId(1), "https://a.com")))
        );
        assert_eq!(
            parse_line("close 7").unwrap(),
            Some(WatchInput::Event(NavigationEvent::Closed { context: ContextId(7) }))
        );
        assert_eq!(
            parse_line("popup a.com").unwrap(),
            Some(WatchInput::Popup("a.com".to_string()))
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# tab 1").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("abc https://a.com").is_err());
        assert!(parse_line("close").is_err());
        assert!(parse_line("1 https://a.com extra").is_err());
    }
}
