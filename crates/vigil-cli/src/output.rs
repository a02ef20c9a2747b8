//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use vigil_domain::{Alternative, DomainName, VerdictRecord};
use vigil_sync::{BannerView, PopupView, SurfaceCall, VerdictView};

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format what the popup would show.
    pub fn format_popup(&self, view: &PopupView) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
            OutputFormat::Table => Ok(match view {
                PopupView::Verdict(verdict) => self.format_verdict_view(verdict),
                PopupView::Failed { title, message } => {
                    let color = if *title == "Warning" { "yellow" } else { "red" };
                    self.colorize(&format!("{}: {}", title, message), color)
                }
            }),
        }
    }

    fn format_verdict_view(&self, view: &VerdictView) -> String {
        let bar = format!(
            "{}{}",
            "█".repeat(view.trust_score as usize),
            "░".repeat(10 - view.trust_score.min(10) as usize)
        );

        let mut lines = vec![
            self.bold(view.domain.as_str()),
            format!(
                "Trust Score: {}/10 {} {}",
                view.trust_score,
                self.hex(&bar, view.score_color),
                self.hex(&format!("[{}]", view.pill), view.pill_color)
            ),
            self.hex(view.headline, view.score_color),
            view.summary.clone(),
        ];

        if let Some(detail) = &view.detail {
            lines.push(format!("Details: {}", detail));
        }
        if let Some(link) = &view.privacy_policy {
            lines.push(format!("Privacy Policy: {}", link));
        }
        if !view.alternatives.is_empty() {
            lines.push(String::new());
            lines.push("Alternatives:".to_string());
            lines.push(self.alternatives_table(&view.alternatives));
        }

        lines.join("\n")
    }

    fn alternatives_table(&self, alternatives: &[Alternative]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Name", "URL", "Why", "Privacy Policy"]);

        for alt in alternatives {
            builder.push_record([
                alt.name.as_str(),
                alt.url.as_str(),
                alt.explanation.as_deref().unwrap_or("-"),
                alt.privacy_policy.as_deref().unwrap_or("-"),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a cache-only lookup.
    pub fn format_record(&self, domain: &DomainName, record: Option<&VerdictRecord>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(match record {
                Some(record) => serde_json::to_string_pretty(record)?,
                None => serde_json::to_string_pretty(&serde_json::json!({
                    "domain": domain,
                    "cached": false
                }))?,
            }),
            OutputFormat::Table => {
                let Some(record) = record else {
                    return Ok(self.warning(&format!("No cached verdict for {}", domain)));
                };

                let mut builder = Builder::default();
                builder.push_record(["Domain", "Verdict", "Trust Score", "Alternatives", "Classified At"]);
                builder.push_record([
                    record.domain.to_string(),
                    record.verdict.as_str().to_string(),
                    format!("{}/10", record.trust_score.value()),
                    record.alternatives.len().to_string(),
                    record.classified_at.to_string(),
                ]);

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the in-page banner.
    pub fn format_banner(&self, banner: &BannerView) -> String {
        self.colorize(&banner.lines().join("\n"), "red")
    }

    /// Format one badge surface call.
    pub fn format_surface_call(&self, call: &SurfaceCall) -> String {
        let scope = |context: &Option<vigil_sync::ContextId>| match context {
            Some(context) => format!("[tab {}]", context),
            None => "[global]".to_string(),
        };

        match call {
            SurfaceCall::SetIcon(context) => format!("{} icon reset", scope(context)),
            SurfaceCall::SetBadgeText(context, text) => {
                format!("{} badge text {:?}", scope(context), text)
            }
            SurfaceCall::SetBadgeColor(context, color) => {
                format!("{} badge color {}", scope(context), self.hex(color, color))
            }
            SurfaceCall::OpenPopup => self.warning("popup opened"),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn bold(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Color text with a `#rrggbb` value if color is enabled.
    fn hex(&self, text: &str, color: &str) -> String {
        match (self.color_enabled, parse_hex(color)) {
            (true, Some((r, g, b))) => text.truecolor(r, g, b).to_string(),
            _ => text.to_string(),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_domain::{TrustScore, Verdict};
    use vigil_sync::ContextId;

    fn unsafe_record() -> VerdictRecord {
        VerdictRecord::new(
            DomainName::new("tracker.example").unwrap(),
            Verdict::Unsafe,
            TrustScore::clamped(3),
            vec![Alternative::new("duckduckgo.com", "https://duckduckgo.com")],
            r#"{"policy_analysis":[["Sells data","Shares browsing history"]]}"#,
            1_700_000_000,
        )
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#2ecc71"), Some((0x2e, 0xcc, 0x71)));
        assert_eq!(parse_hex("2ecc71"), None);
        assert_eq!(parse_hex("#fff"), None);
    }

    #[test]
    fn test_popup_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let view = PopupView::Verdict(VerdictView::from_record(&unsafe_record()));
        let output = formatter.format_popup(&view).unwrap();

        assert!(output.contains("tracker.example"));
        assert!(output.contains("Trust Score: 3/10 ███░░░░░░░ [Unsafe]"));
        assert!(output.contains("Privacy Concerns Detected"));
        assert!(output.contains("Details: Shares browsing history"));
        assert!(output.contains("duckduckgo.com"));
    }

    #[test]
    fn test_popup_failure_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let view = PopupView::Failed {
            title: "Warning",
            message: "Legal documents not found".into(),
        };
        assert_eq!(
            formatter.format_popup(&view).unwrap(),
            "Warning: Legal documents not found"
        );
    }

    #[test]
    fn test_popup_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let view = PopupView::Verdict(VerdictView::from_record(&unsafe_record()));
        let output = formatter.format_popup(&view).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["kind"], "verdict");
        assert_eq!(json["pill"], "Unsafe");
        assert_eq!(json["trust_score"], 3);
    }

    #[test]
    fn test_record_formats() {
        let record = unsafe_record();
        let table = Formatter::new(OutputFormat::Table, false);
        let output = table.format_record(&record.domain, Some(&record)).unwrap();
        assert!(output.contains("Verdict"));
        assert!(output.contains("unsafe"));

        let missing = table.format_record(&record.domain, None).unwrap();
        assert_eq!(missing, "⚠ No cached verdict for tracker.example");

        let json = Formatter::new(OutputFormat::Json, false);
        let output = json.format_record(&record.domain, None).unwrap();
        assert!(output.contains("\"cached\": false"));
    }

    #[test]
    fn test_surface_call_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(
            formatter.format_surface_call(&SurfaceCall::SetBadgeText(Some(ContextId(4)), "!".into())),
            "[tab 4] badge text \"!\""
        );
        assert_eq!(
            formatter.format_surface_call(&SurfaceCall::SetIcon(None)),
            "[global] icon reset"
        );
    }

    #[test]
    fn test_no_color() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("done"), "✓ done");
    }
}
