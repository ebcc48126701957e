use colored::Colorize;

use super::OutputFormatter;
use crate::aggregate::{AggregatedResult, ChannelStatus};
use crate::bulk::BatchReport;
use crate::colors::PaletteExt;
use crate::expiry::{classify_expiry, ExpirySeverity, ExpiryWarning};
use crate::summary::HealthSummary;

const WIDTH: usize = 80;

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.label().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.healthy().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.caution().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.failing().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self, ch: char) -> String {
        let line = ch.to_string().repeat(WIDTH);
        if self.use_colors {
            line.muted().to_string()
        } else {
            line
        }
    }

    fn title(&self, text: &str) -> String {
        if self.use_colors {
            text.heading().to_string()
        } else {
            text.to_string()
        }
    }

    fn status(&self, status: ChannelStatus) -> String {
        match status {
            ChannelStatus::Ok => self.success("OK"),
            ChannelStatus::Fail => self.error("FAIL"),
        }
    }

    fn mark(&self, ok: bool) -> String {
        if ok {
            self.success("✓")
        } else {
            self.error("✗")
        }
    }

    fn summary_line(&self, label: &str, count: usize, summary: &HealthSummary) -> String {
        format!(
            "{}: {} ({:.1}%)",
            self.label(label),
            count,
            summary.percent(count)
        )
    }

    fn warning_line(&self, warning: &ExpiryWarning) -> String {
        match warning.severity {
            ExpirySeverity::Critical => self.error(&format!(
                "⚠️ CRITICAL: {} - ONLY {} DAYS REMAINING (expires on {}) ⚠️",
                warning.domain, warning.days_remaining, warning.expiry_date
            )),
            ExpirySeverity::Warning => self.warning(&format!(
                "⚠️ WARNING: {} - {} days remaining (expires on {})",
                warning.domain, warning.days_remaining, warning.expiry_date
            )),
        }
    }

    fn format_result(&self, index: usize, result: &AggregatedResult, report: &BatchReport) -> Vec<String> {
        let mut output = Vec::new();

        output.push(format!("{}. {}", index, self.title(&result.domain)));
        output.push(format!(
            "   {}: {} (Success rate: {:.0}%)",
            self.label("HTTP status"),
            self.status(result.http_status),
            result.http_success_rate
        ));
        output.push(format!(
            "   {}: {} (Success rate: {:.0}%)",
            self.label("HTTPS status"),
            self.status(result.https_status),
            result.https_success_rate
        ));
        output.push(format!(
            "   {}: {} (Success rate: {:.0}%)",
            self.label("SSL certificate"),
            self.status(result.ssl_status),
            result.ssl_success_rate
        ));

        if let Some(avg) = result.avg_http_latency_secs {
            output.push(format!(
                "   {}: {:.2} seconds",
                self.label("Average HTTP response time"),
                avg
            ));
        }
        if let Some(avg) = result.avg_https_latency_secs {
            output.push(format!(
                "   {}: {:.2} seconds",
                self.label("Average HTTPS response time"),
                avg
            ));
        }

        if let (Some(expiry), Some(days)) = (result.ssl_expiry, result.days_until_expiry) {
            let date = expiry.format("%Y-%m-%d").to_string();
            let label = self.label("SSL expiry date");
            match classify_expiry(days, report.warning_days, report.critical_days) {
                Some(ExpirySeverity::Critical) => output.push(format!(
                    "   {}: {} ({})",
                    label,
                    date,
                    self.error(&format!("⚠️ CRITICAL: ONLY {} DAYS REMAINING! ⚠️", days))
                )),
                Some(ExpirySeverity::Warning) => output.push(format!(
                    "   {}: {} ({})",
                    label,
                    date,
                    self.warning(&format!("⚠️ WARNING: ONLY {} DAYS REMAINING!", days))
                )),
                None => {
                    output.push(format!("   {}: {}", label, date));
                    output.push(format!("   {}: {} days", self.label("Days remaining"), days));
                }
            }
        }

        output.push(String::new());
        output.push(format!("   {}:", self.label("Individual test results")));
        for (n, trial) in result.trials.iter().enumerate() {
            let mut line = format!(
                "   Test {}: HTTP: {}, HTTPS: {}, SSL: {}",
                n + 1,
                self.mark(trial.http.is_ok()),
                self.mark(trial.https.is_ok()),
                self.mark(trial.ssl.is_valid())
            );
            if let Some(days) = trial.days_until_expiry(report.generated_at) {
                line.push_str(&format!(" ({} days)", days));
            }
            output.push(line);
        }

        output.push(self.rule('-'));
        output
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &BatchReport) -> String {
        let mut output = Vec::new();
        let summary = &report.summary;

        output.push(self.title("Domain Health Check Report"));
        output.push(self.rule('='));
        output.push(format!(
            "{}: {}",
            self.label("Date and Time"),
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push(format!("{}: {}", self.label("Tests per domain"), report.trial_count));
        output.push(self.rule('='));
        output.push(String::new());

        output.push(format!("{}: {}", self.label("Total domains"), summary.total));
        output.push(self.summary_line("HTTP status OK", summary.http_ok, summary));
        output.push(self.summary_line("HTTPS status OK", summary.https_ok, summary));
        output.push(self.summary_line("SSL certificates valid", summary.ssl_ok, summary));
        output.push(self.summary_line("Fully healthy domains", summary.fully_healthy, summary));
        output.push(self.summary_line(
            "Partially healthy domains",
            summary.partially_healthy,
            summary,
        ));
        output.push(self.summary_line(
            "Completely unhealthy domains",
            summary.unhealthy,
            summary,
        ));
        output.push(String::new());

        if !report.expiry_warnings.is_empty() {
            output.push(self.title("DOMAINS WITH CERTIFICATES EXPIRING SOON:"));
            output.push(self.rule('-'));
            for warning in &report.expiry_warnings {
                output.push(self.warning_line(warning));
            }
            output.push(self.rule('-'));
            output.push(String::new());
        }

        output.push(self.title("Detailed results by domain:"));
        output.push(self.rule('='));
        for (index, result) in report.results.iter().enumerate() {
            output.extend(self.format_result(index + 1, result, report));
        }

        if !report.skipped.is_empty() {
            output.push(String::new());
            output.push(self.warning(&format!(
                "Not checked (run cancelled): {}",
                report.skipped.join(", ")
            )));
        }

        output.join("\n")
    }

    fn format_expiry_warnings(&self, warnings: &[ExpiryWarning]) -> String {
        if warnings.is_empty() {
            return String::new();
        }

        let rule = "-".repeat(65);
        let mut output = Vec::new();
        output.push(self.warning(
            "⚠️ WARNING: The following domains have certificates expiring soon:",
        ));
        output.push(rule.clone());
        output.push(format!("{:<40} {:<15} {}", "DOMAIN", "DAYS REMAINING", "EXPIRY DATE"));
        output.push(rule.clone());

        for warning in warnings {
            let line = match warning.severity {
                ExpirySeverity::Critical => self.error(&format!(
                    "{:<40} ⚠️ CRITICAL: {:<5} {}",
                    warning.domain, warning.days_remaining, warning.expiry_date
                )),
                ExpirySeverity::Warning => format!(
                    "{:<40} {:<15} {}",
                    warning.domain, warning.days_remaining, warning.expiry_date
                ),
            };
            output.push(line);
        }
        output.push(rule);

        output.join("\n")
    }
}
