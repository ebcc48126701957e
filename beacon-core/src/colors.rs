//! Terminal palette for reports.
//!
//! Sticks to ANSI bright colors so output stays readable on most terminals.

use colored::{ColoredString, Colorize};

pub trait PaletteExt {
    /// Healthy values and passing checks.
    fn healthy(&self) -> ColoredString;
    /// Failures and critical expiry.
    fn failing(&self) -> ColoredString;
    /// Expiry warnings and partial health.
    fn caution(&self) -> ColoredString;
    /// Section titles.
    fn heading(&self) -> ColoredString;
    /// Field labels.
    fn label(&self) -> ColoredString;
    /// Rules, separators and secondary text.
    fn muted(&self) -> ColoredString;
}

impl<S: AsRef<str>> PaletteExt for S {
    fn healthy(&self) -> ColoredString {
        self.as_ref().bright_green()
    }

    fn failing(&self) -> ColoredString {
        self.as_ref().bright_red()
    }

    fn caution(&self) -> ColoredString {
        self.as_ref().bright_yellow()
    }

    fn heading(&self) -> ColoredString {
        self.as_ref().bright_purple().bold()
    }

    fn label(&self) -> ColoredString {
        self.as_ref().bright_cyan()
    }

    fn muted(&self) -> ColoredString {
        self.as_ref().bright_black()
    }
}
