//! Batch progress bar that shares the terminal with tracing output.
//!
//! While a bar is attached, log lines are printed through it so they appear
//! above the bar instead of tearing it.

use std::io::Write;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Bar sized for `total` domains.
pub fn batch_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

pub fn attach_progress_bar(bar: ProgressBar) {
    if let Ok(mut guard) = ACTIVE_BAR.lock() {
        *guard = Some(bar);
    }
}

pub fn detach_progress_bar() {
    if let Ok(mut guard) = ACTIVE_BAR.lock() {
        *guard = None;
    }
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|guard| guard.clone())
}

fn emit_line(line: &str) -> std::io::Result<()> {
    match active_bar() {
        Some(bar) => {
            bar.println(line);
            Ok(())
        }
        None => {
            let mut stderr = std::io::stderr();
            stderr.write_all(line.as_bytes())?;
            stderr.write_all(b"\n")
        }
    }
}

/// Line-buffered writer for log records.
#[derive(Default)]
pub struct LogWriter {
    buffer: Vec<u8>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            emit_line(String::from_utf8_lossy(&line).trim_end_matches('\n'))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
        self.buffer.clear();
        if rest.is_empty() {
            Ok(())
        } else {
            emit_line(&rest)
        }
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// `MakeWriter` handing tracing-subscriber a fresh [`LogWriter`] per record.
#[derive(Default)]
pub struct LogWriterFactory;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::default()
    }
}
