use std::io::{self, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::app::{ListResult, ProgressEvent, ProgressSink, SubsetReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_list(result: &ListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_download(result: &SubsetReport) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent<'_>) {}
}

pub struct HumanOutput;

impl HumanOutput {
    pub fn print_list(result: &ListResult) {
        println!("\nAvailable subsets:");
        for subset in &result.subsets {
            println!(
                "{}: {} ({})",
                subset.name,
                subset.description,
                format_gigabytes(subset.total_size)
            );
        }
    }

    pub fn print_download(result: &SubsetReport) {
        println!(
            "\nDownloaded subset '{}' into {} ({} files)",
            result.subset,
            result.output_dir,
            result.files.len()
        );
        println!("Download completed successfully!");
    }
}

pub fn format_gigabytes(bytes: u64) -> String {
    format!("{:.1}GB", bytes as f64 / 1e9)
}

#[derive(Default)]
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn transfer_bar(total: u64, offset: u64, filename: &str) -> ProgressBar {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        ) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_position(offset);
        bar.set_message(filename.to_string());
        bar
    }

    fn status(slot: &mut Option<ProgressBar>, message: String) {
        if let Some(bar) = slot.as_ref() {
            bar.set_message(message);
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_message(message);
        *slot = Some(spinner);
    }
}

impl ProgressSink for ConsoleProgress {
    fn event(&self, event: ProgressEvent<'_>) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        match event {
            ProgressEvent::Started {
                filename,
                offset,
                total,
            } => {
                if let Some(previous) = slot.take() {
                    previous.finish_and_clear();
                }
                *slot = Some(Self::transfer_bar(total, offset, filename));
            }
            ProgressEvent::Transferred { written, .. } => {
                if let Some(bar) = slot.as_ref() {
                    bar.set_position(written);
                }
            }
            ProgressEvent::Verifying { filename } => {
                Self::status(&mut slot, format!("{filename} (verifying checksum)"));
            }
            ProgressEvent::Extracting { filename } => {
                Self::status(&mut slot, format!("{filename} (extracting)"));
            }
            ProgressEvent::Finished { filename } => {
                if let Some(bar) = slot.take() {
                    bar.finish_with_message(format!("{filename} done"));
                }
            }
        }
    }
}
