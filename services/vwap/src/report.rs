//! Hourly report emission
//!
//! One file per triggered hour, `<dir>/<hour>.<ext>`, in one of two
//! formats chosen at startup. A file that cannot be opened or written is
//! logged and skipped; report emission never takes the pipeline down.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;
use types::symbol::Symbol;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// `hour,symbol,vwap` header plus one comma-separated row per security.
    Csv,
    /// `HH:00:00` header, aligned rows, dashed separator.
    Log,
}

impl ReportFormat {
    /// File extension for report paths.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Log => "log",
        }
    }
}

/// Failure to produce one hour's file. The hour is skipped; later hours
/// still get their reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to open report file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write report file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// One security's line in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow {
    pub symbol: Symbol,
    /// Scale-4 decimal; renders with exactly four fractional digits.
    pub vwap: Decimal,
}

/// Writes per-hour VWAP report files into one directory.
#[derive(Debug)]
pub struct ReportWriter {
    dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    /// Create a writer, creating the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>, format: ReportFormat) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, format })
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Path of the file for a given hour: `<dir>/<hour>.<ext>`, hour in
    /// decimal without zero padding.
    pub fn path_for_hour(&self, hour: u32) -> PathBuf {
        self.dir.join(format!("{}.{}", hour, self.format.extension()))
    }

    /// Write one hour's report. Rows are emitted in the order given;
    /// callers make no ordering promise.
    pub fn write_hourly(&self, hour: u32, rows: &[ReportRow]) -> Result<PathBuf, ReportError> {
        let path = self.path_for_hour(hour);
        let file = File::create(&path).map_err(|source| ReportError::Open {
            path: path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);

        let written = match self.format {
            ReportFormat::Csv => write_csv(&mut out, hour, rows),
            ReportFormat::Log => write_log(&mut out, hour, rows),
        };
        written
            .and_then(|()| out.flush())
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

fn write_csv(out: &mut impl Write, hour: u32, rows: &[ReportRow]) -> io::Result<()> {
    writeln!(out, "hour,symbol,vwap")?;
    for row in rows {
        // Symbol renders all eight bytes, trailing spaces included.
        writeln!(out, "{},{},{}", hour, row.symbol, row.vwap)?;
    }
    Ok(())
}

fn write_log(out: &mut impl Write, hour: u32, rows: &[ReportRow]) -> io::Result<()> {
    writeln!(out, "{:02}:00:00", hour)?;
    for row in rows {
        // The 8-byte symbol field is its own left-justified column.
        writeln!(out, "{} {}", row.symbol, row.vwap)?;
    }
    writeln!(out, "-------------------------------")?;
    writeln!(out)?;
    Ok(())
}
