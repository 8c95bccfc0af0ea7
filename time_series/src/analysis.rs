use crate::{LabelFilter, PlotError, PlotResult, PriceSeries, SkipPolicy};
use chrono::NaiveDateTime;
use log::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_ANALYSIS_FILE: &str = "analysis.txt";
pub const MIN_FIELDS: usize = 6;
pub const PRICE_FIELD: usize = 3;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One accepted line of the analysis log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  /// 0-based line index in the source file
  pub line: usize,
  pub timestamp: Option<NaiveDateTime>,
  pub price: f64,
  pub label: String,
}

impl Record {
  /// Parse one line of the analysis log.
  /// Returns `Ok(None)` for a line with fewer than [`MIN_FIELDS`] tab separated fields.
  /// A price field without a colon, with a non-numeric value or with `inf`/`nan` is an error.
  /// The label is the last field verbatim, so `"\t HOLD"` keeps its leading space.
  ///
  /// Line format: `date\t MACD Line..\t Signal Line..\t Price: 1.0\t KAMA: ..\t RSI: ..\t HOLD`
  pub fn parse(line: usize, text: &str) -> PlotResult<Option<Self>> {
    let fields: Vec<&str> = text.trim().split('\t').collect();
    if fields.len() < MIN_FIELDS {
      return Ok(None);
    }

    let price_field = fields[PRICE_FIELD];
    let value = price_field
      .split(':')
      .nth(1)
      .ok_or_else(|| PlotError::PriceDelimiterMissing {
        line,
        field: price_field.to_string(),
      })?;
    let price = value
      .trim()
      .parse::<f64>()
      .map_err(|source| PlotError::ParseFloat { line, source })?;
    if !price.is_finite() {
      return Err(PlotError::NonFinitePrice { line, price });
    }

    let timestamp = NaiveDateTime::parse_from_str(fields[0].trim(), TIMESTAMP_FORMAT).ok();
    // fields.len() >= MIN_FIELDS so there is always a last field
    let label = fields[fields.len() - 1].to_string();

    Ok(Some(Self {
      line,
      timestamp,
      price,
      label,
    }))
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
  pub filter: LabelFilter,
  pub skip: SkipPolicy,
  /// Trim surrounding whitespace off labels before filtering.
  pub trim_labels: bool,
}

pub struct Analysis;

impl Analysis {
  /// Read the analysis log at `path` into a price series.
  pub fn read(path: &Path, options: &ParseOptions) -> PlotResult<PriceSeries> {
    let file = File::open(path)?;
    info!("Reading analysis log {}", path.display());
    Self::from_reader(BufReader::new(file), options)
  }

  pub fn from_reader<R: BufRead>(reader: R, options: &ParseOptions) -> PlotResult<PriceSeries> {
    let mut series = PriceSeries::default();
    for (line, text) in reader.lines().enumerate() {
      let text = text?;
      match Record::parse(line, &text)? {
        Some(mut record) => {
          if options.trim_labels {
            record.label = record.label.trim().to_string();
          }
          let label = options.filter.filter(line, series.len(), &record.label);
          series.push(record, label);
        }
        None => {
          let fields = text.trim().split('\t').count();
          match options.skip {
            SkipPolicy::Silent => (),
            SkipPolicy::Logged => warn!("Skipping line {}: {} fields", line, fields),
            SkipPolicy::Fatal => return Err(PlotError::LineTooShort { line, fields }),
          }
          series.skipped += 1;
        }
      }
    }
    Ok(series)
  }
}

#[test]
fn parse_two_lines() -> anyhow::Result<()> {
  let input = "a\tb\tc\tPrice:10.5\te\tBUY\na\tb\tc\tPrice:11.0\te\tHOLD\n";
  let series = Analysis::from_reader(input.as_bytes(), &ParseOptions::default())?;
  assert_eq!(series.prices, vec![10.5, 11.0]);
  assert_eq!(series.labels, vec!["BUY".to_string(), String::new()]);
  Ok(())
}

#[test]
fn short_line_is_dropped() -> anyhow::Result<()> {
  assert_eq!(Record::parse(0, "a\tb\tc\tPrice:10.5")?, None);

  let input = "a\tb\tc\tPrice:10.5\na\tb\tc\tPrice:12.0\te\tSELL";
  let series = Analysis::from_reader(input.as_bytes(), &ParseOptions::default())?;
  assert_eq!(series.prices, vec![12.0]);
  assert_eq!(series.labels, vec!["SELL".to_string()]);
  assert_eq!(series.skipped, 1);
  Ok(())
}

#[test]
fn non_numeric_price_is_fatal() {
  let input = "a\tb\tc\tPrice:10.5\te\tBUY\na\tb\tc\tPrice:abc\te\tHOLD\n";
  let res = Analysis::from_reader(input.as_bytes(), &ParseOptions::default());
  assert!(matches!(res, Err(PlotError::ParseFloat { line: 1, .. })));
}

#[test]
fn missing_price_delimiter_is_fatal() {
  let res = Record::parse(4, "a\tb\tc\tPrice 10.5\te\tBUY");
  assert!(matches!(res, Err(PlotError::PriceDelimiterMissing { line: 4, .. })));
}

#[test]
fn fatal_skip_policy_rejects_short_lines() {
  let options = ParseOptions {
    skip: SkipPolicy::Fatal,
    ..Default::default()
  };
  let input = "a\tb\tc\tPrice:10.5\te\tBUY\n\na\tb\tc\tPrice:11.0\te\tBUY\n";
  let res = Analysis::from_reader(input.as_bytes(), &options);
  assert!(matches!(res, Err(PlotError::LineTooShort { line: 1, fields: 1 })));
}

#[test]
fn parse_writer_format() -> anyhow::Result<()> {
  let text = "2024-12-03 14:05:00\t MACD Line0.120000\t Signal Line0.080000\t Price: 96012.550000\t KAMA: 95990.100000\t RSI: 48.200000\t HOLD";
  let record = Record::parse(7, text)?.ok_or_else(|| anyhow::anyhow!("record skipped"))?;
  assert_eq!(record.line, 7);
  assert_eq!(record.price, 96012.55);
  assert_eq!(record.label, " HOLD");
  let expected = NaiveDateTime::parse_from_str("2024-12-03 14:05:00", TIMESTAMP_FORMAT)?;
  assert_eq!(record.timestamp, Some(expected));
  Ok(())
}

#[test]
fn hold_cadence_follows_file_lines() -> anyhow::Result<()> {
  // 12 HOLD lines with a short line at index 1: accepted lines are 0, 2..=12
  let mut input = String::new();
  for line in 0..13 {
    if line == 1 {
      input.push_str("broken\tline\n");
    } else {
      input.push_str(&format!("t\tm\ts\tPrice:{}.0\tk\tHOLD\n", line));
    }
  }
  let series = Analysis::from_reader(input.as_bytes(), &ParseOptions::default())?;
  assert_eq!(series.len(), 12);
  assert_eq!(series.prices.len(), series.labels.len());
  let kept: Vec<usize> = series
    .labels
    .iter()
    .enumerate()
    .filter(|(_, label)| !label.is_empty())
    .map(|(i, _)| i)
    .collect();
  // file lines 0 and 10 sit at series positions 0 and 9
  assert_eq!(kept, vec![0, 9]);
  assert!(series.cadence_drifted());

  let options = ParseOptions {
    filter: LabelFilter::new(10, crate::HoldCadence::RecordIndex)?,
    ..Default::default()
  };
  let series = Analysis::from_reader(input.as_bytes(), &options)?;
  assert_eq!(series.labels[0], "HOLD");
  assert_eq!(series.labels[9], "");
  assert_eq!(series.labels[10], "HOLD");
  Ok(())
}

#[test]
fn read_from_file() -> anyhow::Result<()> {
  use std::io::Write;
  let mut file = tempfile::NamedTempFile::new()?;
  writeln!(file, "a\tb\tc\tPrice:1.25\te\tBUY")?;
  writeln!(file, "a\tb\tc\tPrice:1.5\te\tHOLD")?;
  let series = Analysis::read(file.path(), &ParseOptions::default())?;
  assert_eq!(series.prices, vec![1.25, 1.5]);
  Ok(())
}

#[test]
fn missing_file_is_io_error() {
  let res = Analysis::read(Path::new("does/not/exist/analysis.txt"), &ParseOptions::default());
  assert!(matches!(res, Err(PlotError::Io(_))));
}

#[test]
fn non_finite_price_is_fatal() {
  let res = Record::parse(3, "a\tb\tc\tPrice: inf\te\tHOLD");
  assert!(matches!(res, Err(PlotError::NonFinitePrice { line: 3, .. })));
  let res = Record::parse(5, "a\tb\tc\tPrice:NaN\te\tHOLD");
  assert!(matches!(res, Err(PlotError::NonFinitePrice { line: 5, .. })));

  let input = "a\tb\tc\tPrice:10.5\te\tBUY\na\tb\tc\tPrice:inf\te\tHOLD\n";
  let res = Analysis::from_reader(input.as_bytes(), &ParseOptions::default());
  assert!(matches!(res, Err(PlotError::NonFinitePrice { line: 1, .. })));
}

#[test]
fn labels_verbatim_unless_trimmed() -> anyhow::Result<()> {
  let input = "t\t m\t s\t Price: 1.0\t k\t r\t HOLD\nt\t m\t s\t Price: 2.0\t k\t r\t HOLD\n";

  let series = Analysis::from_reader(input.as_bytes(), &ParseOptions::default())?;
  assert_eq!(series.labels, vec![" HOLD".to_string(), " HOLD".to_string()]);
  assert_eq!(series.records[0].label, " HOLD");

  let options = ParseOptions {
    trim_labels: true,
    ..Default::default()
  };
  let series = Analysis::from_reader(input.as_bytes(), &options)?;
  assert_eq!(series.labels, vec!["HOLD".to_string(), String::new()]);
  assert_eq!(series.records[1].label, "HOLD");
  Ok(())
}

#[test]
fn logged_skip_policy_keeps_reading() -> anyhow::Result<()> {
  let options = ParseOptions {
    skip: SkipPolicy::Logged,
    ..Default::default()
  };
  let input = "a\tb\tc\tPrice:1.0\te\tBUY\n\nonly\tthree\tfields\na\tb\tc\tPrice:2.0\te\tSELL\n";
  let series = Analysis::from_reader(input.as_bytes(), &options)?;
  assert_eq!(series.skipped, 2);
  assert_eq!(series.prices, vec![1.0, 2.0]);
  assert_eq!(series.labels, vec!["BUY".to_string(), "SELL".to_string()]);
  assert_eq!(series.records[1].line, 3);
  Ok(())
}
