use crate::{Record, Signal, HOLD};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parallel price and display label sequences, one entry per accepted record.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
  pub prices: Vec<f64>,
  /// Empty string means no label is drawn at that index.
  pub labels: Vec<String>,
  pub records: Vec<Record>,
  pub skipped: usize,
}

impl PriceSeries {
  pub fn push(&mut self, record: Record, label: String) {
    self.prices.push(record.price);
    self.labels.push(label);
    self.records.push(record);
  }

  pub fn len(&self) -> usize {
    self.prices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.prices.is_empty()
  }

  /// Points with a label to draw.
  pub fn annotations(&self) -> impl Iterator<Item = (usize, f64, &str)> {
    self
      .labels
      .iter()
      .enumerate()
      .filter(|(_, label)| !label.is_empty())
      .map(move |(i, label)| (i, self.prices[i], label.as_str()))
  }

  /// True if some record's file line no longer matches its position in the series.
  pub fn cadence_drifted(&self) -> bool {
    self.records.iter().enumerate().any(|(i, r)| r.line != i)
  }

  pub fn min_price(&self) -> f64 {
    self.prices.iter().fold(f64::INFINITY, |a, b| a.min(*b))
  }

  pub fn max_price(&self) -> f64 {
    self.prices.iter().fold(f64::NEG_INFINITY, |a, b| a.max(*b))
  }

  pub fn summarize(&self) -> Summary {
    let mut signals: HashMap<String, usize> = HashMap::new();
    for record in &self.records {
      let key = match Signal::from_label(&record.label) {
        Signal::Buy => "BUY".to_string(),
        Signal::Sell => "SELL".to_string(),
        Signal::Hold => HOLD.to_string(),
        Signal::Other(label) => label,
      };
      *signals.entry(key).or_default() += 1;
    }
    let kept_labels = self.labels.iter().filter(|l| !l.is_empty()).count();
    let suppressed_holds = self
      .records
      .iter()
      .zip(self.labels.iter())
      .filter(|(r, l)| r.label == HOLD && l.is_empty())
      .count();
    Summary {
      records: self.len(),
      skipped: self.skipped,
      kept_labels,
      suppressed_holds,
      signals,
      min_price: (!self.is_empty()).then(|| self.min_price()),
      max_price: (!self.is_empty()).then(|| self.max_price()),
      start_date: self.records.iter().find_map(|r| r.timestamp),
      end_date: self.records.iter().rev().find_map(|r| r.timestamp),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
  pub records: usize,
  pub skipped: usize,
  pub kept_labels: usize,
  pub suppressed_holds: usize,
  pub signals: HashMap<String, usize>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
  pub start_date: Option<NaiveDateTime>,
  pub end_date: Option<NaiveDateTime>,
}

impl Summary {
  pub fn print(&self) -> String {
    let mut signals: Vec<(&String, &usize)> = self.signals.iter().collect();
    signals.sort();
    let signals = signals
      .iter()
      .map(|(label, count)| format!("{}={}", Signal::from_label(label).print(), count))
      .collect::<Vec<String>>()
      .join(", ");
    let range = match (self.min_price, self.max_price) {
      (Some(min), Some(max)) => format!("{} - {}", min, max),
      _ => "n/a".to_string(),
    };
    let dates = match (self.start_date, self.end_date) {
      (Some(start), Some(end)) => format!("{} - {}", start, end),
      _ => "n/a".to_string(),
    };
    format!(
      "Records: {}, Skipped: {}, Labels: {}, Suppressed HOLD: {}, Signals: [{}], Price: {}, Dates: {}",
      self.records, self.skipped, self.kept_labels, self.suppressed_holds, signals, range, dates
    )
  }
}

#[cfg(test)]
fn record(line: usize, price: f64, label: &str) -> Record {
  Record {
    line,
    timestamp: None,
    price,
    label: label.to_string(),
  }
}

#[test]
fn summary_counts() {
  let mut series = PriceSeries::default();
  series.push(record(0, 10.0, HOLD), HOLD.to_string());
  series.push(record(1, 12.5, HOLD), String::new());
  series.push(record(2, 9.0, "BUY"), "BUY".to_string());
  series.skipped = 2;

  let summary = series.summarize();
  assert_eq!(summary.records, 3);
  assert_eq!(summary.skipped, 2);
  assert_eq!(summary.kept_labels, 2);
  assert_eq!(summary.suppressed_holds, 1);
  assert_eq!(summary.signals.get(HOLD), Some(&2));
  assert_eq!(summary.signals.get("BUY"), Some(&1));
  assert_eq!(summary.min_price, Some(9.0));
  assert_eq!(summary.max_price, Some(12.5));
  assert_eq!(summary.start_date, None);
  assert!(!series.cadence_drifted());
}

#[test]
fn dates_follow_file_order() -> anyhow::Result<()> {
  let at = |s: &str| NaiveDateTime::parse_from_str(s, crate::TIMESTAMP_FORMAT);
  let mut series = PriceSeries::default();
  series.push(record(0, 1.0, "BUY"), "BUY".to_string());
  for (line, date) in [(1, "2024-12-03 14:05:00"), (2, "2024-12-03 13:00:00"), (3, "2024-12-03 14:00:00")] {
    let mut r = record(line, 2.0, "SELL");
    r.timestamp = Some(at(date)?);
    series.push(r, "SELL".to_string());
  }
  series.push(record(4, 3.0, "BUY"), "BUY".to_string());

  let summary = series.summarize();
  assert_eq!(summary.start_date, Some(at("2024-12-03 14:05:00")?));
  assert_eq!(summary.end_date, Some(at("2024-12-03 14:00:00")?));
  Ok(())
}

#[test]
fn annotations_skip_empty_labels() {
  let mut series = PriceSeries::default();
  series.push(record(0, 1.0, "SELL"), "SELL".to_string());
  series.push(record(1, 2.0, HOLD), String::new());
  series.push(record(3, 3.0, "BUY"), "BUY".to_string());
  let annotations: Vec<(usize, f64, &str)> = series.annotations().collect();
  assert_eq!(annotations, vec![(0, 1.0, "SELL"), (2, 3.0, "BUY")]);
  assert!(series.cadence_drifted());
}

#[test]
fn empty_summary() {
  let summary = PriceSeries::default().summarize();
  assert_eq!(summary.records, 0);
  assert_eq!(summary.min_price, None);
  assert!(summary.print().contains("Price: n/a"));
}
