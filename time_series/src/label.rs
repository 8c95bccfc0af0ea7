use crate::{PlotError, PlotResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const HOLD: &str = "HOLD";
pub const DEFAULT_HOLD_EVERY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
  Buy,
  Sell,
  Hold,
  Other(String),
}

impl Signal {
  pub fn from_label(label: &str) -> Self {
    match label {
      "BUY" => Signal::Buy,
      "SELL" => Signal::Sell,
      HOLD => Signal::Hold,
      other => Signal::Other(other.to_string()),
    }
  }

  pub fn print(&self) -> String {
    match self {
      Signal::Buy => "🟢 BUY".to_string(),
      Signal::Sell => "🔴️ SELL".to_string(),
      Signal::Hold => "🟡 HOLD".to_string(),
      Signal::Other(label) => format!("⚪ {}", label),
    }
  }
}

/// What happens to a line with fewer fields than a record needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
  #[default]
  Silent,
  Logged,
  Fatal,
}

impl FromStr for SkipPolicy {
  type Err = PlotError;

  fn from_str(s: &str) -> PlotResult<Self> {
    match s.trim().to_lowercase().as_str() {
      "silent" => Ok(SkipPolicy::Silent),
      "logged" => Ok(SkipPolicy::Logged),
      "fatal" => Ok(SkipPolicy::Fatal),
      _ => Err(PlotError::InvalidConfig {
        key: "SKIP_POLICY",
        value: s.to_string(),
      }),
    }
  }
}

/// Which index the HOLD decimation is computed from.
///
/// `LineIndex` counts every line of the file, including skipped ones, so the
/// kept HOLD labels drift away from multiples of N in the label sequence once
/// a line has been skipped. `RecordIndex` counts accepted records only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldCadence {
  #[default]
  LineIndex,
  RecordIndex,
}

impl FromStr for HoldCadence {
  type Err = PlotError;

  fn from_str(s: &str) -> PlotResult<Self> {
    match s.trim().to_lowercase().as_str() {
      "line" => Ok(HoldCadence::LineIndex),
      "record" => Ok(HoldCadence::RecordIndex),
      _ => Err(PlotError::InvalidConfig {
        key: "HOLD_CADENCE",
        value: s.to_string(),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelFilter {
  pub hold_every: usize,
  pub cadence: HoldCadence,
}

impl Default for LabelFilter {
  fn default() -> Self {
    Self {
      hold_every: DEFAULT_HOLD_EVERY,
      cadence: HoldCadence::default(),
    }
  }
}

impl LabelFilter {
  pub fn new(hold_every: usize, cadence: HoldCadence) -> PlotResult<Self> {
    if hold_every == 0 {
      return Err(PlotError::InvalidConfig {
        key: "HOLD_EVERY",
        value: hold_every.to_string(),
      });
    }
    Ok(Self { hold_every, cadence })
  }

  /// Label to draw for a record found on file line `line`, the `record`th accepted one.
  /// An empty string means nothing is drawn.
  pub fn filter(&self, line: usize, record: usize, label: &str) -> String {
    if label != HOLD {
      return label.to_string();
    }
    let index = match self.cadence {
      HoldCadence::LineIndex => line,
      HoldCadence::RecordIndex => record,
    };
    if index % self.hold_every == 0 {
      label.to_string()
    } else {
      String::new()
    }
  }
}

#[test]
fn non_hold_labels_are_never_blanked() {
  let filter = LabelFilter::default();
  for line in 0..25 {
    assert_eq!(filter.filter(line, line, "BUY"), "BUY");
    assert_eq!(filter.filter(line, line, "SELL"), "SELL");
    assert_eq!(filter.filter(line, line, "hold"), "hold");
  }
}

#[test]
fn hold_kept_every_tenth_line() {
  let filter = LabelFilter::default();
  for line in 0..35 {
    let expected = if line % 10 == 0 { HOLD } else { "" };
    assert_eq!(filter.filter(line, 0, HOLD), expected, "line {}", line);
  }
}

#[test]
fn cadence_picks_the_index() -> anyhow::Result<()> {
  let by_line = LabelFilter::new(10, HoldCadence::LineIndex)?;
  let by_record = LabelFilter::new(10, HoldCadence::RecordIndex)?;
  // one skipped line before this record: line 11, record 10
  assert_eq!(by_line.filter(11, 10, HOLD), "");
  assert_eq!(by_record.filter(11, 10, HOLD), HOLD);
  Ok(())
}

#[test]
fn zero_hold_every_is_rejected() {
  assert!(matches!(
    LabelFilter::new(0, HoldCadence::LineIndex),
    Err(PlotError::InvalidConfig { key: "HOLD_EVERY", .. })
  ));
}

#[test]
fn policies_parse() -> anyhow::Result<()> {
  assert_eq!("Logged".parse::<SkipPolicy>()?, SkipPolicy::Logged);
  assert_eq!(" fatal ".parse::<SkipPolicy>()?, SkipPolicy::Fatal);
  assert_eq!("record".parse::<HoldCadence>()?, HoldCadence::RecordIndex);
  assert!("sometimes".parse::<SkipPolicy>().is_err());
  assert!("".parse::<HoldCadence>().is_err());
  Ok(())
}

#[test]
fn signal_from_label() {
  assert_eq!(Signal::from_label("BUY"), Signal::Buy);
  assert_eq!(Signal::from_label("SELL"), Signal::Sell);
  assert_eq!(Signal::from_label(HOLD), Signal::Hold);
  assert_eq!(Signal::from_label("EXIT"), Signal::Other("EXIT".to_string()));
}
