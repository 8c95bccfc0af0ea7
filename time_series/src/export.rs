use crate::{PlotResult, PriceSeries};
use log::info;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Row<'a> {
  index: usize,
  line: usize,
  price: f64,
  label: &'a str,
}

/// Write the filtered series as CSV.
/// CSV format: index,line,price,label
pub fn write_csv(series: &PriceSeries, path: &Path) -> PlotResult<()> {
  let mut csv = csv::Writer::from_path(path)?;
  for (index, record) in series.records.iter().enumerate() {
    csv.serialize(Row {
      index,
      line: record.line,
      price: series.prices[index],
      label: &series.labels[index],
    })?;
  }
  csv.flush()?;
  info!("Exported {} rows to {}", series.len(), path.display());
  Ok(())
}

#[test]
fn export_filtered_series() -> anyhow::Result<()> {
  use crate::{Analysis, ParseOptions};
  let input = "a\tb\tc\tPrice:10.5\te\tBUY\nshort\na\tb\tc\tPrice:11.0\te\tHOLD\n";
  let series = Analysis::from_reader(input.as_bytes(), &ParseOptions::default())?;

  let dir = tempfile::tempdir()?;
  let path = dir.path().join("series.csv");
  write_csv(&series, &path)?;

  let written = std::fs::read_to_string(&path)?;
  assert_eq!(written, "index,line,price,label\n0,0,10.5,BUY\n1,2,11.0,\n");
  Ok(())
}
