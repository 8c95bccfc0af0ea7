use std::num::ParseFloatError;
use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
  #[error("Io: {0}")]
  Io(#[from] std::io::Error),
  #[error("Csv: {0}")]
  Csv(#[from] csv::Error),
  #[error("ParseFloat on line {line}: {source}")]
  ParseFloat {
    line: usize,
    #[source]
    source: ParseFloatError,
  },
  #[error("NonFinitePrice on line {line}: {price}")]
  NonFinitePrice { line: usize, price: f64 },
  #[error("PriceDelimiterMissing on line {line}: {field:?}")]
  PriceDelimiterMissing { line: usize, field: String },
  #[error("LineTooShort on line {line}: {fields} fields")]
  LineTooShort { line: usize, fields: usize },
  #[error("InvalidConfig {key}: {value:?}")]
  InvalidConfig { key: &'static str, value: String },
  #[error("EmptySeries")]
  EmptySeries,
  #[error("Draw: {0}")]
  Draw(String),
}
