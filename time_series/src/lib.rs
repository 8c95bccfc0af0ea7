pub mod analysis;
pub mod errors;
pub mod export;
pub mod label;
pub mod plot;
pub mod series;

pub use analysis::*;
pub use errors::*;
pub use export::*;
pub use label::*;
pub use plot::*;
pub use series::*;

use log::LevelFilter;
use simplelog::{
  ColorChoice, CombinedLogger, Config as SimpleLogConfig, ConfigBuilder, SharedLogger,
  TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Terminal logging at `Info`, mirrored to `log_file` with RFC3339 timestamps when given.
pub fn init_logger(log_file: Option<&Path>) -> anyhow::Result<()> {
  let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
    LevelFilter::Info,
    SimpleLogConfig::default(),
    TerminalMode::Mixed,
    ColorChoice::Always,
  )];
  if let Some(log_file) = log_file {
    loggers.push(WriteLogger::new(
      LevelFilter::Info,
      ConfigBuilder::new().set_time_format_rfc3339().build(),
      File::create(log_file)?,
    ));
  }
  Ok(CombinedLogger::init(loggers)?)
}
