mod utils;
use utils::*;

use dotenv::dotenv;
use log::*;
use time_series::*;

fn main() -> anyhow::Result<()> {
  dotenv().ok();
  let config = Config::from_env()?;
  init_logger(config.log_file.as_deref())?;

  if config.options.trim_labels {
    info!("Trimming whitespace around labels before filtering");
  }
  let series = Analysis::read(&config.input, &config.options)?;
  if config.options.filter.cadence == HoldCadence::LineIndex && series.cadence_drifted() {
    warn!(
      "🟡 {} skipped lines shift the HOLD cadence off the plotted index, set HOLD_CADENCE=record to align it",
      series.skipped
    );
  }
  info!("{}", series.summarize().print());

  if let Some(csv) = &config.csv {
    write_csv(&series, csv)?;
  }
  Plot::plot(&series, &config.output)?;

  Ok(())
}
