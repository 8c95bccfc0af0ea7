use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;
use time_series::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub input: PathBuf,
  pub output: PathBuf,
  pub csv: Option<PathBuf>,
  pub log_file: Option<PathBuf>,
  pub options: ParseOptions,
}

impl Config {
  pub fn from_env() -> PlotResult<Self> {
    let hold_every = match env_var("HOLD_EVERY")? {
      Some(value) => value.trim().parse::<usize>().map_err(|_| PlotError::InvalidConfig {
        key: "HOLD_EVERY",
        value,
      })?,
      None => DEFAULT_HOLD_EVERY,
    };
    let cadence = env_parse::<HoldCadence>("HOLD_CADENCE")?.unwrap_or_default();
    let skip = env_parse::<SkipPolicy>("SKIP_POLICY")?.unwrap_or_default();
    let trim_labels = match env_var("TRIM_LABELS")? {
      Some(value) => value.trim().parse::<bool>().map_err(|_| PlotError::InvalidConfig {
        key: "TRIM_LABELS",
        value,
      })?,
      None => false,
    };

    Ok(Self {
      input: env_var("PRICE_PLOT_INPUT")?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYSIS_FILE)),
      output: env_var("PRICE_PLOT_OUTPUT")?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PLOT_FILE)),
      csv: env_var("PRICE_PLOT_CSV")?.map(PathBuf::from),
      log_file: env_var("PRICE_PLOT_LOG_FILE")?.map(PathBuf::from),
      options: ParseOptions {
        filter: LabelFilter::new(hold_every, cadence)?,
        skip,
        trim_labels,
      },
    })
  }
}

/// Unset variables are `None`, non-unicode values are a config error.
fn env_var(key: &'static str) -> PlotResult<Option<String>> {
  match std::env::var(key) {
    Ok(value) => Ok(Some(value)),
    Err(VarError::NotPresent) => Ok(None),
    Err(VarError::NotUnicode(value)) => Err(PlotError::InvalidConfig {
      key,
      value: value.to_string_lossy().to_string(),
    }),
  }
}

fn env_parse<T: FromStr<Err = PlotError>>(key: &'static str) -> PlotResult<Option<T>> {
  env_var(key)?.map(|value| value.parse::<T>()).transpose()
}

#[test]
fn config_from_env() -> anyhow::Result<()> {
  // one test touches the process environment so no other test races it
  for key in [
    "PRICE_PLOT_INPUT",
    "PRICE_PLOT_OUTPUT",
    "PRICE_PLOT_CSV",
    "PRICE_PLOT_LOG_FILE",
    "HOLD_EVERY",
    "HOLD_CADENCE",
    "SKIP_POLICY",
    "TRIM_LABELS",
  ] {
    std::env::remove_var(key);
  }
  let config = Config::from_env()?;
  assert_eq!(config.input, PathBuf::from("analysis.txt"));
  assert_eq!(config.output, PathBuf::from("analysis.png"));
  assert_eq!(config.csv, None);
  assert_eq!(config.options.filter, LabelFilter::default());
  assert_eq!(config.options.skip, SkipPolicy::Silent);
  assert!(!config.options.trim_labels);

  std::env::set_var("PRICE_PLOT_OUTPUT", "chart.svg");
  std::env::set_var("HOLD_EVERY", "5");
  std::env::set_var("HOLD_CADENCE", "record");
  std::env::set_var("SKIP_POLICY", "logged");
  std::env::set_var("TRIM_LABELS", "true");
  let config = Config::from_env()?;
  assert_eq!(config.output, PathBuf::from("chart.svg"));
  assert_eq!(config.options.filter.hold_every, 5);
  assert_eq!(config.options.filter.cadence, HoldCadence::RecordIndex);
  assert_eq!(config.options.skip, SkipPolicy::Logged);
  assert!(config.options.trim_labels);

  std::env::set_var("HOLD_EVERY", "0");
  assert!(matches!(
    Config::from_env(),
    Err(PlotError::InvalidConfig { key: "HOLD_EVERY", .. })
  ));
  std::env::set_var("HOLD_EVERY", "ten");
  assert!(matches!(
    Config::from_env(),
    Err(PlotError::InvalidConfig { key: "HOLD_EVERY", .. })
  ));
  std::env::remove_var("HOLD_EVERY");
  std::env::set_var("TRIM_LABELS", "yes");
  assert!(matches!(
    Config::from_env(),
    Err(PlotError::InvalidConfig { key: "TRIM_LABELS", .. })
  ));
  std::env::remove_var("TRIM_LABELS");
  std::env::set_var("SKIP_POLICY", "loud");
  assert!(matches!(
    Config::from_env(),
    Err(PlotError::InvalidConfig { key: "SKIP_POLICY", .. })
  ));

  for key in ["PRICE_PLOT_OUTPUT", "HOLD_CADENCE", "SKIP_POLICY"] {
    std::env::remove_var(key);
  }
  Ok(())
}
