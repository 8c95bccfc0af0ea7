use crate::{PlotError, PlotResult, PriceSeries};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette::{BLUE_800, RED_800};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{BLACK, WHITE};
use std::ops::Range;
use std::path::Path;

pub const DEFAULT_PLOT_FILE: &str = "analysis.png";
pub const TITLE: &str = "Price Plot with Selective HOLD Labels";
pub const X_DESC: &str = "Time (arbitrary units)";
pub const Y_DESC: &str = "Price";
pub const LEGEND: &str = "Price";
/// Figure size in inches, rendered at [`DPI`] pixels per inch.
pub const FIGURE_SIZE: (u32, u32) = (50, 25);
pub const DPI: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Png,
  Svg,
}

impl ImageFormat {
  /// `.svg` goes to the SVG backend, anything else is a bitmap.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
      _ => ImageFormat::Png,
    }
  }
}

pub struct Plot;

impl Plot {
  pub fn plot(series: &PriceSeries, out_file: &Path) -> PlotResult<()> {
    if series.is_empty() {
      return Err(PlotError::EmptySeries);
    }
    // plotters never finishes laying out an infinite or NaN axis
    if let Some(price) = series.prices.iter().find(|price| !price.is_finite()) {
      return Err(PlotError::Draw(format!("Cannot scale y axis to price {}", price)));
    }
    let size = (FIGURE_SIZE.0 * DPI, FIGURE_SIZE.1 * DPI);
    match ImageFormat::from_path(out_file) {
      ImageFormat::Svg => Self::draw(SVGBackend::new(out_file, size).into_drawing_area(), series)?,
      ImageFormat::Png => Self::draw(BitMapBackend::new(out_file, size).into_drawing_area(), series)?,
    }
    info!("Saved price plot to {}", out_file.display());
    Ok(())
  }

  fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, series: &PriceSeries) -> PlotResult<()> {
    root.fill(&WHITE).map_err(
      |e| PlotError::Draw(format!("Failed to fill drawing area with white: {}", e))
    )?;

    let x_range = -0.5..(series.len() as f64 - 0.5);
    let y_range = Self::padded(series.min_price(), series.max_price());
    let mut chart = ChartBuilder::on(&root)
      .margin_top(20)
      .margin_bottom(20)
      .margin_left(30)
      .margin_right(30)
      .set_all_label_area_size(140)
      .caption(
        TITLE,
        ("sans-serif", 60.0).into_font(),
      )
      .build_cartesian_2d(x_range, y_range).map_err(
      |e| PlotError::Draw(format!("Failed to build cartesian 2d: {}", e))
    )?;
    chart
      .configure_mesh()
      .light_line_style(BLACK.mix(0.05))
      .bold_line_style(BLACK.mix(0.2))
      .label_style(("sans-serif", 30, &BLACK).into_text_style(&root))
      .x_desc(X_DESC)
      .y_desc(Y_DESC)
      .draw().map_err(
      |e| PlotError::Draw(format!("Failed to draw mesh: {}", e))
    )?;

    let line = ShapeStyle {
      color: RGBAColor::from(BLUE_800),
      filled: true,
      stroke_width: 2,
    };
    chart.draw_series(
      LineSeries::new(
        series.prices.iter().enumerate().map(|(i, price)| (i as f64, *price)),
        line,
      )
        .point_size(4),
    ).map_err(
      |e| PlotError::Draw(format!("Failed to draw series: {}", e))
    )?
      .label(LEGEND)
      .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], line));

    let label_style = ("sans-serif", 16)
      .into_font()
      .color(&RED_800)
      .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
      series
        .annotations()
        .map(|(i, price, label)| Text::new(label.to_string(), (i as f64, price), label_style.clone())),
    ).map_err(
      |e| PlotError::Draw(format!("Failed to draw labels: {}", e))
    )?;

    chart
      .configure_series_labels()
      .label_font(("sans-serif", 30))
      .background_style(WHITE.mix(0.8))
      .border_style(BLACK)
      .draw().map_err(
      |e| PlotError::Draw(format!("Failed to draw legend: {}", e))
    )?;

    root.present().map_err(
      |e| PlotError::Draw(format!("Failed to present root: {}", e))
    )?;

    Ok(())
  }

  /// Y axis range with 5% headroom. A flat series gets a unit band around its price.
  pub fn padded(min: f64, max: f64) -> Range<f64> {
    let pad = (max - min) * 0.05;
    if pad > 0.0 {
      (min - pad)..(max + pad)
    } else {
      (min - 1.0)..(max + 1.0)
    }
  }
}

#[test]
fn image_format_from_extension() {
  assert_eq!(ImageFormat::from_path(Path::new("analysis.png")), ImageFormat::Png);
  assert_eq!(ImageFormat::from_path(Path::new("out/chart.SVG")), ImageFormat::Svg);
  assert_eq!(ImageFormat::from_path(Path::new("chart")), ImageFormat::Png);
}

#[test]
fn padded_range() {
  assert_eq!(Plot::padded(10.0, 30.0), 9.0..31.0);
  assert_eq!(Plot::padded(5.0, 5.0), 4.0..6.0);
}

#[cfg(test)]
fn series_of(lines: &[(f64, &str)]) -> PriceSeries {
  let options = crate::ParseOptions::default();
  let mut series = PriceSeries::default();
  for (line, (price, label)) in lines.iter().enumerate() {
    let filtered = options.filter.filter(line, series.len(), label);
    series.push(
      crate::Record {
        line,
        timestamp: None,
        price: *price,
        label: label.to_string(),
      },
      filtered,
    );
  }
  series
}

#[test]
fn non_finite_prices_are_not_plotted() -> anyhow::Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("non_finite.svg");

  let res = Plot::plot(&series_of(&[(10.5, "BUY"), (f64::INFINITY, "HOLD")]), &path);
  assert!(matches!(res, Err(PlotError::Draw(_))));
  let res = Plot::plot(&series_of(&[(f64::NAN, "HOLD")]), &path);
  assert!(matches!(res, Err(PlotError::Draw(_))));
  let res = Plot::plot(&series_of(&[(3.0, "BUY"), (f64::NAN, "SELL")]), &path);
  assert!(matches!(res, Err(PlotError::Draw(_))));
  assert!(!path.exists());
  Ok(())
}

#[test]
fn render_svg() -> anyhow::Result<()> {
  // BUY on line 0, HOLD on lines 1..=10: only the HOLD on line 10 is drawn
  let mut lines = vec![(10.5, "BUY")];
  for i in 1..=10 {
    lines.push((10.5 + i as f64, "HOLD"));
  }
  let series = series_of(&lines);

  let dir = tempfile::tempdir()?;
  let path = dir.path().join("prices.svg");
  Plot::plot(&series, &path)?;

  let svg = std::fs::read_to_string(&path)?;
  assert!(svg.contains(TITLE));
  assert!(svg.contains(X_DESC));
  assert!(svg.contains(Y_DESC));
  assert_eq!(svg.matches("BUY").count(), 1);
  // one HOLD in the title, one kept label
  assert_eq!(svg.matches("HOLD").count(), 2);
  Ok(())
}

#[test]
fn empty_series_is_not_plotted() {
  let res = Plot::plot(&PriceSeries::default(), Path::new("never_written.png"));
  assert!(matches!(res, Err(PlotError::EmptySeries)));
}
