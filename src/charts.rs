use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::fs;
use std::path::Path;
use crate::product::Product;
use crate::simulation::SimulationResult;
use crate::sweeps::{GSweep, MeanSweep, PercentileSweep};

/// Multiplier applied to every chart's pixel size and fonts
pub const CHART_SCALE: u32 = 3;

const STRAT1_COLOR: RGBColor = RGBColor(0xFF, 0x6B, 0x6B);
const STRAT2_COLOR: RGBColor = RGBColor(0x4E, 0xCD, 0xC4);
const NEUTRAL_COLOR: RGBColor = RGBColor(0x95, 0xA5, 0xA6);

/// Diverging red-white-blue scale, red at 0
const RDBU_STOPS: [(u8, u8, u8); 11] = [
    (103, 0, 31),
    (178, 24, 43),
    (214, 96, 77),
    (244, 165, 130),
    (253, 219, 199),
    (247, 247, 247),
    (209, 229, 240),
    (146, 197, 222),
    (67, 147, 195),
    (33, 102, 172),
    (5, 48, 97),
];

/// Color for `t` in [0, 1] on the red-white-blue scale (clamped, NaN maps to the middle)
pub fn rdbu(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let position = t * (RDBU_STOPS.len() - 1) as f64;
    let lower = (position.floor() as usize).min(RDBU_STOPS.len() - 2);
    let frac = position - lower as f64;
    let (r0, g0, b0) = RDBU_STOPS[lower];
    let (r1, g1, b1) = RDBU_STOPS[lower + 1];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

fn font(size: u32) -> FontDesc<'static> {
    ("sans-serif", (size * CHART_SCALE) as f64).into_font()
}

fn scaled(size: (u32, u32)) -> (u32, u32) {
    (size.0 * CHART_SCALE, size.1 * CHART_SCALE)
}

fn ensure_parent_dir(filename: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = Path::new(filename).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Bars with their value printed on top
fn draw_bar_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    colors: &[RGBColor],
    value_text: &dyn Fn(f64) -> String,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let y_max = values.iter().cloned().filter(|v| v.is_finite()).fold(0.0, f64::max).max(1.0) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption(title, font(16))
        .margin(10 * CHART_SCALE)
        .x_label_area_size(30 * CHART_SCALE)
        .y_label_area_size(50 * CHART_SCALE)
        .build_cartesian_2d((0..labels.len() as i32).into_segmented(), 0.0..y_max)?;

    chart.configure_mesh()
        .disable_x_mesh()
        .y_desc(y_desc)
        .label_style(font(10))
        .x_label_formatter(&|v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(values.iter().zip(colors).enumerate().map(|(i, (&value, color))| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value)],
            color.filled(),
        );
        bar.set_margin(0, 0, 8 * CHART_SCALE, 8 * CHART_SCALE);
        bar
    }))?;

    let text_style = TextStyle::from(font(10)).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(values.iter().enumerate().map(|(i, &value)| {
        Text::new(value_text(value), (SegmentValue::CenterOf(i as i32), value), text_style.clone())
    }))?;

    Ok(())
}

/// Four-panel summary of one simulation: win rates, over rates, the price
/// distribution with both guesses marked, and the raw outcome counts
pub fn plot_results(
    result: &SimulationResult,
    strat1_name: &str,
    strat2_name: &str,
    strat1_guess: f64,
    strat2_guess: f64,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(filename)?;
    let root = BitMapBackend::new(filename, scaled((1000, 700))).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Price Is Right Strategy Analysis ({} simulations)", result.n),
        font(20),
    )?;

    let panels = root.split_evenly((2, 2));
    let names = vec![strat1_name.to_string(), strat2_name.to_string()];
    let percent_text = |v: f64| format!("{:.1}%", v);

    draw_bar_panel(
        &panels[0],
        "Win Rates",
        "Win Rate (%)",
        &names,
        &[result.strat1_win_rate(), result.strat2_win_rate()],
        &[STRAT1_COLOR, STRAT2_COLOR],
        &percent_text,
    )?;

    draw_bar_panel(
        &panels[1],
        "Risk (Going Over)",
        "Over Rate (%)",
        &names,
        &[result.strat1_over_rate(), result.strat2_over_rate()],
        &[STRAT1_COLOR, STRAT2_COLOR],
        &percent_text,
    )?;

    // price distribution
    {
        let product = &result.product;
        let x_min = product.mu - 3.0 * product.sigma;
        let x_max = product.mu + 3.0 * product.sigma;
        let points: Vec<(f64, f64)> = crate::utils::linspace(x_min, x_max, 300)
            .into_iter()
            .map(|x| (x, product.density(x)))
            .collect();
        let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max) * 1.1;

        let mut chart = ChartBuilder::on(&panels[2])
            .caption("Price Distribution", font(16))
            .margin(10 * CHART_SCALE)
            .x_label_area_size(30 * CHART_SCALE)
            .y_label_area_size(60 * CHART_SCALE)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

        chart.configure_mesh()
            .x_desc("Price ($)")
            .y_desc("Density")
            .label_style(font(10))
            .y_label_formatter(&|y: &f64| format!("{:.1e}", y))
            .draw()?;

        chart.draw_series(
            AreaSeries::new(points, 0.0, &BLACK.mix(0.15)).border_style(ShapeStyle::from(&BLACK.mix(0.5)).stroke_width(2 * CHART_SCALE)),
        )?;

        for (guess, color, name) in [(strat1_guess, STRAT1_COLOR, strat1_name), (strat2_guess, STRAT2_COLOR, strat2_name)] {
            if guess.is_finite() && guess >= x_min && guess <= x_max {
                chart.draw_series(DashedLineSeries::new(
                    vec![(guess, 0.0), (guess, y_max)],
                    6 * CHART_SCALE,
                    4 * CHART_SCALE,
                    ShapeStyle::from(&color).stroke_width(CHART_SCALE),
                ))?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }
        }

        chart.configure_series_labels()
            .label_font(font(10))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    draw_bar_panel(
        &panels[3],
        "Game Outcomes",
        "Count",
        &[format!("{} Wins", strat1_name), format!("{} Wins", strat2_name), "Both Over".to_string()],
        &[result.strat1_win as f64, result.strat2_win as f64, result.both_over() as f64],
        &[STRAT1_COLOR, STRAT2_COLOR, NEUTRAL_COLOR],
        &|v: f64| format!("{}", v as u64),
    )?;

    root.present()?;
    println!("Chart saved to {}", filename);
    Ok(())
}

/// Percentile win rate against the mean guess, with the 50% line
pub fn plot_mean_sweep(sweep: &MeanSweep, n: usize, filename: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(filename)?;
    let root = BitMapBackend::new(filename, scaled((900, 600))).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Mean vs. Other Percentiles Win Rate (n={})", n), font(20))
        .margin(10 * CHART_SCALE)
        .x_label_area_size(40 * CHART_SCALE)
        .y_label_area_size(50 * CHART_SCALE)
        .build_cartesian_2d(0.0..100.0, 0.0..100.0)?;

    chart.configure_mesh()
        .x_desc("Percentile")
        .y_desc("Percentile Win Rate (%)")
        .label_style(font(12))
        .draw()?;

    chart.draw_series(LineSeries::new(
        sweep.percentiles.iter().cloned()
            .zip(sweep.percentile_win_rates.iter().cloned())
            .filter(|(_, rate)| !rate.is_nan()),
        ShapeStyle::from(&BLUE).stroke_width(2 * CHART_SCALE),
    ))?;

    chart.draw_series(DashedLineSeries::new(
        vec![(0.0, 50.0), (100.0, 50.0)],
        6 * CHART_SCALE,
        4 * CHART_SCALE,
        ShapeStyle::from(&RED).stroke_width(CHART_SCALE),
    ))?;

    root.present()?;
    println!("Chart saved to {}", filename);
    Ok(())
}

/// Heatmap of strategy 2's win rate for every (strategy 1, strategy 2) percentile pair,
/// with a color bar on the right. Undecided cells are drawn white.
pub fn plot_percentile_heatmap(sweep: &PercentileSweep, n: usize, filename: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(filename)?;
    let len = sweep.percentiles.len();
    if len == 0 {
        return Err("Cannot draw heatmap: empty percentile grid".into());
    }

    let root = BitMapBackend::new(filename, scaled((820, 700))).into_drawing_area();
    root.fill(&WHITE)?;
    let (main, bar) = root.split_horizontally(700 * CHART_SCALE);

    let step = if len > 1 { 100.0 / (len - 1) as f64 } else { 100.0 };
    let half = step / 2.0;
    let lo = sweep.percentiles[0] - half;
    let hi = sweep.percentiles[len - 1] + half;

    let mut chart = ChartBuilder::on(&main)
        .caption(format!("Percentile vs. Percentile Win Rate (n={})", n), font(18))
        .margin(10 * CHART_SCALE)
        .x_label_area_size(40 * CHART_SCALE)
        .y_label_area_size(50 * CHART_SCALE)
        .build_cartesian_2d(lo..hi, lo..hi)?;

    chart.configure_mesh()
        .disable_mesh()
        .x_desc("Strategy 2 Percentile")
        .y_desc("Strategy 1 Percentile")
        .label_style(font(12))
        .draw()?;

    chart.draw_series((0..len).flat_map(|i| (0..len).map(move |j| (i, j))).map(|(i, j)| {
        let x = sweep.percentiles[j];
        let y = sweep.percentiles[i];
        Rectangle::new(
            [(x - half, y - half), (x + half, y + half)],
            rdbu(sweep.win_rates[i][j] / 100.0).filled(),
        )
    }))?;

    chart.draw_series(DashedLineSeries::new(
        vec![(0.0, 0.0), (100.0, 100.0)],
        8 * CHART_SCALE,
        5 * CHART_SCALE,
        ShapeStyle::from(&BLACK).stroke_width(CHART_SCALE),
    ))?;

    let mut color_bar = ChartBuilder::on(&bar)
        .margin_top(40 * CHART_SCALE)
        .margin_bottom(50 * CHART_SCALE)
        .margin_right(10 * CHART_SCALE)
        .y_label_area_size(50 * CHART_SCALE)
        .build_cartesian_2d(0.0..1.0, 0.0..100.0)?;

    color_bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Win Rate (%)")
        .label_style(font(10))
        .draw()?;

    color_bar.draw_series((0..100).map(|k| {
        let v = k as f64;
        Rectangle::new([(0.0, v), (1.0, v + 1.0)], rdbu((v + 0.5) / 100.0).filled())
    }))?;

    root.present()?;
    println!("Chart saved to {}", filename);
    Ok(())
}

/// Both win-rate curves of the mixed strategy vs. fixed percentile sweep
pub fn plot_g_sweep(sweep: &GSweep, n: usize, filename: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(filename)?;
    let root = SVGBackend::new(filename, scaled((900, 600))).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = sweep.g_win_rates.iter()
        .chain(&sweep.percentile_win_rates)
        .cloned()
        .fold(0.0, f64::max)
        .max(50.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Mixed Strategy vs. Fixed Percentile (n={})", n), font(20))
        .margin(10 * CHART_SCALE)
        .x_label_area_size(40 * CHART_SCALE)
        .y_label_area_size(50 * CHART_SCALE)
        .build_cartesian_2d(0.0..100.0, 0.0..y_max)?;

    chart.configure_mesh()
        .x_desc("Opponent Percentile")
        .y_desc("Win Rate (%)")
        .label_style(font(12))
        .draw()?;

    chart.draw_series(LineSeries::new(
        sweep.percentiles.iter().cloned().zip(sweep.g_win_rates.iter().cloned()),
        ShapeStyle::from(&STRAT1_COLOR).stroke_width(2 * CHART_SCALE),
    ))?
    .label("Mixed strategy")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20 * CHART_SCALE as i32, y)], &STRAT1_COLOR));

    chart.draw_series(LineSeries::new(
        sweep.percentiles.iter().cloned().zip(sweep.percentile_win_rates.iter().cloned()),
        ShapeStyle::from(&STRAT2_COLOR).stroke_width(2 * CHART_SCALE),
    ))?
    .label("Fixed percentile")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20 * CHART_SCALE as i32, y)], &STRAT2_COLOR));

    chart.configure_series_labels()
        .label_font(font(12))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    println!("Chart saved to {}", filename);
    Ok(())
}

/// Normalized histogram of the mixed strategy's guesses drawn over the price density
pub fn plot_optimal_strategy(product: &Product, guesses: &[f64], filename: &str) -> Result<(), Box<dyn Error>> {
    const NUM_BINS: usize = 60;

    let finite: Vec<f64> = guesses.iter().cloned().filter(|g| g.is_finite()).collect();
    if finite.is_empty() {
        return Err("Cannot draw strategy density: no finite guesses".into());
    }
    ensure_parent_dir(filename)?;

    let x_min = finite.iter().cloned().fold(product.mu - 3.0 * product.sigma, f64::min);
    let x_max = product.mu + 3.0 * product.sigma;
    let bin_width = (x_max - x_min) / NUM_BINS as f64;

    let mut bins = vec![0usize; NUM_BINS];
    for &guess in &finite {
        let bin_idx = ((guess - x_min) / bin_width).floor() as usize;
        bins[bin_idx.min(NUM_BINS - 1)] += 1;
    }
    let densities: Vec<f64> = bins.iter()
        .map(|&count| count as f64 / (finite.len() as f64 * bin_width))
        .collect();

    let price_curve: Vec<(f64, f64)> = crate::utils::linspace(x_min, x_max, 400)
        .into_iter()
        .map(|x| (x, product.density(x)))
        .collect();

    let y_max = densities.iter()
        .chain(price_curve.iter().map(|p| &p.1))
        .cloned()
        .fold(0.0, f64::max)
        * 1.1;

    let root = SVGBackend::new(filename, scaled((900, 600))).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mixed Strategy Guess Distribution", font(20))
        .margin(10 * CHART_SCALE)
        .x_label_area_size(40 * CHART_SCALE)
        .y_label_area_size(70 * CHART_SCALE)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart.configure_mesh()
        .x_desc("Price ($)")
        .y_desc("Density")
        .label_style(font(12))
        .y_label_formatter(&|y: &f64| format!("{:.1e}", y))
        .draw()?;

    chart.draw_series(densities.iter().enumerate().map(|(i, &density)| {
        let x0 = x_min + i as f64 * bin_width;
        Rectangle::new([(x0, 0.0), (x0 + bin_width, density)], STRAT1_COLOR.mix(0.7).filled())
    }))?
    .label(format!("Mixed strategy guesses (n={})", finite.len()))
    .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], STRAT1_COLOR.filled()));

    chart.draw_series(LineSeries::new(price_curve, ShapeStyle::from(&BLACK).stroke_width(2 * CHART_SCALE)))?
        .label("True price density")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

    chart.configure_series_labels()
        .label_font(font(12))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    println!("Chart saved to {}", filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdbu_ends_and_middle() {
        assert_eq!(rdbu(0.0), RGBColor(103, 0, 31));
        assert_eq!(rdbu(1.0), RGBColor(5, 48, 97));
        assert_eq!(rdbu(0.5), RGBColor(247, 247, 247));
    }

    #[test]
    fn test_rdbu_clamps_and_handles_nan() {
        assert_eq!(rdbu(-3.0), rdbu(0.0));
        assert_eq!(rdbu(7.0), rdbu(1.0));
        assert_eq!(rdbu(f64::NAN), rdbu(0.5));
    }

    #[test]
    fn test_scaled_sizes() {
        assert_eq!(scaled((100, 50)), (100 * CHART_SCALE, 50 * CHART_SCALE));
        assert_eq!(font(10).get_size(), (10 * CHART_SCALE) as f64);
    }
}
