//! Chart generation using plotters.
//!
//! Three PNG charts are produced from a statistics report: number
//! frequency, monthly purchases and prize distribution. Styling is
//! configurable via chart_config.json.

use super::config::{rgb, ChartConfig};
use super::prize::PrizeRank;
use super::statistics::{MonthlyCount, NumberFrequency, PrizeTally, StatisticsReport, MAX_NUMBER};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const FREQUENCY_CHART: &str = "chart_number_frequency.png";
pub const MONTHLY_CHART: &str = "chart_monthly_purchases.png";
pub const PRIZE_CHART: &str = "chart_prize_distribution.png";

/// Upper bound for a count axis: 10% headroom, at least one step.
fn axis_max(max_count: u32) -> u32 {
    max_count + (max_count / 10).max(1)
}

/// Labelled prize buckets in display order.
pub fn prize_buckets(tally: &PrizeTally) -> Vec<(String, u32)> {
    let mut buckets: Vec<(String, u32)> = PrizeRank::ALL
        .iter()
        .map(|&rank| (rank.to_string(), tally.count(rank)))
        .collect();
    buckets.push(("No win".to_string(), tally.no_win));
    buckets.push(("Pending".to_string(), tally.undetermined));
    buckets
}

/// Numbers that get the highlight color.
fn highlighted_numbers(frequency: &NumberFrequency, top: usize) -> Vec<u32> {
    frequency
        .most_frequent(top)
        .into_iter()
        .map(|(n, _)| n)
        .collect()
}

/// Bar chart of how often each number 1..=45 was played.
pub fn generate_frequency_chart(
    frequency: &NumberFrequency,
    output_path: &Path,
    config: &ChartConfig,
) -> Result<()> {
    let root = BitMapBackend::new(
        output_path,
        (config.layout.chart_width, config.layout.chart_height),
    )
    .into_drawing_area();
    root.fill(&rgb(config.colors.background))
        .context("Failed to fill chart background")?;

    let max_count = frequency.counts.iter().copied().max().unwrap_or(0);
    let hot = highlighted_numbers(frequency, config.layout.highlight_top);
    let title = format!("Number Frequency (n = {})", frequency.total());

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", config.font.title_size))
        .margin(config.layout.margin)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((1u32..MAX_NUMBER).into_segmented(), 0u32..axis_max(max_count))
        .context("Failed to build frequency chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Number")
        .y_desc("Times played")
        .x_labels(45)
        .label_style(("sans-serif", config.font.axis_label_size))
        .light_line_style(rgb(config.colors.grid))
        .draw()
        .context("Failed to draw mesh")?;

    let fill = rgb(config.colors.bar_fill);
    let highlight = rgb(config.colors.highlight);
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .margin(2)
                .style_func(|n, _| {
                    let n = match n {
                        SegmentValue::Exact(n) | SegmentValue::CenterOf(n) => *n,
                        SegmentValue::Last => 0,
                    };
                    if hot.contains(&n) {
                        highlight.filled()
                    } else {
                        fill.filled()
                    }
                })
                .data(frequency.iter()),
        )
        .context("Failed to draw bars")?;

    root.present().context("Failed to save frequency chart")?;
    Ok(())
}

/// Bar chart of ticket lines bought per month.
pub fn generate_monthly_chart(
    monthly: &[MonthlyCount],
    output_path: &Path,
    config: &ChartConfig,
) -> Result<()> {
    let root = BitMapBackend::new(
        output_path,
        (config.layout.chart_width, config.layout.chart_height),
    )
    .into_drawing_area();
    root.fill(&rgb(config.colors.background))
        .context("Failed to fill chart background")?;

    let labels: Vec<String> = monthly.iter().map(|m| m.month.to_string()).collect();
    let max_count = monthly.iter().map(|m| m.count).max().unwrap_or(0);
    let last = monthly.len().saturating_sub(1) as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Purchases", ("sans-serif", config.font.title_size))
        .margin(config.layout.margin)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d((0u32..last).into_segmented(), 0u32..axis_max(max_count))
        .context("Failed to build monthly chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Month")
        .y_desc("Tickets")
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .label_style(("sans-serif", config.font.axis_label_size))
        .light_line_style(rgb(config.colors.grid))
        .draw()
        .context("Failed to draw mesh")?;

    let fill = rgb(config.colors.bar_fill);
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .margin(4)
                .style(fill.filled())
                .data(monthly.iter().enumerate().map(|(i, m)| (i as u32, m.count))),
        )
        .context("Failed to draw bars")?;

    chart
        .draw_series(monthly.iter().enumerate().map(|(i, m)| {
            Text::new(
                m.count.to_string(),
                (SegmentValue::CenterOf(i as u32), m.count),
                ("sans-serif", config.font.bar_label_size).into_font(),
            )
        }))
        .context("Failed to draw bar labels")?;

    root.present().context("Failed to save monthly chart")?;
    Ok(())
}

/// Bar chart of ticket lines per prize outcome.
pub fn generate_prize_chart(
    tally: &PrizeTally,
    output_path: &Path,
    config: &ChartConfig,
) -> Result<()> {
    let root = BitMapBackend::new(
        output_path,
        (config.layout.chart_width, config.layout.chart_height),
    )
    .into_drawing_area();
    root.fill(&rgb(config.colors.background))
        .context("Failed to fill chart background")?;

    let buckets = prize_buckets(tally);
    let max_count = buckets.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut colors: Vec<RGBColor> = config.colors.ranks.iter().map(|&c| rgb(c)).collect();
    colors.push(rgb(config.colors.no_win));
    colors.push(rgb(config.colors.undetermined));

    let title = format!("Prize Distribution ({} tickets)", tally.total());
    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", config.font.title_size))
        .margin(config.layout.margin)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            (0u32..buckets.len() as u32 - 1).into_segmented(),
            0u32..axis_max(max_count),
        )
        .context("Failed to build prize chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Tickets")
        .x_labels(buckets.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => buckets
                .get(*i as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .label_style(("sans-serif", config.font.axis_label_size))
        .light_line_style(rgb(config.colors.grid))
        .draw()
        .context("Failed to draw mesh")?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .margin(8)
                .style_func(|i, _| {
                    let i = match i {
                        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i as usize,
                        SegmentValue::Last => 0,
                    };
                    colors.get(i).copied().unwrap_or(BLACK).filled()
                })
                .data(buckets.iter().enumerate().map(|(i, (_, count))| (i as u32, *count))),
        )
        .context("Failed to draw bars")?;

    root.present().context("Failed to save prize chart")?;
    Ok(())
}

/// Writes all three charts into `output_dir` and returns their paths.
pub fn generate_all_charts(
    report: &StatisticsReport,
    output_dir: &Path,
    config: &ChartConfig,
) -> Result<Vec<PathBuf>> {
    let frequency_path = output_dir.join(FREQUENCY_CHART);
    generate_frequency_chart(&report.number_frequency, &frequency_path, config)?;

    let monthly_path = output_dir.join(MONTHLY_CHART);
    generate_monthly_chart(&report.monthly_purchases, &monthly_path, config)?;

    let prize_path = output_dir.join(PRIZE_CHART);
    generate_prize_chart(&report.prizes, &prize_path, config)?;

    Ok(vec![frequency_path, monthly_path, prize_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_max_has_headroom() {
        assert_eq!(axis_max(0), 1);
        assert_eq!(axis_max(5), 6);
        assert_eq!(axis_max(100), 110);
    }

    #[test]
    fn test_prize_buckets_order() {
        let tally = PrizeTally {
            first: 1,
            fifth: 3,
            no_win: 10,
            undetermined: 2,
            ..Default::default()
        };
        let buckets = prize_buckets(&tally);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0], ("1st".to_string(), 1));
        assert_eq!(buckets[4], ("5th".to_string(), 3));
        assert_eq!(buckets[5], ("No win".to_string(), 10));
        assert_eq!(buckets[6], ("Pending".to_string(), 2));
    }

    #[test]
    fn test_highlighted_numbers() {
        let mut counts = vec![0u32; 45];
        counts[6] = 5; // 7
        counts[0] = 2; // 1
        counts[44] = 5; // 45
        let frequency = NumberFrequency { counts };
        assert_eq!(highlighted_numbers(&frequency, 2), vec![7, 45]);
        assert_eq!(highlighted_numbers(&frequency, 10), vec![7, 45, 1]);
    }
}
