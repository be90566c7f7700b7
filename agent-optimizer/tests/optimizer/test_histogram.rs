//! Histogram geometry and hover behaviour

use super::common::*;
use agent_optimizer::histogram::{
    Histogram, Kpi, KpiValues, BAR_HEIGHT, FIXED_MAX_WIDTH, MIN_ROW_WIDTH,
};
use agent_optimizer_sdk::KpiReport;

fn worked_example() -> Histogram {
    Histogram::new([
        KpiValues { human: 40.0, ai: 10.0 },
        KpiValues { human: 30.0, ai: 5.0 },
        KpiValues { human: 1000.0, ai: 200.0 },
    ])
}

#[test]
fn test_rows_share_one_scale() {
    let histogram = worked_example();
    assert_eq!(histogram.max_value(), 1000.0);

    let cost = histogram.render_row(Kpi::Cost);
    assert_eq!(cost.human_bar.width, FIXED_MAX_WIDTH);
    assert_eq!(cost.width, FIXED_MAX_WIDTH);

    let analysis = histogram.render_row(Kpi::AnalysisTime);
    assert!((analysis.human_bar.width - FIXED_MAX_WIDTH * 40.0 / 1000.0).abs() < 1e-9);
    assert_eq!(analysis.difference, "30.00");
    // Both bars are short, so the row keeps its minimum width
    assert_eq!(analysis.width, MIN_ROW_WIDTH);
}

#[test]
fn test_bar_positions() {
    let row = worked_example().render_row(Kpi::DevTime);
    assert_eq!(row.human_bar.y, 2.0);
    assert_eq!(row.ai_bar.y, 24.0);
    assert_eq!(row.human_bar.height, BAR_HEIGHT);
    assert_eq!(row.ai_bar.height, BAR_HEIGHT);
    assert_eq!(row.difference, "25.00");
}

#[test]
fn test_identical_inputs_identical_geometry() {
    assert_eq!(worked_example().rows(), worked_example().rows());
}

#[test]
fn test_invalid_values_clamp_to_zero() {
    let histogram = Histogram::new([
        KpiValues { human: -5.0, ai: f64::NAN },
        KpiValues { human: f64::INFINITY, ai: 0.0 },
        KpiValues { human: 0.5, ai: 0.25 },
    ]);

    // Floor of 1 keeps small values from filling the row
    assert_eq!(histogram.max_value(), 1.0);
    let first = histogram.render_row(Kpi::AnalysisTime);
    assert_eq!(first.human_bar.width, 0.0);
    assert_eq!(first.ai_bar.width, 0.0);
    assert_eq!(first.difference, "0.00");
    assert_eq!(histogram.render_row(Kpi::DevTime).human_bar.width, 0.0);
    assert_eq!(histogram.render_row(Kpi::Cost).human_bar.width, 60.0);
}

#[test]
fn test_bar_width_never_exceeds_max() {
    let histogram = worked_example();
    assert_eq!(histogram.bar_width(5000.0), FIXED_MAX_WIDTH);
    assert_eq!(histogram.bar_width(-1.0), 0.0);
}

#[test]
fn test_at_most_one_row_expanded() {
    let mut histogram = worked_example();
    assert!(histogram.rows().iter().all(|r| r.detail.is_none()));

    histogram.hover(Kpi::DevTime);
    histogram.hover(Kpi::Cost);
    let expanded: Vec<Kpi> = histogram
        .rows()
        .into_iter()
        .filter(|r| r.detail.is_some())
        .map(|r| r.kpi)
        .collect();
    assert_eq!(expanded, vec![Kpi::Cost]);

    histogram.leave();
    assert!(histogram.hovered().is_none());
    assert!(histogram.rows().iter().all(|r| r.detail.is_none()));
}

#[test]
fn test_detail_panel_content_and_position() {
    let mut histogram = worked_example();
    histogram.hover(Kpi::AnalysisTime);

    let detail = histogram.render_row(Kpi::AnalysisTime).detail.unwrap();
    assert_eq!(detail.rect.y, -28.0);
    assert_eq!(detail.rect.height, 24.0);
    assert_eq!(detail.human_line, "Human: 40 hr");
    assert_eq!(detail.ai_line, "AI: 10 hr");
}

#[test]
fn test_keyboard_hover_wraps() {
    let mut histogram = worked_example();
    histogram.hover_next();
    assert_eq!(histogram.hovered(), Some(Kpi::AnalysisTime));
    histogram.hover_previous();
    assert_eq!(histogram.hovered(), Some(Kpi::Cost));
    histogram.hover_next();
    assert_eq!(histogram.hovered(), Some(Kpi::AnalysisTime));
}

#[test]
fn test_from_report_compares_baseline_to_primary_agent() {
    let histogram = Histogram::from_report(&sample_report(2));
    let analysis = histogram.values(Kpi::AnalysisTime);
    assert_eq!(analysis.human, 40.0);
    assert_eq!(analysis.ai, 10.0);
    assert_eq!(histogram.values(Kpi::Cost).ai, 200.0);

    let empty = Histogram::from_report(&KpiReport::Empty);
    assert_eq!(empty.max_value(), 1.0);
    assert!(empty.rows().iter().all(|r| r.human_bar.width == 0.0));
}
