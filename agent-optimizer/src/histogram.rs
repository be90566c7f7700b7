//! Human-vs-AI comparison histogram.
//!
//! Every row is scaled against the largest value in the whole comparison set
//! (floor 1), never against its own maximum, so bar lengths stay comparable
//! across rows. At most one row is hovered at a time; the hovered row exposes
//! a two-line detail panel drawn above its bars.

use agent_optimizer_sdk::KpiReport;

use crate::utils::format_number;

/// Width of a bar whose value equals the comparison maximum
pub const FIXED_MAX_WIDTH: f64 = 120.0;
/// Rows never shrink below this, so short bars still leave room for the panel
pub const MIN_ROW_WIDTH: f64 = 40.0;
pub const BAR_HEIGHT: f64 = 16.0;
pub const ROW_HEIGHT: f64 = 44.0;

const HUMAN_BAR_Y: f64 = 2.0;
const AI_BAR_Y: f64 = 24.0;
const DETAIL_Y: f64 = -28.0;
const DETAIL_HEIGHT: f64 = 24.0;

/// One comparison row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kpi {
    AnalysisTime,
    DevTime,
    Cost,
}

impl Kpi {
    pub const ALL: [Kpi; 3] = [Kpi::AnalysisTime, Kpi::DevTime, Kpi::Cost];

    pub fn label(self) -> &'static str {
        match self {
            Kpi::AnalysisTime => "Analysis Time (hr)",
            Kpi::DevTime => "Dev Time (hr)",
            Kpi::Cost => "Cost (USD)",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Kpi::AnalysisTime | Kpi::DevTime => "hr",
            Kpi::Cost => "$",
        }
    }

    fn index(self) -> usize {
        match self {
            Kpi::AnalysisTime => 0,
            Kpi::DevTime => 1,
            Kpi::Cost => 2,
        }
    }
}

/// Which row, if any, currently shows its detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hover {
    #[default]
    None,
    Row(Kpi),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiValues {
    pub human: f64,
    pub ai: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Hover panel: human value on the first line, AI value on the second
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub rect: BarRect,
    pub human_line: String,
    pub ai_line: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub kpi: Kpi,
    /// Horizontal extent of the row: the longer bar, at least [`MIN_ROW_WIDTH`]
    pub width: f64,
    pub human_bar: BarRect,
    pub ai_bar: BarRect,
    /// `human - ai`, two decimals
    pub difference: String,
    pub detail: Option<DetailPanel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    values: [KpiValues; 3],
    max_value: f64,
    hover: Hover,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new([KpiValues::default(); 3])
    }
}

impl Histogram {
    /// Values in [`Kpi::ALL`] order
    pub fn new(values: [KpiValues; 3]) -> Self {
        let values = values.map(|v| KpiValues {
            human: sanitize(v.human),
            ai: sanitize(v.ai),
        });
        let max_value = values
            .iter()
            .flat_map(|v| [v.human, v.ai])
            .fold(1.0_f64, f64::max);

        Self {
            values,
            max_value,
            hover: Hover::None,
        }
    }

    /// Human baseline against the primary agent; zeros for anything missing
    pub fn from_report(report: &KpiReport) -> Self {
        let Some(result) = report.as_ready() else {
            return Self::default();
        };
        let baseline = result.baseline;
        let primary = result.primary_agent();

        Self::new([
            KpiValues {
                human: baseline.analysis_time_hours,
                ai: primary.map_or(0.0, |a| a.latency_hours),
            },
            KpiValues {
                human: baseline.dev_time_hours,
                ai: primary.map_or(0.0, |a| a.dev_time_hours),
            },
            KpiValues {
                human: baseline.cost_usd,
                ai: primary.map_or(0.0, |a| a.cost_usd),
            },
        ])
    }

    /// Shared scale for every row
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn values(&self, kpi: Kpi) -> KpiValues {
        self.values[kpi.index()]
    }

    /// Bar length for `value` on the shared scale, within `[0, FIXED_MAX_WIDTH]`
    pub fn bar_width(&self, value: f64) -> f64 {
        (FIXED_MAX_WIDTH * (sanitize(value) / self.max_value)).clamp(0.0, FIXED_MAX_WIDTH)
    }

    /// Geometry for one row given its two values
    pub fn render(&self, kpi: Kpi, human: f64, ai: f64) -> RowGeometry {
        let human = sanitize(human);
        let ai = sanitize(ai);
        let human_width = self.bar_width(human);
        let ai_width = self.bar_width(ai);
        let width = human_width.max(ai_width).max(MIN_ROW_WIDTH);

        let detail = (self.hover == Hover::Row(kpi)).then(|| DetailPanel {
            rect: BarRect {
                x: 0.0,
                y: DETAIL_Y,
                width,
                height: DETAIL_HEIGHT,
            },
            human_line: format!("Human: {} {}", format_number(human), kpi.unit()),
            ai_line: format!("AI: {} {}", format_number(ai), kpi.unit()),
        });

        RowGeometry {
            kpi,
            width,
            human_bar: BarRect {
                x: 0.0,
                y: HUMAN_BAR_Y,
                width: human_width,
                height: BAR_HEIGHT,
            },
            ai_bar: BarRect {
                x: 0.0,
                y: AI_BAR_Y,
                width: ai_width,
                height: BAR_HEIGHT,
            },
            difference: format!("{:.2}", human - ai),
            detail,
        }
    }

    pub fn render_row(&self, kpi: Kpi) -> RowGeometry {
        let v = self.values(kpi);
        self.render(kpi, v.human, v.ai)
    }

    pub fn rows(&self) -> Vec<RowGeometry> {
        Kpi::ALL.iter().map(|&kpi| self.render_row(kpi)).collect()
    }

    /// Pointer entered a row; any other expanded row collapses
    pub fn hover(&mut self, kpi: Kpi) {
        self.hover = Hover::Row(kpi);
    }

    /// Pointer left the hovered row
    pub fn leave(&mut self) {
        self.hover = Hover::None;
    }

    pub fn hovered(&self) -> Option<Kpi> {
        match self.hover {
            Hover::Row(kpi) => Some(kpi),
            Hover::None => None,
        }
    }

    /// Keyboard stand-in for pointer movement: step to the next row
    pub fn hover_next(&mut self) {
        let next = match self.hover {
            Hover::None => 0,
            Hover::Row(kpi) => (kpi.index() + 1) % Kpi::ALL.len(),
        };
        self.hover = Hover::Row(Kpi::ALL[next]);
    }

    pub fn hover_previous(&mut self) {
        let len = Kpi::ALL.len();
        let previous = match self.hover {
            Hover::None => len - 1,
            Hover::Row(kpi) => (kpi.index() + len - 1) % len,
        };
        self.hover = Hover::Row(Kpi::ALL[previous]);
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
