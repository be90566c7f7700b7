//! Application view routing

/// Application view/route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dialogue,  // Guided questions
    FollowUp,  // Free-form chat about the result
    Dashboard, // Agents, histogram, commentary
    Graph,     // Workflow graph canvas
}

impl View {
    pub const ALL: [View; 4] = [View::Dialogue, View::FollowUp, View::Dashboard, View::Graph];

    pub fn title(self) -> &'static str {
        match self {
            View::Dialogue => "Questions",
            View::FollowUp => "Follow-up Chat",
            View::Dashboard => "KPI Dashboard",
            View::Graph => "Workflow Graph",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + len - 1) % len]
    }
}

/// Which derived graph the graph view draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphSource {
    #[default]
    Answers,
    Analysis,
}

impl GraphSource {
    pub fn toggle(self) -> Self {
        match self {
            GraphSource::Answers => GraphSource::Analysis,
            GraphSource::Analysis => GraphSource::Answers,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GraphSource::Answers => "Answers",
            GraphSource::Analysis => "Analysis",
        }
    }
}
