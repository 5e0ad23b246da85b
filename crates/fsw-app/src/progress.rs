/// Per-run progress of a sweep. `index` is 1-based and `total` is the sweep length.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepProgressEvent {
    RunStarted {
        index: usize,
        total: usize,
        phi: f64,
        elapsed_wall_s: f64,
    },
    RunCompleted {
        index: usize,
        total: usize,
        phi: f64,
        laminar_burning_velocity: f64,
        elapsed_wall_s: f64,
    },
    RunSkipped {
        index: usize,
        total: usize,
        phi: f64,
        error: String,
        elapsed_wall_s: f64,
    },
}

impl SweepProgressEvent {
    pub fn index(&self) -> usize {
        match self {
            Self::RunStarted { index, .. }
            | Self::RunCompleted { index, .. }
            | Self::RunSkipped { index, .. } => *index,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Self::RunStarted { total, .. }
            | Self::RunCompleted { total, .. }
            | Self::RunSkipped { total, .. } => *total,
        }
    }

    pub fn phi(&self) -> f64 {
        match self {
            Self::RunStarted { phi, .. }
            | Self::RunCompleted { phi, .. }
            | Self::RunSkipped { phi, .. } => *phi,
        }
    }

    pub fn elapsed_wall_s(&self) -> f64 {
        match self {
            Self::RunStarted { elapsed_wall_s, .. }
            | Self::RunCompleted { elapsed_wall_s, .. }
            | Self::RunSkipped { elapsed_wall_s, .. } => *elapsed_wall_s,
        }
    }
}
