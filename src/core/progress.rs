//! Boot progress milestones.
//!
//! The boot sequence is runtime init, one install per package, then editor
//! preparation. Each completed step maps to a fixed percentage.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootStep {
    Init,
    Install { index: usize, package: String },
    PrepareEditor,
}

impl fmt::Display for BootStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootStep::Init => write!(f, "runtime init"),
            BootStep::Install { index, package } => {
                write!(f, "install #{} ({package})", index + 1)
            }
            BootStep::PrepareEditor => write!(f, "editor setup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    steps: usize,
}

impl ProgressPlan {
    pub fn for_packages(packages: usize) -> Self {
        Self {
            steps: packages + 2,
        }
    }

    pub fn steps(self) -> usize {
        self.steps
    }

    /// Percentage shown once `completed` steps have finished.
    pub fn milestone(self, completed: usize) -> u8 {
        if completed >= self.steps {
            return 100;
        }
        (completed * 100 / self.steps) as u8
    }

    /// Every value the bar passes through, starting at 0.
    pub fn milestones(self) -> Vec<u8> {
        (0..=self.steps).map(|k| self.milestone(k)).collect()
    }
}

/// Forward-only cursor over a [`ProgressPlan`].
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    plan: ProgressPlan,
    completed: usize,
}

impl ProgressTracker {
    pub fn new(plan: ProgressPlan) -> Self {
        Self { plan, completed: 0 }
    }

    pub fn start(&self) -> u8 {
        self.plan.milestone(0)
    }

    pub fn complete_step(&mut self) -> u8 {
        if self.completed < self.plan.steps {
            self.completed += 1;
        }
        self.current()
    }

    pub fn current(&self) -> u8 {
        self.plan.milestone(self.completed)
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.plan.steps
    }
}
