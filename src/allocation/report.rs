use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// Malformed allocation: a task on several processors, wrong row/column counts
    Structural,
    /// Well-formed but inconsistent with the configuration
    Semantic,
    /// A processor or task id with no matching record
    MissingReference,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Structural => write!(f, "structural"),
            IssueKind::Semantic => write!(f, "semantic"),
            IssueKind::MissingReference => write!(f, "missing reference"),
        }
    }
}

/// A non-fatal problem recorded while decoding or validating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Structural, message)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Semantic, message)
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self::new(IssueKind::MissingReference, message)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Energy breakdown of one task on its processor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskState {
    pub task_id: usize,
    pub processor_id: usize,
    pub runtime: f64,
    pub processing_energy: f64,
    pub local_energy: f64,
    pub remote_energy: f64,
}

impl TaskState {
    pub fn total_energy(&self) -> f64 {
        self.processing_energy + self.local_energy + self.remote_energy
    }
}

/// What one processor runs and what it needs to run it.
///
/// Required RAM and bandwidth are the peak over the assigned tasks, not the sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorSummary {
    pub processor_id: usize,
    /// Matrix row as text, e.g. `1,0,1`
    pub task_vector: String,
    pub tasks: Vec<usize>,
    pub runtime: f64,
    pub required_ram: f64,
    pub installed_ram: f64,
    pub required_download: f64,
    pub download_capacity: f64,
    pub required_upload: f64,
    pub upload_capacity: f64,
    pub task_states: Vec<TaskState>,
    pub error: Option<String>,
}

impl ProcessorSummary {
    pub fn new(processor_id: usize, task_vector: String, tasks: Vec<usize>) -> Self {
        Self {
            processor_id,
            task_vector,
            tasks,
            runtime: 0.0,
            required_ram: 0.0,
            installed_ram: 0.0,
            required_download: 0.0,
            download_capacity: 0.0,
            required_upload: 0.0,
            upload_capacity: 0.0,
            task_states: Vec::new(),
            error: None,
        }
    }

    pub fn energy(&self) -> f64 {
        self.task_states.iter().map(TaskState::total_energy).sum()
    }

    /// One display line: `1,0,1 2/4 GB 100/300 Gbps 10/50 Gbps`.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} {}/{} GB {}/{} Gbps {}/{} Gbps",
            self.task_vector,
            self.required_ram,
            self.installed_ram,
            self.required_download,
            self.download_capacity,
            self.required_upload,
            self.upload_capacity
        );
        if let Some(ref error) = self.error {
            line.push_str(&format!(" Error: {}", error));
        }
        line
    }
}

/// Fully accounted allocation. Built once, never mutated after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub allocation_id: usize,
    pub processors: Vec<ProcessorSummary>,
    pub issues: Vec<Issue>,
}

impl ExecutionReport {
    /// Makespan: the largest per-processor runtime.
    pub fn runtime(&self) -> f64 {
        self.processors
            .iter()
            .map(|p| p.runtime)
            .fold(0.0, f64::max)
    }

    /// Sum over tasks of processing, local and remote energy.
    pub fn total_energy(&self) -> f64 {
        self.processors.iter().map(ProcessorSummary::energy).sum()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn processor(&self, processor_id: usize) -> Option<&ProcessorSummary> {
        self.processors
            .iter()
            .find(|p| p.processor_id == processor_id)
    }

    /// Task ids grouped by the processor running them.
    pub fn task_sets(&self) -> BTreeMap<usize, Vec<usize>> {
        self.processors
            .iter()
            .map(|p| (p.processor_id, p.tasks.clone()))
            .collect()
    }

    pub fn meets_deadline(&self, deadline: f64) -> bool {
        self.runtime() <= deadline
    }
}
