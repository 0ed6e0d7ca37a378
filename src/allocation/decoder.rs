use std::collections::BTreeSet;

use crate::allocation::matrix::AllocationMatrix;
use crate::allocation::report::{ExecutionReport, Issue, ProcessorSummary, TaskState};
use crate::model::{Limits, ProcessorRecord, Problem, Program, TaskRecord};

/// Processor and task counts an allocation declares for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredShape {
    pub processors: usize,
    pub tasks: usize,
}

/// Turns gene vectors and allocation matrices into execution reports.
///
/// Bad references are recorded on the report and skipped; one bad entry
/// never invalidates the rest of the decode.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    tasks: &'a [TaskRecord],
    processors: &'a [ProcessorRecord],
    unresolved: &'a [(usize, String)],
}

impl<'a> Decoder<'a> {
    pub fn new(tasks: &'a [TaskRecord], processors: &'a [ProcessorRecord]) -> Self {
        Self {
            tasks,
            processors,
            unresolved: &[],
        }
    }

    /// Processors known to exist but without usable details, each with the
    /// error to report in place of the generic missing-details message.
    pub fn with_unresolved(mut self, unresolved: &'a [(usize, String)]) -> Self {
        self.unresolved = unresolved;
        self
    }

    pub fn for_problem(problem: &'a Problem) -> Self {
        Self::new(problem.tasks(), problem.processors())
    }

    /// Decode a solver's gene vector. A vector of the wrong length is a
    /// structural issue; genes naming unknown processors are missing
    /// references and their tasks stay unassigned.
    pub fn decode_genes(&self, allocation_id: usize, genes: &[usize]) -> ExecutionReport {
        let mut issues = Vec::new();

        if genes.len() != self.tasks.len() {
            issues.push(Issue::structural(format!(
                "Allocation {} has {} genes != TASKS {}",
                allocation_id,
                genes.len(),
                self.tasks.len()
            )));
        }

        let rows = self
            .processors
            .iter()
            .map(|p| p.id)
            .chain(self.unresolved.iter().map(|(id, _)| *id))
            .map(|id| id + 1)
            .max()
            .unwrap_or(0);
        let unknown: BTreeSet<usize> = genes.iter().copied().filter(|&g| g >= rows).collect();
        for processor_id in unknown {
            issues.push(Issue::missing(format!(
                "PROCESSOR details are missing for ID {}",
                processor_id
            )));
        }

        let matrix = AllocationMatrix::from_genes(genes, rows);
        self.account(allocation_id, &matrix, issues, &[])
    }

    /// Decode a persisted matrix, checking its shape against `declared` and
    /// that no task sits on more than one processor.
    pub fn decode_matrix(
        &self,
        allocation_id: usize,
        matrix: &AllocationMatrix,
        declared: DeclaredShape,
    ) -> ExecutionReport {
        let mut issues = Vec::new();

        if matrix.processor_count() != declared.processors {
            issues.push(Issue::structural(format!(
                "Allocation {} has processors {} != ALLOCATIONS.PROCESSORS {}",
                allocation_id,
                matrix.processor_count(),
                declared.processors
            )));
        }
        for p in 0..matrix.processor_count() {
            if matrix.row_len(p) != declared.tasks {
                issues.push(Issue::structural(format!(
                    "Allocation {} row {} has tasks {} != ALLOCATIONS.TASKS {}",
                    allocation_id,
                    p,
                    matrix.row_len(p),
                    declared.tasks
                )));
            }
        }

        let mut conflicted = Vec::new();
        for task in 0..matrix.task_count() {
            let hosts = matrix.task_processors(task);
            if hosts.len() > 1 {
                let listed = hosts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                issues.push(Issue::structural(format!(
                    "Task {} in Allocation {} is assigned to more than 1 processors {}",
                    task, allocation_id, listed
                )));
                conflicted.push(task);
            }
        }

        self.account(allocation_id, matrix, issues, &conflicted)
    }

    /// Accumulate runtime, energy and peak resource needs per active
    /// processor. Tasks in `skip` are left out of the accounting.
    fn account(
        &self,
        allocation_id: usize,
        matrix: &AllocationMatrix,
        mut issues: Vec<Issue>,
        skip: &[usize],
    ) -> ExecutionReport {
        let mut summaries = Vec::new();

        for processor_id in matrix.active_processors() {
            let tasks = matrix.processor_tasks(processor_id);
            let mut summary = ProcessorSummary::new(
                processor_id,
                matrix.processor_task_vector(processor_id),
                tasks.clone(),
            );

            let Some(processor) = self.processors.iter().find(|p| p.id == processor_id) else {
                let message = self
                    .unresolved
                    .iter()
                    .find(|(id, _)| *id == processor_id)
                    .map(|(_, message)| message.clone())
                    .unwrap_or_else(|| {
                        format!("PROCESSOR details are missing for ID {}", processor_id)
                    });
                issues.push(Issue::missing(message.clone()));
                summary.error = Some(message);
                summaries.push(summary);
                continue;
            };

            summary.installed_ram = processor.ram;
            summary.download_capacity = processor.download;
            summary.upload_capacity = processor.upload;

            for task_id in tasks.into_iter().filter(|t| !skip.contains(t)) {
                let Some(task) = self.tasks.iter().find(|t| t.id == task_id) else {
                    issues.push(Issue::missing(format!("TASK.ID={} is missing", task_id)));
                    continue;
                };

                let runtime = task.runtime_on(processor);
                summary.runtime += runtime;
                summary.required_ram = summary.required_ram.max(task.ram);
                summary.required_download = summary.required_download.max(task.download);
                summary.required_upload = summary.required_upload.max(task.upload);
                summary.task_states.push(TaskState {
                    task_id,
                    processor_id,
                    runtime,
                    processing_energy: processor.energy_per_second() * runtime,
                    local_energy: task.local_energy,
                    remote_energy: task.remote_energy,
                });
            }

            summaries.push(summary);
        }

        ExecutionReport {
            allocation_id,
            processors: summaries,
            issues,
        }
    }
}

/// Cross-check a decoded allocation against the program declaration and
/// limits. Everything found here is semantic and non-fatal.
pub fn check_program(
    report: &mut ExecutionReport,
    declared: DeclaredShape,
    program: &Program,
    limits: &Limits,
) {
    let id = report.allocation_id;
    let mut issues = Vec::new();

    if declared.processors != program.processors {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.PROCESSORS {} != PROGRAM.PROCESSORS {}",
            declared.processors, program.processors
        )));
    }
    if declared.tasks != program.tasks {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.TASKS {} != PROGRAM.TASKS {}",
            declared.tasks, program.tasks
        )));
    }

    let runtime = report.runtime();
    if runtime > program.duration {
        issues.push(Issue::semantic(format!(
            "Allocation ID={} has Runtime {} > PROGRAM.DURATION {}",
            id, runtime, program.duration
        )));
    }

    let used = report.processors.len();
    if used > program.processors {
        issues.push(Issue::semantic(format!(
            "Allocation ID={} has processors {} > PROGRAM.PROCESSORS {}",
            id, used, program.processors
        )));
    }

    if let Some(min) = limits.minimum_tasks.filter(|&m| declared.tasks < m) {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.TASKS {} < LIMIT.MINIMUM_TASKS {}",
            declared.tasks, min
        )));
    }
    if let Some(max) = limits.maximum_tasks.filter(|&m| declared.tasks > m) {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.TASKS {} > LIMIT.MAXIMUM_TASKS {}",
            declared.tasks, max
        )));
    }
    if let Some(min) = limits.minimum_processors.filter(|&m| declared.processors < m) {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.PROCESSORS {} < LIMIT.MINIMUM_PROCESSORS {}",
            declared.processors, min
        )));
    }
    if let Some(max) = limits.maximum_processors.filter(|&m| declared.processors > m) {
        issues.push(Issue::semantic(format!(
            "ALLOCATIONS.PROCESSORS {} > LIMIT.MAXIMUM_PROCESSORS {}",
            declared.processors, max
        )));
    }

    report.issues.extend(issues);
}
