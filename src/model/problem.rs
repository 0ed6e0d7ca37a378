use crate::error::SetupError;
use crate::model::eligibility::{eligible_processors, is_eligible};
use crate::model::record::{ProcessorRecord, TaskRecord};

/// The immutable input of one optimisation run.
///
/// Task and processor ids must equal their position in the lists so genes can
/// index processors directly. Every task carries a non-empty eligible set.
/// A `Problem` is shared read-only (behind an `Arc`) by concurrent solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    tasks: Vec<TaskRecord>,
    processors: Vec<ProcessorRecord>,
    deadline: f64,
}

impl Problem {
    /// Build a problem from raw records, computing every task's eligible set.
    pub fn new(
        mut tasks: Vec<TaskRecord>,
        processors: Vec<ProcessorRecord>,
        deadline: f64,
    ) -> Result<Self, SetupError> {
        check_shape(&tasks, &processors, deadline)?;

        for task in &mut tasks {
            task.eligible = eligible_processors(task, &processors, deadline);
            if task.eligible.is_empty() {
                return Err(SetupError::NoEligibleProcessor(task.id));
            }
        }

        tracing::debug!(
            tasks = tasks.len(),
            processors = processors.len(),
            deadline,
            "Problem prepared"
        );

        Ok(Self {
            tasks,
            processors,
            deadline,
        })
    }

    /// Build a problem whose eligible sets were computed elsewhere, checking
    /// that each set is non-empty and only names processors that fit.
    pub fn with_eligibility(
        tasks: Vec<TaskRecord>,
        processors: Vec<ProcessorRecord>,
        deadline: f64,
    ) -> Result<Self, SetupError> {
        check_shape(&tasks, &processors, deadline)?;

        for task in &tasks {
            if task.eligible.is_empty() {
                return Err(SetupError::NoEligibleProcessor(task.id));
            }
            for &p in &task.eligible {
                let processor = processors.get(p).ok_or(SetupError::UnknownProcessor {
                    task: task.id,
                    processor: p,
                })?;
                if !is_eligible(task, processor, deadline) {
                    return Err(SetupError::IneligibleProcessor {
                        task: task.id,
                        processor: p,
                    });
                }
            }
        }

        Ok(Self {
            tasks,
            processors,
            deadline,
        })
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn processors(&self) -> &[ProcessorRecord] {
        &self.processors
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }
}

fn check_shape(
    tasks: &[TaskRecord],
    processors: &[ProcessorRecord],
    deadline: f64,
) -> Result<(), SetupError> {
    if tasks.is_empty() {
        return Err(SetupError::NoTasks);
    }
    if processors.is_empty() {
        return Err(SetupError::NoProcessors);
    }
    if !deadline.is_finite() || deadline <= 0.0 {
        return Err(SetupError::InvalidDeadline(deadline));
    }
    for (position, task) in tasks.iter().enumerate() {
        if task.id != position {
            return Err(SetupError::IdMismatch {
                kind: "Task",
                position,
                id: task.id,
            });
        }
    }
    for (position, processor) in processors.iter().enumerate() {
        if processor.id != position {
            return Err(SetupError::IdMismatch {
                kind: "Processor",
                position,
                id: processor.id,
            });
        }
    }

    for task in tasks {
        positive("Task", task.id, "time", task.time)?;
        positive("Task", task.id, "reference_frequency", task.reference_frequency)?;
        non_negative("Task", task.id, "ram", task.ram)?;
        non_negative("Task", task.id, "download", task.download)?;
        non_negative("Task", task.id, "upload", task.upload)?;
        non_negative("Task", task.id, "local_energy", task.local_energy)?;
        non_negative("Task", task.id, "remote_energy", task.remote_energy)?;
    }
    for processor in processors {
        positive("Processor", processor.id, "frequency", processor.frequency)?;
        non_negative("Processor", processor.id, "ram", processor.ram)?;
        non_negative("Processor", processor.id, "download", processor.download)?;
        non_negative("Processor", processor.id, "upload", processor.upload)?;
        // Power drawn at the processor's own frequency
        non_negative(
            "Processor",
            processor.id,
            "energy_per_second",
            processor.energy_per_second(),
        )?;
    }
    Ok(())
}

fn positive(
    kind: &'static str,
    id: usize,
    field: &'static str,
    value: f64,
) -> Result<(), SetupError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SetupError::InvalidValue {
            kind,
            id,
            field,
            value,
        })
    }
}

fn non_negative(
    kind: &'static str,
    id: usize,
    field: &'static str,
    value: f64,
) -> Result<(), SetupError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SetupError::InvalidValue {
            kind,
            id,
            field,
            value,
        })
    }
}
