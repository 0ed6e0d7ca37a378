use std::sync::Arc;
use std::time::Duration;

use crate::error::SetupError;
use crate::model::{ProcessorRecord, Problem, TaskRecord};
use crate::proto;
use crate::search::Improvement;
use crate::solver::{ImprovementTrace, SolveOutcome, SolveRequest};

pub fn task_to_proto(task: &TaskRecord) -> proto::Task {
    proto::Task {
        id: task.id as u32,
        time: task.time,
        reference_frequency: task.reference_frequency,
        ram: task.ram,
        download: task.download,
        upload: task.upload,
        local_energy: task.local_energy,
        remote_energy: task.remote_energy,
        eligible_processors: task.eligible.iter().map(|&p| p as u32).collect(),
    }
}

pub fn task_from_proto(task: &proto::Task) -> TaskRecord {
    TaskRecord {
        id: task.id as usize,
        time: task.time,
        reference_frequency: task.reference_frequency,
        ram: task.ram,
        download: task.download,
        upload: task.upload,
        local_energy: task.local_energy,
        remote_energy: task.remote_energy,
        eligible: task
            .eligible_processors
            .iter()
            .map(|&p| p as usize)
            .collect(),
    }
}

pub fn processor_to_proto(processor: &ProcessorRecord) -> proto::Processor {
    proto::Processor {
        id: processor.id as u32,
        c2: processor.c2,
        c1: processor.c1,
        c0: processor.c0,
        frequency: processor.frequency,
        ram: processor.ram,
        download: processor.download,
        upload: processor.upload,
    }
}

pub fn processor_from_proto(processor: &proto::Processor) -> ProcessorRecord {
    ProcessorRecord {
        id: processor.id as usize,
        c2: processor.c2,
        c1: processor.c1,
        c0: processor.c0,
        frequency: processor.frequency,
        ram: processor.ram,
        download: processor.download,
        upload: processor.upload,
    }
}

pub fn run_request(request: &SolveRequest) -> proto::RunRequest {
    let problem = &request.problem;
    proto::RunRequest {
        tasks: problem.tasks().iter().map(task_to_proto).collect(),
        processors: problem.processors().iter().map(processor_to_proto).collect(),
        deadline: problem.deadline(),
        timeout_minutes: request.timeout.as_secs_f64() / 60.0,
    }
}

/// Rebuild a solve request on the serving side. The eligible sets travel with
/// the tasks and are re-checked, not trusted.
pub fn solve_request_from_proto(request: &proto::RunRequest) -> Result<SolveRequest, SetupError> {
    let timeout = Duration::try_from_secs_f64(request.timeout_minutes * 60.0).map_err(|_| {
        SetupError::InvalidConfig(format!(
            "timeout_minutes must be a non-negative number, got {}",
            request.timeout_minutes
        ))
    })?;
    let problem = Problem::with_eligibility(
        request.tasks.iter().map(task_from_proto).collect(),
        request.processors.iter().map(processor_from_proto).collect(),
        request.deadline,
    )?;
    Ok(SolveRequest::new(Arc::new(problem), timeout))
}

fn gene_vector(genes: &[usize]) -> proto::GeneVector {
    proto::GeneVector {
        genes: genes.iter().map(|&g| g as u32).collect(),
    }
}

pub fn outcome_to_response(outcome: &SolveOutcome) -> proto::RunResponse {
    match outcome {
        SolveOutcome::Improved { trace, generations } => proto::RunResponse {
            status: proto::RunStatus::Improved as i32,
            improvements: trace.iter().map(gene_vector).collect(),
            generations: *generations,
            error: String::new(),
        },
        SolveOutcome::NoFeasibleAllocation { generations } => proto::RunResponse {
            status: proto::RunStatus::NoFeasible as i32,
            improvements: Vec::new(),
            generations: *generations,
            error: String::new(),
        },
        SolveOutcome::Failed { reason } => proto::RunResponse {
            status: proto::RunStatus::Failed as i32,
            improvements: Vec::new(),
            generations: 0,
            error: reason.clone(),
        },
    }
}

pub fn outcome_from_response(response: proto::RunResponse) -> SolveOutcome {
    match proto::RunStatus::try_from(response.status) {
        Ok(proto::RunStatus::Improved) => {
            let trace = response
                .improvements
                .into_iter()
                .map(|v| v.genes.into_iter().map(|g| g as usize).collect())
                .collect();
            SolveOutcome::from_trace(ImprovementTrace::new(trace), response.generations)
        }
        Ok(proto::RunStatus::NoFeasible) => SolveOutcome::NoFeasibleAllocation {
            generations: response.generations,
        },
        Ok(proto::RunStatus::Failed) => SolveOutcome::failed(response.error),
        _ => SolveOutcome::failed(format!("unknown run status {}", response.status)),
    }
}

pub fn improvement_to_event(improvement: &Improvement) -> proto::ImprovementEvent {
    proto::ImprovementEvent {
        generation: improvement.generation,
        genes: Some(gene_vector(&improvement.genes)),
        fitness: improvement.fitness,
        energy: improvement.energy,
        makespan: improvement.makespan,
    }
}
