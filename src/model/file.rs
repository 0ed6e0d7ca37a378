use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocation::decoder::{check_program, DeclaredShape, Decoder};
use crate::allocation::matrix::AllocationMatrix;
use crate::allocation::report::{ExecutionReport, Issue, IssueKind};
use crate::error::{Result, SetupError};
use crate::model::problem::Problem;
use crate::model::record::{ProcessorRecord, TaskRecord};

/// Program-level declarations the allocations are checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Global deadline every processor must finish within
    pub duration: f64,
    pub tasks: usize,
    pub processors: usize,
}

/// Optional bounds on the program and on each processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub minimum_tasks: Option<usize>,
    pub maximum_tasks: Option<usize>,
    pub minimum_processors: Option<usize>,
    pub maximum_processors: Option<usize>,
    pub minimum_frequency: Option<f64>,
    pub maximum_frequency: Option<f64>,
    pub minimum_ram: Option<f64>,
    pub maximum_ram: Option<f64>,
    pub minimum_download: Option<f64>,
    pub maximum_download: Option<f64>,
    pub minimum_upload: Option<f64>,
    pub maximum_upload: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: usize,
    pub runtime: f64,
    pub reference_frequency: f64,
    pub ram: f64,
    pub download: f64,
    pub upload: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    pub id: usize,
    #[serde(rename = "type")]
    pub type_name: String,
    pub frequency: f64,
    pub ram: f64,
    pub download: f64,
    pub upload: f64,
}

/// Power coefficients shared by every processor of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorType {
    pub name: String,
    pub c2: f64,
    pub c1: f64,
    pub c0: f64,
}

/// A complete problem definition as stored on disk (JSON).
///
/// Communication matrices are task × task: element `[i][j]` is the energy
/// task `i` spends talking to task `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub program: Program,
    #[serde(default)]
    pub limits: Limits,
    pub tasks: Vec<TaskSpec>,
    pub processors: Vec<ProcessorSpec>,
    pub processor_types: Vec<ProcessorType>,
    pub local_communication: Vec<Vec<f64>>,
    pub remote_communication: Vec<Vec<f64>>,
}

impl ProblemFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let file = Self::from_json(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            tasks = file.tasks.len(),
            processors = file.processors.len(),
            "Problem file loaded"
        );
        Ok(file)
    }

    pub fn processor_type(&self, name: &str) -> Option<&ProcessorType> {
        self.processor_types.iter().find(|t| t.name == name)
    }

    /// Non-fatal checks of the declared counts, limits and matrix shapes.
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        let limits = &self.limits;

        if self.tasks.len() != self.program.tasks {
            issues.push(Issue::semantic(format!(
                "{} tasks listed != PROGRAM.TASKS {}",
                self.tasks.len(),
                self.program.tasks
            )));
        }
        if self.processors.len() != self.program.processors {
            issues.push(Issue::semantic(format!(
                "{} processors listed != PROGRAM.PROCESSORS {}",
                self.processors.len(),
                self.program.processors
            )));
        }

        for p in &self.processors {
            let checks = [
                ("FREQUENCY", p.frequency, limits.minimum_frequency, limits.maximum_frequency),
                ("RAM", p.ram, limits.minimum_ram, limits.maximum_ram),
                ("DOWNLOAD", p.download, limits.minimum_download, limits.maximum_download),
                ("UPLOAD", p.upload, limits.minimum_upload, limits.maximum_upload),
            ];
            for (name, value, min, max) in checks {
                if let Some(min) = min.filter(|&min| value < min) {
                    issues.push(Issue::semantic(format!(
                        "PROCESSOR.ID={} {} {} < LIMIT.MINIMUM_{} {}",
                        p.id, name, value, name, min
                    )));
                }
                if let Some(max) = max.filter(|&max| value > max) {
                    issues.push(Issue::semantic(format!(
                        "PROCESSOR.ID={} {} {} > LIMIT.MAXIMUM_{} {}",
                        p.id, name, value, name, max
                    )));
                }
            }
            if self.processor_type(&p.type_name).is_none() {
                issues.push(Issue::new(IssueKind::MissingReference, missing_type_message(p)));
            }
        }

        for (name, matrix) in [
            ("LOCAL-COMMUNICATION", &self.local_communication),
            ("REMOTE-COMMUNICATION", &self.remote_communication),
        ] {
            let square = matrix.len() == self.tasks.len()
                && matrix.iter().all(|row| row.len() == self.tasks.len());
            if !square {
                issues.push(Issue::structural(format!(
                    "{} map is not {}x{}",
                    name,
                    self.tasks.len(),
                    self.tasks.len()
                )));
            }
            if matrix.iter().flatten().any(|&e| e < 0.0) {
                issues.push(Issue::semantic(format!(
                    "{} map contains negative energy",
                    name
                )));
            }
        }

        issues
    }

    /// Task records with communication energy resolved from the matrices.
    pub fn task_records(&self) -> Vec<TaskRecord> {
        self.tasks
            .iter()
            .map(|t| {
                TaskRecord::new(t.id, t.runtime, t.reference_frequency)
                    .with_resources(t.ram, t.download, t.upload)
                    .with_communication(
                        row_energy(&self.local_communication, t.id),
                        row_energy(&self.remote_communication, t.id),
                    )
            })
            .collect()
    }

    fn processor_record(&self, spec: &ProcessorSpec) -> Option<ProcessorRecord> {
        let ty = self.processor_type(&spec.type_name)?;
        Some(
            ProcessorRecord::new(spec.id, spec.frequency)
                .with_coefficients(ty.c2, ty.c1, ty.c0)
                .with_capacity(spec.ram, spec.download, spec.upload),
        )
    }

    /// Processor records with power coefficients resolved from their type.
    pub fn processor_records(&self) -> std::result::Result<Vec<ProcessorRecord>, SetupError> {
        self.processors
            .iter()
            .map(|p| {
                self.processor_record(p)
                    .ok_or_else(|| SetupError::UnknownProcessorType {
                        processor: p.id,
                        type_name: p.type_name.clone(),
                    })
            })
            .collect()
    }

    /// Like [`processor_records`](Self::processor_records), but processors
    /// whose type is unknown are returned separately with the error to
    /// report for them instead of failing the whole list.
    pub fn resolved_processors(&self) -> (Vec<ProcessorRecord>, Vec<(usize, String)>) {
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for p in &self.processors {
            match self.processor_record(p) {
                Some(record) => resolved.push(record),
                None => unresolved.push((p.id, missing_type_message(p))),
            }
        }
        (resolved, unresolved)
    }

    /// Decode a persisted allocation matrix against this file and cross-check
    /// it with the program declaration. Processors of unknown type are
    /// reported on their own summary; the rest is still accounted.
    pub fn decode_map(&self, allocation_id: usize, matrix: &AllocationMatrix) -> ExecutionReport {
        let tasks = self.task_records();
        let (processors, unresolved) = self.resolved_processors();
        let declared = DeclaredShape {
            processors: self.program.processors,
            tasks: self.program.tasks,
        };

        let mut report = Decoder::new(&tasks, &processors)
            .with_unresolved(&unresolved)
            .decode_matrix(allocation_id, matrix, declared);
        check_program(&mut report, declared, &self.program, &self.limits);
        report
    }

    pub fn to_problem(&self) -> Result<Problem> {
        let processors = self.processor_records()?;
        Ok(Problem::new(
            self.task_records(),
            processors,
            self.program.duration,
        )?)
    }
}

fn missing_type_message(spec: &ProcessorSpec) -> String {
    format!(
        "PROCESSOR-TYPE is missing for NAME {} used by PROCESSOR.ID={}",
        spec.type_name, spec.id
    )
}

fn row_energy(matrix: &[Vec<f64>], task: usize) -> f64 {
    matrix.get(task).map(|row| row.iter().sum()).unwrap_or(0.0)
}
