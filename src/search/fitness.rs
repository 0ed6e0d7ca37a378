use crate::model::Problem;

/// Energy and makespan of one gene vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub energy: f64,
    pub makespan: f64,
    /// 0 when the makespan exceeds the deadline, otherwise 1 / energy
    pub fitness: f64,
}

impl Assessment {
    pub fn is_feasible(&self) -> bool {
        self.fitness > 0.0
    }
}

/// Scores gene vectors against one problem.
///
/// Owns a per-processor runtime scratch buffer, so each solver needs its own.
#[derive(Debug)]
pub struct FitnessEvaluator<'a> {
    problem: &'a Problem,
    runtime: Vec<f64>,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            runtime: vec![0.0; problem.processor_count()],
        }
    }

    pub fn evaluate(&mut self, genes: &[usize]) -> f64 {
        self.assess(genes).fitness
    }

    pub fn assess(&mut self, genes: &[usize]) -> Assessment {
        self.runtime.iter_mut().for_each(|t| *t = 0.0);
        let processors = self.problem.processors();
        let mut energy = 0.0;

        for (task, &p) in self.problem.tasks().iter().zip(genes) {
            let processor = &processors[p];
            let time = task.runtime_on(processor);
            self.runtime[p] += time;
            energy += processor.energy_per_second() * time + task.communication_energy();
        }

        let makespan = self.runtime.iter().copied().fold(0.0, f64::max);
        let fitness = if makespan > self.problem.deadline() {
            0.0
        } else {
            1.0 / energy
        };

        Assessment {
            energy,
            makespan,
            fitness,
        }
    }
}
