use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::config::SolverConfig;
use crate::error::SetupError;
use crate::model::Problem;
use crate::search::candidate::Candidate;
use crate::search::fitness::FitnessEvaluator;
use crate::search::termination::Termination;

/// Sent whenever the tracked best candidate strictly improves and is feasible.
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub generation: u64,
    pub genes: Vec<usize>,
    pub fitness: f64,
    pub energy: f64,
    pub makespan: f64,
}

/// Final state of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best candidate seen over the whole run (may be infeasible)
    pub best: Candidate,
    pub generations: u64,
    pub improvements: usize,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn is_feasible(&self) -> bool {
        self.best.score() > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Init,
    Evaluate,
    Iterate,
    Done,
}

/// Generational genetic search over task assignments.
///
/// Runs single-threaded: each generation is built from the fully evaluated
/// previous one. Tournament selection, single-point crossover, displacement
/// mutation and elitist replacement drive candidates towards lower energy.
pub struct SearchEngine<'a> {
    problem: &'a Problem,
    config: SolverConfig,
    termination: Termination,
    evaluator: FitnessEvaluator<'a>,
    rng: StdRng,
    improvements: Option<mpsc::UnboundedSender<Improvement>>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        problem: &'a Problem,
        config: SolverConfig,
        termination: Termination,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            problem,
            evaluator: FitnessEvaluator::new(problem),
            config,
            termination,
            rng,
            improvements: None,
        })
    }

    /// Report every strict feasible improvement on `tx`, in generation order.
    pub fn with_improvements(mut self, tx: mpsc::UnboundedSender<Improvement>) -> Self {
        self.improvements = Some(tx);
        self
    }

    pub fn run(mut self) -> SearchResult {
        let started = Instant::now();
        let mut state = SearchState::Init;
        let mut population: Vec<Candidate> = Vec::new();
        let mut best: Option<Candidate> = None;
        let mut generations = 0u64;
        let mut improvements = 0usize;

        tracing::info!(
            tasks = self.problem.task_count(),
            processors = self.problem.processor_count(),
            population = self.config.population_min,
            max_generations = self.config.max_generations,
            "Search started"
        );

        loop {
            state = match state {
                SearchState::Init => {
                    population = (0..self.config.population_min)
                        .map(|_| Candidate::random(self.problem, &mut self.rng))
                        .collect();
                    SearchState::Evaluate
                }
                SearchState::Evaluate => {
                    self.evaluate(&mut population);
                    generations += 1;

                    if let Some(leader) = population.first() {
                        let improved = best
                            .as_ref()
                            .map_or(true, |b| leader.score() > b.score());
                        if improved {
                            best = Some(leader.clone());
                            if leader.score() > 0.0 {
                                improvements += 1;
                                self.notify(generations, leader);
                            }
                        }
                    }

                    if self.termination.has_reached(generations, started.elapsed()) {
                        SearchState::Done
                    } else {
                        SearchState::Iterate
                    }
                }
                SearchState::Iterate => {
                    population = self.next_generation(&population);
                    SearchState::Evaluate
                }
                SearchState::Done => break,
            };
        }

        let elapsed = started.elapsed();
        let best = best.unwrap_or_else(|| Candidate::from_genes(Vec::new()));
        tracing::info!(
            generations,
            improvements,
            best_fitness = best.score(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search finished"
        );

        SearchResult {
            best,
            generations,
            improvements,
            elapsed,
        }
    }

    /// Score unevaluated candidates, order fittest first and cap the size.
    fn evaluate(&mut self, population: &mut Vec<Candidate>) {
        for candidate in population.iter_mut() {
            if candidate.fitness().is_none() {
                let fitness = self.evaluator.evaluate(candidate.genes());
                candidate.set_fitness(fitness);
            }
        }
        population.sort_by(|a, b| b.score().total_cmp(&a.score()));
        population.truncate(self.config.population_max);
    }

    fn notify(&mut self, generation: u64, candidate: &Candidate) {
        let assessment = self.evaluator.assess(candidate.genes());
        tracing::debug!(
            generation,
            energy = assessment.energy,
            makespan = assessment.makespan,
            "Best candidate improved"
        );

        if let Some(tx) = &self.improvements {
            let event = Improvement {
                generation,
                genes: candidate.genes().to_vec(),
                fitness: assessment.fitness,
                energy: assessment.energy,
                makespan: assessment.makespan,
            };
            if tx.send(event).is_err() {
                // Receiver dropped, stop reporting
                self.improvements = None;
            }
        }
    }

    /// Expects `population` sorted fittest first.
    fn next_generation(&mut self, population: &[Candidate]) -> Vec<Candidate> {
        let elite = self.config.elite_count.min(population.len());
        let target = elite + self.config.population_min;
        let mut next: Vec<Candidate> = population[..elite].to_vec();

        while next.len() < target {
            let first = self.tournament(population);
            let second = self.tournament(population);

            let (mut a, mut b) = if self.problem.task_count() > 1
                && self.rng.gen_bool(self.config.crossover_probability)
            {
                let cut = self.rng.gen_range(1..self.problem.task_count());
                first.crossover(second, cut)
            } else {
                (first.clone(), second.clone())
            };

            for child in [&mut a, &mut b] {
                if self.rng.gen_bool(self.config.mutation_probability) {
                    child.displace(&mut self.rng);
                    child.repair(self.problem, &mut self.rng);
                }
            }

            next.push(a);
            if next.len() < target {
                next.push(b);
            }
        }

        next
    }

    fn tournament<'p>(&mut self, population: &'p [Candidate]) -> &'p Candidate {
        let mut winner = &population[self.rng.gen_range(0..population.len())];
        for _ in 1..self.config.tournament_size {
            let contender = &population[self.rng.gen_range(0..population.len())];
            if contender.score() > winner.score() {
                winner = contender;
            }
        }
        winner
    }
}

/// Largest per-processor runtime of `genes`.
pub fn makespan(problem: &Problem, genes: &[usize]) -> f64 {
    FitnessEvaluator::new(problem).assess(genes).makespan
}
