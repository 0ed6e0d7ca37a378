//! Integration tests for eligibility, fitness and the genetic search engine.

mod test_harness;

use std::time::Duration;

use energy_alloc::error::SetupError;
use energy_alloc::model::eligibility::is_eligible;
use energy_alloc::model::Problem;
use energy_alloc::search::{makespan, Candidate, FitnessEvaluator, SearchEngine, Termination};
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_harness::{mixed_problem, quick_config, single_processor_problem};
use tokio::sync::mpsc;

#[test]
fn test_eligible_sets_respect_every_constraint() {
    let problem = mixed_problem();
    for task in problem.tasks() {
        assert!(!task.eligible.is_empty());
        for processor in problem.processors() {
            let listed = task.eligible.contains(&processor.id);
            let fits = task.runtime_on(processor) <= problem.deadline()
                && task.ram <= processor.ram
                && task.download <= processor.download
                && task.upload <= processor.upload;
            assert_eq!(listed, fits, "task {} on {}", task.id, processor.id);
            assert_eq!(listed, is_eligible(task, processor, problem.deadline()));
        }
    }
}

#[test]
fn test_fitness_is_deterministic() {
    let problem = mixed_problem();
    let mut rng = StdRng::seed_from_u64(7);
    let mut evaluator = FitnessEvaluator::new(&problem);

    for _ in 0..20 {
        let candidate = Candidate::random(&problem, &mut rng);
        let first = evaluator.evaluate(candidate.genes());
        let second = evaluator.evaluate(candidate.genes());
        assert_eq!(first, second);

        // A fresh evaluator (fresh scratch buffer) agrees too
        let fresh = FitnessEvaluator::new(&problem).evaluate(candidate.genes());
        assert_eq!(first, fresh);
    }
}

#[test]
fn test_candidate_over_deadline_scores_zero() {
    let problem = mixed_problem();
    // Everything on the slow processor: 13.5s > 12.0
    let genes = vec![0; problem.task_count()];
    assert!(makespan(&problem, &genes) > problem.deadline());

    let assessment = FitnessEvaluator::new(&problem).assess(&genes);
    assert_eq!(assessment.fitness, 0.0);
    assert!(!assessment.is_feasible());
    assert!(assessment.energy > 0.0);
}

#[test]
fn test_two_tasks_on_one_processor_scenario() {
    let problem = single_processor_problem(3.0).unwrap();
    for task in problem.tasks() {
        assert_eq!(task.eligible, vec![0]);
        assert_eq!(task.runtime_on(&problem.processors()[0]), 1.0);
    }

    let assessment = FitnessEvaluator::new(&problem).assess(&[0, 0]);
    assert_eq!(assessment.makespan, 2.0);
    let expected = 2.0 * (5.0 * 1.0 + 0.5 + 0.25);
    assert!((assessment.energy - expected).abs() < 1e-9);
    assert!((assessment.fitness - 1.0 / expected).abs() < 1e-12);
}

#[test]
fn test_deadline_below_every_runtime_is_setup_error() {
    let err = single_processor_problem(0.5).unwrap_err();
    assert_eq!(err, SetupError::NoEligibleProcessor(0));
}

#[test]
fn test_search_without_feasible_candidate_reports_nothing() {
    // Each task fits alone (1.0 <= 1.5) but together they need 2.0
    let problem = single_processor_problem(1.5).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let termination = Termination::GenerationCap(25);
    let result = SearchEngine::new(&problem, quick_config(3), termination)
        .unwrap()
        .with_improvements(tx)
        .run();

    assert_eq!(result.generations, 25);
    assert_eq!(result.improvements, 0);
    assert!(!result.is_feasible());
    assert!(rx.try_recv().is_err(), "no improvement may be reported");
}

#[test]
fn test_improvements_are_strict_and_in_generation_order() {
    let problem = mixed_problem();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = SearchEngine::new(&problem, quick_config(11), Termination::GenerationCap(60))
        .unwrap()
        .with_improvements(tx)
        .run();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(!events.is_empty());
    assert_eq!(events.len(), result.improvements);
    for pair in events.windows(2) {
        assert!(pair[0].generation < pair[1].generation);
        assert!(pair[0].fitness < pair[1].fitness);
    }
    for event in &events {
        assert!(event.makespan <= problem.deadline());
        assert!((event.fitness - 1.0 / event.energy).abs() < 1e-12);
        assert!(Candidate::from_genes(event.genes.clone()).is_valid_for(&problem));
    }

    let last = events.last().unwrap();
    assert_eq!(last.genes, result.best.genes());
}

#[test]
fn test_seeded_search_is_reproducible() {
    let problem = mixed_problem();
    let run = || {
        SearchEngine::new(&problem, quick_config(42), Termination::GenerationCap(30))
            .unwrap()
            .run()
    };

    let first = run();
    let second = run();
    assert_eq!(first.best.genes(), second.best.genes());
    assert_eq!(first.improvements, second.improvements);
}

#[test]
fn test_time_budget_stops_search() {
    let problem = mixed_problem();
    let config = quick_config(5).with_max_generations(u64::MAX);
    let termination = Termination::cap_or_budget(config.max_generations, Duration::from_millis(50));

    let result = SearchEngine::new(&problem, config, termination).unwrap().run();
    assert!(result.elapsed >= Duration::from_millis(50));
    assert!(result.generations > 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let problem = mixed_problem();
    let config = quick_config(1).with_population(10, 5);
    let err = SearchEngine::new(&problem, config, Termination::GenerationCap(1))
        .err()
        .unwrap();
    assert!(matches!(err, SetupError::InvalidConfig(_)));
}

#[test]
fn test_non_physical_values_are_setup_errors() {
    use test_harness::{processor, task};

    let err = Problem::new(vec![task(0, 1.0)], vec![processor(0, -2.0, 5.0)], 3.0).unwrap_err();
    assert_eq!(
        err,
        SetupError::InvalidValue {
            kind: "Processor",
            id: 0,
            field: "frequency",
            value: -2.0,
        }
    );

    let err = Problem::new(vec![task(0, 0.0)], vec![processor(0, 2.0, 5.0)], 3.0).unwrap_err();
    assert!(matches!(err, SetupError::InvalidValue { field: "time", .. }));

    let negative_comm = task(0, 1.0).with_communication(-1.0, 0.25);
    let err = Problem::new(vec![negative_comm], vec![processor(0, 2.0, 5.0)], 3.0).unwrap_err();
    assert!(matches!(err, SetupError::InvalidValue { field: "local_energy", .. }));

    let err = Problem::new(
        vec![task(0, 1.0)],
        vec![processor(0, 2.0, f64::NAN)],
        3.0,
    )
    .unwrap_err();
    assert!(matches!(err, SetupError::InvalidValue { field: "energy_per_second", .. }));
}
