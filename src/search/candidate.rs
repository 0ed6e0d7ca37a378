use rand::Rng;

use crate::model::Problem;

/// One full assignment: gene `i` is the processor id hosting task `i`.
///
/// Every gene is drawn from its task's eligible set. Operators that move
/// genes between positions repair the result before it is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    genes: Vec<usize>,
    fitness: Option<f64>,
}

impl Candidate {
    /// Sample one eligible processor per task, uniformly.
    pub fn random<R: Rng + ?Sized>(problem: &Problem, rng: &mut R) -> Self {
        let genes = problem
            .tasks()
            .iter()
            .map(|task| task.eligible[rng.gen_range(0..task.eligible.len())])
            .collect();
        Self::from_genes(genes)
    }

    pub fn from_genes(genes: Vec<usize>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    pub fn into_genes(self) -> Vec<usize> {
        self.genes
    }

    /// `None` until the candidate has been evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Fitness for ranking; unevaluated candidates rank lowest.
    pub fn score(&self) -> f64 {
        self.fitness.unwrap_or(0.0)
    }

    /// Single-point crossover: both children swap their gene suffixes at `cut`.
    pub fn crossover(&self, other: &Candidate, cut: usize) -> (Candidate, Candidate) {
        let cut = cut.min(self.genes.len()).min(other.genes.len());
        let mut first = self.genes[..cut].to_vec();
        first.extend_from_slice(&other.genes[cut..]);
        let mut second = other.genes[..cut].to_vec();
        second.extend_from_slice(&self.genes[cut..]);
        (Candidate::from_genes(first), Candidate::from_genes(second))
    }

    /// Displacement mutation: cut a short run of genes out and reinsert it at
    /// a different position.
    pub fn displace<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.genes.len();
        if n < 2 {
            return;
        }
        let start = rng.gen_range(0..n);
        let max_len = (n / 2).max(1).min(n - start);
        let len = rng.gen_range(1..=max_len);
        let remaining = n - len;
        if remaining == 0 {
            return;
        }

        let run: Vec<usize> = self.genes.drain(start..start + len).collect();
        let mut at = rng.gen_range(0..remaining);
        if at >= start {
            at += 1;
        }
        self.genes.splice(at..at, run);
        self.fitness = None;
    }

    /// Re-sample every gene its task cannot host. Returns how many changed.
    pub fn repair<R: Rng + ?Sized>(&mut self, problem: &Problem, rng: &mut R) -> usize {
        let mut repaired = 0;
        for (gene, task) in self.genes.iter_mut().zip(problem.tasks()) {
            if !task.eligible.contains(gene) {
                *gene = task.eligible[rng.gen_range(0..task.eligible.len())];
                repaired += 1;
            }
        }
        if repaired > 0 {
            self.fitness = None;
        }
        repaired
    }

    /// True when every gene is in its task's eligible set.
    pub fn is_valid_for(&self, problem: &Problem) -> bool {
        self.genes.len() == problem.task_count()
            && self
                .genes
                .iter()
                .zip(problem.tasks())
                .all(|(gene, task)| task.eligible.contains(gene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProcessorRecord, TaskRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> Problem {
        // Longer tasks need the faster processors to meet the deadline
        let tasks = (0..6)
            .map(|i| TaskRecord::new(i, i as f64 + 1.0, 1.0))
            .collect();
        let processors = (0..4)
            .map(|p| ProcessorRecord::new(p, (p + 1) as f64 * 2.0))
            .collect();
        Problem::new(tasks, processors, 1.5).unwrap()
    }

    #[test]
    fn random_candidate_respects_eligibility() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let c = Candidate::random(&problem, &mut rng);
            assert!(c.is_valid_for(&problem));
            assert!(c.fitness().is_none());
        }
    }

    #[test]
    fn crossover_swaps_suffixes() {
        let a = Candidate::from_genes(vec![0, 0, 0, 0]);
        let b = Candidate::from_genes(vec![1, 1, 1, 1]);
        let (c, d) = a.crossover(&b, 1);
        assert_eq!(c.genes(), &[0, 1, 1, 1]);
        assert_eq!(d.genes(), &[1, 0, 0, 0]);
    }

    #[test]
    fn displacement_keeps_gene_multiset() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let mut c = Candidate::from_genes(vec![0, 1, 2, 3, 4, 5, 6, 7]);
            c.displace(&mut rng);
            let mut sorted = c.genes().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        }
    }

    #[test]
    fn displacement_moves_something() {
        let mut rng = StdRng::seed_from_u64(3);
        let original = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let mut c = Candidate::from_genes(original.clone());
        c.displace(&mut rng);
        assert_ne!(c.genes(), original.as_slice());
    }

    #[test]
    fn repair_restores_eligibility() {
        let problem = problem();
        let mut rng = StdRng::seed_from_u64(5);
        // Processor 0 (2 GHz) cannot run the long tasks within the deadline
        let mut c = Candidate::from_genes(vec![0; 6]);
        assert!(!c.is_valid_for(&problem));
        let repaired = c.repair(&problem, &mut rng);
        assert!(repaired > 0);
        assert!(c.is_valid_for(&problem));
    }
}
