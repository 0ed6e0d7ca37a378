use std::net::SocketAddr;
use std::time::Duration;

use crate::error::SetupError;

/// Tuning for one genetic search instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Lower bound of the population; also the size of the initial population
    pub population_min: usize,
    /// Upper bound of the population after replacement
    pub population_max: usize,
    /// Generation cap of the termination policy
    pub max_generations: u64,
    /// Number of candidates sampled per tournament
    pub tournament_size: usize,
    /// Probability that a selected pair is recombined
    pub crossover_probability: f64,
    /// Probability that an offspring is mutated
    pub mutation_probability: f64,
    /// Best candidates copied unchanged into the next generation
    pub elite_count: usize,
    /// Fixed RNG seed. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_min: 600,
            population_max: 1100,
            max_generations: 20_000,
            tournament_size: 2,
            crossover_probability: 0.75,
            mutation_probability: 0.1,
            elite_count: 1,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Smaller, more mutation-heavy population. Used as the second contender
    /// of a race so the two searches explore differently.
    pub fn exploratory() -> Self {
        Self {
            population_min: 200,
            population_max: 400,
            tournament_size: 3,
            mutation_probability: 0.3,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_population(mut self, min: usize, max: usize) -> Self {
        self.population_min = min;
        self.population_max = max;
        self
    }

    pub fn with_max_generations(mut self, max_generations: u64) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.population_min < 2 {
            return Err(SetupError::InvalidConfig(format!(
                "population_min must be at least 2, got {}",
                self.population_min
            )));
        }
        if self.population_max < self.population_min {
            return Err(SetupError::InvalidConfig(format!(
                "population_max {} < population_min {}",
                self.population_max, self.population_min
            )));
        }
        if self.tournament_size == 0 {
            return Err(SetupError::InvalidConfig(
                "tournament_size must be at least 1".to_string(),
            ));
        }
        if self.elite_count >= self.population_min {
            return Err(SetupError::InvalidConfig(format!(
                "elite_count {} must be below population_min {}",
                self.elite_count, self.population_min
            )));
        }
        for (name, p) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SetupError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// Timing of a two-solver race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    /// Budget handed to each solver's termination policy
    pub solver_timeout: Duration,
    /// Extra time the coordinator waits on top of the solver budget
    pub grace: Duration,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            solver_timeout: Duration::from_secs(60),
            grace: Duration::from_secs(5),
        }
    }
}

impl RaceConfig {
    pub fn new(solver_timeout: Duration, grace: Duration) -> Self {
        Self {
            solver_timeout,
            grace,
        }
    }

    /// The shared window both solvers must finish within.
    pub fn window(&self) -> Duration {
        self.solver_timeout + self.grace
    }
}

/// Configuration for a solver node serving the gRPC boundary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub listen_addr: SocketAddr,
    pub solver: SolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "solver".to_string(),
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:50061"
                .parse()
                .expect("default listen address is valid"),
            solver: SolverConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, listen_addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_config_default() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.population_min, 600);
        assert_eq!(cfg.population_max, 1100);
        assert_eq!(cfg.max_generations, 20_000);
        assert_eq!(cfg.tournament_size, 2);
        assert_eq!(cfg.elite_count, 1);
        assert!(cfg.seed.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn exploratory_profile_is_valid_and_distinct() {
        let cfg = SolverConfig::exploratory();
        assert!(cfg.validate().is_ok());
        assert_ne!(cfg, SolverConfig::default());
        assert_eq!(cfg.max_generations, SolverConfig::default().max_generations);
    }

    #[test]
    fn solver_config_builders() {
        let cfg = SolverConfig::default()
            .with_seed(7)
            .with_population(10, 20)
            .with_max_generations(50);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.population_min, 10);
        assert_eq!(cfg.population_max, 20);
        assert_eq!(cfg.max_generations, 50);
    }

    #[test]
    fn solver_config_rejects_inverted_population() {
        let cfg = SolverConfig::default().with_population(50, 10);
        assert!(matches!(cfg.validate(), Err(SetupError::InvalidConfig(_))));
    }

    #[test]
    fn solver_config_rejects_tiny_population() {
        let cfg = SolverConfig::default().with_population(1, 10);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn solver_config_rejects_bad_probability() {
        let mut cfg = SolverConfig::default();
        cfg.mutation_probability = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = SolverConfig::default();
        cfg.crossover_probability = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn solver_config_rejects_elitism_covering_population() {
        let mut cfg = SolverConfig::default().with_population(4, 8);
        cfg.elite_count = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn race_config_window_adds_grace() {
        let cfg = RaceConfig::new(Duration::from_secs(10), Duration::from_secs(2));
        assert_eq!(cfg.window(), Duration::from_secs(12));
        assert_eq!(RaceConfig::default().window(), Duration::from_secs(65));
    }

    #[test]
    fn server_config_default() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.name, "solver");
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:50061");
        assert_eq!(cfg.solver, SolverConfig::default());
    }

    #[test]
    fn server_config_new_with_solver() {
        let addr: SocketAddr = "10.0.0.1:9000".parse().unwrap();
        let cfg = ServerConfig::new("beta", addr).with_solver(SolverConfig::exploratory());
        assert_eq!(cfg.name, "beta");
        assert_eq!(cfg.listen_addr, addr);
        assert_eq!(cfg.solver, SolverConfig::exploratory());
    }
}
