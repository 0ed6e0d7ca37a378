use std::time::Duration;

/// Stop rule checked between generations. Holds no state, so one value can be
/// reused for every run.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Stop once this many generations have been evaluated
    GenerationCap(u64),
    /// Stop once this much wall-clock time has passed
    TimeBudget(Duration),
    /// Stop when any inner rule is met
    Any(Vec<Termination>),
}

impl Termination {
    /// Generation cap OR wall-clock budget.
    pub fn cap_or_budget(max_generations: u64, budget: Duration) -> Self {
        Termination::Any(vec![
            Termination::GenerationCap(max_generations),
            Termination::TimeBudget(budget),
        ])
    }

    pub fn has_reached(&self, generations: u64, elapsed: Duration) -> bool {
        match self {
            Termination::GenerationCap(cap) => generations >= *cap,
            Termination::TimeBudget(budget) => elapsed >= *budget,
            Termination::Any(rules) => rules.iter().any(|r| r.has_reached(generations, elapsed)),
        }
    }
}
