//! Named simulation scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: three coins with well separated biases
    ThreeCoins,
    
    /// SIM-002: three arms ten points apart
    CloseRace,
    
    /// SIM-003: a single arm, selected on every trial
    SingleArm,
    
    /// SIM-004: no trials, ranking reflects priors only
    ColdStart,
    
    /// SIM-005: catalogue of items with low click-through rates
    CtrCatalogue,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::ThreeCoins,
            ScenarioId::CloseRace,
            ScenarioId::SingleArm,
            ScenarioId::ColdStart,
            ScenarioId::CtrCatalogue,
        ]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::ThreeCoins => "three_coins",
            ScenarioId::CloseRace => "close_race",
            ScenarioId::SingleArm => "single_arm",
            ScenarioId::ColdStart => "cold_start",
            ScenarioId::CtrCatalogue => "ctr_catalogue",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::ThreeCoins => "Coins at 0.2 / 0.5 / 0.75, 10k flips, best coin must rank first",
            ScenarioId::CloseRace => "Arms at 0.4 / 0.5 / 0.6, 20k trials, best arm must rank first",
            ScenarioId::SingleArm => "One arm at 0.3, 500 trials, every trial lands on it",
            ScenarioId::ColdStart => "Three arms, zero trials, all tied at 0.5 in id order",
            ScenarioId::CtrCatalogue => "Ten items with 0.5%-6% CTR, 30k impressions",
        }
    }
    
    /// Hidden success probabilities of the scenario's arms.
    pub fn true_probabilities(&self) -> Vec<f64> {
        match self {
            ScenarioId::ThreeCoins | ScenarioId::ColdStart => vec![0.2, 0.5, 0.75],
            ScenarioId::CloseRace => vec![0.4, 0.5, 0.6],
            ScenarioId::SingleArm => vec![0.3],
            ScenarioId::CtrCatalogue => vec![
                0.005, 0.008, 0.010, 0.012, 0.015, 0.018, 0.020, 0.025, 0.030, 0.060,
            ],
        }
    }
    
    /// Default number of trials.
    pub fn trial_count(&self) -> i64 {
        match self {
            ScenarioId::ThreeCoins => 10_000,
            ScenarioId::CloseRace => 20_000,
            ScenarioId::SingleArm => 500,
            ScenarioId::ColdStart => 0,
            ScenarioId::CtrCatalogue => 30_000,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "three_coins" | "threecoins" | "sim-001" => Ok(ScenarioId::ThreeCoins),
            "close_race" | "closerace" | "sim-002" => Ok(ScenarioId::CloseRace),
            "single_arm" | "singlearm" | "sim-003" => Ok(ScenarioId::SingleArm),
            "cold_start" | "coldstart" | "sim-004" => Ok(ScenarioId::ColdStart),
            "ctr_catalogue" | "ctrcatalogue" | "ctr" | "sim-005" => Ok(ScenarioId::CtrCatalogue),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
