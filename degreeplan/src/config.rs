use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::models::TERMS_PER_YEAR;

pub const DEFAULT_MAX_COURSES_PER_TERM: usize = 5;
pub const DEFAULT_NUM_TERMS: u32 = 16;
pub const DEFAULT_DB_PATH: &str = "data/plans.db";

/// Planner settings. Built with defaults or read from the environment
/// (`.env` is honored).
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub max_courses_per_term: usize,
    pub default_num_terms: u32,
    pub db_path: PathBuf,
    /// Fixed seed for the random year / tie-break choices. `None` uses entropy.
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            max_courses_per_term: DEFAULT_MAX_COURSES_PER_TERM,
            default_num_terms: DEFAULT_NUM_TERMS,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            seed: None,
        }
    }
}

// load .env if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring invalid value");
            None
        }
    }
}

/// Accepts a plain path or a sqlite:// / file:// URL.
pub fn db_path_from(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("sqlite://") {
        PathBuf::from(rest)
    } else if let Some(rest) = raw.strip_prefix("file://") {
        PathBuf::from(rest)
    } else {
        PathBuf::from(raw)
    }
}

impl PlannerConfig {
    /// Reads DEGREEPLAN_MAX_PER_TERM, DEGREEPLAN_NUM_TERMS, DEGREEPLAN_DB_PATH
    /// and DEGREEPLAN_SEED. Missing or invalid values keep their defaults.
    pub fn from_env() -> Self {
        load_dotenv();
        let mut config = PlannerConfig::default();

        if let Some(max) = parse_var::<usize>("DEGREEPLAN_MAX_PER_TERM") {
            if max == 0 {
                warn!("DEGREEPLAN_MAX_PER_TERM must be positive, keeping default");
            } else {
                config.max_courses_per_term = max;
            }
        }
        if let Some(terms) = parse_var::<u32>("DEGREEPLAN_NUM_TERMS") {
            config.default_num_terms = terms.max(1).div_ceil(TERMS_PER_YEAR) * TERMS_PER_YEAR;
        }
        if let Ok(raw) = env::var("DEGREEPLAN_DB_PATH") {
            config.db_path = db_path_from(&raw);
        }
        config.seed = parse_var::<u64>("DEGREEPLAN_SEED");
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
