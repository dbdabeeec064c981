//! Errores del planificador.
//!
//! Sólo las violaciones de invariantes de una edición y los fallos de E/S o
//! persistencia son errores. Árboles mal formados, filtros desconocidos o un
//! plan que no cabe en `numTerms` se resuelven localmente con avisos.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("{code} is already in the plan")]
    DuplicateCourse { code: String },

    #[error("year {year} still has {count} planned course(s) and cannot be removed")]
    YearNotEmpty { year: u32, count: usize },

    #[error("year {year} does not exist in this plan ({years} year(s))")]
    YearOutOfRange { year: u32, years: u32 },

    #[error("the only remaining year of a plan cannot be removed")]
    LastYear,

    #[error("planned course {0} not found")]
    PlannedCourseNotFound(u64),

    #[error("term {term} is outside the plan (1..={num_terms})")]
    TermOutOfRange { term: u32, num_terms: u32 },

    #[error("planned course {0} is not an elective")]
    NotElective(u64),

    #[error("course {0} not found in catalog")]
    UnknownCourse(String),

    #[error("invalid plan record: {0}")]
    InvalidRecord(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
