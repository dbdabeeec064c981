// Biblioteca raíz del crate `degreeplan`.
// Motor de planificación de carreras: evaluación de prerequisitos,
// resolución de requisitos, asignación de términos y ediciones del plan.
pub mod algorithm;
pub mod api_json;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod prereq;
pub mod storage;

pub use api_json::{reschedule_on_edit, validate_plan, PlanEdit};
pub use catalog::Catalog;
pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use models::{Course, CoursePlan, PlannedCourse, Requirement, Specialization};
pub use storage::PlanStore;
