// Fachada para la capa de UI/API: evaluación de prerequisitos, creación de
// planes y ediciones, todo con entrada/salida serializable.
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::algorithm::{self, mutator, DependencyGraph, ScheduleReport};
use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::models::{Course, CoursePlan, Specialization};
use crate::prereq::{evaluate, EvalContext, EvalStatus, Evaluation, PrerequisiteNode};

/// Edición de un plan, tal como llega desde la UI.
///
/// ```json
/// {"kind": "moveCourse", "plannedCourseId": 7, "term": 6, "index": 0}
/// {"kind": "substituteElective", "plannedCourseId": 9, "courseId": "COSC 304"}
/// {"kind": "removeYear", "year": 3}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlanEdit {
    MoveCourse {
        planned_course_id: u64,
        term: u32,
        #[serde(default)]
        index: usize,
    },
    SubstituteElective {
        planned_course_id: u64,
        course_id: String,
    },
    ResetElective {
        planned_course_id: u64,
    },
    AddYear,
    RemoveYear {
        year: u32,
    },
    Rename {
        title: String,
    },
    EnforceOrdering,
}

pub fn parse_edit(json: &str) -> Result<PlanEdit> {
    Ok(serde_json::from_str(json)?)
}

/// Resultado de la evaluación de un curso planificado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCheck {
    pub planned_course_id: u64,
    pub code: String,
    pub term: u32,
    pub status: EvalStatus,
    pub failure_reasons: Vec<String>,
}

/// ¿Puede tomarse `course` en `term` dado el plan actual?
pub fn evaluate_prerequisites(course: &Course, term: u32, plan: &CoursePlan) -> Evaluation {
    let ctx = EvalContext::new(term, plan);
    match &course.pre_requisites {
        Some(tree) => evaluate(tree, &ctx),
        None => evaluate(&PrerequisiteNode::default(), &ctx),
    }
}

/// Evalúa cada curso del plan en su término actual.
pub fn validate_plan(plan: &CoursePlan) -> Vec<CourseCheck> {
    plan.planned_courses
        .iter()
        .map(|p| {
            let eval = evaluate_prerequisites(&p.course, p.term, plan);
            CourseCheck {
                planned_course_id: p.id,
                code: p.course.code.clone(),
                term: p.term,
                status: eval.status,
                failure_reasons: eval.failure_reasons,
            }
        })
        .collect()
}

pub fn total_credits(plan: &CoursePlan) -> u32 {
    plan.total_credits()
}

/// Cursos planificados que requieren a `planned_id`.
pub fn dependents(plan: &CoursePlan, planned_id: u64, catalog: &Catalog) -> Result<Vec<u64>> {
    let idx = plan.position(planned_id).ok_or(PlanError::PlannedCourseNotFound(planned_id))?;
    let graph = DependencyGraph::build(&plan.planned_courses, catalog);
    Ok(graph
        .dependents_of(idx)
        .into_iter()
        .map(|i| plan.planned_courses[i].id)
        .collect())
}

/// RNG según la configuración: semilla fija o entropía.
pub fn rng_for(config: &PlannerConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Crea un plan para las especializaciones dadas.
pub fn build_plan(
    catalog: &Catalog,
    config: &PlannerConfig,
    title: &str,
    user_id: Option<&str>,
    specializations: &[Specialization],
) -> (CoursePlan, ScheduleReport) {
    let mut rng = rng_for(config);
    algorithm::build_plan(catalog, config, title, user_id, specializations, &mut rng)
}

/// Aplica la edición sobre una copia del plan. Si falla, el plan original
/// no cambia y se devuelve el error.
pub fn reschedule_on_edit(
    plan: &CoursePlan,
    edit: &PlanEdit,
    catalog: &Catalog,
    config: &PlannerConfig,
) -> Result<CoursePlan> {
    let mut next = plan.clone();
    match edit {
        PlanEdit::MoveCourse { planned_course_id, term, index } => {
            mutator::move_course(&mut next, *planned_course_id, *term, *index)?
        }
        PlanEdit::SubstituteElective { planned_course_id, course_id } => {
            let course = catalog
                .get(course_id)
                .ok_or_else(|| PlanError::UnknownCourse(course_id.clone()))?;
            mutator::substitute_elective(&mut next, *planned_course_id, course)?
        }
        PlanEdit::ResetElective { planned_course_id } => mutator::reset_elective(&mut next, *planned_course_id)?,
        PlanEdit::AddYear => mutator::add_year(&mut next),
        PlanEdit::RemoveYear { year } => mutator::remove_year(&mut next, *year)?,
        PlanEdit::Rename { title } => mutator::rename(&mut next, title),
        PlanEdit::EnforceOrdering => {
            mutator::enforce_ordering(&mut next, catalog, config.max_courses_per_term);
        }
    }
    Ok(next)
}
