use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::resolver::{RequirementResolver, Resolution};
use super::scheduler::{ScheduleReport, Scheduler};
use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::models::{Course, CoursePlan, PlannedCourse, Requirement, Specialization, SpecializationKind};

/// Identificador de plan: marca de tiempo + sufijo aleatorio.
pub fn new_plan_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}-{:06x}", Utc::now().format("%Y%m%d%H%M%S"), rng.gen_range(0..0x100_0000u32))
}

/// Agrega los cursos obligatorios que aún no están en el plan.
fn push_required(plan: &mut CoursePlan, courses: &[Arc<Course>], requirement: &Requirement) {
    for course in courses {
        if plan.contains_code(&course.code, None) {
            debug!(code = %course.code, requirement = %requirement.id, "already planned, skipping");
            continue;
        }
        plan.push(PlannedCourse::required(0, Arc::clone(course), Some(requirement.id.clone())));
    }
}

fn push_slots(plan: &mut CoursePlan, resolution: &Resolution, requirement: &Requirement) -> Vec<u64> {
    resolution
        .planned_courses(requirement)
        .into_iter()
        .map(|p| plan.push(p))
        .collect()
}

/// Slot de la especialización principal cuyo pool contiene todo `pool`,
/// eligiendo el pool más chico. Empates al azar.
fn tightest_superset<R: Rng + ?Sized>(
    plan: &CoursePlan,
    pool: &[Arc<Course>],
    candidates: &HashSet<u64>,
    rng: &mut R,
) -> Option<u64> {
    let wanted: HashSet<&str> = pool.iter().map(|c| c.code.as_str()).collect();
    let fits: Vec<&PlannedCourse> = plan
        .planned_courses
        .iter()
        .filter(|p| candidates.contains(&p.id) && p.shared_requirement_id.is_none())
        .filter(|p| {
            let have: HashSet<&str> = p.alternatives.iter().map(|c| c.code.as_str()).collect();
            wanted.is_subset(&have)
        })
        .collect();
    let smallest = fits.iter().map(|p| p.alternatives.len()).min()?;
    let tied: Vec<u64> = fits
        .iter()
        .filter(|p| p.alternatives.len() == smallest)
        .map(|p| p.id)
        .collect();
    Some(tied[rng.gen_range(0..tied.len())])
}

/// Construye un plan para las especializaciones dadas: mayores primero,
/// luego menores reutilizando slots electivos ya ubicados, y finalmente la
/// asignación de términos.
pub fn build_plan<R: Rng + ?Sized>(
    catalog: &Catalog,
    config: &PlannerConfig,
    title: &str,
    user_id: Option<&str>,
    specializations: &[Specialization],
    rng: &mut R,
) -> (CoursePlan, ScheduleReport) {
    let id = new_plan_id(rng);
    let mut plan = CoursePlan::new(&id, title, config.default_num_terms);
    plan.user_id = user_id.map(str::to_string);
    let resolver = RequirementResolver::new(catalog);

    let (majors, minors): (Vec<&Specialization>, Vec<&Specialization>) = specializations
        .iter()
        .partition(|s| s.kind != SpecializationKind::Minor);

    // slots electivos de mayores, reutilizables por los menores
    let mut reusable: HashSet<u64> = HashSet::new();
    for spec in &majors {
        for requirement in &spec.requirements {
            match resolver.resolve(requirement) {
                Resolution::AllRequired { courses } => push_required(&mut plan, &courses, requirement),
                resolution => reusable.extend(push_slots(&mut plan, &resolution, requirement)),
            }
        }
    }

    for spec in &minors {
        for requirement in &spec.requirements {
            let resolution = resolver.resolve(requirement);
            let (pool, slots) = match &resolution {
                Resolution::AllRequired { courses } => {
                    push_required(&mut plan, courses, requirement);
                    continue;
                }
                Resolution::Elective { pool, slots, .. } => (pool, *slots),
            };
            let mut fresh = 0;
            for _ in 0..slots {
                match tightest_superset(&plan, pool, &reusable, rng) {
                    Some(slot_id) => {
                        reusable.remove(&slot_id);
                        if let Some(slot) = plan.get_mut(slot_id) {
                            slot.alternatives = pool.clone();
                            slot.shared_requirement_id = Some(requirement.id.clone());
                            debug!(slot = slot_id, requirement = %requirement.id, "minor requirement shares a major slot");
                        }
                    }
                    None => fresh += 1,
                }
            }
            if fresh > 0 {
                let one = match &resolution {
                    Resolution::Elective { placeholder, pool, elective_type, .. } => Resolution::Elective {
                        placeholder: Arc::clone(placeholder),
                        pool: pool.clone(),
                        elective_type: *elective_type,
                        slots: fresh,
                    },
                    other => other.clone(),
                };
                push_slots(&mut plan, &one, requirement);
            }
        }
    }

    let requirements: Vec<Requirement> = specializations
        .iter()
        .flat_map(|s| s.requirements.iter().cloned())
        .collect();
    let scheduler = Scheduler::from_config(config, plan.num_terms);
    let report = scheduler.schedule(&mut plan.planned_courses, &requirements, catalog, rng);
    info!(
        plan = %plan.id,
        courses = plan.planned_courses.len(),
        credits = plan.total_credits(),
        clamped = report.clamped.len(),
        "plan built"
    );
    (plan, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("COSC 111", 3),
            Course::new("COSC 121", 3).with_prerequisite_string("COSC 111"),
            Course::new("COSC 304", 3),
            Course::new("COSC 341", 3),
            Course::new("MATH 100", 3),
            Course::new("MATH 310", 3),
            Course::placeholder("COSC_UL_ELEC", "Upper-level COSC elective", 3),
            Course::placeholder("SCI_UL_ELEC", "Upper-level science elective", 3),
            Course::new("STAT 230", 3),
        ])
    }

    fn major() -> Specialization {
        Specialization {
            id: "cosc-major".into(),
            name: "Computer Science".into(),
            kind: SpecializationKind::Major,
            requirements: vec![
                Requirement::new("m1", 6, 1, "COSC 111;COSC 121"),
                Requirement::new("m2", 3, 3, "SCI_UL_ELEC").with_elective_course("SCI_UL_ELEC"),
                Requirement::new("m3", 3, 4, "COSC_UL_ELEC").with_elective_course("COSC_UL_ELEC"),
            ],
        }
    }

    fn minor() -> Specialization {
        Specialization {
            id: "cosc-minor".into(),
            name: "Computer Science minor".into(),
            kind: SpecializationKind::Minor,
            requirements: vec![
                Requirement::new("n1", 6, 1, "COSC 111;MATH 100"),
                Requirement::new("n2", 3, 3, "COSC_UL_ELEC").with_elective_course("COSC_UL_ELEC"),
            ],
        }
    }

    #[test]
    fn test_major_only_plan() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(11);
        let (plan, report) = build_plan(&catalog, &PlannerConfig::default(), "Plan", Some("u1"), &[major()], &mut rng);
        assert_eq!(plan.num_terms, 16);
        assert_eq!(plan.user_id.as_deref(), Some("u1"));
        assert_eq!(plan.planned_courses.len(), 4);
        assert!(report.clamped.is_empty());
        let t111 = plan.planned_courses.iter().find(|p| p.code() == "COSC 111").unwrap().term;
        let t121 = plan.planned_courses.iter().find(|p| p.code() == "COSC 121").unwrap().term;
        assert!(t111 < t121);
    }

    #[test]
    fn test_minor_reuses_tightest_major_slot() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(5);
        let (plan, _) = build_plan(&catalog, &PlannerConfig::default(), "Plan", None, &[major(), minor()], &mut rng);
        // n1: COSC 111 ya está; MATH 100 es nuevo. n2 reutiliza el slot COSC_UL (pool más chico).
        assert_eq!(plan.planned_courses.len(), 5);
        let shared: Vec<&PlannedCourse> = plan
            .planned_courses
            .iter()
            .filter(|p| p.shared_requirement_id.is_some())
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].requirement_id.as_deref(), Some("m3"));
        assert_eq!(shared[0].shared_requirement_id.as_deref(), Some("n2"));
    }
}
