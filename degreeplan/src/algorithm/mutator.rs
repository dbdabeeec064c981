// Ediciones incrementales sobre un plan existente.
//
// Toda operación valida antes de tocar el plan: si devuelve Err el plan
// queda igual que antes.
use std::sync::Arc;
use strsim::jaro_winkler;
use tracing::{debug, info};

use super::scheduler::{ScheduleReport, Scheduler};
use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use crate::models::{year_of_term, Course, CoursePlan, ElectiveType, PlannedCourse, TERMS_PER_YEAR};

/// Largo mínimo (exclusivo) de la búsqueda para electivos ELEC.
pub const MIN_SEARCH_LEN: usize = 3;

fn planned<'a>(plan: &'a CoursePlan, id: u64) -> Result<&'a PlannedCourse> {
    plan.get(id).ok_or(PlanError::PlannedCourseNotFound(id))
}

/// Mueve un curso al término `dest_term`, en la posición `dest_index` de ese
/// término (se recorta al largo del término). No valida prerequisitos.
pub fn move_course(plan: &mut CoursePlan, id: u64, dest_term: u32, dest_index: usize) -> Result<()> {
    planned(plan, id)?;
    if dest_term == 0 || dest_term > plan.num_terms {
        return Err(PlanError::TermOutOfRange { term: dest_term, num_terms: plan.num_terms });
    }

    let mut groups = plan.term_groups();
    let mut moving = None;
    for group in groups.iter_mut() {
        if let Some(pos) = group.iter().position(|p| p.id == id) {
            moving = Some(group.remove(pos));
            break;
        }
    }
    let Some(moving) = moving else {
        return Err(PlanError::PlannedCourseNotFound(id));
    };
    let target = &mut groups[dest_term as usize - 1];
    let at = dest_index.min(target.len());
    target.insert(at, moving);

    plan.planned_courses = groups
        .into_iter()
        .enumerate()
        .flat_map(|(i, group)| {
            group.into_iter().map(move |mut p| {
                p.term = i as u32 + 1;
                p
            })
        })
        .collect();
    debug!(id, term = dest_term, index = at, "course moved");
    Ok(())
}

/// Reemplaza el curso de un slot electivo por `course`, conservando término y
/// requisito. Rechaza cursos ya presentes en otra parte del plan.
pub fn substitute_elective(plan: &mut CoursePlan, id: u64, course: Arc<Course>) -> Result<()> {
    let slot = planned(plan, id)?;
    if !slot.is_elective {
        return Err(PlanError::NotElective(id));
    }
    if plan.contains_code(&course.code, Some(id)) {
        return Err(PlanError::DuplicateCourse { code: course.code.clone() });
    }
    if let Some(slot) = plan.get_mut(id) {
        debug!(id, from = %slot.course.code, to = %course.code, "elective substituted");
        slot.course = course;
    }
    Ok(())
}

/// Vuelve a mostrar el placeholder original del slot.
pub fn reset_elective(plan: &mut CoursePlan, id: u64) -> Result<()> {
    let slot = planned(plan, id)?;
    let placeholder = match (&slot.placeholder, slot.is_elective) {
        (Some(p), true) => Arc::clone(p),
        _ => return Err(PlanError::NotElective(id)),
    };
    if let Some(slot) = plan.get_mut(id) {
        slot.course = placeholder;
    }
    Ok(())
}

fn score(search: &str, course: &Course) -> f64 {
    let code = jaro_winkler(search, &course.code.to_lowercase());
    let name = jaro_winkler(search, &course.name.to_lowercase());
    code.max(name)
}

fn matches_search(search: &str, course: &Course) -> bool {
    course.code.to_lowercase().contains(search)
        || course.name.to_lowercase().contains(search)
        || score(search, course) >= 0.85
}

/// Alternativas ofrecibles para un slot electivo.
///
/// CHOICE lista todo el pool; ELEC exige una búsqueda de más de
/// [`MIN_SEARCH_LEN`] caracteres. Los cursos ya presentes en el plan se
/// excluyen y el resultado se ordena por similitud con la búsqueda.
pub fn alternatives(plan: &CoursePlan, id: u64, search: Option<&str>) -> Result<Vec<Arc<Course>>> {
    let slot = planned(plan, id)?;
    if !slot.is_elective {
        return Err(PlanError::NotElective(id));
    }
    let search = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

    let available = slot
        .alternatives
        .iter()
        .filter(|c| !plan.contains_code(&c.code, Some(id)));

    let mut out: Vec<Arc<Course>> = match (slot.elective_type, search.as_deref()) {
        (Some(ElectiveType::Choice), None) => available.cloned().collect(),
        (Some(ElectiveType::Choice), Some(q)) => available.filter(|c| matches_search(q, c)).cloned().collect(),
        (_, Some(q)) if q.chars().count() > MIN_SEARCH_LEN => {
            available.filter(|c| matches_search(q, c)).cloned().collect()
        }
        _ => return Ok(Vec::new()),
    };

    if let Some(q) = search.as_deref() {
        out.sort_by(|a, b| {
            score(q, b)
                .partial_cmp(&score(q, a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.code.cmp(&b.code))
        });
    }
    Ok(out)
}

/// Agrega un año (4 términos) al final.
pub fn add_year(plan: &mut CoursePlan) {
    plan.num_terms += TERMS_PER_YEAR;
    info!(plan = %plan.id, num_terms = plan.num_terms, "year added");
}

/// Elimina el año `year` (1-based) si está vacío y corre 4 términos hacia
/// atrás todos los cursos posteriores.
pub fn remove_year(plan: &mut CoursePlan, year: u32) -> Result<()> {
    let years = plan.num_years();
    if year == 0 || year > years {
        return Err(PlanError::YearOutOfRange { year, years });
    }
    let count = plan.courses_in_year(year).len();
    if count > 0 {
        return Err(PlanError::YearNotEmpty { year, count });
    }
    if years == 1 {
        return Err(PlanError::LastYear);
    }

    for p in plan.planned_courses.iter_mut() {
        if year_of_term(p.term) > year {
            p.term -= TERMS_PER_YEAR;
        }
    }
    plan.num_terms -= TERMS_PER_YEAR;
    info!(plan = %plan.id, year, num_terms = plan.num_terms, "year removed");
    Ok(())
}

pub fn rename(plan: &mut CoursePlan, title: &str) {
    plan.title = title.trim().to_string();
}

/// Reaplica sólo la precedencia prerequisito -> dependiente sobre los
/// términos actuales.
pub fn enforce_ordering(plan: &mut CoursePlan, catalog: &Catalog, capacity: usize) -> ScheduleReport {
    let scheduler = Scheduler::new(plan.num_terms, capacity);
    scheduler.enforce_ordering(&mut plan.planned_courses, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("COSC 111", 3).with_name("Computer Programming I"),
            Course::new("COSC 121", 3).with_name("Computer Programming II"),
            Course::new("COSC 304", 3).with_name("Introduction to Databases"),
            Course::new("COSC 360", 3).with_name("Internet Programming"),
            Course::new("ENGL 112", 3).with_name("Strategies for University Writing"),
            Course::placeholder("ENGL CHOICE", "English choice", 3),
        ])
    }

    fn sample_plan(catalog: &Catalog) -> (CoursePlan, u64, u64) {
        let mut plan = CoursePlan::new("p", "Plan", 8);
        let mut a = PlannedCourse::required(0, catalog.get("COSC 111").unwrap(), Some("r1".into()));
        a.term = 1;
        plan.push(a);
        let mut b = PlannedCourse::required(0, catalog.get("COSC 121").unwrap(), Some("r1".into()));
        b.term = 2;
        plan.push(b);
        let pool = catalog.find_by_codes(["COSC 111", "COSC 304", "COSC 360"]);
        let mut e = PlannedCourse::elective(0, catalog.generic_placeholder(), pool, Some("r2".into()));
        e.term = 5;
        let elec = plan.push(e);
        let mut c = PlannedCourse::elective(
            0,
            catalog.get("ENGL CHOICE").unwrap(),
            catalog.find_by_codes(["ENGL 112"]),
            Some("r3".into()),
        );
        c.term = 6;
        let choice = plan.push(c);
        (plan, elec, choice)
    }

    #[test]
    fn test_move_between_terms_renumbers_buckets() {
        let catalog = catalog();
        let (mut plan, elec, _) = sample_plan(&catalog);
        move_course(&mut plan, elec, 1, 0).unwrap();
        let first: Vec<u64> = plan.courses_in_term(1).iter().map(|p| p.id).collect();
        assert_eq!(first, vec![elec, 1]);
        assert!(plan.courses_in_term(5).is_empty());
        // índice mayor al largo => al final
        move_course(&mut plan, 1, 2, 99).unwrap();
        let second: Vec<u64> = plan.courses_in_term(2).iter().map(|p| p.id).collect();
        assert_eq!(second, vec![2, 1]);
    }

    #[test]
    fn test_move_rejects_bad_term() {
        let catalog = catalog();
        let (mut plan, elec, _) = sample_plan(&catalog);
        let before = plan.clone();
        assert!(matches!(move_course(&mut plan, elec, 9, 0), Err(PlanError::TermOutOfRange { .. })));
        assert!(matches!(move_course(&mut plan, 77, 1, 0), Err(PlanError::PlannedCourseNotFound(77))));
        assert_eq!(plan, before);
    }

    #[test]
    fn test_substitute_rejects_duplicates_and_keeps_state() {
        let catalog = catalog();
        let (mut plan, elec, _) = sample_plan(&catalog);
        let before = plan.clone();
        let dup = substitute_elective(&mut plan, elec, catalog.get("COSC 111").unwrap());
        assert!(matches!(dup, Err(PlanError::DuplicateCourse { .. })));
        assert_eq!(plan, before);
        assert!(matches!(
            substitute_elective(&mut plan, 1, catalog.get("COSC 304").unwrap()),
            Err(PlanError::NotElective(1))
        ));

        substitute_elective(&mut plan, elec, catalog.get("COSC 304").unwrap()).unwrap();
        let slot = plan.get(elec).unwrap();
        assert_eq!(slot.code(), "COSC 304");
        assert_eq!(slot.term, 5);
        assert_eq!(slot.requirement_id.as_deref(), Some("r2"));

        reset_elective(&mut plan, elec).unwrap();
        assert_eq!(plan.get(elec).unwrap().code(), "ELEC");
    }

    #[test]
    fn test_alternatives_for_choice_and_elec() {
        let catalog = catalog();
        let (plan, elec, choice) = sample_plan(&catalog);
        let all = alternatives(&plan, choice, None).unwrap();
        assert_eq!(all.len(), 1);
        // ELEC sin búsqueda suficiente => nada
        assert!(alternatives(&plan, elec, Some("db")).unwrap().is_empty());
        let found = alternatives(&plan, elec, Some("databases")).unwrap();
        assert_eq!(found[0].code, "COSC 304");
        // COSC 111 ya está en el plan
        let progs = alternatives(&plan, elec, Some("programming")).unwrap();
        assert!(progs.iter().all(|c| c.code != "COSC 111"));
        assert!(progs.iter().any(|c| c.code == "COSC 360"));
    }

    #[test]
    fn test_add_and_remove_year() {
        let catalog = catalog();
        let (mut plan, elec, _) = sample_plan(&catalog);
        add_year(&mut plan);
        assert_eq!(plan.num_terms, 12);
        move_course(&mut plan, elec, 9, 0).unwrap();

        let before = plan.clone();
        assert!(matches!(remove_year(&mut plan, 1), Err(PlanError::YearNotEmpty { year: 1, count: 2 })));
        assert!(matches!(remove_year(&mut plan, 4), Err(PlanError::YearOutOfRange { .. })));
        assert_eq!(plan, before);

        // el año 2 todavía tiene el CHOICE en el término 6
        move_course(&mut plan, 4, 10, 0).unwrap();
        remove_year(&mut plan, 2).unwrap();
        assert_eq!(plan.num_terms, 8);
        assert_eq!(plan.get(elec).unwrap().term, 5);
        assert_eq!(plan.get(4).unwrap().term, 6);
        assert_eq!(plan.get(1).unwrap().term, 1);
    }

    #[test]
    fn test_last_year_cannot_be_removed() {
        let mut plan = CoursePlan::new("p", "t", 4);
        assert!(matches!(remove_year(&mut plan, 1), Err(PlanError::LastYear)));
        rename(&mut plan, "  Renamed ");
        assert_eq!(plan.title, "Renamed");
    }
}
