mod common;

use degreeplan::api_json::{self, parse_edit, reschedule_on_edit, PlanEdit};
use degreeplan::models::ElectiveType;
use degreeplan::prereq::EvalStatus;
use degreeplan::{CoursePlan, PlanError, PlannerConfig};

fn built_plan() -> (degreeplan::Catalog, PlannerConfig, CoursePlan) {
    let catalog = common::catalog();
    let config = PlannerConfig::default().with_seed(3);
    let (plan, _) = api_json::build_plan(&catalog, &config, "Plan", Some("u"), &[common::cosc_major()]);
    (catalog, config, plan)
}

fn slot_id(plan: &CoursePlan, requirement: &str) -> u64 {
    plan.planned_courses
        .iter()
        .find(|p| p.requirement_id.as_deref() == Some(requirement))
        .map(|p| p.id)
        .expect("requirement should have a planned course")
}

#[test]
fn test_substitute_elective_from_json_edit() {
    let (catalog, config, plan) = built_plan();
    let slot = slot_id(&plan, "cosc-ul");
    let term = plan.get(slot).unwrap().term;

    let json = format!(r#"{{"kind": "substituteElective", "plannedCourseId": {}, "courseId": "COSC341"}}"#, slot);
    let edit = parse_edit(&json).unwrap();
    let next = reschedule_on_edit(&plan, &edit, &catalog, &config).unwrap();
    let swapped = next.get(slot).unwrap();
    assert_eq!(swapped.code(), "COSC 341");
    assert_eq!(swapped.term, term);
    assert_eq!(swapped.requirement_id.as_deref(), Some("cosc-ul"));
    // el original no cambia
    assert!(plan.get(slot).unwrap().holds_placeholder());

    // COSC 304 ya es obligatorio en el plan
    let dup = PlanEdit::SubstituteElective { planned_course_id: slot, course_id: "COSC 304".into() };
    assert!(matches!(
        reschedule_on_edit(&next, &dup, &catalog, &config),
        Err(PlanError::DuplicateCourse { .. })
    ));

    let reset = reschedule_on_edit(&next, &PlanEdit::ResetElective { planned_course_id: slot }, &catalog, &config).unwrap();
    assert_eq!(reset.get(slot).unwrap().code(), "COSC_UL_ELEC");
}

#[test]
fn test_alternatives_exclude_planned_courses() {
    let (_, _, plan) = built_plan();
    let choice = slot_id(&plan, "english");
    assert_eq!(plan.get(choice).unwrap().elective_type, Some(ElectiveType::Choice));
    let all = degreeplan::algorithm::mutator::alternatives(&plan, choice, None).unwrap();
    assert_eq!(all.len(), 2);

    let ul = slot_id(&plan, "cosc-ul");
    let found = degreeplan::algorithm::mutator::alternatives(&plan, ul, Some("interaction")).unwrap();
    let codes: Vec<&str> = found.iter().map(|c| c.code.as_str()).collect();
    // 304, 320 y 360 ya son obligatorios
    assert_eq!(codes, vec!["COSC 341"]);
}

#[test]
fn test_move_prerequisite_late_is_reported_not_blocked() {
    let (catalog, config, plan) = built_plan();
    let cosc111 = plan.planned_courses.iter().find(|p| p.code() == "COSC 111").unwrap().id;
    let edit = PlanEdit::MoveCourse { planned_course_id: cosc111, term: 8, index: 0 };
    let moved = reschedule_on_edit(&plan, &edit, &catalog, &config).unwrap();
    assert_eq!(moved.get(cosc111).unwrap().term, 8);

    let report = api_json::validate_plan(&moved);
    let row = report.iter().find(|r| r.code == "COSC 121").unwrap();
    assert_eq!(row.status, EvalStatus::Unsatisfied);
    assert_eq!(row.failure_reasons, vec!["COSC 111 is not in plan".to_string()]);

    let fixed = reschedule_on_edit(&moved, &PlanEdit::EnforceOrdering, &catalog, &config).unwrap();
    let report = api_json::validate_plan(&fixed);
    assert!(report.iter().all(|r| r.status != EvalStatus::Unsatisfied), "{:?}", report);
}

#[test]
fn test_add_then_remove_empty_year() {
    let (catalog, config, plan) = built_plan();
    let bigger = reschedule_on_edit(&plan, &parse_edit(r#"{"kind":"addYear"}"#).unwrap(), &catalog, &config).unwrap();
    assert_eq!(bigger.num_terms, 20);

    let before: Vec<u32> = plan.planned_courses.iter().map(|p| p.term).collect();
    let shrunk = reschedule_on_edit(&bigger, &PlanEdit::RemoveYear { year: 5 }, &catalog, &config).unwrap();
    assert_eq!(shrunk.num_terms, 16);
    let after: Vec<u32> = shrunk.planned_courses.iter().map(|p| p.term).collect();
    assert_eq!(before, after);

    let err = reschedule_on_edit(&shrunk, &PlanEdit::RemoveYear { year: 1 }, &catalog, &config);
    assert!(matches!(err, Err(PlanError::YearNotEmpty { year: 1, .. })));
}

#[test]
fn test_dependents_of_first_course() {
    let (catalog, _, plan) = built_plan();
    let cosc111 = plan.planned_courses.iter().find(|p| p.code() == "COSC 111").unwrap().id;
    let deps = api_json::dependents(&plan, cosc111, &catalog).unwrap();
    let codes: Vec<&str> = deps.iter().map(|id| plan.get(*id).unwrap().code()).collect();
    assert_eq!(codes, vec!["COSC 121"]);
}
