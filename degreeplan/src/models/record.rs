// Formato de intercambio del plan: {id, title, numTerms, plannedCourses[]}.
use super::plan::{round_up_to_year, CoursePlan, PlannedCourse};
use super::{ElectiveType, TERMS_PER_YEAR};
use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedCourseRecord {
    pub id: u64,
    pub term: u32,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_id: Option<String>,
    #[serde(default)]
    pub is_elective: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elective_type: Option<ElectiveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_requirement_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: String,
    pub title: String,
    pub num_terms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub planned_courses: Vec<PlannedCourseRecord>,
}

impl PlannedCourseRecord {
    pub fn from_planned(p: &PlannedCourse) -> Self {
        PlannedCourseRecord {
            id: p.id,
            term: p.term,
            course_id: p.course.code.clone(),
            requirement_id: p.requirement_id.clone(),
            is_elective: p.is_elective,
            elective_type: p.elective_type,
            placeholder_id: p.placeholder.as_ref().map(|c| c.code.clone()),
            alternative_ids: p.alternatives.iter().map(|c| c.code.clone()).collect(),
            shared_requirement_id: p.shared_requirement_id.clone(),
        }
    }
}

fn lookup(catalog: &Catalog, code: &str) -> Result<Arc<crate::models::Course>> {
    catalog
        .get(code)
        .ok_or_else(|| PlanError::UnknownCourse(code.to_string()))
}

impl CoursePlan {
    pub fn to_record(&self) -> PlanRecord {
        PlanRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            num_terms: self.num_terms,
            user_id: self.user_id.clone(),
            planned_courses: self
                .planned_courses
                .iter()
                .map(PlannedCourseRecord::from_planned)
                .collect(),
        }
    }

    /// Reconstruye un plan a partir de su registro resolviendo cada código
    /// contra el catálogo. Valida términos, ids duplicados y `numTerms`.
    pub fn from_record(record: &PlanRecord, catalog: &Catalog) -> Result<CoursePlan> {
        if record.num_terms == 0 || record.num_terms % TERMS_PER_YEAR != 0 {
            return Err(PlanError::InvalidRecord(format!(
                "numTerms must be a positive multiple of {}, got {}",
                TERMS_PER_YEAR, record.num_terms
            )));
        }

        let mut plan = CoursePlan::new(&record.id, &record.title, round_up_to_year(record.num_terms));
        plan.user_id = record.user_id.clone();

        let mut seen: HashSet<u64> = HashSet::new();
        for r in &record.planned_courses {
            if r.id == 0 || !seen.insert(r.id) {
                return Err(PlanError::InvalidRecord(format!("duplicate or zero planned course id {}", r.id)));
            }
            if r.term == 0 || r.term > record.num_terms {
                return Err(PlanError::TermOutOfRange { term: r.term, num_terms: record.num_terms });
            }
            let course = lookup(catalog, &r.course_id)?;
            let placeholder = match &r.placeholder_id {
                Some(code) => Some(lookup(catalog, code)?),
                None => None,
            };
            let alternatives = r
                .alternative_ids
                .iter()
                .map(|code| lookup(catalog, code))
                .collect::<Result<Vec<_>>>()?;
            plan.push(PlannedCourse {
                id: r.id,
                term: r.term,
                course,
                requirement_id: r.requirement_id.clone(),
                is_elective: r.is_elective,
                elective_type: r.elective_type,
                placeholder,
                alternatives,
                shared_requirement_id: r.shared_requirement_id.clone(),
            });
        }
        Ok(plan)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(json: &str, catalog: &Catalog) -> Result<CoursePlan> {
        let record: PlanRecord = serde_json::from_str(json)?;
        CoursePlan::from_record(&record, catalog)
    }
}
