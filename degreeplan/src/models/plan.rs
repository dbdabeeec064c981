// Plan de cursos: términos + cursos planificados.
use super::{year_of_term, Course, ElectiveType, TERMS_PER_YEAR};
use crate::prereq::PlannedTerms;
use std::sync::Arc;

/// Una instancia de curso ubicada en un término concreto del plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCourse {
    pub id: u64,
    /// Término absoluto (1-based).
    pub term: u32,
    pub course: Arc<Course>,
    pub requirement_id: Option<String>,
    pub is_elective: bool,
    pub elective_type: Option<ElectiveType>,
    /// Placeholder original del slot electivo (para "reset").
    pub placeholder: Option<Arc<Course>>,
    /// Pool de alternativas del requisito que originó el slot.
    pub alternatives: Vec<Arc<Course>>,
    /// Requisito de otra especialización (minor) que también cubre este slot.
    pub shared_requirement_id: Option<String>,
}

impl PlannedCourse {
    pub fn required(id: u64, course: Arc<Course>, requirement_id: Option<String>) -> Self {
        PlannedCourse {
            id,
            term: 1,
            course,
            requirement_id,
            is_elective: false,
            elective_type: None,
            placeholder: None,
            alternatives: Vec::new(),
            shared_requirement_id: None,
        }
    }

    pub fn elective(
        id: u64,
        placeholder: Arc<Course>,
        pool: Vec<Arc<Course>>,
        requirement_id: Option<String>,
    ) -> Self {
        let elective_type = ElectiveType::for_placeholder(&placeholder.code);
        PlannedCourse {
            id,
            term: 1,
            course: Arc::clone(&placeholder),
            requirement_id,
            is_elective: true,
            elective_type: Some(elective_type),
            placeholder: Some(placeholder),
            alternatives: pool,
            shared_requirement_id: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.course.code
    }

    /// Slot ELEC genérico: su curso es un placeholder sin prerequisitos reales.
    pub fn is_generic_elective(&self) -> bool {
        self.is_elective && self.elective_type == Some(ElectiveType::Elec)
    }

    /// El slot todavía muestra el placeholder (no se eligió curso concreto).
    pub fn holds_placeholder(&self) -> bool {
        self.course.is_elective_placeholder
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoursePlan {
    pub id: String,
    pub title: String,
    pub user_id: Option<String>,
    pub num_terms: u32,
    pub planned_courses: Vec<PlannedCourse>,
    pub(crate) next_id: u64,
}

impl CoursePlan {
    pub fn new(id: &str, title: &str, num_terms: u32) -> Self {
        CoursePlan {
            id: id.to_string(),
            title: title.to_string(),
            user_id: None,
            num_terms: round_up_to_year(num_terms),
            planned_courses: Vec::new(),
            next_id: 1,
        }
    }

    pub fn num_years(&self) -> u32 {
        self.num_terms / TERMS_PER_YEAR
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Agrega un curso planificado; si su id es 0 se le asigna uno nuevo.
    pub fn push(&mut self, mut planned: PlannedCourse) -> u64 {
        if planned.id == 0 {
            planned.id = self.allocate_id();
        } else if planned.id >= self.next_id {
            self.next_id = planned.id + 1;
        }
        let id = planned.id;
        self.planned_courses.push(planned);
        id
    }

    pub fn get(&self, id: u64) -> Option<&PlannedCourse> {
        self.planned_courses.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut PlannedCourse> {
        self.planned_courses.iter_mut().find(|p| p.id == id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.planned_courses.iter().position(|p| p.id == id)
    }

    /// ¿Hay otro curso planificado (distinto de `except`) con este código?
    pub fn contains_code(&self, code: &str, except: Option<u64>) -> bool {
        self.planned_courses
            .iter()
            .any(|p| Some(p.id) != except && p.course.code == code)
    }

    pub fn courses_in_term(&self, term: u32) -> Vec<&PlannedCourse> {
        self.planned_courses.iter().filter(|p| p.term == term).collect()
    }

    pub fn courses_in_year(&self, year: u32) -> Vec<&PlannedCourse> {
        self.planned_courses
            .iter()
            .filter(|p| year_of_term(p.term) == year)
            .collect()
    }

    /// Cursos agrupados por término: `groups[t - 1]` contiene el término `t`,
    /// en el orden en que aparecen en el plan.
    pub fn term_groups(&self) -> Vec<Vec<PlannedCourse>> {
        let mut groups: Vec<Vec<PlannedCourse>> = vec![Vec::new(); self.num_terms as usize];
        for p in &self.planned_courses {
            let idx = p.term.clamp(1, self.num_terms.max(1)) as usize - 1;
            if let Some(group) = groups.get_mut(idx) {
                group.push(p.clone());
            }
        }
        groups
    }

    pub fn total_credits(&self) -> u32 {
        self.planned_courses.iter().map(|p| p.course.credits).sum()
    }
}

impl PlannedTerms for CoursePlan {
    fn planned_term(&self, code: &str) -> Option<u32> {
        self.planned_courses
            .iter()
            .filter(|p| p.course.code == code)
            .map(|p| p.term)
            .min()
    }
}

pub(crate) fn round_up_to_year(num_terms: u32) -> u32 {
    num_terms.max(1).div_ceil(TERMS_PER_YEAR) * TERMS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(plan: &mut CoursePlan, code: &str, term: u32) -> u64 {
        let mut p = PlannedCourse::required(0, Arc::new(Course::new(code, 3)), None);
        p.term = term;
        plan.push(p)
    }

    #[test]
    fn test_num_terms_rounds_to_whole_years() {
        assert_eq!(CoursePlan::new("p", "t", 16).num_terms, 16);
        assert_eq!(CoursePlan::new("p", "t", 10).num_terms, 12);
        assert_eq!(CoursePlan::new("p", "t", 0).num_terms, 4);
    }

    #[test]
    fn test_term_groups_and_planned_terms() {
        let mut plan = CoursePlan::new("p", "t", 8);
        let a = planned(&mut plan, "COSC 111", 1);
        planned(&mut plan, "COSC 121", 2);
        planned(&mut plan, "MATH 100", 1);
        let groups = plan.term_groups();
        assert_eq!(groups.len(), 8);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].id, a);
        assert_eq!(plan.planned_term("COSC 121"), Some(2));
        assert_eq!(plan.planned_term("COSC 304"), None);
        assert!(plan.contains_code("COSC 111", None));
        assert!(!plan.contains_code("COSC 111", Some(a)));
        assert_eq!(plan.total_credits(), 9);
    }
}
