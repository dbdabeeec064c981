// Resolución de requisitos: consulta de alternativas -> cursos concretos o
// slots electivos con su pool de alternativas.
use crate::catalog::Catalog;
use crate::models::{normalize_code, Course, ElectiveType, Faculty, PlannedCourse, Requirement};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Marca que convierte la consulta en un filtro sobre el catálogo.
pub const ELECTIVE_MARKER: &str = "ELEC";

/// Un término del filtro `ELEC`. Se aplican en conjunción.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    /// Cursos 300-500.
    UpperLevel,
    Science,
    NonScience,
    /// Prefijo de disciplina de 4 letras.
    Subject(String),
    /// Primer dígito del número de curso.
    Level(u32),
}

impl FilterToken {
    pub fn parse(token: &str) -> Option<Self> {
        let t = token.trim().to_uppercase();
        match t.as_str() {
            "UL" => Some(FilterToken::UpperLevel),
            "SCI" => Some(FilterToken::Science),
            "NONSCI" => Some(FilterToken::NonScience),
            _ if t.len() == 4 && t.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(FilterToken::Subject(t))
            }
            _ if t.len() == 1 => t.chars().next().and_then(|c| c.to_digit(10)).map(FilterToken::Level),
            _ => None,
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        match self {
            FilterToken::UpperLevel => course.is_upper_level(),
            FilterToken::Science => course.faculty() == Faculty::Sci,
            FilterToken::NonScience => course.faculty() != Faculty::Sci,
            FilterToken::Subject(subject) => course.subject() == subject.as_str(),
            FilterToken::Level(level) => course.level() == Some(*level),
        }
    }
}

/// Separa la consulta por `_`, descarta vacíos y `ELEC`. Los tokens
/// desconocidos se registran y se ignoran.
pub fn parse_filter(query: &str) -> Vec<FilterToken> {
    let mut tokens = Vec::new();
    for raw in query.split('_') {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ELECTIVE_MARKER) {
            continue;
        }
        match FilterToken::parse(raw) {
            Some(tok) => tokens.push(tok),
            None => warn!(token = raw, query, "unknown elective filter token, ignoring"),
        }
    }
    tokens
}

pub fn is_filter_query(query: &str) -> bool {
    query.to_uppercase().contains(ELECTIVE_MARKER)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Todas las alternativas son obligatorias.
    AllRequired { courses: Vec<Arc<Course>> },
    /// Se eligen `slots` cursos del pool; cada slot arranca con el placeholder.
    Elective {
        placeholder: Arc<Course>,
        pool: Vec<Arc<Course>>,
        elective_type: ElectiveType,
        slots: usize,
    },
}

impl Resolution {
    /// Cursos planificados (sin id ni término) que representan el requisito.
    pub fn planned_courses(&self, requirement: &Requirement) -> Vec<PlannedCourse> {
        let req_id = Some(requirement.id.clone());
        match self {
            Resolution::AllRequired { courses } => courses
                .iter()
                .map(|c| PlannedCourse::required(0, Arc::clone(c), req_id.clone()))
                .collect(),
            Resolution::Elective { placeholder, pool, slots, .. } => (0..*slots)
                .map(|_| PlannedCourse::elective(0, Arc::clone(placeholder), pool.clone(), req_id.clone()))
                .collect(),
        }
    }
}

pub struct RequirementResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> RequirementResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        RequirementResolver { catalog }
    }

    /// Conjunto concreto de alternativas de una consulta.
    pub fn alternatives(&self, query: &str) -> Vec<Arc<Course>> {
        if is_filter_query(query) {
            let tokens = parse_filter(query);
            return self
                .catalog
                .concrete()
                .filter(|c| tokens.iter().all(|t| t.matches(c)))
                .cloned()
                .collect();
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for raw in query.split(';') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let code = normalize_code(raw);
            match self.catalog.get(&code) {
                Some(course) => {
                    if seen.insert(course.code.clone()) {
                        out.push(course);
                    }
                }
                None => warn!(code = %code, "alternative not found in catalog, dropping"),
            }
        }
        out
    }

    fn placeholder_for(&self, requirement: &Requirement) -> Arc<Course> {
        if let Some(code) = &requirement.elective_course {
            if let Some(course) = self.catalog.get(code) {
                return course;
            }
            warn!(code = %code, requirement = %requirement.id, "elective placeholder not in catalog, using generic");
        }
        self.catalog.generic_placeholder()
    }

    pub fn resolve(&self, requirement: &Requirement) -> Resolution {
        let pool = self.alternatives(&requirement.alternative_query);
        if pool.is_empty() {
            warn!(requirement = %requirement.id, query = %requirement.alternative_query, "requirement resolved to no courses");
            return Resolution::AllRequired { courses: Vec::new() };
        }

        let total: u32 = pool.iter().map(|c| c.credits).sum();
        if total == requirement.credits {
            debug!(requirement = %requirement.id, courses = pool.len(), "all alternatives required");
            return Resolution::AllRequired { courses: pool };
        }

        let placeholder = self.placeholder_for(requirement);
        let elective_type = ElectiveType::for_placeholder(&placeholder.code);
        let slots = slot_count(requirement.credits, placeholder.credits);
        debug!(requirement = %requirement.id, pool = pool.len(), slots, "elective requirement");
        Resolution::Elective { placeholder, pool, elective_type, slots }
    }
}

/// Slots hasta que los créditos acumulados alcanzan el objetivo. Un
/// placeholder sin créditos ocupa un único slot.
pub fn slot_count(target_credits: u32, placeholder_credits: u32) -> usize {
    if placeholder_credits == 0 {
        return if target_credits > 0 { 1 } else { 0 };
    }
    target_credits.div_ceil(placeholder_credits) as usize
}
