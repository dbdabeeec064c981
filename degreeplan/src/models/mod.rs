// Estructuras de datos principales: catálogo, requisitos y plan.
mod code;
mod plan;
mod record;

pub use code::{codes_in_text, normalize_code, number_of, subject_of};
pub use plan::{CoursePlan, PlannedCourse};
pub use record::{PlanRecord, PlannedCourseRecord};

use crate::prereq::PrerequisiteNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Términos por año: Winter 1, Winter 2, Summer 1, Summer 2.
pub const TERMS_PER_YEAR: u32 = 4;

/// Año (1-based) al que pertenece un término absoluto (1-based).
pub fn year_of_term(term: u32) -> u32 {
    term.saturating_sub(1) / TERMS_PER_YEAR + 1
}

/// Sólo los dos términos de invierno admiten inicio de cursos al planificar
/// automáticamente: `(term - 1) % 4` en {0, 1}.
pub fn is_start_term(term: u32) -> bool {
    term >= 1 && (term - 1) % TERMS_PER_YEAR < 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermSlot {
    Winter1,
    Winter2,
    Summer1,
    Summer2,
}

impl TermSlot {
    pub fn of_term(term: u32) -> Self {
        match term.saturating_sub(1) % TERMS_PER_YEAR {
            0 => TermSlot::Winter1,
            1 => TermSlot::Winter2,
            2 => TermSlot::Summer1,
            _ => TermSlot::Summer2,
        }
    }
}

/// Banderas de oferta por término.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermOfferings {
    #[serde(default)]
    pub winter_term1: bool,
    #[serde(default)]
    pub winter_term2: bool,
    #[serde(default)]
    pub summer_term1: bool,
    #[serde(default)]
    pub summer_term2: bool,
}

impl TermOfferings {
    pub fn all() -> Self {
        TermOfferings { winter_term1: true, winter_term2: true, summer_term1: true, summer_term2: true }
    }

    pub fn offered_in(&self, slot: TermSlot) -> bool {
        match slot {
            TermSlot::Winter1 => self.winter_term1,
            TermSlot::Winter2 => self.winter_term2,
            TermSlot::Summer1 => self.summer_term1,
            TermSlot::Summer2 => self.summer_term2,
        }
    }

    pub fn any_winter(&self) -> bool {
        self.winter_term1 || self.winter_term2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Faculty {
    Sci,
    Art,
    Other,
}

const SCIENCE_SUBJECTS: &[&str] = &[
    "APSC", "ASTR", "BIOC", "BIOL", "CHEM", "COSC", "DATA", "EESC", "ENGR", "GISC", "HES", "HINT",
    "MANF", "MATH", "PHYS", "PSYO", "STAT",
];

const ARTS_SUBJECTS: &[&str] = &[
    "ANTH", "ARTH", "CCS", "CHIN", "CORH", "CRWR", "CULT", "CUST", "DICE", "DIHU", "EADM", "EAP",
    "ECED", "ECON", "EDLL", "EDST", "EDUC", "ENGL", "EPSE", "ETEC", "FILM", "FREN", "GEOG", "GERM",
    "GWST", "HEAL", "HIST", "INDG", "INLG", "JPST", "KORN", "LATN", "LLED", "MDST", "MGMT", "NLEK",
    "NRSG", "NSYL", "PHIL", "POLI", "SECH", "SOCI", "SOCW", "SPAN", "STMC", "SUST", "THTR", "VISA",
    "WRLD",
];

impl Faculty {
    /// Clasifica por el prefijo de asignatura del código.
    pub fn classify(code: &str) -> Self {
        let subject = subject_of(code);
        if SCIENCE_SUBJECTS.contains(&subject) {
            Faculty::Sci
        } else if ARTS_SUBJECTS.contains(&subject) {
            Faculty::Art
        } else {
            Faculty::Other
        }
    }
}

/// Curso del catálogo. Inmutable una vez cargado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub credits: u32,
    #[serde(flatten)]
    pub offerings: TermOfferings,
    #[serde(default)]
    pub is_honours: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<Faculty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_requisites: Option<PrerequisiteNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_requisite_string: Option<String>,
    #[serde(default)]
    pub is_elective_placeholder: bool,
}

impl Course {
    pub fn new(code: &str, credits: u32) -> Self {
        Course {
            code: normalize_code(code),
            name: String::new(),
            credits,
            offerings: TermOfferings::all(),
            is_honours: false,
            faculty: None,
            pre_requisites: None,
            pre_requisite_string: None,
            is_elective_placeholder: false,
        }
    }

    /// Curso sintético "cualquier curso que cumpla la consulta".
    pub fn placeholder(code: &str, name: &str, credits: u32) -> Self {
        Course {
            name: name.to_string(),
            is_elective_placeholder: true,
            ..Course::new(code, credits)
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_offerings(mut self, offerings: TermOfferings) -> Self {
        self.offerings = offerings;
        self
    }

    pub fn with_prerequisites(mut self, tree: PrerequisiteNode) -> Self {
        self.pre_requisites = Some(tree);
        self
    }

    pub fn with_prerequisite_string(mut self, text: &str) -> Self {
        self.pre_requisite_string = Some(text.to_string());
        self
    }

    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty = Some(faculty);
        self
    }

    pub fn faculty(&self) -> Faculty {
        self.faculty.unwrap_or_else(|| Faculty::classify(&self.code))
    }

    pub fn subject(&self) -> &str {
        subject_of(&self.code)
    }

    pub fn number(&self) -> &str {
        number_of(&self.code)
    }

    /// Primer dígito del número de curso (nivel / año sugerido).
    pub fn level(&self) -> Option<u32> {
        self.number().chars().next().and_then(|c| c.to_digit(10))
    }

    /// Nivel superior: cursos 300 a 500.
    pub fn is_upper_level(&self) -> bool {
        matches!(self.level(), Some(3..=5))
    }

    /// Códigos de los que depende este curso: hojas COURSE del árbol más los
    /// códigos que aparecen en el texto de prerequisitos.
    pub fn prerequisite_codes(&self) -> BTreeSet<String> {
        let mut codes = self
            .pre_requisites
            .as_ref()
            .map(PrerequisiteNode::course_codes)
            .unwrap_or_default();
        if let Some(text) = &self.pre_requisite_string {
            codes.extend(codes_in_text(text));
        }
        codes.remove(&self.code);
        codes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElectiveType {
    Elec,
    Choice,
}

impl ElectiveType {
    /// CHOICE cuando el código del placeholder lo indica; ELEC en otro caso.
    pub fn for_placeholder(code: &str) -> Self {
        if code.to_uppercase().contains("CHOICE") {
            ElectiveType::Choice
        } else {
            ElectiveType::Elec
        }
    }
}

/// Requisito de una especialización: créditos objetivo, año objetivo y la
/// consulta que define las alternativas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub credits: u32,
    /// Año objetivo; negativo significa "cualquier año desde el 2".
    pub year: i32,
    #[serde(default)]
    pub program_specific: bool,
    #[serde(default)]
    pub alternative_query: String,
    /// Código del curso placeholder usado cuando el requisito es electivo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elective_course: Option<String>,
}

impl Requirement {
    pub fn new(id: &str, credits: u32, year: i32, alternative_query: &str) -> Self {
        Requirement {
            id: id.to_string(),
            credits,
            year,
            program_specific: false,
            alternative_query: alternative_query.to_string(),
            elective_course: None,
        }
    }

    pub fn with_elective_course(mut self, code: &str) -> Self {
        self.elective_course = Some(code.to_string());
        self
    }

    pub fn is_flexible_year(&self) -> bool {
        self.year < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpecializationKind {
    Major,
    Minor,
    Honours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: SpecializationKind,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_helpers() {
        assert_eq!(year_of_term(1), 1);
        assert_eq!(year_of_term(4), 1);
        assert_eq!(year_of_term(5), 2);
        let starts: Vec<u32> = (1..=8).filter(|t| is_start_term(*t)).collect();
        assert_eq!(starts, vec![1, 2, 5, 6]);
        assert_eq!(TermSlot::of_term(7), TermSlot::Summer1);
    }

    #[test]
    fn test_course_json_shape() {
        let json = r#"{
            "code": "COSC 222", "name": "Data Structures", "credits": 3,
            "winterTerm1": true, "winterTerm2": false,
            "preRequisiteString": "COSC 121 and MATH 100",
            "preRequisites": {"type": "ROOT", "subtype": "AND", "childNodes": [
                {"type": "LEAF", "subtype": "COURSE", "value": "COSC 121", "childNodes": []}
            ]}
        }"#;
        let course: Course = serde_json::from_str(json).expect("course should parse");
        assert!(course.offerings.winter_term1);
        assert!(!course.offerings.summer_term2);
        assert_eq!(course.faculty(), Faculty::Sci);
        assert_eq!(course.level(), Some(2));
        let codes: Vec<String> = course.prerequisite_codes().into_iter().collect();
        assert_eq!(codes, vec!["COSC 121".to_string(), "MATH 100".to_string()]);
    }

    #[test]
    fn test_elective_type_from_placeholder_code() {
        assert_eq!(ElectiveType::for_placeholder("ENGL CHOICE"), ElectiveType::Choice);
        assert_eq!(ElectiveType::for_placeholder("COSC_UL_ELEC"), ElectiveType::Elec);
    }
}
