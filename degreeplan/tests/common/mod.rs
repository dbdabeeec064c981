#![allow(dead_code)]

use degreeplan::models::{Specialization, SpecializationKind};
use degreeplan::{Catalog, Requirement};

pub const CATALOG_JSON: &str = r#"[
    {"code": "COSC 111", "name": "Computer Programming I", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "COSC 121", "name": "Computer Programming II", "credits": 3,
     "winterTerm1": true, "winterTerm2": true,
     "preRequisites": {"type": "ROOT", "subtype": "AND", "childNodes": [
        {"type": "LEAF", "subtype": "COURSE", "value": "COSC 111", "childNodes": []}
     ]}},
    {"code": "COSC 211", "name": "Machine Architecture", "credits": 3,
     "winterTerm1": true, "preRequisiteString": "COSC 121"},
    {"code": "COSC 222", "name": "Data Structures", "credits": 3,
     "winterTerm1": true, "winterTerm2": true,
     "preRequisiteString": "COSC 121 and one of MATH 101, MATH 103"},
    {"code": "COSC 304", "name": "Introduction to Databases", "credits": 3,
     "winterTerm2": true, "preRequisiteString": "COSC 222"},
    {"code": "COSC 320", "name": "Analysis of Algorithms", "credits": 3,
     "winterTerm1": true, "preRequisiteString": "COSC 222"},
    {"code": "COSC 341", "name": "Human Computer Interaction", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "COSC 360", "name": "Internet Programming", "credits": 3,
     "winterTerm2": true, "preRequisiteString": "COSC 222"},
    {"code": "MATH 100", "name": "Differential Calculus", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "MATH 101", "name": "Integral Calculus", "credits": 3,
     "winterTerm1": true, "winterTerm2": true,
     "preRequisites": {"type": "ROOT", "subtype": "OR", "childNodes": [
        {"type": "LEAF", "subtype": "COURSE", "value": "MATH 100", "childNodes": []},
        {"type": "LEAF", "subtype": "PERMISSION", "childNodes": []}
     ]}},
    {"code": "STAT 230", "name": "Introductory Statistics", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "ENGL 112", "name": "Strategies for University Writing", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "ENGL 150", "name": "Introduction to Literature", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "PHIL 331", "name": "Ethics of Technology", "credits": 3,
     "winterTerm1": true, "winterTerm2": true},
    {"code": "ENGL CHOICE", "name": "First-year English", "credits": 3,
     "isElectivePlaceholder": true},
    {"code": "COSC_UL_ELEC", "name": "Upper-level COSC elective", "credits": 3,
     "isElectivePlaceholder": true},
    {"code": "NONSCI_ELEC", "name": "Non-science elective", "credits": 3,
     "isElectivePlaceholder": true}
]"#;

pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).expect("fixture catalog should parse")
}

pub fn cosc_major() -> Specialization {
    Specialization {
        id: "cosc-major".into(),
        name: "Computer Science".into(),
        kind: SpecializationKind::Major,
        requirements: vec![
            Requirement::new("first-year-cosc", 6, 1, "COSC111;COSC121"),
            Requirement::new("first-year-math", 6, 1, "MATH 100;MATH 101"),
            Requirement::new("english", 3, 1, "ENGL 112;ENGL 150").with_elective_course("ENGL CHOICE"),
            Requirement::new("second-year-cosc", 6, 2, "COSC 211;COSC 222"),
            Requirement::new("stats", 3, 2, "STAT 230"),
            Requirement::new("third-year-cosc", 9, 3, "COSC 304;COSC 320;COSC 360"),
            Requirement::new("cosc-ul", 6, 4, "COSC_UL_ELEC").with_elective_course("COSC_UL_ELEC"),
            Requirement::new("breadth", 3, -1, "ELEC_NONSCI").with_elective_course("NONSCI_ELEC"),
        ],
    }
}

pub fn data_minor() -> Specialization {
    Specialization {
        id: "data-minor".into(),
        name: "Data Science minor".into(),
        kind: SpecializationKind::Minor,
        requirements: vec![
            Requirement::new("minor-core", 6, 2, "STAT 230;COSC 222"),
            Requirement::new("minor-ul", 3, 3, "COSC 304;COSC 341").with_elective_course("COSC_UL_ELEC"),
        ],
    }
}
