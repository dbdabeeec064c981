//! Catálogo de cursos en memoria.
//!
//! Se carga una sola vez antes de planificar. Al cargar se construye el índice
//! código -> códigos prerequisito, de modo que el grafo de dependencias del
//! plan sea un simple cruce contra este índice y no haya que volver a
//! escanear textos en cada llamada al planificador.
use crate::error::Result;
use crate::models::{normalize_code, Course};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Código del placeholder electivo genérico que siempre existe en el catálogo.
pub const GENERIC_ELECTIVE_CODE: &str = "ELEC";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Arc<Course>>,
    by_code: HashMap<String, usize>,
    prereq_index: HashMap<String, BTreeSet<String>>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>) -> Self {
        let mut catalog = Catalog::default();
        for mut course in courses {
            course.code = normalize_code(&course.code);
            catalog.insert(course);
        }
        if !catalog.by_code.contains_key(GENERIC_ELECTIVE_CODE) {
            catalog.insert(Course::placeholder(GENERIC_ELECTIVE_CODE, "Elective", 3));
        }
        debug!(courses = catalog.courses.len(), "catalog loaded");
        catalog
    }

    fn insert(&mut self, course: Course) {
        let code = course.code.clone();
        let prereqs = course.prerequisite_codes();
        let arc = Arc::new(course);
        match self.by_code.get(&code) {
            Some(&idx) => {
                warn!(code = %code, "duplicate course code in catalog, keeping the last one");
                self.courses[idx] = arc;
            }
            None => {
                self.by_code.insert(code.clone(), self.courses.len());
                self.courses.push(arc);
            }
        }
        if prereqs.is_empty() {
            self.prereq_index.remove(&code);
        } else {
            self.prereq_index.insert(code, prereqs);
        }
    }

    /// Carga un arreglo JSON de cursos.
    pub fn from_json(json: &str) -> Result<Self> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        Ok(Catalog::new(courses))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Catalog::from_json(&s)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    /// Cursos reales (excluye placeholders electivos).
    pub fn concrete(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter().filter(|c| !c.is_elective_placeholder)
    }

    pub fn get(&self, code: &str) -> Option<Arc<Course>> {
        self.by_code
            .get(&normalize_code(code))
            .map(|&idx| Arc::clone(&self.courses[idx]))
    }

    pub fn generic_placeholder(&self) -> Arc<Course> {
        match self.get(GENERIC_ELECTIVE_CODE) {
            Some(c) => c,
            None => Arc::new(Course::placeholder(GENERIC_ELECTIVE_CODE, "Elective", 3)),
        }
    }

    /// Busca cada código; los que no existen se descartan.
    pub fn find_by_codes<'a, I>(&self, codes: I) -> Vec<Arc<Course>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes.into_iter().filter_map(|c| self.get(c)).collect()
    }

    /// Códigos prerequisito de un curso según el índice construido al cargar.
    pub fn prerequisites_of(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.prereq_index.get(&normalize_code(code))
    }
}
