//! Asignación de términos a los cursos planificados.
//!
//! Dos pasadas:
//! 1. término base por requisito (año objetivo, o año aleatorio en [2, 4]
//!    para requisitos de año flexible) avanzando hasta un término de
//!    invierno con cupo;
//! 2. recorrido topológico del grafo de dependencias empujando cada
//!    dependiente al primer término válido posterior a su último
//!    prerequisito.
//!
//! Si no hay lugar dentro de `num_terms` el curso queda en el último término
//! con cupo (o en el último término) y se reporta como recortado.
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::graph::DependencyGraph;
use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::models::{is_start_term, year_of_term, Course, PlannedCourse, Requirement, TermSlot, TERMS_PER_YEAR};

/// Resultado de una pasada del planificador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    /// Cursos que no cupieron respetando cupo/orden y quedaron recortados.
    pub clamped: Vec<u64>,
    /// Cursos que la pasada de precedencia movió.
    pub moved: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    pub num_terms: u32,
    pub capacity: usize,
}

struct Loads(Vec<usize>);

impl Loads {
    fn of(courses: &[PlannedCourse], num_terms: u32) -> Self {
        let mut loads = vec![0usize; num_terms as usize + 1];
        for p in courses {
            if let Some(l) = loads.get_mut(p.term as usize) {
                *l += 1;
            }
        }
        Loads(loads)
    }

    fn get(&self, term: u32) -> usize {
        self.0.get(term as usize).copied().unwrap_or(usize::MAX)
    }

    fn add(&mut self, term: u32) {
        if let Some(l) = self.0.get_mut(term as usize) {
            *l += 1;
        }
    }

    fn remove(&mut self, term: u32) {
        if let Some(l) = self.0.get_mut(term as usize) {
            *l = l.saturating_sub(1);
        }
    }
}

impl Scheduler {
    /// Al menos un año completo de términos y un curso por término.
    pub fn new(num_terms: u32, capacity: usize) -> Self {
        Scheduler { num_terms: num_terms.max(TERMS_PER_YEAR), capacity: capacity.max(1) }
    }

    pub fn from_config(config: &PlannerConfig, num_terms: u32) -> Self {
        Scheduler::new(num_terms, config.max_courses_per_term)
    }

    fn num_years(&self) -> u32 {
        (self.num_terms / TERMS_PER_YEAR).max(1)
    }

    /// Primer término >= `from` que admite inicio de cursos y tiene cupo. Si el
    /// curso se ofrece en algún término de invierno, sólo se aceptan los
    /// términos en que se ofrece.
    fn next_open(&self, from: u32, course: &Course, loads: &Loads) -> Option<u32> {
        let restrict = course.offerings.any_winter();
        (from.max(1)..=self.num_terms).find(|&t| {
            is_start_term(t)
                && loads.get(t) < self.capacity
                && (!restrict || course.offerings.offered_in(TermSlot::of_term(t)))
        })
    }

    /// Lugar para un curso que no cabe: último término (>= `min`) con cupo, o
    /// el último término del plan.
    fn overflow(&self, min: u32, loads: &Loads) -> u32 {
        (min.max(1)..=self.num_terms)
            .rev()
            .find(|&t| loads.get(t) < self.capacity)
            .unwrap_or(self.num_terms)
    }

    fn place(&self, from: u32, course: &Course, loads: &Loads) -> (u32, bool) {
        if let Some(t) = self.next_open(from, course, loads) {
            return (t, false);
        }
        // sin términos ofrecidos libres: cualquier término de invierno
        let unrestricted = (from.max(1)..=self.num_terms).find(|&t| is_start_term(t) && loads.get(t) < self.capacity);
        match unrestricted {
            Some(t) => (t, false),
            None => (self.overflow(from, loads), true),
        }
    }

    fn target_year<R: Rng + ?Sized>(&self, planned: &PlannedCourse, requirement: Option<&Requirement>, rng: &mut R) -> u32 {
        let year = match requirement {
            Some(req) if req.is_flexible_year() => rng.gen_range(2..=4),
            Some(req) if req.year > 0 => req.year as u32,
            // adiciones libres: el nivel del curso sugiere el año
            _ => planned.course.level().unwrap_or(1),
        };
        year.clamp(1, self.num_years())
    }

    /// Término base preferido dentro del año: Winter 1 si se ofrece, si no
    /// Winter 2, si no el inicio del año.
    fn base_term(year: u32, course: &Course) -> u32 {
        let base = (year - 1) * TERMS_PER_YEAR;
        if course.offerings.winter_term1 {
            base + 1
        } else if course.offerings.winter_term2 {
            base + 2
        } else {
            base + 1
        }
    }

    /// Asigna términos a todos los cursos (sobrescribe los existentes) y luego
    /// aplica la pasada de precedencia.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        courses: &mut [PlannedCourse],
        requirements: &[Requirement],
        catalog: &Catalog,
        rng: &mut R,
    ) -> ScheduleReport {
        let by_id: HashMap<&str, &Requirement> = requirements.iter().map(|r| (r.id.as_str(), r)).collect();
        let mut loads = Loads(vec![0; self.num_terms as usize + 1]);
        let mut report = ScheduleReport::default();

        for planned in courses.iter_mut() {
            let requirement = planned.requirement_id.as_deref().and_then(|id| by_id.get(id).copied());
            let year = self.target_year(planned, requirement, rng);
            let start = Self::base_term(year, &planned.course);
            let (term, clamped) = self.place(start, &planned.course, &loads);
            if clamped {
                warn!(code = %planned.course.code, term, "no room within plan, clamping");
                report.clamped.push(planned.id);
            }
            planned.term = term;
            loads.add(term);
        }

        let ordering = self.order_pass(courses, catalog, &mut loads);
        for id in ordering.clamped {
            if !report.clamped.contains(&id) {
                report.clamped.push(id);
            }
        }
        report.moved = ordering.moved;
        debug!(courses = courses.len(), moved = report.moved.len(), clamped = report.clamped.len(), "schedule done");
        report
    }

    /// Sólo la pasada de precedencia, sobre términos ya asignados.
    pub fn enforce_ordering(&self, courses: &mut [PlannedCourse], catalog: &Catalog) -> ScheduleReport {
        let mut loads = Loads::of(courses, self.num_terms);
        self.order_pass(courses, catalog, &mut loads)
    }

    fn order_pass(&self, courses: &mut [PlannedCourse], catalog: &Catalog, loads: &mut Loads) -> ScheduleReport {
        let graph = DependencyGraph::build(courses, catalog);
        let mut report = ScheduleReport::default();
        if graph.edge_count() == 0 {
            return report;
        }

        for idx in graph.topological_order() {
            let latest = graph
                .prerequisites_of(idx)
                .into_iter()
                .map(|p| courses[p].term)
                .max();
            let Some(latest) = latest else { continue };
            if courses[idx].term > latest {
                continue;
            }

            let old = courses[idx].term;
            loads.remove(old);
            let (term, clamped) = if latest >= self.num_terms {
                (self.num_terms, true)
            } else {
                self.place(latest + 1, &courses[idx].course, loads)
            };
            if clamped {
                warn!(code = %courses[idx].course.code, after = latest, "dependent cannot follow its prerequisite within plan");
                report.clamped.push(courses[idx].id);
            }
            debug!(code = %courses[idx].course.code, from = old, to = term, year = year_of_term(term), "pushed after prerequisite");
            courses[idx].term = term;
            loads.add(term);
            report.moved.push(courses[idx].id);
        }
        report
    }
}
