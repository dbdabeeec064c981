// Algoritmos del planificador: resolución de requisitos, grafo de
// dependencias, asignación de términos y ediciones del plan.
mod builder;
mod graph;
pub mod mutator;
mod resolver;
mod scheduler;

pub use builder::{build_plan, new_plan_id};
pub use graph::DependencyGraph;
pub use resolver::{is_filter_query, parse_filter, slot_count, FilterToken, RequirementResolver, Resolution};
pub use scheduler::{ScheduleReport, Scheduler};
