use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::catalog::Catalog;
use crate::models::PlannedCourse;

/// Grafo prerequisito -> dependiente sobre los índices de un slice de
/// cursos planificados. Se deriva, nunca se guarda.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

fn prerequisite_codes(planned: &PlannedCourse, catalog: &Catalog) -> BTreeSet<String> {
    match catalog.prerequisites_of(&planned.course.code) {
        Some(codes) => codes.clone(),
        None => planned.course.prerequisite_codes(),
    }
}

impl DependencyGraph {
    /// Cruza el índice de prerequisitos del catálogo contra los códigos del
    /// plan. Los slots ELEC que aún muestran su placeholder no aportan aristas.
    pub fn build(courses: &[PlannedCourse], catalog: &Catalog) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..courses.len()).map(|i| graph.add_node(i)).collect();

        let mut by_code: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, p) in courses.iter().enumerate() {
            by_code.entry(p.course.code.as_str()).or_default().push(i);
        }

        for (dep, planned) in courses.iter().enumerate() {
            if planned.is_generic_elective() && planned.holds_placeholder() {
                continue;
            }
            for code in prerequisite_codes(planned, catalog) {
                let Some(sources) = by_code.get(code.as_str()) else { continue };
                for &pre in sources {
                    if pre == dep {
                        continue;
                    }
                    if graph.find_edge(nodes[pre], nodes[dep]).is_none() {
                        graph.add_edge(nodes[pre], nodes[dep], ());
                    }
                }
            }
        }

        DependencyGraph { graph, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Pares (prerequisito, dependiente) como índices del slice original.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
    }

    fn neighbors(&self, idx: usize, dir: Direction) -> Vec<usize> {
        let Some(&node) = self.nodes.get(idx) else { return Vec::new() };
        let mut out: Vec<usize> = self.graph.neighbors_directed(node, dir).map(|n| self.graph[n]).collect();
        out.sort_unstable();
        out
    }

    pub fn prerequisites_of(&self, idx: usize) -> Vec<usize> {
        self.neighbors(idx, Direction::Incoming)
    }

    pub fn dependents_of(&self, idx: usize) -> Vec<usize> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Orden topológico; con ciclos se usa el orden de inserción.
    pub fn topological_order(&self) -> Vec<usize> {
        match toposort(&self.graph, None) {
            Ok(order) => order.into_iter().map(|n| self.graph[n]).collect(),
            Err(cycle) => {
                warn!(node = self.graph[cycle.node_id()], "prerequisite cycle detected, using plan order");
                (0..self.nodes.len()).collect()
            }
        }
    }
}
