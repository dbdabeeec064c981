// Evaluador del árbol de prerequisitos.
//
// La evaluación es una función pura de (nodo, términos planificados, término
// del curso evaluado). No hay estado global: se puede llamar tantas veces
// como haga falta por cada render / edición.
use super::{NodeValue, PrerequisiteNode, Subtype};
use crate::models::{normalize_code, year_of_term};
use serde::Serialize;
use std::collections::HashMap;

/// Oráculo "¿en qué término está planificado este código?".
pub trait PlannedTerms {
    /// Término (1-based) más temprano en que `code` aparece en el plan.
    fn planned_term(&self, code: &str) -> Option<u32>;
}

impl PlannedTerms for HashMap<String, u32> {
    fn planned_term(&self, code: &str) -> Option<u32> {
        self.get(code).copied()
    }
}

/// Contexto de evaluación: término del curso evaluado + oráculo del plan.
pub struct EvalContext<'a> {
    pub term: u32,
    pub plan: &'a dyn PlannedTerms,
}

impl<'a> EvalContext<'a> {
    pub fn new(term: u32, plan: &'a dyn PlannedTerms) -> Self {
        EvalContext { term, plan }
    }

    /// Término del código si está en el plan en un término estrictamente anterior.
    pub fn is_planned_before(&self, code: &str) -> Option<u32> {
        self.plan
            .planned_term(&normalize_code(code))
            .filter(|t| *t < self.term)
    }

    pub fn year(&self) -> u32 {
        year_of_term(self.term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvalStatus {
    Satisfied,
    Unsatisfied,
    /// Condición que hoy no se puede comprobar (créditos, programa, permiso...).
    /// Cuenta como aprobada, pero no es una aprobación real.
    Unevaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub status: EvalStatus,
    pub failure_reasons: Vec<String>,
}

impl Evaluation {
    fn pass() -> Self {
        Evaluation { status: EvalStatus::Satisfied, failure_reasons: Vec::new() }
    }

    fn unevaluated(reasons: Vec<String>) -> Self {
        Evaluation { status: EvalStatus::Unevaluated, failure_reasons: reasons }
    }

    fn fail(reasons: Vec<String>) -> Self {
        Evaluation { status: EvalStatus::Unsatisfied, failure_reasons: reasons }
    }

    /// `true` salvo que la condición haya fallado de verdad.
    pub fn satisfied(&self) -> bool {
        self.status != EvalStatus::Unsatisfied
    }

    /// `true` sólo para una aprobación comprobada.
    pub fn fully_satisfied(&self) -> bool {
        self.status == EvalStatus::Satisfied
    }
}

/// Evalúa `node` para un curso ubicado en `ctx.term`.
pub fn evaluate(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let subtype = match &node.subtype {
        // sin subtipo => sin prerequisitos
        None => return Evaluation::pass(),
        Some(s) => s,
    };

    match subtype {
        Subtype::Course => eval_course(node, ctx),
        Subtype::And | Subtype::Grade => eval_all(node, ctx),
        Subtype::Or => eval_any(node, ctx),
        Subtype::NOf => eval_n_of(node, ctx),
        Subtype::Year => eval_year(node, ctx),
        Subtype::NCreditsOf
        | Subtype::Program
        | Subtype::Permission
        | Subtype::Credits
        | Subtype::Department
        | Subtype::Major => Evaluation::unevaluated(Vec::new()),
        // aviso no bloqueante
        Subtype::Unknown(name) => Evaluation::unevaluated(vec![format!("Unknown subtype {}", name)]),
    }
}

fn eval_course(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let code = match node.value.as_ref().and_then(NodeValue::as_text) {
        Some(c) => c,
        None => return Evaluation::unevaluated(vec!["COURSE condition without a course code".to_string()]),
    };
    if ctx.is_planned_before(&code).is_some() {
        Evaluation::pass()
    } else {
        Evaluation::fail(vec![format!("{} is not in plan", code)])
    }
}

fn eval_children(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Vec<Evaluation> {
    node.child_nodes.iter().map(|c| evaluate(c, ctx)).collect()
}

fn failing_reasons(children: &[Evaluation]) -> Vec<String> {
    children
        .iter()
        .filter(|c| !c.satisfied())
        .flat_map(|c| c.failure_reasons.iter().cloned())
        .collect()
}

// AND / GRADE: se evalúan todos los hijos, sin cortocircuito, para reportar
// cada fallo.
fn eval_all(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let children = eval_children(node, ctx);
    if children.iter().any(|c| !c.satisfied()) {
        return Evaluation::fail(failing_reasons(&children));
    }
    if children.iter().any(|c| c.status == EvalStatus::Unevaluated) {
        Evaluation::unevaluated(Vec::new())
    } else {
        Evaluation::pass()
    }
}

fn eval_any(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let children = eval_children(node, ctx);
    if children.iter().any(Evaluation::fully_satisfied) {
        Evaluation::pass()
    } else if children.iter().any(Evaluation::satisfied) {
        Evaluation::unevaluated(Vec::new())
    } else {
        Evaluation::fail(failing_reasons(&children))
    }
}

fn eval_n_of(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let raw = node.value.as_ref();
    let needed = match raw.and_then(NodeValue::as_int) {
        Some(n) => n.max(0) as usize,
        None => return Evaluation::unevaluated(vec!["N_OF condition without a threshold".to_string()]),
    };
    let children = eval_children(node, ctx);
    let passed = children.iter().filter(|c| c.satisfied()).count();
    if passed < needed {
        let mut reasons = failing_reasons(&children);
        reasons.push(format!("N_OF({}): only {} conditions passed", needed, passed));
        return Evaluation::fail(reasons);
    }
    let verified = children.iter().filter(|c| c.fully_satisfied()).count();
    if verified >= needed {
        Evaluation::pass()
    } else {
        Evaluation::unevaluated(Vec::new())
    }
}

fn eval_year(node: &PrerequisiteNode, ctx: &EvalContext<'_>) -> Evaluation {
    let required = match node.value.as_ref().and_then(NodeValue::as_int) {
        Some(y) => y,
        None => return Evaluation::unevaluated(vec!["YEAR condition without a year".to_string()]),
    };
    if i64::from(ctx.year()) >= required {
        Evaluation::pass()
    } else {
        Evaluation::fail(vec![format!("Year requirement {} not met", required)])
    }
}
