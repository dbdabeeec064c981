//! Árbol de prerequisitos (ROOT / INNER / LEAF) y su evaluador.
//!
//! El árbol llega ya validado desde la ingesta del catálogo; aquí sólo se
//! representa con tipos cerrados. Los subtipos desconocidos se conservan en
//! `Subtype::Unknown` para poder reportarlos sin romper la evaluación.
mod eval;

pub use eval::{evaluate, EvalContext, EvalStatus, Evaluation, PlannedTerms};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Root,
    Inner,
    Leaf,
}

impl NodeType {
    /// Sin distinguir mayúsculas; `None` si el nombre no es un tipo conocido.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "ROOT" => Some(NodeType::Root),
            "INNER" => Some(NodeType::Inner),
            "LEAF" => Some(NodeType::Leaf),
            _ => None,
        }
    }
}

// Un tipo desconocido o no textual deja el nodo sin tipo en vez de invalidar
// todo el catálogo.
fn lenient_node_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeType>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(NodeType::from_name))
}

// `"childNodes": null` equivale a no tener hijos.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PrerequisiteNode>, D::Error> {
    Ok(Option::<Vec<PrerequisiteNode>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Operador (ROOT/INNER) o tipo de hoja (LEAF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtype {
    And,
    Or,
    NOf,
    NCreditsOf,
    Grade,
    Course,
    Year,
    Program,
    Permission,
    Credits,
    Department,
    Major,
    Unknown(String),
}

impl Subtype {
    /// Interpreta el nombre sin distinguir mayúsculas.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "AND" => Subtype::And,
            "OR" => Subtype::Or,
            "N_OF" => Subtype::NOf,
            "N_CREDITS_OF" => Subtype::NCreditsOf,
            "GRADE" => Subtype::Grade,
            "COURSE" => Subtype::Course,
            "YEAR" => Subtype::Year,
            "PROGRAM" => Subtype::Program,
            "PERMISSION" => Subtype::Permission,
            "CREDITS" => Subtype::Credits,
            "DEPARTMENT" => Subtype::Department,
            "MAJOR" => Subtype::Major,
            _ => Subtype::Unknown(name.trim().to_uppercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Subtype::And => "AND",
            Subtype::Or => "OR",
            Subtype::NOf => "N_OF",
            Subtype::NCreditsOf => "N_CREDITS_OF",
            Subtype::Grade => "GRADE",
            Subtype::Course => "COURSE",
            Subtype::Year => "YEAR",
            Subtype::Program => "PROGRAM",
            Subtype::Permission => "PERMISSION",
            Subtype::Credits => "CREDITS",
            Subtype::Department => "DEPARTMENT",
            Subtype::Major => "MAJOR",
            Subtype::Unknown(name) => name.as_str(),
        }
    }
}

impl Serialize for Subtype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subtype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Subtype::from_name(&raw))
    }
}

/// Valor asociado al nodo: código de curso, umbral entero, porcentaje o año.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NodeValue {
    pub fn as_text(&self) -> Option<String> {
        match self {
            NodeValue::Text(s) => Some(s.clone()),
            NodeValue::Number(n) => Some(n.to_string()),
            NodeValue::Other(_) => None,
        }
    }

    /// Umbral entero; acepta números y cadenas numéricas ("2").
    pub fn as_int(&self) -> Option<i64> {
        match self {
            NodeValue::Number(n) if n.is_finite() => Some(n.floor() as i64),
            NodeValue::Text(s) => s.trim().parse::<f64>().ok().map(|n| n.floor() as i64),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            NodeValue::Number(n) => write!(f, "{}", n),
            NodeValue::Text(s) => write!(f, "{}", s),
            NodeValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Nodo del árbol. Un objeto vacío (`{}`) deserializa a un nodo sin subtipo,
/// es decir, "sin prerequisitos".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteNode {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_node_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub child_nodes: Vec<PrerequisiteNode>,
}

impl PrerequisiteNode {
    pub fn leaf(subtype: Subtype, value: NodeValue) -> Self {
        PrerequisiteNode {
            node_type: Some(NodeType::Leaf),
            subtype: Some(subtype),
            value: Some(value),
            child_nodes: Vec::new(),
        }
    }

    pub fn course(code: &str) -> Self {
        Self::leaf(Subtype::Course, NodeValue::Text(code.to_string()))
    }

    pub fn year(year: u32) -> Self {
        Self::leaf(Subtype::Year, NodeValue::Number(year as f64))
    }

    pub fn inner(subtype: Subtype, value: Option<NodeValue>, children: Vec<PrerequisiteNode>) -> Self {
        PrerequisiteNode {
            node_type: Some(NodeType::Inner),
            subtype: Some(subtype),
            value,
            child_nodes: children,
        }
    }

    pub fn all_of(children: Vec<PrerequisiteNode>) -> Self {
        Self::inner(Subtype::And, None, children)
    }

    pub fn any_of(children: Vec<PrerequisiteNode>) -> Self {
        Self::inner(Subtype::Or, None, children)
    }

    pub fn n_of(n: u32, children: Vec<PrerequisiteNode>) -> Self {
        Self::inner(Subtype::NOf, Some(NodeValue::Number(n as f64)), children)
    }

    /// Códigos de todas las hojas COURSE del árbol, normalizados.
    pub fn course_codes(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_course_codes(&mut out);
        out
    }

    fn collect_course_codes(&self, out: &mut BTreeSet<String>) {
        if self.subtype == Some(Subtype::Course) {
            if let Some(code) = self.value.as_ref().and_then(NodeValue::as_text) {
                out.insert(crate::models::normalize_code(&code));
            }
        }
        for child in &self.child_nodes {
            child.collect_course_codes(out);
        }
    }
}
