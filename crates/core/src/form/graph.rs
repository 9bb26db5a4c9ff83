//! Derived-field recomputation graph.
//!
//! Each edge reads a fixed list of upstream fields and writes one downstream
//! field. Edges are kept in topological order, so a single forward pass over
//! them after any change converges every derived field.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::field::FieldName;

use super::store::{ChangeSet, FieldStore, FieldValues};
use super::validation::parse_number;

/// Arithmetic applied to the parsed upstream values of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formula {
    /// a × b
    Product,
    /// a × factor
    Scale(f64),
    /// a + b
    Sum,
    /// a − b
    Difference,
}

impl Formula {
    fn apply(&self, inputs: &[f64]) -> f64 {
        match (self, inputs) {
            (Formula::Product, [a, b]) => a * b,
            (Formula::Scale(factor), [a]) => a * factor,
            (Formula::Sum, [a, b]) => a + b,
            (Formula::Difference, [a, b]) => a - b,
            _ => f64::NAN,
        }
    }

    fn arity(&self) -> usize {
        match self {
            Formula::Scale(_) => 1,
            Formula::Product | Formula::Sum | Formula::Difference => 2,
        }
    }
}

/// One derived field and how to compute it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub inputs: Vec<FieldName>,
    pub output: FieldName,
    pub formula: Formula,
}

impl Edge {
    pub fn new(inputs: Vec<FieldName>, output: FieldName, formula: Formula) -> Self {
        Self {
            inputs,
            output,
            formula,
        }
    }

    /// Compute the downstream string from the current values.
    ///
    /// Empty upstream → empty result. A non-empty upstream that is not a
    /// finite number also clears the result rather than writing `NaN`.
    pub fn evaluate(&self, values: &FieldValues) -> String {
        let mut parsed = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let raw = values.value(*input);
            if raw.is_empty() {
                return String::new();
            }
            match parse_number(&raw.replacen(',', ".", 1)) {
                Some(v) => parsed.push(v),
                None => {
                    debug!(field = %input, value = raw, "non-numeric upstream value; clearing {}", self.output);
                    return String::new();
                }
            }
        }
        format_fixed2(self.formula.apply(&parsed))
    }
}

/// Print `value` with exactly two decimals.
///
/// Rounds the exact stored binary value, ties away from zero, so `1.115`
/// (stored just below the tie) gives `"1.11"` and `10.125` gives `"10.13"`.
/// Any negative input keeps its sign, `-0.001` gives `"-0.00"`.
pub fn format_fixed2(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    match Decimal::from_f64_retain(value.abs()) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{sign}{rounded:.2}")
        }
        // Out of `Decimal` range; exact ties cannot occur at this magnitude
        None => format!("{sign}{:.2}", value.abs()),
    }
}

/// Directed acyclic graph of derived-field edges, stored in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Build a graph from edges in any order.
    ///
    /// Fails if two edges write the same field, an edge's input count does
    /// not match its formula, or the edges form a cycle.
    pub fn new(edges: Vec<Edge>) -> Result<Self, CoreError> {
        let mut writer: HashMap<FieldName, usize> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            if edge.inputs.len() != edge.formula.arity() {
                return Err(CoreError::InvalidGraph(format!(
                    "edge for {} has {} inputs, formula expects {}",
                    edge.output,
                    edge.inputs.len(),
                    edge.formula.arity()
                )));
            }
            if writer.insert(edge.output, i).is_some() {
                return Err(CoreError::InvalidGraph(format!(
                    "field {} is written by more than one edge",
                    edge.output
                )));
            }
        }

        // Kahn's algorithm over edges: edge j depends on edge i when one of
        // j's inputs is i's output.
        let count = edges.len();
        let mut in_degree = vec![0usize; count];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (j, edge) in edges.iter().enumerate() {
            for input in &edge.inputs {
                if let Some(&i) = writer.get(input) {
                    children[i].push(j);
                    in_degree[j] += 1;
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &child in &children[i] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if order.len() != count {
            return Err(CoreError::InvalidGraph(
                "cycle detected in field dependencies".to_string(),
            ));
        }

        let mut slots: Vec<Option<Edge>> = edges.into_iter().map(Some).collect();
        let edges = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(Self { edges })
    }

    /// The four edges of the income form:
    ///
    /// ```text
    /// amount, exchangeRate  -> amountInUah       (product)
    /// amountInUah           -> epTax             (× ep_tax_rate)
    /// esvTax, epTax         -> taxesSum          (sum)
    /// amountInUah, taxesSum -> amountAfterTaxes  (difference)
    /// ```
    pub fn income_form(ep_tax_rate: f64) -> Self {
        use FieldName::*;
        Self {
            edges: vec![
                Edge::new(vec![Amount, ExchangeRate], AmountInUah, Formula::Product),
                Edge::new(vec![AmountInUah], EpTax, Formula::Scale(ep_tax_rate)),
                Edge::new(vec![EsvTax, EpTax], TaxesSum, Formula::Sum),
                Edge::new(vec![AmountInUah, TaxesSum], AmountAfterTaxes, Formula::Difference),
            ],
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Drop every edge; later changes no longer propagate.
    pub fn detach(&mut self) {
        self.edges.clear();
    }

    /// Recompute every edge downstream of `changed`, in topological order,
    /// writing through `store.set_field`. Fields whose value changed are
    /// added to `changed`.
    pub fn propagate(&self, store: &mut FieldStore, changed: &mut ChangeSet) {
        for edge in &self.edges {
            if !edge.inputs.iter().any(|input| changed.contains(input)) {
                continue;
            }
            let value = edge.evaluate(store.values());
            if store.set_field(edge.output, &value) {
                changed.insert(edge.output);
            }
        }
    }
}
