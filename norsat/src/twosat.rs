//! 2-SAT solving on the implication graph.
//!
//! For formulas where every clause has exactly two literals, satisfiability is decidable in
//! linear time: a clause `(a ∨ b)` is equivalent to the implications `¬a → b` and `¬b → a`.
//! The formula is satisfiable iff no variable ends up in the same strongly connected component
//! of the implication graph as its negation, and a model can be read off the SCC condensation.
//!
//! This is a separate entry point next to [`Solver`](crate::solver::Solver) and does not share
//! any state with the CDCL core.
use thiserror::Error;

use norsat_formula::{CnfFormula, Lit, Var};

/// Error for formulas outside the 2-SAT fragment.
#[derive(Debug, Error)]
#[error("clause {index} has {len} literals, every 2-SAT clause has exactly 2")]
pub struct NotBinaryError {
    /// Index of the offending clause.
    pub index: usize,
    /// Number of literals of the offending clause.
    pub len: usize,
}

/// Decide a 2-SAT formula and produce a model if it is satisfiable.
///
/// Returns an error when any clause does not have exactly two literals. Variables that are not
/// constrained by any clause get an arbitrary polarity in the model.
pub fn solve_2sat(formula: &CnfFormula) -> Result<Option<Vec<Lit>>, NotBinaryError> {
    for (index, clause) in formula.iter().enumerate() {
        if clause.len() != 2 {
            return Err(NotBinaryError {
                index,
                len: clause.len(),
            });
        }
    }

    // Nodes are literal codes, edges are the implications of the clauses.
    let mut edges = vec![vec![]; formula.var_count() * 2];

    for clause in formula.iter() {
        let (a, b) = (clause[0], clause[1]);
        edges[(!a).code()].push(b.code() as u32);
        edges[(!b).code()].push(a.code() as u32);
    }

    let components = tarjan_components(&edges);

    let mut model = Vec::with_capacity(formula.var_count());

    for index in 0..formula.var_count() {
        let var = Var::from_index(index);
        let positive = components[var.positive().code()];
        let negative = components[var.negative().code()];

        if positive == negative {
            return Ok(None);
        }

        // Components are numbered in reverse topological order of the condensation, so the
        // smaller number is closer to the sinks. Satisfying the literal whose component comes
        // later in topological order cannot imply its own negation.
        model.push(var.lit(positive < negative));
    }

    Ok(Some(model))
}

const UNSET: u32 = u32::max_value();

/// Strongly connected components of a graph given as adjacency lists.
///
/// Components are numbered in reverse topological order of the condensation: every edge leads
/// from a node to a node with the same or a smaller component number.
///
/// This is Tarjan's algorithm with an explicit stack, so large formulas cannot overflow the
/// call stack.
fn tarjan_components(edges: &[Vec<u32>]) -> Vec<u32> {
    let node_count = edges.len();

    let mut index = vec![UNSET; node_count];
    let mut lowlink = vec![0; node_count];
    let mut component = vec![UNSET; node_count];
    let mut on_stack = vec![false; node_count];

    let mut next_index = 0;
    let mut next_component = 0;

    let mut stack = vec![];
    // Pairs of node and the number of its edges already explored.
    let mut call_stack: Vec<(u32, usize)> = vec![];

    for root in 0..node_count {
        if index[root] != UNSET {
            continue;
        }

        call_stack.push((root as u32, 0));

        while let Some(top) = call_stack.last_mut() {
            let node = top.0 as usize;

            if top.1 == 0 {
                index[node] = next_index;
                lowlink[node] = next_index;
                next_index += 1;
                stack.push(top.0);
                on_stack[node] = true;
            }

            if top.1 < edges[node].len() {
                let succ = edges[node][top.1] as usize;
                top.1 += 1;

                if index[succ] == UNSET {
                    call_stack.push((succ as u32, 0));
                } else if on_stack[succ] && index[succ] < lowlink[node] {
                    lowlink[node] = index[succ];
                }
            } else {
                call_stack.pop();

                if lowlink[node] == index[node] {
                    loop {
                        let member = stack.pop().unwrap();
                        on_stack[member as usize] = false;
                        component[member as usize] = next_component;
                        if member as usize == node {
                            break;
                        }
                    }
                    next_component += 1;
                }

                if let Some(parent) = call_stack.last_mut() {
                    let parent_node = parent.0 as usize;
                    if lowlink[node] < lowlink[parent_node] {
                        lowlink[parent_node] = lowlink[node];
                    }
                }
            }
        }
    }

    component
}
