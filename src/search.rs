//! Bottom-up, score-guided enumeration of pipelines.
//!
//! The frontier is a min-heap keyed by `(score, length, text)`: candidates
//! closest to the expected output go first, shorter ones break score ties,
//! and the rendered text makes the order total so runs are reproducible.
//! Only operators listed by [`Schema::rules`] for the candidate's current
//! result schema are ever appended.
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::{debug, trace};

use crate::expr::Expr;
use crate::jq_exec::Oracle;
use crate::schema::Schema;
use crate::spec::Spec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Satisfying pipelines in discovery order (never empty).
    Found(Vec<Expr>),
    Exhausted { depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct WorkKey {
    score: usize,
    length: usize,
    text: String,
}

/// Frontier entry; ordering looks at the key only.
#[derive(Debug)]
struct Work {
    key: WorkKey,
    expr: Expr,
    schema: Schema,
}

impl PartialEq for Work {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Work {}

impl PartialOrd for Work {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Work {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

pub fn bottom_up<O: Oracle>(
    spec: &Spec,
    oracle: &O,
    input_schema: &Schema,
    depth: usize,
    max_results: usize,
) -> Outcome {
    let max_results = max_results.max(1);
    let mut results = Vec::new();

    let identity = Expr::identity();
    let verdict = spec.verify(oracle, &identity);
    if verdict.is_match() {
        results.push(identity.clone());
        if results.len() == max_results {
            return Outcome::Found(results);
        }
    }

    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse(Work {
        key: WorkKey { score: verdict.score, length: 0, text: identity.render() },
        expr: identity,
        schema: input_schema.clone(),
    }));

    let mut expanded = 0usize;
    while let Some(Reverse(work)) = frontier.pop() {
        if work.expr.len() >= depth {
            continue;
        }
        trace!(score = work.key.score, expr = %work.key.text, schema = %work.schema, "expand");
        expanded += 1;

        for rule in work.schema.rules(spec.constants()) {
            let next = work.expr.then(rule.op);
            let text = next.render();
            let verdict = spec.verify_text(oracle, &text);
            if verdict.is_match() {
                debug!(expr = %text, expanded, "found");
                results.push(next);
                if results.len() == max_results {
                    return Outcome::Found(results);
                }
                continue;
            }
            frontier.push(Reverse(Work {
                key: WorkKey { score: verdict.score, length: next.len(), text },
                expr: next,
                schema: rule.output,
            }));
        }
    }

    debug!(depth, expanded, found = results.len(), "frontier exhausted");
    if results.is_empty() {
        Outcome::Exhausted { depth }
    } else {
        Outcome::Found(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jq_exec::Jaq;
    use crate::spec::{Example, Literal};
    use serde_json::{json, Value};

    fn run(examples: Vec<(Value, Value)>, constants: &[Literal], depth: usize, k: usize) -> Outcome {
        let examples = examples
            .into_iter()
            .map(|(i, o)| Example::new(i, o.as_array().cloned().unwrap_or_default()))
            .collect::<Vec<_>>();
        let schema = Schema::common(examples.iter().map(|ex| &ex.input));
        let spec = Spec::new(examples, constants);
        bottom_up(&spec, &Jaq, &schema, depth, k)
    }

    fn texts(outcome: &Outcome) -> Vec<String> {
        match outcome {
            Outcome::Found(exprs) => exprs.iter().map(Expr::render).collect(),
            Outcome::Exhausted { depth } => panic!("exhausted at depth {depth}"),
        }
    }

    #[test]
    fn identity_is_checked_first() {
        let out = run(vec![(json!({"a": 1}), json!([{"a": 1}]))], &[], 3, 1);
        assert_eq!(texts(&out), ["."]);
    }

    #[test]
    fn sort_by_field() {
        let out = run(
            vec![(
                json!([{"foo": 1}, {"foo": 3}, {"foo": 2}]),
                json!([[{"foo": 1}, {"foo": 2}, {"foo": 3}]]),
            )],
            &[],
            3,
            1,
        );
        assert_eq!(texts(&out), ["sort_by(.foo)"]);
    }

    #[test]
    fn select_with_constant() {
        let out = run(
            vec![
                (json!({"x": 10}), json!([])),
                (json!({"x": 42}), json!([{"x": 42}])),
            ],
            &[Literal::Int(42)],
            3,
            1,
        );
        assert_eq!(texts(&out), ["select(.x == 42)"]);
    }

    #[test]
    fn values_not_keys() {
        let out = run(vec![(json!({"a": 1, "b": 2}), json!([1, 2]))], &[], 3, 1);
        assert_eq!(texts(&out), [".[]"]);
    }

    #[test]
    fn equal_scores_break_ties_on_text() {
        let out = run(
            vec![
                (json!({"xs": [true, true]}), json!([true])),
                (json!({"xs": [true, false]}), json!([false])),
            ],
            &[],
            3,
            1,
        );
        // `.[]` and `.xs` tie on score and length; `.[]` sorts first.
        assert_eq!(texts(&out), [".[] | all"]);
    }

    #[test]
    fn collects_several_results_in_discovery_order() {
        let out = run(
            vec![(json!([{"foo": 1}, {"foo": 3}, {"foo": 2}]), json!([[{"foo": 1}, {"foo": 2}, {"foo": 3}]]))],
            &[],
            2,
            2,
        );
        assert_eq!(texts(&out), ["sort_by(.foo)", "sort"]);
    }

    #[test]
    fn results_respect_the_depth_bound() {
        let out = run(vec![(json!([3, 1, 2]), json!([[1, 2, 3]]))], &[], 3, 5);
        match out {
            Outcome::Found(exprs) => {
                assert!(!exprs.is_empty());
                assert!(exprs.iter().all(|e| e.len() <= 3));
            }
            Outcome::Exhausted { .. } => panic!("expected `sort`"),
        }
    }

    #[test]
    fn self_loops_terminate_when_nothing_fits() {
        let out = run(vec![(json!([3, 1, 2]), json!(["nope"]))], &[], 4, 1);
        assert_eq!(out, Outcome::Exhausted { depth: 4 });
    }

    #[test]
    fn depth_zero_only_tries_identity() {
        let out = run(vec![(json!({"a": 1}), json!([1]))], &[], 0, 1);
        assert_eq!(out, Outcome::Exhausted { depth: 0 });
    }

    #[test]
    fn repeated_runs_agree() {
        let examples = vec![(json!({"b": [2, 1], "a": [1, 2]}), json!([[1, 2]]))];
        let first = run(examples.clone(), &[], 3, 3);
        let second = run(examples, &[], 3, 3);
        assert_eq!(first, second);
    }
}
