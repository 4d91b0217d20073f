//! Synthesis entry points.
//!
//! [`Synthesizer::run`] infers the input schema, runs the bottom-up search,
//! and when the search is exhausted falls back to building a record one
//! output field at a time.
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SynthConfig;
use crate::error::SynthError;
use crate::expr::Program;
use crate::jq_exec::{Jaq, Oracle};
use crate::schema::Schema;
use crate::search::{self, Outcome};
use crate::spec::{Example, Literal, Spec};

/// First expression found for the examples within `depth` operators.
pub fn synthesize(
    examples: &[Example],
    constants: &[Literal],
    depth: usize,
) -> Result<String, SynthError> {
    let mut found = synthesize_many(examples, constants, depth, 1)?;
    Ok(found.remove(0))
}

/// Up to `max_results` expressions, in discovery order.
pub fn synthesize_many(
    examples: &[Example],
    constants: &[Literal],
    depth: usize,
    max_results: usize,
) -> Result<Vec<String>, SynthError> {
    let config = SynthConfig::default()
        .with_depth(depth)
        .with_max_results(max_results);
    let programs = Synthesizer::new(Jaq, config).run(examples, constants)?;
    Ok(programs.iter().map(Program::render).collect())
}

#[derive(Debug, Clone)]
pub struct Synthesizer<O> {
    oracle: O,
    config: SynthConfig,
}

impl Default for Synthesizer<Jaq> {
    fn default() -> Self {
        Self::new(Jaq, SynthConfig::default())
    }
}

impl<O: Oracle> Synthesizer<O> {
    pub fn new(oracle: O, config: SynthConfig) -> Self {
        Self { oracle, config }
    }

    pub fn run(&self, examples: &[Example], constants: &[Literal]) -> Result<Vec<Program>, SynthError> {
        if examples.is_empty() {
            return Err(SynthError::NoExamples);
        }
        let input_schema = Schema::common(examples.iter().map(|ex| &ex.input));
        info!(examples = examples.len(), schema = %input_schema, depth = self.config.depth, "synthesizing");
        self.run_with_schema(examples, constants, &input_schema, self.config.max_results)
    }

    fn run_with_schema(
        &self,
        examples: &[Example],
        constants: &[Literal],
        input_schema: &Schema,
        max_results: usize,
    ) -> Result<Vec<Program>, SynthError> {
        let spec = self.spec(examples.to_vec(), constants);
        match search::bottom_up(&spec, &self.oracle, input_schema, self.config.depth, max_results) {
            Outcome::Found(exprs) => Ok(exprs.into_iter().map(Program::from).collect()),
            Outcome::Exhausted { depth } => {
                debug!(depth, "bottom-up search exhausted, trying per-field synthesis");
                let program = self.union(&spec, input_schema, depth)?;
                Ok(vec![program])
            }
        }
    }

    fn spec(&self, examples: Vec<Example>, constants: &[Literal]) -> Spec {
        Spec::new(examples, constants).with_policy(self.config.score_policy)
    }

    /// Per-field fallback for examples the whole-pipeline search cannot fit.
    fn union(&self, spec: &Spec, input_schema: &Schema, depth: usize) -> Result<Program, SynthError> {
        let examples = spec.examples();
        let constants = spec.constants().all();

        let Some(heads) = examples
            .iter()
            .map(|ex| ex.output.first().cloned())
            .collect::<Option<Vec<Value>>>()
        else {
            return Err(SynthError::OutOfDepth { depth });
        };

        let program = match Schema::common(&heads) {
            Schema::Dict { fields, .. } => {
                let mut record = Vec::with_capacity(fields.len());
                for key in fields.keys() {
                    let projected = examples
                        .iter()
                        .zip(&heads)
                        .map(|(ex, head)| {
                            let value = head.get(key).cloned().unwrap_or(Value::Null);
                            Example::new(ex.input.clone(), vec![value])
                        })
                        .collect::<Vec<_>>();
                    debug!(field = %key, "synthesizing record field");
                    let mut found = self.run_with_schema(&projected, &constants, input_schema, 1)?;
                    record.push((key.clone(), found.remove(0)));
                }
                Program::Record(record)
            }
            // Wrapping singleton streams repeats the search that just failed.
            _ if examples.iter().all(|ex| ex.output.len() == 1) => {
                return Err(SynthError::OutOfDepth { depth });
            }
            _ => {
                let wrapped = examples
                    .iter()
                    .zip(heads)
                    .map(|(ex, head)| Example::new(ex.input.clone(), vec![head]))
                    .collect::<Vec<_>>();
                let spec = self.spec(wrapped, &constants);
                match search::bottom_up(&spec, &self.oracle, input_schema, depth, 1) {
                    Outcome::Found(mut exprs) => Program::from(exprs.remove(0)),
                    Outcome::Exhausted { depth } => return Err(SynthError::OutOfDepth { depth }),
                }
            }
        };

        if self.config.verify_union {
            let text = program.render();
            if !spec.verify_text(&self.oracle, &text).is_match() {
                warn!(expr = %text, "assembled expression does not reproduce the examples");
                return Err(SynthError::Unverified { expression: text });
            }
        }
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn examples(pairs: Vec<(Value, Value)>) -> Vec<Example> {
        pairs
            .into_iter()
            .map(|(i, o)| Example::new(i, o.as_array().cloned().unwrap_or_default()))
            .collect()
    }

    fn assert_sound(text: &str, examples: &[Example]) {
        for ex in examples {
            assert_eq!(Jaq.run(text, &ex.input).unwrap(), ex.output, "{text} on {}", ex.input);
        }
    }

    #[test]
    fn identity_when_inputs_equal_outputs() {
        let exs = examples(vec![
            (json!({"a": [1, 2]}), json!([{"a": [1, 2]}])),
            (json!("s"), json!(["s"])),
        ]);
        assert_eq!(synthesize(&exs, &[], 3).unwrap(), ".");
    }

    #[test]
    fn spec_scenarios() {
        let exs = examples(vec![(
            json!([{"foo": 1}, {"foo": 3}, {"foo": 2}]),
            json!([[{"foo": 1}, {"foo": 2}, {"foo": 3}]]),
        )]);
        assert_eq!(synthesize(&exs, &[], 3).unwrap(), "sort_by(.foo)");

        let exs = examples(vec![
            (json!({"x": 10}), json!([])),
            (json!({"x": 42}), json!([{"x": 42}])),
        ]);
        assert_eq!(synthesize(&exs, &[Literal::Int(42)], 3).unwrap(), "select(.x == 42)");

        let exs = examples(vec![(json!({"a": 1, "b": 2}), json!([1, 2]))]);
        assert_eq!(synthesize(&exs, &[], 3).unwrap(), ".[]");
    }

    #[test]
    fn results_are_sound() {
        let exs = examples(vec![
            (json!({"users": [{"n": "b", "age": 3}, {"n": "a", "age": 1}]}), json!(["a", "b"])),
            (json!({"users": [{"n": "z", "age": 2}, {"n": "y", "age": 9}]}), json!(["z", "y"])),
        ]);
        for text in synthesize_many(&exs, &[], 4, 3).unwrap() {
            assert_sound(&text, &exs);
        }
    }

    #[test]
    fn record_fallback_assembles_fields() {
        let exs = examples(vec![
            (json!({"a": 1, "b": "x"}), json!([{"n": 1, "s": "x"}])),
            (json!({"a": 2, "b": "y"}), json!([{"n": 2, "s": "y"}])),
        ]);
        let text = synthesize(&exs, &[], 3).unwrap();
        assert_eq!(text, "{n: .a, s: .b}");
        assert_sound(&text, &exs);
    }

    #[test]
    fn record_fallback_recurses_into_nested_records() {
        let exs = examples(vec![
            (json!({"a": 1, "b": "x"}), json!([{"outer": {"inner": "x"}, "n": 1}])),
            (json!({"a": 2, "b": "y"}), json!([{"outer": {"inner": "y"}, "n": 2}])),
        ]);
        let text = synthesize(&exs, &[], 2).unwrap();
        assert_eq!(text, "{outer: {inner: .b}, n: .a}");
        assert_sound(&text, &exs);
    }

    #[test]
    fn unverified_records_are_rejected() {
        // Each field alone is reachable, but the record would have to be
        // emitted once per stream element.
        let exs = examples(vec![(json!({"a": 1, "b": 2}), json!([{"v": 1}, {"v": 2}]))]);
        assert_eq!(
            synthesize(&exs, &[], 2),
            Err(SynthError::Unverified { expression: "{v: .a}".into() })
        );

        let relaxed = Synthesizer::new(Jaq, SynthConfig { depth: 2, verify_union: false, ..SynthConfig::default() });
        let programs = relaxed.run(&exs, &[]).unwrap();
        assert_eq!(programs[0].render(), "{v: .a}");
    }

    #[test]
    fn empty_records_are_assembled_directly() {
        let exs = examples(vec![(json!({"a": 1}), json!([{}])), (json!({"a": 2}), json!([{}]))]);
        let text = synthesize(&exs, &[], 3).unwrap();
        assert_eq!(text, "{}");
        assert_sound(&text, &exs);
    }

    #[test]
    fn streams_fall_back_to_their_first_element() {
        let exs = examples(vec![(json!({"a": 1, "b": 2}), json!([1, 5]))]);
        let relaxed = Synthesizer::new(Jaq, SynthConfig { depth: 2, verify_union: false, ..SynthConfig::default() });
        let programs = relaxed.run(&exs, &[]).unwrap();
        assert_eq!(programs[0].render(), ".a");

        assert_eq!(
            synthesize(&exs, &[], 2),
            Err(SynthError::Unverified { expression: ".a".into() })
        );
    }

    #[test]
    fn exhaustion_is_a_typed_failure() {
        let exs = examples(vec![(json!([3, 1, 2]), json!(["nope"]))]);
        assert_eq!(synthesize(&exs, &[], 2), Err(SynthError::OutOfDepth { depth: 2 }));
    }

    #[test]
    fn empty_output_streams_skip_the_fallback() {
        let exs = examples(vec![(json!({"a": 1}), json!([])), (json!({"a": 2}), json!([7]))]);
        assert_eq!(synthesize(&exs, &[], 2), Err(SynthError::OutOfDepth { depth: 2 }));
    }

    #[test]
    fn no_examples_is_rejected_up_front() {
        assert_eq!(synthesize(&[], &[], 3), Err(SynthError::NoExamples));
    }
}
