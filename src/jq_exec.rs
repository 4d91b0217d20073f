use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Runs a filter against one input value and collects the output stream.
///
/// Implementations must be deterministic. Errors (parse, compile, runtime)
/// are reported as `Err`; callers decide what a failure means.
pub trait Oracle {
    fn run(&self, filter: &str, input: &Value) -> Result<Vec<Value>>;
}

/// The `jaq` jq implementation with its standard and JSON definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jaq;

impl Oracle for Jaq {
    fn run(&self, filter: &str, input: &Value) -> Result<Vec<Value>> {
        run_jaq(filter, input)
    }
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn run(&self, filter: &str, input: &Value) -> Result<Vec<Value>> {
        (**self).run(filter, input)
    }
}

/// Load, compile and run `filter_src` on `input` with jaq.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(|errs| {
        let lines = errs
            .iter()
            .map(|(_, err)| format!("parse error: {err:?}"))
            .collect::<Vec<_>>();
        anyhow!("`{filter_src}`: {}", lines.join("; "))
    })?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            let lines = errs
                .iter()
                .flat_map(|(_, undefined)| undefined.iter())
                .map(|(name, kind): &(&str, Undefined)| format!("undefined `{name}`: {kind:?}"))
                .collect::<Vec<_>>();
            anyhow!("`{filter_src}`: {}", lines.join("; "))
        })?;

    let inputs = RcIter::new(core::iter::empty());
    filter
        .run((Ctx::new([], &inputs), Val::from(input.clone())))
        .map(|item| {
            let val = item.map_err(|e| anyhow!("`{filter_src}`: {e:?}"))?;
            // Val's Display is JSON text.
            Ok(serde_json::from_str::<Value>(&val.to_string())?)
        })
        .collect()
}
