use std::path::PathBuf;

use jq_synth::{synthesize, synthesize_many, Document, Jaq, Oracle};

fn fixtures() -> Vec<(String, Document)> {
    let pattern = format!("{}/fixtures/*.json", env!("CARGO_MANIFEST_DIR"));
    let mut paths = glob::glob(&pattern)
        .expect("valid glob")
        .collect::<Result<Vec<PathBuf>, _>>()
        .expect("readable fixtures");
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures under {pattern}");
    paths
        .into_iter()
        .map(|path| {
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            let doc = Document::read(&path).unwrap_or_else(|err| panic!("{name}: {err}"));
            (name, doc)
        })
        .collect()
}

fn load(name: &str) -> Document {
    fixtures()
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, doc)| doc)
        .unwrap_or_else(|| panic!("missing fixture {name}"))
}

#[test]
fn every_fixture_synthesizes_a_sound_expression() {
    for (name, doc) in fixtures() {
        let text = synthesize(&doc.examples, &doc.constants, 3)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        for ex in &doc.examples {
            let actual = Jaq.run(&text, &ex.input).unwrap_or_else(|err| panic!("{name}: `{text}`: {err}"));
            assert_eq!(actual, ex.output, "{name}: `{text}` on {}", ex.input);
        }
    }
}

#[test]
fn single_answer_fixtures_match_their_reference() {
    for name in ["all", "any", "group_by", "identifier", "identity", "keys", "select", "sort", "sort_by", "record"] {
        let doc = load(name);
        let text = synthesize(&doc.examples, &doc.constants, 3).unwrap();
        assert_eq!(Some(text), doc.expression, "{name}");
    }
}

#[test]
fn ties_resolve_the_same_way_every_time() {
    let doc = load("pipe");
    let first = synthesize_many(&doc.examples, &doc.constants, 3, 3).unwrap();
    let second = synthesize_many(&doc.examples, &doc.constants, 3, 3).unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0], ".[] | .[] | .id");
}
