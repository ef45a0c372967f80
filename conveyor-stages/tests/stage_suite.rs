//! End-to-end stage behavior over the full runner lifecycle.

use conveyor_core::account::Account;
use conveyor_core::prelude::*;
use conveyor_core::testing::StageTester;
use conveyor_stages::{
    CharacterCounter, DocConsumer, DocGenerator, GenderRouter, MergeStreams, PropertyShowcase,
    SchemaGate, TokenAccount, TokenStamper,
};
use proptest::prelude::*;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn doc(entries: &[(&str, serde_json::Value)]) -> Document {
    let mut d = Document::new();
    for (k, v) in entries {
        d.set(*k, v.clone());
    }
    d
}

#[test]
fn generator_feeds_consumer_through_the_lifecycle() {
    init_tracing();
    let mut generator = DocGenerator::default();
    let outcome = StageTester::new()
        .property("count", 4)
        .run_execute(&mut generator)
        .unwrap();
    let generated: Vec<Document> = outcome.output("output0").unwrap().to_vec();

    let mut consumer = DocConsumer::default();
    StageTester::new()
        .input("input0", generated)
        .run_execute(&mut consumer)
        .unwrap();
    assert_eq!(consumer.consumed(), 4);
}

#[test]
fn negative_generation_completes_with_a_single_error() {
    init_tracing();
    let mut generator = DocGenerator::default();
    let outcome = StageTester::new()
        .property("count", -1)
        .run_execute(&mut generator)
        .unwrap();
    assert!(outcome.output("output0").unwrap().is_empty());
    assert_eq!(outcome.errors("error0").unwrap().len(), 1);
}

#[test]
fn gender_routing_conserves_documents() {
    init_tracing();
    let people: Vec<Document> = ["male", "female", "female", "none", "male", "robot"]
        .iter()
        .map(|g| doc(&[("gender", json!(g))]))
        .collect();
    let total = people.len();

    let mut router = GenderRouter::default();
    let outcome = StageTester::new()
        .input("input0", people)
        .input("input1", vec![doc(&[("name", json!("no gender"))])])
        .run_process(&mut router)
        .unwrap();

    let male = outcome.output("output_male").unwrap().len();
    let female = outcome.output("output_female").unwrap().len();
    let errors = outcome.errors("error0").unwrap().len();
    assert_eq!(male, 2);
    assert_eq!(female, 2);
    assert_eq!(male + female + errors, total + 1);
}

#[test]
fn schema_gate_never_sends_a_document_to_both_views() {
    init_tracing();
    let inputs = vec![
        doc(&[("colA", json!("a")), ("colB", json!("b")), ("colC", json!("c"))]),
        doc(&[("colA", json!("a"))]),
        doc(&[("colB", json!("b")), ("colC", json!("c"))]),
    ];
    let total = inputs.len();

    let mut gate = SchemaGate;
    let outcome = StageTester::new()
        .input("input0", inputs)
        .run_process(&mut gate)
        .unwrap();

    let passed = outcome.output("output0").unwrap().len();
    let failed = outcome.errors("error0").unwrap().len();
    assert_eq!(passed, 1);
    assert_eq!(passed + failed, total);
}

#[test]
fn merged_documents_keep_headers_and_gain_the_stamp() {
    init_tracing();
    let left = doc(&[("side", json!("left"))]);
    let left_id = left.header().id();

    let mut merge = MergeStreams::default();
    let outcome = StageTester::new()
        .input("input0", vec![left])
        .input("input1", vec![doc(&[("side", json!("right"))])])
        .run_process(&mut merge)
        .unwrap();

    let docs = outcome.output("output0").unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().any(|d| d.header().id() == left_id));
    assert!(docs
        .iter()
        .all(|d| d.get("processed").and_then(|v| v.as_string()).as_deref() == Some("True")));
}

#[test]
fn stamper_sees_the_account_variables() {
    init_tracing();
    let mut account = TokenAccount::default();
    let mut values = PropertyValues::new();
    values.set("user_id", "dora");
    values.set("passphrase", "open sesame");
    values.set("expiration", 1_800_000_000_000i64);
    account.configure(&values).unwrap();
    let vars = account.variables();

    let mut stamper = TokenStamper::new(account);
    let outcome = StageTester::new()
        .scope("account", vars)
        .input("input0", vec![Document::new(), Document::new()])
        .run_process(&mut stamper)
        .unwrap();

    let docs = outcome.output("output0").unwrap();
    assert_eq!(docs.len(), 2);
    let first_token = docs[0].get("token").and_then(|v| v.as_string());
    assert!(first_token.as_deref().is_some_and(|t| !t.is_empty()));
    assert_eq!(first_token, docs[1].get("token").and_then(|v| v.as_string()));
    assert_eq!(
        docs[0].get("user_id").and_then(|v| v.as_string()).as_deref(),
        Some("dora")
    );
}

#[test]
fn showcase_expressions_are_stable_across_documents() {
    init_tracing();
    let mut showcase = PropertyShowcase::default();
    let outcome = StageTester::new()
        .property("password_prop", "pw")
        .property(
            "table_param",
            json!([
                { "table_file": "a", "table_prop": "1" },
                { "table_file": "b", "table_prop": "2" },
                { "table_file": "c", "table_prop": "3" }
            ]),
        )
        .input("input0", vec![Document::new(), Document::new(), Document::new()])
        .run_process(&mut showcase)
        .unwrap();

    let docs = outcome.output("output0").unwrap();
    let first = docs[0].field("table_param").cloned();
    for d in docs {
        assert_eq!(d.field("table_param").cloned(), first);
    }
}

proptest! {
    #[test]
    fn letter_counts_sum_to_the_letter_total(input in "[ -~]{0,512}") {
        let letters = input.chars().filter(|c| c.is_ascii_alphabetic()).count() as u64;

        let mut counter = CharacterCounter::default();
        let mut outcome = StageTester::new()
            .binary_input("input0", input.clone().into_bytes())
            .run_binary(&mut counter)
            .unwrap();

        let drained = outcome.binary_output("output0").unwrap();
        let counted: u64 = String::from_utf8(drained)
            .unwrap()
            .lines()
            .map(|line| {
                let (_, count) = line.split_once(':').unwrap();
                count.parse::<u64>().unwrap()
            })
            .sum();
        prop_assert_eq!(counted, letters);
    }
}
