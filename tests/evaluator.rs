//! Tests for condition evaluation, routing and iteration.
mod common;
use common::*;
use keiro::evaluator::{StepEvaluation, evaluate_step, expand, path_matches};
use keiro::prelude::*;
use keiro::scope::CURRENT_ITEM;
use keiro::step::ForEachConfig;
use serde_json::json;

fn support_router() -> ConditionalPathsConfig {
    ConditionalPathsConfig {
        conditions: vec![path(
            "support",
            vec![condition("trigger.category", Operator::Equals, "support")],
            vec![log_step("support-log", "support")],
        )],
        default_path: DefaultPath {
            steps: list(vec![log_step("default-log", "default")]),
        },
    }
}

#[test]
fn test_unmatched_category_takes_default_path() {
    let router = support_router();
    let scope = VariableContext::with_trigger(json!({"category": "sales"}));

    let decision = route(&router, &scope);

    assert!(decision.is_default());
    assert_eq!(decision.steps.len(), 1);
    assert_eq!(decision.steps[0].id, "default-log");
}

#[test]
fn test_matched_category_takes_its_path() {
    let router = support_router();
    let scope = VariableContext::with_trigger(json!({"category": "support"}));

    let decision = route(&router, &scope);

    assert_eq!(decision.path_id, Some("support"));
    assert_eq!(decision.steps[0].id, "support-log");
}

#[test]
fn test_path_requires_every_condition() {
    let scope = VariableContext::with_trigger(json!({"category": "support", "priority": "2"}));
    let both = path(
        "p",
        vec![
            condition("trigger.category", Operator::Equals, "support"),
            condition("trigger.priority", Operator::GreaterThan, "5"),
        ],
        vec![],
    );
    assert!(!path_matches(&both, &scope));

    let empty = path("empty", vec![], vec![]);
    assert!(!path_matches(&empty, &scope));
}

#[test]
fn test_condition_without_field_never_matches() {
    let scope = VariableContext::with_trigger(json!({"category": "support"}));
    let blank = path("blank", vec![condition("  ", Operator::IsEmpty, "")], vec![]);
    assert!(!path_matches(&blank, &scope));

    let mixed = path(
        "mixed",
        vec![
            condition("trigger.category", Operator::Equals, "support"),
            condition("", Operator::IsEmpty, ""),
        ],
        vec![],
    );
    assert!(!path_matches(&mixed, &scope));
}

#[test]
fn test_router_is_first_match() {
    let router = ConditionalPathsConfig {
        conditions: vec![
            path(
                "first",
                vec![condition("trigger.category", Operator::IsNotEmpty, "")],
                vec![log_step("a", "first")],
            ),
            path(
                "second",
                vec![condition("trigger.category", Operator::Equals, "support")],
                vec![log_step("b", "second")],
            ),
        ],
        default_path: DefaultPath::default(),
    };
    let scope = VariableContext::with_trigger(json!({"category": "support"}));

    assert_eq!(route(&router, &scope).path_id, Some("first"));
}

#[test]
fn test_router_without_paths_falls_back() {
    let router = ConditionalPathsConfig {
        conditions: vec![],
        default_path: DefaultPath {
            steps: list(vec![log_step("only", "x")]),
        },
    };
    let decision = route(&router, &VariableContext::new());
    assert!(decision.is_default());
    assert_eq!(decision.steps[0].id, "only");
}

#[test]
fn test_unparsable_numbers_never_match() {
    let scope = VariableContext::with_trigger(json!({"amount": "n/a", "count": 12}));
    assert!(!evaluate(
        &condition("trigger.amount", Operator::GreaterThan, "10"),
        &scope
    ));
    assert!(!evaluate(
        &condition("trigger.count", Operator::GreaterThan, "ten"),
        &scope
    ));
    assert!(evaluate(
        &condition("trigger.count", Operator::GreaterThan, "10"),
        &scope
    ));
}

#[test]
fn test_iteration_renders_each_item() {
    let iterator = ForEachConfig {
        source_variable: "trigger.accounts".to_string(),
        child_steps: vec![],
    };
    let scope =
        VariableContext::with_trigger(json!({"accounts": [{"name": "Acme"}, {"name": "Globex"}]}));

    let rendered: Vec<String> = expand(&iterator, &scope)
        .map(|frame| render("Follow up: {{currentItem.name}}", &frame).text)
        .collect();

    assert_eq!(rendered, vec!["Follow up: Acme", "Follow up: Globex"]);
}

#[test]
fn test_empty_or_unbound_source_yields_nothing() {
    let scope = VariableContext::with_trigger(json!({"accounts": [], "name": "x"}));
    for source in ["trigger.accounts", "trigger.missing", "nothing", "trigger.name"] {
        let iterator = ForEachConfig {
            source_variable: source.to_string(),
            child_steps: vec![],
        };
        assert_eq!(expand(&iterator, &scope).len(), 0, "source {}", source);
    }
}

#[test]
fn test_scalar_or_object_source_yields_nothing() {
    let scope = VariableContext::with_trigger(json!({
        "account": {"name": "a", "items": [1, 2]},
        "count": 3,
        "active": true,
        "blob": "{\"a\": 1}"
    }));
    for source in ["trigger.account", "trigger.count", "trigger.active", "trigger.blob"] {
        let iterator = ForEachConfig {
            source_variable: source.to_string(),
            child_steps: vec![],
        };
        assert_eq!(expand(&iterator, &scope).len(), 0, "source {}", source);
    }
}

#[test]
fn test_json_text_source_is_accepted() {
    let scope = VariableContext::with_trigger(json!({"ids": "[1, 2, 3]"}));
    let iterator = ForEachConfig {
        source_variable: "{{trigger.ids}}".to_string(),
        child_steps: vec![],
    };
    assert_eq!(expand(&iterator, &scope).len(), 3);
}

#[test]
fn test_current_item_shadows_and_restores() {
    let mut outer = VariableContext::with_trigger(json!({"items": ["inner"]}));
    outer.bind_current_item(json!("outer"));
    let iterator = ForEachConfig {
        source_variable: "trigger.items".to_string(),
        child_steps: vec![],
    };

    let seen: Vec<String> = expand(&iterator, &outer)
        .filter_map(|frame| frame.resolve(CURRENT_ITEM))
        .collect();

    assert_eq!(seen, vec!["inner"]);
    assert_eq!(outer.resolve(CURRENT_ITEM).as_deref(), Some("outer"));
}

#[test]
fn test_evaluate_step_dispatches_by_type() {
    let scope = VariableContext::with_trigger(json!({"category": "sales", "items": [1, 2]}));

    let leaf = log_step("leaf", "x");
    assert!(matches!(evaluate_step(&leaf, &scope), StepEvaluation::Leaf));

    let routed = router(
        "r",
        vec![path(
            "p",
            vec![condition("trigger.category", Operator::Equals, "sales")],
            vec![],
        )],
        vec![],
    );
    match evaluate_step(&routed, &scope) {
        StepEvaluation::Route(decision) => assert_eq!(decision.path_id, Some("p")),
        _ => panic!("expected a route decision"),
    }

    let looped = for_each("f", "trigger.items", vec![]);
    match evaluate_step(&looped, &scope) {
        StepEvaluation::Iterate(expansion) => assert_eq!(expansion.len(), 2),
        _ => panic!("expected an iteration"),
    }
}
