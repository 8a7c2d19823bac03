//! Tests for loading, saving and editing workflow documents.
mod common;
use common::*;
use keiro::prelude::*;
use keiro::step::StrategyTarget;
use serde_json::json;
use std::sync::Arc;

fn nested_definition() -> WorkflowDefinition {
    WorkflowDefinition::from_steps(vec![
        log_step("start", "Starting {{trigger.id}}"),
        router(
            "route",
            vec![path(
                "vip",
                vec![condition("trigger.tier", Operator::Equals, "vip")],
                vec![for_each(
                    "each-order",
                    "trigger.orders",
                    vec![router(
                        "inner",
                        vec![path(
                            "big",
                            vec![condition("currentItem.total", Operator::GreaterThan, "100")],
                            vec![notification("big-order", "Order {{currentItem.id}}")],
                        )],
                        vec![log_step("small-order", "small")],
                    )],
                )],
            )],
            vec![log_step("fallback", "regular")],
        ),
    ])
}

#[test]
fn test_round_trip_is_identity() {
    let definition = nested_definition();
    let json = definition.to_json().unwrap();
    let reloaded = WorkflowDefinition::from_json(&json).unwrap();
    assert_eq!(reloaded, definition);
    assert_eq!(reloaded.len(), 7);
}

#[test]
fn test_document_shape() {
    let value = serde_json::to_value(nested_definition()).unwrap();
    let router = &value[1];
    assert_eq!(router["type"], "conditional_paths");
    assert_eq!(router["config"]["conditions"][0]["id"], "vip");
    assert_eq!(
        router["config"]["conditions"][0]["pathSteps"][0]["config"]["sourceVariable"],
        "trigger.orders"
    );
    assert_eq!(router["config"]["defaultPath"]["steps"][0]["id"], "fallback");
}

#[test]
fn test_fixture_documents_load() {
    for document in [SUPPORT_ROUTER_JSON, FOLLOW_UP_JSON, LEGACY_STRATEGY_JSON] {
        let definition = WorkflowDefinition::from_json(document).unwrap();
        assert!(validate(&definition).is_valid());
    }
}

#[test]
fn test_missing_strategy_target_is_repaired() {
    let definition = WorkflowDefinition::from_json(LEGACY_STRATEGY_JSON).unwrap();
    let step = definition.find_step("bump-kr").unwrap();
    match &step.config {
        StepConfig::StrategyUpdate(update) => {
            assert_eq!(update.target, StrategyTarget::KeyResult);
            assert_eq!(update.target_id, "kr-7");
        }
        other => panic!("unexpected config {:?}", other),
    }
    let saved = serde_json::to_value(&definition).unwrap();
    assert_eq!(saved[0]["config"]["type"], "key_result");
}

#[test]
fn test_unknown_step_type_is_rejected() {
    let err = WorkflowDefinition::from_value(json!([
        {"id": "x", "type": "send_fax", "name": "Fax", "config": {}}
    ]))
    .unwrap_err();
    match err {
        DefinitionError::UnknownStepType { step_id, type_name } => {
            assert_eq!(step_id, "x");
            assert_eq!(type_name, "send_fax");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_missing_config_uses_defaults() {
    let definition = WorkflowDefinition::from_value(json!([
        {"id": "x", "type": "log_event", "name": "Log"}
    ]))
    .unwrap();
    assert_eq!(definition.steps()[0].step_type(), StepType::LogEvent);
}

#[test]
fn test_structured_params_load_and_survive_saving() {
    let document = json!([
        {"id": "call", "type": "integration_action", "name": "Call", "config": {
            "integration": "crm",
            "action": "create_lead",
            "params": {"count": 5, "dryRun": true, "tags": ["a", "b"], "owner": {"id": 7}},
            "timeoutMs": 3000
        }},
        {"id": "notify", "type": "notification", "name": "Notify", "config": {
            "channel": "email",
            "templateId": "tpl-9"
        }},
        {"id": "find", "type": "platform_query", "name": "Find", "config": {
            "entity": "ticket",
            "filters": {"status": "open", "priority": 2}
        }}
    ]);

    let definition = WorkflowDefinition::from_value(document.clone()).unwrap();

    let StepConfig::IntegrationAction(call) = &definition.steps()[0].config else {
        panic!("call is not an integration action");
    };
    assert_eq!(call.params["count"], json!(5));
    assert_eq!(call.params["owner"], json!({"id": 7}));
    assert_eq!(call.extra["timeoutMs"], json!(3000));

    let StepConfig::Notification(notify) = &definition.steps()[1].config else {
        panic!("notify is not a notification");
    };
    assert_eq!(notify.extra["templateId"], "tpl-9");

    let saved = serde_json::to_value(&definition).unwrap();
    assert_eq!(saved[0]["config"]["params"], document[0]["config"]["params"]);
    assert_eq!(saved[0]["config"]["timeoutMs"], 3000);
    assert_eq!(saved[1]["config"]["templateId"], "tpl-9");
    assert_eq!(saved[2]["config"]["filters"], json!({"status": "open", "priority": 2}));
    assert_eq!(WorkflowDefinition::from_value(saved).unwrap(), definition);
}

#[test]
fn test_malformed_config_is_rejected() {
    let err = WorkflowDefinition::from_value(json!([
        {"id": "x", "type": "for_each", "name": "Loop", "config": {"childSteps": "nope"}}
    ]))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidConfig { .. }));
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!("keiro-definition-{}.json", std::process::id()));
    let definition = nested_definition();

    definition.save(&path).unwrap();
    let loaded = WorkflowDefinition::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, definition);
}

#[test]
fn test_missing_file_reports_path() {
    let err = WorkflowDefinition::from_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn test_edit_shares_untouched_subtrees() {
    let original = nested_definition();

    let renamed = original.rename_step("small-order", "Log small order").unwrap();

    assert_eq!(
        renamed.find_step("small-order").unwrap().name,
        "Log small order"
    );
    assert_eq!(original.find_step("small-order").unwrap().name, "Log small-order");
    assert!(Arc::ptr_eq(&original.steps()[0], &renamed.steps()[0]));
    assert!(Arc::ptr_eq(
        original.find_step("big-order").unwrap(),
        renamed.find_step("big-order").unwrap()
    ));
    assert!(!Arc::ptr_eq(&original.steps()[1], &renamed.steps()[1]));
}

#[test]
fn test_append_and_insert_into_slots() {
    let definition = nested_definition()
        .append_step(&StepSlot::Root, log_step("end", "done"))
        .unwrap()
        .insert_step(
            &StepSlot::ForEachBody("each-order".to_string()),
            0,
            log_step("per-order", "order"),
        )
        .unwrap()
        .append_step(
            &StepSlot::ConditionPath {
                router_id: "route".to_string(),
                path_id: "vip".to_string(),
            },
            log_step("vip-done", "vip"),
        )
        .unwrap()
        .append_step(&StepSlot::DefaultPath("route".to_string()), log_step("fallback-2", "x"))
        .unwrap();

    assert_eq!(
        definition.step_ids(),
        vec![
            "start",
            "route",
            "each-order",
            "per-order",
            "inner",
            "big-order",
            "small-order",
            "vip-done",
            "fallback",
            "fallback-2",
            "end",
        ]
    );
}

#[test]
fn test_slot_errors() {
    let definition = nested_definition();

    assert_eq!(
        definition.append_step(&StepSlot::Root, log_step("start", "again")),
        Err(EditError::DuplicateStepId("start".to_string()))
    );
    assert_eq!(
        definition.append_step(&StepSlot::ForEachBody("start".to_string()), log_step("n", "x")),
        Err(EditError::NotAContainer {
            step_id: "start".to_string(),
            type_name: "log_event".to_string()
        })
    );
    assert_eq!(
        definition.append_step(&StepSlot::ForEachBody("ghost".to_string()), log_step("n", "x")),
        Err(EditError::StepNotFound("ghost".to_string()))
    );
    assert_eq!(
        definition.append_step(
            &StepSlot::ConditionPath {
                router_id: "route".to_string(),
                path_id: "nope".to_string()
            },
            log_step("n", "x")
        ),
        Err(EditError::PathNotFound {
            step_id: "route".to_string(),
            path_id: "nope".to_string()
        })
    );
    assert_eq!(
        definition.insert_step(&StepSlot::Root, 9, log_step("n", "x")),
        Err(EditError::IndexOutOfBounds { index: 9, len: 2 })
    );
}

#[test]
fn test_remove_step_drops_subtree() {
    let definition = nested_definition().remove_step("each-order").unwrap();
    assert_eq!(definition.step_ids(), vec!["start", "route", "fallback"]);
    assert_eq!(
        definition.remove_step("each-order"),
        Err(EditError::StepNotFound("each-order".to_string()))
    );
}

#[test]
fn test_change_step_type_replaces_config() {
    let definition = nested_definition()
        .change_step_type("each-order", StepType::Notification)
        .unwrap();
    let step = definition.find_step("each-order").unwrap();

    assert_eq!(step.step_type(), StepType::Notification);
    assert!(step.child_lists().is_empty());
    assert!(definition.find_step("big-order").is_none());
}

#[test]
fn test_update_step_checks_ids() {
    let definition = nested_definition();

    let updated = definition
        .update_step("fallback", |step| log_step(&step.id, "changed"))
        .unwrap();
    assert_eq!(updated.len(), definition.len());

    assert_eq!(
        definition.update_step("fallback", |_| log_step("start", "clash")),
        Err(EditError::DuplicateStepId("start".to_string()))
    );
}

#[test]
fn test_move_step_within_slot() {
    let definition = nested_definition().move_step(&StepSlot::Root, 1, 0).unwrap();
    assert_eq!(definition.steps()[0].id, "route");
    assert_eq!(
        definition.move_step(&StepSlot::Root, 0, 2),
        Err(EditError::IndexOutOfBounds { index: 2, len: 2 })
    );
}

#[test]
fn test_condition_path_edits() {
    let extra = path(
        "gold",
        vec![condition("trigger.tier", Operator::Equals, "gold")],
        vec![log_step("gold-log", "gold")],
    );
    let definition = nested_definition().add_condition_path("route", extra).unwrap();
    let definition = definition.move_condition_path("route", 1, 0).unwrap();

    let StepConfig::ConditionalPaths(config) = &definition.find_step("route").unwrap().config else {
        panic!("route is not a router");
    };
    let ids: Vec<&str> = config.conditions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["gold", "vip"]);

    let definition = definition
        .update_condition_path("route", "gold", |p| {
            let mut p = p.clone();
            p.conditions.push(condition("trigger.region", Operator::In, "eu, us"));
            p
        })
        .unwrap();
    let StepConfig::ConditionalPaths(config) = &definition.find_step("route").unwrap().config else {
        panic!("route is not a router");
    };
    assert_eq!(config.path("gold").unwrap().conditions.len(), 2);

    let definition = definition.remove_condition_path("route", "gold").unwrap();
    assert!(definition.find_step("gold-log").is_none());
    assert_eq!(
        definition.remove_condition_path("start", "gold"),
        Err(EditError::NotAContainer {
            step_id: "start".to_string(),
            type_name: "log_event".to_string()
        })
    );
}

#[test]
fn test_duplicate_path_id_is_rejected() {
    let definition = nested_definition();
    let clash = path("vip", vec![], Vec::<StepNode>::new());
    assert_eq!(
        definition.add_condition_path("route", clash),
        Err(EditError::DuplicatePathId {
            step_id: "route".to_string(),
            path_id: "vip".to_string()
        })
    );
}

#[test]
fn test_new_path_with_repeated_step_ids_is_rejected() {
    let definition = nested_definition();
    let twins = path(
        "gold",
        vec![condition("trigger.tier", Operator::Equals, "gold")],
        vec![log_step("x", "first"), log_step("x", "second")],
    );
    assert_eq!(
        definition.add_condition_path("route", twins),
        Err(EditError::DuplicateStepId("x".to_string()))
    );

    let nested = path(
        "silver",
        vec![condition("trigger.tier", Operator::Equals, "silver")],
        vec![
            log_step("y", "first"),
            for_each("each", "trigger.orders", vec![log_step("y", "again")]),
        ],
    );
    assert_eq!(
        definition.add_condition_path("route", nested),
        Err(EditError::DuplicateStepId("y".to_string()))
    );
}
