#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::{json, Value};

use execution_resumer::models::Task;
use execution_resumer::TaskStatus;

/// Status of a task the resumer may still move forward
pub fn open_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![Just(TaskStatus::Pending), Just(TaskStatus::Running)]
}

pub fn task_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::Running),
        Just(TaskStatus::Completed),
    ]
}

/// Non-null JSON values a job may complete a task with
pub fn output_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| json!(m)),
        ]
    })
}

pub fn task_strategy(status: impl Strategy<Value = TaskStatus>) -> impl Strategy<Value = Task> {
    ("[a-z0-9]{4,12}", any::<bool>(), status).prop_map(|(id, noop, status)| Task {
        id: format!("task_{id}"),
        execution_id: "exec_1".to_string(),
        name: id.clone(),
        idempotency_key: id,
        parent_id: None,
        status,
        noop,
        output: None,
        started_at: None,
        completed_at: None,
        delay_until: None,
    })
}
