//! Shared test objects and helpers

use flowquery::{OperationRegistry, Query};
use serde_json::{json, Value};
use std::sync::Arc;

/// Install a test subscriber once; `RUST_LOG=flowquery=trace` shows evaluation
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Registry with the built-in operations
pub fn registry() -> Arc<OperationRegistry<Value>> {
    init_tracing();
    Arc::new(OperationRegistry::with_builtins().expect("built-in operations register"))
}

pub fn query(objects: Vec<Value>) -> Query<Value> {
    registry().new_query(objects).expect("query over a vec")
}

/// Plain objects used by the filter cases, addressed 1-based
#[allow(dead_code)]
pub fn sample_objects() -> Vec<Value> {
    vec![
        json!({"__type": "stdClass", "myProperty": "asdf", "myProperty2": "asdf"}),
        json!({"__type": "stdClass", "__identity": "object-identifier-A1-B2"}),
        json!({"__type": "stdClass", "myProperty": "aaa"}),
        json!({"__type": "stdClass", "name": "Robert"}),
        json!({"__type": "stdClass", "isHidden": true}),
        json!({"__type": "stdClass", "aNumber": 42}),
        json!({"__type": "stdClass", "aNumber": 142}),
        json!({"__type": "stdClass", "resource": {"fileExtension": "pdf"}}),
    ]
}

/// Pick sample objects by 1-based number
#[allow(dead_code)]
pub fn objects(numbers: &[usize]) -> Vec<Value> {
    let all = sample_objects();
    numbers.iter().map(|n| all[n - 1].clone()).collect()
}

#[allow(dead_code)]
pub fn address(street: &str, city: &str, country: &str) -> Value {
    json!({"street": street, "city": city, "country": country})
}

/// Four people, the last without an address
#[allow(dead_code)]
pub fn people() -> Vec<Value> {
    vec![
        json!({
            "name": "Kasper Skaarhoj",
            "address": address("SomeCopenhagenStreet", "Kopenhagen", "Denmark"),
        }),
        json!({
            "name": "Robert Lemke",
            "address": address("SomeLübeckStreet", "Lübeck", "Germany"),
        }),
        json!({
            "name": "Sebastian Kurfuerst",
            "address": address("SomeDresdenStreet", "Dresden", "Germany"),
        }),
        json!({"name": "Somebody without address"}),
    ]
}
