use serde_json::Value;
use std::collections::HashMap;

/// Node-type → schema definition lookup, rebuilt on every run.
#[derive(Debug, Clone, Default)]
pub struct AppSchemaMap {
    by_type: HashMap<String, Value>,
}

impl AppSchemaMap {
    /// Later definitions of the same type replace earlier ones. Definitions
    /// without a string `type` are skipped.
    pub fn from_definitions(definitions: Vec<Value>) -> Self {
        let mut by_type = HashMap::with_capacity(definitions.len());
        for def in definitions {
            match def.get("type").and_then(Value::as_str) {
                Some(t) => {
                    by_type.insert(t.to_string(), def);
                }
                None => tracing::warn!(
                    target: "sessionctl.session",
                    stage = "session.schema",
                    "skipping app schema definition without a type"
                ),
            }
        }
        Self { by_type }
    }

    pub fn get(&self, node_type: &str) -> Option<&Value> {
        self.by_type.get(node_type)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_by_type() {
        let map = AppSchemaMap::from_definitions(vec![
            json!({ "type": "Time Frame", "editors": { "config": true } }),
            json!({ "type": "Slippage" }),
            json!({ "name": "untyped" }),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Time Frame").unwrap()["editors"]["config"], true);
        assert!(map.get("Fee Structure").is_none());
    }

    #[test]
    fn test_last_definition_wins() {
        let map = AppSchemaMap::from_definitions(vec![
            json!({ "type": "Slippage", "v": 1 }),
            json!({ "type": "Slippage", "v": 2 }),
        ]);
        assert_eq!(map.get("Slippage").unwrap()["v"], 2);
    }
}
