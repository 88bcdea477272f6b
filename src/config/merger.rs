//! Deep merge of YAML manifest values.
//!
//! `depprobe.local.yml` is layered over `depprobe.yml` with these rules:
//!
//! - Mappings are merged recursively, keeping the base key order
//! - Sequences are replaced entirely (not merged)
//! - Null values in the overlay delete the key from the base
//! - Scalars in the overlay replace scalars in the base
//!
//! A local file can therefore drop a capability with `sqlite3: ~`; adding
//! one needs an explicit mapping such as `sqlite3: {}`.

use serde_yaml::Value;

/// Deep merge two YAML values. `overlay` wins at the point of conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge several manifests in order (later overrides earlier).
pub fn merge_manifests(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn overlay_replaces_nested_scalar() {
        let base = yaml(
            r#"
capabilities:
  openssl:
    min_version: "1.0.2"
    path: /usr
"#,
        );
        let overlay = yaml(
            r#"
capabilities:
  openssl:
    path: /opt/local
"#,
        );

        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["capabilities"]["openssl"]["path"], "/opt/local");
        assert_eq!(merged["capabilities"]["openssl"]["min_version"], "1.0.2");
    }

    #[test]
    fn null_overlay_removes_key() {
        let base = yaml("capabilities:\n  openssl: {}\n  sqlite3: {}\n");
        let overlay = yaml("capabilities:\n  sqlite3: ~\n");

        let merged = deep_merge(&base, &overlay);
        let caps = merged["capabilities"].as_mapping().unwrap();
        assert_eq!(caps.len(), 1);
        assert!(caps.contains_key("openssl"));
    }

    #[test]
    fn base_key_order_is_kept() {
        let base = yaml("capabilities:\n  sqlite3: {}\n  openssl: {}\n");
        let overlay = yaml("capabilities:\n  openssl: {mandatory: false}\n  libxml2: {}\n");

        let merged = deep_merge(&base, &overlay);
        let keys: Vec<&str> = merged["capabilities"]
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["sqlite3", "openssl", "libxml2"]);
    }

    #[test]
    fn sequences_are_replaced() {
        let base = yaml("features:\n  - define: A\n  - define: B\n");
        let overlay = yaml("features:\n  - define: C\n");

        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["features"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn merge_manifests_applies_layers_in_order() {
        let layers = vec![yaml("project: base"), yaml("project: local")];
        assert_eq!(merge_manifests(&layers)["project"], "local");
    }
}
