use serde_yaml_ng::Value;

/// Deep-merge `overrides` into `base`, in place.
///
/// Recurses only where both sides hold a mapping; every other collision is
/// resolved by replacing the base value with the override value. Sequences
/// and scalars are replaced wholesale, never merged element-wise.
///
/// # Arguments
/// * `base` - The value updated in place
/// * `overrides` - The value whose entries win on conflict
pub fn deep_merge(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Mapping(base_map), Value::Mapping(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => {
                        base_map.insert(key.clone(), override_value.clone());
                    }
                }
            }
        }
        (base, _) => *base = overrides.clone(),
    }
}
