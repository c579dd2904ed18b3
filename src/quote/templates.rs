//! Description templates from the product_descriptions table.
//!
//! A template is a plain string with `{{placeholder}}` tokens. Lookup misses
//! return `None` so the caller can fall back to its hardcoded phrasing.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap();
}

/// Template dictionary keyed by template key, e.g. `ah_pump_rbp_250`.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, String>,
}

impl TemplateSet {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// An empty set; every `fill` misses and callers use their fallbacks.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Resolve `key` and substitute its `{{placeholder}}` tokens.
    ///
    /// Each token is resolved against `vars` under the exact identifier first,
    /// then under its camelCase form converted to snake_case. Unresolved
    /// tokens substitute to the empty string. No escaping is performed; the
    /// result is plain text.
    pub fn fill(&self, key: &str, vars: &HashMap<String, String>) -> Option<String> {
        let template = self.templates.get(key)?;
        let filled = TOKEN_RE.replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.get(name)
                .or_else(|| vars.get(&camel_to_snake(name)))
                .cloned()
                .unwrap_or_default()
        });
        Some(filled.into_owned())
    }
}

/// `pumpQty` -> `pump_qty`. Already-snake identifiers pass through unchanged.
fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn set_with(key: &str, template: &str) -> TemplateSet {
        let mut map = HashMap::new();
        map.insert(key.to_string(), template.to_string());
        TemplateSet::new(map)
    }

    #[test]
    fn test_missing_key_returns_none() {
        let set = TemplateSet::empty();
        assert!(set.fill("ah_pump_rbp_250", &HashMap::new()).is_none());
    }

    #[test]
    fn test_substitutes_tokens() {
        let set = set_with("greeting", "Pump {{model}} at {{head}} m");
        let result = set
            .fill("greeting", &vars(&[("model", "RBP-250"), ("head", "12")]))
            .unwrap();
        assert_eq!(result, "Pump RBP-250 at 12 m");
    }

    #[test]
    fn test_camel_case_token_falls_back_to_snake_case_var() {
        let set = set_with("k", "qty is {{pumpQty}}");
        let result = set.fill("k", &vars(&[("pump_qty", "4")])).unwrap();
        assert_eq!(result, "qty is 4");
    }

    #[test]
    fn test_exact_key_wins_over_snake_case() {
        let set = set_with("k", "{{pumpQty}}");
        let result = set
            .fill("k", &vars(&[("pumpQty", "exact"), ("pump_qty", "snake")]))
            .unwrap();
        assert_eq!(result, "exact");
    }

    #[test]
    fn test_missing_variable_substitutes_empty() {
        let set = set_with("k", "before {{gone}} after");
        let result = set.fill("k", &HashMap::new()).unwrap();
        assert_eq!(result, "before  after");
    }

    #[test]
    fn test_whitespace_inside_token_is_tolerated() {
        let set = set_with("k", "{{ model }}");
        let result = set.fill("k", &vars(&[("model", "RBP-300")])).unwrap();
        assert_eq!(result, "RBP-300");
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("pumpQty"), "pump_qty");
        assert_eq!(camel_to_snake("supplyVoltage"), "supply_voltage");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
        assert_eq!(camel_to_snake("Model"), "model");
    }
}
