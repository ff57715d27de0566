use std::collections::HashMap;
use anyhow::{anyhow, Result};

use crate::config::AppConfig;
use crate::model::trunk::{PaymentStatus, TrunkFilter};

const TRUNK_FILTER_KEYS: [&str; 2] = ["dispatched", "status"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub terms: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// Splits command arguments into plain terms and `key:value` pairs.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut terms = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                metadata.insert(key.to_string(), value.to_string());
                continue;
            }
        }
        terms.push(arg.clone());
    }

    ParsedInput { terms, metadata }
}

/// Expands `key` to the single candidate it equals or prefixes.
pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Resolves user-typed metric names: config aliases first, then prefixes of
/// the metrics the dataset is known to carry. With no known metrics the names
/// are taken as given.
pub fn resolve_metrics(names: &[String], known: &[String], config: &AppConfig) -> Result<Vec<String>> {
    let candidates: Vec<&str> = known.iter().map(String::as_str).collect();
    names
        .iter()
        .map(|name| {
            let name = config.resolve_metric(name);
            if candidates.is_empty() {
                Ok(name.to_string())
            } else {
                expand_key(name, &candidates)
            }
        })
        .collect()
}

/// Builds a trunk filter from `dispatched:yes status:partial` style arguments.
pub fn parse_trunk_filter(args: &[String]) -> Result<TrunkFilter> {
    let parsed = parse_args(args);
    if let Some(term) = parsed.terms.first() {
        return Err(anyhow!("Unexpected argument: '{}'", term));
    }

    let mut filter = TrunkFilter::default();
    for (key, value) in parsed.metadata {
        match expand_key(&key, &TRUNK_FILTER_KEYS)?.as_str() {
            "dispatched" => {
                filter.dispatched = match value.to_lowercase().as_str() {
                    "all" => None,
                    "yes" | "y" | "true" | "dispatched" => Some(true),
                    "no" | "n" | "false" => Some(false),
                    _ => return Err(anyhow!("Invalid dispatched value: '{}'", value)),
                };
            }
            _ => {
                filter.status = if value.eq_ignore_ascii_case("all") {
                    None
                } else {
                    Some(value.parse::<PaymentStatus>().map_err(|e| anyhow!(e))?)
                };
            }
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&strings(&["week", "status:partial", "dispatched:no"]));
        assert_eq!(parsed.terms, vec!["week"]);
        assert_eq!(parsed.metadata.get("status"), Some(&"partial".to_string()));
        assert_eq!(parsed.metadata.get("dispatched"), Some(&"no".to_string()));
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["presentShifts", "absentShifts", "salary", "stitchedCount"];

        assert_eq!(expand_key("pres", &candidates).unwrap(), "presentShifts");
        assert_eq!(expand_key("salary", &candidates).unwrap(), "salary");
        assert_eq!(expand_key("sti", &candidates).unwrap(), "stitchedCount");

        // Ambiguous
        assert!(expand_key("s", &candidates).is_err());

        // Unknown
        assert!(expand_key("x", &candidates).is_err());
    }

    #[test]
    fn test_resolve_metrics() {
        let cfg = AppConfig::default();
        let known = strings(&["presentShifts", "absentShifts"]);

        let resolved = resolve_metrics(&strings(&["abs", "present"]), &known, &cfg).unwrap();
        assert_eq!(resolved, vec!["absentShifts", "presentShifts"]);

        assert!(resolve_metrics(&strings(&["salary"]), &known, &cfg).is_err());

        // Free-form datasets accept any name
        let free = resolve_metrics(&strings(&["overtime"]), &[], &cfg).unwrap();
        assert_eq!(free, vec!["overtime"]);
    }

    #[test]
    fn test_parse_trunk_filter() {
        let filter = parse_trunk_filter(&strings(&["disp:yes", "st:partial"])).unwrap();
        assert_eq!(filter.dispatched, Some(true));
        assert_eq!(filter.status, Some(PaymentStatus::Partial));

        let all = parse_trunk_filter(&strings(&["dispatched:all", "status:all"])).unwrap();
        assert_eq!(all, TrunkFilter::default());

        assert!(parse_trunk_filter(&strings(&["dispatched:maybe"])).is_err());
        assert!(parse_trunk_filter(&strings(&["colour:red"])).is_err());
        assert!(parse_trunk_filter(&strings(&["loose"])).is_err());
    }
}
