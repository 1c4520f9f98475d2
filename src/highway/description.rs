// src/highway/description.rs

use serde::{Deserialize, Serialize};

/// Name and usage of one registered highway.
///
/// Serialized field order is `name`, `usage`; outer tooling reads the JSON
/// list to discover the tasks of a project without running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighwayDescription {
    pub name: String,
    pub usage: Option<String>,
}

impl HighwayDescription {
    pub fn new(name: impl Into<String>, usage: Option<String>) -> Self {
        Self {
            name: name.into(),
            usage,
        }
    }
}

pub fn to_json(descriptions: &[HighwayDescription]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(descriptions)
}

pub fn from_json(raw: &str) -> serde_json::Result<Vec<HighwayDescription>> {
    serde_json::from_str(raw)
}

/// Help text listing every highway in registration order.
pub fn render_help(program: &str, descriptions: &[HighwayDescription]) -> String {
    let mut out = String::new();
    for description in descriptions {
        let usage = description
            .usage
            .as_deref()
            .unwrap_or("No usage text provided.");
        out.push_str(&format!("     - {usage}:\n"));
        out.push_str(&format!("         {program} {}\n\n", description.name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_order_and_fields() {
        let descriptions = vec![
            HighwayDescription::new("test", Some("Runs tests".to_string())),
            HighwayDescription::new("build", None),
        ];
        let json = to_json(&descriptions).unwrap();

        let name_at = json.find("\"name\"").unwrap();
        let usage_at = json.find("\"usage\"").unwrap();
        assert!(name_at < usage_at);
        assert!(json.find("\"test\"").unwrap() < json.find("\"build\"").unwrap());
        assert!(json.contains("\"usage\": null"));

        assert_eq!(from_json(&json).unwrap(), descriptions);
    }

    #[test]
    fn help_falls_back_for_missing_usage() {
        let help = render_help(
            "highway",
            &[HighwayDescription::new("clean", None)],
        );
        assert!(help.contains("No usage text provided.:"));
        assert!(help.contains("highway clean"));
    }
}
