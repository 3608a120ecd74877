use anyhow::Context;

use crate::scenario::Scenario;

pub fn load_scenario_json(path: &str) -> anyhow::Result<Scenario> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read scenario: {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse scenario JSON: {}", path))
}
