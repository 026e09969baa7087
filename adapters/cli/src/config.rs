use std::{fs, path::Path};

use anyhow::{Context, Result};
use lane_defence_core::Rules;

/// Loads rules from the TOML file at `path`, or the defaults when absent.
///
/// Fields missing from the file keep their default values.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file at {}", path.display()))?;
    parse_rules(&contents).with_context(|| format!("invalid rules file at {}", path.display()))
}

fn parse_rules(contents: &str) -> Result<Rules> {
    let rules: Rules = toml::from_str(contents).context("failed to parse rules toml contents")?;
    rules.validate()?;
    Ok(rules)
}
