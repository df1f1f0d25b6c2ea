use anyhow::Result;
use fcu_core::config::ClientConfig;
use fcu_infrastructure::launch::build_environment;
use std::collections::BTreeMap;

use super::launch::{TargetArgs, launch_settings};

/// Prints the variables the launch would add or change, `KEY=VALUE` per line.
pub fn run(target: &TargetArgs, config: &ClientConfig) -> Result<()> {
    let current: BTreeMap<String, String> = std::env::vars().collect();
    let env = build_environment(
        current.clone(),
        &launch_settings(target, config),
        target.to_launch_target().as_ref(),
    )?;

    for (key, value) in changed(&current, &env) {
        println!("{}={}", key, value);
    }
    for key in current.keys().filter(|k| !env.contains_key(*k)) {
        println!("# unset {}", key);
    }
    Ok(())
}

fn changed<'a>(
    before: &BTreeMap<String, String>,
    after: &'a BTreeMap<String, String>,
) -> Vec<(&'a String, &'a String)> {
    after
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .collect()
}
