use anyhow::Result;
use colored::Colorize;
use fcu_infrastructure::launch::{DiscoveryOptions, ENV_UNITY_LOCATION, discover};

pub fn run(json: bool) -> Result<()> {
    let editors = discover(&DiscoveryOptions::from_env());

    if json {
        println!("{}", serde_json::to_string_pretty(&editors)?);
        return Ok(());
    }

    if editors.is_empty() {
        println!("{}", "No Unity editor found.".yellow());
        println!(
            "Install one through Unity Hub, or point {} at an editor executable.",
            ENV_UNITY_LOCATION
        );
        return Ok(());
    }

    println!("🔍 Found {} Unity editor(s):", editors.len());
    for (index, editor) in editors.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!(
            "  {} {:<14} {}",
            marker.green(),
            editor.version.bold(),
            editor.path.display()
        );
    }
    println!("\n  * used by `fcu launch` when no --version is given");
    Ok(())
}
