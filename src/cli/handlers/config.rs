use crate::cli::{args::ConfigAction, global::GlobalArgs};
use chaos_box::Settings;

pub fn handle(
    action: ConfigAction,
    global: &GlobalArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { json } => handle_show(json, settings),
        ConfigAction::Path => handle_path(global),
    }
}

fn handle_show(json: bool, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
    } else {
        print!("{}", settings.to_toml()?);
    }
    Ok(())
}

fn handle_path(global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut layers = Vec::new();
    if let Some(user) = Settings::user_config_path() {
        layers.push(("user", user));
    }
    layers.push(("local", Settings::local_config_path()));
    if let Some(explicit) = &global.config {
        layers.push(("--config", explicit.clone()));
    }

    println!("built-in defaults (embedded)");
    for (label, path) in layers {
        let state = if path.exists() { "found" } else { "missing" };
        println!("{:<9} {} ({})", label, path.display(), state);
    }
    Ok(())
}
