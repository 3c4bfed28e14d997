use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "BRIDGE_HOST",
        "BRIDGE_PORT",
        "BRIDGE_DATABASE_URL",
        "BRIDGE_SPLYNX_URL",
        "BRIDGE_UISP_URL",
        "BRIDGE_MIRROR_URL",
        "BRIDGE_ENFORCE_WEBHOOK_SIGNATURES",
        "BRIDGE_USE_X_FORWARDED_FOR",
        "BRIDGE_USE_FORWARDED",
        "BRIDGE_MAX_RETRIES",
        "BRIDGE_RETRY_INITIAL_DELAY_MS",
        "BRIDGE_RETRY_MAX_DELAY_MS",
        "BRIDGE_RETRY_MULTIPLIER",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
