//! Init command - initialize configuration file.

use std::io::{self, BufRead, Write};

use geobatch::config::{config_file_path, ConfigFile};
use geobatch::provider::ProviderId;

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;

    println!("Geocoding provider access tokens");
    println!("Press Enter to keep the current value or skip.");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    for id in ProviderId::ALL {
        let current = token_slot(&mut config, id);
        let hint = if current.is_some() { " [set]" } else { "" };
        let question = format!("{} access token{}: ", id.display_name(), hint);
        let Some(answer) = prompt(&mut input, &question) else {
            break;
        };
        if !answer.is_empty() {
            *current = Some(answer);
        }
    }

    if config.providers.default.is_none() {
        let first_configured = ProviderId::ALL
            .into_iter()
            .find(|id| token_slot(&mut config, *id).is_some());
        config.providers.default = first_configured;
    }

    config.save()?;

    println!();
    println!("Configuration file: {}", config_file_path().display());
    println!();
    println!("Edit this file to customize pacing, timeouts and cache size.");
    println!("Environment variables override tokens stored in the file.");
    Ok(())
}

fn token_slot(config: &mut ConfigFile, id: ProviderId) -> &mut Option<String> {
    match id {
        ProviderId::Mapbox => &mut config.providers.mapbox_access_token,
        ProviderId::LocationIq => &mut config.providers.locationiq_access_token,
    }
}

/// Prints `question` and reads one trimmed line. `None` on EOF or error.
fn prompt<R: BufRead>(input: &mut R, question: &str) -> Option<String> {
    print!("{}", question);
    io::stdout().flush().ok();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}
