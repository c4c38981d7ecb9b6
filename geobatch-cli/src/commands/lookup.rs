//! Lookup command - geocode a single address.

use geobatch::config::{ConfigFile, ProviderCredentials};
use geobatch::provider::GeocodeOutcome;

use super::common::{build_dispatcher, resolve_provider, ProviderArg};
use crate::error::CliError;

/// Run the lookup command.
pub async fn run(address: &str, provider: Option<ProviderArg>, json: bool) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let credentials = ProviderCredentials::resolve(&config);
    let provider = resolve_provider(provider, &config, &credentials)?;
    let dispatcher = build_dispatcher(&config, credentials)?;

    let outcome = dispatcher.resolve(address, provider).await;

    if json {
        let text = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError::Lookup(e.to_string()))?;
        println!("{}", text);
    } else {
        for line in describe(&outcome) {
            println!("{}", line);
        }
    }

    match outcome.error {
        Some(error) => Err(CliError::Lookup(error)),
        None => Ok(()),
    }
}

/// Human readable lines for an outcome.
fn describe(outcome: &GeocodeOutcome) -> Vec<String> {
    match (outcome.latitude, outcome.longitude) {
        (Some(lat), Some(lon)) => {
            let mut lines = vec![
                format!("Latitude:  {}", lat),
                format!("Longitude: {}", lon),
            ];
            if let Some(address) = &outcome.formatted_address {
                lines.push(format!("Address:   {}", address));
            }
            lines
        }
        _ => vec![format!(
            "Status:    {}",
            outcome.error.as_deref().unwrap_or("No coordinates")
        )],
    }
}
