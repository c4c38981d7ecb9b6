//! Providers command - list geocoding providers and their configuration.

use geobatch::config::{ConfigFile, ProviderCredentials};
use geobatch::provider::ProviderId;

use crate::error::CliError;

/// Run the providers command.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let credentials = ProviderCredentials::resolve(&config);
    let policy = config.rate_policy();

    println!("Geocoding Providers");
    println!("===================");
    println!();

    for id in ProviderId::ALL {
        let marker = if config.providers.default == Some(id) {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", id.display_name(), marker);
        println!("  id:      {}", id);
        println!("  status:  {}", status_line(id, &config, &credentials));
        println!("  pacing:  {} ms", policy.request_delay(id).as_millis());
        println!();
    }

    let available = credentials.available();
    if available.is_empty() {
        println!("No providers configured. Run 'geobatch init' or set an access token.");
    }

    Ok(())
}

/// Describes where a provider's credential comes from.
fn status_line(id: ProviderId, config: &ConfigFile, credentials: &ProviderCredentials) -> String {
    if !credentials.is_configured(id) {
        return format!("not configured (set {})", id.credential_env_var());
    }

    let in_file = match id {
        ProviderId::Mapbox => config.providers.mapbox_access_token.as_deref(),
        ProviderId::LocationIq => config.providers.locationiq_access_token.as_deref(),
    };
    if in_file.is_some() && in_file == credentials.get(id) {
        "configured (config file)".to_string()
    } else {
        "configured (environment)".to_string()
    }
}
