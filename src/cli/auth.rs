//! `auth` and `deauth`: store or remove a provider's API key.

use std::error::Error;

use crate::cli::context::{lookup_provider, AppContext};
use crate::cli::prompt::{confirm, parse_provider_selection, read_line, MenuSelection, UiError};
use crate::core::builtin_providers::{builtin_providers, ProviderProfile};
use crate::core::credentials::CredentialStore;

pub fn run_auth(context: &AppContext, provider: Option<String>) -> Result<(), Box<dyn Error>> {
    let credentials = context.credentials();
    let profile = match provider {
        Some(id) => lookup_provider(&id)?,
        None => {
            println!("🔐 Chitchat Authentication Setup");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!();
            let candidates: Vec<&'static ProviderProfile> = builtin_providers().iter().collect();
            match prompt_provider_menu(&candidates, credentials, "Select a provider")? {
                Some(profile) => profile,
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    println!();
    println!("Selected provider: {}", profile.display_name);
    if let Some(url) = &profile.key_url {
        println!("Get a key at: {url}");
    }
    let secret = read_line("Enter your API key: ")?;
    if secret.trim().is_empty() {
        return Err(UiError::new("API key cannot be empty").into());
    }
    if !credentials.set_credential(&profile.id, &secret) {
        return Err(format!("Failed to store the key for {}", profile.display_name).into());
    }

    println!("✓ Key stored for {}", profile.display_name);
    Ok(())
}

pub fn run_deauth(context: &AppContext, provider: Option<String>) -> Result<(), Box<dyn Error>> {
    let credentials = context.credentials();
    let profile = match provider {
        Some(id) => lookup_provider(&id)?,
        None => {
            println!("🗑️  Chitchat Authentication Removal");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!();
            let configured = configured_providers(credentials);
            if configured.is_empty() {
                println!("No configured providers found.");
                return Ok(());
            }
            match prompt_provider_menu(&configured, credentials, "Select a provider to remove")? {
                Some(profile) => profile,
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    if !credentials.has_credential(&profile.id) {
        println!("No key stored for {}.", profile.display_name);
        return Ok(());
    }

    let question = format!(
        "Are you sure you want to remove the key for {}?",
        profile.display_name
    );
    if !confirm(&question)? {
        println!("Cancelled.");
        return Ok(());
    }

    if !credentials.remove_credential(&profile.id) {
        return Err(format!("Failed to remove the key for {}", profile.display_name).into());
    }
    println!("✅ Key removed for {}", profile.display_name);
    Ok(())
}

pub fn configured_providers(credentials: &CredentialStore) -> Vec<&'static ProviderProfile> {
    builtin_providers()
        .iter()
        .filter(|profile| credentials.has_credential(&profile.id))
        .collect()
}

fn prompt_provider_menu(
    providers: &[&'static ProviderProfile],
    credentials: &CredentialStore,
    prompt: &str,
) -> Result<Option<&'static ProviderProfile>, UiError> {
    println!("Providers:");
    for (index, profile) in providers.iter().enumerate() {
        let status = if credentials.has_credential(&profile.id) {
            "✓ configured"
        } else {
            "not configured"
        };
        println!(
            "  {}. {} ({}) - {}",
            index + 1,
            profile.display_name,
            profile.id,
            status
        );
    }
    println!("  {}. Cancel", providers.len() + 1);
    println!();

    let input = read_line(&format!("{prompt} (1-{}): ", providers.len() + 1))?;
    let ids: Vec<&str> = providers.iter().map(|profile| profile.id.as_str()).collect();
    match parse_provider_selection(&input, &ids)? {
        MenuSelection::Provider(index) => Ok(Some(providers[index])),
        MenuSelection::Cancel => Ok(None),
    }
}
