use std::error::Error;

use crate::cli::context::{lookup_provider, AppContext};
use crate::core::builtin_providers::builtin_providers;
use crate::core::credentials::CredentialStore;

pub fn list_providers(context: &AppContext) -> Result<(), Box<dyn Error>> {
    let selected = context
        .settings(&Default::default())?
        .selected_provider;
    print!("{}", render_provider_table(context.credentials(), &selected));
    Ok(())
}

pub fn select_provider(context: &AppContext, provider: &str) -> Result<(), Box<dyn Error>> {
    let profile = lookup_provider(provider)?;
    if !context.credentials().set_selected_provider(&profile.id) {
        return Err(format!("Failed to save the selection of {}", profile.display_name).into());
    }
    println!("✅ Selected provider: {} ({})", profile.display_name, profile.id);
    if profile.requires_auth && !context.credentials().has_credential(&profile.id) {
        println!("No API key stored yet. Run 'chitchat auth {}'.", profile.id);
    }
    Ok(())
}

pub fn render_provider_table(credentials: &CredentialStore, selected: &str) -> String {
    let rows: Vec<[String; 4]> = builtin_providers()
        .iter()
        .map(|profile| {
            let id = if profile.id.eq_ignore_ascii_case(selected) {
                format!("{}*", profile.id)
            } else {
                profile.id.clone()
            };
            let auth = if !profile.requires_auth {
                "n/a"
            } else if credentials.has_credential(&profile.id) {
                "yes"
            } else {
                "no"
            };
            [
                id,
                profile.display_name.clone(),
                profile.model.clone(),
                auth.to_string(),
            ]
        })
        .collect();

    let header = ["Provider", "Display Name", "Model", "Key"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("Providers:\n\n");
    push_row(&mut out, &header.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str("\n* = selected provider\n");
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str("  ");
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
