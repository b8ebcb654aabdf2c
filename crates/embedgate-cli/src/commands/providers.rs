//! Providers command - List supported embedding providers

use anyhow::Result;
use clap::Args;
use embedgate_embed::ProviderKind;
use serde::Serialize;

use crate::GlobalOptions;

/// Arguments for the providers command
#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// One row of the provider listing
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    /// Canonical identifier
    pub id: &'static str,
    /// Accepted alternative spellings
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
    /// Whether an API key is sent
    pub requires_api_key: bool,
}

impl From<ProviderKind> for ProviderInfo {
    fn from(kind: ProviderKind) -> Self {
        Self {
            id: kind.id(),
            aliases: kind.aliases(),
            description: kind.description(),
            requires_api_key: kind.requires_api_key(),
        }
    }
}

/// Execute the providers command
pub async fn execute(args: ProvidersArgs, _global: GlobalOptions) -> Result<()> {
    let providers: Vec<ProviderInfo> = ProviderKind::ALL.into_iter().map(Into::into).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!("Supported Providers");
    println!("===================\n");
    for info in &providers {
        let key = if info.requires_api_key { "" } else { " (no key)" };
        println!("{:<14} {}{}", info.id, info.description, key);
        if !info.aliases.is_empty() {
            println!("{:<14} aliases: {}", "", info.aliases.join(", "));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_info_serializes() {
        let info = ProviderInfo::from(ProviderKind::AzureOpenAi);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "azure openai");
        assert_eq!(json["requires_api_key"], true);
        assert!(json["aliases"]
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a == "azure"));
    }
}
