//! Embed command - Turn texts into vectors with the active provider

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use clap::Args;
use embedgate_embed::create;
use tracing::info;

use super::{load_config, to_provider_config};
use crate::GlobalOptions;

/// Arguments for the embed command
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Texts to embed, in order
    texts: Vec<String>,

    /// Read additional texts from stdin, one per line
    #[arg(long)]
    stdin: bool,

    /// Print the vectors as a JSON array
    #[arg(long)]
    json: bool,
}

/// Execute the embed command
pub async fn execute(args: EmbedArgs, global: GlobalOptions) -> Result<()> {
    let mut texts = args.texts;
    if args.stdin {
        texts.extend(read_lines(std::io::stdin().lock())?);
    }
    if texts.is_empty() {
        bail!("No input texts. Pass TEXT arguments or use --stdin");
    }

    let config = load_config(&global)?;
    let provider_config = to_provider_config(&config)?;
    let adapter = create(&provider_config).with_context(|| {
        format!(
            "Failed to create adapter for provider '{}'",
            provider_config.provider
        )
    })?;

    info!(provider = %adapter.provider(), count = texts.len(), "Embedding texts");
    let vectors = adapter.embed_many(&texts).await;

    if args.json {
        println!("{}", serde_json::to_string(&vectors)?);
    } else {
        for (index, vector) in vectors.iter().enumerate() {
            println!("{}", describe(index, vector));
        }
    }

    Ok(())
}

/// Non-empty lines from a reader
fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read stdin")?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn describe(index: usize, vector: &[f32]) -> String {
    if vector.is_empty() {
        format!("[{}] empty", index)
    } else {
        format!("[{}] {} dims", index, vector.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_skips_blank() {
        let input = "first\n\n  \nsecond\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(0, &[0.1, 0.2]), "[0] 2 dims");
        assert_eq!(describe(3, &[]), "[3] empty");
    }
}
