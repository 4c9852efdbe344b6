use anyhow::Context;
use clap::Parser;
use docsearch::cli::{Cli, Commands};
use docsearch::config::SearchConfig;
use docsearch::error::Result;
use docsearch::page::IndexHandle;
use docsearch::render::SearchOutcome;
use docsearch::tracing::LogFormat;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    match path {
        Some(path) => SearchConfig::load(path),
        None => Ok(SearchConfig::default()),
    }
}

async fn build(config: SearchConfig) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read documents from stdin")?;

    let payload = docsearch::store::build_payload(&input, &config)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(payload.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

async fn search(index: &Path, config: SearchConfig, query: &str, html: bool) -> Result<()> {
    let payload = tokio::fs::read_to_string(index)
        .await
        .with_context(|| format!("Failed to read search payload at {}", index.display()))?;

    let context = IndexHandle::spawn(payload, config)
        .ready()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let outcome = context.search(query);
    let mut lines = vec![outcome.status()];
    if html {
        lines.push(outcome.to_html());
    } else if let SearchOutcome::Results(results) = &outcome {
        for result in results {
            lines.push(format!("{:.3}\t{}\t{}", result.score, result.title, result.href));
            if let Some(snippet) = &result.snippet {
                lines.push(format!("\t{}", snippet));
            }
        }
    }

    let mut stdout = tokio::io::stdout();
    stdout.write_all(lines.join("\n").as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    docsearch::tracing::init_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    });

    match cli.command {
        Commands::Build {
            config,
            no_index_docstrings,
        } => {
            let mut config = load_config(config.as_deref())?;
            if no_index_docstrings {
                config = config.with_index_docstrings(false);
            }
            build(config).await.inspect_err(|e| {
                tracing::error!("Index build failed: {:#}", e);
            })
        }
        Commands::Search {
            index,
            config,
            fuzziness,
            html,
            query,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(fuzziness) = fuzziness {
                config = config.with_fuzziness(fuzziness);
            }
            search(&index, config, &query, html).await
        }
    }
}
