use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tinify_shrink::cli::{Args, Commands};
use tinify_shrink::constants::{
    API_KEY_ENV_VAR, EXIT_REMOTE_STATUS, LINK_PREFIX, SAVE_PREFIX, SUCCESS_PREFIX,
};
use tinify_shrink::logger::init_logging;
use tinify_shrink::utils::create_progress_spinner;
use tinify_shrink::{
    compress_batch, download_compressed, read_url_list, render_batch_table,
    render_compression_report, render_file_report, validation::token_domain,
    CompressionOrchestrator, CompressionRequest, EnvTokenProvider, FileCompressionRequest,
    FileCompressor, NullSink, Preview, ReportSink, ShrinkConfig, ShrinkError,
    StaticTokenProvider, StdoutSink, TokenProvider,
};
use tinify_shrink::{error_user, status, warn_user};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error_user!("{:#}", e);
            exit_code_for(&e)
        }
    }
}

/// Errors carrying a remote HTTP status exit with `EXIT_REMOTE_STATUS`, all others with 1.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    let status = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ShrinkError>())
        .and_then(ShrinkError::status);

    match status {
        Some(status) => {
            tracing::debug!(status, "remote service failure");
            ExitCode::from(EXIT_REMOTE_STATUS)
        }
        None => ExitCode::FAILURE,
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = ShrinkConfig::new(args.endpoint.as_deref())?;
    let tokens: Arc<dyn TokenProvider> = match args.token {
        Some(token) => Arc::new(StaticTokenProvider::new(token)),
        None => Arc::new(EnvTokenProvider::default()),
    };
    let quiet = args.quiet;

    match args.command {
        Commands::Compress {
            image_url,
            output,
            json,
        } => {
            let orchestrator =
                CompressionOrchestrator::new(config, tokens, Arc::new(NullSink))?;

            let pb = spinner(!quiet && !json, "Compressing image...");
            let result = orchestrator
                .compress(&CompressionRequest::new(image_url.clone()))
                .await;
            finish(pb);
            let result = result.with_context(|| format!("Failed to compress {}", image_url))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if quiet {
                println!("{}", result.compressed_image_url);
            } else {
                status!("{} Compression complete", SUCCESS_PREFIX);
                status!("{} Compressed image URL: {}", LINK_PREFIX, result.compressed_image_url);
            }

            warn_if_empty(&result.compressed_image_url);
            if let Some(output) = output {
                save(&orchestrator, &result.compressed_image_url, &output).await?;
            }
        }

        Commands::Stats {
            image_url,
            output,
            json,
        } => {
            let orchestrator =
                CompressionOrchestrator::new(config, tokens, Arc::new(NullSink))?;

            let pb = spinner(!quiet && !json, "Compressing image and probing sizes...");
            let result = orchestrator
                .compress_with_stats(&CompressionRequest::new(image_url.clone()))
                .await;
            finish(pb);
            let result = result.with_context(|| format!("Failed to compress {}", image_url))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                StdoutSink.preview(&Preview::Markdown(render_compression_report(&result)));
            }

            warn_if_empty(&result.compressed_image_url);
            if let Some(output) = output {
                save(&orchestrator, &result.compressed_image_url, &output).await?;
            }
        }

        Commands::Batch { mut urls, from, json } => {
            if let Some(path) = from {
                let listed = read_url_list(&path)
                    .with_context(|| format!("Failed to read URL list {}", path.display()))?;
                urls.extend(listed);
            }

            let orchestrator = CompressionOrchestrator::new(config, tokens, Arc::new(NullSink))?;

            let pb = spinner(!quiet && !json, &format!("Compressing {} images...", urls.len()));
            let summary = compress_batch(&orchestrator, &urls, &NullSink).await;
            finish(pb);
            let summary = summary?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                if !summary.entries.is_empty() {
                    StdoutSink.preview(&Preview::Markdown(render_batch_table(&summary)));
                }
                status!(
                    "{} {} of {} images compressed",
                    SUCCESS_PREFIX,
                    summary.entries.len(),
                    urls.len()
                );
            }

            for (url, reason) in &summary.failures {
                error_user!("{}: {}", url, reason);
            }

            if summary.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::CompressFile {
            input,
            output,
            api_base,
            api_key,
            json,
        } => {
            let keys: Arc<dyn TokenProvider> = match api_key {
                Some(key) => Arc::new(StaticTokenProvider::new(key)),
                None => Arc::new(EnvTokenProvider::new(API_KEY_ENV_VAR)),
            };
            let compressor = FileCompressor::new(&api_base, keys, Arc::new(NullSink))?;

            let pb = spinner(!quiet && !json, "Uploading and compressing image...");
            let result = compressor
                .compress_file(&FileCompressionRequest::new(input.clone(), output))
                .await;
            finish(pb);
            let result =
                result.with_context(|| format!("Failed to compress {}", input.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                StdoutSink.preview(&Preview::Markdown(render_file_report(&result)));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn save(orchestrator: &CompressionOrchestrator, url: &str, output: &Path) -> Result<()> {
    let domain = token_domain(&orchestrator.config().endpoint);
    let token = orchestrator.token_provider().fetch_token(&domain).await?;

    let path = download_compressed(
        orchestrator.client(),
        url,
        &token,
        output,
        orchestrator.config().download_timeout,
    )
    .await
    .with_context(|| format!("Failed to save compressed image to {}", output.display()))?;

    status!("{} Saved to {}", SAVE_PREFIX, path.display());
    Ok(())
}

fn warn_if_empty(url: &str) {
    if url.is_empty() {
        warn_user!("The service response did not include a compressed image URL");
    }
}

fn spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    enabled.then(|| create_progress_spinner(message))
}

fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}
