//! Fetch command - resolve one request through the worker

use crate::cli::args::FetchArgs;
use crate::cli::create_worker;
use crate::config::Config;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::manifest::Origin;
use crate::network::Request;
use crate::ui::{self, UiContext};
use crate::worker::{FetchOutcome, LifecycleHandler};
use std::io::Write;
use tokio::fs;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let worker = create_worker(config).await?;
    let url = absolute_url(worker.origin(), &args.url);
    let request = Request::get(url.clone()).with_method(args.method.to_uppercase());

    let (response, source) = match worker.on_fetch(&request).await? {
        FetchOutcome::Passthrough => {
            ui::step_info(
                &ctx,
                &format!(
                    "{} {} is not managed by the cache (passthrough)",
                    request.method, url
                ),
            );
            return Ok(());
        }
        FetchOutcome::Respond { response, source } => (response, source),
    };

    match args.output {
        Some(path) => {
            fs::write(&path, &response.body)
                .await
                .map_err(|e| ShellCacheError::io(format!("writing {}", path.display()), e))?;
            ui::step_ok_detail(
                &ctx,
                &format!("{} {} ({} bytes)", response.status, url, response.body.len()),
                &format!("from {}, saved to {}", source, path.display()),
            );
        }
        None => {
            ui::key_value(&ctx, "Status", &response.status.to_string());
            ui::key_value(&ctx, "Source", &source.to_string());
            if let Some(content_type) = response.header("content-type") {
                ui::key_value(&ctx, "Content-Type", content_type);
            }
            ui::key_value(&ctx, "Length", &response.body.len().to_string());
            println!();
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| ShellCacheError::io("writing response body", e))?;
        }
    }

    Ok(())
}

/// Join a bare path onto the origin; absolute URLs pass through untouched
fn absolute_url(origin: &Origin, target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else if target.starts_with('/') {
        format!("{}{}", origin, target)
    } else {
        format!("{}/{}", origin, target)
    }
}
