//! Status command - report cache coverage of the current manifest

use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::create_worker;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{CacheReport, PersistedManifest};

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> ShellCacheResult<()> {
    let worker = create_worker(config).await?;
    let report = worker.report().await?;

    match args.format {
        OutputFormat::Table => print_table(&UiContext::detect(), &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print_plain(&report),
    }

    Ok(())
}

fn print_table(ctx: &UiContext, report: &CacheReport) {
    ui::section(ctx, "Offline cache");
    ui::key_value(ctx, "Origin", &report.origin);
    ui::key_value(
        ctx,
        "Cached",
        &format!("{}/{}", report.cached.len(), report.total()),
    );
    ui::key_value(ctx, "Staged", &report.staged.to_string());
    ui::key_value(ctx, "Manifest", &manifest_label(report.manifest));

    match report.manifest {
        PersistedManifest::Missing if report.staged > 0 => ui::step_warn_hint(
            ctx,
            "Shell installed but not activated",
            "Run `shellcache activate`",
        ),
        PersistedManifest::Missing => {
            ui::step_warn_hint(ctx, "Nothing installed yet", "Run `shellcache install`")
        }
        PersistedManifest::Outdated { .. } => ui::step_warn_hint(
            ctx,
            "Caches reflect an earlier deploy",
            "Run `shellcache install` then `shellcache activate`",
        ),
        PersistedManifest::Corrupt => ui::step_warn_hint(
            ctx,
            "Persisted manifest is unreadable",
            "Run `shellcache activate` to reset the caches",
        ),
        PersistedManifest::Current => {}
    }

    if !report.missing.is_empty() {
        println!();
        ui::section(ctx, "Missing");
        for key in &report.missing {
            ui::step_info(ctx, key);
        }
    }

    if !report.orphaned.is_empty() {
        println!();
        ui::section(ctx, "Orphaned");
        for url in &report.orphaned {
            ui::step_warn(ctx, url);
        }
    }
}

fn print_plain(report: &CacheReport) {
    for key in &report.cached {
        println!("cached {}", key);
    }
    for key in &report.missing {
        println!("missing {}", key);
    }
    for url in &report.orphaned {
        println!("orphaned {}", url);
    }
}

fn manifest_label(manifest: PersistedManifest) -> String {
    match manifest {
        PersistedManifest::Missing => "missing".to_string(),
        PersistedManifest::Current => "current".to_string(),
        PersistedManifest::Outdated { changed } => format!("outdated ({} changed)", changed),
        PersistedManifest::Corrupt => "corrupt".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_labels() {
        assert_eq!(manifest_label(PersistedManifest::Current), "current");
        assert_eq!(
            manifest_label(PersistedManifest::Outdated { changed: 3 }),
            "outdated (3 changed)"
        );
    }
}
