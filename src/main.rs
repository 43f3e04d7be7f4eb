use clap::Parser;
use eyre::{Context, Result};
use packclone::transport::HttpTransport;
use std::path::PathBuf;

/// A minimal read-only git clone client.
#[derive(Parser, Debug)]
#[command(version, about)]
struct App {
    /// URL of the remote repository's smart-HTTP endpoint.
    repo_url: String,

    /// Directory to clone into; created if missing, must be empty if it exists.
    target_dir: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let app = App::parse();
    run(&app).wrap_err_with(|| format!("failed to clone {}", app.repo_url))
}

fn run(app: &App) -> Result<()> {
    if app.target_dir.exists() {
        let has_entries = std::fs::read_dir(&app.target_dir)
            .wrap_err("inspect target directory")?
            .next()
            .is_some();
        if has_entries {
            eyre::bail!(
                "target directory {} already exists and is not empty",
                app.target_dir.display()
            );
        }
    } else {
        std::fs::create_dir_all(&app.target_dir).wrap_err("create target directory")?;
    }

    let transport = HttpTransport::new();
    let summary = packclone::clone::clone(&transport, &app.repo_url, &app.target_dir)
        .wrap_err("clone repository")?;

    eprintln!(
        "cloned branch {} (tip {}) into {}, {} delta(s) resolved",
        summary.branch,
        summary.tip,
        app.target_dir.display(),
        summary.deltas_resolved
    );

    Ok(())
}
