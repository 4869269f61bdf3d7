use std::path::Path;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    ies_catalog::logging::init().context("init logging")?;

    let cli = ies_catalog::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        ies_catalog::cli::Command::Inspect(args) => {
            let workbook = Path::new(&args.workbook);
            let catalog = tokio::task::spawn_blocking({
                let workbook = workbook.to_owned();
                move || ies_catalog::ingest::load_workbook(&workbook)
            })
            .await
            .context("join ingestion task")?
            .context("inspect")?;

            let view = ies_catalog::query::project(
                &catalog,
                args.institution.as_deref(),
                args.semester.as_deref(),
            );
            let json = serde_json::to_string_pretty(&view).context("serialize view")?;
            println!("{json}");
        }
        ies_catalog::cli::Command::Locate(args) => {
            let dir = Path::new(&args.dir);
            let found = ies_catalog::discovery::find_workbook(dir)
                .await
                .context("locate")?
                .ok_or_else(|| ies_catalog::error::CatalogError::SourceUnavailable {
                    dir: dir.to_owned(),
                })?;
            println!("{}", found.display());
        }
    }

    Ok(())
}
