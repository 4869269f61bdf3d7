use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Inspect(InspectArgs),
    Locate(LocateArgs),
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Workbook to ingest (.xlsx or .xls).
    #[arg(long)]
    pub workbook: String,

    /// Only show this institution (sheet name).
    #[arg(long)]
    pub institution: Option<String>,

    /// Only show this semester of the selected institution(s).
    #[arg(long)]
    pub semester: Option<String>,
}

#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Directory searched for a workbook.
    #[arg(long, default_value = ".")]
    pub dir: String,
}
