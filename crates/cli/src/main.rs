mod commands;
mod config;
mod seed;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "cloudkitchen", about = "Cloud kitchen corporate and event billing", version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show revenue summary and every stored bill
    List,
    /// Print an invoice, or write it as printable HTML
    Show {
        id: String,
        /// Write an HTML invoice to this path instead of printing text
        #[arg(long)]
        html: Option<PathBuf>,
        /// Print the stored record as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,
    },
    /// Create a bill from a JSON draft file ("-" reads stdin)
    Add { draft: PathBuf },
    /// Replace a bill's items and header from a JSON draft file
    Replace { id: String, draft: PathBuf },
    /// Change header fields of a bill
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact_person: Option<String>,
        #[arg(long)]
        contact_no: Option<String>,
        /// yyyy-mm-dd
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a bill
    Delete { id: String },
    /// Delete ALL bills
    Reset {
        /// Confirm deleting every bill
        #[arg(long)]
        yes: bool,
    },
    /// Add the sample corporate and event bills
    Seed,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cloudkitchen_observability::init(cli.settings.log_format);

    let mut store = commands::open_store(&cli.settings)?;

    match cli.command {
        Command::List => commands::list(&store),
        Command::Show { id, html, json } => commands::show(&store, &id, html.as_deref(), json),
        Command::Add { draft } => commands::add(&mut store, &draft),
        Command::Replace { id, draft } => commands::replace(&mut store, &id, &draft),
        Command::Edit {
            id,
            name,
            contact_person,
            contact_no,
            date,
        } => commands::edit(
            &mut store,
            &id,
            cloudkitchen_billing::BillPatch {
                name,
                contact_person,
                contact_no,
                date,
            },
        ),
        Command::Delete { id } => commands::delete(&mut store, &id),
        Command::Reset { yes } => commands::reset(&mut store, yes),
        Command::Seed => commands::seed(&mut store),
    }
}
