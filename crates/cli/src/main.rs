//! `checkout` — inspect checkout step state from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use checkout_drafts::{DraftConfig, DraftStorage};
use checkout_pets::{PetSelection, PetStep};
use checkout_shipping::{CheckoutSnapshot, MultiShippingForm};

#[derive(Parser, Debug)]
#[command(name = "checkout", about = "Checkout step tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the allocation banner and destinations for a checkout JSON file.
    Shipping { checkout: PathBuf },
    /// Work with the saved pet information draft.
    Pets {
        #[command(subcommand)]
        command: PetsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PetsCommand {
    /// Print the current draft as JSON.
    Show,
    /// Append a pet record to the draft.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Test1")]
        kind: PetSelection,
    },
    /// Delete the draft.
    Clear,
}

fn main() -> Result<()> {
    checkout_observability::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Shipping { checkout } => {
            let raw = std::fs::read_to_string(&checkout)
                .with_context(|| format!("failed to read {}", checkout.display()))?;
            let snapshot: CheckoutSnapshot =
                serde_json::from_str(&raw).context("invalid checkout JSON")?;
            let form = MultiShippingForm::from_provider(&snapshot)?;

            if let Some(text) = form.banner_text() {
                println!("{text}");
            }
            for view in form.destination_views() {
                match (&view.address_text, &view.summary_text) {
                    (Some(address), Some(summary)) => {
                        println!("{}: {address} ({summary})", view.label)
                    }
                    _ => println!("{}: no address", view.label),
                }
                for (item, quantity) in view.visible_items() {
                    println!("  {quantity} x {}", item.name);
                }
            }
        }
        Command::Pets { command } => {
            let config = DraftConfig::from_env()?;
            let mut step = PetStep::multiple(config.open())?;

            match command {
                PetsCommand::Show => {}
                PetsCommand::Add { name, kind } => {
                    let last = step.records().len() - 1;
                    let index = if step.records()[last].animal_name.is_empty() {
                        last
                    } else {
                        step.add_new()?;
                        last + 1
                    };
                    step.set_animal_name(index, name)?;
                    step.set_pet_selection(index, kind)?;
                    tracing::info!(index, "pet record saved");
                }
                PetsCommand::Clear => {
                    config.open().remove(checkout_pets::PET_INFORMATION_KEY)?;
                    println!("draft cleared");
                    return Ok(());
                }
            }

            println!("{}", serde_json::to_string_pretty(step.information())?);
        }
    }

    Ok(())
}
