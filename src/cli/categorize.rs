use anyhow::Result;
use clap::Subcommand;

use crate::{
    domain::{normalize, Category},
    ledger::TimeLedger,
    storage::ledger_storage::LedgerStorage,
};

use super::output::render_overrides;

#[derive(Subcommand, Debug)]
pub enum CategorizeCommand {
    #[command(about = "List category overrides")]
    List,
    #[command(about = "Assign a category to a domain and reclassify recorded time")]
    Set { domain: String, category: Category },
    #[command(about = "Drop the override of a domain so keywords decide again")]
    Remove { domain: String },
}

pub async fn process_categorize_command<S: LedgerStorage>(
    command: CategorizeCommand,
    mut ledger: TimeLedger<S>,
) -> Result<()> {
    match command {
        CategorizeCommand::List => {
            println!("{}", render_overrides(&ledger.snapshot().overrides));
        }
        CategorizeCommand::Set { domain, category } => {
            let domain = normalize(&domain);
            // Every edit replaces the whole map, which reclassifies all recorded time.
            let report = ledger
                .edit_overrides(|overrides| {
                    overrides.insert(domain.clone(), category) != Some(category)
                })
                .await?;
            match report {
                Some(report) => println!(
                    "{domain} is now {category}, {} domains reclassified",
                    report.recategorized
                ),
                None => println!("{domain} already is {category}"),
            }
        }
        CategorizeCommand::Remove { domain } => {
            let domain = normalize(&domain);
            let report = ledger
                .edit_overrides(|overrides| overrides.remove(&domain).is_some())
                .await?;
            match report {
                Some(_) => println!("Removed override of {domain}"),
                None => println!("{domain} has no override"),
            }
        }
    }
    Ok(())
}
