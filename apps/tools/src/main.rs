use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use directory::{default_sponsors, SponsorDraft};
use shared::domain::{NewSponsor, SponsorId, UserId};
use storage::{SponsorStore, SqliteSponsorStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/sponsors.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every stored sponsor in title order.
    List,
    Add {
        #[arg(long, default_value = "maintenance")]
        user_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        maplink: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        websitelink: String,
    },
    Delete {
        id: String,
    },
    /// Insert the built-in sponsor set into an empty table.
    SeedDefaults {
        #[arg(long, default_value = "maintenance")]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = SqliteSponsorStore::new(&cli.database_url).await?;
    for line in run(cli.command, &store).await? {
        println!("{line}");
    }
    Ok(())
}

async fn run(command: Command, store: &SqliteSponsorStore) -> Result<Vec<String>> {
    match command {
        Command::List => {
            let sponsors = store.list_sponsors().await?;
            Ok(sponsors
                .iter()
                .map(|s| {
                    let id = s.id.as_ref().map(SponsorId::as_str).unwrap_or("-");
                    format!("{id}\t{}\t{}\t{}", s.title, s.location, s.text)
                })
                .collect())
        }
        Command::Add {
            user_id,
            title,
            image,
            location,
            maplink,
            text,
            websitelink,
        } => {
            let draft = SponsorDraft {
                title,
                image,
                location,
                maplink,
                text,
                websitelink,
            };
            let valid = match draft.validate() {
                Ok(valid) => valid,
                Err(errors) => {
                    let details: Vec<String> = errors
                        .iter()
                        .map(|e| format!("{}: {}", e.field, e.message))
                        .collect();
                    bail!("invalid sponsor: {}", details.join("; "));
                }
            };
            let id = store
                .insert_returning_id(&valid.owned_by(UserId(user_id)))
                .await?;
            info!(%id, "sponsor added");
            Ok(vec![format!("created sponsor_id={id}")])
        }
        Command::Delete { id } => {
            let id = SponsorId(id);
            if !store.delete_by_id(&id).await? {
                bail!("no sponsor with id {id}");
            }
            Ok(vec![format!("deleted sponsor_id={id}")])
        }
        Command::SeedDefaults { user_id } => {
            let existing = store.count_sponsors().await?;
            if existing > 0 {
                return Ok(vec![format!(
                    "sponsors table already has {existing} row(s); nothing seeded"
                )]);
            }
            let owner = UserId(user_id);
            let mut lines = Vec::new();
            for sponsor in default_sponsors() {
                let row = NewSponsor {
                    title: sponsor.title,
                    image: sponsor.image,
                    location: sponsor.location,
                    maplink: sponsor.maplink,
                    text: sponsor.text,
                    websitelink: sponsor.websitelink,
                    user_id: owner.clone(),
                };
                let id = store.insert_returning_id(&row).await?;
                lines.push(format!("seeded {id}\t{}", row.title));
            }
            Ok(lines)
        }
    }
}
