use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "homeledger_admin")]
#[command(about = "Admin utilities for Homeledger (bootstrap users/households)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./homeledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Household(Household),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Household {
    #[command(subcommand)]
    command: HouseholdCommand,
}

#[derive(Subcommand, Debug)]
enum HouseholdCommand {
    Create(HouseholdCreateArgs),
    AddMember(AddMemberArgs),
    /// List the households a user belongs to.
    List(HouseholdListArgs),
}

#[derive(Args, Debug)]
struct HouseholdCreateArgs {
    /// Owner user id.
    #[arg(long)]
    owner: Uuid,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct AddMemberArgs {
    #[arg(long)]
    household: Uuid,
    #[arg(long)]
    user: Uuid,
}

#[derive(Args, Debug)]
struct HouseholdListArgs {
    #[arg(long)]
    user: Uuid,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn exit_on_input_error(err: EngineError) -> Box<dyn Error + Send + Sync> {
    if err.is_validation() {
        eprintln!("{err}");
        std::process::exit(1);
    }
    Box::new(err)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = engine
                .new_user(&args.email, &args.name)
                .await
                .map_err(exit_on_input_error)?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Household(Household {
            command: HouseholdCommand::Create(args),
        }) => {
            let household = engine
                .new_household(&args.name, args.owner)
                .await
                .map_err(exit_on_input_error)?;
            println!("created household: {} ({})", household.name, household.id);
        }
        Command::Household(Household {
            command: HouseholdCommand::AddMember(args),
        }) => {
            engine
                .add_member(args.household, args.user)
                .await
                .map_err(exit_on_input_error)?;
            println!("added {} to household {}", args.user, args.household);
        }
        Command::Household(Household {
            command: HouseholdCommand::List(args),
        }) => {
            for household in engine.households_for_user(args.user).await? {
                println!("{}\t{}", household.id, household.name);
            }
        }
    }

    Ok(())
}
