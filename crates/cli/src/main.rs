use anyhow::Context;
use clap::{Parser, Subcommand};

use shelf_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "shelf", version, about = "Personal book shelf service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve HTTP until Ctrl-C
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create an account without going through signup
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Serve => shelf_app::run(settings).await,
        Command::Migrate => {
            shelf_telemetry::init(&settings.telemetry)?;
            let db = shelf_db::connect(&settings.database).await?;
            let applied = shelf_app::migrate(&db, &shelf_app::registry()).await?;
            println!("{} migration(s) applied", applied);
            Ok(())
        }
        Command::CreateUser { username, password } => {
            shelf_telemetry::init(&settings.telemetry)?;
            let db = shelf_db::connect(&settings.database).await?;
            shelf_app::migrate(&db, &shelf_app::registry()).await?;

            if shelf_app::modules::accounts::store::username_taken(&db, &username).await? {
                anyhow::bail!("user '{}' already exists", username);
            }
            let user =
                shelf_app::modules::accounts::store::create_user(&db, &username, &password).await?;
            println!("created user {} (id {})", user.username, user.id);
            Ok(())
        }
    }
}
