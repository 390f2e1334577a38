mod classify;
mod import_images;
mod import_ingredients;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hamhama")]
#[command(about = "Hamhama recipe batch tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a category to every recipe that has none
    Classify,
    /// Import dataset recipes with their ingredients parsed into rows
    ImportIngredients {
        /// Recipe dataset JSON file
        #[arg(long, default_value = "recipe_data.json")]
        data: PathBuf,
    },
    /// Move dataset images to <dest>/<position>.jpg
    ImportImages {
        /// Recipe dataset JSON file
        #[arg(long, default_value = "recipe_data.json")]
        data: PathBuf,
        /// Directory holding <Image_Name>.jpg files
        #[arg(long, default_value = "images")]
        images: PathBuf,
        /// Destination directory
        #[arg(long, default_value = "../uploads/recipe-pictures")]
        dest: PathBuf,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify => {
            classify::classify().await?;
        }
        Commands::ImportIngredients { data } => {
            import_ingredients::import_ingredients(&data).await?;
        }
        Commands::ImportImages { data, images, dest } => {
            import_images::import_images(&data, &images, &dest)?;
        }
    }

    Ok(())
}
