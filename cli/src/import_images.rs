use std::path::Path;

use anyhow::{Context, Result};
use hamhama_core::{load_dataset, relocate_images};

pub fn import_images(data: &Path, images: &Path, dest: &Path) -> Result<()> {
    let recipes = load_dataset(data)
        .with_context(|| format!("Failed to load dataset {}", data.display()))?;

    let summary = relocate_images(&recipes, images, dest)
        .with_context(|| format!("Failed to move images into {}", dest.display()))?;

    println!("Moved {} images to {}", summary.moved, dest.display());
    if summary.missing > 0 {
        println!("Missing images: {}", summary.missing);
    }

    Ok(())
}
