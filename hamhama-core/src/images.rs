//! Positional image renaming: the image of the n-th dataset recipe becomes
//! `<n>.jpg`, matching the ids the import assigns on an empty database.

use std::fs;
use std::io;
use std::path::Path;

use crate::dataset::DatasetRecipe;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub moved: usize,
    pub missing: usize,
}

/// Move `<images_dir>/<Image_Name>.jpg` to `<dest_dir>/<position>.jpg`.
///
/// Positions are 1-based. Missing source images (or recipes with no image
/// name) are logged and counted.
pub fn relocate_images(
    recipes: &[DatasetRecipe],
    images_dir: &Path,
    dest_dir: &Path,
) -> io::Result<ImageSummary> {
    fs::create_dir_all(dest_dir)?;
    let mut summary = ImageSummary::default();

    for (index, recipe) in recipes.iter().enumerate() {
        let position = index + 1;
        let Some(image_name) = recipe.image_name.as_deref().filter(|n| !n.is_empty()) else {
            tracing::warn!(position, title = %recipe.title, "Recipe has no image name");
            summary.missing += 1;
            continue;
        };

        let source = images_dir.join(format!("{}.jpg", image_name));
        if !source.is_file() {
            tracing::warn!(position, source = %source.display(), "Image not found");
            summary.missing += 1;
            continue;
        }

        let dest = dest_dir.join(format!("{}.jpg", position));
        move_file(&source, &dest)?;
        tracing::info!(from = %source.display(), to = %dest.display(), "Moved image");
        summary.moved += 1;
    }

    Ok(summary)
}

/// Rename, falling back to copy and delete across filesystems.
fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest)?;
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str, image: Option<&str>) -> DatasetRecipe {
        DatasetRecipe {
            title: title.to_string(),
            ingredients: Vec::new(),
            image_name: image.map(str::to_string),
        }
    }

    #[test]
    fn test_moves_by_position() {
        let images = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let dest_dir = dest.path().join("recipe-pictures");

        fs::write(images.path().join("roast-chicken.jpg"), b"chicken").unwrap();
        fs::write(images.path().join("pancakes.jpg"), b"pancakes").unwrap();

        let recipes = [
            recipe("Roast Chicken", Some("roast-chicken")),
            recipe("Missing", Some("does-not-exist")),
            recipe("No Image", None),
            recipe("Pancakes", Some("pancakes")),
        ];

        let summary = relocate_images(&recipes, images.path(), &dest_dir).unwrap();

        assert_eq!(summary, ImageSummary { moved: 2, missing: 2 });
        assert_eq!(fs::read(dest_dir.join("1.jpg")).unwrap(), b"chicken");
        assert_eq!(fs::read(dest_dir.join("4.jpg")).unwrap(), b"pancakes");
        assert!(!dest_dir.join("2.jpg").exists());
        assert!(!images.path().join("roast-chicken.jpg").exists());
    }
}
