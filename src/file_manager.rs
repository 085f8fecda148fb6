use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AssetError;

pub const ASSETS_DIR: &str = "assets";
pub const PAGE_FILE: &str = "page.html";

/// Owns the output layout: `<output>/page.html` and `<output>/assets/*.css`.
#[derive(Clone, Debug)]
pub struct FileManager {
    base_dir: PathBuf,
    assets_dir: PathBuf,
}

impl FileManager {
    /// Creates the output and assets directories. Existing directories are fine.
    pub fn new(base_dir: &Path) -> Result<Self> {
        let base_dir = base_dir.to_path_buf();
        let assets_dir = base_dir.join(ASSETS_DIR);
        fs::create_dir_all(&assets_dir)
            .with_context(|| format!("Failed to create assets directory: {:?}", assets_dir))?;

        Ok(Self { base_dir, assets_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn page_path(&self) -> PathBuf {
        self.base_dir.join(PAGE_FILE)
    }

    /// Path written into the page for a saved asset, relative to the output root.
    pub fn asset_href(file_name: &str) -> String {
        format!("{}/{}", ASSETS_DIR, file_name)
    }

    pub fn save_asset(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, AssetError> {
        let path = self.assets_dir.join(file_name);
        write_replacing(&path, content).map_err(|source| AssetError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn save_page(&self, html: &str) -> Result<PathBuf> {
        let path = self.page_path();
        write_replacing(&path, html.as_bytes())
            .with_context(|| format!("Failed to write page: {:?}", path))?;
        Ok(path)
    }
}

/// Writes through a `.part` sibling and renames it over `path`, so a failed
/// write never leaves a truncated file under the final name.
fn write_replacing(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let result = (|| {
        let mut file = fs::File::create(&partial)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&partial, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}
