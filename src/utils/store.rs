use log::debug;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ClipError, Result};

/// Key for the persisted working (download) directory
pub const VIDEO_DIRECTORY_KEY: &str = "videoDirectoryPath";
/// Key for the persisted clip output directory
pub const CLIP_DIRECTORY_KEY: &str = "clipDirectoryPath";

/// Small name/value table that remembers directory choices between runs
pub struct ConfigStore {
    conn: Connection,
}

impl ConfigStore {
    /// Default database location, `<data dir>/clipmaker/clipmaker.db`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("clipmaker"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipmaker.db")
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ClipError::filesystem(parent, e))?;
        }
        debug!("Opening configuration database at {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the table if needed and return every stored entry
    pub fn initialize(&self) -> Result<HashMap<String, String>> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            );",
            params![],
        )?;

        let mut stmt = self.conn.prepare("SELECT name, data FROM configs")?;
        let rows = stmt.query_map(params![], |row| {
            let name: String = row.get("name")?;
            let data: String = row.get("data")?;
            Ok((name, data))
        })?;

        let mut entries = HashMap::new();
        for row in rows {
            let (name, data) = row?;
            entries.insert(name, data);
        }

        debug!("Loaded {} configuration entries", entries.len());
        Ok(entries)
    }

    /// Insert the entry, or replace its value if the name is already stored
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO configs (name, data) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET data = excluded.data",
            params![name, value],
        )?;
        debug!("Stored {} = {}", name, value);
        Ok(())
    }
}
