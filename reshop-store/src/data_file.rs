use crate::codec::{self, PersistenceError, ShopSnapshot};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// The flat text file the shop state is dumped to between sessions
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved state. A missing file is a fresh shop, not an error.
    pub fn load(&self) -> Result<ShopSnapshot, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No saved data at {}, starting empty", self.path.display());
                return Ok(ShopSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = codec::decode(&contents)?;
        info!(
            "Loaded {} items, {} transactions, {} repairs, {} users from {}",
            snapshot.inventory.len(),
            snapshot.transactions.len(),
            snapshot.repairs.len(),
            snapshot.users.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    /// Overwrite the file with already-encoded contents
    pub fn write(&self, contents: &str) -> Result<(), PersistenceError> {
        fs::write(&self.path, contents)?;
        info!("Saved shop data to {}", self.path.display());
        Ok(())
    }

    pub fn save(&self, snapshot: &ShopSnapshot) -> Result<(), PersistenceError> {
        // Encode first so a rejected field leaves the previous file intact
        let contents = snapshot.encode()?;
        self.write(&contents)
    }
}
