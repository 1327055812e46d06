//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Platform-appropriate location of the default database file:
    /// - Linux:   `~/.local/share/bill-split/bill-split.db`
    /// - macOS:   `~/Library/Application Support/app.bill-split.bill-split/bill-split.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\bill-split\bill-split\data\bill-split.db`
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("app", "bill-split", "bill-split").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join("bill-split.db"))
    }

    /// Open the database named by a connection string.
    ///
    /// Accepted forms: `sqlite://<path>`, `sqlite::memory:`, `:memory:`, or
    /// a bare filesystem path.
    pub fn open_url(url: &str) -> Result<Self> {
        let target = url.strip_prefix("sqlite://").unwrap_or(url);
        let target = target.strip_prefix("sqlite:").unwrap_or(target);

        if target == ":memory:" {
            tracing::info!("opening in-memory database");
            return Self::open_in_memory();
        }

        let path = Path::new(target);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(path = %path.display(), "opening database");

        Self::open_at(path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::init(conn)
    }

    /// Open a private, non-persistent database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
