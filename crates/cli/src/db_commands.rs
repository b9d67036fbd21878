use {
    clap::Subcommand,
    std::path::{Path, PathBuf},
};

#[derive(Subcommand)]
pub enum DbAction {
    /// Delete the SQLite database file (policies and pending deletions).
    Reset,
    /// Create the database if needed and run all pending migrations.
    Migrate,
}

pub async fn handle_db(action: DbAction) -> anyhow::Result<()> {
    let config = autodelete_config::discover_and_load();
    match action {
        DbAction::Reset => reset_database(&config.database.resolved_url()),
        DbAction::Migrate => run_migrations(&config.database).await,
    }
}

/// File backing a `sqlite:` URL, or `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// The database file plus the WAL and SHM files SQLite may have created.
fn sidecar_files(db: &Path) -> [PathBuf; 3] {
    let with_suffix = |suffix: &str| {
        let mut name = db.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    [db.to_path_buf(), with_suffix("-wal"), with_suffix("-shm")]
}

fn reset_database(url: &str) -> anyhow::Result<()> {
    let Some(db) = sqlite_file_path(url) else {
        println!("Database URL {url} does not point at a SQLite file; nothing to delete.");
        return Ok(());
    };

    let mut deleted = false;
    for path in sidecar_files(&db) {
        if path.exists() {
            std::fs::remove_file(&path)?;
            println!("Deleted: {}", path.display());
            deleted = true;
        }
    }

    if deleted {
        println!("Database files deleted. Run `autodelete db migrate` to recreate them.");
    } else {
        println!("No database files found at {}.", db.display());
    }

    Ok(())
}

async fn run_migrations(config: &autodelete_config::DatabaseConfig) -> anyhow::Result<()> {
    println!("Running migrations for {}...", config.resolved_url());
    let pool = autodelete_gateway::open_database(config).await?;
    pool.close().await;
    println!("All migrations complete.");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, autodelete_config::DatabaseConfig, tempfile::TempDir};

    #[test]
    fn sqlite_urls_map_to_files() {
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/autodelete/autodelete.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/autodelete/autodelete.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite://autodelete.db"),
            Some(PathBuf::from("autodelete.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/autodelete"), None);
    }

    #[test]
    fn reset_removes_database_and_sidecars() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("autodelete.db");
        for path in sidecar_files(&db) {
            std::fs::write(&path, "test").unwrap();
        }

        reset_database(&format!("sqlite:{}?mode=rwc", db.display())).unwrap();

        for path in sidecar_files(&db) {
            assert!(!path.exists(), "{} should be deleted", path.display());
        }
    }

    #[test]
    fn reset_without_files_is_ok() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("missing.db");
        reset_database(&format!("sqlite:{}", db.display())).unwrap();
        reset_database("sqlite::memory:").unwrap();
    }

    #[tokio::test]
    async fn migrations_create_file_and_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("autodelete.db");
        let config = DatabaseConfig {
            url: Some(format!("sqlite:{}?mode=rwc", db.display())),
            max_connections: 1,
        };

        run_migrations(&config).await.unwrap();
        run_migrations(&config).await.unwrap();
        assert!(db.exists());

        let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", db.display()))
            .await
            .unwrap();
        let _: (i64,) = sqlx::query_as("SELECT count(*) FROM channel_policies")
            .fetch_one(&pool)
            .await
            .unwrap();
        let _: (i64,) = sqlx::query_as("SELECT count(*) FROM pending_deletions")
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
    }
}
