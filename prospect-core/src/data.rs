use chrono::Utc;
use prospect_scraper::ProfileRecord;
use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub struct Database {
    conn: Connection,
}

/// Profile row as stored, minus the raw JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: String,
    pub url: String,
    pub headline: Option<String>,
    pub industry: Option<String>,
    pub connections: Option<i64>,
}

impl Database {
    pub fn drop(path: &Path) {
        fs::remove_file(path).unwrap();
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Optimize for concurrent writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            -- Scrape runs
            CREATE TABLE IF NOT EXISTS scrape_sessions (
    id TEXT PRIMARY KEY,
    industry TEXT NOT NULL,
    started INTEGER NOT NULL,
    finished INTEGER,
    status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed', 'cancelled')),
    max_profiles INTEGER NOT NULL,
    profile_count INTEGER
);

-- Extracted profiles, keyed by the public id derived from the canonical URL
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    headline TEXT,
    pronouns TEXT,
    url TEXT NOT NULL,
    industry TEXT,
    about TEXT,
    connections INTEGER,
    open_to TEXT,             -- JSON
    raw_json TEXT NOT NULL,   -- full record as captured
    scraped_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_industry ON profiles(industry);
CREATE INDEX IF NOT EXISTS idx_profiles_url ON profiles(url);
            ",
        )?;
        Ok(())
    }

    // Session management
    pub fn create_session(&self, industry: &str, max_profiles: usize) -> Result<String> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let timestamp = Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO scrape_sessions (id, industry, started, status, max_profiles) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&session_id, industry, timestamp, "running", max_profiles as i64],
        )?;

        Ok(session_id)
    }

    pub fn complete_session(&self, session_id: &str, profile_count: usize) -> Result<()> {
        self.finish_session(session_id, "completed", Some(profile_count))
    }

    pub fn fail_session(&self, session_id: &str) -> Result<()> {
        self.finish_session(session_id, "failed", None)
    }

    pub fn cancel_session(&self, session_id: &str, profile_count: usize) -> Result<()> {
        self.finish_session(session_id, "cancelled", Some(profile_count))
    }

    fn finish_session(
        &self,
        session_id: &str,
        status: &str,
        profile_count: Option<usize>,
    ) -> Result<()> {
        let timestamp = Utc::now().timestamp();
        self.conn.execute(
            "UPDATE scrape_sessions SET status = ?1, finished = ?2, profile_count = ?3 WHERE id = ?4",
            params![
                status,
                timestamp,
                profile_count.map(|c| c as i64),
                session_id
            ],
        )?;
        Ok(())
    }

    // Profile operations

    /// Insert-by-primary-key with an explicit overwrite policy: re-inserting
    /// a known id replaces the row, it never silently duplicates.
    pub fn insert_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let timestamp = Utc::now().timestamp();
        let raw_json =
            serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string());
        let open_to = profile.open_to.as_ref().map(|value| value.to_string());

        self.conn.execute(
            "INSERT INTO profiles (
                id, headline, pronouns, url, industry, about, connections,
                open_to, raw_json, scraped_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                headline = excluded.headline,
                pronouns = excluded.pronouns,
                url = excluded.url,
                industry = excluded.industry,
                about = excluded.about,
                connections = excluded.connections,
                open_to = excluded.open_to,
                raw_json = excluded.raw_json,
                scraped_at = excluded.scraped_at",
            params![
                &profile.id,
                &profile.headline,
                &profile.pronouns,
                &profile.url,
                &profile.industry,
                &profile.about,
                profile.connections.map(i64::from),
                open_to,
                raw_json,
                timestamp,
            ],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, headline, industry, connections FROM profiles WHERE id = ?1",
        )?;

        let profile = stmt
            .query_row(params![id], |row| {
                Ok(StoredProfile {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    headline: row.get(2)?,
                    industry: row.get(3)?,
                    connections: row.get(4)?,
                })
            })
            .optional()?;
        Ok(profile)
    }

    pub fn profile_exists(&self, id: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare("SELECT 1 FROM profiles WHERE id = ?1")?;
        let found: Option<i64> = stmt.query_row(params![id], |row| row.get(0)).optional()?;
        Ok(found.is_some())
    }

    pub fn count_profiles(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))
    }

    /// Canonical URLs of every stored profile, used to pre-seed the visited
    /// set when resuming.
    pub fn visited_urls(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM profiles")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>>>()?;
        Ok(urls)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
