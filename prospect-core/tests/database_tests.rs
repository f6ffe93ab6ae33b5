// Tests for the row-store sink

use prospect_core::data::Database;
use prospect_scraper::ProfileRecord;
use tempfile::TempDir;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn sample_profile(id: &str) -> ProfileRecord {
    ProfileRecord {
        id: id.to_string(),
        url: format!("https://www.linkedin.com/in/{id}"),
        headline: Some("Staff Engineer".to_string()),
        industry: Some("Information Technology".to_string()),
        connections: Some(500),
        ..ProfileRecord::default()
    }
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));

    let _db = Database::new(&db_path).unwrap();
    assert!(Database::exists(&db_path));
}

#[test]
fn test_database_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let _db = Database::new(&db_path).unwrap();
    assert!(Database::exists(&db_path));

    Database::drop(&db_path);
    assert!(!Database::exists(&db_path));
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_create_session() {
    let (_temp_dir, db) = create_test_db();

    let session_id = db.create_session("Information Technology", 100).unwrap();
    assert!(!session_id.is_empty());
}

#[test]
fn test_sessions_get_distinct_ids() {
    let (_temp_dir, db) = create_test_db();

    let session1 = db.create_session("Information Technology", 100).unwrap();
    let session2 = db.create_session("Security", 50).unwrap();

    assert_ne!(session1, session2);
}

#[test]
fn test_session_lifecycle() {
    let (_temp_dir, db) = create_test_db();

    let completed = db.create_session("Information Technology", 100).unwrap();
    assert!(db.complete_session(&completed, 42).is_ok());

    let failed = db.create_session("Information Technology", 100).unwrap();
    assert!(db.fail_session(&failed).is_ok());

    let cancelled = db.create_session("Information Technology", 100).unwrap();
    assert!(db.cancel_session(&cancelled, 7).is_ok());
}

// ============================================================================
// Profile Tests
// ============================================================================

#[test]
fn test_insert_and_get_profile() {
    let (_temp_dir, db) = create_test_db();

    db.insert_profile(&sample_profile("jane-doe")).unwrap();

    let stored = db.get_profile("jane-doe").unwrap().unwrap();
    assert_eq!(stored.id, "jane-doe");
    assert_eq!(stored.url, "https://www.linkedin.com/in/jane-doe");
    assert_eq!(stored.headline.as_deref(), Some("Staff Engineer"));
    assert_eq!(stored.connections, Some(500));
}

#[test]
fn test_get_missing_profile() {
    let (_temp_dir, db) = create_test_db();
    assert!(db.get_profile("nobody").unwrap().is_none());
}

#[test]
fn test_profile_exists() {
    let (_temp_dir, db) = create_test_db();

    assert!(!db.profile_exists("jane-doe").unwrap());
    db.insert_profile(&sample_profile("jane-doe")).unwrap();
    assert!(db.profile_exists("jane-doe").unwrap());
}

#[test]
fn test_reinsert_overwrites_never_duplicates() {
    let (_temp_dir, db) = create_test_db();

    db.insert_profile(&sample_profile("jane-doe")).unwrap();

    let mut updated = sample_profile("jane-doe");
    updated.headline = Some("Principal Engineer".to_string());
    updated.connections = Some(501);
    db.insert_profile(&updated).unwrap();

    assert_eq!(db.count_profiles().unwrap(), 1);
    let stored = db.get_profile("jane-doe").unwrap().unwrap();
    assert_eq!(stored.headline.as_deref(), Some("Principal Engineer"));
    assert_eq!(stored.connections, Some(501));
}

#[test]
fn test_count_profiles() {
    let (_temp_dir, db) = create_test_db();

    assert_eq!(db.count_profiles().unwrap(), 0);
    db.insert_profile(&sample_profile("jane-doe")).unwrap();
    db.insert_profile(&sample_profile("john-roe")).unwrap();
    assert_eq!(db.count_profiles().unwrap(), 2);
}

#[test]
fn test_visited_urls_for_resume() {
    let (_temp_dir, db) = create_test_db();

    db.insert_profile(&sample_profile("jane-doe")).unwrap();
    db.insert_profile(&sample_profile("john-roe")).unwrap();

    let mut urls = db.visited_urls().unwrap();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://www.linkedin.com/in/jane-doe".to_string(),
            "https://www.linkedin.com/in/john-roe".to_string(),
        ]
    );
}

#[test]
fn test_raw_json_round_trips() {
    let (_temp_dir, db) = create_test_db();

    let mut profile = sample_profile("jane-doe");
    profile.skills = vec!["Rust".to_string(), "SQL".to_string()];
    db.insert_profile(&profile).unwrap();

    let raw: String = db
        .get_connection()
        .query_row(
            "SELECT raw_json FROM profiles WHERE id = ?1",
            ["jane-doe"],
            |row| row.get(0),
        )
        .unwrap();
    let restored: ProfileRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored, profile);
}
