//! Record store reader for the extraction timeline database.
//!
//! The store is a SQLite file produced by the extraction collaborator,
//! holding a single table with columns equivalent to
//! `(key TEXT, activity TEXT, datalist TEXT)`. Every absence case — missing
//! file, unreadable store, no tables, no rows — degrades to an empty result
//! with a diagnostic; none is an error to the caller.
//!
//! Precondition: the store contains exactly one table. When it does not, the
//! first table in `sqlite_master` order is used deterministically and a
//! warning is emitted.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::core::RawRecord;

/// Load all rows of the store's sole table, in stored order.
///
/// Opens and closes one read-only connection per call; callers that loop over
/// windows are expected to load once and reuse the result.
pub fn read_store(db_path: &Path) -> Vec<RawRecord> {
    if !db_path.exists() {
        warn!(path = %db_path.display(), "record store does not exist");
        return Vec::new();
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(db_path, flags) {
        Ok(conn) => conn,
        Err(e) => {
            warn!(path = %db_path.display(), error = %e, "failed to open record store");
            return Vec::new();
        }
    };

    let tables = match list_tables(&conn) {
        Ok(tables) => tables,
        Err(e) => {
            warn!(error = %e, "failed to enumerate store tables");
            return Vec::new();
        }
    };

    let Some(table) = tables.first() else {
        info!(path = %db_path.display(), "no tables found in record store");
        return Vec::new();
    };
    if tables.len() > 1 {
        warn!(
            table = %table,
            extra = tables.len() - 1,
            "record store has multiple tables, using the first"
        );
    }

    let rows = match load_rows(&conn, table) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(table = %table, error = %e, "failed to read rows from record store");
            return Vec::new();
        }
    };

    if rows.is_empty() {
        info!(table = %table, "no rows found in record store table");
    } else {
        info!(table = %table, rows = rows.len(), "loaded record store");
    }
    rows
}

fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    names.collect()
}

fn load_rows(conn: &Connection, table: &str) -> rusqlite::Result<Vec<RawRecord>> {
    // Table name comes from sqlite_master, not the operator, but quote it
    // anyway so exotic names cannot alter the statement.
    let sql = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
    let mut stmt = conn.prepare(&sql)?;
    if stmt.column_count() < 3 {
        warn!(table = %table, columns = stmt.column_count(), "table has fewer than 3 columns");
        return Ok(Vec::new());
    }
    let rows = stmt.query_map([], |row| {
        Ok(RawRecord {
            key: cell_text(row.get_ref(0)?),
            activity: cell_text(row.get_ref(1)?),
            datalist: cell_text(row.get_ref(2)?),
        })
    })?;
    rows.collect()
}

/// Stringify any cell value; extraction stores are not strict about types.
fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(rows: &[(&str, &str, &str)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tl.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE data (key TEXT, activity TEXT, datalist TEXT)", [])
            .unwrap();
        for (key, activity, datalist) in rows {
            conn.execute(
                "INSERT INTO data (key, activity, datalist) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, activity, datalist],
            )
            .unwrap();
        }
        (dir, path)
    }

    #[test]
    fn missing_store_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_store(&dir.path().join("absent.db")).is_empty());
    }

    #[test]
    fn store_without_tables_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tl.db");
        Connection::open(&path).unwrap();
        assert!(read_store(&path).is_empty());
    }

    #[test]
    fn rows_load_in_stored_order() {
        let (_dir, path) = scratch_store(&[
            ("2024-07-14 03:00:00", "B", "second"),
            ("2024-07-14 01:00:00", "A", "first"),
        ]);
        let rows = read_store(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].datalist, "second");
        assert_eq!(rows[1].datalist, "first");
    }

    #[test]
    fn first_table_wins_when_multiple_exist() {
        let (_dir, path) = scratch_store(&[("2024-07-14 01:00:00", "A", "wanted")]);
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE later (key TEXT, activity TEXT, datalist TEXT)", [])
            .unwrap();
        conn.execute(
            "INSERT INTO later VALUES ('2024-07-14 02:00:00', 'B', 'unwanted')",
            [],
        )
        .unwrap();
        drop(conn);

        let rows = read_store(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].datalist, "wanted");
    }

    #[test]
    fn non_text_cells_are_stringified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tl.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE data (key, activity, datalist)", []).unwrap();
        conn.execute("INSERT INTO data VALUES (1721000000, 42, NULL)", []).unwrap();
        drop(conn);

        let rows = read_store(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "1721000000");
        assert_eq!(rows[0].activity, "42");
        assert_eq!(rows[0].datalist, "");
    }
}
