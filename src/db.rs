use std::path::Path;

use anyhow::Context;
use rusqlite::{params, Connection};

use crate::config::WriteMode;
use crate::models::EventRecord;
use crate::scraping::{RecordSink, SinkError};
use crate::utils;

pub struct Store {
    conn: Connection,
    write_mode: WriteMode,
}

impl Store {
    pub fn open_default(write_mode: WriteMode) -> anyhow::Result<Self> {
        Self::open(&utils::database_path(), write_mode)
    }

    pub fn open(path: &Path, write_mode: WriteMode) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        Self::from_connection(conn, write_mode)
    }

    pub fn open_in_memory(write_mode: WriteMode) -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        Self::from_connection(conn, write_mode)
    }

    fn from_connection(conn: Connection, write_mode: WriteMode) -> anyhow::Result<Self> {
        let store = Self { conn, write_mode };
        store.init_schema().context("initializing event schema")?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                natural_key TEXT NOT NULL,
                event_name TEXT NOT NULL,
                event_date TEXT NOT NULL,
                location TEXT NOT NULL,
                event_type TEXT NOT NULL,
                description TEXT,
                ticket_link TEXT,
                event_picture TEXT
            );",
        )?;
        if self.write_mode == WriteMode::Upsert {
            // Insert mode leaves the natural key unindexed so duplicate rows
            // can accumulate across runs.
            self.conn.execute_batch(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_events_natural_key
                 ON events(natural_key);",
            )?;
        }
        Ok(())
    }

    pub fn insert_event(&self, record: &EventRecord) -> rusqlite::Result<()> {
        let key = record.natural_key();
        match self.write_mode {
            WriteMode::Insert => {
                self.conn.execute(
                    "INSERT INTO events (natural_key, event_name, event_date, location,
                                         event_type, description, ticket_link, event_picture)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        key,
                        record.name,
                        record.starts_at,
                        record.location,
                        record.event_type,
                        record.description,
                        record.ticket_link,
                        record.event_picture
                    ],
                )?;
            }
            WriteMode::Upsert => {
                self.conn.execute(
                    "INSERT INTO events (natural_key, event_name, event_date, location,
                                         event_type, description, ticket_link, event_picture)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(natural_key) DO UPDATE SET
                       event_name = excluded.event_name,
                       event_date = excluded.event_date,
                       location = excluded.location,
                       event_type = excluded.event_type,
                       description = excluded.description,
                       ticket_link = excluded.ticket_link,
                       event_picture = excluded.event_picture",
                    params![
                        key,
                        record.name,
                        record.starts_at,
                        record.location,
                        record.event_type,
                        record.description,
                        record.ticket_link,
                        record.event_picture
                    ],
                )?;
            }
        }
        Ok(())
    }

    pub fn count_events(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
    }
}

impl RecordSink for Store {
    fn store(&mut self, record: &EventRecord) -> Result<(), SinkError> {
        self.insert_event(record)
            .with_context(|| format!("persisting event {}", record.name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_record(name: &str) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            raw_day: "3".to_string(),
            raw_month: "okt".to_string(),
            starts_at: Utc
                .with_ymd_and_hms(2025, 10, 3, 18, 0, 0)
                .single()
                .expect("valid sample datetime"),
            location: "AFAS Live, Amsterdam".to_string(),
            event_type: "Music".to_string(),
            description: None,
            ticket_link: Some("https://www.mojo.nl/agenda/editors".to_string()),
            event_picture: None,
        }
    }

    #[test]
    fn insert_mode_accumulates_duplicates() {
        let mut store = Store::open_in_memory(WriteMode::Insert).expect("open store");
        let record = sample_record("Editors");
        store.store(&record).expect("first write");
        store.store(&record).expect("second write");
        assert_eq!(store.count_events().expect("count"), 2);
    }

    #[test]
    fn upsert_mode_collapses_on_natural_key() {
        let mut store = Store::open_in_memory(WriteMode::Upsert).expect("open store");
        let mut record = sample_record("Editors");
        store.store(&record).expect("first write");
        record.ticket_link = Some("https://tickets.example.com/editors".to_string());
        store.store(&record).expect("second write");
        assert_eq!(store.count_events().expect("count"), 1);
        let link: String = store
            .conn
            .query_row("SELECT ticket_link FROM events", [], |row| row.get(0))
            .expect("query ticket link");
        assert_eq!(link, "https://tickets.example.com/editors");
    }

    #[test]
    fn missing_optional_fields_store_as_null() {
        let mut store = Store::open_in_memory(WriteMode::Insert).expect("open store");
        let record = EventRecord {
            ticket_link: None,
            ..sample_record("Editors")
        };
        store.store(&record).expect("write");
        let link: Option<String> = store
            .conn
            .query_row("SELECT ticket_link FROM events", [], |row| row.get(0))
            .expect("query ticket link");
        assert_eq!(link, None);
    }
}
