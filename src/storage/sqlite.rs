//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::SiteStatus;
use crate::storage::maintenance::{add_occurrence, remove_occurrences};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{FrequencyMismatch, IndexRecord, LemmaRecord, PageRecord, SiteRecord};
use crate::LexiError;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const SITE_COLUMNS: &str = "id, url, name, status, status_time, last_error";
const PAGE_COLUMNS: &str = "id, site_id, path, code, content";
const LEMMA_COLUMNS: &str = "id, site_id, lemma, frequency";
const ENTRY_COLUMNS: &str = "id, page_id, lemma_id, weight";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(LexiError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, LexiError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> Result<Self, LexiError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_pages(&self, sql: &str, param: &dyn rusqlite::ToSql) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let pages = stmt
            .query_map(params![param], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn query_lemmas(
        &self,
        sql: &str,
        param: &dyn rusqlite::ToSql,
    ) -> StorageResult<Vec<LemmaRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let lemmas = stmt
            .query_map(params![param], lemma_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lemmas)
    }

    fn query_entries(&self, sql: &str, id: i64) -> StorageResult<Vec<IndexRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params![id], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn count(&self, sql: &str, site_id: Option<i64>) -> StorageResult<u64> {
        let count: i64 = match site_id {
            Some(id) => self
                .conn
                .query_row(&format!("{} WHERE site_id = ?1", sql), params![id], |row| {
                    row.get(0)
                })?,
            None => self.conn.query_row(sql, [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }
}

fn site_from_row(row: &Row) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SiteStatus::Failed),
        status_time: row.get(4)?,
        last_error: row.get(5)?,
    })
}

fn page_from_row(row: &Row) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        code: row.get(3)?,
        content: row.get(4)?,
    })
}

fn lemma_from_row(row: &Row) -> rusqlite::Result<LemmaRecord> {
    Ok(LemmaRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        lemma: row.get(2)?,
        frequency: row.get(3)?,
    })
}

fn entry_from_row(row: &Row) -> rusqlite::Result<IndexRecord> {
    Ok(IndexRecord {
        id: row.get(0)?,
        page_id: row.get(1)?,
        lemma_id: row.get(2)?,
        weight: row.get(3)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Site Management =====

    fn insert_site(&mut self, url: &str, name: &str, status: SiteStatus) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, status.to_db_string(), now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS),
                params![site_id],
                site_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::SiteNotFound(format!("Site ID {}", site_id)))
    }

    fn get_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let site = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE url = ?1", SITE_COLUMNS),
                params![url],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    fn get_or_insert_site(
        &mut self,
        url: &str,
        name: &str,
        status: SiteStatus,
    ) -> StorageResult<SiteRecord> {
        if let Some(site) = self.get_site_by_url(url)? {
            return Ok(site);
        }

        let id = self.insert_site(url, name, status)?;
        self.get_site(id)
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, last_error, site_id],
        )?;

        if changed == 0 {
            return Err(StorageError::SiteNotFound(format!("Site ID {}", site_id)));
        }
        Ok(())
    }

    fn touch_site(&mut self, site_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now, site_id],
        )?;
        Ok(())
    }

    fn fail_unfinished_sites(&mut self, message: &str) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE status != ?4",
            params![
                SiteStatus::Failed.to_db_string(),
                now,
                message,
                SiteStatus::Indexed.to_db_string()
            ],
        )?;
        Ok(changed)
    }

    fn fail_interrupted_sites(&mut self, message: &str) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE status = ?4",
            params![
                SiteStatus::Failed.to_db_string(),
                now,
                message,
                SiteStatus::Indexing.to_db_string()
            ],
        )?;
        Ok(changed)
    }

    fn clear_all(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "
            DELETE FROM index_entries;
            DELETE FROM lemmas;
            DELETE FROM pages;
            DELETE FROM sites;
        ",
        )?;
        tx.commit()?;
        Ok(())
    }

    // ===== Page Management =====

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                params![page_id],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::PageNotFound(format!("Page ID {}", page_id)))
    }

    fn get_page_by_path(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pages WHERE site_id = ?1 AND path = ?2",
                    PAGE_COLUMNS
                ),
                params![site_id, path],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn find_pages_by_path(&self, path: &str) -> StorageResult<Vec<PageRecord>> {
        self.query_pages(
            &format!("SELECT {} FROM pages WHERE path = ?1 ORDER BY id", PAGE_COLUMNS),
            &path,
        )
    }

    fn pages_by_site(&self, site_id: i64) -> StorageResult<Vec<PageRecord>> {
        self.query_pages(
            &format!(
                "SELECT {} FROM pages WHERE site_id = ?1 ORDER BY id",
                PAGE_COLUMNS
            ),
            &site_id,
        )
    }

    fn page_ids(&self, site_id: Option<i64>) -> StorageResult<Vec<i64>> {
        let ids = match site_id {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id FROM pages WHERE site_id = ?1 ORDER BY id")?;
                let rows = stmt.query_map(params![id], |row| row.get(0))?;
                rows.collect::<Result<Vec<i64>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare("SELECT id FROM pages ORDER BY id")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<i64>, _>>()?
            }
        };
        Ok(ids)
    }

    fn count_pages(&self, site_id: Option<i64>) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages", site_id)
    }

    fn replace_page(
        &mut self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
        lemmas: &HashMap<String, u32>,
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM pages WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(old_id) = existing {
            remove_occurrences(&tx, old_id)?;
        }

        tx.execute(
            "INSERT INTO pages (site_id, path, code, content) VALUES (?1, ?2, ?3, ?4)",
            params![site_id, path, code, content],
        )?;
        let page_id = tx.last_insert_rowid();

        // Sorted so that lemma IDs do not depend on hash order
        let mut ordered: Vec<(&String, &u32)> = lemmas.iter().collect();
        ordered.sort();
        for (lemma, weight) in ordered {
            add_occurrence(&tx, site_id, page_id, lemma, *weight)?;
        }

        tx.commit()?;
        Ok(page_id)
    }

    fn remove_page(&mut self, page_id: i64) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        remove_occurrences(&tx, page_id)?;
        tx.commit()?;
        Ok(())
    }

    // ===== Lemma Management =====

    fn get_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
                    LEMMA_COLUMNS
                ),
                params![site_id, lemma],
                lemma_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn lemmas_by_form(&self, lemma: &str) -> StorageResult<Vec<LemmaRecord>> {
        self.query_lemmas(
            &format!(
                "SELECT {} FROM lemmas WHERE lemma = ?1 ORDER BY site_id",
                LEMMA_COLUMNS
            ),
            &lemma,
        )
    }

    fn lemmas_by_site(&self, site_id: i64) -> StorageResult<Vec<LemmaRecord>> {
        self.query_lemmas(
            &format!(
                "SELECT {} FROM lemmas WHERE site_id = ?1 ORDER BY lemma",
                LEMMA_COLUMNS
            ),
            &site_id,
        )
    }

    fn count_lemmas(&self, site_id: Option<i64>) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM lemmas", site_id)
    }

    // ===== Index Entries =====

    fn entries_by_page(&self, page_id: i64) -> StorageResult<Vec<IndexRecord>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM index_entries WHERE page_id = ?1 ORDER BY id",
                ENTRY_COLUMNS
            ),
            page_id,
        )
    }

    fn entries_by_lemma(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM index_entries WHERE lemma_id = ?1 ORDER BY page_id",
                ENTRY_COLUMNS
            ),
            lemma_id,
        )
    }

    fn count_entries(&self, page_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM index_entries WHERE page_id = ?1",
            params![page_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn pages_with_lemmas(
        &self,
        lemma_ids: &[i64],
        within: Option<&HashSet<i64>>,
    ) -> StorageResult<Vec<i64>> {
        if lemma_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; lemma_ids.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT page_id FROM index_entries WHERE lemma_id IN ({}) ORDER BY page_id",
            placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(lemma_ids.iter()), |row| row.get(0))?;

        let mut pages = Vec::new();
        for row in rows {
            let page_id: i64 = row?;
            if within.map_or(true, |subset| subset.contains(&page_id)) {
                pages.push(page_id);
            }
        }

        Ok(pages)
    }

    fn page_relevance(&self, page_id: i64) -> StorageResult<f64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(weight), 0) FROM index_entries WHERE page_id = ?1",
            params![page_id],
            |row| row.get(0),
        )?;
        Ok(total as f64)
    }

    fn frequency_mismatches(&self) -> StorageResult<Vec<FrequencyMismatch>> {
        let query = "
            SELECT l.id, l.site_id, l.lemma, l.frequency, COUNT(e.id) AS entries
            FROM lemmas l
            LEFT JOIN index_entries e ON e.lemma_id = l.id
            GROUP BY l.id
            HAVING l.frequency != COUNT(e.id)
            ORDER BY l.id
        ";

        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map([], |row| {
            Ok(FrequencyMismatch {
                lemma_id: row.get(0)?,
                site_id: row.get(1)?,
                lemma: row.get(2)?,
                frequency: row.get(3)?,
                entries: row.get(4)?,
            })
        })?;

        let mut mismatches = Vec::new();
        for row in rows {
            mismatches.push(row?);
        }

        Ok(mismatches)
    }
}
