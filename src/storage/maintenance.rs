//! Index maintenance primitives
//!
//! The only code that changes lemma frequencies. Both functions expect to run
//! inside a transaction opened by the caller.

use rusqlite::{params, Connection};

/// Records that `page_id` contains `lemma` `weight` times
///
/// The lemma row of the site is created with frequency 1 or has its
/// frequency incremented, then the index entry is inserted.
pub(crate) fn add_occurrence(
    conn: &Connection,
    site_id: i64,
    page_id: i64,
    lemma: &str,
    weight: u32,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 1)
         ON CONFLICT(site_id, lemma) DO UPDATE SET frequency = frequency + 1",
        params![site_id, lemma],
    )?;

    let lemma_id: i64 = conn.query_row(
        "SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
        params![site_id, lemma],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO index_entries (page_id, lemma_id, weight) VALUES (?1, ?2, ?3)",
        params![page_id, lemma_id, weight],
    )?;

    Ok(lemma_id)
}

/// Removes every occurrence recorded for a page, then the page row itself
///
/// Referenced lemmas lose one unit of frequency; lemmas left at zero are deleted.
///
/// # Returns
///
/// The number of index entries removed
pub(crate) fn remove_occurrences(conn: &Connection, page_id: i64) -> rusqlite::Result<usize> {
    let affected_lemmas: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT lemma_id FROM index_entries WHERE page_id = ?1")?;
        let rows = stmt.query_map(params![page_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    conn.execute(
        "UPDATE lemmas SET frequency = frequency - 1
         WHERE id IN (SELECT lemma_id FROM index_entries WHERE page_id = ?1)",
        params![page_id],
    )?;

    let removed = conn.execute(
        "DELETE FROM index_entries WHERE page_id = ?1",
        params![page_id],
    )?;

    for lemma_id in affected_lemmas {
        conn.execute(
            "DELETE FROM lemmas WHERE id = ?1 AND frequency <= 0",
            params![lemma_id],
        )?;
    }

    conn.execute("DELETE FROM pages WHERE id = ?1", params![page_id])?;

    Ok(removed)
}
