use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{DrawRecord, PrizeRank};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_id       TEXT PRIMARY KEY,
    day           TEXT NOT NULL,
    date          TEXT NOT NULL,
    ball_1        INTEGER NOT NULL,
    ball_2        INTEGER NOT NULL,
    ball_3        INTEGER NOT NULL,
    ball_4        INTEGER NOT NULL,
    ball_5        INTEGER NOT NULL,
    chance        INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS prizes (
    draw_id       TEXT NOT NULL REFERENCES draws(draw_id),
    rank          INTEGER NOT NULL,
    winner_count  INTEGER,
    payout        REAL,
    PRIMARY KEY (draw_id, rank)
);
";

const DRAW_COLUMNS: &str =
    "draw_id, day, date, ball_1, ball_2, ball_3, ball_4, ball_5, chance";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("loto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Store a draw and its prize table. Returns `false` when the draw id is already known.
pub fn insert_draw(conn: &Connection, draw: &DrawRecord) -> Result<bool> {
    let balls = draw.balls();
    let changed = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO draws ({DRAW_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        rusqlite::params![
            draw.draw_id(),
            draw.day(),
            draw.date(),
            balls[0],
            balls[1],
            balls[2],
            balls[3],
            balls[4],
            draw.chance(),
        ],
    ).context("Échec de l'insertion")?;
    if changed == 0 {
        tracing::debug!(draw_id = draw.draw_id(), "tirage déjà présent");
        return Ok(false);
    }

    let mut stmt = conn.prepare(
        "INSERT INTO prizes (draw_id, rank, winner_count, payout) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for rank in PrizeRank::PAID {
        let (Some(n), Some(prize)) = (rank.number(), draw.prize(rank)) else {
            continue;
        };
        stmt.execute(rusqlite::params![draw.draw_id(), n, prize.winners, prize.payout])
            .with_context(|| format!("Échec de l'insertion du rang {n}"))?;
    }
    tracing::debug!(draw_id = draw.draw_id(), "tirage inséré");
    Ok(true)
}

struct DrawRow {
    draw_id: String,
    day: String,
    date: String,
    balls: [u8; 5],
    chance: u8,
}

fn read_draw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawRow> {
    Ok(DrawRow {
        draw_id: row.get(0)?,
        day: row.get(1)?,
        date: row.get(2)?,
        balls: [
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        chance: row.get(8)?,
    })
}

fn build_record(conn: &Connection, row: DrawRow) -> Result<DrawRecord> {
    let mut draw = DrawRecord::new(&row.draw_id, row.day, row.date, row.balls, row.chance)
        .with_context(|| format!("Tirage {} corrompu en base", row.draw_id))?;

    let mut stmt = conn.prepare_cached(
        "SELECT rank, winner_count, payout FROM prizes WHERE draw_id = ?1 ORDER BY rank",
    )?;
    let prizes = stmt
        .query_map([&row.draw_id], |r| {
            Ok((
                r.get::<_, u8>(0)?,
                r.get::<_, Option<u32>>(1)?,
                r.get::<_, Option<f64>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (n, winners, payout) in prizes {
        let Some(rank) = PrizeRank::from_number(n) else {
            tracing::warn!(draw_id = %row.draw_id, rank = n, "rang inconnu ignoré");
            continue;
        };
        draw = draw
            .with_prize(rank, winners, payout)
            .with_context(|| format!("Rang {n} du tirage {} corrompu en base", row.draw_id))?;
    }
    Ok(draw)
}

/// Most recent draws first.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DRAW_COLUMNS} FROM draws ORDER BY draw_id DESC LIMIT ?1"
    ))?;
    let rows = stmt
        .query_map([limit], read_draw_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(|row| build_record(conn, row)).collect()
}

/// The `window` most recent draws, or every draw when `None`.
pub fn fetch_window(conn: &Connection, window: Option<u32>) -> Result<Vec<DrawRecord>> {
    let limit = match window {
        Some(w) => w,
        None => count_draws(conn)?,
    };
    fetch_last_draws(conn, limit)
}

pub fn fetch_draw(conn: &Connection, draw_id: &str) -> Result<Option<DrawRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {DRAW_COLUMNS} FROM draws WHERE draw_id = ?1"),
            [draw_id],
            read_draw_row,
        )
        .optional()?;
    row.map(|row| build_record(conn, row)).transpose()
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(id: &str) -> DrawRecord {
        DrawRecord::new(id, "MERCREDI", "01/01/2020", [5, 4, 3, 2, 1], 7)
            .unwrap()
            .with_prize(PrizeRank::FiveAndChance, Some(0), Some(2_000_000.0))
            .unwrap()
            .with_prize(PrizeRank::Four, Some(812), None)
            .unwrap()
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw("2020001")).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = memory_db();

        let inserted = insert_draw(&conn, &test_draw("2020001")).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw("2020001")).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = memory_db();

        insert_draw(&conn, &test_draw("2020001")).unwrap();
        insert_draw(&conn, &test_draw("2020003")).unwrap();
        insert_draw(&conn, &test_draw("2020002")).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].draw_id(), "2020003");
        assert_eq!(draws[1].draw_id(), "2020002");
        assert_eq!(draws[2].draw_id(), "2020001");

        assert_eq!(fetch_last_draws(&conn, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_prizes_roundtrip() {
        let conn = memory_db();
        let original = test_draw("2020001");
        insert_draw(&conn, &original).unwrap();

        let fetched = fetch_draw(&conn, "2020001").unwrap().unwrap();
        assert_eq!(fetched, original);
        assert_eq!(fetched.payout(PrizeRank::Four), None);
        assert_eq!(fetched.winners(PrizeRank::Four), Some(812));
        assert!(fetched.prize(PrizeRank::Two).is_none());
    }

    #[test]
    fn test_fetch_window() {
        let conn = memory_db();
        for id in ["2020001", "2020002", "2020003"] {
            insert_draw(&conn, &test_draw(id)).unwrap();
        }

        let all = fetch_window(&conn, None).unwrap();
        assert_eq!(all.len(), 3);

        let recent = fetch_window(&conn, Some(2)).unwrap();
        let ids: Vec<&str> = recent.iter().map(|d| d.draw_id()).collect();
        assert_eq!(ids, vec!["2020003", "2020002"]);

        assert_eq!(fetch_window(&conn, Some(50)).unwrap().len(), 3);
        assert!(fetch_window(&conn, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_unknown_draw() {
        let conn = memory_db();
        assert!(fetch_draw(&conn, "1999001").unwrap().is_none());
    }
}
