use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use loto_db::rusqlite::Connection;
use std::path::Path;

use loto_db::db::insert_draw;
use loto_db::parse::{RawRow, parse_row};

/// CSV record addressed by header name.
pub struct CsvRow<'a> {
    headers: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl<'a> CsvRow<'a> {
    pub fn new(headers: &'a csv::StringRecord, record: &'a csv::StringRecord) -> Self {
        Self { headers, record }
    }
}

impl RawRow for CsvRow<'_> {
    fn field(&self, name: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h.trim() == name)?;
        self.record.get(idx)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path, delimiter: u8) -> Result<ImportResult> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    tracing::info!(path = %path.display(), "import du fichier");
    import_reader(conn, reader)
}

/// Parse and store every row; bad rows are logged and counted, not fatal.
pub fn import_reader<R: std::io::Read>(
    conn: &Connection,
    mut reader: csv::Reader<R>,
) -> Result<ImportResult> {
    let headers = reader
        .headers()
        .context("Impossible de lire l'en-tête CSV")?
        .clone();

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} lignes {msg}")
        .context("Gabarit de progression invalide")?);

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        pb.inc(1);
        let line = result.total_records;
        match record_result {
            Ok(record) => {
                match parse_row(&CsvRow::new(&headers, &record)) {
                    Ok(draw) => {
                        match insert_draw(&tx, &draw) {
                            Ok(true) => result.inserted += 1,
                            Ok(false) => result.skipped += 1,
                            Err(e) => {
                                tracing::warn!(line, error = %e, "erreur insertion tirage");
                                result.errors += 1;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(line, error = %e, "erreur parsing ligne");
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(line, error = %e, "erreur lecture ligne");
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    pb.finish_and_clear();
    tracing::info!(
        total = result.total_records,
        inserted = result.inserted,
        skipped = result.skipped,
        errors = result.errors,
        "import terminé"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loto_db::db::{count_draws, fetch_draw, migrate};
    use loto_db::models::PrizeRank;

    const HEADER: &str = concat!(
        "annee_numero_de_tirage;jour_de_tirage;date_de_tirage;",
        "boule_1;boule_2;boule_3;boule_4;boule_5;numero_chance;",
        "combinaison_gagnante_en_ordre_croissant;",
        "nombre_de_gagnant_au_rang1;rapport_du_rang1;",
        "nombre_de_gagnant_au_rang2;rapport_du_rang2;",
        "nombre_de_gagnant_au_rang3;rapport_du_rang3;",
        "nombre_de_gagnant_au_rang4;rapport_du_rang4;",
        "nombre_de_gagnant_au_rang5;rapport_du_rang5;",
        "nombre_de_gagnant_au_rang6;rapport_du_rang6;",
        "nombre_de_gagnant_au_rang7;rapport_du_rang7;",
        "nombre_de_gagnant_au_rang8;rapport_du_rang8;",
        "nombre_de_gagnant_au_rang9;rapport_du_rang9",
    );

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    fn reader(text: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(text.as_bytes())
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    const ROW_A: &str = concat!(
        "2019123;SAMEDI;19/10/2019;12;3;45;27;8;6;3-8-12-27-45+6;",
        "0;2000000,00;2;104622,30;6;1313,20;187;592,30;570;48,70;",
        "10150;20,80;5928;10,60;75540;5,00;396812;2,20",
    );
    const ROW_B: &str = concat!(
        "2019122;MERCREDI;16/10/2019;1;2;3;4;5;7;1-2-3-4-5+7;",
        "1;4000000,00;0;0;3;1000,00;100;500,00;500;50,00;",
        "9000;20,00;6000;10,00;70000;5,00;400000;2,20",
    );

    #[test]
    fn test_csv_row_lookup() {
        let text = csv_text(&[ROW_A]);
        let mut rdr = reader(&text);
        let headers = rdr.headers().unwrap().clone();
        let record = rdr.records().next().unwrap().unwrap();
        let row = CsvRow::new(&headers, &record);
        assert_eq!(row.field("boule_3"), Some("45"));
        assert_eq!(row.field("numero_chance"), Some("6"));
        assert_eq!(row.field("inconnu"), None);
    }

    #[test]
    fn test_import_rows() {
        let conn = memory_db();
        let result = import_reader(&conn, reader(&csv_text(&[ROW_A, ROW_B]))).unwrap();
        assert_eq!(result, ImportResult { total_records: 2, inserted: 2, skipped: 0, errors: 0 });
        assert_eq!(count_draws(&conn).unwrap(), 2);

        let draw = fetch_draw(&conn, "2019123").unwrap().unwrap();
        assert_eq!(draw.balls(), &[3, 8, 12, 27, 45]);
        assert!((draw.payout(PrizeRank::Four).unwrap() - 592.3).abs() < 1e-9);
        assert_eq!(draw.winners(PrizeRank::ChanceOnly), Some(396812));
    }

    #[test]
    fn test_import_skips_duplicates_and_counts_errors() {
        let conn = memory_db();
        let bad = "2019121;LUNDI;14/10/2019;1;1;3;4;5;7";
        let result = import_reader(&conn, reader(&csv_text(&[ROW_A, ROW_A, bad]))).unwrap();
        assert_eq!(result, ImportResult { total_records: 3, inserted: 1, skipped: 1, errors: 1 });
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }
}
