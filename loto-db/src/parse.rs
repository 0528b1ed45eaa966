//! Typed parsing of FDJ Loto result rows.
//!
//! A row is anything that maps a column name to its raw string value
//! ([`RawRow`]). Every column read here has a declared name, type and range;
//! the first violation aborts the row with [`LotoError::Parse`].

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::{LotoError, LotoResult};
use crate::models::{DrawRecord, Pool, PrizeRank};

pub const FIELD_DRAW_ID: &str = "annee_numero_de_tirage";
pub const FIELD_DAY: &str = "jour_de_tirage";
pub const FIELD_DATE: &str = "date_de_tirage";
pub const FIELD_CHANCE: &str = "numero_chance";

pub fn ball_field(i: usize) -> String {
    format!("boule_{i}")
}

pub fn winners_field(rank: u8) -> String {
    format!("nombre_de_gagnant_au_rang{rank}")
}

pub fn payout_field(rank: u8) -> String {
    format!("rapport_du_rang{rank}")
}

/// Named-field access to one raw data row.
pub trait RawRow {
    fn field(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> RawRow for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl RawRow for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Decimal with either `,` or `.` as separator. Empty input is `None`.
pub fn parse_french_decimal(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let normalized = s.replace(',', ".");
    normalized
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("impossible de parser le nombre '{s}'"))
}

fn required<'a>(row: &'a impl RawRow, name: &str) -> LotoResult<&'a str> {
    row.field(name)
        .map(str::trim)
        .ok_or_else(|| LotoError::parse(name, "champ manquant"))
}

fn optional<'a>(row: &'a impl RawRow, name: &str) -> Option<&'a str> {
    row.field(name).map(str::trim).filter(|s| !s.is_empty())
}

fn number_in_pool(row: &impl RawRow, name: &str, pool: Pool) -> LotoResult<u8> {
    let raw = required(row, name)?;
    let n: u8 = raw
        .parse()
        .map_err(|_| LotoError::parse(name, format!("'{raw}' n'est pas un entier")))?;
    if !pool.contains(n) {
        return Err(LotoError::parse(
            name,
            format!("valeur {n} hors limites (1-{})", pool.size()),
        ));
    }
    Ok(n)
}

fn winners(row: &impl RawRow, rank: u8) -> LotoResult<Option<u32>> {
    let name = winners_field(rank);
    optional(row, &name)
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| {
                LotoError::parse(&name, format!("'{raw}' n'est pas un entier positif"))
            })
        })
        .transpose()
}

fn payout(row: &impl RawRow, rank: u8) -> LotoResult<Option<f64>> {
    let name = payout_field(rank);
    let Some(raw) = optional(row, &name) else {
        return Ok(None);
    };
    let value = parse_french_decimal(raw).map_err(|reason| LotoError::parse(&name, reason))?;
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            return Err(LotoError::parse(&name, format!("rapport {v} négatif ou invalide")));
        }
    }
    Ok(value)
}

/// Build a [`DrawRecord`] from one raw row.
pub fn parse_row(row: &impl RawRow) -> LotoResult<DrawRecord> {
    let draw_id = required(row, FIELD_DRAW_ID)?;
    if draw_id.is_empty() {
        return Err(LotoError::parse(FIELD_DRAW_ID, "identifiant vide"));
    }
    let day = required(row, FIELD_DAY)?;
    let date = required(row, FIELD_DATE)?;

    let mut balls = [0u8; 5];
    for i in 0..balls.len() {
        let name = ball_field(i + 1);
        let n = number_in_pool(row, &name, Pool::Balls)?;
        if let Some(first) = balls_seen(&balls[..i], n) {
            return Err(LotoError::parse(
                &name,
                format!("boule {n} déjà présente dans {}", ball_field(first + 1)),
            ));
        }
        balls[i] = n;
    }
    let chance = number_in_pool(row, FIELD_CHANCE, Pool::Chance)?;

    let mut draw = DrawRecord::new(draw_id, day, date, balls, chance)?;
    for rank in PrizeRank::PAID {
        let Some(n) = rank.number() else { continue };
        draw = draw.with_prize(rank, winners(row, n)?, payout(row, n)?)?;
    }
    Ok(draw)
}

fn balls_seen(previous: &[u8], n: u8) -> Option<usize> {
    previous.iter().position(|&b| b == n)
}
