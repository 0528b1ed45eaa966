pub mod rank;
pub mod sampler;

use rayon::prelude::*;

use loto_db::error::{LotoError, LotoResult};
use loto_db::models::{DrawRecord, NumberStatistic, Pool};

/// Probability that a given ball shows up in a 5-of-49 draw without replacement.
/// Kept as the explicit sum rather than `5.0 / 49.0`.
pub const EXPECTED_FREQUENCY: f64 = 1.0 / 49.0 + 1.0 / 48.0 + 1.0 / 47.0 + 1.0 / 46.0 + 1.0 / 45.0;

/// Frequency and deviation of every ball over the first `window` draws (all when `None`),
/// coldest first.
///
/// `draws` is taken in caller order; `gap` counts draws before the first one containing
/// the number, so it reads as "draws since last seen" when the most recent draw comes first.
pub fn compute_statistics(
    draws: &[DrawRecord],
    window: Option<usize>,
) -> LotoResult<Vec<NumberStatistic>> {
    let considered = match window {
        Some(w) => &draws[..w.min(draws.len())],
        None => draws,
    };
    if considered.is_empty() {
        return Err(LotoError::InvalidInput(
            "aucun tirage dans la fenêtre d'analyse".to_string(),
        ));
    }

    let total = considered.len() as f64;
    let pool_size = Pool::Balls.size() as u8;

    let mut stats: Vec<NumberStatistic> = (1..=pool_size)
        .into_par_iter()
        .map(|n| {
            let appearances = considered
                .iter()
                .filter(|draw| Pool::Balls.numbers_from(draw).contains(&n))
                .count() as u32;
            let gap = considered
                .iter()
                .position(|draw| Pool::Balls.numbers_from(draw).contains(&n))
                .unwrap_or(considered.len()) as u32;
            let frequency = f64::from(appearances) / total;
            NumberStatistic {
                number: n,
                appearances,
                gap,
                frequency,
                deviation: frequency - EXPECTED_FREQUENCY,
            }
        })
        .collect();

    stats.sort_by(|a, b| a.deviation.total_cmp(&b.deviation));

    tracing::debug!(
        draws = considered.len(),
        coldest = stats.first().map(|s| s.number),
        hottest = stats.last().map(|s| s.number),
        "statistiques calculées"
    );
    Ok(stats)
}
