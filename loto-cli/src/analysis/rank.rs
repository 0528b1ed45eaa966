use loto_db::error::{LotoError, LotoResult};
use loto_db::models::{DrawRecord, PrizeOutcome, PrizeRank, Ticket};

/// Number of ticket balls found among the winning balls.
pub fn matched_balls(ticket: &Ticket, draw: &DrawRecord) -> usize {
    ticket
        .numbers()
        .iter()
        .filter(|n| draw.balls().contains(*n))
        .count()
}

/// Rank for a number of matched balls and a matched (or not) chance number.
///
/// Two or more balls give rank `12 - 2 * matched`; the chance number moves the
/// ticket up one rank, so a chance alone is worth rank 9.
pub fn rank_for(matched: usize, chance_matched: bool) -> PrizeRank {
    let base = match matched {
        2..=5 => 12 - 2 * matched as u8,
        _ => 10,
    };
    let rank = if chance_matched { base - 1 } else { base };
    PrizeRank::from_number(rank).unwrap_or(PrizeRank::NoPrize)
}

/// Prize won by `ticket` on `draw`.
pub fn classify(ticket: &Ticket, draw: &DrawRecord) -> LotoResult<PrizeOutcome> {
    let matched = matched_balls(ticket, draw);
    let chance_matched = ticket.chance() == draw.chance();
    let rank = rank_for(matched, chance_matched);

    tracing::debug!(
        draw_id = draw.draw_id(),
        matched,
        chance_matched,
        rank = ?rank.number(),
        "grille classée"
    );

    if !rank.is_paid() {
        return Ok(PrizeOutcome::no_prize());
    }
    let payout = draw.payout(rank).ok_or_else(|| {
        LotoError::DataIntegrity(format!(
            "le tirage {} n'a pas de rapport pour le rang {}",
            draw.draw_id(),
            rank
        ))
    })?;
    Ok(PrizeOutcome { rank, payout })
}
