use std::collections::BTreeMap;

use crate::error::{LotoError, LotoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Balls,
    Chance,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Balls => 49,
            Pool::Chance => 10,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Pool::Balls => 5,
            Pool::Chance => 1,
        }
    }

    pub fn contains(&self, n: u8) -> bool {
        n >= 1 && usize::from(n) <= self.size()
    }

    pub fn numbers_from<'a>(&self, draw: &'a DrawRecord) -> &'a [u8] {
        match self {
            Pool::Balls => &draw.balls,
            Pool::Chance => std::slice::from_ref(&draw.chance),
        }
    }
}

/// Prize tier, best first. `NoPrize` has no numeric rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrizeRank {
    FiveAndChance,
    Five,
    FourAndChance,
    Four,
    ThreeAndChance,
    Three,
    TwoAndChance,
    Two,
    ChanceOnly,
    NoPrize,
}

impl PrizeRank {
    /// Every paid tier, rank 1 to 9.
    pub const PAID: [PrizeRank; 9] = [
        PrizeRank::FiveAndChance,
        PrizeRank::Five,
        PrizeRank::FourAndChance,
        PrizeRank::Four,
        PrizeRank::ThreeAndChance,
        PrizeRank::Three,
        PrizeRank::TwoAndChance,
        PrizeRank::Two,
        PrizeRank::ChanceOnly,
    ];

    pub fn from_number(rank: u8) -> Option<PrizeRank> {
        match rank {
            1..=9 => Some(Self::PAID[usize::from(rank - 1)]),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            PrizeRank::FiveAndChance => Some(1),
            PrizeRank::Five => Some(2),
            PrizeRank::FourAndChance => Some(3),
            PrizeRank::Four => Some(4),
            PrizeRank::ThreeAndChance => Some(5),
            PrizeRank::Three => Some(6),
            PrizeRank::TwoAndChance => Some(7),
            PrizeRank::Two => Some(8),
            PrizeRank::ChanceOnly => Some(9),
            PrizeRank::NoPrize => None,
        }
    }

    /// Matched balls + matched chance, as printed on FDJ result sheets.
    pub fn label(&self) -> &'static str {
        match self {
            PrizeRank::FiveAndChance => "5+1",
            PrizeRank::Five => "5+0",
            PrizeRank::FourAndChance => "4+1",
            PrizeRank::Four => "4+0",
            PrizeRank::ThreeAndChance => "3+1",
            PrizeRank::Three => "3+0",
            PrizeRank::TwoAndChance => "2+1",
            PrizeRank::Two => "2+0",
            PrizeRank::ChanceOnly => "1+1 / 0+1",
            PrizeRank::NoPrize => "—",
        }
    }

    pub fn is_paid(&self) -> bool {
        *self != PrizeRank::NoPrize
    }
}

impl std::fmt::Display for PrizeRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.number() {
            Some(n) => write!(f, "{} ({})", n, self.label()),
            None => write!(f, "Perdu"),
        }
    }
}

/// Winner count and payout of one rank. Either may be missing from the source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrizeRow {
    pub winners: Option<u32>,
    pub payout: Option<f64>,
}

/// One historical draw. Built through [`DrawRecord::new`], never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    draw_id: String,
    day: String,
    date: String,
    balls: [u8; 5],
    chance: u8,
    prizes: BTreeMap<PrizeRank, PrizeRow>,
}

impl DrawRecord {
    pub fn new(
        draw_id: impl Into<String>,
        day: impl Into<String>,
        date: impl Into<String>,
        mut balls: [u8; 5],
        chance: u8,
    ) -> LotoResult<Self> {
        validate_draw(&balls, chance)?;
        balls.sort_unstable();
        Ok(Self {
            draw_id: draw_id.into(),
            day: day.into(),
            date: date.into(),
            balls,
            chance,
            prizes: BTreeMap::new(),
        })
    }

    /// Attach the winner count and payout of a paid rank.
    pub fn with_prize(
        mut self,
        rank: PrizeRank,
        winners: Option<u32>,
        payout: Option<f64>,
    ) -> LotoResult<Self> {
        if !rank.is_paid() {
            return Err(LotoError::InvalidInput(
                "aucun gain ne peut être associé au rang « perdu »".to_string(),
            ));
        }
        if let Some(p) = payout {
            if !p.is_finite() || p < 0.0 {
                return Err(LotoError::InvalidInput(format!(
                    "rapport {} invalide pour le rang {}",
                    p, rank
                )));
            }
        }
        if winners.is_some() || payout.is_some() {
            self.prizes.insert(rank, PrizeRow { winners, payout });
        }
        Ok(self)
    }

    pub fn draw_id(&self) -> &str {
        &self.draw_id
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Winning balls, ascending.
    pub fn balls(&self) -> &[u8; 5] {
        &self.balls
    }

    pub fn chance(&self) -> u8 {
        self.chance
    }

    pub fn payout(&self, rank: PrizeRank) -> Option<f64> {
        self.prizes.get(&rank).and_then(|row| row.payout)
    }

    pub fn winners(&self, rank: PrizeRank) -> Option<u32> {
        self.prizes.get(&rank).and_then(|row| row.winners)
    }

    pub fn prize(&self, rank: PrizeRank) -> Option<&PrizeRow> {
        self.prizes.get(&rank)
    }
}

/// A player's grid. Built through [`Ticket::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    numbers: [u8; 5],
    chance: u8,
}

impl Ticket {
    pub fn new(numbers: &[u8], chance: u8) -> LotoResult<Self> {
        let mut balls: [u8; 5] = numbers.try_into().map_err(|_| {
            LotoError::InvalidInput(format!(
                "une grille contient exactement {} numéros, reçu {}",
                Pool::Balls.pick_count(),
                numbers.len()
            ))
        })?;
        validate_draw(&balls, chance)?;
        balls.sort_unstable();
        Ok(Self {
            numbers: balls,
            chance,
        })
    }

    /// Ticket numbers, ascending.
    pub fn numbers(&self) -> &[u8; 5] {
        &self.numbers
    }

    pub fn chance(&self) -> u8 {
        self.chance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrizeOutcome {
    pub rank: PrizeRank,
    pub payout: f64,
}

impl PrizeOutcome {
    pub fn no_prize() -> Self {
        Self {
            rank: PrizeRank::NoPrize,
            payout: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberStatistic {
    pub number: u8,
    pub appearances: u32,
    /// Draws before the first one containing the number.
    pub gap: u32,
    pub frequency: f64,
    pub deviation: f64,
}

pub fn validate_draw(balls: &[u8], chance: u8) -> LotoResult<()> {
    if balls.len() != Pool::Balls.pick_count() {
        return Err(LotoError::InvalidInput(format!(
            "{} boules attendues, reçu {}",
            Pool::Balls.pick_count(),
            balls.len()
        )));
    }
    for &b in balls {
        if !Pool::Balls.contains(b) {
            return Err(LotoError::InvalidInput(format!(
                "Boule {} hors limites (1-{})",
                b,
                Pool::Balls.size()
            )));
        }
    }
    if !Pool::Chance.contains(chance) {
        return Err(LotoError::InvalidInput(format!(
            "Numéro chance {} hors limites (1-{})",
            chance,
            Pool::Chance.size()
        )));
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                return Err(LotoError::InvalidInput(format!(
                    "Boule en double : {}",
                    balls[i]
                )));
            }
        }
    }
    Ok(())
}
