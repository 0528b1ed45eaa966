use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, RngExt, SeedableRng};

use loto_db::error::LotoResult;
use loto_db::models::{Pool, Ticket};

/// Seeded generator when `seed` is given, otherwise seeded from the thread RNG.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Uniform random grid: 5 distinct balls out of 49, one chance number out of 10.
pub fn generate_ticket(rng: &mut impl Rng) -> LotoResult<Ticket> {
    let mut balls = [0u8; 5];
    let picks = index::sample(rng, Pool::Balls.size(), Pool::Balls.pick_count());
    for (slot, idx) in balls.iter_mut().zip(picks.into_iter()) {
        *slot = idx as u8 + 1;
    }
    let chance = rng.random_range(1..=Pool::Chance.size() as u8);
    Ticket::new(&balls, chance)
}
