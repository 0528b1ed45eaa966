use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::Plot;

use crate::import::ImportResult;
use loto_db::models::{DrawRecord, NumberStatistic, Pool, PrizeOutcome, PrizeRank, Ticket};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn format_payout(payout: Option<f64>) -> String {
    match payout {
        Some(p) => format!("{:.2} €", p),
        None => "—".to_string(),
    }
}

/// Winning combination as `balls + chance`.
pub fn format_combination(draw: &DrawRecord) -> String {
    format!(
        "{} + {}",
        format_numbers(Pool::Balls.numbers_from(draw)),
        format_numbers(Pool::Chance.numbers_from(draw)).trim_start()
    )
}

fn format_winners(winners: Option<u32>) -> String {
    winners.map_or_else(|| "—".to_string(), |w| w.to_string())
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec![
        "Tirage", "Date", "Jour", "Boules", "Chance", "Gagnants R1", "Rapport R1",
    ]);

    for draw in draws {
        table.add_row(vec![
            draw.draw_id().to_string(),
            draw.date().to_string(),
            draw.day().to_string(),
            format_numbers(Pool::Balls.numbers_from(draw)),
            format_numbers(Pool::Chance.numbers_from(draw)),
            format_winners(draw.winners(PrizeRank::FiveAndChance)),
            format_payout(draw.payout(PrizeRank::FiveAndChance)),
        ]);
    }

    println!("{table}");
}

/// Draw header and its full prize table.
pub fn display_draw_summary(draw: &DrawRecord) {
    println!("\nTirage #{} - {} - {}", draw.draw_id(), draw.date(), draw.day());
    println!("Combinaison gagnante : {}", format_combination(draw));

    let mut table = new_table(vec!["Rang", "Gagnants", "Rapport"]);
    for rank in PrizeRank::PAID {
        let prize = draw.prize(rank).copied().unwrap_or_default();
        table.add_row(vec![
            rank.to_string(),
            format_winners(prize.winners),
            format_payout(prize.payout),
        ]);
    }
    println!("{table}");
}

pub fn display_ticket(ticket: &Ticket, title: &str) {
    println!("\n{title}");
    println!("=> {} + {}", format_numbers(ticket.numbers()), ticket.chance());
}

pub fn display_outcome(outcome: &PrizeOutcome) {
    match outcome.rank {
        PrizeRank::NoPrize => println!("\nPerdu : cette grille ne rapporte rien (0,00 €)."),
        rank => println!(
            "\nRang {} : cette grille rapporte {}",
            rank,
            format_payout(Some(outcome.payout))
        ),
    }
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

/// Statistics in the order given (coldest first).
pub fn display_stats(stats: &[NumberStatistic], window: usize) {
    println!("\n📊 Statistiques des boules sur {} tirages\n", window);

    let mut table = new_table(vec!["Boule", "Apparitions", "Fréquence", "Écart", "Retard"]);

    for stat in stats {
        let color = if stat.deviation > 0.0 {
            Color::Red
        } else if stat.deviation < 0.0 {
            Color::Blue
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(stat.appearances),
            Cell::new(format!("{:.6}", stat.frequency)),
            Cell::new(format!("{:+.6}", stat.deviation)).fg(color),
            Cell::new(stat.gap),
        ]);
    }
    println!("{table}");
}

/// Deviation per ball number, as a bar chart.
pub fn display_deviation_chart(stats: &[NumberStatistic]) {
    if stats.is_empty() {
        println!("  (Pas de données à afficher)");
        return;
    }
    let mut points: Vec<(f32, f32)> = stats
        .iter()
        .map(|s| (f32::from(s.number), s.deviation as f32))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    println!("\n== Écart à la fréquence théorique par boule ==\n");
    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new(120, 40, 0.0, 50.0);
    println!("{}", chart.lineplot(&shape));
}
