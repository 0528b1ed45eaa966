use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loto_cli::analysis::compute_statistics;
use loto_cli::analysis::rank::classify;
use loto_cli::analysis::sampler::{generate_ticket, make_rng};
use loto_cli::config::{LotoConfig, resolve_config};
use loto_cli::display::{
    display_deviation_chart, display_draw_summary, display_draws, display_import_summary,
    display_outcome, display_stats, display_ticket,
};
use loto_cli::import;
use loto_db::db::{count_draws, fetch_draw, fetch_last_draws, fetch_window, migrate, open_db};
use loto_db::models::{DrawRecord, Ticket};
use loto_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "loto", about = "Simulateur de gains et statistiques du Loto FDJ")]
struct Cli {
    /// Fichier de configuration JSON (défaut : loto.json s'il existe)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis le fichier CSV de la FDJ
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long)]
        last: Option<u32>,
    },

    /// Jouer une grille aléatoire sur un tirage (le dernier par défaut)
    Simulate {
        /// Identifiant du tirage (ex: 2019123)
        #[arg(short, long)]
        draw: Option<String>,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Vérifier les gains d'une grille sur un tirage (le dernier par défaut)
    Check {
        /// 5 numéros (1-49)
        #[arg(num_args = 5, required = true)]
        numbers: Vec<u8>,

        /// Numéro chance (1-10)
        #[arg(short, long)]
        chance: u8,

        /// Identifiant du tirage (ex: 2019123)
        #[arg(short, long)]
        draw: Option<String>,
    },

    /// Afficher la fréquence et l'écart théorique de chaque boule
    Stats {
        /// Fenêtre d'analyse (nombre de tirages récents, tous par défaut)
        #[arg(short, long)]
        window: Option<u32>,

        /// Afficher le graphique des écarts
        #[arg(long)]
        chart: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref())?;
    let path = config.database_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &config, file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, config.effective_list_last(last)),
        Command::Simulate { draw, seed } => cmd_simulate(&conn, draw.as_deref(), seed),
        Command::Check { numbers, chance, draw } => {
            cmd_check(&conn, &numbers, chance, draw.as_deref())
        }
        Command::Stats { window, chart } => {
            cmd_stats(&conn, config.effective_stats_window(window), chart)
        }
    }
}

fn cmd_import(conn: &Connection, config: &LotoConfig, file: Option<PathBuf>) -> Result<()> {
    let file = config.effective_csv_file(file);
    let result = import::import_csv(conn, &file, config.delimiter_byte()?)?;
    display_import_summary(&result);
    Ok(())
}

fn ensure_not_empty(conn: &Connection) -> Result<u32> {
    let n = count_draws(conn)?;
    if n == 0 {
        bail!("Base vide. Lancez d'abord : loto import");
    }
    Ok(n)
}

fn select_draw(conn: &Connection, draw_id: Option<&str>) -> Result<DrawRecord> {
    ensure_not_empty(conn)?;
    match draw_id {
        Some(id) => fetch_draw(conn, id)?
            .with_context(|| format!("Tirage {id} introuvable en base")),
        None => fetch_last_draws(conn, 1)?
            .into_iter()
            .next()
            .context("Aucun tirage en base"),
    }
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    ensure_not_empty(conn)?;
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_simulate(conn: &Connection, draw_id: Option<&str>, seed: Option<u64>) -> Result<()> {
    let draw = select_draw(conn, draw_id)?;
    display_draw_summary(&draw);

    let mut rng = make_rng(seed);
    let ticket = generate_ticket(&mut rng)?;
    display_ticket(&ticket, "Votre grille Flash");

    let outcome = classify(&ticket, &draw)?;
    display_outcome(&outcome);
    Ok(())
}

fn cmd_check(conn: &Connection, numbers: &[u8], chance: u8, draw_id: Option<&str>) -> Result<()> {
    let ticket = Ticket::new(numbers, chance).context("Grille invalide")?;
    let draw = select_draw(conn, draw_id)?;
    display_draw_summary(&draw);
    display_ticket(&ticket, "Votre grille");

    let outcome = classify(&ticket, &draw).with_context(|| {
        format!("Impossible de calculer le gain sur le tirage {}", draw.draw_id())
    })?;
    display_outcome(&outcome);
    Ok(())
}

fn cmd_stats(conn: &Connection, window: Option<u32>, chart: bool) -> Result<()> {
    ensure_not_empty(conn)?;
    let draws = fetch_window(conn, window)?;

    let stats = compute_statistics(&draws, None)?;
    display_stats(&stats, draws.len());
    if chart {
        display_deviation_chart(&stats);
    }
    Ok(())
}
