mod config;
mod render;

use anyhow::{bail, Context};
use config::SimConfig;
use packsim_core::{
    BoosterError, BoosterModel, CardsByRarity, Collection, RandomSource, RateTable, RngState,
};
use packsim_data::{
    backup_path, hydrate, load_collection, save_collection, BoosterTable, PokemonTcg, SetCache,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: packsim <set> <packs> [--seed N] [--cache DIR] [--collection FILE] \
[--boosters FILE] [--html FILE] [--no-html] [--text FILE] [--legacy]";

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    set: String,
    packs: u32,
    seed: Option<u64>,
    cache_dir: Option<PathBuf>,
    collection: Option<PathBuf>,
    boosters: Option<PathBuf>,
    html: Option<PathBuf>,
    no_html: bool,
    text: Option<PathBuf>,
    legacy: bool,
}

impl CliOptions {
    fn apply(self, mut config: SimConfig) -> SimConfig {
        if let Some(dir) = self.cache_dir {
            config.cache_dir = dir;
        }
        if let Some(path) = self.collection {
            config.collection_path = path;
        }
        if let Some(path) = self.boosters {
            config.booster_table = path;
        }
        if self.no_html {
            config.html_path = None;
        } else if let Some(path) = self.html {
            config.html_path = Some(path);
        }
        if self.text.is_some() {
            config.text_path = self.text;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.legacy |= self.legacy;
        config
    }
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut positional: Vec<&str> = Vec::new();
    let mut seed = None;
    let mut cache_dir = None;
    let mut collection = None;
    let mut boosters = None;
    let mut html = None;
    let mut no_html = false;
    let mut text = None;
    let mut legacy = false;
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "--legacy" => legacy = true,
            "--no-html" => no_html = true,
            "--seed" | "--cache" | "--collection" | "--boosters" | "--html" | "--text" => {
                let Some(value) = args.get(idx + 1) else {
                    return Err(format!("{flag} needs a value"));
                };
                match flag {
                    "--seed" => {
                        seed = Some(
                            value
                                .parse::<u64>()
                                .map_err(|_| format!("invalid seed \"{value}\""))?,
                        )
                    }
                    "--cache" => cache_dir = Some(PathBuf::from(value)),
                    "--collection" => collection = Some(PathBuf::from(value)),
                    "--boosters" => boosters = Some(PathBuf::from(value)),
                    "--html" => html = Some(PathBuf::from(value)),
                    _ => text = Some(PathBuf::from(value)),
                }
                idx += 1;
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => positional.push(other),
        }
        idx += 1;
    }
    let [set, packs] = positional.as_slice() else {
        return Err(USAGE.to_string());
    };
    let packs = packs
        .parse::<u32>()
        .map_err(|_| format!("invalid pack count \"{packs}\""))?;
    Ok(CliOptions {
        set: set.to_string(),
        packs,
        seed,
        cache_dir,
        collection,
        boosters,
        html,
        no_html,
        text,
        legacy,
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return;
    }
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(options) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let set = options.set.clone();
    let packs = options.packs;
    let config = options.apply(SimConfig::from_env());

    let api_key = config
        .resolve_api_key()
        .with_context(|| format!("read {}", config.api_key_file.display()))?;
    if api_key.is_none() {
        info!("no api key configured, requests are rate limited more aggressively");
    }
    let boosters = BoosterTable::load(&config.booster_table)
        .with_context(|| format!("load {}", config.booster_table.display()))?;
    let mut cache = SetCache::new(&config.cache_dir, PokemonTcg::new(api_key), boosters);

    let by_rarity = CardsByRarity::partition(cache.set_cards(&set)?);
    if by_rarity.total() == 0 {
        bail!("set \"{set}\" has no cards that can appear in a booster");
    }
    let model = if config.legacy {
        BoosterModel::Legacy(RateTable::STANDARD)
    } else {
        BoosterModel::Slots(cache.set_booster(&set)?.clone())
    };

    let mut collection = load_collection(&config.collection_path)?;
    let mut rng = match config.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    info!(seed = rng.seed(), "opening {packs} packs of {set}");
    let opened = open_packs(&model, &by_rarity, packs, &mut rng, &mut collection);
    save_collection(&config.collection_path, &collection)?;
    if let Err(err) = &opened {
        warn!(
            opened = err.opened,
            "stopped early, packs opened so far were saved to {}",
            config.collection_path.display()
        );
    }
    opened?;
    info!(
        unique = collection.len(),
        total = collection.total_cards(),
        "collection saved to {}",
        config.collection_path.display()
    );

    if config.html_path.is_none() && config.text_path.is_none() {
        return Ok(());
    }
    let cards = hydrate(&collection, &mut cache)?;
    if let Some(path) = &config.html_path {
        write_with_backup(path, &render::render_html(&cards))?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = &config.text_path {
        write_with_backup(path, &render::render_text(&cards))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Error)]
#[error("pack {} of {requested} failed", .opened + 1)]
struct OpenError {
    opened: u32,
    requested: u32,
    #[source]
    source: BoosterError,
}

/// Adds each pack to the collection as it is opened, so a failure keeps every
/// pack before it.
fn open_packs<R: RandomSource + ?Sized>(
    model: &BoosterModel,
    by_rarity: &CardsByRarity,
    packs: u32,
    rng: &mut R,
    collection: &mut Collection,
) -> Result<(), OpenError> {
    for opened in 0..packs {
        let pack = model
            .open(by_rarity, rng)
            .map_err(|source| OpenError {
                opened,
                requested: packs,
                source,
            })?;
        collection.add_booster(&pack);
    }
    Ok(())
}

fn write_with_backup(path: &Path, body: &str) -> anyhow::Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).with_context(|| format!("backup {}", backup.display()))?;
    }
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsim_core::{BoosterConfig, Card, Rarity, SlotChance};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn positional_set_and_count() {
        let options = parse_cli_options(&args(&["sv3pt5", "12"])).expect("parse");
        assert_eq!(options.set, "sv3pt5");
        assert_eq!(options.packs, 12);
        assert_eq!(options.seed, None);
        assert!(!options.legacy);
    }

    #[test]
    fn flags_may_come_anywhere() {
        let options = parse_cli_options(&args(&[
            "--seed", "7", "MEW", "--legacy", "3", "--text", "out.txt",
        ]))
        .expect("parse");
        assert_eq!(options.set, "MEW");
        assert_eq!(options.packs, 3);
        assert_eq!(options.seed, Some(7));
        assert!(options.legacy);
        assert_eq!(options.text, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_cli_options(&args(&["sv1"])).is_err());
        assert!(parse_cli_options(&args(&["sv1", "-3"])).is_err());
        assert!(parse_cli_options(&args(&["sv1", "two"])).is_err());
        assert!(parse_cli_options(&args(&["sv1", "2", "--seed"])).is_err());
        assert!(parse_cli_options(&args(&["sv1", "2", "--bogus"])).is_err());
        assert!(parse_cli_options(&args(&["sv1", "2", "extra"])).is_err());
    }

    #[test]
    fn flags_override_config() {
        let options = parse_cli_options(&args(&[
            "sv1",
            "1",
            "--cache",
            "elsewhere",
            "--no-html",
            "--seed",
            "99",
        ]))
        .expect("parse");
        let config = options.apply(SimConfig::default());
        assert_eq!(config.cache_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.html_path, None);
        assert_eq!(config.seed, Some(99));
        assert_eq!(
            config.collection_path,
            PathBuf::from(config::DEFAULT_COLLECTION)
        );
    }

    /// Replays fixed rolls; indices always pick the first candidate.
    struct Rolls(Vec<f64>);

    impl RandomSource for Rolls {
        fn next_f64(&mut self) -> f64 {
            if self.0.is_empty() {
                0.0
            } else {
                self.0.remove(0)
            }
        }

        fn next_index(&mut self, _len: usize) -> usize {
            0
        }
    }

    #[test]
    fn failed_pack_keeps_earlier_ones() {
        let common = Card {
            id: "sv1-1".to_string(),
            set: "sv1".to_string(),
            set_code: None,
            number: 1,
            name: "Sprigatito".to_string(),
            rarity: Rarity::Common,
            image: String::new(),
        };
        let by_rarity = CardsByRarity::partition(&[common]);
        let model = BoosterModel::Slots(BoosterConfig::new(vec![vec![
            SlotChance::new(&[Rarity::HyperRare], 0.5, true),
            SlotChance::new(&[Rarity::Common], 0.5, true),
        ]]));
        let mut rolls = Rolls(vec![0.9, 0.8, 0.1, 0.9]);
        let mut collection = Collection::new();

        let err = open_packs(&model, &by_rarity, 4, &mut rolls, &mut collection)
            .expect_err("third pack has no hyper rare");
        assert_eq!(err.opened, 2);
        assert!(matches!(err.source, BoosterError::EmptyPool { slot: 0, .. }));
        assert_eq!(err.to_string(), "pack 3 of 4 failed");
        assert_eq!(collection.quantity("sv1-1"), 2);
    }

    #[test]
    fn outputs_keep_previous_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("collection.html");
        write_with_backup(&path, "first").expect("write");
        write_with_backup(&path, "second").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
        assert_eq!(
            fs::read_to_string(backup_path(&path)).expect("read"),
            "first"
        );
    }
}
