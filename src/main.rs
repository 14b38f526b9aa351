use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use leap::capability::Capabilities;
use leap::config::{Config, ExtensionDisplay, load_config, load_config_from};
use leap::executor::{LaunchOutcome, LaunchTarget, Launcher};
use leap::extensions::{self, FileManifestSource};
use leap::search::{Candidate, CandidateKind};
use leap::sources::{self, Source, desktop::DesktopSource, fixed::StaticSource};
use leap::state::{AppState, Message, MessageLevel};
use leap::store::Store;
use leap::tasks;
use leap::transliterate::Transliterator;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Rescan installed apps and reload extensions
    Scan,
    /// List every visible app, most used first
    Apps,
    /// Search apps and extensions
    Search {
        query: String,
        #[arg(long, conflicts_with = "exact")]
        fuzzy: bool,
        #[arg(long)]
        exact: bool,
    },
    /// Launch an app (by package) or extension (by id)
    Launch {
        key: String,
        /// Argument for the extension, e.g. a directory or a pid
        #[arg(long)]
        arg: Option<String>,
    },
    /// Manage star shortcuts
    Star {
        #[command(subcommand)]
        action: StarCmd,
    },
    /// Manage hidden entries
    Hide {
        #[command(subcommand)]
        action: HideCmd,
    },
    /// Launch counts per day, or per key for one day
    Usage {
        #[arg(long)]
        day: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
enum StarCmd {
    Add { key: String, keyword: String },
    Rm { key: String },
    List,
}

#[derive(Subcommand, Debug)]
enum HideCmd {
    Add { key: String },
    Rm { key: String },
    List,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let transliterator = Transliterator::with_overrides(&config.transliteration.overrides);

    // 2. Open Store
    let mut store = Store::open(&config.db_path())?;

    match args.command {
        Cmd::Scan => scan(&config, &transliterator)?,
        Cmd::Apps => {
            let state = AppState::load(&store, &config)?;
            for c in state.grid() {
                print_candidate(" ", &c, None, config.ui.show_usage_count);
            }
        }
        Cmd::Search { query, fuzzy, exact } => {
            let mut state = AppState::load(&store, &config)?;
            if fuzzy {
                state.set_fuzzy(true);
            } else if exact {
                state.set_fuzzy(false);
            }
            state.update_query(&query);
            print_results(&state, &config);
        }
        Cmd::Launch { key, arg } => launch(&config, &mut store, &key, arg.as_deref())?,
        Cmd::Star { action } => match action {
            StarCmd::Add { key, keyword } => {
                let star = store.insert_star(&key, &keyword)?;
                print_message(&Message::success(format!("Starred {} as '{}'", star.key, star.keyword)));
            }
            StarCmd::Rm { key } => {
                let Some(star) = store.list_stars()?.into_iter().find(|s| s.key == key) else {
                    bail!("{key} is not starred");
                };
                store.delete_star(&star)?;
                print_message(&Message::success(format!("Removed star '{}'", star.keyword)));
            }
            StarCmd::List => {
                for star in store.list_stars()? {
                    println!("{:<16} {}", star.keyword, star.key);
                }
            }
        },
        Cmd::Hide { action } => match action {
            HideCmd::Add { key } => {
                store.insert_hidden(&key)?;
                print_message(&Message::success(format!("Hid {key}")));
            }
            HideCmd::Rm { key } => {
                if !store.delete_hidden(&key)? {
                    print_message(&Message::warning(format!("{key} was not hidden")));
                }
            }
            HideCmd::List => {
                for hidden in store.list_hidden()? {
                    println!("{} {}", hidden.created_at.format("%Y-%m-%d"), hidden.key);
                }
            }
        },
        Cmd::Usage { day } => match day {
            Some(day) => {
                for (key, count) in store.keys_used_on(day)? {
                    println!("{count:>5} {key}");
                }
            }
            None => {
                for (day, count) in store.daily_counts()? {
                    println!("{day} {count:>5}");
                }
            }
        },
    }

    Ok(())
}

fn build_sources(config: &Config) -> Vec<Box<dyn Source + Send>> {
    let mut list: Vec<Box<dyn Source + Send>> =
        vec![Box::new(StaticSource::new(config.sources.items.clone()))];
    if config.sources.scan_desktop {
        let locale = std::env::var("LANG")
            .ok()
            .filter(|l| !l.is_empty() && l != "C" && l != "POSIX");
        list.push(Box::new(DesktopSource::new(&config.sources.desktop_dirs, locale)));
    }
    list
}

/// Rescan on a worker with its own store connection, like a loader thread
/// feeding the UI.
fn scan(config: &Config, transliterator: &Transliterator) -> Result<()> {
    let db_path = config.db_path();
    let manifest_path = config.manifest_path();
    let scan_sources = build_sources(config);
    let transliterator = transliterator.clone();

    let handle = tasks::spawn(move |token| -> leap::Result<(usize, usize)> {
        let mut store = Store::open(&db_path)?;
        let apps = sources::rescan(&scan_sources, &mut store, &transliterator)?;
        if token.is_cancelled() {
            return Ok((apps.len(), 0));
        }

        let installed: HashSet<String> = apps.iter().map(|a| a.package_name.clone()).collect();
        let loaded = extensions::load_extensions(&FileManifestSource::new(manifest_path), &transliterator);
        let usable = extensions::available(loaded, &installed);
        store.replace_extensions(&usable)?;
        Ok((apps.len(), usable.len()))
    });

    let Some(result) = handle.wait() else {
        bail!("scan was interrupted");
    };
    let (apps, exts) = result?;
    print_message(&Message::success(format!("Indexed {apps} apps and {exts} extensions")));
    Ok(())
}

fn launch(config: &Config, store: &mut Store, key: &str, arg: Option<&str>) -> Result<()> {
    let app = store.get_app(key)?;
    let extension = match &app {
        Some(_) => None,
        None => store.list_extensions()?.into_iter().find(|e| e.id == key),
    };
    let target = match (&app, &extension) {
        (Some(app), _) => LaunchTarget::App(app),
        (None, Some(ext)) => LaunchTarget::Extension(ext),
        (None, None) => bail!("no app or extension named {key}"),
    };

    let capabilities = Capabilities::default();
    let mut launcher = Launcher::new(config, store, &capabilities);
    match launcher.launch(target, arg) {
        Ok(outcome) => {
            if let LaunchOutcome::Files(items) = &outcome {
                for item in items {
                    let marker = if item.is_dir { "/" } else { "" };
                    println!("{}{}", item.name, marker);
                }
            }
            print_message(&outcome.message(target.label()));
            Ok(())
        }
        Err(e) => {
            print_message(&Message::error(e.to_string()));
            Err(e.into())
        }
    }
}

fn print_message(message: &Message) {
    match message.level {
        MessageLevel::Success => println!("{}", message.text),
        MessageLevel::Warning => eprintln!("warning: {}", message.text),
        MessageLevel::Error => eprintln!("error: {}", message.text),
    }
}

fn print_candidate(prefix: &str, c: &Candidate, score: Option<u32>, show_usage: bool) {
    let kind = match c.kind {
        CandidateKind::App => "app".to_string(),
        CandidateKind::Extension(kind) => kind.to_string(),
    };
    let mut line = format!("{prefix} {:<24} {:<36} [{kind}]", c.label, c.key);
    if let Some(score) = score {
        line.push_str(&format!(" score={score}"));
    }
    if show_usage {
        line.push_str(&format!(" used={}", c.priority));
    }
    println!("{line}");
}

fn print_results(state: &AppState, config: &Config) {
    let show_usage = config.ui.show_usage_count;
    let separate = config.ui.extension_display == ExtensionDisplay::Separate;
    let fuzzy = state.options().mode == leap::search::SearchMode::Fuzzy;
    let mut remaining = config.search.limit;

    for c in state.results.starred.iter().take(remaining) {
        print_candidate("*", c, None, show_usage);
    }
    remaining = remaining.saturating_sub(state.results.starred.len());

    let (apps, exts): (Vec<_>, Vec<_>) = state
        .results
        .ranked
        .iter()
        .partition(|r| !separate || r.candidate.kind == CandidateKind::App);

    for r in apps.iter().take(remaining) {
        print_candidate(" ", &r.candidate, fuzzy.then_some(r.score), show_usage);
    }
    remaining = remaining.saturating_sub(apps.len());

    if !exts.is_empty() && remaining > 0 {
        println!("-- extensions --");
        for r in exts.iter().take(remaining) {
            print_candidate(" ", &r.candidate, fuzzy.then_some(r.score), show_usage);
        }
    }
}
