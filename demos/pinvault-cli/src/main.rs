/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![warn(rust_2018_idioms)]

mod clipboard;
mod screen;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clipboard::SystemClipboard;
use dialoguer::{Confirm, Input, Password};
use pinvault::{
    App, Clipboard, RecordEntry, Screen, Signal, VaultConfig, VaultStore, PIN_LENGTH,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Directory holding the vault file (defaults to ~/.pinvault)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the location of the vault file
    Path,
    /// Change the unlock PIN
    SetPin,
}

/// One line typed at the vault prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Click on the n-th row (1-based, as displayed)
    Select(usize),
    List,
    Search,
    Add,
    Delete,
    Path,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return (n > 0).then_some(Command::Select(n));
    }
    Some(match line.to_ascii_lowercase().as_str() {
        "l" | "list" => Command::List,
        "s" | "search" => Command::Search,
        "a" | "add" => Command::Add,
        "d" | "delete" => Command::Delete,
        "p" | "path" => Command::Path,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    })
}

const HELP: &str = "\
  <n>  select row n (again: copy the password, a third time: deselect)
  l    list all records
  s    search by name or login
  a    add a record
  d    delete the selected record
  p    show where the vault file is
  h    this help
  q    quit";

fn init_logging(cli: &Cli) {
    // The binary and the library share the `pinvault` target.
    let log_filter = if cli.verbose {
        "pinvault=trace"
    } else {
        "pinvault=info"
    };
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", log_filter));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match &cli.data_dir {
        Some(dir) => VaultConfig::with_dir(dir),
        None => VaultConfig::default_location()?,
    };
    let store = Arc::new(VaultStore::from_config(&config)?);
    store
        .initialize()
        .with_context(|| format!("Failed to open the vault at {}", config.path().display()))?;

    match cli.command {
        Some(Commands::Path) => {
            println!("{}", config.path().display());
            Ok(())
        }
        Some(Commands::SetPin) => set_pin(&store),
        None => run(store),
    }
}

fn set_pin(store: &VaultStore) -> Result<()> {
    let mut settings = store.get_settings()?;
    let current = Password::new().with_prompt("Current PIN").interact()?;
    if !settings.pin_matches(&current) {
        bail!("Incorrect PIN");
    }
    settings.pin = Password::new()
        .with_prompt(format!("New {PIN_LENGTH}-digit PIN"))
        .with_confirmation("Confirm new PIN", "PINs don't match")
        .interact()?;
    store.set_settings(settings)?;
    log::info!("PIN changed");
    Ok(())
}

fn run(store: Arc<VaultStore>) -> Result<()> {
    log::debug!("web_mode = {}", store.get_settings()?.web_mode);
    let mut app = App::new(store, SystemClipboard::new());
    unlock(&mut app)?;
    redraw(&app);
    println!("Type h for help");

    loop {
        let line: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            println!("Unknown command {:?}, type h for help", line.trim());
            continue;
        };
        match command {
            Command::Select(n) => match select_row(&mut app, n) {
                Some(signal) => screen::show_signal(signal),
                None => println!("There is no row {n}"),
            },
            Command::List => {
                app.request_list();
                app.clear_filter();
            }
            Command::Search => search(&mut app)?,
            Command::Add => add(&mut app)?,
            Command::Delete => {
                let signal = app.delete_selected(|record| {
                    let question = format!(
                        "Do you really want to delete this record? ({})",
                        record.name
                    );
                    match Confirm::new().with_prompt(question).default(false).interact() {
                        Ok(answer) => answer,
                        Err(e) => {
                            log::warn!("Prompt failed, not deleting: {}", e);
                            false
                        }
                    }
                });
                if let Some(signal) = signal {
                    screen::show_signal(signal);
                }
            }
            Command::Path => match app.store().path() {
                Some(path) => println!("{}", path.display()),
                None => println!("(in memory)"),
            },
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => return Ok(()),
        }
        redraw(&app);
    }
}

fn unlock(app: &mut App<SystemClipboard>) -> Result<()> {
    while app.is_locked() {
        let pin = Password::new()
            .with_prompt(format!("PIN ({PIN_LENGTH} digits)"))
            .allow_empty_password(true)
            .interact()?;
        let signal = app.submit_pin(pin.trim());
        screen::show_signal(signal);
    }
    Ok(())
}

/// Click on the n-th row shown. `None` if there is no such row.
fn select_row<C: Clipboard>(app: &mut App<C>, n: usize) -> Option<Signal> {
    let records = match app.records() {
        Ok(records) => records,
        // Already logged by the store.
        Err(_) => return Some(Signal::Failure),
    };
    let id = records.get(n.checked_sub(1)?)?.id.clone();
    Some(app.select(&id))
}

fn search(app: &mut App<SystemClipboard>) -> Result<()> {
    app.request_search();
    redraw(app);
    let text: String = Input::new()
        .with_prompt("Filter")
        .with_initial_text(app.filter())
        .allow_empty(true)
        .interact_text()?;
    screen::search_progress();
    let signal = app.apply_filter(text.trim());
    screen::show_signal(signal);
    Ok(())
}

fn add(app: &mut App<SystemClipboard>) -> Result<()> {
    app.request_add();
    redraw(app);
    loop {
        let current = app.form().entry();
        let name: String = Input::new()
            .with_prompt("Name")
            .with_initial_text(current.name)
            .allow_empty(true)
            .interact_text()?;
        let login: String = Input::new()
            .with_prompt("Login")
            .with_initial_text(current.login)
            .allow_empty(true)
            .interact_text()?;
        let password = Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?;
        let entry = RecordEntry::new(name, login, password);
        app.form_mut().fill(&entry);

        let duplicate = match app.store().find_duplicate(&entry) {
            Ok(duplicate) => duplicate,
            Err(_) => {
                screen::show_signal(Signal::Failure);
                app.request_list();
                return Ok(());
            }
        };
        if let Some(existing) = duplicate {
            let keep_going = Confirm::new()
                .with_prompt(format!(
                    "{} already has this login and password, add it anyway?",
                    existing.name
                ))
                .default(false)
                .interact()?;
            if !keep_going {
                app.request_list();
                return Ok(());
            }
        }

        let signal = app.save_form();
        screen::show_signal(signal);
        if signal == Signal::Success || app.screen() != Screen::Adding {
            return Ok(());
        }
        let again = Confirm::new()
            .with_prompt("Try again?")
            .default(true)
            .interact()?;
        if !again {
            app.request_list();
            return Ok(());
        }
    }
}

fn redraw<C: Clipboard>(app: &App<C>) {
    match app.view() {
        Ok(view) => screen::render(&view),
        // Already logged by the store.
        Err(_) => screen::show_signal(Signal::Failure),
    }
}
