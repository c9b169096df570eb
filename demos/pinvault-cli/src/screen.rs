/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Drawing the app's state to the terminal.

use pinvault::{AppView, Record, Screen, SelectionStage, Signal};
use prettytable::{format, row, Table};
use std::io::Write;
use std::thread;
use std::time::Duration;

const PROGRESS_STEPS: usize = 50;
const PROGRESS_STEP_DELAY: Duration = Duration::from_millis(10);

/// The status light.
pub fn show_signal(signal: Signal) {
    match signal {
        Signal::Success => println!("[ok]"),
        Signal::Failure => println!("[failed]"),
    }
}

/// What goes in the second column: the login, or the password once it's been copied.
pub fn second_line(record: &Record, stage: SelectionStage) -> &str {
    match stage {
        SelectionStage::Password => &record.password,
        SelectionStage::Unselected | SelectionStage::Login => &record.login,
    }
}

pub fn stage_of(view: &AppView, record: &Record) -> SelectionStage {
    match &view.selection {
        Some(sel) if sel.id == record.id => sel.stage,
        _ => SelectionStage::Unselected,
    }
}

pub fn render(view: &AppView) {
    match view.screen {
        Screen::Locked => println!("Locked ({}/{} digits)", view.pin_entered, view.pin_length),
        Screen::Viewing => render_list(view),
        Screen::Searching => println!("Search by name or login"),
        Screen::Adding => println!("New record"),
    }
}

fn render_list(view: &AppView) {
    if !view.filter.is_empty() {
        println!("Filter: {:?}", view.filter);
    }
    if view.records.is_empty() {
        println!("No records");
        return;
    }
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["", "#", "name", "login", "last used"]);
    for (i, record) in view.records.iter().enumerate() {
        let stage = stage_of(view, record);
        let marker = match stage {
            SelectionStage::Unselected => "",
            SelectionStage::Login => "*",
            SelectionStage::Password => "**",
        };
        table.add_row(row![
            marker,
            i + 1,
            record.name,
            second_line(record, stage),
            record.last_used.format("%Y-%m-%d %H:%M")
        ]);
    }
    table.printstd();
}

/// The search "progress bar". Purely cosmetic, and there's no way to interrupt it.
pub fn search_progress() {
    let mut out = std::io::stdout();
    for step in 1..=PROGRESS_STEPS {
        let _ = write!(
            out,
            "\r[{}{}]",
            "#".repeat(step),
            " ".repeat(PROGRESS_STEPS - step)
        );
        let _ = out.flush();
        thread::sleep(PROGRESS_STEP_DELAY);
    }
    println!();
}
