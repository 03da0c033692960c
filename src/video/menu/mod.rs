mod prompts;
mod types;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal, stdout};
use std::path::Path;

use crate::ui::prelude::*;

use super::commands::{crop_video, resize_video, show_video_files, split_video};
use super::operations::Session;

use types::{ChoiceItem, MainMenuEntry, MenuCursor, PromptOutcome};

enum Step {
    Continue,
    Exit,
}

pub fn video_menu(session: &Session, dir: &Path) -> Result<()> {
    let mut cursor = MenuCursor::new();
    loop {
        match menu_round(session, dir, &mut cursor) {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => break,
            Err(err) if is_interrupted(&err) => {
                emit(
                    Level::Warn,
                    "video.menu.cancelled",
                    "Operation cancelled by user",
                    None,
                );
                if exit_after_interrupt()? {
                    break;
                }
                clear_screen()?;
            }
            Err(err) => return Err(err),
        }
    }

    emit(Level::Info, "video.menu.exit", "Goodbye!", None);
    Ok(())
}

fn menu_round(session: &Session, dir: &Path, cursor: &mut MenuCursor) -> Result<Step> {
    print_banner();

    let Some(entry) = select_main_entry(cursor)? else {
        return Ok(Step::Exit);
    };

    let outcome = match entry {
        MainMenuEntry::Resize => run_resize(session, dir),
        MainMenuEntry::Split => run_split(session, dir),
        MainMenuEntry::Crop => run_crop(session, dir),
        MainMenuEntry::List => show_video_files(dir).map(|_| ()),
        MainMenuEntry::Exit => return Ok(Step::Exit),
    };

    match outcome {
        Err(err) if is_interrupted(&err) => return Err(err),
        Err(err) => emit(Level::Error, "video.menu.error", &format!("{err:#}"), None),
        Ok(()) => {}
    }

    prompts::wait_for_enter()?;
    clear_screen()?;
    Ok(Step::Continue)
}

/// A second Ctrl-C at the exit question also exits.
fn exit_after_interrupt() -> Result<bool> {
    match prompts::confirm("Do you want to exit?", false) {
        Ok(PromptOutcome::Value(answer)) => Ok(answer),
        Ok(PromptOutcome::Cancelled) => Ok(false),
        Err(err) if is_interrupted(&err) => Ok(true),
        Err(err) => Err(err),
    }
}

/// Ctrl-C inside a prompt surfaces as an `Interrupted` I/O error, usually
/// wrapped in `dialoguer::Error`, which does not expose it as a source.
fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let io_error = match cause.downcast_ref::<dialoguer::Error>() {
            Some(dialoguer::Error::IO(io_error)) => Some(io_error),
            None => cause.downcast_ref::<io::Error>(),
        };
        io_error.is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
    })
}

fn print_banner() {
    separator(false);
    print_block("VIDEO TOOL");
    separator(false);
}

fn select_main_entry(cursor: &mut MenuCursor) -> Result<Option<MainMenuEntry>> {
    let items = MainMenuEntry::ALL
        .into_iter()
        .map(|entry| ChoiceItem::new(entry.to_string(), entry))
        .collect::<Vec<_>>();
    let default = cursor.initial_index(items.len());

    let picked = prompts::select_choice_at("Select option", items, default)?;
    if let Some(entry) = picked {
        if let Some(index) = MainMenuEntry::ALL.iter().position(|e| *e == entry) {
            cursor.update(index);
        }
    }
    Ok(picked)
}

fn run_resize(session: &Session, dir: &Path) -> Result<()> {
    let Some(file) = prompts::select_video_file(dir)? else {
        return Ok(());
    };
    let PromptOutcome::Value(preset) = prompts::select_resize_preset()? else {
        return Ok(());
    };
    if !confirmed(&format!("Resize {} to {}?", file.name, preset.target()))? {
        return Ok(());
    }
    resize_video(session, &file.path, preset)
}

fn run_split(session: &Session, dir: &Path) -> Result<()> {
    let Some(file) = prompts::select_video_file(dir)? else {
        return Ok(());
    };
    let PromptOutcome::Value(duration) = prompts::select_split_duration()? else {
        return Ok(());
    };
    if !confirmed(&format!("Split {} ({})?", file.name, duration.label()))? {
        return Ok(());
    }
    split_video(session, &file.path, duration)
}

fn run_crop(session: &Session, dir: &Path) -> Result<()> {
    let Some(file) = prompts::select_video_file(dir)? else {
        return Ok(());
    };
    let PromptOutcome::Value(preset) = prompts::select_crop_preset()? else {
        return Ok(());
    };
    let message = format!(
        "Crop {} for {} ({})?",
        file.name,
        preset.label(),
        preset.target()
    );
    if !confirmed(&message)? {
        return Ok(());
    }
    crop_video(session, &file.path, preset, None)
}

fn confirmed(message: &str) -> Result<bool> {
    Ok(matches!(
        prompts::confirm(message, true)?,
        PromptOutcome::Value(true)
    ))
}

fn clear_screen() -> Result<()> {
    let mut out = stdout();
    if !out.is_terminal() {
        return Ok(());
    }
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}
