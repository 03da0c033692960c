use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

use crate::video::commands::show_video_files;
use crate::video::dimensions::VideoDimensions;
use crate::video::files::{VideoFile, format_size_mb};
use crate::video::presets::{CropPreset, ResizePreset, SplitDuration};

use super::types::{ChoiceItem, PromptOutcome};

/// `None` when the user backs out with Esc or q.
pub fn select_choice<T: Clone>(prompt: &str, items: Vec<ChoiceItem<T>>) -> Result<Option<T>> {
    select_choice_at(prompt, items, 0)
}

pub fn select_choice_at<T: Clone>(
    prompt: &str,
    items: Vec<ChoiceItem<T>>,
    default: usize,
) -> Result<Option<T>> {
    if items.is_empty() {
        return Ok(None);
    }
    let theme = ColorfulTheme::default();
    let picked = Select::with_theme(&theme)
        .with_prompt(prompt)
        .items(&items)
        .default(default.min(items.len() - 1))
        .interact_opt()?;
    Ok(picked.map(|i| items[i].value.clone()))
}

pub fn select_video_file(dir: &Path) -> Result<Option<VideoFile>> {
    let files = show_video_files(dir)?;
    let items = files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            ChoiceItem::new(
                format!("{}. {} ({} MB)", i + 1, f.name, format_size_mb(f.size_bytes)),
                f.clone(),
            )
        })
        .collect();
    select_choice("Select video file", items)
}

pub fn select_resize_preset() -> Result<PromptOutcome<ResizePreset>> {
    let mut items: Vec<ChoiceItem<Option<ResizePreset>>> = ResizePreset::ALL
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            ChoiceItem::new(
                format!("{}. {} ({})", i + 1, p.label(), p.target()),
                Some(p),
            )
        })
        .collect();
    items.push(ChoiceItem::new(
        format!("{}. Custom Size", items.len() + 1),
        None,
    ));

    match select_choice("Select resize option", items)? {
        None => Ok(PromptOutcome::Cancelled),
        Some(Some(preset)) => Ok(PromptOutcome::Value(preset)),
        Some(None) => Ok(match prompt_dimensions("Enter width", "Enter height")? {
            PromptOutcome::Value(size) => PromptOutcome::Value(ResizePreset::Custom(size)),
            PromptOutcome::Cancelled => PromptOutcome::Cancelled,
        }),
    }
}

pub fn select_split_duration() -> Result<PromptOutcome<SplitDuration>> {
    let mut items: Vec<ChoiceItem<Option<SplitDuration>>> = SplitDuration::ALL
        .into_iter()
        .enumerate()
        .map(|(i, d)| ChoiceItem::new(format!("{}. {}", i + 1, d.label()), Some(d)))
        .collect();
    items.push(ChoiceItem::new(
        format!("{}. Custom duration", items.len() + 1),
        None,
    ));

    match select_choice("Select split option", items)? {
        None => Ok(PromptOutcome::Cancelled),
        Some(Some(duration)) => Ok(PromptOutcome::Value(duration)),
        Some(None) => {
            let Some(seconds) = prompt_parsed("Enter duration in seconds", parse_seconds)? else {
                return Ok(PromptOutcome::Cancelled);
            };
            Ok(PromptOutcome::Value(SplitDuration::custom(seconds)?))
        }
    }
}

pub fn select_crop_preset() -> Result<PromptOutcome<CropPreset>> {
    let mut items: Vec<ChoiceItem<Option<CropPreset>>> = CropPreset::ALL
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            ChoiceItem::new(
                format!("{}. {} [{}]", i + 1, p.label(), p.target()),
                Some(p),
            )
        })
        .collect();
    items.push(ChoiceItem::new(
        format!("{}. Custom Crop", items.len() + 1),
        None,
    ));

    match select_choice("Select crop option", items)? {
        None => Ok(PromptOutcome::Cancelled),
        Some(Some(preset)) => Ok(PromptOutcome::Value(preset)),
        Some(None) => Ok(
            match prompt_dimensions("Enter crop width", "Enter crop height")? {
                PromptOutcome::Value(size) => PromptOutcome::Value(CropPreset::Custom(size)),
                PromptOutcome::Cancelled => PromptOutcome::Cancelled,
            },
        ),
    }
}

/// Width and height as two prompts. Non-positive values are an error, not
/// a retry, so the caller can report them.
pub fn prompt_dimensions(
    width_prompt: &str,
    height_prompt: &str,
) -> Result<PromptOutcome<VideoDimensions>> {
    let Some(width) = prompt_parsed(width_prompt, parse_integer)? else {
        return Ok(PromptOutcome::Cancelled);
    };
    let Some(height) = prompt_parsed(height_prompt, parse_integer)? else {
        return Ok(PromptOutcome::Cancelled);
    };
    Ok(PromptOutcome::Value(VideoDimensions::from_signed(
        width, height,
    )?))
}

/// Text prompt re-asked until `parse` accepts it; empty input cancels.
fn prompt_parsed<T>(prompt: &str, parse: fn(&str) -> Result<T, String>) -> Result<Option<T>> {
    let theme = ColorfulTheme::default();
    let text: String = Input::with_theme(&theme)
        .with_prompt(format!("{prompt} (empty to cancel)"))
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                Ok(())
            } else {
                parse(input).map(|_| ())
            }
        })
        .interact_text()?;

    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse(&text).map_err(anyhow::Error::msg)?))
}

pub fn parse_integer(input: &str) -> Result<i64, String> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| "Please enter a valid number!".to_string())
}

pub fn parse_seconds(input: &str) -> Result<f64, String> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        Ok(_) => Err("Duration must be greater than zero".to_string()),
        Err(_) => Err("Please enter a valid number!".to_string()),
    }
}

pub fn confirm(message: &str, default: bool) -> Result<PromptOutcome<bool>> {
    let theme = ColorfulTheme::default();
    match Confirm::with_theme(&theme)
        .with_prompt(message)
        .default(default)
        .interact_opt()?
    {
        Some(answer) => Ok(PromptOutcome::Value(answer)),
        None => Ok(PromptOutcome::Cancelled),
    }
}

pub fn wait_for_enter() -> Result<()> {
    let theme = ColorfulTheme::default();
    let _: String = Input::with_theme(&theme)
        .with_prompt("Press Enter to continue...")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
