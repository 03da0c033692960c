use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuEntry {
    Resize,
    Split,
    Crop,
    List,
    Exit,
}

impl MainMenuEntry {
    pub const ALL: [MainMenuEntry; 5] = [
        MainMenuEntry::Resize,
        MainMenuEntry::Split,
        MainMenuEntry::Crop,
        MainMenuEntry::List,
        MainMenuEntry::Exit,
    ];
}

impl fmt::Display for MainMenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (number, text) = match self {
            MainMenuEntry::Resize => (1, "Resize Video"),
            MainMenuEntry::Split => (2, "Split Video"),
            MainMenuEntry::Crop => (3, "Crop Video (Social Media)"),
            MainMenuEntry::List => (4, "List Videos"),
            MainMenuEntry::Exit => (5, "Exit"),
        };
        write!(f, "{number}. {text}")
    }
}

/// A labelled value offered in a selection prompt.
#[derive(Clone)]
pub struct ChoiceItem<T: Clone> {
    pub display: String,
    pub value: T,
}

impl<T: Clone> ChoiceItem<T> {
    pub fn new(display: impl Into<String>, value: T) -> Self {
        Self {
            display: display.into(),
            value,
        }
    }
}

impl<T: Clone> fmt::Display for ChoiceItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PromptOutcome<T> {
    Value(T),
    Cancelled,
}

/// Remembers the last picked entry so the menu reopens on it.
#[derive(Debug, Default)]
pub struct MenuCursor {
    last: Option<usize>,
}

impl MenuCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_index(&self, len: usize) -> usize {
        self.last.filter(|i| *i < len).unwrap_or(0)
    }

    pub fn update(&mut self, index: usize) {
        self.last = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_entries_are_numbered_in_order() {
        let labels: Vec<String> = MainMenuEntry::ALL.iter().map(|e| e.to_string()).collect();
        assert_eq!(labels[0], "1. Resize Video");
        assert_eq!(labels[2], "3. Crop Video (Social Media)");
        assert_eq!(labels[4], "5. Exit");
    }

    #[test]
    fn cursor_falls_back_when_out_of_range() {
        let mut cursor = MenuCursor::new();
        assert_eq!(cursor.initial_index(5), 0);
        cursor.update(3);
        assert_eq!(cursor.initial_index(5), 3);
        assert_eq!(cursor.initial_index(2), 0);
    }
}
