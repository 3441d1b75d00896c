use serde::{Deserialize, Serialize};

use crate::slot::Category;

/// Participant names offered when the caller supplies none.
pub const DEFAULT_PARTICIPANTS: [&str; 3] = ["Narrator", "Lead", "Support"];

/// Colors handed out, in order, to slots without a recognized category.
pub const AUTO_COLORS: [&str; 6] = [
    "#FF6B6B", "#4ECDC4", "#FFD166", "#6A4C93", "#06D6A0", "#118AB2",
];

/// Metadata carried by a drag from the palette onto the track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub participant: Option<String>,
    pub category: Option<Category>,
}

impl DragPayload {
    pub fn participant(name: impl Into<String>) -> Self {
        Self {
            participant: Some(name.into()),
            category: None,
        }
    }

    pub fn category(category: Category) -> Self {
        Self {
            participant: None,
            category: Some(category),
        }
    }
}

/// One draggable source chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteChip {
    Participant(String),
    Category(Category),
}

impl PaletteChip {
    pub fn label(&self) -> &str {
        match self {
            Self::Participant(name) => name,
            Self::Category(category) => category.as_str(),
        }
    }

    pub fn payload(&self) -> DragPayload {
        match self {
            Self::Participant(name) => DragPayload::participant(name.clone()),
            Self::Category(category) => DragPayload::category(*category),
        }
    }
}

/// Immutable reference data the track's drag sources are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    participants: Vec<String>,
}

impl Palette {
    /// Builds a palette from caller-supplied names, trimmed and de-duplicated.
    /// Falls back to [`DEFAULT_PARTICIPANTS`] when nothing usable is given.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut participants = Vec::<String>::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !participants.iter().any(|existing| existing == name) {
                participants.push(name.to_owned());
            }
        }
        if participants.is_empty() {
            participants = DEFAULT_PARTICIPANTS.iter().map(|name| name.to_string()).collect();
        }
        Self { participants }
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn categories(&self) -> [Category; 5] {
        Category::ALL
    }

    /// Participant chips followed by the category chips.
    pub fn chips(&self) -> Vec<PaletteChip> {
        self.participants
            .iter()
            .cloned()
            .map(PaletteChip::Participant)
            .chain(Category::ALL.into_iter().map(PaletteChip::Category))
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICIPANTS)
    }
}

/// Per-session cursor into [`AUTO_COLORS`]. Never rewinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_color(&mut self) -> String {
        let color = AUTO_COLORS[self.next % AUTO_COLORS.len()];
        self.next = self.next.wrapping_add(1);
        color.to_owned()
    }
}
