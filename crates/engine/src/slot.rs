use serde::{Deserialize, Serialize};

/// Opaque identifier for slots, unique within one editing session.
pub type SlotId = u64;

/// Annotation kind of a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Dialogue,
    Music,
    Sfx,
    Fx,
    Note,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Dialogue,
        Category::Music,
        Category::Sfx,
        Category::Fx,
        Category::Note,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Music => "music",
            Self::Sfx => "sfx",
            Self::Fx => "fx",
            Self::Note => "note",
        }
    }

    /// Parses a category name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }

    /// Canonical display color (`#RRGGBB`).
    pub fn color(self) -> &'static str {
        match self {
            Self::Dialogue => "#4A9EFF",
            Self::Music => "#B07CFF",
            Self::Sfx => "#FF9F43",
            Self::Fx => "#2ED573",
            Self::Note => "#FFD32A",
        }
    }
}

/// De-duplicated participant names in first-seen order.
///
/// Equality ignores order.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Participants(Vec<String>);

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless it is blank or already present. Returns true when added.
    pub fn insert(&mut self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref().trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_owned());
        true
    }

    /// Appends every name of `other` not already present, keeping first-seen order.
    pub fn union(&mut self, other: &Participants) {
        for name in &other.0 {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl PartialEq for Participants {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|name| other.contains(name))
    }
}

impl<S: AsRef<str>> FromIterator<S> for Participants {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut participants = Self::new();
        for name in iter {
            participants.insert(name);
        }
        participants
    }
}

impl From<Vec<String>> for Participants {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Participants> for Vec<String> {
    fn from(value: Participants) -> Self {
        value.0
    }
}

/// A committed time interval on the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub participants: Participants,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub color: Option<String>,
}

impl Slot {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive at both boundary instants.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn display_color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.category.color())
    }

    pub fn to_draft(&self) -> SlotDraft {
        SlotDraft {
            start: self.start,
            end: self.end,
            label: self.label.clone(),
            participants: self.participants.clone(),
            category: self.category,
            color: self.color.clone(),
        }
    }
}

/// A slot without an id: imported rows, drop requests and the provisional
/// slot of an in-progress creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotDraft {
    pub start: f64,
    pub end: f64,
    pub label: String,
    pub participants: Participants,
    pub category: Category,
    pub color: Option<String>,
}

impl SlotDraft {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub(crate) fn into_slot(self, id: SlotId) -> Slot {
        Slot {
            id,
            start: self.start,
            end: self.end,
            label: self.label,
            participants: self.participants,
            category: self.category,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Participants, Slot};

    #[test]
    fn participants_deduplicate_and_compare_as_sets() {
        let left: Participants = ["Alice", "Bob", "Alice", " "].into_iter().collect();
        let right: Participants = ["Bob", "Alice"].into_iter().collect();

        assert_eq!(left.as_slice(), ["Alice", "Bob"]);
        assert_eq!(left, right);
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let mut base: Participants = ["Bob"].into_iter().collect();
        let incoming: Participants = ["Alice", "Bob", "Carol"].into_iter().collect();
        base.union(&incoming);

        assert_eq!(base.as_slice(), ["Bob", "Alice", "Carol"]);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse(" Music "), Some(Category::Music));
        assert_eq!(Category::parse("SFX"), Some(Category::Sfx));
        assert_eq!(Category::parse("ambience"), None);
    }

    #[test]
    fn slot_is_active_at_both_boundaries() {
        let slot = Slot {
            id: 1,
            start: 1.0,
            end: 2.0,
            label: String::new(),
            participants: Participants::new(),
            category: Category::Note,
            color: None,
        };
        assert!(slot.contains(1.0));
        assert!(slot.contains(2.0));
        assert!(!slot.contains(2.05));
        assert_eq!(slot.display_color(), Category::Note.color());
    }

    #[test]
    fn participants_deserialize_with_deduplication() {
        let parsed: Participants =
            serde_json::from_str(r#"["Ana","Ana","Ben"]"#).expect("valid participants json");
        assert_eq!(parsed.len(), 2);
    }
}
