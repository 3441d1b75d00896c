//! Bulk text import/export for slot lists.
//!
//! Pasted text is decoded as a JSON array of objects first and as a CSV
//! table second; the first strategy producing at least one row wins. Export
//! is always pretty-printed JSON carrying every slot field.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::palette::ColorCycle;
use crate::slot::{Category, Participants, Slot, SlotDraft};

const PARTICIPANT_DELIMITERS: [char; 4] = [',', ';', '|', '/'];

/// Decodes pasted text into draft slots.
///
/// Drafts are not yet clamped or snapped; pass them through
/// [`crate::timeline::SlotModel::replace_all`] before showing them.
///
/// # Example
/// ```
/// use slot_engine::codec::decode;
/// use slot_engine::palette::ColorCycle;
///
/// let drafts = decode("start,end,label\n1,2.5,Intro", &mut ColorCycle::new()).expect("csv");
/// assert_eq!(drafts.len(), 1);
/// assert_eq!(drafts[0].label, "Intro");
/// ```
pub fn decode(text: &str, colors: &mut ColorCycle) -> Result<Vec<SlotDraft>> {
    if let Some(drafts) = decode_json(text, colors) {
        if !drafts.is_empty() {
            debug!(rows = drafts.len(), "bulk text decoded as json");
            return Ok(drafts);
        }
    }

    let drafts = decode_csv(text, colors);
    if drafts.is_empty() {
        return Err(EngineError::ImportFormat {
            reason: String::from("no JSON objects and no CSV rows with a numeric start"),
        });
    }
    debug!(rows = drafts.len(), "bulk text decoded as csv");
    Ok(drafts)
}

/// Pretty-printed JSON array of `slots`.
pub fn encode(slots: &[Slot]) -> Result<String> {
    serde_json::to_string_pretty(slots).map_err(EngineError::ExportSerialization)
}

/// Splits a participant cell on `,`, `;`, `|` or `/`.
pub fn split_participants(text: &str) -> Participants {
    text.split(PARTICIPANT_DELIMITERS).collect()
}

/// Splits one CSV line on commas outside double quotes.
///
/// Quotes are stripped; inside a quoted field a doubled quote (`""`) stands
/// for one literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells.into_iter().map(|cell| cell.trim().to_owned()).collect()
}

fn decode_json(text: &str, colors: &mut ColorCycle) -> Option<Vec<SlotDraft>> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
        return None;
    };
    items
        .iter()
        .map(|item| item.as_object().map(|object| json_draft(object, colors)))
        .collect()
}

fn json_draft(object: &Map<String, Value>, colors: &mut ColorCycle) -> SlotDraft {
    let start = object.get("start").and_then(number).unwrap_or(0.0);
    let end = object.get("end").and_then(number).unwrap_or(0.0);
    let label = object
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let participants = object
        .get("participants")
        .or_else(|| object.get("cast"))
        .map(json_participants)
        .unwrap_or_default();
    let category = object
        .get("category")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
        .and_then(Category::parse);
    let color = object
        .get("color")
        .and_then(Value::as_str)
        .filter(|color| !color.trim().is_empty())
        .map(str::to_owned);

    build_draft(start, end, label, participants, category, color, colors)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn json_participants(value: &Value) -> Participants {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(text) => split_participants(text),
        _ => Participants::new(),
    }
}

fn decode_csv(text: &str, colors: &mut ColorCycle) -> Vec<SlotDraft> {
    let mut drafts = Vec::new();
    let rows = text.lines().filter(|line| !line.trim().is_empty());

    for (index, line) in rows.enumerate() {
        let cells = split_csv_line(line);
        let first = cells.first().map(String::as_str).unwrap_or_default();
        if index == 0 && first.to_ascii_lowercase().contains("start") {
            continue;
        }
        let Ok(start) = first.parse::<f64>() else {
            debug!(line, "csv row skipped: start is not a number");
            continue;
        };
        let end = cells
            .get(1)
            .and_then(|cell| cell.parse::<f64>().ok())
            .unwrap_or(start + 1.0);
        let label = cells.get(2).cloned().unwrap_or_default();
        let participants = cells
            .get(3)
            .map(|cell| split_participants(cell))
            .unwrap_or_default();
        let category = cells.get(4).and_then(|cell| Category::parse(cell));

        drafts.push(build_draft(
            start,
            end,
            label,
            participants,
            category,
            None,
            colors,
        ));
    }
    drafts
}

fn build_draft(
    start: f64,
    end: f64,
    label: String,
    participants: Participants,
    category: Option<Category>,
    color: Option<String>,
    colors: &mut ColorCycle,
) -> SlotDraft {
    let color = match (color, category) {
        (Some(color), _) => color,
        (None, Some(category)) => category.color().to_owned(),
        (None, None) => colors.next_color(),
    };
    SlotDraft {
        start,
        end,
        label,
        participants,
        category: category.unwrap_or(Category::Dialogue),
        color: Some(color),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, split_csv_line};
    use crate::error::EngineError;
    use crate::palette::{AUTO_COLORS, ColorCycle};
    use crate::slot::{Category, Participants, SlotDraft};

    #[test]
    fn csv_with_header_and_quoted_label() {
        let text = "start,end,label,cast,kind\n1.2,3.4,\"Intro, Part 1\",Alice|Bob,music\n";
        let drafts = decode(text, &mut ColorCycle::new()).expect("csv should decode");

        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!((draft.start, draft.end), (1.2, 3.4));
        assert_eq!(draft.label, "Intro, Part 1");
        let expected: Participants = ["Alice", "Bob"].into_iter().collect();
        assert_eq!(draft.participants, expected);
        assert_eq!(draft.category, Category::Music);
        assert_eq!(draft.color.as_deref(), Some(Category::Music.color()));
    }

    #[test]
    fn csv_blank_end_defaults_to_one_second() {
        let drafts = decode("4,,Line\r\n6", &mut ColorCycle::new()).expect("csv should decode");
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].end, 5.0);
        assert_eq!(drafts[1].end, 7.0);
        assert_eq!(drafts[1].category, Category::Dialogue);
    }

    #[test]
    fn csv_doubled_quotes_are_literal() {
        assert_eq!(
            split_csv_line(r#"1,2,"She said ""hi, there""",Ana"#),
            vec!["1", "2", r#"She said "hi, there""#, "Ana"]
        );
    }

    #[test]
    fn json_accepts_cast_string_and_unknown_category() {
        let text = r#"[
            {"start": 1, "end": "2.5", "label": "A", "cast": "Ana; Ben / Cy,Ana", "category": "ambience"},
            {"end": 3, "participants": ["Dee"], "kind": "SFX"}
        ]"#;
        let mut colors = ColorCycle::new();
        let drafts = decode(text, &mut colors).expect("json should decode");

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].end, 2.5);
        assert_eq!(drafts[0].participants.as_slice(), ["Ana", "Ben", "Cy"]);
        assert_eq!(drafts[0].category, Category::Dialogue);
        assert_eq!(drafts[0].color.as_deref(), Some(AUTO_COLORS[0]));
        assert_eq!(drafts[1].start, 0.0);
        assert_eq!(drafts[1].category, Category::Sfx);
        assert_eq!(drafts[1].color.as_deref(), Some(Category::Sfx.color()));
        assert_eq!(colors.next_color(), AUTO_COLORS[1]);
    }

    #[test]
    fn json_explicit_color_is_kept() {
        let drafts = decode(
            r##"[{"start": 0, "end": 1, "color": "#123456"}]"##,
            &mut ColorCycle::new(),
        )
        .expect("json should decode");
        assert_eq!(drafts[0].color.as_deref(), Some("#123456"));
    }

    #[test]
    fn text_matching_neither_format_is_an_error() {
        for text in ["", "[]", "{\"start\": 1}", "hello,world\nfoo"] {
            assert!(matches!(
                decode(text, &mut ColorCycle::new()),
                Err(EngineError::ImportFormat { .. })
            ));
        }
    }

    #[test]
    fn exported_json_decodes_back() {
        let mut draft = SlotDraft::new(0.5, 2.25);
        draft.label = String::from("Take \"2\"");
        draft.participants = ["Ana", "Ben"].into_iter().collect();
        draft.category = Category::Note;
        let slots = vec![draft.clone().into_slot(9)];

        let text = encode(&slots).expect("encode should succeed");
        assert!(text.contains('\n'));
        let decoded = decode(&text, &mut ColorCycle::new()).expect("decode should succeed");

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].start, 0.5);
        assert_eq!(decoded[0].end, 2.25);
        assert_eq!(decoded[0].label, draft.label);
        assert_eq!(decoded[0].participants, draft.participants);
        assert_eq!(decoded[0].category, Category::Note);
    }
}
