use crate::foundation::core::{ElementId, TargetId};

/// Granularity of a text split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// One unit per character; spaces become non-breaking space units.
    Char,
    /// One unit per whitespace-separated word.
    Word,
}

/// One prepared text unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextUnit {
    /// Position in the unit list.
    pub index: u32,
    /// Unit text as it should be rendered.
    pub text: String,
}

/// Ordered list of glyph or word units prepared once from a piece of copy.
///
/// Stagger animations address units by index through [`TargetId::part`]; the renderer owns
/// turning units into nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextUnits {
    element: ElementId,
    kind: UnitKind,
    units: Vec<TextUnit>,
}

impl TextUnits {
    /// Split `text` for `element`.
    pub fn split(element: ElementId, text: &str, kind: UnitKind) -> Self {
        let pieces: Vec<String> = match kind {
            UnitKind::Char => text
                .chars()
                .map(|c| if c == ' ' { '\u{a0}'.to_string() } else { c.to_string() })
                .collect(),
            UnitKind::Word => text.split_whitespace().map(str::to_owned).collect(),
        };
        let units = pieces
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextUnit {
                index: i as u32,
                text,
            })
            .collect();
        Self {
            element,
            kind,
            units,
        }
    }

    /// Split granularity.
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Prepared units in reading order.
    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// `true` when the source text produced no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Animation targets, one per unit, in order.
    pub fn targets(&self) -> Vec<TargetId> {
        self.units
            .iter()
            .map(|u| TargetId::part(self.element, u.index))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/text.rs"]
mod tests;
