//! Screenplay elements as sent by the host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, caller-assigned element identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The kind of screenplay element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    Shot,
    DualDialogueLeft,
    DualDialogueRight,
    ActBreak,
    PageBreak,
    BlankLine,
}

impl ElementType {
    /// Every element type, in declaration order
    pub const ALL: [ElementType; 12] = [
        ElementType::SceneHeading,
        ElementType::Action,
        ElementType::Character,
        ElementType::Dialogue,
        ElementType::Parenthetical,
        ElementType::Transition,
        ElementType::Shot,
        ElementType::DualDialogueLeft,
        ElementType::DualDialogueRight,
        ElementType::ActBreak,
        ElementType::PageBreak,
        ElementType::BlankLine,
    ];

    /// Dense index, used for per-type lookup tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name of this type
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::SceneHeading => "scene_heading",
            ElementType::Action => "action",
            ElementType::Character => "character",
            ElementType::Dialogue => "dialogue",
            ElementType::Parenthetical => "parenthetical",
            ElementType::Transition => "transition",
            ElementType::Shot => "shot",
            ElementType::DualDialogueLeft => "dual_dialogue_left",
            ElementType::DualDialogueRight => "dual_dialogue_right",
            ElementType::ActBreak => "act_break",
            ElementType::PageBreak => "page_break",
            ElementType::BlankLine => "blank_line",
        }
    }

    /// Dialogue-ish elements that belong to a speech under a character cue
    pub fn is_speech(self) -> bool {
        matches!(self, ElementType::Dialogue | ElementType::Parenthetical)
    }

    /// Column implied by the type itself
    pub fn dual_side(self) -> Option<DualSide> {
        match self {
            ElementType::DualDialogueLeft => Some(DualSide::Left),
            ElementType::DualDialogueRight => Some(DualSide::Right),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column of a dual-dialogue block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualSide {
    Left,
    Right,
}

/// One screenplay unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub element_type: ElementType,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual_dialogue_position: Option<DualSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_page_break_after: Option<bool>,
}

impl Element {
    /// Create an element with no optional attributes
    pub fn new(id: impl Into<String>, element_type: ElementType, content: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            element_type,
            content: content.into(),
            character_name: None,
            dual_dialogue_position: None,
            force_page_break_after: None,
        }
    }

    /// Attach the speaking character (used for continuation cues)
    pub fn with_character(mut self, name: impl Into<String>) -> Self {
        self.character_name = Some(name.into());
        self
    }

    /// Place the element in a dual-dialogue column
    pub fn with_dual_position(mut self, side: DualSide) -> Self {
        self.dual_dialogue_position = Some(side);
        self
    }

    /// Request a page break after this element
    pub fn with_page_break_after(mut self) -> Self {
        self.force_page_break_after = Some(true);
        self
    }

    /// Dual column this element belongs to, if any. The element type wins over
    /// an explicit position.
    pub fn dual_side(&self) -> Option<DualSide> {
        self.element_type.dual_side().or(self.dual_dialogue_position)
    }

    pub fn breaks_after(&self) -> bool {
        self.force_page_break_after.unwrap_or(false) || self.element_type == ElementType::PageBreak
    }
}
