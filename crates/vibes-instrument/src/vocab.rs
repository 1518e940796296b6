use std::collections::HashMap;
use vibes_core::{CommandType, LineAction};

/// Static tool-name tables for one agent (spec §4.5.1): every known tool
/// maps to a `CommandType`; file-modifying tools additionally map to a
/// `LineAction`. Both agents share this shape and differ only in which
/// concrete tool names populate the tables — the lookup algorithm in
/// `ToolInstrumenter` is identical for both.
pub struct ToolVocabulary {
    command_types: HashMap<&'static str, CommandType>,
    actions: HashMap<&'static str, LineAction>,
}

impl ToolVocabulary {
    pub fn new(
        command_types: &[(&'static str, CommandType)],
        actions: &[(&'static str, LineAction)],
    ) -> Self {
        Self {
            command_types: command_types.iter().copied().collect(),
            actions: actions.iter().copied().collect(),
        }
    }

    pub fn command_type(&self, tool_name: &str) -> CommandType {
        self.command_types
            .get(tool_name)
            .copied()
            .unwrap_or(CommandType::Other)
    }

    pub fn action(&self, tool_name: &str) -> Option<LineAction> {
        self.actions.get(tool_name).copied()
    }
}

/// C5a: a Claude-Code-shaped rich tool vocabulary (SPEC_FULL.md
/// supplement 3).
pub fn claude_code_vocabulary() -> ToolVocabulary {
    ToolVocabulary::new(
        &[
            ("Write", CommandType::FileWrite),
            ("Edit", CommandType::FileWrite),
            ("NotebookEdit", CommandType::FileWrite),
            ("Read", CommandType::FileRead),
            ("Bash", CommandType::Shell),
            ("Glob", CommandType::ToolUse),
            ("Grep", CommandType::ToolUse),
            ("WebFetch", CommandType::ApiCall),
            ("Task", CommandType::ToolUse),
        ],
        &[
            ("Write", LineAction::Create),
            ("Edit", LineAction::Modify),
            ("NotebookEdit", LineAction::Modify),
        ],
    )
}

/// C5b: a Codex-shaped simpler tool vocabulary.
pub fn codex_vocabulary() -> ToolVocabulary {
    ToolVocabulary::new(
        &[
            ("shell", CommandType::Shell),
            ("apply_patch", CommandType::FileWrite),
            ("read_file", CommandType::FileRead),
            ("write_file", CommandType::FileWrite),
        ],
        &[
            ("apply_patch", LineAction::Modify),
            ("write_file", LineAction::Create),
        ],
    )
}
