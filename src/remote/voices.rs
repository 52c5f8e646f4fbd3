//! The prebuilt voice catalog offered for speech generation.
//!
//! Voice identifiers are fixed by the speech service; the descriptions are
//! what the selection prompt shows the user.

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// One selectable synthesis voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    /// Identifier sent to the speech service.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line character description.
    pub description: &'static str,
}

/// All voices the service exposes, in display order.
pub const VOICES: [Voice; 5] = [
    Voice {
        id: "Kore",
        name: "Kore",
        description: "Female, clear and professional",
    },
    Voice {
        id: "Puck",
        name: "Puck",
        description: "Male, energetic and youthful",
    },
    Voice {
        id: "Charon",
        name: "Charon",
        description: "Male, deep and calm",
    },
    Voice {
        id: "Fenrir",
        name: "Fenrir",
        description: "Male, mature and authoritative",
    },
    Voice {
        id: "Zephyr",
        name: "Zephyr",
        description: "Female, soft and friendly",
    },
];

/// Look a voice up by identifier (case-insensitive).
pub fn find(id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id.eq_ignore_ascii_case(id))
}

/// The voice used when the user has not picked one.
pub fn default_voice() -> &'static Voice {
    &VOICES[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
