//! Node classification and the category palette.

/// Category of a knowledge-graph node, derived from its `label` field.
///
/// Matching is exact; anything the server adds beyond the three known
/// categories falls back to [`NodeCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Species,
    Factor,
    Consequence,
    Other,
}

impl NodeCategory {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Species" => NodeCategory::Species,
            "Factor" => NodeCategory::Factor,
            "Consequence" => NodeCategory::Consequence,
            _ => NodeCategory::Other,
        }
    }

    /// Fill color as an RGB triple. Species red, factors blue, consequences
    /// amber, everything else neutral grey.
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            NodeCategory::Species => (0xff, 0x4d, 0x4f),
            NodeCategory::Factor => (0x18, 0x90, 0xff),
            NodeCategory::Consequence => (0xfa, 0xad, 0x14),
            NodeCategory::Other => (0xbf, 0xbf, 0xbf),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NodeCategory::Species => "Species",
            NodeCategory::Factor => "Factor",
            NodeCategory::Consequence => "Consequence",
            NodeCategory::Other => "Other",
        }
    }

    /// The three categories shown in the view legend.
    pub fn legend() -> [NodeCategory; 3] {
        [
            NodeCategory::Species,
            NodeCategory::Factor,
            NodeCategory::Consequence,
        ]
    }
}
