//! Persisted UI preference values.

use serde::{Deserialize, Serialize};

use crate::impl_wire_string_conversions;

/// Colour scheme preference stored under the `theme` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl_wire_string_conversions!(Theme {
    Light => "light",
    Dark => "dark",
    System => "system",
});
