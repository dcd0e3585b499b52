//! Visibility of module declarations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a module, partition or import is part of the module interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Declared with a leading `export`
    Exported,
    /// Module-local
    #[default]
    Private,
}

impl Visibility {
    pub fn from_exported(exported: bool) -> Self {
        if exported {
            Self::Exported
        } else {
            Self::Private
        }
    }

    pub fn is_exported(self) -> bool {
        self == Self::Exported
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Exported => write!(f, "exported"),
            Visibility::Private => write!(f, "private"),
        }
    }
}
