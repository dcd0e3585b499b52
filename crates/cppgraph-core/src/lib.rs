//! cppgraph Core
//!
//! Types shared between the tokenizer and the build cache.

pub mod natural;
pub mod settings;
pub mod visibility;

pub use natural::natural_cmp;
pub use settings::Settings;
pub use visibility::Visibility;
