//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pubkit.toml`:
//!
//! | Module     | TOML Section   | Purpose                                |
//! |------------|----------------|----------------------------------------|
//! | `fonts`    | `[fonts]`      | Font rename map and file extensions    |
//! | `merge`    | `[merge]`      | Publication merge shell and layout     |
//! | `optimise` | `[optimise]`   | Data URI optimisation and PNG to JPEG  |

mod fonts;
mod merge;
mod optimise;

pub use fonts::FontsConfig;
pub use merge::MergeConfig;
pub use optimise::OptimiseConfig;
