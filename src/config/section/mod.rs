//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetflow.toml`:
//!
//! | Module     | TOML Section   | Purpose                                  |
//! |------------|----------------|------------------------------------------|
//! | `paths`    | `[paths]`      | Source/output layout, generated dir      |
//! | `serve`    | `[serve]`      | Development server and live reload       |
//! | `styles`   | `[styles]`     | Sass compiler, browser targets           |
//! | `scripts`  | `[scripts]`    | Entry glob, include search paths         |
//! | `images`   | `[images]`     | Optimization and cache                   |
//! | `sprites`  | `[sprites]`    | Packing padding, stylesheet templates    |
//! | `fonts`    | `[fonts]`      | Copy glob, TTF converter                 |

mod fonts;
mod images;
pub mod paths;
mod scripts;
mod serve;
mod sprites;
mod styles;

pub use fonts::FontsConfig;
pub use images::ImagesConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::{DEFAULT_WS_PORT, ServeConfig};
pub use sprites::SpritesConfig;
pub use styles::StylesConfig;
