//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `sprite` - Per-icon rule templates for the sprite stylesheets
//! - `fonts` - `@font-face` template written next to converted fonts
//! - `serve` - Dev server client (hotreload.js)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateSource, TemplateVars};

pub mod sprite {
    use super::{Template, TemplateVars};

    /// Variables for one raster sprite rule.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RasterRuleVars {
        /// Class name (prefix + icon stem).
        pub name: String,
        pub x: u32,
        pub y: u32,
        pub width: u32,
        pub height: u32,
        /// Sprite URL relative to the compiled stylesheet.
        pub image: String,
        pub total_width: u32,
        pub total_height: u32,
    }

    /// `0` or `-<n>px`.
    fn offset(n: u32) -> String {
        if n == 0 { "0".into() } else { format!("-{n}px") }
    }

    impl TemplateVars for RasterRuleVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__NAME__", &self.name)
                .replace("__OFFSET_X__", &offset(self.x))
                .replace("__OFFSET_Y__", &offset(self.y))
                .replace("__X__", &self.x.to_string())
                .replace("__Y__", &self.y.to_string())
                .replace("__TOTAL_WIDTH__", &self.total_width.to_string())
                .replace("__TOTAL_HEIGHT__", &self.total_height.to_string())
                .replace("__WIDTH__", &self.width.to_string())
                .replace("__HEIGHT__", &self.height.to_string())
                .replace("__IMAGE__", &self.image)
        }
    }

    /// Variables for one vector sprite rule.
    #[derive(Debug, Clone, PartialEq)]
    pub struct VectorRuleVars {
        pub name: String,
        /// Symbol id inside the sprite document.
        pub id: String,
        pub width: f64,
        pub height: f64,
        pub image: String,
    }

    impl TemplateVars for VectorRuleVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__NAME__", &self.name)
                .replace("__ID__", &self.id)
                .replace("__WIDTH__", &self.width.to_string())
                .replace("__HEIGHT__", &self.height.to_string())
                .replace("__IMAGE__", &self.image)
        }
    }

    /// Built-in rule for `_sprite.scss`.
    pub const RASTER_RULE: Template<RasterRuleVars> =
        Template::new(include_str!("sprite/sprite.scss"));

    /// Built-in rule for `_sprite-svg.scss`.
    pub const VECTOR_RULE: Template<VectorRuleVars> =
        Template::new(include_str!("sprite/sprite-svg.scss"));
}

pub mod fonts {
    use super::TemplateVars;

    /// Variables for font-face.css.
    pub struct FontFaceVars<'a> {
        pub family: &'a str,
        /// File stem shared by the `.ttf` and `.woff2`.
        pub file: &'a str,
    }

    impl TemplateVars for FontFaceVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__FAMILY__", self.family)
                .replace("__FILE__", self.file)
        }
    }

    const FONT_FACE_CSS_CONTENT: &str = include_str!("fonts/font-face.css");

    /// Render the `@font-face` stylesheet for one converted font.
    pub fn font_face_css(vars: &FontFaceVars<'_>) -> String {
        vars.apply(FONT_FACE_CSS_CONTENT)
    }
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Hot reload client with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));
}
