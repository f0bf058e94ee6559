//! Asset categories and the tasks bound to them.

use std::fmt;

/// Unit of source/destination partitioning and of watch subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Markup,
    Styles,
    Scripts,
    Images,
    Fonts,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Markup,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Fonts,
    ];

    /// Tasks that rebuild this category.
    pub const fn tasks(self) -> &'static [TaskName] {
        match self {
            Self::Markup => &[TaskName::Markup],
            Self::Styles => &[TaskName::Styles],
            Self::Scripts => &[TaskName::Scripts],
            Self::Images => &[TaskName::Images],
            Self::Fonts => &[TaskName::Fonts],
        }
    }
}

/// Every individually invocable transform task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskName {
    /// Raster sprite. Ordered first so generated artifacts exist before consumers run.
    Sprite,
    SvgSprite,
    Markup,
    Styles,
    Scripts,
    Images,
    FontConvert,
    Fonts,
}

impl TaskName {
    /// Tasks run after Clean in `build` and `develop`.
    pub const PARALLEL: [Self; 5] = [
        Self::Markup,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Fonts,
    ];

    /// Producers of the generated artifact directory.
    pub const GENERATORS: [Self; 2] = [Self::Sprite, Self::SvgSprite];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Sprite => "sprite",
            Self::SvgSprite => "svg-sprite",
            Self::FontConvert => "fontgen",
            Self::Fonts => "fonts",
        }
    }

    /// Whether a successful run should trigger a full page reload.
    ///
    /// Styles and images push their own stream updates instead; sprites only
    /// feed other tasks.
    pub const fn reloads_page(self) -> bool {
        matches!(self, Self::Markup | Self::Scripts | Self::Fonts)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tasks() {
        let tasks: Vec<_> = Category::ALL
            .iter()
            .flat_map(|c| c.tasks().iter().copied())
            .collect();
        assert_eq!(tasks, TaskName::PARALLEL.to_vec());
    }

    #[test]
    fn test_reload_policy() {
        assert!(TaskName::Markup.reloads_page());
        assert!(TaskName::Scripts.reloads_page());
        assert!(!TaskName::Styles.reloads_page());
        assert!(!TaskName::Images.reloads_page());
        assert!(!TaskName::Sprite.reloads_page());
    }

    #[test]
    fn test_generators_sort_first() {
        let mut tasks = vec![TaskName::Styles, TaskName::SvgSprite, TaskName::Sprite];
        tasks.sort();
        assert_eq!(
            tasks,
            vec![TaskName::Sprite, TaskName::SvgSprite, TaskName::Styles]
        );
    }
}
