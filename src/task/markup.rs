//! Markup task: copy pages to the output root.

use super::{Asset, Outputs, TaskContext, TaskReport, TransformChain, TransformError};
use crate::core::TaskName;

pub(super) fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let paths = &ctx.config.paths;
    let sources = ctx.select(&paths.source, &paths.markup)?;

    // Pages are copied verbatim
    let chain = TransformChain::new();

    let mut outputs = Outputs::new();
    for source in &sources {
        let asset = chain.apply(Asset::read(source, &paths.source)?)?;
        outputs.push(paths.output.join(&asset.name), asset.contents);
    }

    let written = outputs.write()?;
    Ok(TaskReport::new(TaskName::Markup, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TransformCache;
    use crate::core::BuildMode;
    use crate::task::testing::Project;

    #[test]
    fn test_markup_copies_top_level_pages() {
        let project = Project::new();
        project.write("src/index.html", "<h1>home</h1>");
        project.write("src/contact.php", "<?php echo 1; ?>");
        project.write("src/notes.txt", "skip");
        project.write("src/assets/js/partial.html", "skip");

        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Production, &cache);
        let report = run(&ctx).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(project.read_string("dist/index.html"), "<h1>home</h1>");
        assert!(project.exists("dist/contact.php"));
        assert!(!project.exists("dist/notes.txt"));
        assert!(!project.exists("dist/assets/js/partial.html"));
    }

    #[test]
    fn test_markup_rerun_is_identical() {
        let project = Project::new();
        project.write("src/index.htm", "<p>same</p>");

        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Development, &cache);
        run(&ctx).unwrap();
        let first = project.read("dist/index.htm");
        run(&ctx).unwrap();
        assert_eq!(project.read("dist/index.htm"), first);
    }
}
