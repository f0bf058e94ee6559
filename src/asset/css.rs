//! Stylesheet post-processing on the lightningcss AST.
//!
//! - `prefix_css`: vendor prefixes for the configured browser targets
//! - `group_media_queries`: merge top-level `@media` blocks sharing a query
//! - `beautify_css`: expanded re-print for development builds

use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;

/// Resolve browserslist queries into lightningcss targets.
pub fn targets_for(browsers: &[String]) -> Result<Targets, String> {
    let browsers = Browsers::from_browserslist(browsers).map_err(|e| e.to_string())?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

fn parse<'i>(source: &'i str, filename: &str) -> Result<StyleSheet<'i>, String> {
    let options = ParserOptions {
        filename: filename.to_string(),
        ..ParserOptions::default()
    };
    StyleSheet::parse(source, options).map_err(|e| e.to_string())
}

fn print(stylesheet: &StyleSheet<'_>, targets: Targets) -> Result<String, String> {
    stylesheet
        .to_css(PrinterOptions {
            minify: false,
            targets,
            ..PrinterOptions::default()
        })
        .map(|result| result.code)
        .map_err(|e| e.to_string())
}

/// Add vendor prefixes required by `targets`, printed in expanded form.
pub fn prefix_css(source: &str, filename: &str, targets: Targets) -> Result<String, String> {
    let mut stylesheet = parse(source, filename)?;
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;
    print(&stylesheet, targets)
}

/// Re-print a stylesheet in expanded form.
pub fn beautify_css(source: &str, filename: &str) -> Result<String, String> {
    let stylesheet = parse(source, filename)?;
    print(&stylesheet, Targets::default())
}

/// Merge top-level `@media` rules with identical queries.
///
/// Merged blocks are moved after all other rules, in order of first
/// appearance.
pub fn group_media_queries(source: &str, filename: &str) -> Result<String, String> {
    let mut stylesheet = parse(source, filename)?;

    let rules = std::mem::take(&mut stylesheet.rules.0);
    let mut plain = Vec::with_capacity(rules.len());
    let mut media_keys: Vec<String> = Vec::new();
    let mut media_rules: Vec<MediaRule<'_>> = Vec::new();

    for rule in rules {
        match rule {
            CssRule::Media(media) => {
                let key = media
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| e.to_string())?;
                match media_keys.iter().position(|k| *k == key) {
                    Some(idx) => media_rules[idx].rules.0.extend(media.rules.0),
                    None => {
                        media_keys.push(key);
                        media_rules.push(media);
                    }
                }
            }
            other => plain.push(other),
        }
    }

    plain.extend(media_rules.into_iter().map(CssRule::Media));
    stylesheet.rules.0 = plain;
    print(&stylesheet, Targets::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_targets() -> Targets {
        targets_for(&["last 8 versions".to_string()]).unwrap()
    }

    #[test]
    fn test_prefix_css_adds_vendor_prefixes() {
        let out = prefix_css(
            ".a {\n  user-select: none;\n  display: flex;\n}\n",
            "a.css",
            default_targets(),
        )
        .unwrap();
        assert!(out.contains("-webkit-") || out.contains("-ms-"), "{out}");
        assert!(out.contains("user-select: none"));
    }

    #[test]
    fn test_prefix_css_syntax_error() {
        assert!(prefix_css("..broken { color: red }", "a.css", default_targets()).is_err());
    }

    #[test]
    fn test_group_media_queries() {
        let source = "\
@media (min-width: 768px) { .a { color: red } }
.b { color: blue }
@media (min-width: 768px) { .c { color: green } }
@media (min-width: 992px) { .d { color: black } }
";
        let out = group_media_queries(source, "a.css").unwrap();

        assert_eq!(out.matches("@media (min-width: 768px)").count(), 1);
        assert_eq!(out.matches("@media").count(), 2);

        let b = out.find(".b").unwrap();
        let md = out.find("768px").unwrap();
        let lg = out.find("992px").unwrap();
        assert!(b < md && md < lg);

        let merged = &out[md..lg];
        assert!(merged.contains(".a") && merged.contains(".c"));
    }

    #[test]
    fn test_beautify_expands() {
        let out = beautify_css(".a{color:red}.b{margin:0}", "a.css").unwrap();
        assert!(out.lines().count() > 2);
        assert_eq!(beautify_css(&out, "a.css").unwrap(), out);
    }

    #[test]
    fn test_group_media_queries_without_media() {
        let out = group_media_queries(".a { color: red }", "a.css").unwrap();
        assert!(out.contains(".a"));
        assert!(!out.contains("@media"));
    }
}
