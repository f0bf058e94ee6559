//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// A built-in template or one loaded from the project.
#[derive(Debug, Clone)]
pub enum TemplateSource<V> {
    Builtin(Template<V>),
    Custom(String),
}

impl<V: TemplateVars> TemplateSource<V> {
    pub fn render(&self, vars: &V) -> String {
        match self {
            Self::Builtin(template) => template.render(vars),
            Self::Custom(content) => vars.apply(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Name(&'static str);

    impl TemplateVars for Name {
        fn apply(&self, content: &str) -> String {
            content.replace("__NAME__", self.0)
        }
    }

    #[test]
    fn test_builtin_and_custom() {
        let builtin: TemplateSource<Name> = TemplateSource::Builtin(Template::new(".__NAME__ {}"));
        assert_eq!(builtin.render(&Name("a")), ".a {}");

        let custom: TemplateSource<Name> = TemplateSource::Custom("%__NAME__".into());
        assert_eq!(custom.render(&Name("b")), "%b");
    }
}
