use minijinja::{AutoEscape, Environment, Error as JinjaError, ErrorKind};
use minijinja::value::Value as JinjaValue;
use serde::Serialize;

use crate::error::Result;
use crate::templating::{Engine, EngineInit, Loader, RESERVED_NAMESPACE};

/// An [`Engine`] backed by `minijinja`. Auto-escaping is disabled: pattern
/// markup is trusted and is routinely passed between templates as data.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

fn build_env<L: Loader, G: Serialize>(loader: L, reserved: G) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(move |name| loader.load(name).map_err(|e| {
        JinjaError::new(ErrorKind::InvalidOperation, format!("template loader failed:\n{e}"))
    }));

    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_global(RESERVED_NAMESPACE, JinjaValue::from_serialize(&reserved));
    env.add_function("now", ext::now);
    env.add_filter("deslug", ext::deslug);
    env
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<L: Loader, G: Serialize>(loader: L, reserved: G) -> Self::Engine {
        MiniJinjaEngine { env: build_env(loader, reserved) }
    }
}

impl Engine for MiniJinjaEngine {
    fn render<C: Serialize + ?Sized>(&self, name: &str, context: &C) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}

mod ext {
    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl_error_detail_with_std_error!(minijinja::Error);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rustc_hash::FxHashMap;

    use super::*;
    use crate::dict;
    use crate::value::Value;

    #[derive(Debug)]
    struct MapLoader(FxHashMap<&'static str, &'static str>);

    impl Loader for MapLoader {
        fn load(&self, name: &str) -> Result<Option<String>> {
            Ok(self.0.get(name).map(|s| s.to_string()))
        }
    }

    fn engine(templates: &[(&'static str, &'static str)]) -> MiniJinjaEngine {
        let loader = MapLoader(templates.iter().cloned().collect());
        let link: crate::value::Dict = dict! { "atoms-buttons" => "/atoms-buttons/atoms-buttons.html" };
        let reserved: crate::value::Dict = dict! { "link" => link };
        MiniJinjaEngine::init(loader, Value::from(reserved))
    }

    #[test]
    fn renders_includes_and_reserved_namespace() {
        let engine = engine(&[
            ("page", "<h1>{{ title }}</h1>{% include 'atoms-buttons' %}"),
            ("atoms-buttons", "<a href=\"{{ swatch.link['atoms-buttons'] }}\">{{ title }}</a>"),
        ]);

        let context = Value::Dict(Arc::new(dict! { "title" => "A & B" }));
        let html = engine.render("page", &context).unwrap();
        assert_eq!(html, "<h1>A & B</h1><a href=\"/atoms-buttons/atoms-buttons.html\">A & B</a>");
    }

    #[test]
    fn missing_template_is_an_error() {
        let engine = engine(&[]);
        let error = engine.render("nope", &Value::empty_dict()).unwrap_err();
        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn deslug_filter() {
        let engine = engine(&[("t", "{{ 'login-form' | deslug }}")]);
        assert_eq!(engine.render("t", &Value::empty_dict()).unwrap(), "login form");
    }
}
