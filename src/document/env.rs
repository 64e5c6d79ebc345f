use toml::Value;

use super::source::{DocumentSource, Layer};
use super::LoadError;

/// Overrides document entries from environment variables.
///
/// `PREFIX<sep>SECTION<sep>KEY=value` lands at `section.key`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    fn layers_from<I>(&self, vars: I) -> Vec<Layer>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.separator.is_empty() {
            log::warn!("ignoring env source '{}' with empty separator", self.prefix);
            return Vec::new();
        }

        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut layers = Vec::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(self.separator.as_str())
                .map(str::to_lowercase)
                .collect();
            if path.iter().any(String::is_empty) {
                log::warn!("skipping env override {key}: empty path segment");
                continue;
            }

            log::trace!("env override {key} -> {}", path.join("."));
            layers.push(Layer::at_path(path, coerce_value(&value)));
        }

        layers
    }
}

impl DocumentSource for EnvSource {
    fn layers(&self) -> Result<Vec<Layer>, LoadError> {
        Ok(self.layers_from(std::env::vars()))
    }

    fn origin(&self) -> Option<String> {
        Some(format!("env:{}", self.prefix))
    }
}

/// Picks the most specific TOML type for a raw environment string.
fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_maps_variables_to_paths() {
        let source = EnvSource::new("APP", "__");
        let layers = source.layers_from(vars(&[
            ("APP__DATABASE__PORT", "5432"),
            ("OTHER__X", "1"),
            ("APP__", "ignored"),
        ]));

        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].path, ["database", "port"]);
        assert_eq!(layers[0].value, Value::Integer(5432));
    }

    #[test]
    fn test_skips_empty_segments() {
        let source = EnvSource::new("APP", "__");
        let layers = source.layers_from(vars(&[("APP__A____B", "x")]));
        assert!(layers.is_empty());
    }

    #[test]
    fn test_empty_separator_yields_nothing() {
        let source = EnvSource::new("APP", "");
        assert!(source.layers_from(vars(&[("APPX", "1")])).is_empty());
    }

    #[test]
    fn test_origin_names_prefix() {
        assert_eq!(EnvSource::new("APP", "__").origin().as_deref(), Some("env:APP"));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("TRUE"), Value::Boolean(true));
        assert_eq!(coerce_value("false"), Value::Boolean(false));
        assert_eq!(coerce_value("-12"), Value::Integer(-12));
        assert_eq!(coerce_value("1.5"), Value::Float(1.5));
        assert_eq!(coerce_value("1e5"), Value::String("1e5".into()));
        assert_eq!(coerce_value("French"), Value::String("French".into()));
    }
}
