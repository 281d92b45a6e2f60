use crate::{ConfigError, display_path, parse_toml, read_text};
use cutgraph_kernel::{CutConfig, CutSection, ParamValue, Params};
use std::path::Path;
use toml::Value;

const CUT_ARRAY: &str = "cut";
const KEY_NAME: &str = "name";
const KEY_TYPE: &str = "type";

/// Read and parse a cut file.
pub fn load_cut_config(path: &Path) -> Result<CutConfig, ConfigError> {
    let text = read_text(path)?;
    let config = parse_cut_config(&text, &display_path(path))?;
    tracing::debug!(path = %path.display(), cuts = config.len(), "cutgraph.config.load");
    Ok(config)
}

/// Parse cut file text. `origin` names the source in error messages.
///
/// ```toml
/// [[cut]]
/// name = "both"
/// type = "cuts::and_cut"
/// cut_1 = "a"
/// cut_2 = "b"
/// "cut.description" = "a and b"
///
/// [[cut]]
/// name = "not_a"
/// type = "cuts::not_cut"
/// cut = "a"
/// "cut.description" = "negated a"
/// ```
///
/// `name` and `type` are reserved; every other key is a parameter, with
/// nested tables flattened to dotted keys. Write common parameters as
/// quoted keys: a bare `cut.description` cannot sit next to the NOT cut's
/// string parameter `cut`.
pub fn parse_cut_config(text: &str, origin: &str) -> Result<CutConfig, ConfigError> {
    let root = parse_toml(text, origin)?;
    let Some(root) = root.as_table() else {
        return Err(contract(origin, "document must be a table"));
    };
    if let Some(key) = root.keys().find(|key| key.as_str() != CUT_ARRAY) {
        return Err(contract(
            origin,
            format!("unexpected top-level key '{key}' (only [[cut]] tables are allowed)"),
        ));
    }
    let Some(cuts) = root.get(CUT_ARRAY) else {
        return Ok(CutConfig::new());
    };
    let cuts = cuts
        .as_array()
        .ok_or_else(|| contract(origin, "'cut' must be an array of tables ([[cut]])"))?;

    cuts.iter()
        .enumerate()
        .map(|(index, value)| parse_section(value, origin, index))
        .collect()
}

fn parse_section(value: &Value, origin: &str, index: usize) -> Result<CutSection, ConfigError> {
    let table = value
        .as_table()
        .ok_or_else(|| contract(origin, format!("cut #{index} must be a table")))?;
    let name = required_string(table, KEY_NAME, origin, index)?;
    let type_id = required_string(table, KEY_TYPE, origin, index)?;

    let mut params = Params::new();
    for (key, value) in table {
        if key == KEY_NAME || key == KEY_TYPE {
            continue;
        }
        flatten(&mut params, key, value)
            .map_err(|message| contract(origin, format!("cut '{name}': {message}")))?;
    }
    Ok(CutSection::new(name, type_id).with_params(params))
}

fn required_string<'a>(
    table: &'a toml::Table,
    key: &str,
    origin: &str,
    index: usize,
) -> Result<&'a str, ConfigError> {
    match table.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.as_str()),
        Some(_) => Err(contract(
            origin,
            format!("cut #{index}: '{key}' must be a non-empty string"),
        )),
        None => Err(contract(origin, format!("cut #{index}: missing '{key}'"))),
    }
}

fn flatten(params: &mut Params, key: &str, value: &Value) -> Result<(), String> {
    if let Value::Table(table) = value {
        for (child, value) in table {
            flatten(params, &format!("{key}.{child}"), value)?;
        }
        return Ok(());
    }
    params.insert(key, convert(key, value)?);
    Ok(())
}

fn convert(key: &str, value: &Value) -> Result<ParamValue, String> {
    match value {
        Value::Boolean(b) => Ok(ParamValue::Boolean(*b)),
        Value::Integer(i) => Ok(ParamValue::Integer(*i)),
        Value::Float(f) => Ok(ParamValue::Real(*f)),
        Value::String(s) => Ok(ParamValue::String(s.clone())),
        Value::Array(items) => convert_array(key, items),
        Value::Datetime(_) => Err(format!("parameter '{key}': datetimes are not supported")),
        Value::Table(_) => Err(format!("parameter '{key}': unexpected table")),
    }
}

/// Arrays must be homogeneous; integers mixed with floats become reals.
/// An empty array is read as an empty string list.
fn convert_array(key: &str, items: &[Value]) -> Result<ParamValue, String> {
    if items.iter().all(Value::is_str) {
        return Ok(ParamValue::Strings(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ));
    }
    if items.iter().all(Value::is_bool) {
        return Ok(ParamValue::Booleans(
            items.iter().filter_map(Value::as_bool).collect(),
        ));
    }
    if items.iter().all(Value::is_integer) {
        return Ok(ParamValue::Integers(
            items.iter().filter_map(Value::as_integer).collect(),
        ));
    }
    if items.iter().all(|v| v.is_float() || v.is_integer()) {
        return Ok(ParamValue::Reals(
            items
                .iter()
                .filter_map(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
                .collect(),
        ));
    }
    Err(format!(
        "parameter '{key}': arrays must hold booleans, integers, reals or strings of one kind"
    ))
}

fn contract(origin: &str, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::Contract(format!("{origin}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_keep_file_order() {
        let config = parse_cut_config(
            r#"
            [[cut]]
            name = "z"
            type = "cuts::accept_cut"

            [[cut]]
            name = "a"
            type = "cuts::not_cut"
            cut = "z"
            "#,
            "inline",
        )
        .unwrap();
        let names: Vec<_> = config.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(
            config.sections()[1].params.fetch_string("cut").unwrap(),
            "z"
        );
    }

    #[test]
    fn nested_tables_flatten_to_dotted_keys() {
        let config = parse_cut_config(
            r#"
            [[cut]]
            name = "coin"
            type = "cuts::random_cut"
            seed = 314159
            accept_probability = 0.13
            cut.description = "a biased coin"
            logging = { priority = "trace" }
            "#,
            "inline",
        )
        .unwrap();
        let params = &config.sections()[0].params;
        assert_eq!(params.fetch_integer("seed").unwrap(), 314159);
        assert_eq!(params.fetch_real("accept_probability").unwrap(), 0.13);
        assert_eq!(
            params.fetch_string("cut.description").unwrap(),
            "a biased coin"
        );
        assert_eq!(params.fetch_string("logging.priority").unwrap(), "trace");
        assert!(!params.has_key("name"));
        assert!(!params.has_key("type"));
    }

    #[test]
    fn quoted_common_keys_sit_beside_the_not_child() {
        let config = parse_cut_config(
            r#"
            [[cut]]
            name = "not_a"
            type = "cuts::not_cut"
            cut = "a"
            "cut.description" = "negated"
            "#,
            "inline",
        )
        .unwrap();
        let params = &config.sections()[0].params;
        assert_eq!(params.fetch_string("cut").unwrap(), "a");
        assert_eq!(params.fetch_string("cut.description").unwrap(), "negated");

        let err = parse_cut_config(
            r#"
            [[cut]]
            name = "not_a"
            type = "cuts::not_cut"
            cut = "a"
            cut.description = "negated"
            "#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn arrays() {
        let config = parse_cut_config(
            r#"
            [[cut]]
            name = "m"
            type = "cuts::multi_and_cut"
            cuts = ["a", "b"]
            weights = [1, 2.5]
            flags = [true, false]
            none = []
            "#,
            "inline",
        )
        .unwrap();
        let params = &config.sections()[0].params;
        assert_eq!(params.fetch_strings("cuts").unwrap(), ["a", "b"]);
        assert_eq!(
            params.get("weights"),
            Some(&ParamValue::Reals(vec![1.0, 2.5]))
        );
        assert_eq!(
            params.get("flags"),
            Some(&ParamValue::Booleans(vec![true, false]))
        );
        assert!(params.fetch_strings("none").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        let cases = [
            ("[[cut]]\ntype = \"cuts::accept_cut\"\n", "missing 'name'"),
            ("[[cut]]\nname = \"a\"\n", "missing 'type'"),
            (
                "[[cut]]\nname = \"a\"\ntype = 3\n",
                "'type' must be a non-empty string",
            ),
            ("[other]\nx = 1\n", "unexpected top-level key 'other'"),
            (
                "[[cut]]\nname = \"a\"\ntype = \"t\"\nmixed = [1, \"x\"]\n",
                "of one kind",
            ),
            (
                "[[cut]]\nname = \"a\"\ntype = \"t\"\nwhen = 1979-05-27\n",
                "datetimes are not supported",
            ),
        ];
        for (text, expected) in cases {
            let err = parse_cut_config(text, "inline").unwrap_err();
            assert!(err.to_string().contains(expected), "{text:?}: got {err}");
        }
    }

    #[test]
    fn syntax_errors_name_the_origin() {
        let err = parse_cut_config("[[cut]\n", "cuts.toml").unwrap_err();
        assert!(
            matches!(err, ConfigError::ParseToml { path, .. } if path == "cuts.toml")
        );
    }

    #[test]
    fn empty_document_is_empty_config() {
        assert!(parse_cut_config("", "inline").unwrap().is_empty());
    }
}
