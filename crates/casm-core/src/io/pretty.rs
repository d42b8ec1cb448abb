use serde_json::Value;

const INDENT: usize = 4;

/// Renders JSON with sorted object keys and four-space indentation, keeping
/// arrays of scalars on a single line so that vectors and coordinate rows stay
/// readable in `properties.calc.json`.
pub fn to_pretty_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.push('\n');
    out
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn is_flat_array(items: &[Value]) -> bool {
    items.iter().all(is_scalar)
}

fn write_inline(out: &mut String, items: &[Value]) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&item.to_string());
    }
    out.push(']');
}

fn push_indent(out: &mut String, level: usize) {
    out.extend(std::iter::repeat_n(' ', level * INDENT));
}

fn write_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Array(items) if is_flat_array(items) => write_inline(out, items),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, level + 1);
                write_value(out, item, level + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push_str("{\n");
            for (i, key) in keys.iter().enumerate() {
                push_indent(out, level + 1);
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push_str(": ");
                write_value(out, &map[key.as_str()], level + 1);
                if i + 1 < keys.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_and_keeps_scalar_arrays_inline() {
        let value = json!({
            "relaxed_energy": -3.5,
            "relaxed_basis": [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
            "atom_type": ["Zr", "O"],
            "empty": {}
        });

        let expected = "\
{
    \"atom_type\": [\"Zr\", \"O\"],
    \"empty\": {},
    \"relaxed_basis\": [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.5]
    ],
    \"relaxed_energy\": -3.5
}
";
        assert_eq!(to_pretty_string(&value), expected);
    }

    #[test]
    fn output_parses_back_to_the_same_value() {
        let value = json!({"b": [{"x": 1}, [2, 3]], "a": null, "c": "s\"q"});
        let parsed: Value = serde_json::from_str(&to_pretty_string(&value)).unwrap();
        assert_eq!(parsed, value);
    }
}
