//! Text form of the action goal, as accepted by the one-shot topic publisher.
//!
//! The layout is fixed: only the three goal fields vary between messages.

use crate::error::WireError;
use crate::model::GoalMessage;

/// The three user-controlled fields recovered from a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalFields {
    pub target_map: String,
    pub target_x: f64,
    pub target_y: f64,
}

/// Render a coordinate with the shortest representation that round-trips and
/// always carries a decimal point, so the publisher parses it as a float.
///
/// `Display` never switches to exponent notation, which a YAML 1.1 reader
/// would take for a string.
pub fn format_float(v: f64) -> String {
    let mut out = format!("{v}");
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}

/// Quote a map identifier as a single-quoted YAML scalar (`'` becomes `''`).
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn unquote(s: &str) -> Option<String> {
    let inner = s.strip_prefix('\'')?.strip_suffix('\'')?;
    // A lone quote inside the scalar means the value was never escaped.
    if inner.replace("''", "").contains('\'') {
        return None;
    }
    Some(inner.replace("''", "'"))
}

pub fn to_payload(message: &GoalMessage) -> String {
    let header = message.header();
    let goal_id = message.goal_id();
    let goal = message.goal();
    format!(
        "header:\n  seq: {}\n  stamp: {{secs: {}, nsecs: {}}}\n  frame_id: {}\n\
         goal_id:\n  stamp: {{secs: {}, nsecs: {}}}\n  id: {}\n\
         goal:\n  target_x: {}\n  target_y: {}\n  target_map: {}",
        header.seq,
        header.stamp.secs,
        header.stamp.nsecs,
        quote(&header.frame_id),
        goal_id.stamp.secs,
        goal_id.stamp.nsecs,
        quote(&goal_id.id),
        format_float(goal.target_x),
        format_float(goal.target_y),
        quote(&goal.target_map),
    )
}

/// Read the `goal:` section of a payload back into its fields.
pub fn parse_goal_fields(payload: &str) -> Result<GoalFields, WireError> {
    let mut in_goal = false;
    let mut target_x = None;
    let mut target_y = None;
    let mut target_map = None;

    for line in payload.lines() {
        if !line.starts_with(' ') {
            in_goal = line.trim_end() == "goal:";
            continue;
        }
        if !in_goal {
            continue;
        }
        let Some((key, value)) = line.trim_start().split_once(": ") else {
            continue;
        };
        match key {
            "target_x" => target_x = Some(parse_float("target_x", value)?),
            "target_y" => target_y = Some(parse_float("target_y", value)?),
            "target_map" => {
                target_map =
                    Some(
                        unquote(value).ok_or_else(|| WireError::InvalidValue {
                            field: "target_map",
                            value: value.to_string(),
                        })?,
                    )
            }
            _ => {}
        }
    }

    Ok(GoalFields {
        target_map: target_map.ok_or(WireError::MissingField("target_map"))?,
        target_x: target_x.ok_or(WireError::MissingField("target_x"))?,
        target_y: target_y.ok_or(WireError::MissingField("target_y"))?,
    })
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, WireError> {
    value.trim().parse::<f64>().map_err(|_| WireError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::build;

    const SCENARIO_A: &str = "header:
  seq: 0
  stamp: {secs: 0, nsecs: 0}
  frame_id: ''
goal_id:
  stamp: {secs: 0, nsecs: 0}
  id: ''
goal:
  target_x: 1.5
  target_y: -2.25
  target_map: 'map2'";

    #[test]
    fn payload_matches_literal_layout() {
        let msg = build("map2", 1.5, -2.25).unwrap();
        assert_eq!(to_payload(&msg), SCENARIO_A);
    }

    #[test]
    fn floats_always_carry_a_decimal_point() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(-1000.0), "-1000.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(12.34), "12.34");
    }

    #[test]
    fn tiny_floats_are_not_rendered_in_exponent_form() {
        assert_eq!(format_float(1e-5), "0.00001");
        assert_eq!(format_float(-0.000123), "-0.000123");
        assert_eq!(format_float(-0.0), "-0.0");

        let msg = build("m", 0.00001, 0.0).unwrap();
        let payload = to_payload(&msg);
        let line = payload
            .lines()
            .find(|l| l.trim_start().starts_with("target_x:"))
            .unwrap();
        assert_eq!(line, "  target_x: 0.00001");
        assert!(!payload.contains("e-"));
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = build("warehouse", 12.3, 45.67).unwrap();
        let b = build("warehouse", 12.3, 45.67).unwrap();
        assert_eq!(to_payload(&a), to_payload(&b));
        assert_eq!(to_payload(&a), to_payload(&a));
    }

    #[test]
    fn literal_payload_parses_back() {
        let fields = parse_goal_fields(SCENARIO_A).unwrap();
        assert_eq!(
            fields,
            GoalFields {
                target_map: "map2".into(),
                target_x: 1.5,
                target_y: -2.25,
            }
        );
    }

    #[test]
    fn built_payload_recovers_fields_exactly() {
        for (map, x, y) in [
            ("map1", 0.0, 0.0),
            ("floor 3", -999.99, 1000.0),
            ("a", 0.07, -0.3),
            ("tiny", 1e-5, -0.000123),
            ("tinier", 5e-324, -1e-300),
        ] {
            let msg = build(map, x, y).unwrap();
            let fields = parse_goal_fields(&to_payload(&msg)).unwrap();
            assert_eq!(fields.target_map, map);
            assert_eq!(fields.target_x.to_bits(), x.to_bits());
            assert_eq!(fields.target_y.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn single_quotes_in_map_are_doubled() {
        let msg = build("bob's map", 1.0, 2.0).unwrap();
        let payload = to_payload(&msg);
        assert!(payload.ends_with("target_map: 'bob''s map'"));
        assert_eq!(parse_goal_fields(&payload).unwrap().target_map, "bob's map");
    }

    #[test]
    fn header_fields_are_not_mistaken_for_goal_fields() {
        let payload = "header:\n  target_x: 9.0\ngoal:\n  target_y: 1.0\n  target_map: 'm'";
        assert_eq!(
            parse_goal_fields(payload),
            Err(WireError::MissingField("target_x"))
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        let payload = "goal:\n  target_x: abc\n  target_y: 1.0\n  target_map: 'm'";
        assert!(matches!(
            parse_goal_fields(payload),
            Err(WireError::InvalidValue {
                field: "target_x",
                ..
            })
        ));

        let payload = "goal:\n  target_x: 1.0\n  target_y: 1.0\n  target_map: 'it's'";
        assert!(matches!(
            parse_goal_fields(payload),
            Err(WireError::InvalidValue {
                field: "target_map",
                ..
            })
        ));
    }
}
