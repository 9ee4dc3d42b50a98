use crate::error::ValidationError;
use crate::model::{GoalMessage, GoalRequest, NavigateToGoal, COORD_MAX, COORD_MIN};

/// Validate raw field values and produce a goal message.
///
/// The map identifier is trimmed before use. Coordinates are copied verbatim
/// once they pass the finite and range checks.
pub fn build(target_map_raw: &str, x: f64, y: f64) -> Result<GoalMessage, ValidationError> {
    let target_map = target_map_raw.trim();
    if target_map.is_empty() {
        return Err(ValidationError::EmptyMap);
    }
    if target_map.chars().any(char::is_control) {
        return Err(ValidationError::InvalidMapCharacter);
    }
    check_coordinate("target_x", x)?;
    check_coordinate("target_y", y)?;

    Ok(GoalMessage::from_parts(NavigateToGoal {
        target_x: x,
        target_y: y,
        target_map: target_map.to_string(),
    }))
}

pub fn build_from_request(request: &GoalRequest) -> Result<GoalMessage, ValidationError> {
    build(&request.target_map, request.target_x, request.target_y)
}

fn check_coordinate(axis: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate { axis });
    }
    if !(COORD_MIN..=COORD_MAX).contains(&value) {
        return Err(ValidationError::CoordinateOutOfRange {
            axis,
            value,
            min: COORD_MIN,
            max: COORD_MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GoalId, Header, Stamp};

    #[test]
    fn trims_map_and_copies_coordinates() {
        let msg = build("  map2\t", 1.5, -2.25).unwrap();
        assert_eq!(msg.target_map(), "map2");
        assert_eq!(msg.target_x(), 1.5);
        assert_eq!(msg.target_y(), -2.25);
    }

    #[test]
    fn metadata_is_always_default() {
        let msg = build("map1", 0.0, 0.0).unwrap();
        assert_eq!(
            msg.header(),
            &Header {
                seq: 0,
                stamp: Stamp { secs: 0, nsecs: 0 },
                frame_id: String::new(),
            }
        );
        assert_eq!(msg.goal_id(), &GoalId::default());
    }

    #[test]
    fn empty_or_blank_map_is_rejected() {
        for raw in ["", " ", "\t\n", "   \r\n  "] {
            assert_eq!(build(raw, 0.0, 0.0), Err(ValidationError::EmptyMap));
        }
    }

    #[test]
    fn empty_map_wins_over_bad_coordinates() {
        assert_eq!(build("", f64::NAN, 5000.0), Err(ValidationError::EmptyMap));
    }

    #[test]
    fn inner_control_characters_are_rejected() {
        assert_eq!(
            build("map\n2", 0.0, 0.0),
            Err(ValidationError::InvalidMapCharacter)
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(build("m", COORD_MIN, COORD_MAX).is_ok());
        assert!(matches!(
            build("m", 1000.01, 0.0),
            Err(ValidationError::CoordinateOutOfRange {
                axis: "target_x",
                ..
            })
        ));
        assert!(matches!(
            build("m", 0.0, -1000.5),
            Err(ValidationError::CoordinateOutOfRange {
                axis: "target_y",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert_eq!(
            build("m", f64::INFINITY, 0.0),
            Err(ValidationError::NonFiniteCoordinate { axis: "target_x" })
        );
        assert_eq!(
            build("m", 0.0, f64::NAN),
            Err(ValidationError::NonFiniteCoordinate { axis: "target_y" })
        );
    }

    #[test]
    fn request_and_raw_fields_build_the_same_message() {
        let req = GoalRequest::new(" lab ", 3.25, 4.0);
        assert_eq!(build_from_request(&req), build(" lab ", 3.25, 4.0));
    }
}
