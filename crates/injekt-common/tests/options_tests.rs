use crate::limits;
use crate::options::{OptionsError, ResolverOptions};

#[test]
fn test_defaults_match_limits() {
    let options = ResolverOptions::default();
    assert_eq!(options.render_depth, limits::MAX_RENDER_DEPTH);
    assert_eq!(options.max_constraint_rounds, limits::MAX_CONSTRAINT_ROUNDS);
    assert!(!options.trace_resolution);
}

#[test]
fn test_from_json_fills_missing_fields() {
    let options = ResolverOptions::from_json(r#"{ "renderDepth": 3, "traceResolution": true }"#)
        .expect("valid options");
    assert_eq!(options.render_depth, 3);
    assert!(options.trace_resolution);
    assert_eq!(options.compare_type_depth, limits::MAX_COMPARE_TYPE_DEPTH);
}

#[test]
fn test_from_json_rejects_zero_rounds() {
    let err = ResolverOptions::from_json(r#"{ "maxConstraintRounds": 0 }"#).unwrap_err();
    assert!(matches!(
        err,
        OptionsError::Invalid {
            field: "maxConstraintRounds",
            ..
        }
    ));
}

#[test]
fn test_from_json_reports_parse_errors() {
    let err = ResolverOptions::from_json("{ not json").unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));
    assert!(err.to_string().starts_with("invalid resolver options"));
}
