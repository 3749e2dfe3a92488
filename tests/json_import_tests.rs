use pert_tool::import_from_json;
use serde_json::json;

fn estimate(o: f64, n: f64, p: f64) -> serde_json::Value {
    json!({
        "optimistic": { "value": o, "unit": "hours" },
        "nominal": { "value": n, "unit": "hours" },
        "pessimistic": { "value": p, "unit": "hours" }
    })
}

#[test]
fn out_of_order_estimate_is_reported_as_invalid_estimates() {
    let input = r#"{"version":"1.0","tasks":[{"estimate":{"optimistic":{"value":5,"unit":"hours"},"nominal":{"value":3,"unit":"hours"},"pessimistic":{"value":8,"unit":"hours"}}}]}"#;
    let result = import_from_json(input);

    assert!(!result.is_valid());
    assert!(result.tasks.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Task 1:"));
    assert!(result.errors[0].contains("invalid estimates"), "{}", result.errors[0]);
}

#[test]
fn envelope_keeps_ids_and_project_name() {
    let input = json!({
        "version": "1.0",
        "projectName": "Launch",
        "tasks": [
            { "id": "a", "name": "Design", "estimate": estimate(1.0, 2.0, 3.0) },
            { "id": "b", "estimate": estimate(2.0, 4.0, 12.0), "expectedDuration": 999 }
        ]
    })
    .to_string();
    let result = import_from_json(&input);

    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.project_name.as_deref(), Some("Launch"));
    let ids: Vec<&str> = result.tasks.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!((result.tasks[1].expected_duration() - 5.0).abs() < 1e-9);
}

#[test]
fn bare_array_items_always_get_fresh_ids() {
    let input = json!([
        { "id": "keep-me", "name": "Design", "estimate": estimate(1.0, 2.0, 3.0) },
        { "estimate": estimate(1.0, 1.0, 1.0) }
    ])
    .to_string();
    let result = import_from_json(&input);

    assert!(result.is_valid());
    assert_eq!(result.project_name, None);
    assert_eq!(result.tasks.len(), 2);
    assert_ne!(result.tasks[0].id(), "keep-me");
    assert_eq!(result.tasks[1].name(), None);
}

#[test]
fn structural_problems_are_distinguished_from_bad_estimates() {
    let input = json!([
        { "name": "No estimate" },
        { "estimate": { "optimistic": { "value": 1, "unit": "months" },
                        "nominal": { "value": 2, "unit": "hours" },
                        "pessimistic": { "value": 3, "unit": "hours" } } },
        { "estimate": { "optimistic": { "value": "1", "unit": "hours" },
                        "nominal": { "value": 2, "unit": "hours" },
                        "pessimistic": { "value": 3, "unit": "hours" } } },
        { "estimate": estimate(3.0, 2.0, 1.0) },
        { "estimate": estimate(1.0, 2.0, 3.0) }
    ])
    .to_string();
    let result = import_from_json(&input);

    assert!(result.is_partial());
    assert_eq!(result.tasks.len(), 1);
    assert_eq!(result.errors.len(), 4);
    for (idx, error) in result.errors[..3].iter().enumerate() {
        assert!(error.starts_with(&format!("Task {}:", idx + 1)), "{error}");
        assert!(error.contains("invalid task structure"), "{error}");
    }
    assert!(result.errors[3].starts_with("Task 4:"));
    assert!(result.errors[3].contains("invalid estimates"));
}

#[test]
fn unparseable_input_is_a_single_error() {
    let result = import_from_json("{ not json");
    assert!(!result.is_valid());
    assert!(result.tasks.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Failed to parse JSON"));
}

#[test]
fn unrecognised_shapes_are_a_single_invalid_format_error() {
    for input in [
        r#"{"tasks":[]}"#,
        r#"{"version":"1.0","tasks":{}}"#,
        r#""just a string""#,
        "42",
    ] {
        let result = import_from_json(input);
        assert!(result.tasks.is_empty(), "{input}");
        assert_eq!(result.errors.len(), 1, "{input}");
        assert!(result.errors[0].starts_with("Invalid format"), "{input}");
    }
}

#[test]
fn other_envelope_versions_are_still_read() {
    let input = json!({
        "version": "2.0",
        "projectName": 17,
        "tasks": [ { "estimate": estimate(1.0, 2.0, 3.0) } ]
    })
    .to_string();
    let result = import_from_json(&input);
    assert!(result.is_valid());
    assert_eq!(result.project_name, None);
    assert_eq!(result.tasks.len(), 1);
}

#[test]
fn leading_byte_order_mark_is_ignored() {
    let document = json!({
        "version": "1.0",
        "projectName": "Launch",
        "tasks": [{ "id": "a", "estimate": estimate(1.0, 2.0, 3.0) }]
    });
    let input = format!("\u{feff}{document}");
    let result = import_from_json(&input);

    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.project_name.as_deref(), Some("Launch"));
    assert_eq!(result.tasks.len(), 1);
}

#[test]
fn overflowing_estimate_is_reported_instead_of_imported() {
    let input = json!({
        "version": "1.0",
        "tasks": [
            { "id": "huge", "estimate": estimate(1e308, 1e308, 1e308) },
            { "id": "ok", "estimate": estimate(1.0, 2.0, 3.0) }
        ]
    })
    .to_string();
    let result = import_from_json(&input);

    assert_eq!(result.tasks.len(), 1);
    assert_eq!(result.tasks[0].id(), "ok");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("too large"), "{}", result.errors[0]);
}
