//! Wire-format contract tests for the public API types.
//!
//! Frontends consume these JSON shapes directly, so key names, tags and
//! untagged scalars are pinned here rather than left to serde defaults
//! drifting silently.

use chrono::{TimeZone, Utc};
use fansight_rust::api::{
    ChartPayload, ChartResult, ChartSegment, ChartType, DataBlock, KpiValue, ProjectId,
    ProjectInfo, ReportTemplate, ResolvedFrom, StatValue, StatsRecord, TemplateId, Variable,
    VariableType,
};
use serde_json::{json, Value};

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

#[test]
fn test_ids_serialize_as_bare_numbers_inside_documents() {
    let project = ProjectInfo {
        id: ProjectId::new(42),
        name: "Spring gala".to_string(),
        partner_id: None,
        event_date: Some(Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap()),
    };

    let value = to_value(&project);
    assert_eq!(value["id"], json!(42));
    assert_eq!(value["name"], json!("Spring gala"));
    // Absent options are omitted, not null.
    assert!(value.get("partner_id").is_none());
    assert_eq!(value["event_date"], json!("2026-05-01T18:00:00Z"));
}

#[test]
fn test_variable_uses_type_key_with_lowercase_values() {
    let variable = Variable::input(
        "qrScans",
        "QR scans",
        VariableType::Count,
        "Engagement",
    );

    let value = to_value(&variable);
    assert_eq!(value["type"], json!("count"));
    assert_eq!(value["flags"]["visible_in_clicker"], json!(false));
    assert!(value.get("var_type").is_none());
    assert!(value.get("formula").is_none());

    // All five variable types spell lowercase on the wire.
    for (var_type, expected) in [
        (VariableType::Numeric, "numeric"),
        (VariableType::Percentage, "percentage"),
        (VariableType::Currency, "currency"),
        (VariableType::Count, "count"),
        (VariableType::Text, "text"),
    ] {
        assert_eq!(to_value(&var_type), json!(expected));
    }
}

#[test]
fn test_stats_record_is_a_transparent_map() {
    let mut record = StatsRecord::new();
    record.set_number("attendance", 1850.0);
    record.set_text("eventSummary", "Great turnout.");

    let value = to_value(&record);
    assert_eq!(
        value,
        json!({"attendance": 1850.0, "eventSummary": "Great turnout."})
    );

    let back: StatsRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_stat_value_untagged_keeps_numbers_and_strings_apart() {
    // A JSON string of digits stays text; only JSON numbers are numeric.
    let text: StatValue = serde_json::from_str("\"12\"").unwrap();
    assert_eq!(text, StatValue::Text("12".to_string()));
    assert_eq!(text.as_number(), None);

    let number: StatValue = serde_json::from_str("12").unwrap();
    assert_eq!(number, StatValue::Number(12.0));
    assert_eq!(number.as_text(), None);
}

#[test]
fn test_kpi_payload_wire_shape() {
    let result = ChartResult {
        chart_id: "attendance".to_string(),
        title: "Attendance".to_string(),
        subtitle: None,
        emoji: Some("🎟️".to_string()),
        chart_type: ChartType::Kpi,
        payload: ChartPayload::Kpi {
            value: KpiValue::Number(1850.0),
        },
    };

    let value = to_value(&result);
    assert_eq!(value["type"], json!("kpi"));
    assert_eq!(value["payload"]["kind"], json!("kpi"));
    assert_eq!(value["payload"]["value"]["kind"], json!("number"));
    assert_eq!(value["payload"]["value"]["value"], json!(1850.0));
    assert!(value.get("subtitle").is_none());

    let no_data = to_value(&ChartPayload::Kpi {
        value: KpiValue::NoData,
    });
    assert_eq!(no_data["value"]["kind"], json!("no_data"));
    assert!(no_data["value"].get("value").is_none());
}

#[test]
fn test_segments_payload_wire_shape() {
    let payload = ChartPayload::Segments {
        segments: vec![
            ChartSegment {
                label: "Female".to_string(),
                value: 940.0,
                percentage: 52.2,
                color: Some("#d81b60".to_string()),
                unavailable: false,
            },
            ChartSegment {
                label: "Male".to_string(),
                value: 860.0,
                percentage: 47.8,
                color: None,
                unavailable: false,
            },
        ],
        total: 1800.0,
    };

    let value = to_value(&payload);
    assert_eq!(value["kind"], json!("segments"));
    assert_eq!(value["total"], json!(1800.0));
    assert_eq!(value["segments"][0]["label"], json!("Female"));
    assert_eq!(value["segments"][0]["percentage"], json!(52.2));
    assert!(value["segments"][1].get("color").is_none());

    let insufficient = to_value(&ChartPayload::InsufficientData);
    assert_eq!(insufficient, json!({"kind": "insufficient_data"}));
}

#[test]
fn test_resolved_from_spells_lowercase() {
    for (variant, expected) in [
        (ResolvedFrom::Project, "project"),
        (ResolvedFrom::Partner, "partner"),
        (ResolvedFrom::Default, "default"),
        (ResolvedFrom::Hardcoded, "hardcoded"),
    ] {
        assert_eq!(to_value(&variant), json!(expected));
        assert_eq!(variant.to_string(), expected);
    }
}

#[test]
fn test_template_block_width_is_optional_on_the_wire() {
    let template = ReportTemplate::new(
        TemplateId::new(3),
        "Event recap",
        vec![
            DataBlock {
                id: 1,
                chart_id: "attendance".to_string(),
                width: None,
                order: 0,
            },
            DataBlock {
                id: 2,
                chart_id: "images-funnel".to_string(),
                width: Some(4),
                order: 1,
            },
        ],
    );

    let value = to_value(&template);
    assert_eq!(value["id"], json!(3));
    assert_eq!(value["grid"]["desktop_units"], json!(6));
    assert!(value["blocks"][0].get("width").is_none());
    assert_eq!(value["blocks"][1]["width"], json!(4));

    // A document without a grid section falls back to the standard grid.
    let parsed: ReportTemplate = serde_json::from_value(json!({
        "id": 9,
        "name": "Minimal",
        "blocks": []
    }))
    .unwrap();
    assert_eq!(parsed.grid.desktop_units, 6);
    assert_eq!(parsed.grid.mobile_units, 2);
}

#[test]
fn test_image_payload_round_trip() {
    let payload = ChartPayload::Image {
        reference: "https://cdn.example.com/cover.jpg".to_string(),
        aspect_ratio: Some(1.5),
    };

    let value = to_value(&payload);
    assert_eq!(value["kind"], json!("image"));
    assert_eq!(value["aspect_ratio"], json!(1.5));

    let back: ChartPayload = serde_json::from_value(value).unwrap();
    assert_eq!(back, payload);
}
