use super::*;

#[test]
fn build_merges_equal_runs() {
    let map = build_interval_map(&[false, false, true, true, true, false]);
    assert_eq!(
        map,
        vec![
            TextMapItem::new(0, 1, false),
            TextMapItem::new(2, 4, true),
            TextMapItem::new(5, 5, false),
        ]
    );
}

#[test]
fn build_on_empty_and_single_inputs() {
    let empty: [bool; 0] = [];
    assert!(build_interval_map(&empty).is_empty());

    let map = build_interval_map(&["rgba(0,0,0,1)".to_string()]);
    assert_eq!(map, vec![TextMapItem::new(0, 0, "rgba(0,0,0,1)")]);
}

#[test]
fn build_line_indices_into_numbers() {
    let map = build_interval_map(&[0i64, 0, 1, 1, 1]);
    assert_eq!(map.len(), 2);
    assert_eq!(map[1].start_index, 2);
    assert_eq!(map[1].end_index, 4);
    assert_eq!(map[1].value, Some(MapValue::Number(1.0)));
}

#[test]
fn lookup_last_matching_item_wins() {
    let map = vec![
        TextMapItem::new(0, 9, "red"),
        TextMapItem::new(3, 4, "blue"),
    ];
    assert_eq!(value_at(&map, 0).and_then(MapValue::as_str), Some("red"));
    assert_eq!(value_at(&map, 3).and_then(MapValue::as_str), Some("blue"));
    assert_eq!(value_at(&map, 4).and_then(MapValue::as_str), Some("blue"));
    assert_eq!(value_at(&map, 5).and_then(MapValue::as_str), Some("red"));
    assert!(lookup_interval(&map, 10).is_none());
}

#[test]
fn lookup_handles_unordered_sparse_items() {
    let map = vec![TextMapItem::new(6, 8, true), TextMapItem::new(0, 1, true)];
    assert!(value_at(&map, 0).is_some());
    assert!(value_at(&map, 3).is_none());
    assert!(value_at(&map, 7).is_some());
}

#[test]
fn items_use_camel_case_fields_and_untagged_values() {
    let json = r#"[
        {"startIndex":0,"endIndex":2,"value":true},
        {"startIndex":3,"endIndex":3,"value":0.5},
        {"startIndex":4,"endIndex":7,"value":"line","type":"line"},
        {"startIndex":8,"endIndex":9}
    ]"#;
    let items: Vec<TextMapItem> = serde_json::from_str(json).unwrap();
    assert_eq!(items[0].value, Some(MapValue::Bool(true)));
    assert_eq!(items[1].value, Some(MapValue::Number(0.5)));
    assert_eq!(items[2].kind.as_deref(), Some("line"));
    assert_eq!(items[3].value, None);
}

#[test]
fn value_views() {
    assert!(MapValue::Number(2.0).as_bool());
    assert!(!MapValue::Number(0.0).as_bool());
    assert!(MapValue::Text("TRUE".into()).as_bool());
    assert_eq!(MapValue::Text(" 0.25 ".into()).as_f64(), Some(0.25));
    assert_eq!(MapValue::Bool(true).as_f64(), None);
}
