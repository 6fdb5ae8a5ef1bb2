use medi_hl7::{Message, ReindexOptions, ResetRules};
use pretty_assertions::assert_eq;
use tests::{read, segment_types, ORU_R01};

fn order_rules() -> ResetRules {
    ResetRules::new()
        .with_rule("OBR", &["ORC"])
        .unwrap()
        .with_rule("OBX", &["ORC", "OBR"])
        .unwrap()
        .with_rule("NTE", &["OBX", "OBR"])
        .unwrap()
}

fn set_ids(message: &Message, segment_type: &str) -> Vec<String> {
    message
        .segments()
        .get_segments(Some(segment_type))
        .unwrap()
        .into_iter()
        .map(|id| read(message, id, &format!("{segment_type}.1")).unwrap_or_default())
        .collect()
}

#[test]
fn renumber_results() {
    let mut message = Message::new(ORU_R01).expect("parse");
    message.reindex(&order_rules(), &ReindexOptions::default()).unwrap();

    assert_eq!(set_ids(&message, "OBR"), vec!["1", "1"]);
    assert_eq!(set_ids(&message, "OBX"), vec!["1", "2", "1", "2"]);
    assert_eq!(set_ids(&message, "NTE"), vec!["1"]);
    assert_eq!(set_ids(&message, "PID"), vec!["1"]);
}

#[test]
fn renumber_after_moving_results_between_orders() {
    let mut message = Message::new(ORU_R01).expect("parse");
    let segments = message.segments_mut();
    let orders = segments.get_segments(Some("ORC")).unwrap();
    let first_order_results = segments
        .get_segments_after(orders[0], "OBX", &["ORC"], false)
        .unwrap();
    let second_order_request = segments
        .get_segments_after(orders[1], "OBR", &[], true)
        .unwrap()[0];

    for &obx in first_order_results.iter().rev() {
        segments.move_segment_after(obx, second_order_request).unwrap();
    }
    message.reindex(&order_rules(), &ReindexOptions::default()).unwrap();

    assert_eq!(
        segment_types(&message),
        vec!["MSH", "PID", "ORC", "OBR", "NTE", "ORC", "OBR", "OBX", "OBX", "OBX", "OBX"]
    );
    assert_eq!(set_ids(&message, "OBX"), vec!["1", "2", "3", "4"]);
}

#[test]
fn strip_notes_and_second_order() {
    let mut message = Message::new(ORU_R01).expect("parse");
    let segments = message.segments_mut();
    let orders = segments.get_segments(Some("ORC")).unwrap();
    let mut doomed = segments.get_segments(Some("NTE")).unwrap();
    doomed.push(orders[1]);
    doomed.extend(
        segments
            .get_segments_after(orders[1], "OBR", &["ORC"], false)
            .unwrap(),
    );
    doomed.extend(
        segments
            .get_segments_after(orders[1], "OBX", &["ORC"], false)
            .unwrap(),
    );

    let removed = segments.delete_segments(&doomed);
    assert_eq!(removed.len(), 5);
    assert_eq!(
        segment_types(&message),
        vec!["MSH", "PID", "ORC", "OBR", "OBX", "OBX"]
    );

    let rebuilt = Message::new(message.build()).expect("reparse");
    assert_eq!(rebuilt.build(), message.build());
}

#[test]
fn result_value_edits_round_trip() {
    let mut message = Message::new(ORU_R01).expect("parse");
    let potassium = *message
        .segments()
        .get_segments(Some("OBX"))
        .unwrap()
        .last()
        .unwrap();
    {
        let segment = message.segments_mut().segment_mut(potassium).unwrap();
        segment.set("OBX.5", "5.9").unwrap();
        segment.set("OBX.8", "H").unwrap();
    }

    let rebuilt = Message::new(message.build()).expect("reparse");
    let id = *rebuilt
        .segments()
        .get_segments(Some("OBX"))
        .unwrap()
        .last()
        .unwrap();
    assert_eq!(read(&rebuilt, id, "OBX.3.2").as_deref(), Some("Potassium"));
    assert_eq!(read(&rebuilt, id, "OBX.5").as_deref(), Some("5.9"));
    assert_eq!(read(&rebuilt, id, "OBX.8").as_deref(), Some("H"));
}
