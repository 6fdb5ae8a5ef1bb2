use medi_hl7::{Index, Message};
use pretty_assertions::assert_eq;
use tests::{read, segment_types, ADT_A01};

#[test]
fn anonymize_patient() {
    let mut message = Message::new(ADT_A01).expect("parse");
    let pid = message.segments().get_segment("PID").unwrap().unwrap();
    {
        let segment = message.segments_mut().segment_mut(pid).unwrap();
        segment.set("PID.5", "ANONYMOUS").unwrap();
        segment.set("PID.7", "").unwrap();
        segment.set("PID.11", "").unwrap();
    }

    assert_eq!(read(&message, pid, "PID.5").as_deref(), Some("ANONYMOUS"));
    assert_eq!(read(&message, pid, "PID.5.2"), None);
    assert_eq!(read(&message, pid, "PID.3.1").as_deref(), Some("PATID1234"));

    let built = message.build();
    assert!(built.contains("PID|1||PATID1234^^^GHH^MR~123456789^^^USSSA^SS||ANONYMOUS|||M||C|"));
    assert!(!built.contains("GREENSBORO"));
}

#[test]
fn second_identifier_by_repetition() {
    let message = Message::new(ADT_A01).expect("parse");
    let pid = message.segments().get_segment("PID").unwrap().unwrap();
    let segment = message.segments().segment(pid).unwrap();

    assert_eq!(
        segment.get_at("PID.3.1", Index::At(1), Index::At(0)).unwrap().as_deref(),
        Some("123456789")
    );
    assert_eq!(
        segment.get_at("PID.3.4", Index::At(1), Index::At(0)).unwrap().as_deref(),
        Some("USSSA")
    );
    assert_eq!(segment.get_at("PID.3.1", Index::At(2), Index::At(0)).unwrap(), None);
}

#[test]
fn header_fields_are_numbered_from_the_separator() {
    let mut message = Message::new(ADT_A01).expect("parse");
    let msh = message.segments().get_segment("MSH").unwrap().unwrap();

    assert_eq!(read(&message, msh, "MSH.2").as_deref(), Some("^~\\&"));
    assert_eq!(read(&message, msh, "MSH.9.2").as_deref(), Some("A01"));
    assert_eq!(read(&message, msh, "MSH.10").as_deref(), Some("MSG00001"));

    let segment = message.segments_mut().segment_mut(msh).unwrap();
    segment.set("MSH.10", "MSG00002").unwrap();
    assert!(segment.set("MSH.1", "#").is_err());
    assert!(message.build().starts_with(
        "MSH|^~\\&|ADT1|GHH|GHH LAB|GHH|198808181126|SECURITY|ADT^A01^ADT_A01|MSG00002|"
    ));
}

#[test]
fn add_second_next_of_kin_after_first() {
    let mut message = Message::new(ADT_A01).expect("parse");
    let segments = message.segments_mut();
    let nk1 = segments.get_segment("NK1").unwrap().unwrap();
    let added = segments.create_segment_after("NK1", nk1).unwrap();
    let segment = segments.segment_mut(added).unwrap();
    segment.set("NK1.1", "2").unwrap();
    segment.set("NK1.2.1", "EVERYMAN").unwrap();
    segment.set("NK1.2.2", "EVE").unwrap();

    assert_eq!(
        segment_types(&message),
        vec!["MSH", "EVN", "PID", "NK1", "NK1", "PV1"]
    );
    assert!(message
        .build()
        .contains("NK1|1|JONES^BARBARA^K|SPO^Spouse\r\nNK1|2|EVERYMAN^EVE\r\nPV1|"));
}

#[test]
fn drop_visit_and_move_event_to_end() {
    let mut message = Message::new(ADT_A01).expect("parse");
    let segments = message.segments_mut();
    let evn = segments.get_segment("EVN").unwrap().unwrap();
    let pv1 = segments.get_segment("PV1").unwrap().unwrap();
    segments.move_segment_after(evn, pv1).unwrap();
    segments.delete_segment(pv1).unwrap();

    assert_eq!(segment_types(&message), vec!["MSH", "PID", "NK1", "EVN"]);
    assert!(message.build().ends_with("\r\nEVN|A01|200708181123"));

    let nte = message.segments_mut().create_segment("NTE").unwrap();
    assert_eq!(segment_types(&message), vec!["MSH", "PID", "NK1", "EVN", "NTE"]);
    assert_eq!(read(&message, nte, "NTE"), None);
    assert!(message.build().ends_with("EVN|A01|200708181123\r\nNTE"));
}
