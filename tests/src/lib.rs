//! Sample messages and helpers shared by the workflow tests.

use medi_hl7::{Message, SegmentId};

/// Admission with two patient identifiers and one next of kin
pub const ADT_A01: &str = "MSH|^~\\&|ADT1|GHH|GHH LAB|GHH|198808181126|SECURITY|ADT^A01^ADT_A01|MSG00001|P|2.5.1\r\
EVN|A01|200708181123\r\
PID|1||PATID1234^^^GHH^MR~123456789^^^USSSA^SS||EVERYMAN^ADAM^A^III||19610615|M||C|2222 HOME STREET^^GREENSBORO^NC^27401-1020\r\
NK1|1|JONES^BARBARA^K|SPO^Spouse\r\
PV1|1|I|2000^2012^01||||004777^ATTEND^AARON^A";

/// Results for two orders, set IDs deliberately wrong
pub const ORU_R01: &str = "MSH|^~\\&|LAB|GHH|EHR|GHH|202501010101||ORU^R01|MSG0002|P|2.5\r\
PID|1||P12345^^^GHH^MR||Doe^Jane||19851224|F\r\
ORC|RE|ORD1\r\
OBR|9|ORD1||CBC^Complete blood count\r\
OBX|9|NM|HGB^Hemoglobin||13.2|g/dL|12-16|N||F\r\
NTE|9||hemolyzed\r\
OBX|9|NM|WBC^Leukocytes||6.1|10*3/uL|4-11|N||F\r\
ORC|RE|ORD2\r\
OBR|9|ORD2||BMP^Basic metabolic panel\r\
OBX|9|NM|NA^Sodium||140|mmol/L|135-145|N||F\r\
OBX|9|NM|K^Potassium||4.1|mmol/L|3.5-5.1|N||F";

/// Segment types in message order
pub fn segment_types(message: &Message) -> Vec<String> {
    message
        .segments()
        .iter()
        .map(|(_, s)| s.segment_type().to_string())
        .collect()
}

/// Read one value from a segment, panicking on a stale handle or bad address
pub fn read(message: &Message, id: SegmentId, address: &str) -> Option<String> {
    message
        .segments()
        .segment(id)
        .and_then(|s| s.get(address))
        .unwrap_or_else(|e| panic!("reading {address}: {e}"))
}
