use criterion::{black_box, criterion_group, criterion_main, Criterion};
use medi_hl7::{Message, ReindexOptions, ResetRules};

fn mk_oru(orders: usize, observations: usize) -> String {
    let mut lines = vec![
        "MSH|^~\\&|LAB|GHH|EHR|GHH|202501010101||ORU^R01|MSG0001|P|2.5".to_string(),
        "PID|1||P12345^^^GHH^MR||Doe^Jane||19851224|F".to_string(),
    ];
    for o in 0..orders {
        lines.push(format!("ORC|RE|ORD{o}"));
        lines.push(format!("OBR|1|ORD{o}||CBC^Complete blood count"));
        for i in 0..observations {
            lines.push(format!("OBX|0|NM|T{i}^Test {i}||{i}.5|mg/dL|1-10|N||F"));
        }
    }
    lines.join("\r")
}

fn bench_parse_build(c: &mut Criterion) {
    let raw = mk_oru(200, 20);

    c.bench_function("parse_oru_4k_segments", |b| {
        b.iter(|| {
            let message = Message::new(black_box(raw.as_str())).unwrap();
            black_box(message.segments().len())
        })
    });

    let message = Message::new(raw.as_str()).unwrap();
    c.bench_function("build_oru_4k_segments", |b| {
        b.iter(|| black_box(message.build().len()))
    });
}

fn bench_edits(c: &mut Criterion) {
    let raw = mk_oru(200, 20);
    let rules = ResetRules::new()
        .with_rule("OBR", &["ORC"])
        .unwrap()
        .with_rule("OBX", &["ORC", "OBR"])
        .unwrap();

    c.bench_function("reindex_oru_4k_segments", |b| {
        let mut message = Message::new(raw.as_str()).unwrap();
        b.iter(|| {
            message.reindex(&rules, &ReindexOptions::default()).unwrap();
        })
    });

    c.bench_function("move_and_delete_observations", |b| {
        b.iter(|| {
            let mut message = Message::new(raw.as_str()).unwrap();
            let segments = message.segments_mut();
            let pid = segments.get_segment("PID").unwrap().unwrap();
            let obx = segments.get_segments(Some("OBX")).unwrap();
            for &id in obx.iter().step_by(2) {
                segments.move_segment_after(id, pid).unwrap();
            }
            black_box(segments.delete_segments(&obx).len())
        })
    });
}

criterion_group!(benches, bench_parse_build, bench_edits);
criterion_main!(benches);
