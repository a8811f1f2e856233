// benches/defs.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use didel::core::defs::parse_defs;
use didel::core::html::sel;
use scraper::Html;

fn sample_block() -> String {
    // A details block about the size the portal actually serves.
    let mut body = String::from("<p><small>");
    for i in 0..50 {
        body.push_str(&format!("<b>Label {i}</b> : value number <i>{i}</i><br/>"));
    }
    body.push_str("</small></p>");
    body
}

fn bench_defs(c: &mut Criterion) {
    let page = sample_block();

    c.bench_function("parse_defs", |b| {
        let doc = Html::parse_fragment(&page);
        let block = doc.select(&sel("small")).next().unwrap();
        b.iter(|| black_box(parse_defs(black_box(block))).len())
    });

    c.bench_function("parse_defs_including_html_parse", |b| {
        b.iter(|| {
            let doc = Html::parse_fragment(black_box(&page));
            let block = doc.select(&sel("small")).next().unwrap();
            black_box(parse_defs(block).len())
        })
    });
}

criterion_group!(benches, bench_defs);
criterion_main!(benches);
