use std::time::Instant;

use crate::contract::MatchRequest;
use crate::matcher::resolve;
use crate::model::Tab;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn title_resolution_p95_under_15ms() {
    let mut tabs: Vec<Tab> = (0..5_000)
        .map(|i| {
            Tab::new(
                i as i64,
                i,
                &format!("Document {i:05} - Shared Drive"),
                &format!("https://drive.example/{i}"),
            )
        })
        .collect();

    tabs.push(Tab::new(
        99_999,
        5_000,
        "Q4 Release Notes",
        "https://notes.example/q4",
    ));
    let request = MatchRequest::ByTitle {
        query: "release notes".into(),
    };

    for _ in 0..30 {
        let _ = resolve(&request, &tabs);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(80);
        for _ in 0..80 {
            let start = Instant::now();
            let winner = resolve(&request, &tabs);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert_eq!(winner.map(|tab| tab.position_index), Some(5_000));
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 15.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 15.0ms); batches={batch_p95:?}",
    );
}
