#![allow(clippy::approx_constant)]

use gorilla_window::{PlainCodec, Sample, SlidingWindow, WindowConfig, DEFAULT_OVERFLOW};

const FACTOR: f64 = 3.14;

fn filled(limit: usize, overflow: usize, count: i64) -> SlidingWindow {
    let window = SlidingWindow::builder(limit).overflow(overflow).build().unwrap();
    for i in 1..=count {
        window.push(i, i as f64 * FACTOR);
    }
    window
}

fn sample(t: i64) -> Sample {
    Sample::new(t, t as f64 * FACTOR)
}

#[test]
fn test_get_scenario() {
    let window = SlidingWindow::new(100);
    assert_eq!(window.overflow(), DEFAULT_OVERFLOW);
    assert_eq!(window.get_n(1).len(), 0);

    for i in 1..=1024 {
        window.push(i, i as f64 * FACTOR);
    }

    let r = window.get_n(1);
    assert_eq!(r, vec![sample(1024)]);

    let r = window.get_n(20);
    assert_eq!(r[0], sample(1024));
    assert_eq!(r[19], sample(1005));

    let r = window.get_n(100);
    assert_eq!(window.len(), 100);
    assert_eq!(r.len(), 100);
    assert_eq!(r[1], sample(1023));
    assert_eq!(r[99], sample(925));

    window.reset_limit(10);
    assert_eq!(window.len(), 10);
    assert_eq!(window.get_all().len(), 10);

    let r = window.get_n(100);
    assert_eq!(r.len(), 10);
    assert_eq!(r[9], sample(1015));
}

#[test]
fn test_exact_capacity_seals_one_block() {
    let window = filled(100, 20, 20);
    assert_eq!(window.len(), 20);
    let stats = window.stats();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.hot_len, 0);
    assert_eq!(stats.total, 20);
    assert_eq!(window.get_all(), (1..=20).rev().map(sample).collect::<Vec<_>>());
}

#[test]
fn test_roundtrip_reverse_order() {
    let window = filled(500, 16, 437);
    let expected: Vec<Sample> = (1..=437).rev().map(sample).collect();
    assert_eq!(window.get_n(437), expected);
}

#[test]
fn test_get_n_clamped_by_limit() {
    let window = filled(30, 7, 200);
    assert_eq!(window.get_n(1000).len(), 30);
    assert_eq!(window.get_all(), window.get_n(30));
}

#[test]
fn test_cap_is_configured_ceiling() {
    let window = filled(50, 20, 3);
    assert_eq!(window.cap(), 70);
    assert_eq!(window.len(), 3);
    window.reset_limit(5);
    assert_eq!(window.cap(), 25);
}

#[test]
fn test_lowering_limit_keeps_newest() {
    let window = filled(200, 10, 1000);
    let before = window.get_n(35);
    window.reset_limit(35);
    assert_eq!(window.len(), 35);
    assert_eq!(window.get_all(), before);
    assert!(window.stats().total < 35 + 10);
}

#[test]
fn test_raising_limit_never_evicts() {
    let window = filled(40, 10, 45);
    let total = window.stats().total;
    window.reset_limit(400);
    assert_eq!(window.stats().total, total);
    assert_eq!(window.len(), total);
}

#[test]
fn test_with_config_and_plain_codec_agree() {
    let config = WindowConfig {
        limit: 64,
        overflow: 9,
        fast_mode: true,
    };
    let gorilla = SlidingWindow::<gorilla_window::GorillaEncoder>::with_config(config.clone()).unwrap();
    let plain = SlidingWindow::<PlainCodec>::with_config(config).unwrap();
    for i in 0..300 {
        let v = (i as f64 * 0.37).cos() * 100.0;
        gorilla.push(1_000 + i * 10, v);
        plain.push(1_000 + i * 10, v);
    }
    for n in [0, 1, 8, 9, 10, 27, 64, 65] {
        assert_eq!(gorilla.get_n(n), plain.get_n(n), "n={n}");
    }
    assert!(gorilla.stats().compressed_bytes < plain.stats().compressed_bytes);
}

#[test]
fn test_duplicate_timestamps_accepted() {
    let window = SlidingWindow::builder(10).overflow(3).build().unwrap();
    for v in 0..7 {
        window.push(42, v as f64);
    }
    let values: Vec<f64> = window.get_all().iter().map(|s| s.value).collect();
    assert_eq!(values, vec![6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
}
