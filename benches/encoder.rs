use criterion::{criterion_group, criterion_main, Criterion};

use albumwall::{
    display::device::{buffer_len, encode_ws2812},
    models::{Color, ColorOrder},
};

pub fn criterion_benchmark(c: &mut Criterion) {
    for &led_count in &[30usize, 300] {
        let leds: Vec<Color> = (0..led_count)
            .map(|i| Color::new(i as u8, (i * 3) as u8, (i * 7) as u8))
            .collect();
        let mut buf = vec![0u8; buffer_len(led_count, 3_000_000)];

        c.bench_function(&format!("ws2812 encode {} leds", led_count), |b| {
            b.iter(|| encode_ws2812(&leds, ColorOrder::Grb, false, &mut buf))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
