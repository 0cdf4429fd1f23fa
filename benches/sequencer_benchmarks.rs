use chord_metronome::{ChordPicker, ClickSound, ClickVoice, SelectionMode};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Rendering the click happens once per stream, but must stay well under a frame
fn bench_click_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("click_render");

    for sample_rate in [44100.0f32, 48000.0, 96000.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(sample_rate as u32),
            &sample_rate,
            |b, &rate| {
                b.iter(|| black_box(ClickSound::new(rate)));
            },
        );
    }
    group.finish();
}

/// Audio callback cost: one 512-frame buffer with a click playing
fn bench_click_voice(c: &mut Criterion) {
    let mut voice = ClickVoice::new(48000.0);
    let mut buffer = vec![0.0f32; 512];

    c.bench_function("click_voice_512", |b| {
        b.iter(|| {
            voice.trigger();
            voice.process_buffer(&mut buffer);
            black_box(&buffer);
        });
    });
}

fn bench_next_chord(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_chord");
    let chords: Vec<String> = (0..64).map(|i| format!("chord{}", i)).collect();

    for mode in [SelectionMode::Random, SelectionMode::Sequential] {
        let mut picker = ChordPicker::seeded(1);
        let mut current = chords[0].clone();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", mode)),
            &mode,
            |b, &mode| {
                b.iter(|| {
                    if let Some(next) = picker.next_after(&current, &chords, mode) {
                        current = next;
                    }
                    black_box(&current);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_click_render, bench_click_voice, bench_next_chord);
criterion_main!(benches);
