//! Diffing engine benchmark: Measure grid reconciliation performance.
//!
//! `render_diff` updates the front grid as it goes, so every iteration
//! starts from fresh clones.

use cellgrid::buffer::diff::{render_diff, DiffState};
use cellgrid::terminal::OutputBuffer;
use cellgrid::{Attribute, Buffer, Cell, ColorMode};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

/// Create a grid with varied glyphs and colors.
fn create_test_buffer(width: u16, height: u16, seed: u16) -> Buffer {
    let mut buffer = Buffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let c = char::from(((x + y + seed) % 26) as u8 + b'A');
            let fg = Attribute::indexed(((x * 3 + seed) % 8) as u8);
            let bg = Attribute::indexed(((y + seed) % 8) as u8);
            buffer.set(x, y, Cell::new(c, fg, bg));
        }
    }
    buffer
}

fn bench_diff(c: &mut Criterion, name: &str, back: &Buffer, front: &Buffer, mode: ColorMode) {
    c.bench_function(name, |b| {
        b.iter_batched(
            || (back.clone(), front.clone(), OutputBuffer::with_capacity(65536)),
            |(mut back, mut front, mut output)| {
                let mut state = DiffState::new();
                render_diff(
                    black_box(&mut back),
                    black_box(&mut front),
                    &mut output,
                    &mut state,
                    mode,
                )
            },
            BatchSize::LargeInput,
        );
    });
}

fn diff_identical_buffers(c: &mut Criterion) {
    let buffer = create_test_buffer(200, 50, 0);
    bench_diff(c, "diff_200x50_identical", &buffer, &buffer, ColorMode::Normal);
}

fn diff_single_cell_change(c: &mut Criterion) {
    let front = create_test_buffer(200, 50, 0);
    let mut back = front.clone();
    back.set(100, 25, Cell::new('X', Attribute::RED, Attribute::DEFAULT));
    bench_diff(c, "diff_200x50_single_change", &back, &front, ColorMode::Normal);
}

fn diff_line_change(c: &mut Criterion) {
    let front = create_test_buffer(200, 50, 0);
    let mut back = front.clone();
    for x in 0..200 {
        back.set(x, 25, Cell::new('*', Attribute::YELLOW, Attribute::DEFAULT));
    }
    bench_diff(c, "diff_200x50_line_change", &back, &front, ColorMode::Normal);
}

fn diff_many_changes(c: &mut Criterion) {
    let front = create_test_buffer(200, 50, 0);
    let back = create_test_buffer(200, 50, 1);
    bench_diff(c, "diff_200x50_full_change", &back, &front, ColorMode::Normal);
    bench_diff(c, "diff_200x50_full_change_256", &back, &front, ColorMode::Color256);
}

fn diff_wide_glyphs(c: &mut Criterion) {
    let front = Buffer::new(200, 50);
    let mut back = Buffer::new(200, 50);
    for y in 0..50 {
        for x in (0..200).step_by(2) {
            back.set(x, y, Cell::new('漢', Attribute::CYAN, Attribute::DEFAULT));
        }
    }
    bench_diff(c, "diff_200x50_wide_glyphs", &back, &front, ColorMode::Normal);
}

fn diff_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_by_size");

    for (width, height) in [(80, 24), (120, 40), (200, 50), (300, 80)] {
        let front = create_test_buffer(width, height, 0);
        let back = create_test_buffer(width, height, 1);

        group.bench_with_input(
            BenchmarkId::new("full_change", format!("{width}x{height}")),
            &(back, front),
            |b, (back, front)| {
                b.iter_batched(
                    || (back.clone(), front.clone(), OutputBuffer::with_capacity(65536)),
                    |(mut back, mut front, mut output)| {
                        let mut state = DiffState::new();
                        render_diff(&mut back, &mut front, &mut output, &mut state, ColorMode::Normal)
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    diff_identical_buffers,
    diff_single_cell_change,
    diff_line_change,
    diff_many_changes,
    diff_wide_glyphs,
    diff_various_sizes,
);
criterion_main!(benches);
