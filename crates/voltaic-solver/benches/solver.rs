//! Benchmarks for the dense solver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voltaic_core::mna::MnaElement;
use voltaic_core::Uid;
use voltaic_solver::solve_dc;

/// A resistor ladder of `rungs` sections driven by one voltage source.
fn ladder(rungs: usize) -> (Vec<MnaElement>, usize, usize) {
    let mut elements = Vec::new();
    let mut next_id = 0u32;
    let mut id = move || {
        let id = Uid::new(next_id);
        next_id += 1;
        id
    };

    let node_count = rungs + 2;
    let ground = node_count - 1;

    elements.push(MnaElement::VSource {
        id: id(),
        label: None,
        plus: 0,
        minus: ground,
        volts: 10.0,
        independent: true,
    });
    for rung in 0..rungs {
        elements.push(MnaElement::Resistor {
            id: id(),
            label: None,
            a: rung,
            b: rung + 1,
            ohms: 100.0,
        });
        elements.push(MnaElement::Resistor {
            id: id(),
            label: None,
            a: rung + 1,
            b: ground,
            ohms: 1000.0,
        });
    }

    (elements, node_count, ground)
}

fn bench_solve_dc(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_dc");

    for rungs in [4, 16, 64] {
        let (elements, node_count, ground) = ladder(rungs);
        group.bench_with_input(
            BenchmarkId::from_parameter(rungs),
            &elements,
            |bencher, elements| {
                bencher.iter(|| {
                    solve_dc(black_box(elements), node_count, ground).unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_solve_dc);
criterion_main!(benches);
