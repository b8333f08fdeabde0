use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use regex_chess::test_tables::scripted_game;
use regex_chess::{run_pass, GameState};

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    state: &'static str,
    input: Option<&'static str>,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "bootstrap",
        state: "",
        input: None,
    },
    BenchCase {
        name: "scripted_reply",
        state: "Moves: 1.e4\nEnter Your Move: ",
        input: Some("e7e5"),
    },
    BenchCase {
        name: "illegal_input",
        state: "Moves: 1.e4\nEnter Your Move: ",
        input: Some("h1h8"),
    },
];

fn bench_run_pass(c: &mut Criterion) {
    let table = scripted_game();
    let mut group = c.benchmark_group("run_pass");

    for case in CASES {
        let mut state = GameState::from_text(case.state);
        if let Some(token) = case.input {
            state = state.append_input(token);
        }

        group.throughput(Throughput::Bytes(state.as_str().len().max(1) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(case.name),
            &state,
            |b, state| {
                b.iter(|| run_pass(black_box(&table), black_box(state.clone())).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_run_pass);
criterion_main!(benches);
