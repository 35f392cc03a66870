use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use checkin_desks::{CheckInCoordinator, Flight, FlightCatalog, FlightLimits, Passenger, PassengerRegistry};
use rand::{thread_rng, Rng};
use std::sync::Arc;
use std::thread;

const PASSENGERS: usize = 4000;

fn setup() -> CheckInCoordinator {
    let limits = FlightLimits {
        passenger_capacity: 400,
        max_baggage_volume: 200.0,
        max_baggage_weight: 8000.0,
        fee_multiplier: 1.5,
    };
    let catalog = Arc::new(
        FlightCatalog::new((0..10).map(|i| Flight::new(&format!("FL{:03}", i), "Dest", "Carrier", limits)))
            .unwrap(),
    );

    let registry = Arc::new(PassengerRegistry::new());
    for i in 0..PASSENGERS {
        let flight = catalog.get(&format!("FL{:03}", i % 10)).unwrap();
        let passenger = Passenger::new(&format!("ben{:04}", i), "Bench", "Mark", flight).unwrap();
        registry.add(passenger, false).unwrap();
    }

    CheckInCoordinator::new(catalog, registry)
}

// Every desk walks the full passenger list, so most attempts lose the race
pub fn checkin_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_check_in");
    group.sample_size(20);

    for desks in [1, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(desks), desks, |b, &desks| {
            b.iter(|| {
                let coordinator = setup();

                let mut handles = vec![];
                for _ in 0..desks {
                    let coordinator = coordinator.clone();
                    handles.push(thread::spawn(move || {
                        let mut rng = thread_rng();
                        for i in 0..PASSENGERS {
                            let dims = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
                            let _ = coordinator.process_passenger(&format!("ben{:04}", i), dims, rng.gen_range(0.0..40.0));
                        }
                    }));
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(coordinator.generate_report())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, checkin_benchmark);
criterion_main!(benches);
