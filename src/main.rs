use std::time::Instant;

use rand::Rng;

use gustav::{compress_with_density, multiply, DenseMatrix, Schedule, Strategy};

fn random_dense(rows: usize, cols: usize, density: f32) -> DenseMatrix {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        if rng.gen::<f32>() < density {
            data.push(rng.gen_range(-10..=10));
        } else {
            data.push(0);
        }
    }
    DenseMatrix::from_flat(rows, cols, data)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    tracing_subscriber::fmt::init();

    let size: usize = env_or("GUSTAV_SIZE", 512);
    let density: f32 = env_or("GUSTAV_DENSITY", 0.05);
    println!("gustav {}: {}x{}x{} multiply at density {:.2}", gustav::VERSION, size, size, size, density);

    let dense_a = random_dense(size, size, density);
    let dense_b = random_dense(size, size, density);

    let start = Instant::now();
    let a = compress_with_density(&dense_a, density).expect("compression failed");
    let b = compress_with_density(&dense_b, density).expect("compression failed");
    println!(
        "compressed both operands in {:.3}s ({} + {} stored entries)",
        start.elapsed().as_secs_f64(),
        a.nnz(),
        b.nnz()
    );

    let start = Instant::now();
    let sequential = multiply(&a, &b, Strategy::Sequential)
        .expect("sequential multiply failed")
        .expect("sequential multiply always yields a result");
    println!("sequential multiply: {:.3}s", start.elapsed().as_secs_f64());

    let workers = num_cpus::get();
    let start = Instant::now();
    let threaded = multiply(
        &a,
        &b,
        Strategy::SharedMemory {
            workers,
            schedule: Schedule::Auto,
        },
    )
    .expect("shared-memory multiply failed")
    .expect("shared-memory multiply always yields a result");
    println!(
        "shared-memory multiply ({} workers): {:.3}s",
        workers,
        start.elapsed().as_secs_f64()
    );

    assert_eq!(sequential, threaded, "strategies must agree");

    if size <= 16 {
        println!("\nA:\n{}", dense_a);
        println!("B:\n{}", dense_b);
        println!("A*B:\n{}", sequential);
    }
}
