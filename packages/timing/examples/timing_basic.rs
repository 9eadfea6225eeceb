//! Prints wall-clock readings and logs how long a few nested scopes took.

use std::thread;
use std::time::Duration;

use timing::{ScopedTimer, Verbosity, time_scope};

fn main() {
    tracing_subscriber::fmt().init();

    println!("timestamp: {} ms", timing::timestamp_ms());
    println!("UTC now:   {}", timing::utc_date_time());

    time_scope!("whole example");

    for step in 0..3_u64 {
        time_scope!(format!("step {step}"), Verbosity::High);
        thread::sleep(Duration::from_millis(10 * (step + 1)));
    }

    let timer = ScopedTimer::new("explicit timer", Verbosity::Normal);
    thread::sleep(Duration::from_millis(5));
    println!("explicit timer so far: {:?}", timer.elapsed());
}
