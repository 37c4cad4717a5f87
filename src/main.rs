/*!
 * Lifecycle Host - Main Entry Point
 *
 * Drives the runtime the way a loader would:
 * - Process attach
 * - Worker threads attaching, copying, detaching
 * - Process detach
 */

use std::error::Error;
use std::thread;
use tracing::{info, warn};

use runtime_lifecycle::lifecycle::host;
use runtime_lifecycle::{bulk_copy, init_tracing};

const WORKER_COUNT: usize = 4;
const BUFFER_LEN: usize = 4096;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Lifecycle host starting...");

    if !host::initialize_process() {
        return Err("process runtime failed to initialize".into());
    }

    let runtime = host::runtime();
    let snapshot = serde_json::to_string(&runtime.lifecycle().snapshot())?;
    info!(snapshot = %snapshot, "Process runtime attached");

    let workers = (0..WORKER_COUNT)
        .map(|worker| {
            thread::Builder::new()
                .name(format!("worker-{}", worker))
                .spawn(move || run_worker(worker))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (worker, handle) in workers.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(moved)) => info!(worker, moved, "Worker finished"),
            Ok(Err(e)) => warn!(worker, error = %e, "Worker failed"),
            Err(_) => warn!(worker, "Worker panicked"),
        }
    }

    runtime.telemetry().record_event(
        "workers_joined",
        serde_json::json!({ "workers": WORKER_COUNT }),
    );

    host::uninitialize_process(false);
    info!(state = %runtime.lifecycle().state(), "Lifecycle host exiting");
    Ok(())
}

fn run_worker(worker: usize) -> Result<usize, Box<dyn Error + Send + Sync>> {
    let attachment = host::runtime().lifecycle().attach_current_thread()?;
    info!(worker, handle = %attachment.handle(), "Worker attached");

    let mut buffer: Vec<u8> = (0..=u8::MAX).cycle().take(BUFFER_LEN).collect();
    let offset = 64 * (worker + 1);
    let moved = bulk_copy(&mut buffer, 0, offset, BUFFER_LEN - offset)?;
    Ok(moved)
}
