use tailtracer::{Catalog, Generator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let generator = Generator::new(Catalog::atm_scenario());

    println!("🏧 Synthesizing 5 ATM traces...");
    let batch = generator.generate_batch(5)?;

    for trace in batch.traces() {
        println!(
            "  {} {} {:<14} {:<20} -> {} ({})",
            trace.client.start_time.to_rfc3339().unwrap_or_default(),
            trace.trace_id(),
            trace.client.name,
            trace.device.service_name().unwrap_or("?"),
            trace.server.name,
            trace.traceparent(),
        );
    }

    println!("🎉 Done! {} spans across {} traces", batch.span_count(), batch.len());
    Ok(())
}
