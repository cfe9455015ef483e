// Entry point. Takes no arguments: the input and output locations are fixed
// by `ReportConfig::default()`, and the run either completes or exits
// non-zero with the first fatal error.
use anyhow::{Context, Result};
use customer_health_report::{pipeline, ReportConfig};

fn main() -> Result<()> {
    init_logging();

    let config = ReportConfig::default();
    log::debug!("report config: {:?}", config);

    pipeline::banner();
    pipeline::run(&config).with_context(|| {
        format!(
            "customer health report failed (input: {})",
            config.input_path.display()
        )
    })?;
    Ok(())
}

/// Warnings and errors by default; `RUST_LOG` overrides.
fn init_logging() {
    use env_logger::{Builder, Env};
    use std::io::Write;

    Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
