use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the console subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() -> anyhow::Result<()> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relief_workflow=debug,relief_api_client=debug".into()),
        )
        .with(console_fmt)
        .try_init()?;

    tracing::debug!("Tracing initialized");
    Ok(())
}
