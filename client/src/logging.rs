use tracing::Level;

fn max_level(debug: bool) -> Level {
    if debug || cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

#[cfg(target_arch = "wasm32")]
pub fn configure_logging(debug: bool) -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;

    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(max_level(debug))
        .build();
    let subscriber = tracing_subscriber::registry().with(tracing_wasm::WASMLayer::new(config));
    Ok(tracing::subscriber::set_global_default(subscriber)?)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn configure_logging(debug: bool) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level(debug))
        .finish();
    Ok(tracing::subscriber::set_global_default(subscriber)?)
}
