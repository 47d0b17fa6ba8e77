use boundary_tui::{tracing_setup::init_tracing, try_main};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing()?;
    tracing::info!("starting boundary demo");
    try_main()
}
