use dnabot::{Session, SimConfig, SimServer};
use tracing::info;

pub(super) fn run_serve(bind: &str, config: SimConfig) -> Result<(), String> {
    let session = Session::new(config).map_err(|e| e.to_string())?;
    info!(
        width = config.width,
        height = config.height,
        mutations = config.mutations,
        seed = ?config.seed,
        "starting simulation"
    );
    let server = SimServer::bind(bind, session.into_shared())?;
    let handle = server.spawn()?;
    println!("Serving on http://{}", handle.addr());
    handle.join()
}
