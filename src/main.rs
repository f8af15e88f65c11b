use pingboard::app::AppState;
use pingboard::bus::UpdateBus;
use pingboard::probe_engine::{RunnerOptions, SystemCommands};
use pingboard::runtime::ProbeScheduler;
use pingboard::settings::load_from_cli;
use pingboard::store::AddressStore;
use pingboard::ui::run_ui;
use pingboard::{ingest, logging};
use std::sync::Arc;

fn main() -> std::io::Result<()> {
    let settings = load_from_cli()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;

    if let Err(err) = logging::init(&settings.log_file) {
        eprintln!("pingboard: logging disabled: {err}");
    }
    tracing::info!(?settings, "starting");

    let store = Arc::new(AddressStore::new());
    ingest::load_piped_stdin(&store);
    ingest::load_files(&store, &settings.files);

    let bus = UpdateBus::new(settings.queue_depth);
    let options = RunnerOptions::new(Arc::new(SystemCommands::host()))
        .with_transcript_dir(Some(settings.transcript_dir.clone()));
    let scheduler = ProbeScheduler::spawn(Arc::clone(&store), bus.clone(), options);
    let app = AppState::new(store, scheduler, bus.subscriber(), settings.history);

    run_ui(app, settings.refresh_hz)?;
    tracing::info!("exiting");
    Ok(())
}
