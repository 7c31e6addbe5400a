//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Cardbox");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}

/// Box opened from the storage directory when no path is given.
#[cfg(feature = "native")]
const DEFAULT_BOX: &str = "Untitled";

#[cfg(feature = "native")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use cardbox_app::{AppConfig, Session, ShortcutRegistry};
    use cardbox_core::storage::Storage;
    use cardbox_core::TagIndex;
    use std::path::PathBuf;

    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        println!("Usage: cardbox [PATH]");
        ShortcutRegistry::print_all();
        return Ok(());
    }

    let config = AppConfig::load_default()?;
    let (mut session, storage) = match arg {
        Some(p) => (Session::open_or_create(&PathBuf::from(p), config)?, None),
        None => {
            let storage = config.open_storage()?;
            for name in storage.list()? {
                log::debug!("stored box {:?}", name);
            }
            let session = Session::open_or_create_in(&storage, DEFAULT_BOX, config)?;
            (session, Some(storage))
        }
    };
    log::info!("Opened box {:?} ({} decks)", session.name, session.boards().len());

    for index in 0..session.boards().len() {
        let Some(board) = session.board_mut(index) else {
            continue;
        };
        let mut tags = TagIndex::new();
        board.sync_tags(&mut tags);
        let deck = board.deck();
        log::info!(
            "Deck {:?}: {} cards, {} groups, {} annotation strokes",
            deck.name(),
            deck.len(),
            deck.groups().len(),
            deck.annotation().len()
        );
        for key in tags.keys() {
            log::info!("  tag {:?} on cards {:?}", key, tags.cards_with(key));
        }
    }

    match &storage {
        Some(storage) => {
            session.save_to(storage)?;
            log::info!("Saved {}", storage.box_path(&session.name).display());
        }
        None => {
            session.save()?;
            log::info!("Saved {:?}", session.path);
        }
    }
    Ok(())
}
