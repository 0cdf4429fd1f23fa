use chord_metronome::messaging::channels::{
    COMMAND_RINGBUFFER_CAPACITY, NOTIFICATION_RINGBUFFER_CAPACITY, NotificationProducer,
};
use chord_metronome::messaging::notification::{Notification, NotificationCategory};
use chord_metronome::ui::app::ChordMetronomeApp;
use chord_metronome::{
    AudioEngine, ClickTrigger, FileStore, KeyValueStore, MemoryStore, Practice, PracticeSettings,
    create_command_channel, create_notification_channel,
};
use std::sync::{Arc, Mutex};

fn notify(notification_tx: &Arc<Mutex<NotificationProducer>>, notification: Notification) {
    if let Ok(mut tx) = notification_tx.lock() {
        let _ = ringbuf::traits::Producer::try_push(&mut *tx, notification);
    }
}

/// Settings store on disk, or in memory when no config directory exists
fn open_store(notification_tx: &Arc<Mutex<NotificationProducer>>) -> Arc<dyn KeyValueStore> {
    match FileStore::from_env() {
        Ok(store) => {
            log::info!("Settings stored in {}", store.root().display());
            Arc::new(store)
        }
        Err(e) => {
            log::error!("Settings will not be saved: {}", e);
            notify(
                notification_tx,
                Notification::error(
                    NotificationCategory::Storage,
                    format!("Settings will not be saved: {}", e),
                ),
            );
            Arc::new(MemoryStore::new())
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Starting Chord Metronome");

    // UI → audio commands, and audio → UI notifications
    let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    let store = open_store(&notification_tx);
    let settings = PracticeSettings::load(store);
    let practice = Practice::new(settings, Box::new(ClickTrigger::new(command_tx)));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 560.0])
            .with_title("Chord Metronome"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Chord Metronome",
        native_options,
        Box::new(move |_cc| {
            // The audio output exists only while the window does
            let audio_engine = match AudioEngine::new(command_rx, notification_tx.clone()) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    log::error!("Audio unavailable: {}", e);
                    notify(
                        &notification_tx,
                        Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio unavailable, running silent: {}", e),
                        ),
                    );
                    None
                }
            };

            Ok(Box::new(ChordMetronomeApp::new(
                practice,
                audio_engine,
                notification_rx,
            )))
        }),
    );

    if let Err(e) = result {
        log::error!("UI error: {}", e);
    }
}
