//! Live text dashboard for the smart-office simulation
//!
//! Prints a summary of every room whenever the environment snapshot changes.
//!
//! Run with: OFFICE_LOG_MODE=development cargo run -p office-sdk --example live_view
//! Point it at another backend with OFFICE_API_URL=http://host:port.

use office_sdk::{Comfort, OfficeSdk, SdkError, SyncConfig, ViewChange};

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    office_sdk::init_logging_from_env()?;

    let config = SyncConfig::from_env();
    println!("Smart office live view ({})", config.base_url);
    println!("Press Ctrl-C to stop");

    let sdk = OfficeSdk::new(config)?;
    let mut changes = sdk.view().subscribe_changes();
    sdk.start()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Ok(ViewChange::StateUpdated) => render(&sdk),
                Ok(ViewChange::AlertsUpdated) => {
                    let snapshot = sdk.snapshot();
                    println!("  alerts: {}", snapshot.alert_count());
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => render(&sdk),
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    sdk.shutdown().await?;
    println!("Stopped");
    Ok(())
}

fn render(sdk: &OfficeSdk) {
    let snapshot = sdk.snapshot();
    let Some(state) = &snapshot.state else {
        return;
    };

    println!(
        "\n{}  outside {:.1} °C  daylight {}%{}",
        state.simulation_time,
        state.external_temperature,
        state.daylight_percent(),
        if state.power_outage { "  POWER OUTAGE" } else { "" }
    );

    for room in snapshot.room_views() {
        let flag = match room.comfort() {
            Comfort::TooCold => " (cold)",
            Comfort::TooWarm => " (warm)",
            Comfort::Comfortable => "",
        };
        let heating = match room.heating_active {
            Some(true) => "on",
            Some(false) => "off",
            None => "?",
        };
        let blinds = room
            .room
            .blinds
            .as_ref()
            .map(|b| b.as_device_state().as_str())
            .unwrap_or("-");

        println!(
            "  {:<16} {:>5.1} °C{:<7} people {:>2}  heating {:<3}  blinds {}",
            room.room.name,
            room.display_temperature(),
            flag,
            room.room.people_count,
            heating,
            blinds
        );
    }
}
