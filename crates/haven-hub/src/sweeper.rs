//! Background expiry sweep

use crate::hub::Hub;
use std::sync::Arc;

impl Hub {
    /// Start the periodic sweep of expired restrictions.
    ///
    /// Must be called inside a tokio runtime. The sweep itself touches storage,
    /// so each pass runs on the blocking pool. Abort the handle to stop it.
    pub fn start_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(&self.restrictions);
        let period = self.config.restrictions.sweep_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let manager = Arc::clone(&manager);
                match tokio::task::spawn_blocking(move || manager.sweep()).await {
                    Ok(report) if report.evicted > 0 => log::debug!(
                        "Sweep evicted {} restrictions, {} players now clear",
                        report.evicted,
                        report.emptied_players
                    ),
                    Ok(_) => {}
                    Err(e) => log::error!("Restriction sweep panicked: {e}"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::HubConfig;
    use crate::hub::Hub;
    use haven_core::{
        Catalog, ManualClock, PlayerId, RestrictionAction, RestrictionDef, RestrictionKind,
    };
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sweeper_evicts_expired() {
        let clock = Arc::new(ManualClock::at(0));
        let catalog = Catalog::from_defs([RestrictionDef::new("muted", RestrictionKind::Command)
            .unwrap()
            .with_action(RestrictionAction::Execute)
            .with_target("msg")
            .unwrap()])
        .unwrap();
        let mut config = HubConfig::default();
        config.restrictions.sweep_interval_secs = 1;
        let hub = Hub::builder(config)
            .catalog(catalog)
            .clock(clock.clone())
            .build();

        let p = PlayerId::random();
        hub.restrictions().assign(p, "muted", 5).unwrap();
        assert_eq!(hub.restrictions().tracked_players(), 1);
        clock.advance_secs(10);

        let handle = hub.start_sweeper();
        for _ in 0..100 {
            if hub.restrictions().tracked_players() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();
        assert_eq!(hub.restrictions().tracked_players(), 0);
    }
}
