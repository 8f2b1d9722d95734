//! Host application wiring: one bus, one renderer, one scheduler, one
//! ghost manager, constructed together at startup and explicitly shared.

use std::path::PathBuf;
use std::sync::Arc;

use yurei_bus::{Signal, SignalBus};
use yurei_core::Value;

use crate::error::HostError;
use crate::ghosts::GhostManager;
use crate::scheduler::ClockScheduler;
use crate::sysinfo::SystemInfo;

pub struct HostApp {
    bus: Arc<SignalBus>,
    info: Arc<SystemInfo>,
    scheduler: ClockScheduler,
    ghosts: GhostManager,
}

impl HostApp {
    pub fn new(root: PathBuf) -> Self {
        let bus = Arc::new(SignalBus::new());
        let info = Arc::new(SystemInfo::new());
        let scheduler = ClockScheduler::new(Arc::clone(&bus), Arc::clone(&info));
        let ghosts = GhostManager::new(root, Arc::clone(&bus));
        HostApp {
            bus,
            info,
            scheduler,
            ghosts,
        }
    }

    pub fn bus(&self) -> &Arc<SignalBus> {
        &self.bus
    }

    pub fn ghosts(&self) -> &GhostManager {
        &self.ghosts
    }

    /// Scans installed packages, announces the world, and starts the clock.
    pub fn boot(&self) -> Result<(), HostError> {
        self.ghosts.scan_installed()?;
        self.bus.publish(&Signal::new("world.boot"));
        self.publish_power();
        self.publish_network();
        self.scheduler.start();
        Ok(())
    }

    /// Stops the clock and announces shutdown to whoever is still
    /// listening.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.bus.publish(&Signal::new("world.shutdown"));
    }

    fn publish_power(&self) {
        let status = self.info.power_status();
        let mut signal = Signal::new("world.power");
        if let Some(level) = status.level {
            signal = signal.with("level", Value::Int(level));
        }
        if let Some(charging) = status.charging {
            signal = signal.with("charging", Value::Bool(charging));
        }
        self.bus.publish(&signal);
    }

    fn publish_network(&self) {
        let status = self.info.network_status();
        let mut signal = Signal::new("world.network");
        if let Some(online) = status.online {
            signal = signal.with("online", Value::Bool(online));
        }
        if let Some(kind) = status.connection_type {
            signal = signal.with("connection_type", Value::Text(kind));
        }
        self.bus.publish(&signal);
    }
}
