//! The clock scheduler: one background thread that publishes
//! `world.clock` and `world.uptime` at each minute boundary.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use yurei_bus::{Signal, SignalBus};
use yurei_core::Value;

use crate::sysinfo::SystemInfo;

/// Cooperative cancellation: a flag plus a condvar so the sleeping worker
/// wakes promptly on stop instead of riding out its timeout.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn set(&self) {
        *self.stopped.lock().expect("scheduler stop flag poisoned") = true;
        self.wake.notify_all();
    }

    fn clear(&self) {
        *self.stopped.lock().expect("scheduler stop flag poisoned") = false;
    }

    fn is_set(&self) -> bool {
        *self.stopped.lock().expect("scheduler stop flag poisoned")
    }

    /// Sleeps up to `duration`; returns true if stop was requested.
    fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut stopped = self.stopped.lock().expect("scheduler stop flag poisoned");
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .wake
                .wait_timeout(stopped, deadline - now)
                .expect("scheduler stop flag poisoned");
            stopped = guard;
        }
        true
    }
}

pub struct ClockScheduler {
    bus: Arc<SignalBus>,
    info: Arc<SystemInfo>,
    stop: Arc<StopSignal>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ClockScheduler {
    pub fn new(bus: Arc<SignalBus>, info: Arc<SystemInfo>) -> Self {
        ClockScheduler {
            bus,
            info,
            stop: Arc::new(StopSignal::default()),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the worker thread; a second start while running is a no-op.
    pub fn start(&self) {
        let mut worker = self.worker.lock().expect("scheduler worker poisoned");
        if worker.is_some() {
            return;
        }
        self.stop.clear();
        let bus = Arc::clone(&self.bus);
        let info = Arc::clone(&self.info);
        let stop = Arc::clone(&self.stop);
        *worker = Some(std::thread::spawn(move || run(&bus, &info, &stop)));
    }

    /// Requests stop, wakes the sleeper, and joins the worker. The join is
    /// bounded in practice: every wait in the worker carries a timeout, so
    /// the thread exits within one wakeup.
    pub fn stop(&self) {
        self.stop.set();
        let handle = self
            .worker
            .lock()
            .expect("scheduler worker poisoned")
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn run(bus: &SignalBus, info: &SystemInfo, stop: &StopSignal) {
    while !stop.is_set() {
        let now = info.now();
        bus.publish(&clock_signal(info, now));
        bus.publish(
            &Signal::new("world.uptime").with("seconds", Value::Int(info.uptime_seconds())),
        );
        if stop.sleep(until_next_minute(now)) {
            break;
        }
    }
}

fn clock_signal(info: &SystemInfo, now: OffsetDateTime) -> Signal {
    Signal::new("world.clock")
        .with(
            "time",
            Value::Text(now.format(&Rfc3339).unwrap_or_default()),
        )
        .with("timezone", Value::Text(info.timezone()))
        .with("minute", Value::Int(i64::from(now.minute())))
        .with("hour", Value::Int(i64::from(now.hour())))
        .with(
            "weekday",
            Value::Int(i64::from(now.weekday().number_days_from_monday())),
        )
}

/// Time left in the current minute, recomputed each cycle from the current
/// seconds plus the sub-second fraction.
fn until_next_minute(now: OffsetDateTime) -> Duration {
    let into_minute = f64::from(now.second()) + f64::from(now.nanosecond()) / 1e9;
    Duration::from_secs_f64((60.0 - into_minute).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publishes_clock_and_uptime_immediately() {
        let bus = Arc::new(SignalBus::new());
        let clock_count = Arc::new(AtomicUsize::new(0));
        let uptime_count = Arc::new(AtomicUsize::new(0));
        {
            let seen = Arc::clone(&clock_count);
            bus.subscribe("world.clock", move |signal| {
                assert!(signal.payload.contains_key("minute"));
                assert!(signal.payload.contains_key("hour"));
                assert!(signal.payload.contains_key("weekday"));
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let seen = Arc::clone(&uptime_count);
            bus.subscribe("world.uptime", move |signal| {
                assert!(signal.payload.contains_key("seconds"));
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        let scheduler = ClockScheduler::new(Arc::clone(&bus), Arc::new(SystemInfo::new()));
        scheduler.start();
        // The first publish happens before the first sleep; poll briefly.
        let deadline = Instant::now() + Duration::from_secs(2);
        while clock_count.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        scheduler.stop();
        assert!(clock_count.load(Ordering::SeqCst) >= 1);
        assert!(uptime_count.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn stop_without_start_is_harmless() {
        let scheduler =
            ClockScheduler::new(Arc::new(SignalBus::new()), Arc::new(SystemInfo::new()));
        scheduler.stop();
    }

    #[test]
    fn stop_returns_promptly_mid_sleep() {
        let bus = Arc::new(SignalBus::new());
        let scheduler = ClockScheduler::new(bus, Arc::new(SystemInfo::new()));
        scheduler.start();
        std::thread::sleep(Duration::from_millis(20));
        let begun = Instant::now();
        scheduler.stop();
        assert!(begun.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn minute_remainder_is_bounded() {
        let remaining = until_next_minute(OffsetDateTime::now_utc());
        assert!(remaining <= Duration::from_secs(60));
    }
}
