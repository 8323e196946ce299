//! # ot-sim-dnp3::server
//!
//! The Server channel coordinator (§4.8): owns a fleet of outstations
//! sharing one (simulated) transport channel, keyed by local address, and
//! coordinates a fleet-wide cold restart across them.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use fxhash::FxHashMap;

use crate::outstation::Outstation;

pub struct Server {
    cold_start_delay_secs: u16,
    outstations: FxHashMap<u16, Arc<Outstation>>,
}

impl Server {
    pub fn new(cold_start_delay_secs: u16) -> Self {
        Self { cold_start_delay_secs, outstations: FxHashMap::default() }
    }

    pub fn add_outstation(&mut self, outstation: Arc<Outstation>) {
        self.outstations.insert(outstation.local_address(), outstation);
    }

    pub fn outstation(&self, local_address: u16) -> Option<&Arc<Outstation>> {
        self.outstations.get(&local_address)
    }

    /// Attaches each outstation to the channel and spawns its scan loop
    /// (§4.8 "`start()` attaches each outstation to the channel and spawns
    /// its scan loop").
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for outstation in self.outstations.values() {
            outstation.enable();
            let outstation = outstation.clone();
            let server = self.clone();
            handles.push(std::thread::spawn(move || {
                let local = outstation.local_address();
                outstation.run(move || server.handle_cold_restart(local));
            }));
        }
        handles
    }

    /// Fleet-wide cold restart (§4.8): reset outputs and disable every
    /// owned outstation, then one shared sleep, then re-enable every
    /// owned outstation. All outstations on the channel are unreachable
    /// for the duration — intentional.
    pub fn handle_cold_restart(&self, _initiator: u16) {
        for outstation in self.outstations.values() {
            outstation.reset_outputs();
            outstation.disable();
        }

        std::thread::sleep(Duration::from_secs(self.cold_start_delay_secs as u64));

        for outstation in self.outstations.values() {
            outstation.enable();
        }
    }

    pub fn stop(&self) {
        for outstation in self.outstations.values() {
            outstation.disable();
            outstation.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{BinaryPointDef, ReportClass};
    use std::sync::Mutex;

    #[test]
    fn cold_restart_resets_and_recycles_every_owned_outstation() {
        let mut server = Server::new(0);

        let pushed_a = Arc::new(Mutex::new(Vec::new()));
        let pushed_a2 = pushed_a.clone();
        let mut a = Outstation::new("a", 10, Arc::new(move |env| pushed_a2.lock().unwrap().push(env)));
        a.database_mut().add_binary_output(
            0,
            BinaryPointDef { tag: "a.out".into(), sgvar: 2, egvar: 2, class: ReportClass::Class1, sbo: false },
        );
        a.enable();

        let pushed_b = Arc::new(Mutex::new(Vec::new()));
        let pushed_b2 = pushed_b.clone();
        let b = Outstation::new("b", 20, Arc::new(move |env| pushed_b2.lock().unwrap().push(env)));
        b.enable();

        server.add_outstation(Arc::new(a));
        server.add_outstation(Arc::new(b));

        server.handle_cold_restart(10);

        assert!(server.outstation(10).unwrap().is_enabled());
        assert!(server.outstation(20).unwrap().is_enabled());
        assert_eq!(pushed_a.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_local_address_is_none() {
        let server = Server::new(180);
        assert!(server.outstation(9999).is_none());
    }
}
