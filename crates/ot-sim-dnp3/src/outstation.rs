//! # ot-sim-dnp3::outstation
//!
//! The DNP3 outstation engine (§4.6): owns a static database, stages bus
//! Status into it once per scan cycle, and answers Select/Operate callbacks
//! from the (external) DNP3 master stack by writing through to the bus as
//! Update envelopes.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fxhash::{FxHashMap, FxHashSet};
use ot_sim_types::envelope::Envelope;
use ot_sim_types::errors::CommandStatus;
use ot_sim_types::point::{now_ms, Point, Tag};

use crate::database::Database;
use crate::stack::{CommandHandler, ControlCode, OpType, OutstationApplication, RestartMode};

/// Pushes an envelope to the bus, always on `"RUNTIME"` for this engine's
/// purposes (Update/Confirmation traffic per §6.1). Boxed as a trait object
/// so `Outstation` isn't generic over a transport type — composition over
/// the bus layer, not inheritance from it.
pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

const SCAN_PERIOD: Duration = Duration::from_secs(1);

pub struct Outstation {
    id: String,
    local_address: u16,
    db: Database,
    staging: Mutex<FxHashMap<Tag, Point>>,
    selected: Mutex<FxHashSet<(u16, bool)>>, // (index, is_binary)
    enabled: AtomicBool,
    running: AtomicBool,
    cold_restart_pending: AtomicBool,
    warm_restart_pending: AtomicBool,
    cold_delay_s: AtomicU16,
    warm_delay_s: AtomicU16,
    publish: Publish,
}

impl Outstation {
    pub fn new(id: impl Into<String>, local_address: u16, publish: Publish) -> Self {
        Self {
            id: id.into(),
            local_address,
            db: Database::new(),
            staging: Mutex::new(FxHashMap::default()),
            selected: Mutex::new(FxHashSet::default()),
            enabled: AtomicBool::new(false),
            running: AtomicBool::new(true),
            cold_restart_pending: AtomicBool::new(false),
            warm_restart_pending: AtomicBool::new(false),
            cold_delay_s: AtomicU16::new(2),
            warm_delay_s: AtomicU16::new(2),
            publish,
        }
    }

    pub fn local_address(&self) -> u16 {
        self.local_address
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Consumes a Status envelope from the bus (§4.6): latch each matching
    /// tag into the staging map for the next scan cycle.
    pub fn handle_status(&self, measurements: &[Point]) {
        let mut staging = self.staging.lock().expect("staging lock poisoned");
        for m in measurements {
            staging.insert(m.tag.clone(), m.clone());
        }
    }

    /// Runs one scan cycle: applies staged values into the database, then
    /// services any pending restart. Exposed separately from `run` so
    /// tests can drive individual cycles deterministically.
    pub fn run_cycle(&self, server_cold_restart: impl FnOnce()) {
        let staged = std::mem::take(&mut *self.staging.lock().expect("staging lock poisoned"));

        for (idx, _, def) in self.db.binary_inputs.iter() {
            if let Some(p) = staged.get(def.tag.as_str()) {
                self.db.stage_binary_input(*idx, p.as_bool());
            }
        }
        for (idx, _, def) in self.db.analog_inputs.iter() {
            if let Some(p) = staged.get(def.tag.as_str()) {
                self.db.stage_analog_input(*idx, p.value, def.deadband);
            }
        }
        for (idx, _, def) in self.db.binary_output_status.iter() {
            if let Some(p) = staged.get(def.tag.as_str()) {
                self.db.stage_binary_output(*idx, p.as_bool());
            }
        }
        for (idx, _, def) in self.db.analog_output_status.iter() {
            if let Some(p) = staged.get(def.tag.as_str()) {
                self.db.stage_analog_output(*idx, p.value);
            }
        }

        if self.warm_restart_pending.swap(false, Ordering::AcqRel) {
            self.disable();
            std::thread::sleep(Duration::from_secs(self.warm_delay_s.load(Ordering::Acquire) as u64));
            self.enable();
        }

        if self.cold_restart_pending.swap(false, Ordering::AcqRel) {
            server_cold_restart();
        }
    }

    /// The long-running update loop (§4.6, §5: exactly one scan/update
    /// thread per outstation).
    pub fn run(self: &Arc<Self>, server_cold_restart: impl Fn() + Send + 'static) {
        let this = self.clone();
        while this.running.load(Ordering::Acquire) {
            std::thread::sleep(SCAN_PERIOD);
            this.run_cycle(&server_cold_restart);
        }
    }

    /// Zero-value Updates for every configured output, pushed before a
    /// cold restart disables the outstation (§4.6 "Restart reset").
    pub fn reset_outputs(&self) {
        for (idx, is_binary) in self.db.all_output_indices() {
            let tag = if is_binary {
                self.db.binary_output_status.get(&idx).map(|d| d.tag.clone())
            } else {
                self.db.analog_output_status.get(&idx).map(|d| d.tag.clone())
            };
            if let Some(tag) = tag {
                self.push_update(tag, 0.0);
            }
        }
    }

    fn push_update(&self, tag: Tag, value: f64) {
        let env = Envelope::update(self.id.clone(), vec![Point::new(tag, value, now_ms())], "", "");
        (self.publish)(env);
    }
}

impl OutstationApplication for Outstation {
    fn cold_restart(&mut self) -> RestartMode {
        let delay = self.cold_delay_s.load(Ordering::Acquire);
        self.cold_restart_pending.store(true, Ordering::Release);
        RestartMode::SupportedDelayCoarse(delay)
    }

    fn warm_restart(&mut self) -> RestartMode {
        let delay = self.warm_delay_s.load(Ordering::Acquire);
        self.warm_restart_pending.store(true, Ordering::Release);
        RestartMode::SupportedDelayCoarse(delay)
    }
}

impl CommandHandler for Outstation {
    fn select_binary(&mut self, index: u16) -> CommandStatus {
        match self.db.binary_output_status.get(&index) {
            None => CommandStatus::OutOfRange,
            Some(_) => {
                self.selected.lock().expect("selected lock poisoned").insert((index, true));
                CommandStatus::Success
            }
        }
    }

    fn operate_binary(&mut self, index: u16, code: ControlCode, op_type: OpType) -> CommandStatus {
        let Some(def) = self.db.binary_output_status.get(&index) else {
            return CommandStatus::OutOfRange;
        };

        if def.sbo {
            let had_select =
                self.selected.lock().expect("selected lock poisoned").remove(&(index, true));
            if op_type != OpType::SelectBeforeOperate || !had_select {
                return CommandStatus::NoSelect;
            }
        }

        let value = match code {
            ControlCode::LatchOn => true,
            ControlCode::LatchOff => false,
            ControlCode::PulseOnTrip => false,
            ControlCode::PulseOnClose => true,
            ControlCode::Other => return CommandStatus::NotSupported,
        };

        let tag = def.tag.clone();
        self.db.stage_binary_output(index, value);
        self.push_update(tag, if value { 1.0 } else { 0.0 });
        CommandStatus::Success
    }

    fn select_analog(&mut self, index: u16) -> CommandStatus {
        match self.db.analog_output_status.get(&index) {
            None => CommandStatus::OutOfRange,
            Some(_) => {
                self.selected.lock().expect("selected lock poisoned").insert((index, false));
                CommandStatus::Success
            }
        }
    }

    fn operate_analog(&mut self, index: u16, value: f64, op_type: OpType) -> CommandStatus {
        let Some(def) = self.db.analog_output_status.get(&index) else {
            return CommandStatus::OutOfRange;
        };

        if def.sbo {
            let had_select =
                self.selected.lock().expect("selected lock poisoned").remove(&(index, false));
            if op_type != OpType::SelectBeforeOperate || !had_select {
                return CommandStatus::NoSelect;
            }
        }

        let tag = def.tag.clone();
        self.db.stage_analog_output(index, value);
        self.push_update(tag, value);
        CommandStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{AnalogPointDef, BinaryPointDef, ReportClass};
    use std::sync::Mutex as StdMutex;

    fn test_outstation() -> (Outstation, Arc<StdMutex<Vec<Envelope>>>) {
        let pushed = Arc::new(StdMutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let os = Outstation::new("outstation-1", 1024, Arc::new(move |env| pushed2.lock().unwrap().push(env)));
        (os, pushed)
    }

    #[test]
    fn write_through_direct_operate_no_sbo() {
        let (mut os, pushed) = test_outstation();
        os.database_mut().add_binary_output(
            10,
            BinaryPointDef { tag: "line.closed".into(), sgvar: 2, egvar: 2, class: ReportClass::Class1, sbo: false },
        );

        let status = os.operate_binary(10, ControlCode::LatchOff, OpType::DirectOperate);
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(os.database().binary_output_status_value(10), Some(false));

        let pushed = pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Update(u) => {
                assert_eq!(u.updates[0].tag, "line.closed");
                assert_eq!(u.updates[0].value, 0.0);
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn sbo_rejects_direct_operate_without_select() {
        let (mut os, pushed) = test_outstation();
        os.database_mut().add_binary_output(
            10,
            BinaryPointDef { tag: "line.closed".into(), sgvar: 2, egvar: 2, class: ReportClass::Class1, sbo: true },
        );

        let status = os.operate_binary(10, ControlCode::LatchOff, OpType::DirectOperate);
        assert_eq!(status, CommandStatus::NoSelect);
        assert!(pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn sbo_accepts_select_then_operate() {
        let (mut os, _pushed) = test_outstation();
        os.database_mut().add_binary_output(
            10,
            BinaryPointDef { tag: "line.closed".into(), sgvar: 2, egvar: 2, class: ReportClass::Class1, sbo: true },
        );

        assert_eq!(os.select_binary(10), CommandStatus::Success);
        assert_eq!(
            os.operate_binary(10, ControlCode::LatchOn, OpType::SelectBeforeOperate),
            CommandStatus::Success
        );
    }

    #[test]
    fn select_out_of_range_index() {
        let (mut os, _pushed) = test_outstation();
        assert_eq!(os.select_binary(99), CommandStatus::OutOfRange);
    }

    #[test]
    fn analog_operate_writes_numeric_value() {
        let (mut os, pushed) = test_outstation();
        os.database_mut().add_analog_output(
            5,
            AnalogPointDef { tag: "setpoint".into(), sgvar: 1, egvar: 1, class: ReportClass::Class1, deadband: 0.0, sbo: false },
        );
        assert_eq!(os.operate_analog(5, 42.5, OpType::DirectOperate), CommandStatus::Success);
        assert_eq!(os.database().analog_output_status_value(5), Some(42.5));
        assert_eq!(pushed.lock().unwrap()[0].metadata.sender, "outstation-1");
    }

    #[test]
    fn cold_restart_resets_outputs_before_disabling() {
        let (mut os, pushed) = test_outstation();
        os.database_mut().add_binary_output(
            10,
            BinaryPointDef { tag: "line.closed".into(), sgvar: 2, egvar: 2, class: ReportClass::Class1, sbo: false },
        );
        os.enable();
        let mode = OutstationApplication::cold_restart(&mut os);
        assert!(matches!(mode, RestartMode::SupportedDelayCoarse(_)));
        os.reset_outputs();
        os.disable();
        assert!(!os.is_enabled());
        let pushed = pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Update(u) => assert_eq!(u.updates[0].value, 0.0),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn staged_status_applies_on_next_cycle() {
        let (mut os, _pushed) = test_outstation();
        os.database_mut().add_analog_input(
            0,
            AnalogPointDef { tag: "temp".into(), sgvar: 1, egvar: 1, class: ReportClass::Class1, deadband: 0.5, sbo: false },
        );
        os.handle_status(&[Point::new("temp", 72.3, now_ms())]);
        os.run_cycle(|| {});
        assert_eq!(os.database().analog_input_value(0), Some(72.3));
    }
}
