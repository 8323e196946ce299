//! # ot-sim-dnp3::master
//!
//! The DNP3 master engine (§4.7): translates SOE (sequence-of-events)
//! callbacks from the DNP3 stack into Status envelopes, and bus Update
//! envelopes into outbound Select/DirectOperate command requests.

use std::collections::HashMap;
use std::sync::Arc;

use ot_sim_sdk::registry::{PointDef, PointRegistry};
use ot_sim_types::envelope::Envelope;
use ot_sim_types::errors::PointUnknown;
use ot_sim_types::point::Point;

use crate::stack::SoeHandler;

/// A master-side tag binding. `sbo` only matters for output tags, where it
/// selects DirectOperate vs SelectAndOperate on write-through.
#[derive(Debug, Clone)]
pub struct MasterPointDef {
    pub tag: String,
    pub sbo: bool,
}

impl PointDef for MasterPointDef {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// A non-zero period for one or more of DNP3's four scan classes (§4.7).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassScanConfig {
    pub all_seconds: Option<u64>,
    pub class0_seconds: Option<u64>,
    pub class1_seconds: Option<u64>,
    pub class2_seconds: Option<u64>,
    pub class3_seconds: Option<u64>,
}

/// The command the master issues against a remote outstation on write-through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandRequest {
    Binary { index: u16, value: bool, select_before_operate: bool },
    Analog { index: u16, value: f64, select_before_operate: bool },
}

/// Issues a command toward the (external, wire-level) DNP3 stack. Boxed so
/// `Master` doesn't need to be generic over a stack binding.
pub type CommandSink = Arc<dyn Fn(CommandRequest) + Send + Sync>;

pub type Publish = Arc<dyn Fn(Envelope) + Send + Sync>;

pub struct Master {
    id: String,
    local_address: u16,
    remote_address: u16,
    timeout_secs: i64,
    scan_config: ClassScanConfig,

    binary_inputs: PointRegistry<u16, MasterPointDef>,
    analog_inputs: PointRegistry<u16, MasterPointDef>,
    binary_outputs: PointRegistry<u16, MasterPointDef>,
    analog_outputs: PointRegistry<u16, MasterPointDef>,

    publish: Publish,
    command_sink: CommandSink,
}

impl Master {
    pub fn new(
        id: impl Into<String>,
        local_address: u16,
        remote_address: u16,
        timeout_secs: i64,
        scan_config: ClassScanConfig,
        publish: Publish,
        command_sink: CommandSink,
    ) -> Self {
        Self {
            id: id.into(),
            local_address,
            remote_address,
            timeout_secs,
            scan_config,
            binary_inputs: PointRegistry::new(),
            analog_inputs: PointRegistry::new(),
            binary_outputs: PointRegistry::new(),
            analog_outputs: PointRegistry::new(),
            publish,
            command_sink,
        }
    }

    pub fn local_address(&self) -> u16 {
        self.local_address
    }

    pub fn remote_address(&self) -> u16 {
        self.remote_address
    }

    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }

    pub fn scan_config(&self) -> ClassScanConfig {
        self.scan_config
    }

    pub fn add_binary_input_tag(&mut self, index: u16, tag: impl Into<String>) {
        self.binary_inputs.add_input(index, MasterPointDef { tag: tag.into(), sbo: false });
    }

    pub fn add_analog_input_tag(&mut self, index: u16, tag: impl Into<String>) {
        self.analog_inputs.add_input(index, MasterPointDef { tag: tag.into(), sbo: false });
    }

    pub fn add_binary_output_tag(&mut self, index: u16, tag: impl Into<String>, sbo: bool) {
        self.binary_outputs.add_output(index, MasterPointDef { tag: tag.into(), sbo });
    }

    pub fn add_analog_output_tag(&mut self, index: u16, tag: impl Into<String>, sbo: bool) {
        self.analog_outputs.add_output(index, MasterPointDef { tag: tag.into(), sbo });
    }

    fn push_status(&self, tag: &str, value: f64, ts: u64) {
        let env = Envelope::status(self.id.clone(), vec![Point::new(tag, value, ts)]);
        (self.publish)(env);
    }

    /// The Update handler (§4.7 Outbound): write-through for every point in
    /// an incoming envelope whose tag matches a configured output.
    pub fn handle_update(&self, updates: &[Point]) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for point in updates {
            let mut matched = false;
            for (index, def) in self.binary_outputs.outputs_for_tag(&point.tag) {
                matched = true;
                (self.command_sink)(CommandRequest::Binary {
                    index: *index,
                    value: point.as_bool(),
                    select_before_operate: def.sbo,
                });
            }
            for (index, def) in self.analog_outputs.outputs_for_tag(&point.tag) {
                matched = true;
                (self.command_sink)(CommandRequest::Analog {
                    index: *index,
                    value: point.value,
                    select_before_operate: def.sbo,
                });
            }
            if !matched {
                tracing::debug!(tag = %point.tag, adapter = %self.id, "update targets unconfigured tag; dropping");
                errors.insert(point.tag.clone(), PointUnknown(point.tag.clone()).to_string());
            }
        }
        errors
    }
}

impl SoeHandler for Master {
    fn process_binary_input(&mut self, index: u16, value: bool, ts: u64) {
        match self.binary_inputs.get(&index) {
            Some(def) => self.push_status(&def.tag.clone(), if value { 1.0 } else { 0.0 }, ts),
            None => tracing::debug!(index, "no configured binary input tag; dropping"),
        }
    }

    fn process_analog_input(&mut self, index: u16, value: f64, ts: u64) {
        match self.analog_inputs.get(&index) {
            Some(def) => self.push_status(&def.tag.clone(), value, ts),
            None => tracing::debug!(index, "no configured analog input tag; dropping"),
        }
    }

    fn process_binary_output_status(&mut self, index: u16, value: bool, ts: u64) {
        match self.binary_outputs.get(&index) {
            Some(def) => self.push_status(&def.tag.clone(), if value { 1.0 } else { 0.0 }, ts),
            None => tracing::debug!(index, "no configured binary output tag; dropping"),
        }
    }

    fn process_analog_output_status(&mut self, index: u16, value: f64, ts: u64) {
        match self.analog_outputs.get(&index) {
            Some(def) => self.push_status(&def.tag.clone(), value, ts),
            None => tracing::debug!(index, "no configured analog output tag; dropping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn test_master() -> (Master, Arc<Mutex<Vec<Envelope>>>, Arc<Mutex<Vec<CommandRequest>>>) {
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let pushed2 = pushed.clone();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let commands2 = commands.clone();
        let master = Master::new(
            "master-1",
            1,
            1024,
            5,
            ClassScanConfig { all_seconds: Some(30), ..Default::default() },
            Arc::new(move |env| pushed2.lock().unwrap().push(env)),
            Arc::new(move |cmd| commands2.lock().unwrap().push(cmd)),
        );
        (master, pushed, commands)
    }

    #[test]
    fn soe_binary_input_pushes_status() {
        let (mut master, pushed, _) = test_master();
        master.add_binary_input_tag(7, "breaker.closed");
        master.process_binary_input(7, true, 1000);

        let pushed = pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Status(s) => {
                assert_eq!(s.measurements[0].tag, "breaker.closed");
                assert_eq!(s.measurements[0].value, 1.0);
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn soe_unmatched_index_is_dropped_silently() {
        let (mut master, pushed, _) = test_master();
        master.process_analog_input(99, 3.3, 1000);
        assert!(pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn update_with_sbo_output_issues_select_and_operate() {
        let (mut master, _pushed, commands) = test_master();
        master.add_binary_output_tag(3, "breaker.trip", true);

        master.handle_update(&[Point::new("breaker.trip", 1.0, 1)]);
        let commands = commands.lock().unwrap();
        assert_eq!(
            commands[0],
            CommandRequest::Binary { index: 3, value: true, select_before_operate: true }
        );
    }

    #[test]
    fn update_without_sbo_issues_direct_operate() {
        let (mut master, _pushed, commands) = test_master();
        master.add_analog_output_tag(4, "setpoint", false);

        master.handle_update(&[Point::new("setpoint", 12.5, 1)]);
        let commands = commands.lock().unwrap();
        assert_eq!(
            commands[0],
            CommandRequest::Analog { index: 4, value: 12.5, select_before_operate: false }
        );
    }

    #[test]
    fn update_for_unconfigured_tag_issues_no_command_and_reports_point_unknown() {
        let (mut master, _pushed, commands) = test_master();
        let errors = master.handle_update(&[Point::new("nothing.configured", 1.0, 1)]);
        assert!(commands.lock().unwrap().is_empty());
        assert!(errors.contains_key("nothing.configured"));
    }

    #[test]
    fn output_status_soe_maps_to_output_tag_table() {
        let (mut master, pushed, _) = test_master();
        master.add_binary_output_tag(3, "breaker.trip", true);
        master.process_binary_output_status(3, false, 1000);

        let pushed = pushed.lock().unwrap();
        match &pushed[0].contents {
            ot_sim_types::envelope::Contents::Status(s) => {
                assert_eq!(s.measurements[0].tag, "breaker.trip");
                assert_eq!(s.measurements[0].value, 0.0);
            }
            _ => panic!("wrong kind"),
        }
    }
}
