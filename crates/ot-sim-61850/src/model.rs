//! # ot-sim-61850::model
//!
//! The IEC 61850 object model: `LogicalDevice` → `LogicalNode` →
//! `DataObject` → `DataAttribute`, the nesting `wtur.h`'s generated
//! accessors walk (e.g. `iedModel_WTG_WTUR1_TurOp_Oper_ctlVal`). Adapters
//! address a leaf attribute by its dotted FCDA path (`WTUR1.TurOp.ctlVal`)
//! rather than the flat numeric addresses DNP3/Modbus/S7 use.

use std::sync::Mutex;

use fxhash::FxHashMap;

/// A single leaf value in the model. Control-capable attributes (a `ctlVal`
/// under an `Oper` data object) are written by `operate()`; measurement
/// attributes (`stVal`, `mag`, `actVal`) are written by the adapter's
/// bus-side update path and read back during a scan.
#[derive(Debug)]
pub struct DataAttribute {
    value: Mutex<f64>,
}

impl DataAttribute {
    fn new() -> Self {
        Self { value: Mutex::new(0.0) }
    }

    pub fn get(&self) -> f64 {
        *self.value.lock().expect("attribute lock poisoned")
    }

    pub fn set(&self, value: f64) {
        *self.value.lock().expect("attribute lock poisoned") = value;
    }
}

#[derive(Debug, Default)]
pub struct DataObject {
    attributes: FxHashMap<String, DataAttribute>,
}

impl DataObject {
    fn attribute(&mut self, name: &str) -> &DataAttribute {
        self.attributes.entry(name.to_string()).or_insert_with(DataAttribute::new)
    }
}

#[derive(Debug, Default)]
pub struct LogicalNode {
    objects: FxHashMap<String, DataObject>,
}

impl LogicalNode {
    fn object(&mut self, name: &str) -> &mut DataObject {
        self.objects.entry(name.to_string()).or_default()
    }
}

/// One IED's model, scoped to whatever logical nodes the device config
/// declares. A real stack would load this from an SCL/ICD file; here it's
/// built lazily from the FCDA paths the module's point config references.
#[derive(Debug, Default)]
pub struct LogicalDevice {
    nodes: Mutex<FxHashMap<String, LogicalNode>>,
}

/// Splits `"WTUR1.TurOp.ctlVal"` into its logical-node, data-object, and
/// data-attribute segments.
fn split_path(path: &str) -> Option<(&str, &str, &str)> {
    let mut parts = path.splitn(3, '.');
    let ln = parts.next()?;
    let dobj = parts.next()?;
    let attr = parts.next()?;
    Some((ln, dobj, attr))
}

impl LogicalDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures the (LN, DO, DA) chain named by `path` exists, creating
    /// intermediate nodes on first reference.
    fn ensure(&self, path: &str) -> Option<()> {
        let (ln, dobj, attr) = split_path(path)?;
        let mut nodes = self.nodes.lock().expect("model lock poisoned");
        nodes.entry(ln.to_string()).or_default().object(dobj).attribute(attr);
        Some(())
    }

    pub fn get(&self, path: &str) -> Option<f64> {
        self.ensure(path)?;
        let (ln, dobj, attr) = split_path(path)?;
        let nodes = self.nodes.lock().expect("model lock poisoned");
        Some(nodes.get(ln)?.objects.get(dobj)?.attributes.get(attr)?.get())
    }

    pub fn set(&self, path: &str, value: f64) {
        if self.ensure(path).is_none() {
            return;
        }
        let (ln, dobj, attr) = match split_path(path) {
            Some(p) => p,
            None => return,
        };
        let nodes = self.nodes.lock().expect("model lock poisoned");
        if let Some(a) = nodes.get(ln).and_then(|n| n.objects.get(dobj)).and_then(|o| o.attributes.get(attr)) {
            a.set(value);
        }
    }
}
