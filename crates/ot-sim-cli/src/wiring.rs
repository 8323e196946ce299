//! # ot-sim-cli::wiring
//!
//! Builds and runs one protocol module from its parsed configuration: wires
//! each configured device's adapter to the in-process message bus, starts
//! its scan/subscriber/metrics threads, then blocks until a shutdown signal
//! arrives and tears everything down in a fixed order: subscribers stop,
//! then engines disable, then scan threads join, then the transport closes.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::Receiver;

use ot_sim_bus::metrics::MetricsAggregator;
use ot_sim_bus::pusher::Pusher;
use ot_sim_bus::subscriber::Subscriber;
use ot_sim_bus::transport::{InProcessBroker, InProcessPush};
use ot_sim_sdk::tagstore::{MemTagStore, TagStore};
use ot_sim_types::config::{load_toml_or_yaml, BusConfig};
use ot_sim_types::envelope::{Contents, Envelope, Kind};
use ot_sim_types::topics;

const SCAN_PERIOD: Duration = Duration::from_secs(1);

/// Installs a Ctrl-C/SIGTERM handler and returns a receiver that fires
/// exactly once when the process should shut down cleanly.
pub fn install_shutdown_signal() -> Receiver<()> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .expect("failed to install shutdown signal handler");
    rx
}

/// The pub/pull endpoints in a module's configuration describe an external
/// ZeroMQ-style transport this build doesn't ship; it runs against the
/// in-process broker instead, so the configured endpoints are logged
/// rather than silently dropped.
fn build_broker(bus: &BusConfig) -> InProcessBroker {
    tracing::info!(
        pub_endpoint = %bus.pub_endpoint,
        pull_endpoint = %bus.pull_endpoint,
        "message bus endpoints configured; running against the in-process broker"
    );
    InProcessBroker::new()
}

fn spawn_scan_thread(
    name: String,
    running: Arc<AtomicBool>,
    mut tick: impl FnMut() + Send + 'static,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("ot-sim-scan-{name}"))
        .spawn(move || {
            while running.load(Ordering::Acquire) {
                std::thread::sleep(SCAN_PERIOD);
                if !running.load(Ordering::Acquire) {
                    break;
                }
                tick();
            }
        })
        .expect("failed to spawn scan thread")
}

/// Mirrors every point an envelope carries into the module's process-wide
/// tag store, regardless of which protocol-native database staged it.
fn mirror_into_tagstore(tagstore: &MemTagStore, env: &Envelope) {
    match &env.contents {
        Contents::Status(s) => s.measurements.iter().for_each(|p| tagstore.set(p.clone())),
        Contents::Update(u) => u.updates.iter().for_each(|p| tagstore.set(p.clone())),
        Contents::Confirmation(_) | Contents::Metric(_) => {}
    }
}

fn make_publish(
    adapter: &'static str,
    id: String,
    pusher: Arc<Pusher<InProcessPush>>,
    metrics: Arc<MetricsAggregator>,
    tagstore: Arc<MemTagStore>,
) -> Arc<dyn Fn(Envelope) + Send + Sync> {
    Arc::new(move |env: Envelope| {
        mirror_into_tagstore(&tagstore, &env);
        if let Err(err) = pusher.push(topics::RUNTIME, &env) {
            tracing::warn!(adapter = %id, error = %err, "failed to push {} envelope", adapter);
        } else {
            metrics.incr("envelopes_published");
        }
    })
}

pub mod modbus {
    use super::*;
    use ot_sim_modbus::adapter::ModbusAdapter;
    use ot_sim_modbus::config::ModbusModuleConfig;
    use ot_sim_modbus::point::ModbusPointDef;

    pub fn run(path: &Path) -> Result<()> {
        let cfg: ModbusModuleConfig = load_toml_or_yaml(path)?;
        let broker = build_broker(&cfg.message_bus);
        let pusher = Arc::new(Pusher::new(broker.pusher_half()));

        struct Device {
            id: String,
            running: Arc<AtomicBool>,
            scan: JoinHandle<()>,
            subscriber: ot_sim_bus::subscriber::SubscriberHandle,
            metrics: ot_sim_bus::metrics::MetricsTickerHandle,
        }

        let mut devices = Vec::new();

        for device_cfg in &cfg.modbus {
            let id = device_cfg.name.clone();
            let metrics = MetricsAggregator::new(id.clone());
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "envelopes_published", "status envelopes pushed to the bus");
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "scan_cycles", "scan cycles completed");

            let tagstore = Arc::new(MemTagStore::new());
            let publish = make_publish("modbus", id.clone(), pusher.clone(), metrics.clone(), tagstore.clone());
            let mut adapter = ModbusAdapter::new(id.clone(), publish);
            for p in &device_cfg.input {
                adapter.add_input(p.address, ModbusPointDef { tag: p.tag.clone(), bank: p.bank, scale: p.scale });
            }
            for p in &device_cfg.output {
                adapter.add_output(p.address, ModbusPointDef { tag: p.tag.clone(), bank: p.bank, scale: p.scale });
            }
            let adapter = Arc::new(adapter);

            let mut subscriber = Subscriber::new(broker.subscriber_half());
            let handler_adapter = adapter.clone();
            let handler_tagstore = tagstore.clone();
            subscriber.on(
                Kind::Update,
                Box::new(move |env| {
                    if let Contents::Update(u) = &env.contents {
                        u.updates.iter().for_each(|p| handler_tagstore.set(p.clone()));
                        handler_adapter.handle_update(&u.updates)
                    } else {
                        std::collections::HashMap::new()
                    }
                }),
            );
            let confirm_pusher = pusher.clone();
            let subscriber_handle =
                subscriber.start(topics::RUNTIME.to_string(), id.clone(), move |env| {
                    let _ = confirm_pusher.push(topics::RUNTIME, &env);
                });

            let running = Arc::new(AtomicBool::new(true));
            let scan_adapter = adapter.clone();
            let scan_metrics = metrics.clone();
            let scan = spawn_scan_thread(id.clone(), running.clone(), move || {
                scan_adapter.run_cycle();
                scan_metrics.incr("scan_cycles");
            });

            let metrics_ticker = metrics.start_ticker(pusher.clone(), None);

            tracing::info!(adapter = %id, "modbus device running");
            devices.push(Device { id, running, scan, subscriber: subscriber_handle, metrics: metrics_ticker });
        }

        let shutdown = install_shutdown_signal();
        let _ = shutdown.recv();
        tracing::info!("shutdown signal received; stopping modbus module");

        for device in devices {
            device.subscriber.stop();
            device.running.store(false, Ordering::Release);
            let _ = device.scan.join();
            device.metrics.stop();
            tracing::info!(adapter = %device.id, "stopped");
        }
        pusher.close();
        Ok(())
    }
}

pub mod s7 {
    use super::*;
    use ot_sim_s7::adapter::S7Adapter;
    use ot_sim_s7::config::S7ModuleConfig;
    use ot_sim_s7::point::S7PointDef;

    pub fn run(path: &Path) -> Result<()> {
        let cfg: S7ModuleConfig = load_toml_or_yaml(path)?;
        let broker = build_broker(&cfg.message_bus);
        let pusher = Arc::new(Pusher::new(broker.pusher_half()));

        struct Device {
            id: String,
            running: Arc<AtomicBool>,
            scan: JoinHandle<()>,
            subscriber: ot_sim_bus::subscriber::SubscriberHandle,
            metrics: ot_sim_bus::metrics::MetricsTickerHandle,
        }

        let mut devices = Vec::new();

        for device_cfg in &cfg.s7comm {
            let id = device_cfg.name.clone();
            let metrics = MetricsAggregator::new(id.clone());
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "envelopes_published", "status envelopes pushed to the bus");
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "scan_cycles", "scan cycles completed");

            let tagstore = Arc::new(MemTagStore::new());
            let publish = make_publish("s7", id.clone(), pusher.clone(), metrics.clone(), tagstore.clone());
            let mut adapter = S7Adapter::new(id.clone(), publish);
            for p in &device_cfg.input {
                adapter.add_input(
                    ot_sim_s7::Address { area: p.area, byte_offset: p.byte_offset, bit_offset: p.bit_offset },
                    S7PointDef { tag: p.tag.clone(), width: p.width, deadband: p.deadband, sbo: p.sbo },
                );
            }
            for p in &device_cfg.output {
                adapter.add_output(
                    ot_sim_s7::Address { area: p.area, byte_offset: p.byte_offset, bit_offset: p.bit_offset },
                    S7PointDef { tag: p.tag.clone(), width: p.width, deadband: p.deadband, sbo: p.sbo },
                );
            }
            let adapter = Arc::new(adapter);

            let mut subscriber = Subscriber::new(broker.subscriber_half());
            let handler_adapter = adapter.clone();
            let handler_tagstore = tagstore.clone();
            subscriber.on(
                Kind::Update,
                Box::new(move |env| {
                    if let Contents::Update(u) = &env.contents {
                        u.updates.iter().for_each(|p| handler_tagstore.set(p.clone()));
                        handler_adapter.handle_update(&u.updates)
                    } else {
                        std::collections::HashMap::new()
                    }
                }),
            );
            let confirm_pusher = pusher.clone();
            let subscriber_handle =
                subscriber.start(topics::RUNTIME.to_string(), id.clone(), move |env| {
                    let _ = confirm_pusher.push(topics::RUNTIME, &env);
                });

            let running = Arc::new(AtomicBool::new(true));
            let scan_adapter = adapter.clone();
            let scan_metrics = metrics.clone();
            let scan = spawn_scan_thread(id.clone(), running.clone(), move || {
                scan_adapter.run_cycle();
                scan_metrics.incr("scan_cycles");
            });

            let metrics_ticker = metrics.start_ticker(pusher.clone(), None);

            tracing::info!(adapter = %id, "s7 device running");
            devices.push(Device { id, running, scan, subscriber: subscriber_handle, metrics: metrics_ticker });
        }

        let shutdown = install_shutdown_signal();
        let _ = shutdown.recv();
        tracing::info!("shutdown signal received; stopping s7 module");

        for device in devices {
            device.subscriber.stop();
            device.running.store(false, Ordering::Release);
            let _ = device.scan.join();
            device.metrics.stop();
            tracing::info!(adapter = %device.id, "stopped");
        }
        pusher.close();
        Ok(())
    }
}

pub mod ied61850 {
    use super::*;
    use ot_sim_61850::adapter::Iec61850Adapter;
    use ot_sim_61850::config::Iec61850ModuleConfig;
    use ot_sim_61850::point::Iec61850PointDef;

    pub fn run(path: &Path) -> Result<()> {
        let cfg: Iec61850ModuleConfig = load_toml_or_yaml(path)?;
        let broker = build_broker(&cfg.message_bus);
        let pusher = Arc::new(Pusher::new(broker.pusher_half()));

        struct Device {
            id: String,
            running: Arc<AtomicBool>,
            scan: JoinHandle<()>,
            subscriber: ot_sim_bus::subscriber::SubscriberHandle,
            metrics: ot_sim_bus::metrics::MetricsTickerHandle,
        }

        let mut devices = Vec::new();

        for device_cfg in &cfg.ied61850 {
            let id = device_cfg.name.clone();
            let metrics = MetricsAggregator::new(id.clone());
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "envelopes_published", "status envelopes pushed to the bus");
            metrics.register(ot_sim_types::envelope::MetricKind::Counter, "scan_cycles", "scan cycles completed");

            let tagstore = Arc::new(MemTagStore::new());
            let publish = make_publish("iec61850", id.clone(), pusher.clone(), metrics.clone(), tagstore.clone());
            let mut adapter = Iec61850Adapter::new(id.clone(), publish);
            for p in &device_cfg.input {
                adapter.add_input(
                    p.path.clone(),
                    Iec61850PointDef { tag: p.tag.clone(), boolean: p.boolean, deadband: p.deadband, sbo: p.sbo },
                );
            }
            for p in &device_cfg.output {
                adapter.add_output(
                    p.path.clone(),
                    Iec61850PointDef { tag: p.tag.clone(), boolean: p.boolean, deadband: p.deadband, sbo: p.sbo },
                );
            }
            let adapter = Arc::new(adapter);

            let mut subscriber = Subscriber::new(broker.subscriber_half());
            let handler_adapter = adapter.clone();
            let handler_tagstore = tagstore.clone();
            subscriber.on(
                Kind::Update,
                Box::new(move |env| {
                    if let Contents::Update(u) = &env.contents {
                        u.updates.iter().for_each(|p| handler_tagstore.set(p.clone()));
                        handler_adapter.handle_update(&u.updates)
                    } else {
                        std::collections::HashMap::new()
                    }
                }),
            );
            let confirm_pusher = pusher.clone();
            let subscriber_handle =
                subscriber.start(topics::RUNTIME.to_string(), id.clone(), move |env| {
                    let _ = confirm_pusher.push(topics::RUNTIME, &env);
                });

            let running = Arc::new(AtomicBool::new(true));
            let scan_adapter = adapter.clone();
            let scan_metrics = metrics.clone();
            let scan = spawn_scan_thread(id.clone(), running.clone(), move || {
                scan_adapter.run_cycle();
                scan_metrics.incr("scan_cycles");
            });

            let metrics_ticker = metrics.start_ticker(pusher.clone(), None);

            tracing::info!(adapter = %id, "61850 device running");
            devices.push(Device { id, running, scan, subscriber: subscriber_handle, metrics: metrics_ticker });
        }

        let shutdown = install_shutdown_signal();
        let _ = shutdown.recv();
        tracing::info!("shutdown signal received; stopping 61850 module");

        for device in devices {
            device.subscriber.stop();
            device.running.store(false, Ordering::Release);
            let _ = device.scan.join();
            device.metrics.stop();
            tracing::info!(adapter = %device.id, "stopped");
        }
        pusher.close();
        Ok(())
    }
}

pub mod dnp3 {
    use super::*;
    use ot_sim_dnp3::client::{ChannelListener, Client};
    use ot_sim_dnp3::config::{DeviceMode, Dnp3ModuleConfig, PointConfig};
    use ot_sim_dnp3::master::{ClassScanConfig, CommandRequest, Master};
    use ot_sim_dnp3::outstation::Outstation;
    use ot_sim_dnp3::point::{AnalogPointDef, BinaryPointDef, ReportClass};
    use ot_sim_dnp3::server::Server;

    fn parse_class(class: &Option<String>) -> ReportClass {
        match class.as_deref() {
            Some("0") | Some("class0") => ReportClass::Class0,
            Some("2") | Some("class2") => ReportClass::Class2,
            Some("3") | Some("class3") => ReportClass::Class3,
            _ => ReportClass::Class1,
        }
    }

    fn add_points(db: &mut ot_sim_dnp3::database::Database, points: &[PointConfig], input: bool) {
        for p in points {
            match (p.kind.as_str(), input) {
                ("binary", true) => db.add_binary_input(
                    p.address,
                    BinaryPointDef {
                        tag: p.tag.clone(),
                        sgvar: p.sgvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(2),
                        egvar: p.egvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(2),
                        class: parse_class(&p.class),
                        sbo: p.sbo,
                    },
                ),
                ("analog", true) => db.add_analog_input(
                    p.address,
                    AnalogPointDef {
                        tag: p.tag.clone(),
                        sgvar: p.sgvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(1),
                        egvar: p.egvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(1),
                        class: parse_class(&p.class),
                        deadband: p.deadband,
                        sbo: p.sbo,
                    },
                ),
                ("binary", false) => db.add_binary_output(
                    p.address,
                    BinaryPointDef {
                        tag: p.tag.clone(),
                        sgvar: p.sgvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(2),
                        egvar: p.egvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(2),
                        class: parse_class(&p.class),
                        sbo: p.sbo,
                    },
                ),
                ("analog", false) => db.add_analog_output(
                    p.address,
                    AnalogPointDef {
                        tag: p.tag.clone(),
                        sgvar: p.sgvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(1),
                        egvar: p.egvar.as_deref().and_then(|s| s.parse().ok()).unwrap_or(1),
                        class: parse_class(&p.class),
                        deadband: p.deadband,
                        sbo: p.sbo,
                    },
                ),
                (other, _) => tracing::warn!(kind = %other, "unknown DNP3 point type; skipping"),
            }
        }
    }

    pub fn run(path: &Path) -> Result<()> {
        let cfg: Dnp3ModuleConfig = load_toml_or_yaml(path)?;
        let broker = build_broker(&cfg.message_bus);
        let pusher = Arc::new(Pusher::new(broker.pusher_half()));

        struct ServerDevice {
            name: String,
            server: Arc<Server>,
            scan_handles: Vec<JoinHandle<()>>,
            subscriber: ot_sim_bus::subscriber::SubscriberHandle,
        }
        struct ClientDevice {
            name: String,
            client: Client,
            listener_handle: JoinHandle<()>,
            subscriber: ot_sim_bus::subscriber::SubscriberHandle,
        }

        let mut server_devices = Vec::new();
        let mut client_devices = Vec::new();

        for device_cfg in &cfg.dnp3 {
            let name = device_cfg.name.clone();
            match device_cfg.mode {
                DeviceMode::Server => {
                    let mut server = Server::new(device_cfg.cold_start_delay);
                    let mut outstations = Vec::new();

                    for os_cfg in &device_cfg.outstation {
                        let os_id = os_cfg.name.clone();
                        let metrics = MetricsAggregator::new(os_id.clone());
                        metrics.register(ot_sim_types::envelope::MetricKind::Counter, "envelopes_published", "Update envelopes pushed to the bus");
                        let os_tagstore = Arc::new(MemTagStore::new());
                        let publish = make_publish("dnp3", os_id.clone(), pusher.clone(), metrics.clone(), os_tagstore);
                        metrics.start_ticker(pusher.clone(), None);

                        let mut outstation = Outstation::new(os_id.clone(), os_cfg.local_address, publish);
                        add_points(outstation.database_mut(), &os_cfg.input, true);
                        add_points(outstation.database_mut(), &os_cfg.output, false);
                        let outstation = Arc::new(outstation);
                        server.add_outstation(outstation.clone());
                        outstations.push(outstation);
                    }

                    let server = Arc::new(server);

                    let mut subscriber = Subscriber::new(broker.subscriber_half());
                    let handler_outstations = outstations.clone();
                    subscriber.on(
                        Kind::Status,
                        Box::new(move |env| {
                            if let Contents::Status(s) = &env.contents {
                                for outstation in &handler_outstations {
                                    outstation.handle_status(&s.measurements);
                                }
                            }
                            std::collections::HashMap::new()
                        }),
                    );
                    let confirm_pusher = pusher.clone();
                    let subscriber_handle =
                        subscriber.start(topics::RUNTIME.to_string(), name.clone(), move |env| {
                            let _ = confirm_pusher.push(topics::RUNTIME, &env);
                        });

                    let scan_handles = server.start();
                    tracing::info!(adapter = %name, outstations = outstations.len(), "dnp3 server device running");
                    server_devices.push(ServerDevice { name: name.clone(), server, scan_handles, subscriber: subscriber_handle });
                }
                DeviceMode::Client => {
                    let metrics = MetricsAggregator::new(name.clone());
                    metrics.register(ot_sim_types::envelope::MetricKind::Counter, "envelopes_published", "Status envelopes pushed to the bus");
                    let tagstore = Arc::new(MemTagStore::new());
                    let publish = make_publish("dnp3", name.clone(), pusher.clone(), metrics.clone(), tagstore.clone());
                    metrics.start_ticker(pusher.clone(), None);

                    let listener = ChannelListener::new(name.clone(), publish.clone());
                    let mut client = Client::new(listener);
                    let mut masters = Vec::new();

                    for m_cfg in &device_cfg.master {
                        let master_id = m_cfg.name.clone();
                        let scan_config = ClassScanConfig {
                            all_seconds: m_cfg.class_scan_rates.all,
                            class1_seconds: Some(m_cfg.class_scan_rates.class1).filter(|s| *s > 0),
                            class2_seconds: Some(m_cfg.class_scan_rates.class2).filter(|s| *s > 0),
                            class3_seconds: Some(m_cfg.class_scan_rates.class3).filter(|s| *s > 0),
                            class0_seconds: Some(m_cfg.class_scan_rates.class0).filter(|s| *s > 0),
                        };
                        let sink_id = master_id.clone();
                        let command_sink: ot_sim_dnp3::master::CommandSink = Arc::new(move |cmd: CommandRequest| {
                            tracing::info!(
                                adapter = %sink_id,
                                command = ?cmd,
                                "would issue DNP3 command to remote outstation (wire-level stack out of scope for this build)"
                            );
                        });

                        let mut master = Master::new(
                            master_id,
                            m_cfg.local_address,
                            m_cfg.remote_address,
                            m_cfg.timeout,
                            scan_config,
                            publish.clone(),
                            command_sink,
                        );
                        for p in &m_cfg.input {
                            match p.kind.as_str() {
                                "binary" => master.add_binary_input_tag(p.address, p.tag.clone()),
                                "analog" => master.add_analog_input_tag(p.address, p.tag.clone()),
                                other => tracing::warn!(kind = %other, "unknown DNP3 point type; skipping"),
                            }
                        }
                        for p in &m_cfg.output {
                            match p.kind.as_str() {
                                "binary" => master.add_binary_output_tag(p.address, p.tag.clone(), p.sbo),
                                "analog" => master.add_analog_output_tag(p.address, p.tag.clone(), p.sbo),
                                other => tracing::warn!(kind = %other, "unknown DNP3 point type; skipping"),
                            }
                        }
                        masters.push(Arc::new(master));
                    }
                    for master in &masters {
                        client.add_master(master.clone());
                    }

                    let mut subscriber = Subscriber::new(broker.subscriber_half());
                    let handler_masters = masters.clone();
                    let handler_tagstore = tagstore.clone();
                    subscriber.on(
                        Kind::Update,
                        Box::new(move |env| {
                            if let Contents::Update(u) = &env.contents {
                                u.updates.iter().for_each(|p| handler_tagstore.set(p.clone()));
                                // Multiple masters can share this channel (§4.8); a tag
                                // only fails write-through if NO master's output table
                                // matched it. `Master::handle_update` reports a point as
                                // an error exactly when it found no match, so a point is
                                // genuinely unmatched here only if every master's result
                                // agrees it was unmatched.
                                let per_master: Vec<_> =
                                    handler_masters.iter().map(|m| m.handle_update(&u.updates)).collect();
                                let mut errors = std::collections::HashMap::new();
                                for point in &u.updates {
                                    if per_master.iter().all(|e| e.contains_key(&point.tag)) {
                                        errors.insert(
                                            point.tag.clone(),
                                            ot_sim_types::errors::PointUnknown(point.tag.clone()).to_string(),
                                        );
                                    }
                                }
                                errors
                            } else {
                                std::collections::HashMap::new()
                            }
                        }),
                    );
                    let confirm_pusher = pusher.clone();
                    let subscriber_handle =
                        subscriber.start(topics::RUNTIME.to_string(), name.clone(), move |env| {
                            let _ = confirm_pusher.push(topics::RUNTIME, &env);
                        });

                    let listener_handle = client.start();
                    tracing::info!(adapter = %name, masters = masters.len(), "dnp3 client device running");
                    client_devices.push(ClientDevice { name: name.clone(), client, listener_handle, subscriber: subscriber_handle });
                }
            }
        }

        let shutdown = install_shutdown_signal();
        let _ = shutdown.recv();
        tracing::info!("shutdown signal received; stopping dnp3 module");

        for device in server_devices {
            device.subscriber.stop();
            device.server.stop();
            for handle in device.scan_handles {
                let _ = handle.join();
            }
            tracing::info!(adapter = %device.name, "stopped");
        }
        for device in client_devices {
            device.subscriber.stop();
            device.client.stop();
            let _ = device.listener_handle.join();
            tracing::info!(adapter = %device.name, "stopped");
        }
        pusher.close();
        Ok(())
    }
}
