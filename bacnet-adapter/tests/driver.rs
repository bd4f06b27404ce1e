//! Driver-level scanning, connection setup and shutdown

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bacnet_adapter::{AdapterConfig, AdapterError, BacnetDriver, Connection, ScanEvent};
use bacnet_api::loopback::{LoopbackNetwork, SimulatedDevice};
use rstest::{fixture, rstest};

struct Harness {
    network: LoopbackNetwork,
    driver: BacnetDriver,
}

#[fixture]
fn harness() -> Harness {
    let network = LoopbackNetwork::new();
    network.add_device(SimulatedDevice::new(1001, 47808).named("AHU-1"));
    network.add_device(SimulatedDevice::new(1002, 47808).named("AHU-2"));
    network.add_device(SimulatedDevice::new(2001, 47810).named("Boiler"));

    let config = AdapterConfig {
        discovery_settle_time: Duration::ZERO,
        time_sync_interval: Duration::from_millis(50),
        ..AdapterConfig::fast_scan()
    };
    let driver = BacnetDriver::with_config(Arc::new(network.clone()), config).unwrap();
    Harness { network, driver }
}

fn found(events: &[ScanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Found(info) => Some(info.address.clone()),
            ScanEvent::Progress(_) => None,
        })
        .collect()
}

#[rstest]
#[case(AdapterConfig { notification_poll_interval: Duration::ZERO, ..AdapterConfig::default() })]
#[case(AdapterConfig { time_sync_interval: Duration::ZERO, ..AdapterConfig::default() })]
#[case(AdapterConfig { scan_ports: RangeInclusive::new(47810, 47808), ..AdapterConfig::default() })]
fn test_with_config_rejects_invalid_config(#[case] config: AdapterConfig) {
    let result = BacnetDriver::with_config(Arc::new(LoopbackNetwork::new()), config);
    assert!(result.err().is_some_and(|err| err.is_configuration()));
}

#[rstest]
fn test_with_config_accepts_zero_settle_time() {
    let config = AdapterConfig::default().with_settle_time(Duration::ZERO);
    assert!(BacnetDriver::with_config(Arc::new(LoopbackNetwork::new()), config).is_ok());
}

#[rstest]
fn test_scan_reports_devices_on_requested_port(harness: Harness) {
    let mut events = Vec::new();
    let count = harness
        .driver
        .scan_for_devices("scanPort=47808", &mut |event| events.push(event))
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(found(&events), vec!["1001;127.0.0.1", "1002;127.0.0.1"]);
    assert_eq!(harness.driver.cache().len(), 2);
}

#[rstest]
fn test_scan_accepts_hex_port(harness: Harness) {
    let count = harness.driver.scan_for_devices("scanPort=0xBAC2", &mut |_| {}).unwrap();
    assert_eq!(count, 1);
    assert_eq!(harness.driver.cache().get(2001).unwrap().port, 47810);
}

#[rstest]
fn test_full_scan_covers_every_port(harness: Harness) {
    let mut events = Vec::new();
    let count = harness.driver.scan_for_devices("", &mut |event| events.push(event)).unwrap();

    assert_eq!(count, 3);
    assert!(found(&events).contains(&"2001;127.0.0.1".to_string()));
    assert!(matches!(events.last(), Some(ScanEvent::Progress(100))));
}

#[rstest]
fn test_interrupt_from_listener(harness: Harness) {
    let driver = &harness.driver;
    let result = driver.scan_for_devices("", &mut |event| {
        if let ScanEvent::Found(_) = event {
            driver.interrupt_device_scan();
        }
    });

    assert!(matches!(result, Err(AdapterError::Interrupted)));
    assert_eq!(harness.network.discovery_broadcasts(47810), 0);
}

#[rstest]
fn test_invalid_scan_settings(harness: Harness) {
    let result = harness.driver.scan_for_devices("scanPort=abc", &mut |_| {});
    assert!(result.unwrap_err().is_configuration());
}

#[rstest]
fn test_connect_after_scan_uses_cache(harness: Harness) {
    harness.driver.scan_for_devices("scanPort=47808", &mut |_| {}).unwrap();
    let broadcasts = harness.network.discovery_broadcasts(47808);

    let connection = harness.driver.connect("1002", "").unwrap();
    assert!(!connection.is_server());
    assert_eq!(harness.network.discovery_broadcasts(47808), broadcasts);
    assert_eq!(harness.driver.registry().ref_count(47808), 2);
    connection.disconnect().unwrap();
    assert_eq!(harness.driver.registry().ref_count(47808), 1);
}

#[rstest]
fn test_connect_without_host_rescans(harness: Harness) {
    let connection = harness.driver.connect("2001", "remoteDevicePort=47810").unwrap();
    assert_eq!(connection.port(), 47810);
    assert!(harness.network.discovery_broadcasts(47810) > 0);
    assert!(harness.driver.cache().get(2001).unwrap().device.info.is_some());
}

#[rstest]
#[case("not-a-device", "")]
#[case("1001;nohost", "")]
#[case("1001", "writePriority=17")]
#[case("1001", "writePriority=0")]
#[case("1001", "localDevicePort=huge")]
fn test_connect_rejects_bad_configuration(harness: Harness, #[case] address: &str, #[case] settings: &str) {
    let result = harness.driver.connect(address, settings);
    assert!(result.err().is_some_and(|err| err.is_configuration()));
    assert!(harness.driver.registry().ports().is_empty());
}

#[rstest]
fn test_connect_to_unknown_host_device(harness: Harness) {
    let result = harness.driver.connect("9999;127.0.0.1", "");
    assert!(matches!(result, Err(AdapterError::Connection(_))));
    assert_eq!(harness.driver.registry().ref_count(47808), 0);
}

#[rstest]
fn test_connect_to_unknown_device_after_rescan(harness: Harness) {
    let result = harness.driver.connect("9999", "");
    assert!(matches!(result, Err(AdapterError::Connection(_))));
    // only the scanner's reference to the populated port remains
    assert_eq!(harness.driver.registry().ref_count(47808), 1);
}

#[rstest]
fn test_connect_to_unreachable_device(harness: Harness) {
    harness.network.set_reachable(1001, false);
    let result = harness.driver.connect("1001;127.0.0.1", "");
    assert!(matches!(result, Err(AdapterError::Connection(_))));
}

#[rstest]
fn test_endpoint_failure_is_a_connection_error(harness: Harness) {
    harness.network.fail_endpoint_creation(47830);
    let result = harness.driver.connect("1001;127.0.0.1", "localDevicePort=47830");
    assert!(matches!(result, Err(AdapterError::Connection(_))));
}

#[rstest]
fn test_shutdown_releases_everything(harness: Harness) {
    harness.driver.scan_for_devices("scanPort=47808", &mut |_| {}).unwrap();
    let _connection = harness.driver.connect("1001;127.0.0.1", "").unwrap();
    assert!(harness.driver.registry().ref_count(47808) >= 1);

    harness.driver.shutdown();

    assert!(harness.driver.registry().ports().is_empty());
    assert!(harness.driver.cache().is_empty());
    assert!(harness.network.terminated_endpoints().contains(&47808));
}

#[rstest]
fn test_time_sync_broadcasts_until_stopped(harness: Harness) {
    let task = harness.driver.start_time_sync(47808).unwrap();
    assert!(task.is_running());
    assert_eq!(task.port(), 47808);

    let deadline = Instant::now() + Duration::from_secs(2);
    while harness.network.time_synchronizations() < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(harness.network.time_synchronizations() >= 2);

    task.stop();
    assert_eq!(harness.driver.registry().ref_count(47808), 0);
}
