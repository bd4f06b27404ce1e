//! Remote sessions against the in-memory loopback network

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bacnet_adapter::{
    records_channel, AdapterConfig, AdapterError, BacnetConnection, BacnetDriver, ChannelRecordContainer,
    ChannelValueContainer, Connection, Flag, Value, ValueType,
};
use bacnet_api::loopback::{LoopbackNetwork, SimulatedDevice, SimulatedObject};
use bacnet_api::{BacnetValue, BinaryPv, EngineeringUnits, ObjectIdentifier, ObjectType, PropertyIdentifier};
use rstest::{fixture, rstest};

const PORT: u16 = 47808;
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

struct Harness {
    network: LoopbackNetwork,
    driver: BacnetDriver,
}

fn oid(object_type: ObjectType, instance: u32) -> ObjectIdentifier {
    ObjectIdentifier::new(object_type, instance)
}

fn building_device(instance: u32) -> SimulatedDevice {
    SimulatedDevice::new(instance, PORT)
        .named("AHU-1")
        .with_object(SimulatedObject::analog(
            ObjectType::ANALOG_INPUT,
            1,
            "Room1Temp",
            21.5,
            EngineeringUnits::DEGREES_CELSIUS,
        ))
        .with_object(
            SimulatedObject::analog(ObjectType::ANALOG_VALUE, 2, "Setpoint", 20.0, EngineeringUnits::DEGREES_CELSIUS)
                .with(PropertyIdentifier::RELINQUISH_DEFAULT, BacnetValue::Real(18.0)),
        )
        .with_object(SimulatedObject::binary(ObjectType::BINARY_VALUE, 3, "Fan", false))
        .with_object(SimulatedObject::multi_state(ObjectType::MULTI_STATE_VALUE, 4, "Mode", 2, 4))
        .with_object(
            SimulatedObject::new(oid(ObjectType::SCHEDULE, 5), "Occupancy")
                .with(PropertyIdentifier::PRESENT_VALUE, BacnetValue::Real(1.0)),
        )
        .with_object(SimulatedObject::analog(
            ObjectType::ANALOG_VALUE,
            6,
            "Panel.Sub",
            0.0,
            EngineeringUnits::NO_UNITS,
        ))
        .with_object(SimulatedObject::binary(ObjectType::BINARY_OUTPUT, 7, "Pump", false))
        .deny_writes(oid(ObjectType::BINARY_OUTPUT, 7))
}

#[fixture]
fn harness() -> Harness {
    let network = LoopbackNetwork::new();
    network.add_device(building_device(1001));
    network.add_device(
        SimulatedDevice::new(1002, PORT)
            .named("AHU-2")
            .with_object(SimulatedObject::analog(
                ObjectType::ANALOG_VALUE,
                2,
                "Setpoint",
                19.0,
                EngineeringUnits::DEGREES_CELSIUS,
            )),
    );

    let config = AdapterConfig {
        discovery_settle_time: Duration::ZERO,
        ..AdapterConfig::fast_scan()
    };
    let driver = BacnetDriver::with_config(Arc::new(network.clone()), config).unwrap();
    Harness { network, driver }
}

fn connect(harness: &Harness, address: &str, settings: &str) -> BacnetConnection {
    harness.driver.connect(address, settings).unwrap()
}

fn record(address: &str) -> ChannelRecordContainer {
    ChannelRecordContainer::new(address, address)
}

fn value_of(container: &ChannelRecordContainer) -> Option<Value> {
    container.record.as_ref().and_then(|record| record.value.clone())
}

#[rstest]
fn test_scan_for_channels_filters_and_describes(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let channels = connection.scan_for_channels("").unwrap();

    let mut addresses: Vec<_> = channels.iter().map(|channel| channel.channel_address.as_str()).collect();
    addresses.sort_unstable();
    assert_eq!(addresses, vec!["Fan", "Mode", "Pump", "Room1Temp", "Setpoint"]);

    let temp = channels.iter().find(|channel| channel.channel_address == "Room1Temp").unwrap();
    assert_eq!(temp.value_type, ValueType::Float);
    assert_eq!(temp.description, "Room1Temp description");
    assert_eq!(temp.metadata, "value=21.5;u=degreesCelsius");
    assert!(temp.readable);
    assert!(!temp.writable);

    let fan = channels.iter().find(|channel| channel.channel_address == "Fan").unwrap();
    assert_eq!(fan.value_type, ValueType::Boolean);
    assert!(fan.writable);
    assert_eq!(fan.metadata, "value=inactive;u=");

    let mode = channels.iter().find(|channel| channel.channel_address == "Mode").unwrap();
    assert_eq!(mode.value_type, ValueType::Integer);
}

#[rstest]
fn test_parameter_list_scan_expands_auxiliary_properties(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let channels = connection.scan_for_channels("parameterlist=true").unwrap();

    let units = channels
        .iter()
        .find(|channel| channel.channel_address == "Setpoint#units")
        .unwrap();
    assert_eq!(units.value_type, ValueType::String);
    assert!(!units.writable);
    assert_eq!(units.metadata, "value=degreesCelsius;u=");

    let states = channels
        .iter()
        .find(|channel| channel.channel_address == "Mode#numberOfStates")
        .unwrap();
    assert_eq!(states.value_type, ValueType::Integer);

    assert!(channels.iter().any(|channel| channel.channel_address == "Fan#activeText"));
    assert!(channels.iter().any(|channel| channel.channel_address == "Setpoint"));
    // not present on the simulated object
    assert!(!channels.iter().any(|channel| channel.channel_address == "Setpoint#highLimit"));
}

#[rstest]
fn test_batched_read_degrades_only_unconvertible_channel(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    connection.scan_for_channels("").unwrap();
    let reads_before = harness.network.batch_reads();

    let mut containers = vec![
        record("Room1Temp"),
        record("Setpoint"),
        record("schedule:5"),
        record("Fan"),
        record("Mode"),
    ];
    connection.read(&mut containers).unwrap();

    assert_eq!(harness.network.batch_reads(), reads_before + 1);

    let valid = containers
        .iter()
        .filter(|container| container.flag() == Some(Flag::Valid))
        .count();
    assert_eq!(valid, 4);
    assert_eq!(
        containers[2].flag(),
        Some(Flag::DriverErrorChannelValueTypeConversionException)
    );

    assert_eq!(value_of(&containers[0]), Some(Value::Float(21.5)));
    assert_eq!(value_of(&containers[1]), Some(Value::Float(20.0)));
    assert_eq!(value_of(&containers[3]), Some(Value::Boolean(false)));
    assert_eq!(value_of(&containers[4]), Some(Value::Integer(2)));
    assert_eq!(containers[0].handle, Some(oid(ObjectType::ANALOG_INPUT, 1)));
}

#[rstest]
fn test_rescan_drops_renamed_object_names(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    connection.scan_for_channels("").unwrap();

    harness.network.set_property(
        1001,
        oid(ObjectType::ANALOG_INPUT, 1),
        PropertyIdentifier::OBJECT_NAME,
        BacnetValue::CharacterString("Room2Temp".to_string()),
    );
    let channels = connection.scan_for_channels("").unwrap();
    assert!(channels.iter().any(|channel| channel.channel_address == "Room2Temp"));
    assert!(!channels.iter().any(|channel| channel.channel_address == "Room1Temp"));

    let mut containers = vec![record("Room1Temp"), record("Room2Temp")];
    connection.read(&mut containers).unwrap();
    assert_eq!(containers[0].flag(), Some(Flag::DriverErrorChannelWithThisAddressNotFound));
    assert_eq!(value_of(&containers[1]), Some(Value::Float(21.5)));
}

#[rstest]
fn test_read_with_empty_cache_scans_first(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let BacnetConnection::Remote(remote) = &connection else {
        panic!("expected a remote session");
    };
    assert_eq!(remote.cached_handles(), 0);

    let mut containers = vec![record("Setpoint#units")];
    connection.read(&mut containers).unwrap();

    assert!(remote.cached_handles() > 0);
    assert_eq!(value_of(&containers[0]), Some(Value::String("degreesCelsius".to_string())));
}

#[rstest]
#[case("NoSuchObject", Flag::DriverErrorChannelWithThisAddressNotFound)]
#[case("Setpoint#activeText", Flag::DriverErrorChannelWithThisAddressNotFound)]
#[case("Setpoint#bogus", Flag::DriverErrorChannelAddressSyntaxInvalid)]
#[case("a#b#c", Flag::DriverErrorChannelAddressSyntaxInvalid)]
fn test_read_flags_bad_channels(harness: Harness, #[case] address: &str, #[case] flag: Flag) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let mut containers = vec![record(address), record("Room1Temp")];
    connection.read(&mut containers).unwrap();

    assert_eq!(containers[0].flag(), Some(flag));
    assert_eq!(containers[1].flag(), Some(Flag::Valid));
}

#[rstest]
fn test_write_uses_configured_priority(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "writePriority=8");
    let mut containers = vec![ChannelValueContainer::new("Setpoint", Some(Value::Float(22.5)))];
    connection.write(&mut containers).unwrap();

    assert_eq!(containers[0].flag, Some(Flag::Valid));
    let write = harness.network.writes().pop().unwrap();
    assert_eq!(write.object, oid(ObjectType::ANALOG_VALUE, 2));
    assert_eq!(write.value, BacnetValue::Real(22.5));
    assert_eq!(write.priority, Some(8));
}

#[rstest]
fn test_write_of_absent_value_relinquishes(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let mut containers = vec![ChannelValueContainer::new("Setpoint", None)];
    connection.write(&mut containers).unwrap();

    assert_eq!(containers[0].flag, Some(Flag::Valid));
    assert_eq!(harness.network.writes().pop().unwrap().value, BacnetValue::Null);
    assert_eq!(
        harness
            .network
            .property(1001, oid(ObjectType::ANALOG_VALUE, 2), PropertyIdentifier::PRESENT_VALUE),
        Some(BacnetValue::Real(18.0))
    );
}

#[rstest]
fn test_write_flags_per_channel(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let mut containers = vec![
        ChannelValueContainer::new("Pump", Some(Value::Boolean(true))),
        ChannelValueContainer::new("Setpoint#objectName", Some(Value::String("x".into()))),
        ChannelValueContainer::new("Mode", Some(Value::Integer(-1))),
        ChannelValueContainer::new("Fan", Some(Value::Boolean(true))),
    ];
    connection.write(&mut containers).unwrap();

    assert_eq!(containers[0].flag, Some(Flag::AccessMethodNotSupported));
    assert_eq!(
        containers[1].flag,
        Some(Flag::DriverErrorChannelValueTypeConversionException)
    );
    assert_eq!(
        containers[2].flag,
        Some(Flag::DriverErrorChannelValueTypeConversionException)
    );
    assert_eq!(containers[3].flag, Some(Flag::Valid));
    assert_eq!(
        harness
            .network
            .property(1001, oid(ObjectType::BINARY_VALUE, 3), PropertyIdentifier::PRESENT_VALUE),
        Some(BacnetValue::BinaryPv(BinaryPv::Active))
    );
}

#[rstest]
fn test_listen_twice_replaces_subscription_set(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let setpoint = oid(ObjectType::ANALOG_VALUE, 2);
    let mode = oid(ObjectType::MULTI_STATE_VALUE, 4);

    let (listener, records) = records_channel();
    let mut containers = vec![record("Setpoint"), record("Fan")];
    connection.start_listening(&mut containers, listener).unwrap();
    assert_eq!(
        harness.network.active_subscriptions(1001),
        vec![setpoint, oid(ObjectType::BINARY_VALUE, 3)]
    );

    harness.network.notify(1001, setpoint, BacnetValue::Real(25.0));
    let batch = records.recv_timeout(NOTIFY_TIMEOUT).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].channel_address, "Setpoint");
    assert_eq!(value_of(&batch[0]), Some(Value::Float(25.0)));

    let (listener, second) = records_channel();
    let mut containers = vec![record("Mode")];
    connection.start_listening(&mut containers, listener).unwrap();
    assert_eq!(harness.network.active_subscriptions(1001), vec![mode]);

    assert_eq!(harness.network.notify(1001, setpoint, BacnetValue::Real(26.0)), 0);
    harness.network.notify(1001, mode, BacnetValue::Unsigned(3));

    let batch = second.recv_timeout(NOTIFY_TIMEOUT).unwrap();
    assert_eq!(value_of(&batch[0]), Some(Value::Integer(3)));
    assert!(records.try_recv().is_none());
}

#[rstest]
fn test_sessions_sharing_an_endpoint_do_not_cross_deliver(harness: Harness) {
    let first = connect(&harness, "1001;127.0.0.1", "");
    let second = connect(&harness, "1002;127.0.0.1", "");
    assert_eq!(harness.driver.registry().ref_count(PORT), 2);

    let (first_listener, first_records) = records_channel();
    let (second_listener, second_records) = records_channel();
    first
        .start_listening(&mut [record("analogValue:2")], first_listener)
        .unwrap();
    second
        .start_listening(&mut [record("analogValue:2")], second_listener)
        .unwrap();

    harness
        .network
        .inject(PORT, 1002, oid(ObjectType::ANALOG_VALUE, 2), BacnetValue::Real(5.0));

    let batch = second_records.recv_timeout(NOTIFY_TIMEOUT).unwrap();
    assert_eq!(value_of(&batch[0]), Some(Value::Float(5.0)));
    assert!(first_records.recv_timeout(Duration::from_millis(200)).is_none());
}

#[rstest]
fn test_concurrent_reads_on_one_session(harness: Harness) {
    let connection = Arc::new(connect(&harness, "1001;127.0.0.1", ""));
    connection.scan_for_channels("").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let connection = Arc::clone(&connection);
            thread::spawn(move || {
                let mut containers = vec![record("Room1Temp"), record("Mode")];
                connection.read(&mut containers).unwrap();
                containers.iter().all(|container| container.flag() == Some(Flag::Valid))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[rstest]
fn test_disconnect_cancels_and_releases(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    let (listener, _records) = records_channel();
    connection
        .start_listening(&mut [record("Setpoint"), record("Mode")], listener)
        .unwrap();
    assert_eq!(harness.network.active_subscriptions(1001).len(), 2);
    assert_eq!(harness.driver.registry().ref_count(PORT), 1);

    connection.disconnect().unwrap();
    connection.disconnect().unwrap();

    assert!(harness.network.active_subscriptions(1001).is_empty());
    assert_eq!(harness.driver.registry().ref_count(PORT), 0);
    assert!(harness.network.terminated_endpoints().contains(&PORT));
    assert!(matches!(
        connection.read(&mut [record("Setpoint")]),
        Err(AdapterError::Disconnected)
    ));
}

#[rstest]
fn test_stale_session_disconnect_after_shutdown_spares_new_endpoint(harness: Harness) {
    let stale = connect(&harness, "1001;127.0.0.1", "");
    harness.driver.shutdown();
    assert!(harness.driver.registry().ports().is_empty());

    let current = connect(&harness, "1001;127.0.0.1", "");
    assert_eq!(harness.driver.registry().ref_count(PORT), 1);

    stale.disconnect().unwrap();
    assert_eq!(harness.driver.registry().ref_count(PORT), 1);
    assert_eq!(harness.network.terminated_endpoints(), vec![PORT]);

    let mut containers = vec![record("Room1Temp")];
    current.read(&mut containers).unwrap();
    assert_eq!(containers[0].flag(), Some(Flag::Valid));
    assert_eq!(value_of(&containers[0]), Some(Value::Float(21.5)));
}

#[rstest]
fn test_disconnect_without_subscriptions(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    assert!(connection.disconnect().is_ok());
    assert_eq!(harness.network.cancel_calls(), 0);
}

#[rstest]
fn test_scan_on_unreachable_device_is_connection_error(harness: Harness) {
    let connection = connect(&harness, "1001;127.0.0.1", "");
    harness.network.set_reachable(1001, false);

    assert!(matches!(
        connection.scan_for_channels(""),
        Err(AdapterError::Connection(_))
    ));
    assert!(matches!(
        connection.read(&mut [record("analogValue:2")]),
        Err(AdapterError::Connection(_))
    ));
}
