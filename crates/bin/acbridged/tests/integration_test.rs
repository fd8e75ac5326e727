//! End-to-end tests for the acbridged stack.
//!
//! Each test wires the same pieces as the daemon (event bus, state store,
//! Daikin integration backed by the simulated unit) and drives them through
//! the integration port. No network or timers are involved: polls are run
//! on demand.

use std::sync::Arc;

use serde_json::json;

use acbridge_adapter_daikin::{DaikinConfig, DaikinIntegration, SimulatedDevice};
use acbridge_app::event_bus::InProcessEventBus;
use acbridge_app::ports::{Integration, IntegrationContext};
use acbridge_app::services::state_store::StateStore;
use acbridge_domain::entity::{AttributeValue, EntityState};
use acbridge_domain::error::{AcBridgeError, ServiceCallError};
use acbridge_domain::event::EventType;

const KEY: &str = "0123456789abcdef";
const ENTITY: &str = "climate.bedroom";

struct Stack {
    unit: Arc<SimulatedDevice>,
    bus: InProcessEventBus,
    store: StateStore<InProcessEventBus>,
    integration: DaikinIntegration<Arc<SimulatedDevice>>,
}

fn config() -> DaikinConfig {
    DaikinConfig {
        host: "192.168.1.50".to_string(),
        api_key: KEY.to_string(),
        device_apn: "DAIKIN5C3A1F".to_string(),
        device_name: "Bedroom".to_string(),
        ..DaikinConfig::default()
    }
}

fn stack_with(config: DaikinConfig) -> Stack {
    let unit = Arc::new(SimulatedDevice::new(KEY));
    let bus = InProcessEventBus::new(64);
    let store = StateStore::new(bus.clone());
    let integration = DaikinIntegration::new(config, Arc::clone(&unit));
    Stack {
        unit,
        bus,
        store,
        integration,
    }
}

async fn running() -> Stack {
    let mut stack = stack_with(config());
    stack.integration.setup(&stack.store).await.unwrap();
    stack
}

impl Stack {
    /// Send a service call and persist the returned entity, as the hub does.
    async fn call(
        &self,
        service: &str,
        data: serde_json::Value,
    ) -> Result<acbridge_domain::entity::Entity, AcBridgeError> {
        let id = self.store.get_entity(ENTITY)?.id;
        let entity = self
            .integration
            .handle_service_call(id, service, data)
            .await?;
        self.store.upsert_entity(entity).await
    }

    fn attr(&self, key: &str) -> Option<AttributeValue> {
        self.store
            .get_entity(ENTITY)
            .unwrap()
            .get_attribute(key)
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_unit_as_climate_entity() {
    let stack = running().await;

    let entity = stack.store.get_entity(ENTITY).unwrap();
    assert_eq!(entity.domain(), "climate");
    assert_eq!(entity.friendly_name, "Bedroom");
    assert_eq!(entity.state, EntityState::Off);
    assert_eq!(
        stack.attr("hvac_modes"),
        Some(AttributeValue::string_list([
            "off", "fan_only", "cool", "dry", "heat", "auto"
        ]))
    );
    assert_eq!(stack.attr("min_temp"), Some(AttributeValue::Float(10.0)));
    assert_eq!(stack.attr("max_temp"), Some(AttributeValue::Float(32.0)));
    assert_eq!(stack.attr("temperature"), Some(AttributeValue::Float(24.0)));

    let devices = stack.store.list_devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].integration, "daikin_br");
    assert_eq!(devices[0].unique_id, "DAIKIN5C3A1F");
    assert_eq!(devices[0].model.as_deref(), Some("Smart AC Series"));
}

#[tokio::test]
async fn should_publish_device_and_entity_events_on_setup() {
    let mut stack = stack_with(config());
    let mut rx = stack.bus.subscribe();
    stack.integration.setup(&stack.store).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.event_type, EventType::DeviceUpdated);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.event_type, EventType::EntityCreated);
}

#[tokio::test]
async fn should_not_create_entity_without_device_key() {
    let mut stack = stack_with(DaikinConfig {
        api_key: String::new(),
        ..config()
    });

    let result = stack.integration.setup(&stack.store).await;
    assert!(matches!(result, Err(AcBridgeError::Validation(_))));
    assert!(stack.store.list_entities().is_empty());
    assert!(stack.store.list_devices().is_empty());
}

#[tokio::test]
async fn should_recover_after_unit_returns_online() {
    let mut stack = stack_with(config());
    stack.unit.set_offline(true);
    stack.integration.setup(&stack.store).await.unwrap();
    assert_eq!(
        stack.store.get_entity(ENTITY).unwrap().state,
        EntityState::Unavailable
    );

    stack.unit.set_offline(false);
    stack.integration.poll_once(&stack.store).await.unwrap();
    assert_eq!(stack.store.get_entity(ENTITY).unwrap().state, EntityState::Off);
}

#[tokio::test]
async fn should_keep_unnamed_units_apart() {
    let bus = InProcessEventBus::new(64);
    let store = StateStore::new(bus.clone());
    let unit_for = |apn: &str| DaikinConfig {
        host: "192.168.1.50".to_string(),
        api_key: KEY.to_string(),
        device_apn: apn.to_string(),
        ..DaikinConfig::default()
    };
    let unit_a = Arc::new(SimulatedDevice::new(KEY));
    let unit_b = Arc::new(SimulatedDevice::new(KEY));
    let mut a = DaikinIntegration::new(unit_for("DAIKINAAAAAA"), Arc::clone(&unit_a));
    let mut b = DaikinIntegration::new(unit_for("DAIKINBBBBBB"), Arc::clone(&unit_b));
    a.setup(&store).await.unwrap();
    b.setup(&store).await.unwrap();

    assert_eq!(store.list_devices().len(), 2);
    let ids: Vec<_> = store
        .list_entities()
        .into_iter()
        .map(|e| e.entity_id)
        .collect();
    assert_eq!(ids, ["climate.unknown", "climate.unknown_2"]);

    let first = store.get_entity("climate.unknown").unwrap();
    let second = store.get_entity("climate.unknown_2").unwrap();
    assert!(a.owns_entity(first.id));
    assert!(b.owns_entity(second.id));

    // Drive the second unit only; the first must not follow.
    let entity = b
        .handle_service_call(second.id, "set_hvac_mode", json!({"hvac_mode": "cool"}))
        .await
        .unwrap();
    store.upsert_entity(entity).await.unwrap();
    assert_eq!(unit_b.status()["port1"]["power"], json!(1));
    assert_eq!(unit_a.status()["port1"]["power"], json!(0));

    // Setup leaves a skip request behind, so poll twice.
    for _ in 0..2 {
        a.poll_once(&store).await.unwrap();
    }
    assert_eq!(
        store.get_entity("climate.unknown").unwrap().state,
        EntityState::Off
    );
    assert_eq!(
        store.get_entity("climate.unknown_2").unwrap().state,
        EntityState::On
    );
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_cool_the_room_through_service_calls() {
    let stack = running().await;

    let entity = stack
        .call("set_hvac_mode", json!({"hvac_mode": "cool"}))
        .await
        .unwrap();
    assert_eq!(entity.state, EntityState::On);

    stack
        .call("set_temperature", json!({"temperature": 18}))
        .await
        .unwrap();
    stack
        .call("set_fan_mode", json!({"fan_mode": "high"}))
        .await
        .unwrap();
    stack
        .call("set_preset_mode", json!({"preset_mode": "boost"}))
        .await
        .unwrap();

    assert_eq!(
        stack.attr("temperature"),
        Some(AttributeValue::Float(18.0))
    );
    assert_eq!(
        stack.attr("fan_mode"),
        Some(AttributeValue::String("high".to_string()))
    );
    assert_eq!(
        stack.attr("preset_mode"),
        Some(AttributeValue::String("boost".to_string()))
    );

    let status = stack.unit.status();
    assert_eq!(status["port1"]["power"], json!(1));
    assert_eq!(status["port1"]["mode"], json!(3));
    assert_eq!(status["port1"]["temperature"], json!(18));
    assert_eq!(status["port1"]["fan"], json!(7));
    assert_eq!(status["port1"]["powerchill"], json!(1));
    assert_eq!(status["port1"]["econo"], json!(0));
}

#[tokio::test]
async fn should_reject_low_target_in_cool_mode() {
    let stack = running().await;
    stack
        .call("set_hvac_mode", json!({"hvac_mode": "cool"}))
        .await
        .unwrap();

    let result = stack
        .call("set_temperature", json!({"temperature": 12}))
        .await;
    assert!(matches!(
        result,
        Err(AcBridgeError::ServiceCall(ServiceCallError::OutOfRange { .. }))
    ));
    assert_eq!(stack.unit.status()["port1"]["temperature"], json!(24));
}

#[tokio::test]
async fn should_turn_off_and_keep_mode_on_unit() {
    let stack = running().await;
    stack
        .call("set_hvac_mode", json!({"hvac_mode": "heat"}))
        .await
        .unwrap();

    let entity = stack
        .call("set_hvac_mode", json!({"hvac_mode": "off"}))
        .await
        .unwrap();
    assert_eq!(entity.state, EntityState::Off);
    assert_eq!(stack.unit.status()["port1"]["power"], json!(0));
    assert_eq!(stack.unit.status()["port1"]["mode"], json!(4));
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_pick_up_changes_made_on_the_remote() {
    let stack = running().await;
    // Setup leaves a skip request behind.
    stack.integration.poll_once(&stack.store).await.unwrap();

    stack.unit.set_port_value("power", json!(1));
    stack.unit.set_port_value("mode", json!(6));
    stack.unit.set_port_value("econo", json!(1));
    stack.unit.set_port_value("powerchill", json!(1));
    stack.unit.set_room_temperature(22.5);
    stack.integration.poll_once(&stack.store).await.unwrap();

    assert_eq!(
        stack.attr("hvac_mode"),
        Some(AttributeValue::String("fan_only".to_string()))
    );
    assert_eq!(
        stack.attr("preset_mode"),
        Some(AttributeValue::String("eco".to_string()))
    );
    assert_eq!(
        stack.attr("current_temperature"),
        Some(AttributeValue::Float(22.5))
    );
}

#[tokio::test]
async fn should_unload_cleanly() {
    let mut stack = running().await;
    stack
        .integration
        .start_background(stack.store.clone())
        .await
        .unwrap();
    assert!(stack.integration.is_polling());

    stack.integration.teardown().await.unwrap();
    assert!(!stack.integration.is_polling());
}
