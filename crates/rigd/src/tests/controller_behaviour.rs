//! End-to-end behaviour of controllers running real Lua drivers.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::controller::ControllerError;
use crate::{BootstrapError, StaticConfigLoader, bootstrap_with};

use super::support::{RecordingReporter, config_with_devices, write_driver};

const FT991A_DRIVER: &str = r#"
function set_frequency(data)
    if data == "14074000" then
        return "OK"
    end
    return "ERR out of range"
end

function get_info(data)
    return json.encode({ device = rig.device(), driver = "ft991a" })
end
"#;

#[fixture]
fn script_dir() -> TempDir {
    let dir = TempDir::new().expect("create script dir");
    write_driver(dir.path(), "ft991a", FT991A_DRIVER);
    dir
}

#[rstest]
fn set_frequency_round_trip(script_dir: TempDir) {
    let config = config_with_devices(script_dir.path(), &[("trx0", "ft991a")]);
    let reporter = RecordingReporter::default();
    let daemon = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(reporter.clone()),
    )
    .expect("bootstrap");

    let controller = daemon.controller("trx0").expect("trx0 registered");
    let reply = controller.call("set_frequency", "14074000").expect("call");
    assert_eq!(reply, "OK");

    // The slot must be free again the moment the caller unblocks.
    assert!(controller.is_idle());

    let events = reporter.events();
    assert!(events.contains(&"controller_ready: trx0".to_owned()));
    assert!(events.contains(&"bootstrap_succeeded".to_owned()));
}

#[rstest]
fn undefined_handler_yields_empty_reply_and_recovers(script_dir: TempDir) {
    let config = config_with_devices(script_dir.path(), &[("trx0", "ft991a")]);
    let daemon = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect("bootstrap");

    let controller = daemon.controller("trx0").expect("trx0 registered");

    let reply = controller.call("bogus_handler", "").expect("call");
    assert_eq!(reply, "", "undefined handler must normalize to empty");

    // The failure must not poison the controller.
    let reply = controller.call("set_frequency", "14074000").expect("call");
    assert_eq!(reply, "OK");
}

#[rstest]
fn drivers_reach_their_capability_modules(script_dir: TempDir) {
    let config = config_with_devices(script_dir.path(), &[("trx0", "ft991a")]);
    let daemon = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect("bootstrap");

    let controller = daemon.controller("trx0").expect("trx0 registered");
    let reply = controller.call("get_info", "").expect("call");
    let info: serde_json::Value = serde_json::from_str(&reply).expect("json reply");
    assert_eq!(info["device"], "trx0");
    assert_eq!(info["driver"], "ft991a");
}

#[rstest]
fn controllers_are_isolated_from_each_other(script_dir: TempDir) {
    write_driver(
        script_dir.path(),
        "poker",
        r#"
        function poke(data)
            leaked_state = "set"
            return "poked"
        end
        "#,
    );
    write_driver(
        script_dir.path(),
        "peeker",
        r#"
        function peek(data)
            if leaked_state then
                return "leaked"
            end
            return "clean"
        end
        "#,
    );

    let config = config_with_devices(
        script_dir.path(),
        &[("dev-a", "poker"), ("dev-b", "peeker")],
    );
    let daemon = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect("bootstrap");

    let poker = daemon.controller("dev-a").expect("dev-a registered");
    assert_eq!(poker.call("poke", "").expect("call"), "poked");

    // One engine per controller: state set by dev-a must be invisible.
    let peeker = daemon.controller("dev-b").expect("dev-b registered");
    assert_eq!(peeker.call("peek", "").expect("call"), "clean");
}

#[rstest]
fn missing_driver_fails_bootstrap(script_dir: TempDir) {
    let config = config_with_devices(script_dir.path(), &[("trx9", "does-not-exist")]);
    let reporter = RecordingReporter::default();
    let error = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(reporter.clone()),
    )
    .expect_err("bootstrap must fail");

    assert!(matches!(
        error,
        BootstrapError::Controller {
            source: ControllerError::Startup { .. },
            ..
        }
    ));
    let events = reporter.events();
    assert!(
        events
            .iter()
            .any(|event| event.starts_with("controller_failed: trx9")),
        "controller failure must be reported: {events:?}"
    );
}

#[rstest]
fn duplicate_devices_fail_bootstrap(script_dir: TempDir) {
    let config = config_with_devices(
        script_dir.path(),
        &[("trx0", "ft991a"), ("trx0", "ft991a")],
    );
    let error = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect_err("bootstrap must fail");

    assert!(matches!(error, BootstrapError::DeviceSet { .. }));
}

#[rstest]
fn broken_driver_chunk_fails_bootstrap(script_dir: TempDir) {
    write_driver(script_dir.path(), "broken", "function unterminated(");
    let config = config_with_devices(script_dir.path(), &[("trx1", "broken")]);
    let error = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect_err("bootstrap must fail");

    assert!(matches!(
        error,
        BootstrapError::Controller {
            source: ControllerError::Startup { .. },
            ..
        }
    ));
}

#[rstest]
fn handler_runtime_error_is_isolated(script_dir: TempDir) {
    write_driver(
        script_dir.path(),
        "flaky",
        r#"
        function explode(data)
            error("deliberate failure: " .. data)
        end

        function ping(data)
            return "pong"
        end
        "#,
    );
    let config = config_with_devices(script_dir.path(), &[("trx2", "flaky")]);
    let daemon = bootstrap_with(
        &StaticConfigLoader::new(config),
        Arc::new(RecordingReporter::default()),
    )
    .expect("bootstrap");

    let controller = daemon.controller("trx2").expect("trx2 registered");
    assert_eq!(controller.call("explode", "x").expect("call"), "");
    assert_eq!(controller.call("ping", "").expect("call"), "pong");
    assert!(controller.is_idle());
}
