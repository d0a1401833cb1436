use connect_ops::utils::monitor::ResourceMonitor;
use connect_ops::{Bootstrapper, ConnectClient, OpsError, ReadinessProbe, Settings};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn write_connector_config(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(format!("{}.json", name));
    std::fs::write(&path, body).unwrap();
    path.to_str().unwrap().to_string()
}

fn bootstrap_settings(base_url: &str, connectors: &[(&str, &str)]) -> Settings {
    let mut toml = format!(
        "[connect]\nbase_url = \"{}\"\npoll_interval_seconds = 1\nmax_ready_attempts = 3\n",
        base_url
    );
    for (name, config_file) in connectors {
        toml.push_str(&format!(
            "\n[[connectors]]\nname = \"{}\"\nconfig_file = \"{}\"\n",
            name, config_file
        ));
    }
    Settings::from_toml_str(&toml).unwrap()
}

#[tokio::test]
async fn test_bootstrap_submits_each_connector_exactly_once() {
    let temp_dir = TempDir::new().unwrap();
    let installs_body = r#"{"connector.class":"S3SinkConnector","topics":"appsflyer.installs"}"#;
    let events_body = r#"{"connector.class":"S3SinkConnector","topics":"appsflyer.in_app_events"}"#;
    let installs_file = write_connector_config(&temp_dir, "installs-sink", installs_body);
    let events_file = write_connector_config(&temp_dir, "events-sink", events_body);

    let server = MockServer::start();
    let ready_mock = server.mock(|when, then| {
        when.method(GET).path("/connectors");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("[]");
    });
    // The file body must arrive verbatim
    let installs_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/connectors/installs-sink/config")
            .header("Content-Type", "application/json")
            .body(installs_body);
        then.status(201)
            .header("Content-Type", "application/json")
            .body(r#"{"name":"installs-sink","config":{},"tasks":[]}"#);
    });
    let events_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/connectors/events-sink/config")
            .body(events_body);
        then.status(201)
            .header("Content-Type", "application/json")
            .body(r#"{"name":"events-sink","config":{},"tasks":[]}"#);
    });

    let settings = bootstrap_settings(
        &server.base_url(),
        &[
            ("installs-sink", &installs_file),
            ("events-sink", &events_file),
        ],
    );

    let mut bootstrapper = Bootstrapper::new(settings, ResourceMonitor::new(false));
    let report = bootstrapper.run().await.unwrap();

    assert_eq!(report.ready_after_attempts, 1);
    assert_eq!(report.applied, vec!["installs-sink", "events-sink"]);
    assert!(report.worker_pid.is_none());
    assert!(!bootstrapper.has_worker());

    ready_mock.assert();
    installs_mock.assert();
    events_mock.assert();
}

#[tokio::test]
async fn test_no_config_submitted_while_endpoint_not_ready() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = write_connector_config(&temp_dir, "installs-sink", r#"{"topics":"x"}"#);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/connectors");
        then.status(500);
    });
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/connectors/installs-sink/config");
        then.status(201).body("{}");
    });

    let mut toml = format!(
        "[connect]\nbase_url = \"{}\"\npoll_interval_seconds = 1\nmax_ready_attempts = 2\n",
        server.base_url()
    );
    toml.push_str(&format!(
        "\n[[connectors]]\nname = \"installs-sink\"\nconfig_file = \"{}\"\n",
        config_file
    ));
    let settings = Settings::from_toml_str(&toml).unwrap();

    let mut bootstrapper = Bootstrapper::new(settings, ResourceMonitor::new(false));
    match bootstrapper.run().await {
        Err(OpsError::ReadinessTimeout { attempts }) => assert_eq!(attempts, 2),
        other => panic!("expected ReadinessTimeout, got {:?}", other.map(|_| ())),
    }

    put_mock.assert_hits(0);
}

// 沒有次數上限時，探測一個不會回應的端點永遠不會結束
#[tokio::test]
async fn test_unbounded_probe_never_terminates_against_dead_endpoint() {
    let client = ConnectClient::new("http://127.0.0.1:1", Duration::from_millis(100));
    let probe = ReadinessProbe::new(Duration::from_millis(10));

    let waited =
        tokio::time::timeout(Duration::from_millis(300), probe.wait_until_ready(&client)).await;

    assert!(waited.is_err());
}

#[tokio::test]
async fn test_rejected_config_stops_the_apply_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let first_file = write_connector_config(&temp_dir, "first-sink", r#"{"topics":"a"}"#);
    let second_file = write_connector_config(&temp_dir, "second-sink", r#"{"topics":"b"}"#);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/connectors");
        then.status(200).body("[]");
    });
    let first_mock = server.mock(|when, then| {
        when.method(PUT).path("/connectors/first-sink/config");
        then.status(409)
            .body(r#"{"error_code":409,"message":"rebalance in progress"}"#);
    });
    let second_mock = server.mock(|when, then| {
        when.method(PUT).path("/connectors/second-sink/config");
        then.status(201).body("{}");
    });

    let settings = bootstrap_settings(
        &server.base_url(),
        &[("first-sink", &first_file), ("second-sink", &second_file)],
    );

    let mut bootstrapper = Bootstrapper::new(settings, ResourceMonitor::new(false));
    match bootstrapper.run().await {
        Err(OpsError::UnexpectedStatus { status, body, .. }) => {
            assert_eq!(status, 409);
            assert!(body.contains("rebalance in progress"));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other.map(|_| ())),
    }

    first_mock.assert();
    second_mock.assert_hits(0);
}

#[tokio::test]
async fn test_missing_config_file_fails_before_any_request() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/connectors");
        then.status(200).body("[]");
    });
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/connectors/ghost-sink/config");
        then.status(201).body("{}");
    });

    let settings = bootstrap_settings(
        &server.base_url(),
        &[("ghost-sink", "./does-not-exist/ghost-sink.json")],
    );

    let mut bootstrapper = Bootstrapper::new(settings, ResourceMonitor::new(false));
    match bootstrapper.run().await {
        Err(OpsError::IoError(_)) => {}
        other => panic!("expected IoError, got {:?}", other.map(|_| ())),
    }

    put_mock.assert_hits(0);
}
