// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use gpresults_app::{FilterValue, ResultsBackend, ScenarioId, ViewKey};
use gpresults_client::Client;
use serde_json::json;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_response(status: u16, body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn serve(replies: Vec<(&'static str, u16, &'static str)>) -> Result<(String, thread::JoinHandle<()>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());
    let handle = thread::spawn(move || {
        for (path, status, body) in replies {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), path);
            request
                .respond(json_response(status, body))
                .expect("response should succeed");
        }
    });
    Ok((addr, handle))
}

#[test]
fn unreachable_server_names_the_base_url() {
    let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50))
        .expect("client should initialize");
    let error = client
        .results_options(ScenarioId::new(1))
        .expect_err("nothing listens on port 1");
    let message = format!("{error:#}");
    assert!(message.contains("http://127.0.0.1:1/api"), "{message}");
}

#[test]
fn options_and_tables_work_against_mock_server() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            "/api/scenarios/42/scenario-results-options",
            200,
            r#"{"loadZoneOptions":["ZoneA","ZoneB"],"horizonOptions":["2030"],"stageOptions":[]}"#,
        ),
        (
            "/api/scenarios/42/results-project-capacity",
            200,
            r#"[{"project":"Wind_1","capacity_mw":150.0},{"project":"Gas_2","capacity_mw":80.5}]"#,
        ),
        (
            "/api/scenarios/42/results-system-rps",
            200,
            r#"{"caption":"System RPS","columns":["period","rps_mwh"],"rowsData":[{"period":2030,"rps_mwh":10.0}]}"#,
        ),
    ])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let options = client.results_options(ScenarioId::new(42))?;
    assert_eq!(options.load_zone_options, vec!["ZoneA", "ZoneB"]);
    assert!(options.stage_options.is_empty());

    let rows = client.fetch_table(ScenarioId::new(42), ViewKey::ProjectCapacity)?;
    assert_eq!(rows.len(), 2);
    let columns: Vec<&String> = rows[0].keys().collect();
    assert_eq!(columns, vec!["project", "capacity_mw"]);

    let rows = client.fetch_table(ScenarioId::new(42), ViewKey::SystemRps)?;
    assert_eq!(rows[0]["rps_mwh"], json!(10.0));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn plot_fetch_sends_positional_args() -> Result<()> {
    let (addr, handle) = serve(vec![(
        "/api/scenarios/42/results-dispatch-plot/ZoneA/2030/default",
        200,
        r#"{"plotJSON":{"target_id":null,"root_id":"1002","doc":{"roots":{"references":[]}}}}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let description = client.fetch_plot(
        ScenarioId::new(42),
        ViewKey::DispatchPlot,
        &[
            Some(FilterValue::text("ZoneA")),
            Some(FilterValue::text("2030")),
            Some(FilterValue::default_sentinel()),
        ],
    )?;
    assert_eq!(description.as_value()["root_id"], json!("1002"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_errors_carry_status_and_message() -> Result<()> {
    let (addr, handle) = serve(vec![(
        "/api/scenarios/9/results-cost-plot/null/null/default",
        500,
        r#"{"message":"no cost results for scenario 9"}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client
        .fetch_plot(
            ScenarioId::new(9),
            ViewKey::CostPlot,
            &[None, None, Some(FilterValue::default_sentinel())],
        )
        .expect_err("500 should fail");
    assert_eq!(
        error.to_string(),
        "server error (500): no cost results for scenario 9"
    );

    handle.join().expect("server thread should join");
    Ok(())
}
