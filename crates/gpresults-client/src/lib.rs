// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gpresults_app::{
    FilterValue, PlotArg, ResultsBackend, ResultsOptions, RowRecord, ScenarioId, ViewKey,
    VisualizationDescription,
};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const OPTIONS_SEGMENT: &str = "scenario-results-options";
const UNSET_ARG: &str = "null";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("server.base_url {trimmed:?} is not a valid URL"))?;
        if base_url.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} cannot have path segments appended");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn options_url(&self, scenario: ScenarioId) -> Result<Url> {
        self.scenario_url(scenario, &[OPTIONS_SEGMENT])
    }

    pub fn table_url(&self, scenario: ScenarioId, key: ViewKey) -> Result<Url> {
        self.scenario_url(scenario, &[key.as_str()])
    }

    pub fn plot_url(&self, scenario: ScenarioId, key: ViewKey, args: &[PlotArg]) -> Result<Url> {
        let args: Vec<String> = args.iter().map(plot_arg_segment).collect();
        let mut segments = vec![key.as_str()];
        segments.extend(args.iter().map(String::as_str));
        self.scenario_url(scenario, &segments)
    }

    fn scenario_url(&self, scenario: ScenarioId, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        let id = scenario.to_string();
        url.path_segments_mut()
            .map_err(|()| anyhow!("server.base_url cannot have path segments appended"))?
            .pop_if_empty()
            .extend(["scenarios", id.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(url = %url, what, "requesting");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        response.json().with_context(|| format!("decode {what}"))
    }
}

impl ResultsBackend for Client {
    fn results_options(&self, scenario: ScenarioId) -> Result<ResultsOptions> {
        self.get_json(self.options_url(scenario)?, "result options")
    }

    fn fetch_table(&self, scenario: ScenarioId, key: ViewKey) -> Result<Vec<RowRecord>> {
        let response: TableResponse = self.get_json(self.table_url(scenario, key)?, key.as_str())?;
        Ok(response.into_rows())
    }

    fn fetch_plot(
        &self,
        scenario: ScenarioId,
        key: ViewKey,
        args: &[PlotArg],
    ) -> Result<VisualizationDescription> {
        let response: PlotResponse =
            self.get_json(self.plot_url(scenario, key, args)?, key.as_str())?;
        response.into_description()
    }
}

fn plot_arg_segment(arg: &PlotArg) -> String {
    match arg {
        None => UNSET_ARG.to_owned(),
        Some(FilterValue::Number(value)) => value.to_string(),
        Some(FilterValue::Text(value)) => value.clone(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableResponse {
    Rows(Vec<RowRecord>),
    Envelope(TableEnvelope),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableEnvelope {
    #[serde(default)]
    rows_data: Vec<RowRecord>,
}

impl TableResponse {
    fn into_rows(self) -> Vec<RowRecord> {
        match self {
            Self::Rows(rows) => rows,
            Self::Envelope(envelope) => envelope.rows_data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlotResponse {
    #[serde(rename = "plotJSON", default)]
    plot_json: Value,
}

impl PlotResponse {
    fn into_description(self) -> Result<VisualizationDescription> {
        match self.plot_json {
            Value::String(raw) if raw.trim().is_empty() => Ok(VisualizationDescription::default()),
            Value::String(raw) => serde_json::from_str(&raw)
                .map(VisualizationDescription::new)
                .context("decode embedded plotJSON string"),
            value => Ok(VisualizationDescription::new(value)),
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("{base_url} did not answer in time -- raise [server] timeout ({error})");
    }
    anyhow!("cannot reach {base_url} -- start the results server or fix [server] base_url ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<Value>(body)
        && let Some(message) = server_message(&parsed)
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

fn server_message(body: &Value) -> Option<&str> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| {
            body.get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })?;
    (!message.is_empty()).then_some(message)
}
