// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use gpresults_app::{
    Embedder, FetchEvent, FetchRequest, FetchTicket, FilterValue, PlotArg, RenderTarget,
    ResultsBackend, ResultsOptions, RowRecord, ScenarioId, ViewKey, VisualizationDescription,
    execute_fetch,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

const LOAD_ZONES: [&str; 6] = ["ZoneA", "ZoneB", "North", "South", "Coastal", "Mountain"];
const TECHNOLOGIES: [&str; 8] = [
    "Wind", "Solar", "Gas_CCGT", "Gas_CT", "Nuclear", "Hydro", "Battery", "Coal",
];
const PERIODS: [i64; 6] = [2025, 2030, 2035, 2040, 2045, 2050];
const TX_LINES: [&str; 5] = [
    "ZoneA_ZoneB",
    "North_South",
    "Coastal_ZoneA",
    "Mountain_North",
    "South_Coastal",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct ResultsFaker {
    rng: DeterministicRng,
}

impl ResultsFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn options(&mut self) -> ResultsOptions {
        let zones = 2 + self.int_n(LOAD_ZONES.len() - 1);
        let horizons = 1 + self.int_n(PERIODS.len());
        ResultsOptions {
            load_zone_options: LOAD_ZONES[..zones].iter().map(|z| (*z).to_owned()).collect(),
            horizon_options: PERIODS[..horizons]
                .iter()
                .map(|period| period.to_string())
                .collect(),
            stage_options: (1..=1 + self.int_n(3)).map(|stage| stage.to_string()).collect(),
        }
    }

    pub fn table_rows(&mut self, key: ViewKey) -> Vec<RowRecord> {
        let count = 3 + self.int_n(6);
        (0..count).map(|_| self.table_row(key)).collect()
    }

    pub fn plot_description(&mut self, key: ViewKey, args: &[PlotArg]) -> VisualizationDescription {
        let args: Vec<Value> = args
            .iter()
            .map(|arg| match arg {
                None => Value::Null,
                Some(FilterValue::Number(value)) => json!(value),
                Some(FilterValue::Text(value)) => json!(value),
            })
            .collect();
        VisualizationDescription::new(json!({
            "target_id": null,
            "root_id": format!("{:016x}", self.rng.next_u64()),
            "doc": {
                "roots": {
                    "references": [{
                        "type": "Plot",
                        "id": format!("{:08x}", self.rng.next_u64() as u32),
                        "attributes": { "title": key.as_str(), "args": args },
                    }],
                },
                "version": "1.4.0",
            },
        }))
    }

    fn table_row(&mut self, key: ViewKey) -> RowRecord {
        let zone = self.pick(&LOAD_ZONES);
        let period = PERIODS[self.int_n(PERIODS.len())];
        let value = self.int_n(5_000) as f64 / 10.0;
        let row = match key {
            ViewKey::ProjectCapacity
            | ViewKey::ProjectRetirements
            | ViewKey::ProjectNewBuild
            | ViewKey::ProjectDispatch
            | ViewKey::ProjectCarbon => {
                let technology = self.pick(&TECHNOLOGIES);
                let mut row = json!({
                    "project": format!("{technology}_{}", 1 + self.int_n(9)),
                    "technology": technology,
                    "load_zone": zone,
                    "period": period,
                });
                row[project_metric(key)] = json!(value);
                row
            }
            ViewKey::TransmissionCapacity | ViewKey::TransmissionFlows => json!({
                "transmission_line": self.pick(&TX_LINES),
                "period": period,
                "mw": value,
            }),
            _ => json!({
                "load_zone": zone,
                "period": period,
                "value": value,
            }),
        };
        row.as_object().cloned().unwrap_or_default()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

fn project_metric(key: ViewKey) -> &'static str {
    match key {
        ViewKey::ProjectRetirements => "retired_mw",
        ViewKey::ProjectNewBuild => "new_build_mw",
        ViewKey::ProjectDispatch => "energy_mwh",
        ViewKey::ProjectCarbon => "carbon_tons",
        _ => "capacity_mw",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Options {
        scenario: ScenarioId,
    },
    Table {
        scenario: ScenarioId,
        key: ViewKey,
    },
    Plot {
        scenario: ScenarioId,
        key: ViewKey,
        args: Vec<PlotArg>,
    },
}

#[derive(Debug)]
pub struct StubBackend {
    seed: u64,
    options: std::result::Result<ResultsOptions, String>,
    failures: BTreeMap<ViewKey, String>,
    empties: BTreeSet<ViewKey>,
    deferred: bool,
    held: Vec<(FetchRequest, Sender<FetchEvent>)>,
    cancelled: Vec<FetchTicket>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubBackend {
    pub fn new(seed: u64) -> Self {
        let options = ResultsFaker::new(seed).options();
        Self {
            seed,
            options: Ok(options),
            failures: BTreeMap::new(),
            empties: BTreeSet::new(),
            deferred: false,
            held: Vec::new(),
            cancelled: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_options(mut self, options: ResultsOptions) -> Self {
        self.options = Ok(options);
        self
    }

    pub fn failing_options(mut self, message: impl Into<String>) -> Self {
        self.options = Err(message.into());
        self
    }

    pub fn failing(mut self, key: ViewKey, message: impl Into<String>) -> Self {
        self.failures.insert(key, message.into());
        self
    }

    pub fn empty(mut self, key: ViewKey) -> Self {
        self.empties.insert(key);
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn table_calls(&self) -> Vec<(ScenarioId, ViewKey)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Table { scenario, key } => Some((scenario, key)),
                _ => None,
            })
            .collect()
    }

    pub fn plot_calls(&self) -> Vec<(ScenarioId, ViewKey, Vec<PlotArg>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Plot {
                    scenario,
                    key,
                    args,
                } => Some((scenario, key, args)),
                _ => None,
            })
            .collect()
    }

    pub fn held_tickets(&self) -> Vec<FetchTicket> {
        self.held.iter().map(|(request, _)| request.ticket()).collect()
    }

    pub fn cancelled(&self) -> &[FetchTicket] {
        &self.cancelled
    }

    pub fn complete(&mut self, ticket: FetchTicket) -> Result<()> {
        let index = self
            .held
            .iter()
            .position(|(request, _)| request.ticket() == ticket)
            .ok_or_else(|| anyhow!("no held fetch for {} generation {}", ticket.key, ticket.generation))?;
        let (request, tx) = self.held.remove(index);
        let event = execute_fetch(&*self, &request);
        tx.send(event)
            .map_err(|_| anyhow!("results page dropped before completion"))
    }

    pub fn complete_all(&mut self) -> Result<usize> {
        let tickets = self.held_tickets();
        for ticket in &tickets {
            self.complete(*ticket)?;
        }
        Ok(tickets.len())
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn faker_for(&self, scenario: ScenarioId, key: ViewKey, args: &[PlotArg]) -> ResultsFaker {
        let mut salt = (scenario.get() as u64).wrapping_mul(31);
        salt = salt.wrapping_add(key as u64).wrapping_mul(31);
        for arg in args {
            for byte in arg.as_ref().map(ToString::to_string).unwrap_or_default().bytes() {
                salt = salt.wrapping_mul(31).wrapping_add(u64::from(byte));
            }
            salt = salt.wrapping_mul(31);
        }
        ResultsFaker::new(self.seed ^ salt)
    }
}

impl ResultsBackend for StubBackend {
    fn results_options(&self, scenario: ScenarioId) -> Result<ResultsOptions> {
        self.record(RecordedCall::Options { scenario });
        match &self.options {
            Ok(options) => Ok(options.clone()),
            Err(message) => bail!("{message}"),
        }
    }

    fn fetch_table(&self, scenario: ScenarioId, key: ViewKey) -> Result<Vec<RowRecord>> {
        self.record(RecordedCall::Table { scenario, key });
        if let Some(message) = self.failures.get(&key) {
            bail!("{message}");
        }
        if self.empties.contains(&key) {
            return Ok(Vec::new());
        }
        Ok(self.faker_for(scenario, key, &[]).table_rows(key))
    }

    fn fetch_plot(
        &self,
        scenario: ScenarioId,
        key: ViewKey,
        args: &[PlotArg],
    ) -> Result<VisualizationDescription> {
        self.record(RecordedCall::Plot {
            scenario,
            key,
            args: args.to_vec(),
        });
        if let Some(message) = self.failures.get(&key) {
            bail!("{message}");
        }
        if self.empties.contains(&key) {
            return Ok(VisualizationDescription::default());
        }
        Ok(self
            .faker_for(scenario, key, args)
            .plot_description(key, args))
    }

    fn spawn_fetch(&mut self, request: FetchRequest, tx: Sender<FetchEvent>) -> Result<()> {
        if self.deferred {
            self.held.push((request, tx));
            return Ok(());
        }
        let event = execute_fetch(&*self, &request);
        tx.send(event)
            .map_err(|_| anyhow!("results page dropped before completion"))
    }

    fn cancel_fetch(&mut self, ticket: FetchTicket) -> Result<()> {
        self.cancelled.push(ticket);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingEmbedder {
    embedded: Vec<(RenderTarget, VisualizationDescription)>,
    fail_with: Option<String>,
}

impl RecordingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            embedded: Vec::new(),
            fail_with: Some(message.into()),
        }
    }

    pub fn calls(&self) -> &[(RenderTarget, VisualizationDescription)] {
        &self.embedded
    }

    pub fn targets(&self) -> Vec<&str> {
        self.embedded
            .iter()
            .map(|(target, _)| target.as_str())
            .collect()
    }
}

impl Embedder for RecordingEmbedder {
    fn embed(
        &mut self,
        target: &RenderTarget,
        description: &VisualizationDescription,
    ) -> Result<()> {
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        self.embedded.push((target.clone(), description.clone()));
        Ok(())
    }
}
