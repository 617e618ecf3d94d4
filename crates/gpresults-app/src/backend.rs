// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::{
    Generation, PlotArg, ResultsOptions, RowRecord, ScenarioId, ViewKey, VisualizationDescription,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub key: ViewKey,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Table {
        ticket: FetchTicket,
        scenario: ScenarioId,
    },
    Plot {
        ticket: FetchTicket,
        scenario: ScenarioId,
        args: Vec<PlotArg>,
    },
}

impl FetchRequest {
    pub const fn ticket(&self) -> FetchTicket {
        match self {
            Self::Table { ticket, .. } | Self::Plot { ticket, .. } => *ticket,
        }
    }

    pub const fn scenario(&self) -> ScenarioId {
        match self {
            Self::Table { scenario, .. } | Self::Plot { scenario, .. } => *scenario,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Table(Vec<RowRecord>),
    Plot(VisualizationDescription),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchEvent {
    pub ticket: FetchTicket,
    pub outcome: FetchOutcome,
}

pub trait ResultsBackend {
    fn results_options(&self, scenario: ScenarioId) -> Result<ResultsOptions>;

    fn fetch_table(&self, scenario: ScenarioId, key: ViewKey) -> Result<Vec<RowRecord>>;

    fn fetch_plot(
        &self,
        scenario: ScenarioId,
        key: ViewKey,
        args: &[PlotArg],
    ) -> Result<VisualizationDescription>;

    fn spawn_fetch(&mut self, request: FetchRequest, tx: Sender<FetchEvent>) -> Result<()> {
        let event = execute_fetch(&*self, &request);
        tx.send(event)
            .map_err(|_| anyhow!("results page closed before fetch completed"))
    }

    fn cancel_fetch(&mut self, _ticket: FetchTicket) -> Result<()> {
        Ok(())
    }
}

pub fn execute_fetch<B: ResultsBackend + ?Sized>(backend: &B, request: &FetchRequest) -> FetchEvent {
    let outcome = match request {
        FetchRequest::Table { ticket, scenario } => {
            match backend.fetch_table(*scenario, ticket.key) {
                Ok(rows) => FetchOutcome::Table(rows),
                Err(error) => FetchOutcome::Failed(format!("{error:#}")),
            }
        }
        FetchRequest::Plot {
            ticket,
            scenario,
            args,
        } => match backend.fetch_plot(*scenario, ticket.key, args) {
            Ok(description) => FetchOutcome::Plot(description),
            Err(error) => FetchOutcome::Failed(format!("{error:#}")),
        },
    };
    FetchEvent {
        ticket: request.ticket(),
        outcome,
    }
}

#[derive(Debug)]
pub struct ThreadedBackend<B> {
    inner: Arc<B>,
}

impl<B> ThreadedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B> ResultsBackend for ThreadedBackend<B>
where
    B: ResultsBackend + Send + Sync + 'static,
{
    fn results_options(&self, scenario: ScenarioId) -> Result<ResultsOptions> {
        self.inner.results_options(scenario)
    }

    fn fetch_table(&self, scenario: ScenarioId, key: ViewKey) -> Result<Vec<RowRecord>> {
        self.inner.fetch_table(scenario, key)
    }

    fn fetch_plot(
        &self,
        scenario: ScenarioId,
        key: ViewKey,
        args: &[PlotArg],
    ) -> Result<VisualizationDescription> {
        self.inner.fetch_plot(scenario, key, args)
    }

    fn spawn_fetch(&mut self, request: FetchRequest, tx: Sender<FetchEvent>) -> Result<()> {
        let backend = Arc::clone(&self.inner);
        let ticket = request.ticket();
        thread::Builder::new()
            .name(format!("fetch-{}", ticket.key))
            .spawn(move || {
                let event = execute_fetch(backend.as_ref(), &request);
                // The page may be gone by now; its receiver owns the outcome.
                let _ = tx.send(event);
            })
            .with_context(|| format!("spawn fetch thread for {}", ticket.key))?;
        Ok(())
    }
}
