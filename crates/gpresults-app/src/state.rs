// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::coordinator::{Applied, FetchCoordinator, FetchedTable, ViewSlot};
use crate::{
    Embedder, FetchEvent, FetchTicket, FilterName, FilterValue, ParameterFormSpec,
    ParameterForms, PlotResult, RenderBinder, RenderTarget, ResultButton, ResultsBackend,
    ScenarioId, SelectionChannel, SubscriptionId, TableResult, ViewCatalog, ViewDescriptor,
    ViewError, ViewKey, ViewKind, ViewResult, ViewStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    SelectView(ViewKey),
    SetFilter {
        key: ViewKey,
        filter: FilterName,
        value: Option<FilterValue>,
    },
    Refresh,
    ProcessEvents,
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    SelectionChanged(ViewKey),
    FilterChanged { key: ViewKey, filter: FilterName },
    FetchIssued(FetchTicket),
    TableReady { key: ViewKey, rows: usize },
    PlotBound { key: ViewKey, target: RenderTarget },
    ResultEmpty(ViewKey),
    FetchFailed { key: ViewKey, message: String },
    EmbedFailed { key: ViewKey, message: String },
    CompletionDiscarded(FetchTicket),
    SelectionCleared,
}

pub struct ResultsPage<B, E> {
    scenario: ScenarioId,
    catalog: ViewCatalog,
    selection: SelectionChannel,
    forms: ParameterForms,
    coordinator: FetchCoordinator,
    binder: RenderBinder<E>,
    backend: B,
    options_error: Option<String>,
    tx: Sender<FetchEvent>,
    rx: Receiver<FetchEvent>,
}

impl<B: ResultsBackend, E: Embedder> ResultsPage<B, E> {
    pub fn enter(scenario: ScenarioId, backend: B, embedder: E) -> Self {
        Self::with_catalog(scenario, ViewCatalog::standard(), backend, embedder)
    }

    pub fn with_catalog(
        scenario: ScenarioId,
        catalog: ViewCatalog,
        backend: B,
        embedder: E,
    ) -> Self {
        let forms = ParameterForms::for_catalog(&catalog);
        let (tx, rx) = mpsc::channel();
        let mut page = Self {
            scenario,
            catalog,
            selection: SelectionChannel::new(),
            forms,
            coordinator: FetchCoordinator::new(),
            binder: RenderBinder::new(embedder),
            backend,
            options_error: None,
            tx,
            rx,
        };
        page.load_options();
        page
    }

    pub fn load_options(&mut self) -> bool {
        if self.forms.options().is_some() {
            return true;
        }
        match self.backend.results_options(self.scenario) {
            Ok(options) => {
                info!(
                    scenario = %self.scenario,
                    load_zones = options.load_zone_options.len(),
                    horizons = options.horizon_options.len(),
                    stages = options.stage_options.len(),
                    "result options loaded"
                );
                self.options_error = None;
                self.forms.populate_options(options)
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(scenario = %self.scenario, error = %message, "result options unavailable");
                self.options_error = Some(message);
                false
            }
        }
    }

    pub fn dispatch(&mut self, command: PageCommand) -> ViewResult<Vec<PageEvent>> {
        match command {
            PageCommand::SelectView(key) => self.select_view(key),
            PageCommand::SetFilter { key, filter, value } => self.set_filter(key, filter, value),
            PageCommand::Refresh => Ok(self.refresh()),
            PageCommand::ProcessEvents => Ok(self.process_events()),
            PageCommand::Leave => Ok(self.leave()),
        }
    }

    pub fn scenario(&self) -> ScenarioId {
        self.scenario
    }

    pub fn catalog(&self) -> &ViewCatalog {
        &self.catalog
    }

    pub fn options_error(&self) -> Option<&str> {
        self.options_error.as_deref()
    }

    pub fn list_result_buttons(&self) -> Vec<ResultButton> {
        self.catalog.result_buttons()
    }

    pub fn list_parameter_forms(&self) -> Vec<ParameterFormSpec> {
        self.forms.specs(&self.catalog)
    }

    pub fn current_selection(&self) -> Option<ViewKey> {
        self.selection.current()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(Option<ViewKey>) + 'static,
    {
        self.selection.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.selection.unsubscribe(id)
    }

    pub fn select_view(&mut self, key: ViewKey) -> ViewResult<Vec<PageEvent>> {
        let descriptor = *self.catalog.resolve(key)?;
        if let Some(previous) = self.selection.set_active(key) {
            self.release(previous);
        }
        info!(view = %key, scenario = %self.scenario, "view selected");
        let mut events = vec![PageEvent::SelectionChanged(key)];
        events.extend(self.activate(&descriptor));
        Ok(events)
    }

    pub fn select_view_slug(&mut self, raw: &str) -> ViewResult<Vec<PageEvent>> {
        let key = self.catalog.resolve_slug(raw)?.key;
        self.select_view(key)
    }

    pub fn set_filter(
        &mut self,
        key: ViewKey,
        filter: FilterName,
        value: Option<FilterValue>,
    ) -> ViewResult<Vec<PageEvent>> {
        self.forms.set_filter(key, filter, value)?;
        let mut events = vec![PageEvent::FilterChanged { key, filter }];
        if self.selection.current() == Some(key) {
            let descriptor = *self.catalog.resolve(key)?;
            self.release(key);
            events.extend(self.activate(&descriptor));
        }
        Ok(events)
    }

    pub fn set_filter_raw(
        &mut self,
        key: ViewKey,
        filter: FilterName,
        raw: &str,
    ) -> ViewResult<Vec<PageEvent>> {
        let value = FilterValue::parse_for(filter, raw)?;
        self.set_filter(key, filter, value)
    }

    pub fn filter_values(&self, key: ViewKey) -> ViewResult<Vec<(FilterName, Option<FilterValue>)>> {
        Ok(self.forms.form(key)?.current_values())
    }

    pub fn refresh(&mut self) -> Vec<PageEvent> {
        let Some(key) = self.selection.current() else {
            return Vec::new();
        };
        let Ok(descriptor) = self.catalog.resolve(key).copied() else {
            return Vec::new();
        };
        self.release(key);
        self.activate(&descriptor)
    }

    pub fn process_events(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(self.apply_event(event));
        }
        events
    }

    pub fn wait_for_completion(&mut self, timeout: Duration) -> Vec<PageEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                let mut events = vec![self.apply_event(event)];
                events.extend(self.process_events());
                events
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn status(&self, key: ViewKey) -> ViewStatus {
        self.coordinator.status(key)
    }

    pub fn view_slot(&self, key: ViewKey) -> Option<&ViewSlot> {
        self.coordinator.slot(key)
    }

    pub fn table_result(&self, key: ViewKey) -> Option<&TableResult> {
        self.coordinator.table(key)
    }

    pub fn plot_result(&self, key: ViewKey) -> Option<&PlotResult> {
        self.coordinator.plot(key)
    }

    pub fn all_fetched_tables(&self) -> &[FetchedTable] {
        self.coordinator.fetched_tables()
    }

    pub fn is_table_shown(&self) -> bool {
        self.selection.current().is_some_and(|key| {
            key.kind() == ViewKind::Table && self.coordinator.table(key).is_some()
        })
    }

    pub fn leave(&mut self) -> Vec<PageEvent> {
        if let Some(previous) = self.selection.reset() {
            self.release(previous);
        }
        self.forms.clear_values();
        info!(scenario = %self.scenario, "left results page");
        let mut events = vec![PageEvent::SelectionCleared];
        events.extend(self.process_events());
        events
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn embedder(&self) -> &E {
        self.binder.embedder()
    }

    pub fn embedder_mut(&mut self) -> &mut E {
        self.binder.embedder_mut()
    }

    fn activate(&mut self, descriptor: &ViewDescriptor) -> Vec<PageEvent> {
        let key = descriptor.key;
        let form = match descriptor.kind() {
            ViewKind::Plot => self.forms.form(key).ok(),
            ViewKind::Table => None,
        };
        let request = match self.coordinator.plan(descriptor, self.scenario, form) {
            Ok(request) => request,
            Err(error) => {
                let message = error.to_string();
                self.coordinator.mark_failed(key, message.clone());
                return vec![PageEvent::FetchFailed { key, message }];
            }
        };

        let ticket = request.ticket();
        debug!(
            view = %key,
            generation = %ticket.generation,
            scenario = %self.scenario,
            "issuing fetch"
        );
        if let Err(error) = self.backend.spawn_fetch(request, self.tx.clone()) {
            let message = format!("{error:#}");
            warn!(view = %key, error = %message, "fetch could not be started");
            self.coordinator.mark_failed(key, message.clone());
            return vec![
                PageEvent::FetchIssued(ticket),
                PageEvent::FetchFailed { key, message },
            ];
        }
        vec![PageEvent::FetchIssued(ticket)]
    }

    fn release(&mut self, key: ViewKey) {
        let Some(ticket) = self.coordinator.abandon(key) else {
            return;
        };
        debug!(view = %key, generation = %ticket.generation, "abandoning in-flight fetch");
        if let Err(error) = self.backend.cancel_fetch(ticket) {
            let message = format!("{error:#}");
            warn!(view = %key, error = %message, "cancel failed");
        }
    }

    fn apply_event(&mut self, event: FetchEvent) -> PageEvent {
        let ticket = event.ticket;
        match self.coordinator.apply(event, self.selection.current()) {
            Ok(Applied::Table { key, rows }) => {
                info!(view = %key, rows, "table ready");
                PageEvent::TableReady { key, rows }
            }
            Ok(Applied::Plot { key, target }) => self.bind_plot(key, target),
            Ok(Applied::Empty { key }) => {
                info!(view = %key, "no results");
                PageEvent::ResultEmpty(key)
            }
            Ok(Applied::Failed { key, message }) => {
                warn!(view = %key, error = %message, "fetch failed");
                PageEvent::FetchFailed { key, message }
            }
            Err(reason) => {
                debug!(
                    view = %ticket.key,
                    generation = %ticket.generation,
                    ?reason,
                    "discarding completion"
                );
                PageEvent::CompletionDiscarded(ticket)
            }
        }
    }

    fn bind_plot(&mut self, key: ViewKey, target: RenderTarget) -> PageEvent {
        let bound = match self.coordinator.plot(key) {
            Some(plot) => self
                .binder
                .bind(&plot.target, &plot.description)
                .map_err(|error| format!("{error:#}")),
            None => Err("plot result missing after completion".to_owned()),
        };
        match bound {
            Ok(()) => {
                info!(view = %key, surface = target.as_str(), "plot bound");
                PageEvent::PlotBound { key, target }
            }
            Err(message) => {
                let message = ViewError::Embed {
                    target: target.as_str().to_owned(),
                    message,
                }
                .to_string();
                warn!(view = %key, error = %message, "embed failed");
                self.coordinator.mark_failed(key, message.clone());
                PageEvent::EmbedFailed { key, message }
            }
        }
    }
}
