// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use time::OffsetDateTime;

use crate::binder::render_target_name;
use crate::{
    FetchEvent, FetchOutcome, FetchRequest, FetchSpec, FetchTicket, Generation, ParameterForm,
    PlotResult, RenderTarget, ScenarioId, TableResult, ViewDescriptor, ViewError, ViewKey,
    ViewPayload, ViewStatus,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSlot {
    generation: Generation,
    status: ViewStatus,
    payload: Option<ViewPayload>,
    pending_target: Option<RenderTarget>,
    completed_at: Option<OffsetDateTime>,
}

impl ViewSlot {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn payload(&self) -> Option<&ViewPayload> {
        self.payload.as_ref()
    }

    pub fn completed_at(&self) -> Option<OffsetDateTime> {
        self.completed_at
    }

    fn settled_status(&self) -> ViewStatus {
        match &self.payload {
            Some(payload) if payload.is_empty() => ViewStatus::Empty,
            Some(_) => ViewStatus::Ready,
            None => ViewStatus::NotRequested,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTable {
    pub key: ViewKey,
    pub generation: Generation,
    pub table: TableResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Table { key: ViewKey, rows: usize },
    Plot { key: ViewKey, target: RenderTarget },
    Empty { key: ViewKey },
    Failed { key: ViewKey, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discarded {
    StaleGeneration { current: Generation },
    Inactive,
}

#[derive(Debug, Clone, Default)]
pub struct FetchCoordinator {
    slots: BTreeMap<ViewKey, ViewSlot>,
    fetched_tables: Vec<FetchedTable>,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(
        &mut self,
        descriptor: &ViewDescriptor,
        scenario: ScenarioId,
        form: Option<&ParameterForm>,
    ) -> Result<FetchRequest, ViewError> {
        let key = descriptor.key;
        let plot = match descriptor.fetch {
            FetchSpec::Table => None,
            FetchSpec::Plot(spec) => {
                let form = form
                    .filter(|form| form.key() == key)
                    .ok_or_else(|| ViewError::NotAPlotView {
                        key: key.as_str().to_owned(),
                    })?;
                let target = render_target_name(&spec, &form.current_values());
                Some((target, form.fetch_args()))
            }
        };

        let slot = self.slots.entry(key).or_default();
        slot.generation = slot.generation.next();
        slot.status = ViewStatus::Pending;
        let ticket = FetchTicket {
            key,
            generation: slot.generation,
        };

        Ok(match plot {
            None => {
                slot.pending_target = None;
                FetchRequest::Table { ticket, scenario }
            }
            Some((target, args)) => {
                slot.pending_target = Some(target);
                FetchRequest::Plot {
                    ticket,
                    scenario,
                    args,
                }
            }
        })
    }

    pub fn abandon(&mut self, key: ViewKey) -> Option<FetchTicket> {
        let slot = self.slots.get_mut(&key)?;
        if slot.status != ViewStatus::Pending {
            return None;
        }
        let abandoned = FetchTicket {
            key,
            generation: slot.generation,
        };
        slot.generation = slot.generation.next();
        slot.status = slot.settled_status();
        slot.pending_target = None;
        Some(abandoned)
    }

    pub fn apply(
        &mut self,
        event: FetchEvent,
        active: Option<ViewKey>,
    ) -> Result<Applied, Discarded> {
        let key = event.ticket.key;
        let Some(slot) = self.slots.get_mut(&key) else {
            return Err(Discarded::StaleGeneration {
                current: Generation::default(),
            });
        };
        // Only the newest activation of the active view may land.
        if slot.generation != event.ticket.generation || slot.status != ViewStatus::Pending {
            return Err(Discarded::StaleGeneration {
                current: slot.generation,
            });
        }
        if active != Some(key) {
            return Err(Discarded::Inactive);
        }

        let target = slot.pending_target.take();
        match event.outcome {
            FetchOutcome::Failed(message) => {
                slot.payload = None;
                slot.completed_at = None;
                slot.status = ViewStatus::Failed(message.clone());
                Ok(Applied::Failed { key, message })
            }
            FetchOutcome::Table(rows) => {
                let table = TableResult::new(rows);
                let row_count = table.rows.len();
                let empty = table.is_empty();
                self.fetched_tables.push(FetchedTable {
                    key,
                    generation: event.ticket.generation,
                    table: table.clone(),
                });
                slot.payload = Some(ViewPayload::Table(table));
                slot.completed_at = Some(OffsetDateTime::now_utc());
                if empty {
                    slot.status = ViewStatus::Empty;
                    Ok(Applied::Empty { key })
                } else {
                    slot.status = ViewStatus::Ready;
                    Ok(Applied::Table {
                        key,
                        rows: row_count,
                    })
                }
            }
            FetchOutcome::Plot(description) => {
                let Some(target) = target else {
                    let message = "plot completion arrived for a table activation".to_owned();
                    slot.status = ViewStatus::Failed(message.clone());
                    return Ok(Applied::Failed { key, message });
                };
                let empty = description.is_empty();
                slot.payload = Some(ViewPayload::Plot(PlotResult {
                    target: target.clone(),
                    description,
                }));
                slot.completed_at = Some(OffsetDateTime::now_utc());
                if empty {
                    slot.status = ViewStatus::Empty;
                    Ok(Applied::Empty { key })
                } else {
                    slot.status = ViewStatus::Ready;
                    Ok(Applied::Plot { key, target })
                }
            }
        }
    }

    pub fn mark_failed(&mut self, key: ViewKey, message: impl Into<String>) {
        let slot = self.slots.entry(key).or_default();
        slot.pending_target = None;
        slot.payload = None;
        slot.completed_at = None;
        slot.status = ViewStatus::Failed(message.into());
    }

    pub fn slot(&self, key: ViewKey) -> Option<&ViewSlot> {
        self.slots.get(&key)
    }

    pub fn status(&self, key: ViewKey) -> ViewStatus {
        self.slots
            .get(&key)
            .map(|slot| slot.status.clone())
            .unwrap_or_default()
    }

    pub fn table(&self, key: ViewKey) -> Option<&TableResult> {
        match self.slots.get(&key)?.payload.as_ref()? {
            ViewPayload::Table(table) => Some(table),
            ViewPayload::Plot(_) => None,
        }
    }

    pub fn plot(&self, key: ViewKey) -> Option<&PlotResult> {
        match self.slots.get(&key)?.payload.as_ref()? {
            ViewPayload::Plot(plot) => Some(plot),
            ViewPayload::Table(_) => None,
        }
    }

    pub fn fetched_tables(&self) -> &[FetchedTable] {
        &self.fetched_tables
    }
}
