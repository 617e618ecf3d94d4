// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FilterName, ViewError, ViewKey, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSpec {
    pub target_prefix: &'static str,
    pub filters: &'static [FilterName],
}

impl PlotSpec {
    pub fn has_filter(&self, filter: FilterName) -> bool {
        self.filters.contains(&filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSpec {
    Table,
    Plot(PlotSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub key: ViewKey,
    pub caption: &'static str,
    pub fetch: FetchSpec,
}

impl ViewDescriptor {
    pub const fn kind(&self) -> ViewKind {
        match self.fetch {
            FetchSpec::Table => ViewKind::Table,
            FetchSpec::Plot(_) => ViewKind::Plot,
        }
    }

    pub const fn plot_spec(&self) -> Option<&PlotSpec> {
        match &self.fetch {
            FetchSpec::Table => None,
            FetchSpec::Plot(spec) => Some(spec),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultButton {
    pub key: ViewKey,
    pub caption: &'static str,
}

const DISPATCH_FILTERS: &[FilterName] = &[
    FilterName::LoadZone,
    FilterName::Horizon,
    FilterName::YAxisMax,
];
const CAPACITY_FILTERS: &[FilterName] = &[FilterName::LoadZone, FilterName::YAxisMax];
const STAGED_FILTERS: &[FilterName] = &[
    FilterName::LoadZone,
    FilterName::Stage,
    FilterName::YAxisMax,
];

const fn table(key: ViewKey, caption: &'static str) -> ViewDescriptor {
    ViewDescriptor {
        key,
        caption,
        fetch: FetchSpec::Table,
    }
}

const fn plot(
    key: ViewKey,
    caption: &'static str,
    target_prefix: &'static str,
    filters: &'static [FilterName],
) -> ViewDescriptor {
    ViewDescriptor {
        key,
        caption,
        fetch: FetchSpec::Plot(PlotSpec {
            target_prefix,
            filters,
        }),
    }
}

pub const STANDARD_VIEWS: [ViewDescriptor; 19] = [
    table(ViewKey::ProjectCapacity, "Project Capacity"),
    table(ViewKey::ProjectRetirements, "Project Retirements"),
    table(ViewKey::ProjectNewBuild, "Project New Build"),
    table(ViewKey::ProjectDispatch, "Project Dispatch"),
    table(ViewKey::ProjectCarbon, "Project Carbon Emissions"),
    table(ViewKey::TransmissionCapacity, "Transmission Capacity"),
    table(ViewKey::TransmissionFlows, "Transmission Flows"),
    table(ViewKey::ImportsExports, "Imports/Exports"),
    table(ViewKey::SystemLoadBalance, "System Load Balance"),
    table(ViewKey::SystemRps, "System RPS"),
    table(ViewKey::SystemCarbonCap, "System Carbon Cap"),
    table(ViewKey::SystemPrm, "System PRM"),
    plot(
        ViewKey::DispatchPlot,
        "Dispatch Plot",
        "dispatchPlot",
        DISPATCH_FILTERS,
    ),
    plot(
        ViewKey::CapacityNewPlot,
        "New Capacity Plot",
        "capacityNewPlot",
        CAPACITY_FILTERS,
    ),
    plot(
        ViewKey::CapacityRetiredPlot,
        "Retired Capacity Plot",
        "capacityRetiredPlot",
        CAPACITY_FILTERS,
    ),
    plot(
        ViewKey::CapacityTotalPlot,
        "Total Capacity Plot",
        "capacityTotalPlot",
        CAPACITY_FILTERS,
    ),
    plot(ViewKey::EnergyPlot, "Energy Plot", "energyPlot", STAGED_FILTERS),
    plot(ViewKey::CostPlot, "Cost Plot", "costPlot", STAGED_FILTERS),
    plot(
        ViewKey::CapacityFactorPlot,
        "Capacity Factor Plot",
        "capacityFactorPlot",
        STAGED_FILTERS,
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCatalog {
    views: Vec<ViewDescriptor>,
}

impl Default for ViewCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ViewCatalog {
    pub fn standard() -> Self {
        Self {
            views: STANDARD_VIEWS.to_vec(),
        }
    }

    pub fn from_descriptors(views: Vec<ViewDescriptor>) -> Self {
        Self { views }
    }

    pub fn list_views(&self) -> &[ViewDescriptor] {
        &self.views
    }

    pub fn resolve(&self, key: ViewKey) -> Result<&ViewDescriptor, ViewError> {
        self.views
            .iter()
            .find(|view| view.key == key)
            .ok_or_else(|| ViewError::UnknownViewKind {
                key: key.as_str().to_owned(),
            })
    }

    pub fn resolve_slug(&self, raw: &str) -> Result<&ViewDescriptor, ViewError> {
        let key = ViewKey::parse(raw.trim()).ok_or_else(|| ViewError::UnknownViewKind {
            key: raw.to_owned(),
        })?;
        self.resolve(key)
    }

    pub fn result_buttons(&self) -> Vec<ResultButton> {
        self.views
            .iter()
            .map(|view| ResultButton {
                key: view.key,
                caption: view.caption,
            })
            .collect()
    }

    pub fn plot_views(&self) -> impl Iterator<Item = (&ViewDescriptor, &PlotSpec)> {
        self.views
            .iter()
            .filter_map(|view| view.plot_spec().map(|spec| (view, spec)))
    }
}
