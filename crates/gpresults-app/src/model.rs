// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    Table,
    Plot,
}

impl ViewKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Plot => "plot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViewKey {
    ProjectCapacity,
    ProjectRetirements,
    ProjectNewBuild,
    ProjectDispatch,
    ProjectCarbon,
    TransmissionCapacity,
    TransmissionFlows,
    ImportsExports,
    SystemLoadBalance,
    SystemRps,
    SystemCarbonCap,
    SystemPrm,
    DispatchPlot,
    CapacityNewPlot,
    CapacityRetiredPlot,
    CapacityTotalPlot,
    EnergyPlot,
    CostPlot,
    CapacityFactorPlot,
}

impl ViewKey {
    pub const ALL: [Self; 19] = [
        Self::ProjectCapacity,
        Self::ProjectRetirements,
        Self::ProjectNewBuild,
        Self::ProjectDispatch,
        Self::ProjectCarbon,
        Self::TransmissionCapacity,
        Self::TransmissionFlows,
        Self::ImportsExports,
        Self::SystemLoadBalance,
        Self::SystemRps,
        Self::SystemCarbonCap,
        Self::SystemPrm,
        Self::DispatchPlot,
        Self::CapacityNewPlot,
        Self::CapacityRetiredPlot,
        Self::CapacityTotalPlot,
        Self::EnergyPlot,
        Self::CostPlot,
        Self::CapacityFactorPlot,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCapacity => "results-project-capacity",
            Self::ProjectRetirements => "results-project-retirements",
            Self::ProjectNewBuild => "results-project-new-build",
            Self::ProjectDispatch => "results-project-dispatch",
            Self::ProjectCarbon => "results-project-carbon",
            Self::TransmissionCapacity => "results-transmission-capacity",
            Self::TransmissionFlows => "results-transmission-flows",
            Self::ImportsExports => "results-imports-exports",
            Self::SystemLoadBalance => "results-system-load-balance",
            Self::SystemRps => "results-system-rps",
            Self::SystemCarbonCap => "results-system-carbon-cap",
            Self::SystemPrm => "results-system-prm",
            Self::DispatchPlot => "results-dispatch-plot",
            Self::CapacityNewPlot => "results-capacity-new-plot",
            Self::CapacityRetiredPlot => "results-capacity-retired-plot",
            Self::CapacityTotalPlot => "results-capacity-total-plot",
            Self::EnergyPlot => "results-energy-plot",
            Self::CostPlot => "results-cost-plot",
            Self::CapacityFactorPlot => "results-capacity-factor-plot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    pub const fn kind(self) -> ViewKind {
        match self {
            Self::DispatchPlot
            | Self::CapacityNewPlot
            | Self::CapacityRetiredPlot
            | Self::CapacityTotalPlot
            | Self::EnergyPlot
            | Self::CostPlot
            | Self::CapacityFactorPlot => ViewKind::Plot,
            _ => ViewKind::Table,
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterName {
    LoadZone,
    Horizon,
    Stage,
    YAxisMax,
}

impl FilterName {
    pub const ALL: [Self; 4] = [Self::LoadZone, Self::Horizon, Self::Stage, Self::YAxisMax];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadZone => "load_zone",
            Self::Horizon => "horizon",
            Self::Stage => "stage",
            Self::YAxisMax => "ymax",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LoadZone => "Load Zone",
            Self::Horizon => "Horizon",
            Self::Stage => "Stage",
            Self::YAxisMax => "Y-Axis Max",
        }
    }
}

// Sent in place of an unset y-axis maximum only.
pub const DEFAULT_SENTINEL: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn default_sentinel() -> Self {
        Self::Text(DEFAULT_SENTINEL.to_owned())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

pub type PlotArg = Option<FilterValue>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsOptions {
    #[serde(default)]
    pub load_zone_options: Vec<String>,
    #[serde(default)]
    pub horizon_options: Vec<String>,
    #[serde(default)]
    pub stage_options: Vec<String>,
}

impl ResultsOptions {
    pub fn options_for(&self, filter: FilterName) -> &[String] {
        match filter {
            FilterName::LoadZone => &self.load_zone_options,
            FilterName::Horizon => &self.horizon_options,
            FilterName::Stage => &self.stage_options,
            FilterName::YAxisMax => &[],
        }
    }
}

pub type RowRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableResult {
    pub rows: Vec<RowRecord>,
}

impl TableResult {
    pub fn new(rows: Vec<RowRecord>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for name in row.keys() {
                if !columns.iter().any(|seen| seen == name) {
                    columns.push(name.clone());
                }
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualizationDescription(pub serde_json::Value);

impl VisualizationDescription {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RenderTarget(String);

impl RenderTarget {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotResult {
    pub target: RenderTarget,
    pub description: VisualizationDescription,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPayload {
    Table(TableResult),
    Plot(PlotResult),
}

impl ViewPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Table(table) => table.is_empty(),
            Self::Plot(plot) => plot.description.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    NotRequested,
    Pending,
    Ready,
    Empty,
    Failed(String),
}
