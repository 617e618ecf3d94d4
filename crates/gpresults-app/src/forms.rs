// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{
    FilterName, FilterValue, PlotArg, PlotSpec, ResultsOptions, ViewCatalog, ViewError, ViewKey,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterForm {
    key: ViewKey,
    spec: PlotSpec,
    values: BTreeMap<FilterName, FilterValue>,
}

impl ParameterForm {
    pub fn new(key: ViewKey, spec: PlotSpec) -> Self {
        Self {
            key,
            spec,
            values: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> ViewKey {
        self.key
    }

    pub fn spec(&self) -> &PlotSpec {
        &self.spec
    }

    pub fn value(&self, filter: FilterName) -> Option<&FilterValue> {
        self.values.get(&filter)
    }

    pub fn set(&mut self, filter: FilterName, value: Option<FilterValue>) -> Result<(), ViewError> {
        if !self.spec.has_filter(filter) {
            return Err(ViewError::UnknownFilter {
                key: self.key.as_str().to_owned(),
                filter: filter.as_str().to_owned(),
            });
        }
        match value {
            Some(value) => self.values.insert(filter, value),
            None => self.values.remove(&filter),
        };
        Ok(())
    }

    pub fn current_values(&self) -> Vec<(FilterName, Option<FilterValue>)> {
        self.spec
            .filters
            .iter()
            .map(|filter| (*filter, self.values.get(filter).cloned()))
            .collect()
    }

    pub fn fetch_args(&self) -> Vec<PlotArg> {
        self.current_values()
            .into_iter()
            .map(|(filter, value)| match (filter, value) {
                (FilterName::YAxisMax, None) => Some(FilterValue::default_sentinel()),
                (_, value) => value,
            })
            .collect()
    }
}

impl FilterValue {
    pub fn parse_for(filter: FilterName, raw: &str) -> Result<Option<Self>, ViewError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match filter {
            FilterName::YAxisMax => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| Some(Self::Number(value)))
                .ok_or_else(|| ViewError::InvalidFilterValue {
                    filter: filter.as_str().to_owned(),
                    value: trimmed.to_owned(),
                }),
            _ => Ok(Some(Self::text(trimmed))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: FilterName,
    pub label: &'static str,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFormSpec {
    pub key: ViewKey,
    pub caption: &'static str,
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterForms {
    forms: BTreeMap<ViewKey, ParameterForm>,
    options: Option<ResultsOptions>,
}

impl ParameterForms {
    pub fn for_catalog(catalog: &ViewCatalog) -> Self {
        let forms = catalog
            .plot_views()
            .map(|(view, spec)| (view.key, ParameterForm::new(view.key, *spec)))
            .collect();
        Self {
            forms,
            options: None,
        }
    }

    pub fn populate_options(&mut self, options: ResultsOptions) -> bool {
        if self.options.is_some() {
            return false;
        }
        self.options = Some(options);
        true
    }

    pub fn options(&self) -> Option<&ResultsOptions> {
        self.options.as_ref()
    }

    pub fn clear_values(&mut self) {
        for form in self.forms.values_mut() {
            form.values.clear();
        }
    }

    pub fn form(&self, key: ViewKey) -> Result<&ParameterForm, ViewError> {
        self.forms.get(&key).ok_or_else(|| ViewError::NotAPlotView {
            key: key.as_str().to_owned(),
        })
    }

    pub fn set_filter(
        &mut self,
        key: ViewKey,
        filter: FilterName,
        value: Option<FilterValue>,
    ) -> Result<(), ViewError> {
        self.forms
            .get_mut(&key)
            .ok_or_else(|| ViewError::NotAPlotView {
                key: key.as_str().to_owned(),
            })?
            .set(filter, value)
    }

    pub fn specs(&self, catalog: &ViewCatalog) -> Vec<ParameterFormSpec> {
        let Some(options) = &self.options else {
            return Vec::new();
        };
        catalog
            .plot_views()
            .map(|(view, spec)| ParameterFormSpec {
                key: view.key,
                caption: view.caption,
                filters: spec
                    .filters
                    .iter()
                    .map(|filter| FilterSpec {
                        name: *filter,
                        label: filter.label(),
                        options: options.options_for(*filter).to_vec(),
                    })
                    .collect(),
            })
            .collect()
    }
}
