// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::debug;

use crate::{FilterName, FilterValue, PlotSpec, RenderTarget, VisualizationDescription};

// Escaped segments never contain `~` or a bare `-`.
const UNSET_SEGMENT: &str = "~";

pub trait Embedder {
    fn embed(&mut self, target: &RenderTarget, description: &VisualizationDescription)
    -> Result<()>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(
        &mut self,
        target: &RenderTarget,
        description: &VisualizationDescription,
    ) -> Result<()> {
        (**self).embed(target, description)
    }
}

pub fn render_target_name(
    spec: &PlotSpec,
    values: &[(FilterName, Option<FilterValue>)],
) -> RenderTarget {
    let mut name = spec.target_prefix.to_owned();
    let mut y_axis_max = None;
    for filter in spec.filters {
        let value = values
            .iter()
            .find(|(candidate, _)| candidate == filter)
            .and_then(|(_, value)| value.as_ref());
        if *filter == FilterName::YAxisMax {
            y_axis_max = value;
            continue;
        }
        name.push('-');
        match value {
            Some(value) => name.push_str(&target_segment(value)),
            None => name.push_str(UNSET_SEGMENT),
        }
    }
    if let Some(value) = y_axis_max {
        name.push('-');
        name.push_str(&target_segment(value));
    }
    RenderTarget::new(name)
}

fn target_segment(value: &FilterValue) -> String {
    urlencoding::encode(&value.to_string())
        .replace('-', "%2D")
        .replace('~', "%7E")
}

#[derive(Debug)]
pub struct RenderBinder<E> {
    embedder: E,
}

impl<E: Embedder> RenderBinder<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    pub fn bind(
        &mut self,
        target: &RenderTarget,
        description: &VisualizationDescription,
    ) -> Result<()> {
        debug!(surface = target.as_str(), "embedding visualization");
        self.embedder.embed(target, description)
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }

}

#[cfg(test)]
mod tests {
    use super::{Embedder, RenderBinder, render_target_name};
    use crate::{
        FilterName, FilterValue, RenderTarget, ViewCatalog, ViewKey, VisualizationDescription,
    };
    use anyhow::Result;
    use serde_json::json;

    #[derive(Default)]
    struct Calls(Vec<(String, VisualizationDescription)>);

    impl Embedder for Calls {
        fn embed(
            &mut self,
            target: &RenderTarget,
            description: &VisualizationDescription,
        ) -> Result<()> {
            self.0.push((target.as_str().to_owned(), description.clone()));
            Ok(())
        }
    }

    fn spec(key: ViewKey) -> crate::PlotSpec {
        *ViewCatalog::standard()
            .resolve(key)
            .expect("listed")
            .plot_spec()
            .expect("plot view")
    }

    fn dispatch_values(
        zone: &str,
        horizon: &str,
        ymax: Option<f64>,
    ) -> Vec<(FilterName, Option<FilterValue>)> {
        vec![
            (FilterName::LoadZone, Some(FilterValue::text(zone))),
            (FilterName::Horizon, Some(FilterValue::text(horizon))),
            (FilterName::YAxisMax, ymax.map(FilterValue::Number)),
        ]
    }

    #[test]
    fn dispatch_target_matches_surface_naming() {
        let target = render_target_name(
            &spec(ViewKey::DispatchPlot),
            &dispatch_values("ZoneA", "2030", None),
        );
        assert_eq!(target.as_str(), "dispatchPlot-ZoneA-2030");
    }

    #[test]
    fn identical_values_give_identical_targets() {
        let spec = spec(ViewKey::DispatchPlot);
        let first = render_target_name(&spec, &dispatch_values("ZoneA", "2030", Some(900.0)));
        let second = render_target_name(&spec, &dispatch_values("ZoneA", "2030", Some(900.0)));
        assert_eq!(first, second);
    }

    #[test]
    fn changing_any_single_filter_changes_the_target() {
        let spec = spec(ViewKey::DispatchPlot);
        let base = render_target_name(&spec, &dispatch_values("ZoneA", "2030", None));
        for changed in [
            dispatch_values("ZoneB", "2030", None),
            dispatch_values("ZoneA", "2040", None),
            dispatch_values("ZoneA", "2030", Some(500.0)),
        ] {
            assert_ne!(render_target_name(&spec, &changed), base);
        }
    }

    #[test]
    fn unset_filters_have_a_stable_segment() {
        let target = render_target_name(
            &spec(ViewKey::EnergyPlot),
            &[
                (FilterName::LoadZone, Some(FilterValue::text("North"))),
                (FilterName::Stage, None),
                (FilterName::YAxisMax, None),
            ],
        );
        assert_eq!(target.as_str(), "energyPlot-North-~");
    }

    #[test]
    fn unset_and_literal_marker_values_differ() {
        let spec = spec(ViewKey::EnergyPlot);
        let unset = render_target_name(
            &spec,
            &[
                (FilterName::LoadZone, Some(FilterValue::text("North"))),
                (FilterName::Stage, None),
            ],
        );
        for literal in ["~", "unset"] {
            let set = render_target_name(
                &spec,
                &[
                    (FilterName::LoadZone, Some(FilterValue::text("North"))),
                    (FilterName::Stage, Some(FilterValue::text(literal))),
                ],
            );
            assert_ne!(set, unset);
        }
    }

    #[test]
    fn separators_inside_values_are_escaped() {
        let spec = spec(ViewKey::DispatchPlot);
        let first = render_target_name(&spec, &dispatch_values("A-B", "C", None));
        let second = render_target_name(&spec, &dispatch_values("A", "B-C", None));
        assert_ne!(first, second);
        assert_eq!(first.as_str(), "dispatchPlot-A%2DB-C");
        assert_eq!(second.as_str(), "dispatchPlot-A-B%2DC");
    }

    #[test]
    fn spaces_in_values_are_encoded() {
        let target = render_target_name(
            &spec(ViewKey::EnergyPlot),
            &[
                (FilterName::LoadZone, Some(FilterValue::text("Zone A"))),
                (FilterName::Stage, Some(FilterValue::text("1"))),
            ],
        );
        assert_eq!(target.as_str(), "energyPlot-Zone%20A-1");
    }

    #[test]
    fn binding_twice_embeds_the_same_thing_twice() -> Result<()> {
        let mut binder = RenderBinder::new(Calls::default());
        let target = RenderTarget::new("costPlot-North-1");
        let description = VisualizationDescription::new(json!({"doc": {"roots": []}}));

        binder.bind(&target, &description)?;
        binder.bind(&target, &description)?;

        let calls = &binder.embedder().0;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        Ok(())
    }
}
