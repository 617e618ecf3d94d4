// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use gpresults_app::{
    FilterName, FilterValue, PageEvent, ResultsBackend, ResultsOptions, ResultsPage, ScenarioId,
    ThreadedBackend, ViewKey, ViewStatus,
};
use gpresults_testkit::{RecordingEmbedder, StubBackend};
use std::time::Duration;

fn scenario_options() -> ResultsOptions {
    ResultsOptions {
        load_zone_options: vec!["ZoneA".to_owned(), "ZoneB".to_owned()],
        horizon_options: vec!["2030".to_owned(), "2040".to_owned()],
        stage_options: vec!["1".to_owned()],
    }
}

fn page_for(backend: StubBackend) -> ResultsPage<StubBackend, RecordingEmbedder> {
    ResultsPage::enter(ScenarioId::new(42), backend, RecordingEmbedder::new())
}

#[test]
fn capacity_table_then_dispatch_plot() -> Result<()> {
    let mut page = page_for(StubBackend::new(7).with_options(scenario_options()));

    page.select_view(ViewKey::ProjectCapacity)?;
    page.process_events();
    assert_eq!(
        page.backend().table_calls(),
        vec![(ScenarioId::new(42), ViewKey::ProjectCapacity)]
    );
    assert!(page.is_table_shown());
    assert_eq!(page.status(ViewKey::ProjectCapacity), ViewStatus::Ready);

    let expected = StubBackend::new(7).fetch_table(ScenarioId::new(42), ViewKey::ProjectCapacity)?;
    assert!(!expected.is_empty());
    let table = page
        .table_result(ViewKey::ProjectCapacity)
        .expect("capacity table stored");
    assert_eq!(table.rows, expected);
    assert_eq!(page.all_fetched_tables()[0].table.rows, expected);

    page.set_filter(
        ViewKey::DispatchPlot,
        FilterName::LoadZone,
        Some(FilterValue::text("ZoneA")),
    )?;
    page.set_filter(
        ViewKey::DispatchPlot,
        FilterName::Horizon,
        Some(FilterValue::text("2030")),
    )?;
    assert!(page.backend().plot_calls().is_empty());

    page.select_view(ViewKey::DispatchPlot)?;
    let events = page.process_events();
    assert!(matches!(
        &events[0],
        PageEvent::PlotBound { key: ViewKey::DispatchPlot, target } if target.as_str() == "dispatchPlot-ZoneA-2030"
    ));
    assert_eq!(
        page.backend().plot_calls(),
        vec![(
            ScenarioId::new(42),
            ViewKey::DispatchPlot,
            vec![
                Some(FilterValue::text("ZoneA")),
                Some(FilterValue::text("2030")),
                Some(FilterValue::text("default")),
            ],
        )]
    );
    assert_eq!(page.embedder().targets(), vec!["dispatchPlot-ZoneA-2030"]);
    assert_eq!(page.backend().table_calls().len(), 1);
    assert_eq!(page.all_fetched_tables().len(), 1);
    assert!(!page.is_table_shown());
    Ok(())
}

#[test]
fn forms_list_scenario_options() {
    let page = page_for(StubBackend::new(7).with_options(scenario_options()));
    let forms = page.list_parameter_forms();
    let dispatch = forms
        .iter()
        .find(|form| form.key == ViewKey::DispatchPlot)
        .expect("dispatch form");
    assert_eq!(dispatch.filters[0].options, vec!["ZoneA", "ZoneB"]);
    assert_eq!(dispatch.filters[1].options, vec!["2030", "2040"]);
    assert_eq!(dispatch.filters[2].name, FilterName::YAxisMax);
}

#[test]
fn late_completion_of_previous_view_is_discarded() -> Result<()> {
    let mut page = page_for(StubBackend::new(3).deferred());

    page.select_view(ViewKey::ProjectCapacity)?;
    page.select_view(ViewKey::CostPlot)?;
    let tickets = page.backend().held_tickets();
    assert_eq!(tickets.len(), 2);
    assert_eq!(page.backend().cancelled(), &tickets[..1]);

    page.backend_mut().complete(tickets[1])?;
    let events = page.process_events();
    assert!(matches!(
        &events[0],
        PageEvent::PlotBound {
            key: ViewKey::CostPlot,
            ..
        }
    ));

    page.backend_mut().complete(tickets[0])?;
    let events = page.process_events();
    assert_eq!(events, vec![PageEvent::CompletionDiscarded(tickets[0])]);

    assert!(page.table_result(ViewKey::ProjectCapacity).is_none());
    assert!(page.all_fetched_tables().is_empty());
    assert_eq!(page.embedder().calls().len(), 1);
    assert_eq!(page.current_selection(), Some(ViewKey::CostPlot));
    Ok(())
}

#[test]
fn first_plot_resolving_after_second_plot_is_discarded() -> Result<()> {
    let mut page = page_for(StubBackend::new(3).deferred());

    page.select_view(ViewKey::DispatchPlot)?;
    page.select_view(ViewKey::CostPlot)?;
    let tickets = page.backend().held_tickets();
    assert_eq!(tickets.len(), 2);

    page.backend_mut().complete(tickets[1])?;
    page.process_events();
    page.backend_mut().complete(tickets[0])?;
    let events = page.process_events();

    assert_eq!(events, vec![PageEvent::CompletionDiscarded(tickets[0])]);
    assert_eq!(page.embedder().targets(), vec!["costPlot-~-~"]);
    assert!(page.plot_result(ViewKey::DispatchPlot).is_none());
    assert_eq!(page.status(ViewKey::DispatchPlot), ViewStatus::NotRequested);
    let shown = page.plot_result(ViewKey::CostPlot).expect("cost plot stored");
    assert_eq!(shown.target.as_str(), "costPlot-~-~");
    assert_eq!(page.status(ViewKey::CostPlot), ViewStatus::Ready);
    Ok(())
}

#[test]
fn embed_failure_marks_the_plot_failed() -> Result<()> {
    let mut page = ResultsPage::enter(
        ScenarioId::new(42),
        StubBackend::new(9),
        RecordingEmbedder::failing("surface missing"),
    );
    page.select_view(ViewKey::CapacityTotalPlot)?;
    let events = page.process_events();

    let message = "embedding into capacityTotalPlot-~ failed: surface missing".to_owned();
    assert_eq!(
        events,
        vec![PageEvent::EmbedFailed {
            key: ViewKey::CapacityTotalPlot,
            message: message.clone(),
        }]
    );
    assert_eq!(
        page.status(ViewKey::CapacityTotalPlot),
        ViewStatus::Failed(message)
    );
    assert!(page.embedder().calls().is_empty());
    Ok(())
}

#[test]
fn early_completion_of_previous_view_is_discarded_too() -> Result<()> {
    let mut page = page_for(StubBackend::new(3).deferred());

    page.select_view(ViewKey::EnergyPlot)?;
    page.select_view(ViewKey::SystemLoadBalance)?;
    page.backend_mut().complete_all()?;
    page.process_events();

    assert!(page.embedder().calls().is_empty());
    assert!(page.plot_result(ViewKey::EnergyPlot).is_none());
    assert_eq!(page.status(ViewKey::SystemLoadBalance), ViewStatus::Ready);
    Ok(())
}

#[test]
fn refetch_of_same_view_supersedes_older_request() -> Result<()> {
    let mut page = page_for(StubBackend::new(11).deferred());

    page.select_view(ViewKey::DispatchPlot)?;
    page.set_filter(
        ViewKey::DispatchPlot,
        FilterName::LoadZone,
        Some(FilterValue::text("ZoneB")),
    )?;
    let tickets = page.backend().held_tickets();
    assert_eq!(tickets.len(), 2);
    assert!(tickets[1].generation > tickets[0].generation);

    page.backend_mut().complete(tickets[1])?;
    page.backend_mut().complete(tickets[0])?;
    let events = page.process_events();

    assert_eq!(events.len(), 2);
    assert_eq!(events[1], PageEvent::CompletionDiscarded(tickets[0]));
    assert_eq!(page.embedder().targets(), vec!["dispatchPlot-ZoneB-~"]);
    Ok(())
}

#[test]
fn failure_is_distinct_from_empty() -> Result<()> {
    let mut page = page_for(
        StubBackend::new(1)
            .failing(ViewKey::SystemRps, "server error (500)")
            .empty(ViewKey::CapacityNewPlot),
    );

    page.select_view(ViewKey::SystemRps)?;
    assert_eq!(
        page.process_events(),
        vec![PageEvent::FetchFailed {
            key: ViewKey::SystemRps,
            message: "server error (500)".to_owned(),
        }]
    );
    assert_eq!(
        page.status(ViewKey::SystemRps),
        ViewStatus::Failed("server error (500)".to_owned())
    );

    page.select_view(ViewKey::CapacityNewPlot)?;
    assert_eq!(
        page.process_events(),
        vec![PageEvent::ResultEmpty(ViewKey::CapacityNewPlot)]
    );
    assert_eq!(page.status(ViewKey::CapacityNewPlot), ViewStatus::Empty);
    assert!(page.embedder().calls().is_empty());
    Ok(())
}

#[test]
fn options_failure_is_recorded_and_forms_stay_empty() -> Result<()> {
    let mut page = page_for(StubBackend::new(1).failing_options("scenario has no results"));
    assert_eq!(page.options_error(), Some("scenario has no results"));
    assert!(page.list_parameter_forms().is_empty());

    page.select_view(ViewKey::CostPlot)?;
    page.process_events();
    assert_eq!(page.status(ViewKey::CostPlot), ViewStatus::Ready);
    Ok(())
}

#[test]
fn leaving_drops_in_flight_work() -> Result<()> {
    let mut page = page_for(StubBackend::new(5).deferred());
    page.select_view(ViewKey::TransmissionFlows)?;
    let ticket = page.backend().held_tickets()[0];

    let events = page.leave();
    assert_eq!(events, vec![PageEvent::SelectionCleared]);
    assert_eq!(page.backend().cancelled(), &[ticket]);

    page.backend_mut().complete(ticket)?;
    assert_eq!(
        page.process_events(),
        vec![PageEvent::CompletionDiscarded(ticket)]
    );
    assert_eq!(
        page.status(ViewKey::TransmissionFlows),
        ViewStatus::NotRequested
    );
    Ok(())
}

#[test]
fn threaded_backend_completes_in_the_background() -> Result<()> {
    let mut page = ResultsPage::enter(
        ScenarioId::new(42),
        ThreadedBackend::new(StubBackend::new(2)),
        RecordingEmbedder::new(),
    );
    page.select_view(ViewKey::ImportsExports)?;

    let mut events = Vec::new();
    for _ in 0..50 {
        events.extend(page.wait_for_completion(Duration::from_millis(100)));
        if !events.is_empty() {
            break;
        }
    }
    assert!(matches!(
        events[0],
        PageEvent::TableReady {
            key: ViewKey::ImportsExports,
            ..
        }
    ));
    assert_eq!(
        page.backend().inner().table_calls(),
        vec![(ScenarioId::new(42), ViewKey::ImportsExports)]
    );
    Ok(())
}
