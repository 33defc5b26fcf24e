mod common;

use anyhow::Result;
use console_core::ConsoleView;
use scenario_replay::run_scenario;

#[test]
fn expedition_scenario_meets_expectations() -> Result<()> {
    let scenario = common::load_scenario("expedition")?;
    let report = run_scenario(&scenario, common::default_config())?;
    assert!(report.passed(), "failures: {:#?}", report.failures);
    assert_eq!(
        report.commands(),
        vec![
            "select_drone drone-1",
            "start_travel site-ridge",
            "start_travel",
            "explore_event event-arch",
            "skip_event",
            "confirm_signal_lost",
        ]
    );
    assert_eq!(report.view, Some(ConsoleView::SignalLost));
    Ok(())
}

#[test]
fn equipment_scenario_meets_expectations() -> Result<()> {
    let scenario = common::load_scenario("equipment")?;
    let report = run_scenario(&scenario, common::default_config())?;
    assert!(report.passed(), "failures: {:#?}", report.failures);
    assert_eq!(
        report.commands(),
        vec![
            "add_tool scanner",
            "remove_tool drill",
            "jettison cargo-7",
            "self_destruct",
            "end_control",
        ]
    );
    Ok(())
}
