mod common;

use anyhow::Result;
use console_core::screens::{DroneScreen, IntegrityBand, SlotView};
use console_core::{ConsoleIntent, ConsoleMode, ConsoleSession, ConsoleView, TravelTarget};

#[test]
fn exploring_fixture_builds_exploration_console() -> Result<()> {
    let snapshot = common::load_snapshot("exploring_at_crater")?;
    let mut session = ConsoleSession::new("console-a", common::default_config());
    assert_eq!(session.apply_snapshot(snapshot), ConsoleMode::ExplorationIdle);

    let ConsoleView::Drone(console) = session.view() else {
        panic!("expected drone console");
    };
    assert_eq!(console.integrity.band, IntegrityBand::Average);
    assert_eq!(console.log.len(), 2);
    assert_eq!(console.log[1].label, "Entry 2");
    assert!(matches!(
        &console.equipment.slots[0],
        SlotView::Tool { removable: false, icon: Some(icon), .. } if icon == "screwdriver"
    ));
    let DroneScreen::Exploration(Some(site)) = &console.screen else {
        panic!("expected exploration screen");
    };
    assert_eq!(site.site_name, "Crater");
    assert_eq!(site.events[0].label, "Buried beacon");
    Ok(())
}

#[test]
fn travel_preview_lists_home_and_other_sites() -> Result<()> {
    let snapshot = common::load_snapshot("exploring_at_crater")?;
    let mut session = ConsoleSession::new("console-a", common::default_config());
    session.apply_snapshot(snapshot);
    session.dispatch(ConsoleIntent::OpenTravelPreview)?;

    let ConsoleView::Drone(console) = session.view() else {
        panic!("expected drone console");
    };
    let DroneScreen::PlanningTravel(planning) = &console.screen else {
        panic!("expected travel planning screen");
    };
    assert!(planning.cancellable);
    assert!(planning.launch.enabled);
    assert_eq!(planning.launch.label, "Launch!");

    let targets: Vec<_> = planning.destinations.iter().map(|entry| &entry.target).collect();
    assert_eq!(
        targets,
        vec![&TravelTarget::Home, &TravelTarget::Site("site-ridge".into())]
    );
    // Crater (10) to ridge (20) at coefficient 2.
    assert_eq!(planning.destinations[1].cost, 20.0);
    let bands: Vec<_> = planning.destinations[1]
        .bands
        .iter()
        .map(|band| band.label.as_str())
        .collect();
    assert_eq!(bands, vec!["Gravity"]);
    Ok(())
}

#[test]
fn signal_lost_fixture_only_offers_acknowledgement() -> Result<()> {
    let snapshot = common::load_snapshot("signal_lost")?;
    let mut session = ConsoleSession::new("console-a", common::default_config());
    session.apply_snapshot(snapshot);
    assert_eq!(session.view(), ConsoleView::SignalLost);
    assert_eq!(
        session.available_commands(),
        vec![console_core::ConsoleCommand::ConfirmSignalLost]
    );
    Ok(())
}
