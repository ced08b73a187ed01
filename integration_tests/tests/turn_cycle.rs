mod common;

use anyhow::Result;
use queue_api::{
    AuthoritativeQueue, BuildTarget, DesignId, HeadlessQueue, OwnershipSnapshot, PlanetId,
    ProductionElement,
};
use queue_core::{priority, ProductionScheduler, ShadowQueue};

fn assert_mirrors(scheduler: &ProductionScheduler, queue: &HeadlessQueue) {
    let shadow = ShadowQueue::from_entries(scheduler.entries().to_vec());
    assert!(
        shadow.is_aligned_with(&queue.snapshot()),
        "mirror and authoritative queue diverged:\n  shadow: {:?}\n  queue: {:?}",
        scheduler.entries(),
        queue.elements()
    );
}

fn assert_sorted(scheduler: &ProductionScheduler) {
    let entries = scheduler.entries();
    assert!(
        entries.windows(2).all(|pair| pair[0] <= pair[1]),
        "shadow queue not ascending: {entries:?}"
    );
}

#[test]
fn campaign_turns_classify_completion_loss_and_conquest() {
    common::init_tracing();
    let mut queue = HeadlessQueue::new();
    let mut scheduler = ProductionScheduler::new();
    let mut ownership = OwnershipSnapshot::unchanged([PlanetId(1), PlanetId(7)]);

    // Turn 1: the empire queues up its build plan.
    scheduler
        .enqueue_item(
            &mut queue,
            BuildTarget::building("SHIPYARD"),
            PlanetId(1),
            priority::BUILDING_BASE,
        )
        .expect("enqueue shipyard");
    scheduler
        .enqueue_item(
            &mut queue,
            BuildTarget::ship(DesignId(42)),
            PlanetId(7),
            priority::SHIP_MIL,
        )
        .expect("enqueue warship");
    scheduler
        .enqueue_item(
            &mut queue,
            BuildTarget::building("LAB"),
            PlanetId(1),
            priority::BUILDING_HIGH,
        )
        .expect("enqueue lab");
    scheduler
        .enqueue_item(
            &mut queue,
            BuildTarget::ship(DesignId(11)),
            PlanetId(1),
            priority::SHIP_SCOUT,
        )
        .expect("enqueue scout");

    let report = scheduler
        .update_for_new_turn(&mut queue, &ownership, 1)
        .expect("turn 1 update");
    assert!(report.reconcile.is_clean());
    assert_mirrors(&scheduler, &queue);
    assert_sorted(&scheduler);
    assert_eq!(scheduler.len(), 4);

    // Between the turns: the shipyard nears completion, the lab finishes and
    // the engine drops its row, planet 7 falls to an enemy (taking the
    // warship order with it), and the empire captures planet 9 together with
    // the queue its previous owner left behind.
    let shipyard_index = queue
        .elements()
        .iter()
        .position(|e| e.target == BuildTarget::building("SHIPYARD"))
        .expect("shipyard queued");
    queue.add_progress(shipyard_index, 90.0);

    let lab_index = queue
        .elements()
        .iter()
        .position(|e| e.target == BuildTarget::building("LAB"))
        .expect("lab queued");
    queue.complete(lab_index);

    let warship_index = queue
        .elements()
        .iter()
        .position(|e| e.target == BuildTarget::ship(DesignId(42)))
        .expect("warship queued");
    queue.complete(warship_index);

    queue.insert_element(
        0,
        ProductionElement::new_order(BuildTarget::building("ENEMY_FORGE"), PlanetId(9)),
    );
    ownership = ownership.advance([PlanetId(1), PlanetId(9)]);

    // Turn 2: reconcile and reschedule.
    let report = scheduler
        .update_for_new_turn(&mut queue, &ownership, 2)
        .expect("turn 2 update");

    assert_eq!(report.reconcile.finished.len(), 1);
    assert_eq!(
        report.reconcile.finished[0].target,
        BuildTarget::building("LAB")
    );
    assert_eq!(report.reconcile.lost.len(), 1);
    assert_eq!(
        report.reconcile.lost[0].target,
        BuildTarget::ship(DesignId(42))
    );
    assert_eq!(report.reconcile.conquered.len(), 1);
    let conquered = &report.reconcile.conquered[0];
    assert_eq!(conquered.target, BuildTarget::building("ENEMY_FORGE"));
    assert!(conquered.is_sentinel());
    assert!(report.reconcile.unclassified.is_empty());
    assert!(report.reconcile.is_clean());

    assert_mirrors(&scheduler, &queue);
    assert_sorted(&scheduler);
    assert_eq!(scheduler.len(), 3);

    // The nearly finished shipyard now outranks everything owned.
    let front = &scheduler.entries()[0];
    assert_eq!(front.target, BuildTarget::building("SHIPYARD"));
    assert_eq!(front.current_priority, 10.0);
    // The conquered order waits at the tail for a keep-or-cancel decision.
    assert!(scheduler.entries()[2].is_sentinel());

    // Same-turn repeat is a no-op.
    assert!(scheduler
        .update_for_new_turn(&mut queue, &ownership, 2)
        .is_none());
    assert_mirrors(&scheduler, &queue);
}

#[test]
fn lost_planet_entry_is_dropped_without_reorders() {
    // A warship ordered at planet 7 sits at the front of the queue; planet 7
    // is gone next turn.
    common::init_tracing();
    let mut queue = HeadlessQueue::new();
    let mut scheduler = ProductionScheduler::new();

    scheduler
        .enqueue_item(
            &mut queue,
            BuildTarget::ship(DesignId(42)),
            PlanetId(7),
            5.0,
        )
        .expect("enqueue warship");
    scheduler
        .enqueue_item(&mut queue, BuildTarget::building("A"), PlanetId(1), 10.0)
        .expect("enqueue building");
    assert_eq!(
        scheduler.entries()[0].target,
        BuildTarget::ship(DesignId(42))
    );

    queue.complete(0); // engine drops the row on the lost planet
    let ownership = OwnershipSnapshot::new([PlanetId(1), PlanetId(7)], [PlanetId(1)]);
    let report = scheduler
        .update_for_new_turn(&mut queue, &ownership, 2)
        .expect("update");

    assert_eq!(report.reconcile.lost.len(), 1);
    assert_eq!(
        report.reconcile.lost[0].target,
        BuildTarget::ship(DesignId(42))
    );
    assert_eq!(report.reorders, 0);
    assert_eq!(scheduler.len(), 1);
    assert_mirrors(&scheduler, &queue);
}

#[test]
fn out_of_band_mutation_is_surfaced_and_recovered() -> Result<()> {
    common::init_tracing();
    let mut queue = HeadlessQueue::new();
    let mut scheduler = ProductionScheduler::new();
    scheduler
        .enqueue_item(&mut queue, BuildTarget::building("A"), PlanetId(1), 10.0)
        .expect("enqueue");
    let ownership = OwnershipSnapshot::unchanged([PlanetId(1), PlanetId(2)]);
    scheduler
        .update_for_new_turn(&mut queue, &ownership, 1)
        .expect("turn 1 update");

    // Someone bypasses the scheduler and talks to the engine directly.
    assert!(queue.create_building_order("ROGUE", PlanetId(2)));

    let report = scheduler
        .update_for_new_turn(&mut queue, &ownership, 2)
        .expect("turn 2 update");
    let mismatch = report
        .reconcile
        .mismatch
        .as_ref()
        .expect("mismatch surfaced");
    assert_eq!(mismatch.position, 1);
    assert_eq!(mismatch.element.target, BuildTarget::building("ROGUE"));

    // The diagnostic serializes with both queue contents attached.
    let rendered = serde_json::to_value(mismatch)?;
    assert_eq!(rendered["position"], 1);
    assert_eq!(rendered["shadow"].as_array().map(Vec::len), Some(1));
    assert_eq!(rendered["snapshot"].as_array().map(Vec::len), Some(2));

    // The rogue row is tracked, not dropped: the invariant holds and the
    // entry waits under a sentinel priority.
    assert_eq!(report.reconcile.unclassified.len(), 1);
    assert!(report.reconcile.unclassified[0].is_sentinel());
    assert_eq!(scheduler.len(), 2);
    assert_mirrors(&scheduler, &queue);

    // Next turn the mirror has caught up and the pass is clean again.
    let report = scheduler
        .update_for_new_turn(&mut queue, &ownership, 3)
        .expect("turn 3 update");
    assert!(report.reconcile.is_clean());
    assert_mirrors(&scheduler, &queue);
    Ok(())
}
