//! Integration tests for the instance controller.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use dungeon_core::config::PoolConfig;
use dungeon_core::error::ErrorKind;
use dungeon_core::events::InstanceEvent;
use dungeon_core::types::{InstanceId, Party, PartyNumber};
use dungeon_display::RecordingDisplay;
use dungeon_pool::{InstanceController, PoolError, Roster, ShutdownMode};

fn pool(
    max_instances: usize,
    min_secs: u64,
    max_secs: u64,
) -> (InstanceController, Arc<RecordingDisplay>) {
    pool_with(PoolConfig::new(max_instances, min_secs, max_secs))
}

fn pool_with(config: PoolConfig) -> (InstanceController, Arc<RecordingDisplay>) {
    let display = Arc::new(RecordingDisplay::new());
    let controller =
        InstanceController::new(config, display.clone()).expect("valid pool configuration");
    (controller, display)
}

fn party() -> Party {
    Roster::new(1, 1, 3).form_parties().parties.remove(0)
}

#[tokio::test(start_paused = true)]
async fn test_initialization_registers_every_instance() {
    let (controller, display) = pool(4, 1, 2);

    let registered = display.registered();
    assert_eq!(
        registered.keys().copied().collect::<Vec<_>>(),
        (1..=4).map(InstanceId::new).collect::<Vec<_>>()
    );
    for name in registered.values() {
        assert!(name.starts_with(|c: char| c.is_ascii_uppercase()));
        assert!((2..=6).contains(&name.len()));
    }

    assert!(controller.all_instances_free());
    let snapshot = controller.snapshot();
    assert!(snapshot.is_consistent());
    assert!(snapshot.is_idle());
    assert_eq!(controller.max_instances(), 4);
}

#[tokio::test]
async fn test_invalid_configuration_fails_fast() {
    for config in [
        PoolConfig::new(0, 1, 1),
        PoolConfig::new(2, 3, 2),
        PoolConfig::new(2, 0, 2),
    ] {
        let display = Arc::new(RecordingDisplay::new());
        let err = InstanceController::new(config, display.clone()).unwrap_err();
        match err {
            PoolError::Internal(inner) => assert_eq!(inner.kind, ErrorKind::Configuration),
            other => panic!("unexpected error: {other}"),
        }
        assert!(display.events().is_empty(), "nothing registered on failure");
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_slot_pool_hands_freed_instance_to_third_party() {
    let (controller, display) = pool(2, 1, 1);

    let a = controller.launch_dungeon(party()).await.expect("launch A");
    let b = controller.launch_dungeon(party()).await.expect("launch B");
    assert_eq!(a.party_number, PartyNumber::new(1));
    assert_eq!(b.party_number, PartyNumber::new(2));
    assert_ne!(a.instance_id, b.instance_id);
    assert!(controller.snapshot().free_ids.is_empty());
    assert!(!controller.all_instances_free());

    let started = tokio::time::Instant::now();
    let c_task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.launch_dungeon(party()).await }
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!c_task.is_finished(), "third launch must wait for a slot");

    let c = c_task.await.expect("join").expect("launch C");
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(c.party_number, PartyNumber::new(3));
    let first_freed = display
        .payloads()
        .into_iter()
        .find_map(|event| match event {
            InstanceEvent::ActiveChanged {
                instance_id,
                active: false,
            } => Some(instance_id),
            _ => None,
        })
        .expect("an instance was released before C launched");
    assert_eq!(c.instance_id, first_freed);

    controller.shutdown(ShutdownMode::Drain).await;

    let completions = display.completions();
    assert_eq!(completions.len(), 3);
    assert!(completions.contains(&format!(
        "Party 1 finished in {} (ID: {}) in 1 sec.",
        a.instance_name, a.instance_id
    )));
    assert!(controller.all_instances_free());
}

#[tokio::test(start_paused = true)]
async fn test_full_pool_blocks_until_release() {
    let (controller, _display) = pool(3, 2, 4);

    for _ in 0..3 {
        controller.launch_dungeon(party()).await.expect("launch");
    }

    let blocked =
        tokio::time::timeout(Duration::from_millis(1500), controller.launch_dungeon(party())).await;
    assert!(blocked.is_err(), "fourth launch should still be waiting");

    // The cancelled launch claimed nothing.
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.available_slots, 0);
    assert_eq!(snapshot.occupancy.len(), 3);
    assert!(snapshot.is_consistent());

    let receipt = controller.launch_dungeon(party()).await.expect("launch after release");
    assert_eq!(receipt.party_number, PartyNumber::new(4));

    controller.shutdown(ShutdownMode::Drain).await;
    assert!(controller.snapshot().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_party_numbers_are_unique_and_contiguous() {
    let (controller, display) = pool(3, 1, 3);

    let receipts = join_all((0..12).map(|_| controller.launch_dungeon(party()))).await;
    let mut numbers: Vec<u64> = receipts
        .into_iter()
        .map(|r| r.expect("launch").party_number.get())
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=12).collect::<Vec<_>>());

    controller.shutdown(ShutdownMode::Drain).await;

    assert!(display.peak_active() <= 3);
    assert_eq!(display.completions().len(), 12);

    let summaries = controller.instance_summaries();
    let served: u32 = summaries.iter().map(|s| s.parties_served).sum();
    assert_eq!(served, 12);
    for summary in summaries {
        let runs = u64::from(summary.parties_served);
        assert!(summary.total_secs >= runs && summary.total_secs <= runs * 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_bound_under_contention() {
    let (controller, display) = pool_with(PoolConfig::new(4, 1, 3).with_time_unit_ms(2));

    let launches: Vec<_> = (0..40)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.launch_dungeon(party()).await })
        })
        .collect();

    for _ in 0..50 {
        let snapshot = controller.snapshot();
        assert!(snapshot.is_consistent());
        assert!(snapshot.occupancy.len() <= 4);
        tokio::task::yield_now().await;
    }

    let mut numbers = Vec::new();
    for launch in launches {
        let receipt = launch.await.expect("join").expect("launch");
        numbers.push(receipt.party_number.get());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=40).collect::<Vec<_>>());

    controller.shutdown(ShutdownMode::Drain).await;

    assert!(display.peak_active() <= 4);
    assert_eq!(display.active_count(), 0);
    assert_eq!(display.completions().len(), 40);
    assert!(controller.snapshot().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_abandon_shutdown_reclaims_instances() {
    let (controller, display) = pool(2, 100, 100);

    controller.launch_dungeon(party()).await.expect("launch");
    controller.launch_dungeon(party()).await.expect("launch");
    assert_eq!(controller.in_flight(), 2);

    controller.shutdown(ShutdownMode::Abandon).await;

    assert!(controller.all_instances_free());
    assert!(controller.snapshot().is_idle());
    assert_eq!(display.active_count(), 0);
    assert!(display.completions().is_empty());
    assert!(
        controller
            .instance_summaries()
            .iter()
            .all(|s| s.parties_served == 0)
    );

    let err = controller.launch_dungeon(party()).await.unwrap_err();
    assert!(matches!(err, PoolError::Closed));
}

#[test]
fn test_dropping_runtime_reclaims_occupied_instances() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let (controller, display) = runtime.block_on(async {
        let (controller, display) = pool(2, 100, 100);
        controller.launch_dungeon(party()).await.expect("launch");
        controller.launch_dungeon(party()).await.expect("launch");
        (controller, display)
    });
    assert!(!controller.all_instances_free());
    assert_eq!(display.active_count(), 2);

    // Watchers are dropped with the runtime; their leases release.
    drop(runtime);

    assert!(controller.all_instances_free());
    let snapshot = controller.snapshot();
    assert!(snapshot.is_consistent());
    assert!(snapshot.is_idle());
    assert_eq!(display.active_count(), 0);
    assert!(display.completions().is_empty());
    assert_eq!(controller.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_counts_launches_waiting_for_capacity() {
    let (controller, _display) = pool(1, 5, 5);
    controller.launch_dungeon(party()).await.expect("launch");
    assert_eq!(controller.in_flight(), 1);

    let waiting = tokio::spawn({
        let controller = controller.clone();
        async move { controller.launch_dungeon(party()).await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.in_flight(), 2);

    waiting.abort();
    let _ = waiting.await;
    assert_eq!(controller.in_flight(), 1);

    controller.shutdown(ShutdownMode::Drain).await;
    assert_eq!(controller.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abandon_during_launch_burst_leaves_pool_idle() {
    for _ in 0..20 {
        let (controller, display) = pool_with(PoolConfig::new(3, 50, 50).with_time_unit_ms(2));

        let launches: Vec<_> = (0..12)
            .map(|_| {
                let controller = controller.clone();
                tokio::spawn(async move { controller.launch_dungeon(party()).await })
            })
            .collect();
        tokio::task::yield_now().await;

        controller.shutdown(ShutdownMode::Abandon).await;

        // Everything past the gate is reclaimed before shutdown returns.
        let snapshot = controller.snapshot();
        assert!(snapshot.is_consistent());
        assert!(snapshot.is_idle());
        assert_eq!(display.active_count(), 0);
        assert!(display.peak_active() <= 3);

        for launch in launches {
            match launch.await.expect("join") {
                Ok(_) | Err(PoolError::Closed) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_waiting_launch_fails_when_pool_closes() {
    let (controller, display) = pool(1, 5, 5);
    controller.launch_dungeon(party()).await.expect("launch");

    let waiting = tokio::spawn({
        let controller = controller.clone();
        async move { controller.launch_dungeon(party()).await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;

    controller.shutdown(ShutdownMode::Drain).await;

    let result = waiting.await.expect("join");
    assert!(matches!(result, Err(PoolError::Closed)));
    assert_eq!(display.completions().len(), 1);
    assert!(controller.all_instances_free());
}

#[tokio::test(start_paused = true)]
async fn test_notifications_follow_lifecycle_order() {
    let (controller, display) = pool(1, 2, 2);
    let receipt = controller.launch_dungeon(party()).await.expect("launch");
    controller.shutdown(ShutdownMode::Drain).await;

    let id = receipt.instance_id;
    assert_eq!(
        display.payloads(),
        vec![
            InstanceEvent::Registered {
                instance_id: id,
                name: receipt.instance_name.clone(),
            },
            InstanceEvent::PartyAssigned {
                instance_id: id,
                party_label: "Party 1".to_string(),
            },
            InstanceEvent::ActiveChanged {
                instance_id: id,
                active: true,
            },
            InstanceEvent::ActiveChanged {
                instance_id: id,
                active: false,
            },
            InstanceEvent::PartyCleared { instance_id: id },
            InstanceEvent::Completed {
                message: format!(
                    "Party 1 finished in {} (ID: 1) in 2 sec.",
                    receipt.instance_name
                ),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sequential_runs_accumulate_statistics() {
    let (controller, _display) = pool(1, 2, 2);

    for expected in 1..=3u64 {
        let receipt = controller.launch_dungeon(party()).await.expect("launch");
        assert_eq!(receipt.party_number, PartyNumber::new(expected));
        assert_eq!(receipt.instance_id, InstanceId::new(1));
    }
    controller.shutdown(ShutdownMode::Drain).await;

    let summary = &controller.instance_summaries()[0];
    assert_eq!(summary.parties_served, 3);
    assert_eq!(summary.total_secs, 6);
    assert!(!summary.active);
}
