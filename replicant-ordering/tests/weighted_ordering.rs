use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use replicant_model::{ManualClock, Replica, Request, RequestParameters};
use replicant_ordering::{
    AdaptiveHealthModifier,
    GrayListModifier,
    HealthSettings,
    LeadershipModifier,
    ReplicaOrdering,
    ResponseVerdictTuningPolicy,
    WeightedReplicaOrdering,
    WeightedReplicaOrderingBuilder,
};
use replicant_storage::ReplicaStorageProvider;

const GRAY_PERIOD: Duration = Duration::from_secs(60);

fn request() -> Request {
    Request::get("/documents/1".parse().unwrap())
}

fn health_modifier(clock: &ManualClock) -> anyhow::Result<AdaptiveHealthModifier> {
    let settings = HealthSettings::default();
    let modifier = AdaptiveHealthModifier::new(ResponseVerdictTuningPolicy, settings)?
        .with_clock(clock.clone());
    Ok(modifier)
}

fn ordering(clock: &ManualClock) -> anyhow::Result<WeightedReplicaOrdering> {
    let health = health_modifier(clock)?;

    let ordering = WeightedReplicaOrderingBuilder::default()
        .with_modifier(GrayListModifier::with_period(GRAY_PERIOD).with_clock(clock.clone()))
        .with_modifier(health)
        .build()?;
    Ok(ordering)
}

fn order(
    ordering: &WeightedReplicaOrdering,
    replicas: &[Replica],
    storage: &ReplicaStorageProvider,
    seed: u64,
) -> anyhow::Result<Vec<Replica>> {
    let order = ordering.order_with_rng(
        replicas,
        storage,
        &request(),
        &RequestParameters::default(),
        StdRng::seed_from_u64(seed),
    )?;
    Ok(order.collect())
}

#[test]
fn test_orders_are_permutations() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let clock = ManualClock::new(1_000_000);
    let storage = ReplicaStorageProvider::instance();
    let ordering = ordering(&clock)?;

    for num_replicas in 0..12 {
        let replicas = test_helper::make_replicas(num_replicas);
        for (idx, replica) in replicas.iter().enumerate() {
            match idx % 3 {
                0 => ordering.learn(&test_helper::rejected(replica), &storage)?,
                1 => ordering.learn(&test_helper::accepted(replica), &storage)?,
                _ => ordering.learn(&test_helper::unknown(replica), &storage)?,
            }
        }

        for seed in 0..10 {
            let order = order(&ordering, &replicas, &storage, seed)?;
            assert_eq!(order.len(), replicas.len());
            let unique = order.iter().collect::<HashSet<_>>();
            assert_eq!(unique.len(), replicas.len());
        }
    }

    Ok(())
}

#[test]
fn test_gray_listed_replicas_return_after_period() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let clock = ManualClock::new(1_000_000);
    let storage = ReplicaStorageProvider::instance();
    let ordering = ordering(&clock)?;
    let replicas = test_helper::make_replicas(3);

    ordering.learn(&test_helper::rejected(&replicas[0]), &storage)?;
    for seed in 0..20 {
        let order = order(&ordering, &replicas, &storage, seed)?;
        assert_eq!(order.last(), Some(&replicas[0]));
    }

    clock.advance(GRAY_PERIOD);

    let mut first = HashSet::new();
    for seed in 0..200 {
        let order = order(&ordering, &replicas, &storage, seed)?;
        first.insert(order[0].clone());
    }
    assert!(first.contains(&replicas[0]), "Replica never left the gray list.");
    assert_eq!(
        GrayListModifier::default().gray_since(&replicas[0], &storage),
        None,
    );

    Ok(())
}

#[test]
fn test_unhealthy_replicas_are_drawn_first_less_often() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let clock = ManualClock::new(1_000_000);
    let storage = ReplicaStorageProvider::instance();
    let health = health_modifier(&clock)?;
    let ordering = WeightedReplicaOrderingBuilder::default()
        .with_modifier(health_modifier(&clock)?)
        .build()?;
    let replicas = test_helper::make_replicas(2);

    // Two decreases leave the replica at a quarter of full health.
    ordering.learn(&test_helper::rejected(&replicas[0]), &storage)?;
    ordering.learn(&test_helper::rejected(&replicas[0]), &storage)?;
    assert!((health.current_health(&replicas[0], &storage) - 0.25).abs() < 1e-9);

    let mut unhealthy_first = 0;
    for seed in 0..4_000 {
        let order = order(&ordering, &replicas, &storage, seed)?;
        if order[0] == replicas[0] {
            unhealthy_first += 1;
        }
    }

    // Expected share is 0.25 / 1.25.
    let share = unhealthy_first as f64 / 4_000.0;
    assert!((0.16..0.24).contains(&share), "Unhealthy replica was first {share} of the time");

    clock.advance(HealthSettings::default().decay_duration);
    assert_eq!(health.current_health(&replicas[0], &storage), 1.0);

    Ok(())
}

#[test]
fn test_leader_is_always_first() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let storage = ReplicaStorageProvider::instance();
    let ordering = WeightedReplicaOrderingBuilder::default()
        .with_modifier(LeadershipModifier::default())
        .build()?;
    let replicas = test_helper::make_replicas(5);

    ordering.learn(&test_helper::accepted(&replicas[3]), &storage)?;
    for replica in replicas.iter().filter(|r| *r != &replicas[3]) {
        ordering.learn(&test_helper::rejected(replica), &storage)?;
    }

    for seed in 0..50 {
        let order = order(&ordering, &replicas, &storage, seed)?;
        assert_eq!(order[0], replicas[3]);
    }

    // Leadership moves to another replica.
    ordering.learn(&test_helper::rejected(&replicas[3]), &storage)?;
    ordering.learn(&test_helper::accepted(&replicas[1]), &storage)?;
    for seed in 0..50 {
        let order = order(&ordering, &replicas, &storage, seed)?;
        assert_eq!(order[0], replicas[1]);
    }

    Ok(())
}

#[test]
fn test_modify_is_idempotent() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let clock = ManualClock::new(1_000_000);
    let storage = ReplicaStorageProvider::instance();
    let ordering = ordering(&clock)?;
    let replicas = test_helper::make_replicas(6);
    ordering.learn(&test_helper::rejected(&replicas[2]), &storage)?;
    ordering.learn(&test_helper::accepted(&replicas[4]), &storage)?;

    let first = order(&ordering, &replicas, &storage, 7)?;
    for _ in 0..10 {
        assert_eq!(order(&ordering, &replicas, &storage, 7)?, first);
    }

    Ok(())
}
