use replicant_model::Replica;

/// Creates a replica with a unique, stable address for the given index.
pub fn make_replica(n: usize) -> Replica {
    format!("http://replica-{n}.test:{}/", 8000 + n)
        .parse()
        .expect("Create replica")
}

/// Creates `num` distinct replicas.
pub fn make_replicas(num: usize) -> Vec<Replica> {
    (0..num).map(make_replica).collect()
}
