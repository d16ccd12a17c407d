use uuid::Uuid;

/// Mints an opaque id for a newly stored entity. Ids outlive a process
/// (snapshots round-trip through the host app's persistence), so these
/// are random rather than counter-based.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
