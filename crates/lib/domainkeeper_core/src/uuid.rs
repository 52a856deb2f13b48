// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// PostgreSQL cannot auto-generate UUIDv7, so tables where insertion
// order matters (records, notification audit entries) get their ids
// app-side. The users table keeps PG's gen_random_uuid() (v4) since
// time-ordering is irrelevant there.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuidv7_is_valid() {
        let id = uuidv7();
        assert_eq!(id.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn uuidv7_is_monotonic() {
        let a = uuidv7();
        let b = uuidv7();
        // UUIDv7 embeds a timestamp, so later ids sort after earlier ones
        assert!(b >= a);
    }
}
