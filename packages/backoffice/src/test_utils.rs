//! Test helpers shared by storage and handler tests

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use crate::currency::FixedRateConverter;
    use crate::db::DbState;

    /// DbState over an in-memory database with fixed exchange rates.
    /// Returns the TempDir so blob files outlive the test body.
    pub async fn test_state() -> (DbState, tempfile::TempDir) {
        let blob_dir = tempfile::TempDir::new().unwrap();
        let converter = Arc::new(
            FixedRateConverter::new()
                .with_rate("EUR", "USD", 1.10)
                .with_rate("GBP", "USD", 1.25),
        );
        let state = DbState::init_in_memory(converter, blob_dir.path().to_path_buf())
            .await
            .unwrap();
        (state, blob_dir)
    }
}
