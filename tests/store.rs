mod common;

#[cfg(test)]
mod tests {
    use super::*;

    use common::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::time::sleep;
    use ttl_session::engine::{MemoryEngine, StorageEngine};
    use ttl_session::{Config, Error, Id, SessionStore};

    /// Answers renewing reads, then holds the caller for a while.
    struct SlowRenewalEngine(MemoryEngine);

    impl StorageEngine for SlowRenewalEngine {
        async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
            self.0.put(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
            self.0.get(key).await
        }

        async fn get_and_touch(
            &self,
            key: &str,
            ttl: Duration,
        ) -> Result<Option<Vec<u8>>, Error> {
            let value = self.0.get_and_touch(key, ttl).await;
            sleep(Duration::from_millis(100)).await;
            value
        }

        async fn delete(&self, key: &str) -> Result<(), Error> {
            self.0.delete(key).await
        }

        async fn close(&self) -> Result<(), Error> {
            self.0.close().await
        }
    }

    /// Serves plain reads and writes but fails every renewal.
    struct FailingRenewalEngine(Arc<MemoryEngine>);

    impl StorageEngine for FailingRenewalEngine {
        async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
            self.0.put(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
            self.0.get(key).await
        }

        async fn get_and_touch(
            &self,
            _key: &str,
            _ttl: Duration,
        ) -> Result<Option<Vec<u8>>, Error> {
            Err(Error::Storage("renewal write failed".to_string()))
        }

        async fn delete(&self, key: &str) -> Result<(), Error> {
            self.0.delete(key).await
        }

        async fn close(&self) -> Result<(), Error> {
            self.0.close().await
        }
    }

    async fn assert_round_trip(store: &SessionStore) {
        let test_data = create_test_session();

        let id = store.create(&test_data).await.unwrap();
        let retrieved: TestSession = store.get(&id).await.unwrap();
        assert_eq!(retrieved, test_data);

        let id = store.create("hello").await.unwrap();
        let retrieved: String = store.get(&id).await.unwrap();
        assert_eq!(retrieved, "hello");
    }

    #[tokio::test]
    async fn test_round_trip_in_memory() {
        let store = memory_store(Duration::from_secs(60), true);
        assert_round_trip(&store).await;
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path(), Duration::from_secs(60), true);
        assert_round_trip(&store).await;
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_are_fresh() {
        let store = memory_store(Duration::from_secs(60), true);
        let first = store.create(&1u8).await.unwrap();
        let second = store.create(&1u8).await.unwrap();
        assert_ne!(first, second);
    }

    async fn assert_absolute_expiration(store: &SessionStore) {
        let id = store.create(&create_test_session()).await.unwrap();
        assert!(store.get::<TestSession>(&id).await.is_ok());

        // reads do not push the deadline when renewal is off
        sleep(Duration::from_secs(1)).await;
        assert!(store.get::<TestSession>(&id).await.is_ok());

        sleep(Duration::from_secs(2)).await;
        assert!(matches!(
            store.get::<TestSession>(&id).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_expiration_in_memory() {
        let store = memory_store(Duration::from_secs(2), false);
        assert_absolute_expiration(&store).await;
    }

    #[tokio::test]
    async fn test_expiration_on_disk() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path(), Duration::from_secs(2), false);
        assert_absolute_expiration(&store).await;
    }

    async fn assert_sliding_renewal(store: &SessionStore) {
        let id = store.create("hello").await.unwrap();
        assert_eq!(store.get::<String>(&id).await.unwrap(), "hello");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(store.get::<String>(&id).await.unwrap(), "hello");

        // each read resets the 2s window, so the session outlives its
        // original deadline
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.get::<String>(&id).await.unwrap(), "hello");

        sleep(Duration::from_secs(3)).await;
        assert!(matches!(
            store.get::<String>(&id).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_sliding_renewal_in_memory() {
        let store = memory_store(Duration::from_secs(2), true);
        assert_sliding_renewal(&store).await;
    }

    #[tokio::test]
    async fn test_sliding_renewal_on_disk() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path(), Duration::from_secs(2), true);
        assert_sliding_renewal(&store).await;
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = memory_store(Duration::from_secs(60), true);
        let id = store.create(&create_test_session()).await.unwrap();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        store.delete(&Id::generate()).await.unwrap();

        assert!(matches!(
            store.get::<TestSession>(&id).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_on_disk() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path(), Duration::from_secs(60), true);
        let id = store.create(&create_test_session()).await.unwrap();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        let err = store.get::<TestSession>(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_decode_error() {
        let store = memory_store(Duration::from_secs(60), true);
        let id = store.create("hello").await.unwrap();

        assert!(matches!(
            store.get::<TestSession>(&id).await,
            Err(Error::Decode(_))
        ));

        // the entry itself is untouched
        assert_eq!(store.get::<String>(&id).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_sessions_survive_reopen() {
        let dir = tempdir().unwrap();
        let test_data = create_test_session();

        let store = disk_store(dir.path(), Duration::from_secs(60), true);
        let id = store.create(&test_data).await.unwrap();
        store.close().await.unwrap();

        let store = disk_store(dir.path(), Duration::from_secs(60), true);
        let retrieved: TestSession = store.get(&id).await.unwrap();
        assert_eq!(retrieved, test_data);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_sessions_do_not_touch_disk() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(
            Config::build()
                .in_memory(true)
                .directory(dir.path().join("unused")),
        )
        .unwrap();

        store.create("hello").await.unwrap();
        assert!(!dir.path().join("unused").exists());
    }

    #[tokio::test]
    async fn test_operations_after_close_fail() {
        let dir = tempdir().unwrap();
        let stores = [
            memory_store(Duration::from_secs(60), true),
            disk_store(dir.path(), Duration::from_secs(60), true),
        ];

        for store in stores {
            let id = store.create("hello").await.unwrap();
            let handle = store.clone();
            store.close().await.unwrap();

            assert!(matches!(handle.create("again").await, Err(Error::Closed)));
            assert!(matches!(
                handle.get::<String>(&id).await,
                Err(Error::Closed)
            ));
            assert!(matches!(handle.delete(&id).await, Err(Error::Closed)));
        }
    }

    #[tokio::test]
    async fn test_open_fails_on_unusable_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-directory");
        std::fs::write(&file, b"occupied").unwrap();

        let result = SessionStore::open(Config::build().directory(&file));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_concurrent_renewing_reads() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path(), Duration::from_secs(60), true);
        let test_data = create_test_session();
        let id = store.create(&test_data).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get::<TestSession>(&id).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), test_data);
        }

        assert_eq!(store.get::<TestSession>(&id).await.unwrap(), test_data);
    }

    #[tokio::test]
    async fn test_delete_during_renewing_read_stays_deleted() {
        let store =
            SessionStore::with_engine(SlowRenewalEngine(MemoryEngine::new()), Config::build())
                .unwrap();
        let id = store.create("hello").await.unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move { store.get::<String>(&id).await })
        };

        sleep(Duration::from_millis(20)).await;
        store.delete(&id).await.unwrap();

        // the read began before the delete, so it still saw the session
        assert_eq!(reader.await.unwrap().unwrap(), "hello");

        assert!(matches!(
            store.get::<String>(&id).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_failed_renewal_is_an_error() {
        let engine = Arc::new(MemoryEngine::new());
        let store =
            SessionStore::with_engine(FailingRenewalEngine(Arc::clone(&engine)), Config::build())
                .unwrap();
        let id = store.create("hello").await.unwrap();

        assert!(matches!(
            store.get::<String>(&id).await,
            Err(Error::Storage(_))
        ));

        // the session itself is untouched
        assert!(engine.get(&id.to_string()).await.unwrap().is_some());

        let plain = SessionStore::with_engine(
            FailingRenewalEngine(Arc::clone(&engine)),
            Config::build().extend_sessions(false),
        )
        .unwrap();
        assert_eq!(plain.get::<String>(&id).await.unwrap(), "hello");
    }
}
