//! 인자 기반 메모 캐시.
//!
//! 호출 인자(유니버스 소스, 티커 시퀀스)를 키로 결과를 보관합니다.
//! 프로세스 수명 동안 유지되며 무효화 정책은 없습니다. 같은 키에 대한
//! 동시 요청은 중복 계산될 수 있으며 마지막 쓰기가 남습니다.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 복제 가능한 메모 캐시 핸들.
///
/// 복제본은 같은 저장소를 공유합니다.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for MemoCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// 빈 캐시 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 캐시된 값 조회.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// 값 저장. 기존 값은 덮어씁니다.
    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// 캐시된 값이 있으면 반환하고, 없으면 계산 후 저장합니다.
    ///
    /// 계산은 잠금 밖에서 수행되며, 실패한 결과는 캐시되지 않습니다.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let value = init().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_computes_once_per_key() {
        let cache: MemoCache<String, usize> = MemoCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("a".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_errors_not_cached() {
        let cache: MemoCache<u32, u32> = MemoCache::new();

        let first = cache
            .get_or_try_insert_with(1, || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty().await);

        let second = cache
            .get_or_try_insert_with(1, || async { Ok::<_, &str>(7) })
            .await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn test_order_sensitive_sequence_keys() {
        let cache: MemoCache<Vec<&str>, usize> = MemoCache::new();
        cache.insert(vec!["A", "B"], 1).await;

        assert_eq!(cache.get(&vec!["A", "B"]).await, Some(1));
        assert_eq!(cache.get(&vec!["B", "A"]).await, None);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache: MemoCache<u8, u8> = MemoCache::new();
        let handle = cache.clone();

        handle.insert(1, 10).await;
        assert_eq!(cache.get(&1).await, Some(10));

        // 마지막 쓰기가 남는다
        cache.insert(1, 11).await;
        assert_eq!(handle.get(&1).await, Some(11));
        assert_eq!(handle.len().await, 1);
    }
}
