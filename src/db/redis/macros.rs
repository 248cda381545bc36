/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. On a miss, or when Redis cannot be
/// read, awaits `$block`, queues the result for a background write with the
/// given TTL (seconds) and returns it. Errors from `$block` are propagated with
/// `?` and never cached.
///
/// ```rust,ignore
/// let movies: Vec<Candidate> = cached!(self.cache, CacheKey::Recommendations(id), TTL, async move {
///     self.fetch_recommendations(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
