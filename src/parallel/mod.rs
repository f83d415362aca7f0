// rayon-based shared-memory parallelism

use crate::error::KError;

/// Run `f` with every operator, reduction and update kernel fanned out over
/// `threads` workers (`None` uses one per logical core).
///
/// Each call builds its own pool, so solves configured with different thread
/// counts do not interfere.
#[cfg(feature = "rayon")]
pub fn with_threads<R, F>(threads: Option<usize>, f: F) -> Result<R, KError>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let wanted = threads.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(wanted)
        .build()
        .map_err(|e| KError::Configuration(format!("cannot build a {}-thread pool: {}", wanted, e)))?;
    tracing::debug!(threads = wanted, "running on a dedicated thread pool");
    Ok(pool.install(f))
}

#[cfg(not(feature = "rayon"))]
pub fn with_threads<R, F>(_threads: Option<usize>, f: F) -> Result<R, KError>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    Ok(f())
}

/// Number of workers the kernels fan out to from the calling context.
pub fn num_threads() -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "rayon"))]
    {
        1
    }
}

#[cfg(all(test, feature = "rayon"))]
mod tests {
    use super::*;

    #[test]
    fn pools_are_independent() {
        assert_eq!(with_threads(Some(1), num_threads).unwrap(), 1);
        assert_eq!(with_threads(Some(3), num_threads).unwrap(), 3);
        let nested = with_threads(Some(2), || with_threads(Some(1), num_threads).unwrap()).unwrap();
        assert_eq!(nested, 1);
        assert!(with_threads(None, num_threads).unwrap() >= 1);
    }
}
