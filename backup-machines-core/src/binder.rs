//! A dependency binder that threads a logger through to an adapter
//! explicitly rather than mutating a shared slot on it. Mutating a
//! class-level logger field is unsafe once adapters run concurrently
//! across a worker pool; `Binder::bind` instead returns a small wrapper
//! that carries the logger alongside the adapter, never writing it
//! anywhere global.

use crate::logger::Logger;

/// A repository adapter: the thing a node body actually calls to perform
/// its one observable side effect. The core never inspects an adapter's
/// internals beyond this one entry point.
pub trait RepositoryAdapter {
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&mut self, logger: &dyn Logger) -> Result<Self::Output, Self::Error>;
}

/// Carries a logger reference and hands it to adapters at call time.
pub struct Binder<'a> {
    logger: &'a dyn Logger,
}

impl<'a> Binder<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self { logger }
    }

    /// Bind `adapter` to this binder's logger. The returned [`Bound`] is
    /// the only handle a node body needs: call `.execute()` on it.
    pub fn bind<A: RepositoryAdapter>(&self, adapter: A) -> Bound<'a, A> {
        Bound {
            adapter,
            logger: self.logger,
        }
    }
}

/// An adapter paired with the logger it should use for this call.
pub struct Bound<'a, A: RepositoryAdapter> {
    adapter: A,
    logger: &'a dyn Logger,
}

impl<'a, A: RepositoryAdapter> Bound<'a, A> {
    pub fn execute(&mut self) -> Result<A::Output, A::Error> {
        self.adapter.execute(self.logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLogger;
    use std::cell::Cell;
    use std::fmt;

    #[derive(Debug)]
    struct Boom;
    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }
    impl std::error::Error for Boom {}

    struct RecordingAdapter<'a> {
        calls: &'a Cell<u32>,
    }

    impl<'a> RepositoryAdapter for RecordingAdapter<'a> {
        type Output = ();
        type Error = Boom;

        fn execute(&mut self, logger: &dyn Logger) -> Result<(), Boom> {
            self.calls.set(self.calls.get() + 1);
            logger.debug("adapter executed");
            Ok(())
        }
    }

    #[test]
    fn bound_adapter_forwards_the_binders_logger() {
        let logger = NullLogger;
        let binder = Binder::new(&logger);
        let calls = Cell::new(0);
        let mut bound = binder.bind(RecordingAdapter { calls: &calls });
        bound.execute().unwrap();
        assert_eq!(calls.get(), 1);
    }
}
