use crate::base::neterror::NetError;
use crate::http::response::ResponseValue;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The memoized outcome of one request.
///
/// Cloning is cheap and every clone resolves to the same value; the
/// underlying pipeline runs once, when the first clone is polled.
#[derive(Clone)]
pub struct Execution {
    inner: Shared<BoxFuture<'static, Result<ResponseValue, NetError>>>,
}

impl Execution {
    pub(crate) fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<ResponseValue, NetError>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// The outcome, if the pipeline has already finished.
    pub fn peek(&self) -> Option<&Result<ResponseValue, NetError>> {
        self.inner.peek()
    }
}

impl Future for Execution {
    type Output = Result<ResponseValue, NetError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("finished", &self.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::responsebody::ResponseBody;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_runs_once_across_clones() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let execution = Execution::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ResponseValue::Body(ResponseBody::Text("x".into())))
        });

        assert!(execution.peek().is_none());
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        let (a, b) = tokio::join!(execution.clone(), execution.clone());
        assert_eq!(a, b);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(execution.peek().is_some());
    }
}
