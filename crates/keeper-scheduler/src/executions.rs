use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Cancellation handles of builds currently owned by a worker, keyed by build id.
#[derive(Clone, Default)]
pub struct Executions {
    tokens: Arc<Mutex<HashMap<i32, CancellationToken>>>,
}

impl Executions {
    pub async fn register(&self, build_id: i32) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.lock().await.insert(build_id, token.clone());
        token
    }

    /// Returns false when no worker owns the build.
    pub async fn cancel(&self, build_id: i32) -> bool {
        match self.tokens.lock().await.get(&build_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, build_id: i32) {
        self.tokens.lock().await.remove(&build_id);
    }
}
