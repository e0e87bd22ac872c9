use tokio::time::{sleep, Duration};

/// Pacing policy for sequential submissions: nothing before the first task,
/// a fixed delay before each subsequent one. Concurrency stays at 1 because
/// the caller awaits every task through `pace`.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    dispatched: usize,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, dispatched: 0 }
    }

    /// Wait out the inter-task delay, then account for one dispatch.
    pub async fn pace(&mut self) {
        if self.dispatched > 0 && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.dispatched += 1;
    }

    /// How many tasks have been paced so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}
