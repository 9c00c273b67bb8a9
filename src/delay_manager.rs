use std::time::Duration;
use log::debug;

pub async fn polite_delay(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    debug!("Waiting for {:?} (Request Delay)...", delay);
    tokio::time::sleep(delay).await;
}
