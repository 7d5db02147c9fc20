//! Low-stock alert delivery.
//!
//! Alerts are fire-and-forget observability signals: emitting one never fails
//! the operation that raised it and never blocks on a consumer.

use std::sync::Mutex;

use tracing::warn;

use equipstock_stock::LowStockAlert;

pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: LowStockAlert);
}

/// Default sink: one structured `warn!` per alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn emit(&self, alert: LowStockAlert) {
        warn!(
            target: "equipstock::alerts",
            stock_id = %alert.stock_id,
            equipment_id = %alert.equipment_id,
            equipment_name = %alert.equipment_name,
            location_id = %alert.location_id,
            quantity = alert.quantity,
            min_threshold = alert.min_threshold,
            "stock below minimum threshold"
        );
    }
}

/// Sink that keeps every alert in memory (tests, diagnostics).
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    inner: Mutex<Vec<LowStockAlert>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<LowStockAlert> {
        match self.inner.lock() {
            Ok(alerts) => alerts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AlertSink for RecordingAlertSink {
    fn emit(&self, alert: LowStockAlert) {
        match self.inner.lock() {
            Ok(mut alerts) => alerts.push(alert),
            Err(poisoned) => poisoned.into_inner().push(alert),
        }
    }
}
