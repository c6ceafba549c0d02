//! Request metrics.
//!
//! Recorded through the [`metrics`] facade. No exporter is installed here;
//! install one in the binary to publish these values.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `ferrule_requests_total` | Counter | `action`, `status` |
//! | `ferrule_request_duration_seconds` | Histogram | `action` |
//! | `ferrule_short_circuits_total` | Counter | `action`, `interceptor` |
//! | `ferrule_binding_failures_total` | Counter | `action`, `code` |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Label used when no action matched.
pub const UNMATCHED_ACTION: &str = "unmatched";

/// Registers descriptions for every Ferrule metric.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        "ferrule_requests_total",
        "Total number of requests dispatched"
    );
    describe_histogram!(
        "ferrule_request_duration_seconds",
        "Dispatch duration in seconds"
    );
    describe_counter!(
        "ferrule_short_circuits_total",
        "Requests answered by an interceptor"
    );
    describe_counter!(
        "ferrule_binding_failures_total",
        "Requests rejected while binding arguments"
    );
}

/// Records a completed dispatch.
pub fn record_request(action: &str, status_code: u16, duration: Duration) {
    counter!(
        "ferrule_requests_total",
        "action" => action.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "ferrule_request_duration_seconds",
        "action" => action.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records an interceptor answering for an action.
pub fn record_short_circuit(action: &str, interceptor: &str) {
    counter!(
        "ferrule_short_circuits_total",
        "action" => action.to_string(),
        "interceptor" => interceptor.to_string()
    )
    .increment(1);
}

/// Records a binding failure by error code.
pub fn record_binding_failure(action: &str, code: &str) {
    counter!(
        "ferrule_binding_failures_total",
        "action" => action.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_without_recorder() {
        describe_metrics();
        record_request("UsersController::get", 200, Duration::from_millis(3));
        record_request(UNMATCHED_ACTION, 404, Duration::from_micros(40));
        record_short_circuit("AdminController::index", "require-auth");
        record_binding_failure("UsersController::get", "INVALID_PARAMETER");
    }
}
