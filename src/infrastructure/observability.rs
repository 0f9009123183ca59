//! Credential metrics, recorded through the `metrics` facade

use metrics::counter;

/// Record the outcome of a key validation (`ok` or a failure reason)
pub fn record_key_validation(outcome: &'static str) {
    counter!("api_key_validations_total", "outcome" => outcome).increment(1);
}

/// Record a newly issued key
pub fn record_key_issued() {
    counter!("api_keys_issued_total").increment(1);
}

/// Record a revoked key
pub fn record_key_revoked() {
    counter!("api_keys_revoked_total").increment(1);
}

/// Record a sign-in attempt
pub fn record_sign_in(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("sign_in_attempts_total", "outcome" => outcome).increment(1);
}
