/// One structured error reported by a probe
///
/// `message` is a stable key such as `http-bad-status`; `params` carry the
/// details, whose meaning depends on the key (a status code and reason, a
/// URL, a transport error description).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeErrorDetail {
    pub message: String,
    pub params: Vec<String>,
}

impl ProbeErrorDetail {
    pub fn new(message: &str, params: &[&str]) -> Self {
        Self {
            message: message.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Compiles the error text recorded for a failed probe
///
/// Only the first error is used. Its message is followed by one qualifier:
/// if the first parameter is numeric (a status code), the second parameter
/// is appended when present; otherwise the first parameter is appended.
///
/// # Examples
///
/// ```
/// use linksync::probe::{compile_error, ProbeErrorDetail};
///
/// let errors = vec![ProbeErrorDetail::new("http-bad-status", &["404", "Not Found"])];
/// assert_eq!(compile_error(&errors), "http-bad-status: Not Found");
///
/// let errors = vec![ProbeErrorDetail::new("http-timed-out", &["https://a.example/"])];
/// assert_eq!(compile_error(&errors), "http-timed-out: https://a.example/");
/// ```
pub fn compile_error(errors: &[ProbeErrorDetail]) -> String {
    let Some(first) = errors.first() else {
        return String::new();
    };

    let mut error = first.message.clone();
    if let Some(param) = first.params.first() {
        if is_numeric(param) {
            if let Some(reason) = first.params.get(1) {
                error.push_str(": ");
                error.push_str(reason);
            }
        } else {
            error.push_str(": ");
            error.push_str(param);
        }
    }
    error
}

fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(|n| n.is_finite())
}
