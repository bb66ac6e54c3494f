use serde::{Deserialize, Serialize};

/// Standard response wrapper used by every JSON endpoint on the server.
///
/// Successful bodies look like `{"code": 200, "message": "ok", "data": ...}`.
/// Callers care about `data`; `code` duplicates the HTTP status and `message`
/// is advisory, so both are surfaced for logging and then dropped.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_typed_payload() {
        let env: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"code": 200, "message": "ok", "data": [1, 2, 3]}"#).unwrap();
        assert_eq!(env.into_data(), vec![1, 2, 3]);
    }

    #[test]
    fn tolerates_mismatched_code_field() {
        // Some handlers report code 0 on success; the body still parses.
        let env: Envelope<String> =
            serde_json::from_str(r#"{"code": 0, "message": "", "data": "fine"}"#).unwrap();
        assert_eq!(env.code, 0);
        assert_eq!(env.into_data(), "fine");
    }
}
