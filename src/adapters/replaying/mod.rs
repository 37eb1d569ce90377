//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_fetcher;
pub mod object_store;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
///
/// # Panics
///
/// Panics if the cassette has no more interactions for the port/method.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output
}

/// Deserialize a replayed output as `Result<T, Error>`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(msg.into());
    }
    if let Some(ok_val) = output.get("Ok").or_else(|| output.get("ok")) {
        return serde_json::from_value(ok_val.clone())
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>);
    }
    serde_json::from_value(output)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn replay_err_string() {
        let result = replay_result::<()>(json!({"Err": "HTTP 404 Not Found"}));
        assert_eq!(result.unwrap_err().to_string(), "HTTP 404 Not Found");
    }

    #[test]
    fn replay_ok_unit() {
        assert!(replay_result::<()>(json!({"Ok": null})).is_ok());
    }

    #[test]
    fn replay_bare_value() {
        let value: Vec<u32> = replay_result(json!([1, 2])).unwrap();
        assert_eq!(value, vec![1, 2]);
    }
}
