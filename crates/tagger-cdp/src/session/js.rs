//! JavaScript execution operations for CDP page session.

use serde_json::{Value, json};

use crate::error::CdpError;
use crate::protocol::ExceptionDetails;

use super::core::PageSession;

impl PageSession {
    /// Evaluate JavaScript expression and return its JSON value.
    ///
    /// Promises are awaited. A thrown exception becomes
    /// [`CdpError::JavaScript`]; `undefined` comes back as `Value::Null`.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        Self::unwrap_evaluation(result)
    }

    pub(super) fn unwrap_evaluation(mut result: Value) -> Result<Value, CdpError> {
        if let Some(exception) = result.get("exceptionDetails") {
            let message = serde_json::from_value::<ExceptionDetails>(exception.clone())
                .map(|details| details.message())
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CdpError::JavaScript(message));
        }

        Ok(result["result"]["value"].take())
    }
}
