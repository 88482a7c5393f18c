use serde::Deserialize;
use serde_json::Value;

/// Reply shape shared by the Upstash Redis and Vector REST APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct RestEnvelope {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RestEnvelope {
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_wins() {
        let env: RestEnvelope =
            serde_json::from_str(r#"{"error":"WRONGPASS invalid password"}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), "WRONGPASS invalid password");
    }

    #[test]
    fn test_missing_result_is_null() {
        let env: RestEnvelope = serde_json::from_str(r#"{"result":null}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), Value::Null);
    }
}
