/// Conversion from a wire response into the workspace model it feeds.
pub trait RemoteResponse<T> {
    fn to_model(&self) -> T;
}

/// Reads a numeric field that upstream sometimes sends as a string.
pub(crate) fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(Some("1.25")), Some(1.25));
        assert_eq!(parse_decimal(Some(" 3 ")), Some(3.0));
        assert_eq!(parse_decimal(Some("n/a")), None);
        assert_eq!(parse_decimal(Some("NaN")), None);
        assert_eq!(parse_decimal(None), None);
    }
}
