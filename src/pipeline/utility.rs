/// Unweighted arithmetic mean. `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_input_is_absent() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_normal_values() {
        assert_eq!(mean(&[10.0]), Some(10.0));
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
