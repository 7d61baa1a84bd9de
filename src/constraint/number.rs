use super::*;

/// Check a number's bounds, decimal places, and divisibility.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let n = match value.as_number() {
        Some(n) => n,
        None => return Ok(()),
    };

    if let Some(ref min) = schema.minimum {
        if schema.exclusive_minimum && n <= min {
            checker.add_error(path, format!("must have a minimum value greater than {}", min));
        } else if n < min {
            checker.add_error(path, format!("must have a minimum value of {}", min));
        }
    }
    if let Some(ref max) = schema.maximum {
        if schema.exclusive_maximum && n >= max {
            checker.add_error(path, format!("must have a maximum value less than {}", max));
        } else if n > max {
            checker.add_error(path, format!("must have a maximum value of {}", max));
        }
    }
    if let Some(places) = schema.max_decimal {
        if n.decimal_places() > places {
            checker.add_error(path, format!("may only have {} decimal places", places));
        }
    }
    if let Some(ref divisor) = schema.divisible_by {
        if !n.is_multiple_of(divisor) {
            checker.add_error(path, format!("must be divisible by {}", divisor));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn errors(value: &str, schema: &str) -> Vec<String> {
        let config = ValidatorConfig::default();
        let registry = LoaderRegistry::new();
        let mut checker = Checker::new(&config, &registry);
        let schema = Schema::from_json_str(schema).unwrap();
        check(&mut checker, &Value::from_json_str(value).unwrap(), &schema, "").unwrap();
        checker.into_errors().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn inclusive_bounds() {
        let schema = r#"{"minimum":1,"maximum":5}"#;
        assert!(errors("1", schema).is_empty());
        assert!(errors("5", schema).is_empty());
        assert!(errors("5.0", schema).is_empty());
        assert_eq!(errors("0", schema), vec!["must have a minimum value of 1"]);
        assert_eq!(errors("5.5", schema), vec!["must have a maximum value of 5"]);
    }

    #[test]
    fn exclusive_bounds() {
        let schema = r#"{"minimum":1,"maximum":5,"exclusiveMinimum":true,"exclusiveMaximum":true}"#;
        assert!(errors("3", schema).is_empty());
        assert_eq!(
            errors("1", schema),
            vec!["must have a minimum value greater than 1"]
        );
        assert_eq!(errors("5", schema), vec!["must have a maximum value less than 5"]);
    }

    #[test]
    fn decimals_and_divisors() {
        assert!(errors("1.25", r#"{"maxDecimal":2}"#).is_empty());
        assert_eq!(errors("1.255", r#"{"maxDecimal":2}"#), vec!["may only have 2 decimal places"]);
        assert!(errors("12", r#"{"divisibleBy":4}"#).is_empty());
        assert_eq!(errors("10", r#"{"divisibleBy":4}"#), vec!["must be divisible by 4"]);
        assert!(errors("1.5", r#"{"divisibleBy":0.5}"#).is_empty());
    }

    #[test]
    fn ignores_non_numbers() {
        assert!(errors(r#""0""#, r#"{"minimum":1}"#).is_empty());
    }
}
