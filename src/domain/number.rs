use std::fmt::Display;

#[derive(Clone, Debug)]
pub enum Number {
    PositiveInt(u64),
    NegativeInt(i64),
    Float(f64),
}

impl Number {
    /// Rounds to the given number of decimal digits. Integers are already exact and are returned as is.
    ///
    /// Rounds the exact binary value through its decimal form, so `2.675` (stored as `2.67499..`) becomes `2.67`
    /// and very large values cannot overflow.
    pub fn rounded(&self, decimals: usize) -> Number {
        match self {
            Number::Float(n) if n.is_finite() => Number::Float(format!("{:.*}", decimals, n).parse().unwrap_or(*n)),
            other => other.clone(),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(value: &serde_json::Number) -> Self {
        if let Some(n) = value.as_u64() {
            Number::PositiveInt(n)
        } else if let Some(n) = value.as_i64() {
            Number::NegativeInt(n)
        } else {
            // serde_json only yields None here for arbitrary precision numbers, which are not enabled
            Number::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::PositiveInt(a), Number::PositiveInt(b)) => a == b,
            (Number::NegativeInt(a), Number::NegativeInt(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Float(a), Number::PositiveInt(b)) => *a == *b as f64,
            (Number::Float(a), Number::NegativeInt(b)) => *a == *b as f64,
            (Number::PositiveInt(a), Number::Float(b)) => *a as f64 == *b,
            (Number::NegativeInt(a), Number::Float(b)) => *a as f64 == *b,
            _ => false,
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::PositiveInt(n) => write!(f, "{}", n),
            Number::NegativeInt(n) => write!(f, "{}", n),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}
