use std::fmt::Display;
use std::ops::RangeInclusive;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn ensure_range<T>(name: &str, value: T, range: RangeInclusive<T>) -> Result<(), String>
where
    T: PartialOrd + Display,
{
    if !range.contains(&value) {
        return Err(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        ));
    }
    Ok(())
}
