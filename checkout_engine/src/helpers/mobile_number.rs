/// A mobile number must be exactly ten ASCII digits, with no prefix or separators.
pub fn is_valid_mobile_number(number: &str) -> bool {
    regex::Regex::new(r"^[0-9]{10}$").map(|re| re.is_match(number)).unwrap_or(false)
}
