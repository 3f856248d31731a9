/// Turns the instrument type reported by the payment provider into the label shown to customers.
pub fn clean_payment_method(instrument: Option<&str>) -> String {
    let raw = match instrument.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_ascii_uppercase(),
        None => return "Online".to_string(),
    };
    match raw.as_str() {
        "UPI" | "UPI_INTENT" | "UPI_COLLECT" | "UPI_QR" => "UPI".to_string(),
        "CARD" | "CREDIT_CARD" | "DEBIT_CARD" => "Card".to_string(),
        "NETBANKING" | "NET_BANKING" => "Net Banking".to_string(),
        "WALLET" => "Wallet".to_string(),
        _ => title_case(&raw),
    }
}

fn title_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
