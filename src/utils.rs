/// Addresses are compared and embedded lower-cased, whatever case the caller used.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}
