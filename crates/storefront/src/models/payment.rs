//! Payment form submitted with a pay request.

use serde::Deserialize;

/// Card details sent by the checkout page.
///
/// Payment is simulated, so only `name` is used (as the receipt's customer
/// name). `Debug` redacts the card number and CVV.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl PaymentDetails {
    /// Name printed on the receipt, with surrounding whitespace removed.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.name.trim()
    }

    /// Last four digits of the card, for logging.
    #[must_use]
    pub fn card_last4(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        digits.iter().skip(digits.len().saturating_sub(4)).collect()
    }
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &format_args!("****{}", self.card_last4()))
            .field("expiration_date", &self.expiration_date)
            .field("cvv", &"[REDACTED]")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case() {
        let details: PaymentDetails = serde_json::from_str(
            r#"{"cardNumber":"4111 1111 1111 1234","expirationDate":"12/30","cvv":"987","name":" Ada Reader ","address":"1 Main St"}"#,
        )
        .unwrap();

        assert_eq!(details.expiration_date, "12/30");
        assert_eq!(details.customer_name(), "Ada Reader");
        assert_eq!(details.card_last4(), "1234");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let details: PaymentDetails = serde_json::from_str("{}").unwrap();
        assert_eq!(details.customer_name(), "");
        assert_eq!(details.card_last4(), "");
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let details = PaymentDetails {
            card_number: "4111111111111234".to_string(),
            cvv: "987".to_string(),
            ..PaymentDetails::default()
        };

        let debug_output = format!("{details:?}");
        assert!(debug_output.contains("****1234"));
        assert!(!debug_output.contains("4111111111111234"));
        assert!(!debug_output.contains("987"));
    }
}
