//! Shipping information collected at checkout.

use serde::{Deserialize, Serialize};

/// A required shipping field, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingField {
    Name,
    Email,
    Address,
    City,
    ZipCode,
}

impl ShippingField {
    /// All required fields in the order they are checked.
    pub const ALL: [ShippingField; 5] = [
        ShippingField::Name,
        ShippingField::Email,
        ShippingField::Address,
        ShippingField::City,
        ShippingField::ZipCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingField::Name => "name",
            ShippingField::Email => "email",
            ShippingField::Address => "address",
            ShippingField::City => "city",
            ShippingField::ZipCode => "zip_code",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShippingField::Name => "name",
            ShippingField::Email => "email",
            ShippingField::Address => "address",
            ShippingField::City => "city",
            ShippingField::ZipCode => "zip code",
        }
    }
}

/// Where an order ships and who receives the confirmation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingInfo {
    /// Recipient name.
    pub name: String,
    /// Confirmation email.
    pub email: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal/ZIP code.
    pub zip_code: String,
}

impl ShippingInfo {
    /// Create shipping info from its five fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            city: city.into(),
            zip_code: zip_code.into(),
        }
    }

    /// Value of a field.
    pub fn field(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::Name => &self.name,
            ShippingField::Email => &self.email,
            ShippingField::Address => &self.address,
            ShippingField::City => &self.city,
            ShippingField::ZipCode => &self.zip_code,
        }
    }

    /// First required field that is blank.
    pub fn first_missing(&self) -> Option<ShippingField> {
        ShippingField::ALL
            .into_iter()
            .find(|f| self.field(*f).trim().is_empty())
    }

    /// Check if all required fields are filled.
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Single-line postal address.
    pub fn one_line(&self) -> String {
        format!("{}, {} {}", self.address, self.city, self.zip_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingInfo {
        ShippingInfo::new("Ada", "ada@example.com", "1 Main St", "Springfield", "12345")
    }

    #[test]
    fn test_complete_shipping_info() {
        let info = complete();
        assert!(info.is_complete());
        assert_eq!(info.one_line(), "1 Main St, Springfield 12345");
    }

    #[test]
    fn test_first_missing_follows_field_order() {
        let mut info = complete();
        info.city.clear();
        info.zip_code.clear();
        assert_eq!(info.first_missing(), Some(ShippingField::City));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut info = complete();
        info.name = "   ".to_string();
        assert_eq!(info.first_missing(), Some(ShippingField::Name));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(ShippingField::ZipCode.as_str(), "zip_code");
        assert_eq!(ShippingField::ZipCode.display_name(), "zip code");
    }
}
