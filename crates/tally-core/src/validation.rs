//! # Validation Module
//!
//! Field-level checks run before customers and orders reach the store.
//!
//! ## Where Checks Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customer / Order built by the caller                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  validate_customer / validate_order     shape of one record            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CreditStore                            cross-record ledger rules      │
//! │                                         (unknown ids, double settle)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Customer, Order};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name: non-empty after trimming, at most 100 chars.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Sita Sharma").is_ok());
/// assert!(validate_customer_name("  ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - Digits, spaces and hyphens only
/// - 7 to 15 digits (E.164 upper bound)
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    let body = phone.strip_prefix('+').unwrap_or(phone);

    if !body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and hyphens".to_string(),
        });
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a menu item name as it will appear on tickets.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item name".to_string(),
        });
    }
    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "item name".to_string(),
            max: 200,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value: 1 to [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents, up to [`MAX_AMOUNT_CENTS`]. Zero is allowed
/// (complimentary items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a new customer record before insertion.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    if customer.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_customer_name(&customer.name)?;
    if let Some(phone) = &customer.phone {
        validate_phone(phone)?;
    }
    if customer.credit_amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "credit_amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates an order and every line on it.
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    if order.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    if order.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "order items".to_string(),
            min: 0,
            max: MAX_ORDER_ITEMS as i64,
        });
    }
    for item in &order.items {
        validate_item_name(&item.name)?;
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_price.cents())?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{OrderItem, OrderType};
    use chrono::Utc;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Ram Bahadur").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9841234567").is_ok());
        assert!(validate_phone("+977 984-1234567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98412x4567").is_err());
        assert!(validate_phone(&"9".repeat(16)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_price_cents(MAX_AMOUNT_CENTS + 1).is_err());
    }

    #[test]
    fn test_largest_valid_order_total_fits() {
        let mut order = Order::new("o9", Utc::now());
        for i in 0..MAX_ORDER_ITEMS {
            order = order.with_item(OrderItem::new(
                format!("Item {}", i),
                MAX_ITEM_QUANTITY,
                Money::from_cents(MAX_AMOUNT_CENTS),
                OrderType::Kot,
            ));
        }
        assert!(validate_order(&order).is_ok());
        assert_eq!(
            order.total().cents(),
            MAX_AMOUNT_CENTS * MAX_ITEM_QUANTITY * MAX_ORDER_ITEMS as i64
        );

        let overpriced = Order::new("o10", Utc::now()).with_item(OrderItem::new(
            "Gold Momo",
            1,
            Money::from_cents(MAX_AMOUNT_CENTS + 1),
            OrderType::Kot,
        ));
        assert!(validate_order(&overpriced).is_err());
    }

    #[test]
    fn test_validate_customer() {
        let customer = Customer::new("c1", "Sita").with_phone("9841000000");
        assert!(validate_customer(&customer).is_ok());

        let mut bad = customer.clone();
        bad.credit_amount = Money::from_cents(-1);
        assert!(validate_customer(&bad).is_err());

        let bad_phone = Customer::new("c1", "Sita").with_phone("call me");
        assert!(validate_customer(&bad_phone).is_err());
    }

    #[test]
    fn test_validate_order() {
        let order = Order::new("o1", Utc::now())
            .with_item(OrderItem::new("Momo", 2, Money::from_cents(25000), OrderType::Kot));
        assert!(validate_order(&order).is_ok());

        let zero_qty = Order::new("o2", Utc::now())
            .with_item(OrderItem::new("Momo", 0, Money::from_cents(25000), OrderType::Kot));
        assert!(validate_order(&zero_qty).is_err());

        let unnamed = Order::new("o3", Utc::now())
            .with_item(OrderItem::new(" ", 1, Money::from_cents(25000), OrderType::Bot));
        assert!(validate_order(&unnamed).is_err());
    }
}
