use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use crate::models::menu::MenuItem;

/// A purchasable item as handed to the cart by the menu or the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[validate(length(min = 1, max = 64, message = "Item id must be 1-64 characters"))]
    #[validate(custom = "validate_not_blank")]
    pub id: String,

    #[validate(length(min = 1, max = 255, message = "Item name must be 1-255 characters"))]
    #[validate(custom = "validate_not_blank")]
    pub name: String,

    pub unit_price: f64,

    #[serde(default)]
    pub image: String,
}

impl From<&MenuItem> for CartItem {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            image: item.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: u32 },

    #[error("Quantity overflow for item {id}: the cart cannot hold that many units")]
    QuantityOverflow { id: String },

    #[error("Unit price must be a positive amount, got {price}")]
    InvalidPrice { price: f64 },

    #[error("Stored cart is corrupt: {reason}")]
    Corrupt { reason: String },
}

/// Shape of the persisted blob before it is checked and its aggregates rederived.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCart {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    total: f64,
    #[serde(default)]
    line_count: u32,
}

/// The in-session cart.
///
/// `lines` is the only source of truth. `total` and `line_count` are kept as
/// fields so the persisted blob carries them, but they are rebuilt from the
/// lines after every mutation and whenever a cart is deserialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "StoredCart")]
pub struct Cart {
    lines: Vec<CartLine>,
    total: f64,
    line_count: u32,
}

impl TryFrom<StoredCart> for Cart {
    type Error = CartError;

    fn try_from(stored: StoredCart) -> Result<Self, Self::Error> {
        let cart = Cart::from_lines(stored.lines)?;
        if cart.line_count != stored.line_count || (cart.total - stored.total).abs() > 0.005 {
            tracing::debug!(
                "Stored cart aggregates were stale (total {} / {} items), rederived as {} / {}",
                stored.total,
                stored.line_count,
                cart.total,
                cart.line_count
            );
        }
        Ok(cart)
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw lines, rejecting anything `add_item` could never have produced.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CartError> {
        let mut seen = HashSet::new();
        for line in &lines {
            if !seen.insert(line.id.as_str()) {
                return Err(CartError::Corrupt {
                    reason: format!("duplicate line id '{}'", line.id),
                });
            }
            if line.quantity == 0 {
                return Err(CartError::Corrupt {
                    reason: format!("line '{}' has zero quantity", line.id),
                });
            }
            if !is_valid_price(line.unit_price) {
                return Err(CartError::Corrupt {
                    reason: format!("line '{}' has invalid price {}", line.id, line.unit_price),
                });
            }
        }
        if unit_count(&lines).is_none() {
            return Err(CartError::Corrupt {
                reason: "total quantity does not fit in a u32".to_string(),
            });
        }

        let mut cart = Self {
            lines,
            total: 0.0,
            line_count: 0,
        };
        cart.recalculate();
        Ok(cart)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Number of units in the cart (sum of quantities, not distinct lines).
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `item`, accumulating onto an existing line with the same id.
    pub fn add_item(&mut self, item: CartItem, quantity: u32) -> Result<(), CartError> {
        item.validate()?;
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        if !is_valid_price(item.unit_price) {
            return Err(CartError::InvalidPrice {
                price: item.unit_price,
            });
        }

        if self.line_count.checked_add(quantity).is_none() {
            return Err(CartError::QuantityOverflow { id: item.id });
        }

        match self.lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine {
                id: item.id,
                name: item.name.trim().to_string(),
                unit_price: item.unit_price,
                quantity,
                image: item.image,
            }),
        }

        self.recalculate();
        Ok(())
    }

    /// Returns whether a line was removed. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        let removed = self.lines.len() != before;
        self.recalculate();
        removed
    }

    /// Set a line's quantity. Zero removes the line. Returns whether a line was touched.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) -> Result<bool, CartError> {
        if quantity == 0 {
            return Ok(self.remove_item(id));
        }

        let Some(index) = self.lines.iter().position(|line| line.id == id) else {
            return Ok(false);
        };
        let others = self.line_count - self.lines[index].quantity;
        if others.checked_add(quantity).is_none() {
            return Err(CartError::QuantityOverflow { id: id.to_string() });
        }

        self.lines[index].quantity = quantity;
        self.recalculate();
        Ok(true)
    }

    /// Take checked-out lines back out of the cart, leaving anything added since
    /// the snapshot in place. Lines whose quantity drops to zero are removed.
    pub fn remove_ordered(&mut self, ordered: &[CartLine]) {
        for ordered_line in ordered {
            if let Some(line) = self.lines.iter_mut().find(|line| line.id == ordered_line.id) {
                line.quantity = line.quantity.saturating_sub(ordered_line.quantity);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
        self.recalculate();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.recalculate();
    }

    // Callers check the unit count for overflow before growing any line
    fn recalculate(&mut self) {
        self.total = self.lines.iter().map(CartLine::line_total).sum();
        self.line_count = unit_count(&self.lines).unwrap_or(u32::MAX);
    }
}

fn unit_count(lines: &[CartLine]) -> Option<u32> {
    lines
        .iter()
        .try_fold(0u32, |count, line| count.checked_add(line.quantity))
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            unit_price: price,
            image: format!("/images/{}.jpg", id),
        }
    }

    fn assert_aggregates(cart: &Cart) {
        let expected_total: f64 = cart
            .lines()
            .iter()
            .map(|l| l.unit_price * l.quantity as f64)
            .sum();
        let expected_count: u32 = cart.lines().iter().map(|l| l.quantity).sum();
        assert!((cart.total() - expected_total).abs() < 1e-9);
        assert_eq!(cart.line_count(), expected_count);
    }

    #[test]
    fn test_add_same_item_accumulates_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item("paneer", 250.0), 2).unwrap();
        cart.add_item(item("paneer", 250.0), 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line("paneer").unwrap().quantity, 5);
        assert_eq!(cart.total(), 1250.0);
        assert_eq!(cart.line_count(), 5);
    }

    #[test]
    fn test_aggregates_hold_after_every_operation() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 120.0), 1).unwrap();
        assert_aggregates(&cart);
        cart.add_item(item("b", 99.5), 4).unwrap();
        assert_aggregates(&cart);
        cart.update_quantity("a", 7).unwrap();
        assert_aggregates(&cart);
        cart.remove_item("b");
        assert_aggregates(&cart);
        cart.add_item(item("c", 35.25), 2).unwrap();
        assert_aggregates(&cart);
        cart.update_quantity("c", 0).unwrap();
        assert_aggregates(&cart);

        assert_eq!(cart.line_count(), 7);
        assert_eq!(cart.total(), 840.0);
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let mut updated = Cart::new();
        updated.add_item(item("a", 10.0), 1).unwrap();
        updated.add_item(item("b", 20.0), 2).unwrap();
        let mut removed = updated.clone();

        assert!(updated.update_quantity("a", 0).unwrap());
        assert!(removed.remove_item("a"));
        assert_eq!(updated, removed);
    }

    #[test]
    fn test_update_quantity_sets_instead_of_incrementing() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 10.0), 4).unwrap();
        cart.update_quantity("a", 2).unwrap();

        assert_eq!(cart.line("a").unwrap().quantity, 2);
        assert_eq!(cart.total(), 20.0);
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 10.0), 1).unwrap();
        let before = cart.clone();

        assert!(!cart.remove_item("missing"));
        assert!(!cart.update_quantity("missing", 3).unwrap());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear_resets_aggregates() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 10.0), 3).unwrap();
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
        assert_eq!(cart.line_count(), 0);
    }

    #[test]
    fn test_add_item_rejects_invalid_input() {
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add_item(item("a", 10.0), 0),
            Err(CartError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            cart.add_item(item("a", -1.0), 1),
            Err(CartError::InvalidPrice { .. })
        ));
        assert!(matches!(
            cart.add_item(item("a", f64::NAN), 1),
            Err(CartError::InvalidPrice { .. })
        ));
        assert!(matches!(
            cart.add_item(item("   ", 10.0), 1),
            Err(CartError::ValidationError(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_item_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 1.0), u32::MAX).unwrap();

        let result = cart.add_item(item("a", 1.0), 1);
        assert!(matches!(result, Err(CartError::QuantityOverflow { .. })));
        assert_eq!(cart.line_count(), u32::MAX);
    }

    #[test]
    fn test_unit_count_overflow_across_lines_is_rejected() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 1.0), u32::MAX).unwrap();
        let before = cart.clone();

        let result = cart.add_item(item("b", 1.0), 1);
        assert!(matches!(result, Err(CartError::QuantityOverflow { .. })));
        assert_eq!(cart, before);

        let mut cart = Cart::new();
        cart.add_item(item("a", 1.0), u32::MAX - 1).unwrap();
        cart.add_item(item("b", 1.0), 1).unwrap();
        let before = cart.clone();

        let result = cart.update_quantity("b", 2);
        assert!(matches!(result, Err(CartError::QuantityOverflow { .. })));
        assert_eq!(cart, before);
        assert_eq!(cart.line_count(), u32::MAX);
        assert!(cart.update_quantity("b", 1).unwrap());
    }

    #[test]
    fn test_remove_ordered_keeps_newer_additions() {
        let mut cart = Cart::new();
        cart.add_item(item("thali", 400.0), 1).unwrap();
        let ordered = cart.lines().to_vec();

        cart.add_item(item("thali", 400.0), 2).unwrap();
        cart.add_item(item("lassi", 100.0), 2).unwrap();
        cart.remove_ordered(&ordered);

        assert_eq!(cart.line("thali").unwrap().quantity, 2);
        assert_eq!(cart.line("lassi").unwrap().quantity, 2);
        assert_eq!(cart.line_count(), 4);
        assert_eq!(cart.total(), 1000.0);

        cart.remove_ordered(&cart.lines().to_vec());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn test_serialized_shape_uses_storage_keys() {
        let mut cart = Cart::new();
        cart.add_item(item("a", 10.0), 2).unwrap();

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["total"], 20.0);
        assert_eq!(value["lineCount"], 2);
        assert_eq!(value["lines"][0]["unitPrice"], 10.0);
        assert_eq!(value["lines"][0]["quantity"], 2);
    }

    #[test]
    fn test_deserialize_rederives_stale_aggregates() {
        let payload = r#"{
            "lines": [{"id": "a", "name": "A", "unitPrice": 15.0, "quantity": 2, "image": ""}],
            "total": 999.0,
            "lineCount": 42
        }"#;

        let cart: Cart = serde_json::from_str(payload).unwrap();
        assert_eq!(cart.total(), 30.0);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let payload = r#"{
            "lines": [
                {"id": "a", "name": "A", "unitPrice": 1.0, "quantity": 1},
                {"id": "a", "name": "A", "unitPrice": 1.0, "quantity": 1}
            ]
        }"#;

        assert!(serde_json::from_str::<Cart>(payload).is_err());
    }

    #[test]
    fn test_stored_lines_overflowing_unit_count_are_corrupt() {
        let line = |id: &str, quantity: u32| CartLine {
            id: id.to_string(),
            name: id.to_uppercase(),
            unit_price: 1.0,
            quantity,
            image: String::new(),
        };

        let result = Cart::from_lines(vec![line("a", u32::MAX), line("b", 1)]);
        assert!(matches!(result, Err(CartError::Corrupt { .. })));

        let payload = format!(
            r#"{{"lines": [
                {{"id": "a", "name": "A", "unitPrice": 1.0, "quantity": {}}},
                {{"id": "b", "name": "B", "unitPrice": 1.0, "quantity": 1}}
            ]}}"#,
            u32::MAX
        );
        assert!(serde_json::from_str::<Cart>(&payload).is_err());
    }
}
