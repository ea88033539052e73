//! Shopping cart and placeholder checkout.
//!
//! The cart lives for the session only. Checkout takes no payment: it
//! checks the customer and their details, then clears the cart.

use crate::{CartError, Collection, Money};
use serde::{Deserialize, Serialize};
use session_controller::{member_guard, GuardDecision, SessionSnapshot};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub title: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

impl CheckoutDetails {
    /// Details prefilled from the signed-in user.
    pub fn for_customer(snapshot: &SessionSnapshot) -> Self {
        let mut details = Self::default();
        if let Some(user) = &snapshot.current_user {
            details.name = user.display_name.clone();
            details.email = user.email.clone();
        }
        details
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: String,
    pub total: Money,
    pub item_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item`, merging with an existing line.
    pub fn add(&mut self, item: &Collection, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        match self.lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                id: item.id.clone(),
                title: item.title.clone(),
                unit_price: item.price,
                quantity,
            }),
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or_else(|| CartError::UnknownItem(id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Set the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id).map(|_| ());
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or_else(|| CartError::UnknownItem(id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Place the order. Requires a signed-in customer and a name and email.
    pub fn checkout(
        &mut self,
        snapshot: &SessionSnapshot,
        details: &CheckoutDetails,
    ) -> Result<OrderConfirmation, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        if member_guard(snapshot) != GuardDecision::Render {
            return Err(CartError::NotSignedIn);
        }
        if details.name.trim().is_empty() {
            return Err(CartError::MissingDetail("name"));
        }
        if details.email.trim().is_empty() {
            return Err(CartError::MissingDetail("email"));
        }

        let confirmation = OrderConfirmation {
            id: Uuid::new_v4().to_string(),
            total: self.subtotal(),
            item_count: self.item_count(),
        };
        self.clear();
        info!(order_id = %confirmation.id, total_cents = confirmation.total.cents(), "order placed");
        Ok(confirmation)
    }
}
