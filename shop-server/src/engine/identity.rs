//! Customer find-or-create
//!
//! Used by ticket creation, check-in and request approval. Split in two so
//! callers can finish every read of their unit before the first write:
//! [`lookup_customer`] only reads, [`ResolvedCustomer::save`] writes at
//! most one customer document.

use shared::models::Customer;
use shared::snapshot::Collection;
use shared::util::prefixed_id;

use super::storage::CUSTOMERS_TABLE;
use super::traits::{ActionResult, CommandContext};

/// A customer picked by [`lookup_customer`], not yet written
#[derive(Debug, Clone)]
pub struct ResolvedCustomer {
    pub customer: Customer,
    is_new: bool,
    bike_added: bool,
}

impl ResolvedCustomer {
    /// Whether [`save`](Self::save) will write a document
    pub fn needs_write(&self) -> bool {
        self.is_new || self.bike_added
    }

    /// Write phase: upsert the record if it is new or gained a bike
    pub fn save(self, ctx: &mut CommandContext<'_>) -> ActionResult<Customer> {
        if self.needs_write() {
            ctx.storage().put_customer(ctx.txn(), &self.customer)?;
            ctx.touch(Collection::Customers);
            tracing::debug!(
                customer_id = %self.customer.id,
                is_new = self.is_new,
                bike_added = self.bike_added,
                "Customer upserted"
            );
        }
        Ok(self.customer)
    }
}

/// Read phase: find the customer and union `bike` into their bike list
///
/// - With an id: that record, or a new record under that id if missing.
/// - Without: the first customer with the same phone whose name matches
///   case-insensitively, else a new `CUST-` record.
pub fn lookup_customer(
    ctx: &CommandContext<'_>,
    customer_id: Option<&str>,
    name: &str,
    phone: &str,
    bike: &str,
) -> ActionResult<ResolvedCustomer> {
    let existing = match customer_id {
        Some(id) => ctx
            .storage()
            .get_doc::<Customer>(ctx.txn(), CUSTOMERS_TABLE, id)?,
        None => ctx
            .storage()
            .find_customers_by_phone(ctx.txn(), phone)?
            .into_iter()
            .find(|c| c.name_matches(name)),
    };

    let (mut customer, is_new) = match existing {
        Some(customer) => (customer, false),
        None => {
            let id = customer_id
                .map(str::to_string)
                .unwrap_or_else(|| prefixed_id("CUST"));
            (Customer::new(id, name, phone), true)
        }
    };
    let bike_added = customer.add_bike(bike);

    Ok(ResolvedCustomer {
        customer,
        is_new,
        bike_added,
    })
}

/// [`lookup_customer`] then [`ResolvedCustomer::save`]
#[cfg(test)]
pub fn resolve_customer(
    ctx: &mut CommandContext<'_>,
    customer_id: Option<&str>,
    name: &str,
    phone: &str,
    bike: &str,
) -> ActionResult<Customer> {
    lookup_customer(ctx, customer_id, name, phone, bike)?.save(ctx)
}
