//! Customer admin handlers

use shared::models::Customer;
use shared::snapshot::Collection;

use crate::engine::storage::CUSTOMERS_TABLE;
use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
    require_text,
};

/// UpdateCustomer action - rewrites name, phone and bike list
#[derive(Debug, Clone)]
pub struct UpdateCustomerAction {
    pub customer_id: String,
    pub name: String,
    pub phone: String,
    pub bikes: Vec<String>,
}

impl CommandHandler for UpdateCustomerAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let existing: Customer = ctx
            .storage()
            .get_doc(ctx.txn(), CUSTOMERS_TABLE, &self.customer_id)?
            .ok_or_else(|| ActionError::CustomerNotFound(self.customer_id.clone()))?;

        let mut customer = Customer::new(
            existing.id,
            require_text("name", &self.name)?,
            self.phone.trim(),
        );
        for bike in &self.bikes {
            customer.add_bike(bike);
        }

        ctx.storage().put_customer(ctx.txn(), &customer)?;
        ctx.touch(Collection::Customers);
        Ok(ActionOutcome::default())
    }
}

/// RemoveCustomer action
///
/// Tickets and slots keep their denormalized copies, so nothing else is
/// touched.
#[derive(Debug, Clone)]
pub struct RemoveCustomerAction {
    pub customer_id: String,
}

impl CommandHandler for RemoveCustomerAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        if !ctx.storage().remove_customer(ctx.txn(), &self.customer_id)? {
            return Err(ActionError::CustomerNotFound(self.customer_id.clone()));
        }
        ctx.touch(Collection::Customers);
        tracing::info!(
            customer_id = %self.customer_id,
            operator = %metadata.operator_name,
            "Customer removed"
        );
        Ok(ActionOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::test_support::*;

    #[test]
    fn update_reindexes_phone_and_dedups_bikes() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        storage
            .put_customer(&txn, &Customer::new("CUST-1", "Alice", "0811"))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        UpdateCustomerAction {
            customer_id: "CUST-1".into(),
            name: "Alice W".into(),
            phone: "0899".into(),
            bikes: vec!["Brompton".into(), "Brompton".into(), "Tern".into()],
        }
        .execute(&mut ctx, &metadata_at(jan(2, 1)))
        .unwrap();

        assert!(storage.find_customers_by_phone(&txn, "0811").unwrap().is_empty());
        let moved = storage.find_customers_by_phone(&txn, "0899").unwrap();
        assert_eq!(moved[0].name, "Alice W");
        assert_eq!(moved[0].bikes, vec!["Brompton", "Tern"]);
    }

    #[test]
    fn remove_unknown_customer_fails() {
        let storage = seeded_storage();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, chrono_tz::Asia::Jakarta);

        let result = RemoveCustomerAction {
            customer_id: "CUST-404".into(),
        }
        .execute(&mut ctx, &metadata_at(jan(2, 1)));
        assert!(matches!(result, Err(ActionError::CustomerNotFound(_))));
        assert!(ctx.touched().is_empty());
    }
}
